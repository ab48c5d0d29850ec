//! Status bot — watches one CFX game server and mirrors it to Discord.
//!
//! Polls the public server list on a fixed interval, shows the player
//! count as the bot's presence and serves the current status over HTTP.

use anyhow::{Context, Result};
use clap::Parser;
use common::config::StatusBotConfig;
use discord::StatusPresence;
use poller::{CfxClient, PollerSettings, StatusListener, StatusPoller};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

mod api;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, default_value = "config.json")]
    config: String,
    #[arg(long, default_value_t = 18789)]
    port: u16,
    #[arg(long, default_value = "127.0.0.1")]
    bind: IpAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,hyper=warn,reqwest=warn".into()),
        )
        .with_target(false)
        .init();

    info!("Status bot v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let config = StatusBotConfig::load(&args.config)
        .with_context(|| format!("Invalid configuration (config file: {})", args.config))?;
    let config = Arc::new(config);

    info!(
        server_id = %config.server.id,
        server_name = %config.server.display_name(),
        interval_secs = config.server.poll_interval_secs,
        "Configuration loaded"
    );

    // ── Status Poller ───────────────────────────────────────────────
    let client = CfxClient::new(config.server.base_url.clone(), config.server.request_timeout())
        .context("Failed to build HTTP client")?;

    let poller = Arc::new(StatusPoller::new(
        PollerSettings::from(&config.server),
        Arc::new(client),
    ));

    let presence = Arc::new(StatusPresence::new(
        poller.handle(),
        config.server.display_name(),
    ));
    poller
        .set_change_listener(Arc::clone(&presence) as Arc<dyn StatusListener>)
        .await;

    let poll_task = Arc::clone(&poller)
        .start()
        .await
        .context("Failed to start status poller")?;

    // ── Discord ─────────────────────────────────────────────────────
    let discord_config = Arc::clone(&config);
    let discord_presence = Arc::clone(&presence);
    tokio::spawn(async move {
        if let Err(e) = discord::start(&discord_config, discord_presence).await {
            error!("Discord error: {}", e);
        }
    });

    // ── HTTP status API ─────────────────────────────────────────────
    let app = api::router(api::AppState {
        status: poller.handle(),
        server_name: config.server.display_name().to_string(),
    });

    let addr = SocketAddr::new(args.bind, args.port);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Status API listening on {}", addr);

    axum::serve(listener, app).await.context("HTTP server failed")?;

    poll_task.abort();
    Ok(())
}
