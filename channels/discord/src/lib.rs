use common::config::StatusBotConfig;
use serenity::prelude::*;
use std::sync::Arc;
use tracing::{error, info};

pub mod handler;
pub mod presence;

pub use presence::{render_presence, PresenceView, StatusPresence};

pub type DiscordResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Runs the Discord client until it disconnects. Returns `Ok` without
/// connecting when the channel is not configured, disabled or has no token.
pub async fn start(config: &StatusBotConfig, presence: Arc<StatusPresence>) -> DiscordResult {
    let discord_config = match config.discord() {
        Some(dc) => dc,
        None => {
            info!("Discord channel not configured.");
            return Ok(());
        }
    };

    if discord_config.enabled == Some(false) {
        info!("Discord channel disabled.");
        return Ok(());
    }

    let token = match &discord_config.token {
        Some(token) => token,
        None => {
            error!("Discord token missing.");
            return Ok(());
        }
    };

    info!("Starting Discord bot...");

    let handler = handler::Handler { presence };

    let mut client = Client::builder(token, GatewayIntents::GUILDS)
        .event_handler(handler)
        .await?;

    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    Ok(())
}
