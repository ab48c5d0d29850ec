use async_trait::async_trait;
use common::status::StatusSnapshot;
use poller::{StatusHandle, StatusListener};
use serenity::gateway::ActivityData;
use serenity::model::user::OnlineStatus;
use serenity::prelude::Context;
use tokio::sync::RwLock;
use tracing::debug;

/// What the bot shows for a given status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceView {
    pub text: String,
    pub online: bool,
}

pub fn render_presence(snapshot: &StatusSnapshot, server_name: &str) -> PresenceView {
    if snapshot.online {
        PresenceView {
            text: format!(
                "{}: {}/{} players",
                server_name, snapshot.current_count, snapshot.max_players
            ),
            online: true,
        }
    } else {
        PresenceView {
            text: format!("{} is offline", server_name),
            online: false,
        }
    }
}

/// Mirrors the poller state into the bot's Discord presence.
pub struct StatusPresence {
    status: StatusHandle,
    server_name: String,
    ctx: RwLock<Option<Context>>,
}

impl StatusPresence {
    pub fn new(status: StatusHandle, server_name: impl Into<String>) -> Self {
        Self {
            status,
            server_name: server_name.into(),
            ctx: RwLock::new(None),
        }
    }

    /// Called once the gateway session is ready; pushes the current status
    /// straight away so the bot does not wait for the next poll.
    pub async fn attach(&self, ctx: Context) {
        *self.ctx.write().await = Some(ctx);
        self.publish().await;
    }

    pub async fn view(&self) -> PresenceView {
        render_presence(&self.status.snapshot().await, &self.server_name)
    }

    async fn publish(&self) {
        let view = self.view().await;
        let ctx = self.ctx.read().await;
        let Some(ctx) = ctx.as_ref() else {
            debug!("Discord not ready yet, skipping presence update");
            return;
        };

        debug!(text = %view.text, online = view.online, "Updating bot presence");
        let status = if view.online {
            OnlineStatus::Online
        } else {
            OnlineStatus::DoNotDisturb
        };
        ctx.set_presence(Some(ActivityData::watching(view.text)), status);
    }
}

#[async_trait]
impl StatusListener for StatusPresence {
    async fn status_changed(&self) {
        self.publish().await;
    }
}
