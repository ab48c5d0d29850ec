use serenity::async_trait;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use std::sync::Arc;
use tracing::info;

use crate::presence::StatusPresence;

pub struct Handler {
    pub presence: Arc<StatusPresence>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);
        self.presence.attach(ctx).await;
    }
}
