use chrono::Utc;
use common::config::{NotifyPolicy, ServerConfig};
use common::status::StatusSnapshot;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::PollerError;
use crate::listener::StatusListener;
use crate::source::StatusSource;

#[derive(Debug, Clone)]
pub struct PollerSettings {
    pub server_id: String,
    pub interval: Duration,
    pub notify: NotifyPolicy,
}

impl PollerSettings {
    pub fn new(server_id: impl Into<String>, interval: Duration) -> Self {
        Self {
            server_id: server_id.into(),
            interval,
            notify: NotifyPolicy::Always,
        }
    }

    pub fn with_notify(mut self, notify: NotifyPolicy) -> Self {
        self.notify = notify;
        self
    }
}

impl From<&ServerConfig> for PollerSettings {
    fn from(config: &ServerConfig) -> Self {
        Self::new(config.id.clone(), config.poll_interval()).with_notify(config.notify)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    WentOnline,
    WentOffline,
}

/// What a single refresh did.
#[derive(Debug, Clone)]
pub struct RefreshReport {
    pub snapshot: StatusSnapshot,
    pub transition: Option<Transition>,
    pub notified: bool,
}

/// Read-only view of the poller state, cheap to clone and hand to consumers.
#[derive(Clone)]
pub struct StatusHandle {
    server_id: Arc<str>,
    state: Arc<RwLock<StatusSnapshot>>,
}

impl StatusHandle {
    pub fn server_id(&self) -> &str {
        &self.server_id
    }

    pub async fn snapshot(&self) -> StatusSnapshot {
        self.state.read().await.clone()
    }
}

/// Polls one server and tracks whether it is online.
///
/// The scheduled loop started by [`StatusPoller::init`] never runs two
/// refreshes at once: each tick awaits its refresh and ticks missed while a
/// slow request is in flight are skipped. Direct calls to
/// [`StatusPoller::refresh`] may overlap; each one replaces the whole
/// snapshot under a single write, so the last to complete wins and fields
/// from different responses are never mixed.
pub struct StatusPoller {
    settings: PollerSettings,
    source: Arc<dyn StatusSource>,
    state: Arc<RwLock<StatusSnapshot>>,
    listener: RwLock<Option<Arc<dyn StatusListener>>>,
}

impl StatusPoller {
    pub fn new(settings: PollerSettings, source: Arc<dyn StatusSource>) -> Self {
        Self {
            settings,
            source,
            state: Arc::new(RwLock::new(StatusSnapshot::offline(None))),
            listener: RwLock::new(None),
        }
    }

    /// Builds the poller, performs the first refresh, then spawns the
    /// periodic loop. The loop lives until the returned handle is aborted.
    pub async fn init(
        settings: PollerSettings,
        source: Arc<dyn StatusSource>,
        listener: Option<Arc<dyn StatusListener>>,
    ) -> Result<(Arc<Self>, JoinHandle<()>), PollerError> {
        let poller = Arc::new(Self::new(settings, source));
        if let Some(listener) = listener {
            poller.set_change_listener(listener).await;
        }

        let handle = Arc::clone(&poller).start().await?;
        Ok((poller, handle))
    }

    /// Performs the first refresh (awaited) and spawns the periodic loop.
    pub async fn start(self: Arc<Self>) -> Result<JoinHandle<()>, PollerError> {
        if self.settings.interval.is_zero() {
            return Err(PollerError::InvalidInterval);
        }

        info!(
            server_id = %self.settings.server_id,
            interval_secs = self.settings.interval.as_secs_f64(),
            notify = ?self.settings.notify,
            "Status poller initialized"
        );

        self.refresh().await;

        Ok(tokio::spawn(self.run()))
    }

    async fn run(self: Arc<Self>) {
        let mut interval = time::interval(self.settings.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval.tick().await; // Skip the immediate tick (start already refreshed)

        loop {
            interval.tick().await;
            self.refresh().await;
        }
    }

    /// Replaces the listener. Only one is kept.
    pub async fn set_change_listener(&self, listener: Arc<dyn StatusListener>) {
        *self.listener.write().await = Some(listener);
    }

    pub fn handle(&self) -> StatusHandle {
        StatusHandle {
            server_id: Arc::from(self.settings.server_id.as_str()),
            state: Arc::clone(&self.state),
        }
    }

    pub fn server_id(&self) -> &str {
        &self.settings.server_id
    }

    pub async fn snapshot(&self) -> StatusSnapshot {
        self.state.read().await.clone()
    }

    /// Fetches once and updates the state. Any failure leaves the server
    /// offline with zeroed counts; errors are logged, never returned.
    pub async fn refresh(&self) -> RefreshReport {
        let checked_at = Utc::now();
        let next = match self.source.fetch(&self.settings.server_id).await {
            Ok(data) => StatusSnapshot::online(
                data.current_count(),
                data.max_players(),
                data.hostname(),
                checked_at,
            ),
            Err(e) => {
                warn!(server_id = %self.settings.server_id, "Failed to fetch server stats: {}", e);
                StatusSnapshot::offline(Some(checked_at))
            }
        };

        let previous = {
            let mut state = self.state.write().await;
            std::mem::replace(&mut *state, next.clone())
        };

        let transition = match (previous.online, next.online) {
            (false, true) => Some(Transition::WentOnline),
            (true, false) => Some(Transition::WentOffline),
            _ => None,
        };
        match transition {
            Some(Transition::WentOnline) => info!(server_id = %self.settings.server_id, "Server is now ONLINE"),
            Some(Transition::WentOffline) => info!(server_id = %self.settings.server_id, "Server is now OFFLINE"),
            None => {}
        }

        debug!(
            online = next.online,
            current = next.current_count,
            max = next.max_players,
            "Updated server stats"
        );

        let should_notify = match self.settings.notify {
            NotifyPolicy::Always => true,
            NotifyPolicy::OnChange => !previous.same_status(&next),
        };

        let mut notified = false;
        if should_notify {
            let listener = self.listener.read().await.clone();
            if let Some(listener) = listener {
                listener.status_changed().await;
                notified = true;
            }
        }

        RefreshReport {
            snapshot: next,
            transition,
            notified,
        }
    }
}
