use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time view of the monitored game server.
///
/// A snapshot with `online == false` always carries zero counts and no
/// hostname; use [`StatusSnapshot::offline`] to build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub online: bool,
    pub current_count: u32,
    pub max_players: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_at: Option<DateTime<Utc>>,
}

impl StatusSnapshot {
    pub fn offline(checked_at: Option<DateTime<Utc>>) -> Self {
        Self {
            online: false,
            current_count: 0,
            max_players: 0,
            hostname: None,
            checked_at,
        }
    }

    pub fn online(current_count: u32, max_players: u32, hostname: Option<String>, checked_at: DateTime<Utc>) -> Self {
        Self {
            online: true,
            current_count,
            max_players,
            hostname,
            checked_at: Some(checked_at),
        }
    }

    /// Compares everything a consumer can observe, ignoring when it was checked.
    pub fn same_status(&self, other: &StatusSnapshot) -> bool {
        self.online == other.online
            && self.current_count == other.current_count
            && self.max_players == other.max_players
            && self.hostname == other.hostname
    }
}
