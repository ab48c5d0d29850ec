use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://servers-frontend.fivem.net/api/servers/single";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
    #[error("{var} must be one of \"always\" or \"on-change\", got {value:?}")]
    InvalidNotify { var: &'static str, value: String },
    #[error("server id is not configured (set FIVEM_SERVER_ID)")]
    MissingServerId,
    #[error("poll interval must be greater than zero")]
    ZeroInterval,
    #[error("request timeout must be greater than zero")]
    ZeroTimeout,
    #[error("base url must start with http:// or https://, got {0:?}")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StatusBotConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub channels: Option<ChannelsConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    /// CFX join id of the monitored server.
    pub id: String,
    pub name: Option<String>,
    pub poll_interval_secs: u64,
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub notify: NotifyPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: None,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            notify: NotifyPolicy::Always,
        }
    }
}

impl ServerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Name shown to users; falls back to the server id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or(&self.id)
    }
}

/// When the change listener fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NotifyPolicy {
    /// After every refresh, changed or not.
    #[default]
    Always,
    /// Only when the observable status differs from the previous refresh.
    OnChange,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChannelsConfig {
    pub discord: Option<DiscordConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DiscordConfig {
    pub enabled: Option<bool>,
    pub token: Option<String>,
}

impl StatusBotConfig {
    /// Reads `path` (a missing file means defaults), applies environment
    /// overrides and validates the result.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Applies overrides from a variable lookup (the process environment in
    /// production). Unset or empty variables leave the field untouched.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(id) = get("FIVEM_SERVER_ID") {
            self.server.id = id;
        }
        if let Some(name) = get("FIVEM_SERVER_NAME") {
            self.server.name = Some(name);
        }
        if let Some(value) = get("BOT_CHECKSTATUS_INTERVAL") {
            self.server.poll_interval_secs = parse_positive("BOT_CHECKSTATUS_INTERVAL", value)?;
        }
        if let Some(url) = get("FIVEM_STATUS_BASE_URL") {
            self.server.base_url = url;
        }
        if let Some(value) = get("FIVEM_REQUEST_TIMEOUT") {
            self.server.request_timeout_secs = parse_positive("FIVEM_REQUEST_TIMEOUT", value)?;
        }
        if let Some(value) = get("BOT_NOTIFY") {
            self.server.notify = match value.to_ascii_lowercase().as_str() {
                "always" => NotifyPolicy::Always,
                "on-change" | "on_change" | "onchange" => NotifyPolicy::OnChange,
                _ => return Err(ConfigError::InvalidNotify { var: "BOT_NOTIFY", value }),
            };
        }
        if let Some(token) = get("DISCORD_TOKEN") {
            let channels = self.channels.get_or_insert_with(ChannelsConfig::default);
            let discord = channels.discord.get_or_insert_with(DiscordConfig::default);
            discord.token = Some(token);
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.id.trim().is_empty() {
            return Err(ConfigError::MissingServerId);
        }
        if self.server.poll_interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        let url = self.server.base_url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(url.to_string()));
        }
        Ok(())
    }

    pub fn discord(&self) -> Option<&DiscordConfig> {
        self.channels.as_ref()?.discord.as_ref()
    }
}

fn parse_positive(var: &'static str, value: String) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = StatusBotConfig::from_file(dir.path().join("nope.json")).unwrap();
        assert_eq!(config.server.poll_interval_secs, DEFAULT_POLL_INTERVAL_SECS);
        assert_eq!(config.server.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.server.notify, NotifyPolicy::Always);
        assert!(config.discord().is_none());
    }

    #[test]
    fn test_reads_camel_case_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                "server": { "id": "abc123", "name": "My RP", "pollIntervalSecs": 15, "notify": "on-change" },
                "channels": { "discord": { "enabled": true, "token": "t0k" } }
            }"#,
        )
        .unwrap();

        let config = StatusBotConfig::from_file(&path).unwrap();
        assert_eq!(config.server.id, "abc123");
        assert_eq!(config.server.display_name(), "My RP");
        assert_eq!(config.server.poll_interval_secs, 15);
        assert_eq!(config.server.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.server.notify, NotifyPolicy::OnChange);
        assert_eq!(config.discord().unwrap().token.as_deref(), Some("t0k"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_negative_interval_in_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "server": { "id": "x", "pollIntervalSecs": -5 } }"#).unwrap();
        assert!(matches!(StatusBotConfig::from_file(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = StatusBotConfig::default();
        config
            .apply_overrides(env(&[
                ("FIVEM_SERVER_ID", "qzr9b4"),
                ("FIVEM_SERVER_NAME", "Downtown"),
                ("BOT_CHECKSTATUS_INTERVAL", "30"),
                ("BOT_NOTIFY", "on-change"),
                ("DISCORD_TOKEN", "secret"),
            ]))
            .unwrap();

        assert_eq!(config.server.id, "qzr9b4");
        assert_eq!(config.server.display_name(), "Downtown");
        assert_eq!(config.server.poll_interval(), Duration::from_secs(30));
        assert_eq!(config.server.notify, NotifyPolicy::OnChange);
        assert_eq!(config.discord().unwrap().token.as_deref(), Some("secret"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_interval_must_be_positive_integer() {
        for bad in ["0", "-1", "ten", "1.5"] {
            let mut config = StatusBotConfig::default();
            let err = config
                .apply_overrides(env(&[("BOT_CHECKSTATUS_INTERVAL", bad)]))
                .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidNumber { var: "BOT_CHECKSTATUS_INTERVAL", .. }));
        }
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let mut config = StatusBotConfig::default();
        config.server.id = "keep".into();
        config
            .apply_overrides(env(&[("FIVEM_SERVER_ID", "  "), ("BOT_CHECKSTATUS_INTERVAL", "")]))
            .unwrap();
        assert_eq!(config.server.id, "keep");
        assert_eq!(config.server.poll_interval_secs, DEFAULT_POLL_INTERVAL_SECS);
    }

    #[test]
    fn test_validation_failures() {
        let config = StatusBotConfig::default();
        assert!(matches!(config.validate(), Err(ConfigError::MissingServerId)));

        let mut config = StatusBotConfig::default();
        config.server.id = "abc".into();
        config.server.poll_interval_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroInterval)));

        config.server.poll_interval_secs = 5;
        config.server.request_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTimeout)));

        config.server.request_timeout_secs = 5;
        config.server.base_url = "servers.example".into();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let mut server = ServerConfig::default();
        server.id = "abc".into();
        assert_eq!(server.display_name(), "abc");
        server.name = Some(String::new());
        assert_eq!(server.display_name(), "abc");
    }
}
