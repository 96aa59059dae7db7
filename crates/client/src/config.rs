//! Client configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::input::IntentPolicy;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub player: PlayerConfig,
}

impl ClientConfig {
    /// Load configuration from `client.toml` or use defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from("client.toml")
    }

    /// Load from `path`, writing a default file there if none exists.
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            info!("No {} found, creating default config", path.display());
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            Ok(default_config)
        }
    }
}

/// Server connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionConfig {
    /// WebSocket url of the server.
    #[serde(default = "default_url")]
    pub url: String,
    /// Version sent in the handshake.
    #[serde(default = "default_protocol_version")]
    pub protocol_version: u32,
    /// Delay before reconnecting after the socket closes.
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,
    /// Give up after this many consecutive failed attempts (unlimited if unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_reconnect_attempts: Option<u32>,
}

impl ConnectionConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            protocol_version: default_protocol_version(),
            reconnect_delay_ms: default_reconnect_delay(),
            max_reconnect_attempts: None,
        }
    }
}

fn default_url() -> String {
    "ws://127.0.0.1:11443".to_string()
}
fn default_protocol_version() -> u32 {
    1
}
fn default_reconnect_delay() -> u64 {
    500
}

/// Viewport settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ViewConfig {
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    /// How far (screen px) the spectate camera may look past the world edge.
    #[serde(default = "default_border_margin")]
    pub border_margin: f64,
    /// Render tick interval.
    #[serde(default = "default_frame_interval")]
    pub frame_interval_ms: u64,
}

impl ViewConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            border_margin: default_border_margin(),
            frame_interval_ms: default_frame_interval(),
        }
    }
}

fn default_width() -> f64 {
    1920.0
}
fn default_height() -> f64 {
    1080.0
}
fn default_border_margin() -> f64 {
    100.0
}
fn default_frame_interval() -> u64 {
    16
}

/// Movement intent throttling.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    #[serde(default = "default_intent_min_interval")]
    pub intent_min_interval_ms: u64,
    #[serde(default = "default_intent_resend")]
    pub intent_resend_ms: u64,
    #[serde(default = "default_intent_min_distance")]
    pub intent_min_distance: f64,
}

impl InputConfig {
    pub fn policy(&self) -> IntentPolicy {
        IntentPolicy {
            min_interval_ms: self.intent_min_interval_ms as f64,
            resend_ms: self.intent_resend_ms as f64,
            min_distance: self.intent_min_distance,
        }
    }

    /// How often the intent ticker fires.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.intent_min_interval_ms.max(1))
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            intent_min_interval_ms: default_intent_min_interval(),
            intent_resend_ms: default_intent_resend(),
            intent_min_distance: default_intent_min_distance(),
        }
    }
}

fn default_intent_min_interval() -> u64 {
    40
}
fn default_intent_resend() -> u64 {
    100
}
fn default_intent_min_distance() -> f64 {
    8.0
}

/// Local player settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlayerConfig {
    /// Joined automatically after every handshake when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config.connection.url, "ws://127.0.0.1:11443");
        assert_eq!(config.connection.protocol_version, 1);
        assert_eq!(config.connection.reconnect_delay(), Duration::from_millis(500));
        assert_eq!(config.connection.max_reconnect_attempts, None);
        assert_eq!(config.view.width, 1920.0);
        assert_eq!(config.input.policy(), IntentPolicy::default());
        assert!(config.player.nickname.is_none());
    }

    #[test]
    fn test_partial_sections() {
        let config: ClientConfig = toml::from_str(
            r#"
            [connection]
            url = "ws://arena.example:443"
            max_reconnect_attempts = 3

            [player]
            nickname = "blob"
            "#,
        )
        .unwrap();
        assert_eq!(config.connection.url, "ws://arena.example:443");
        assert_eq!(config.connection.max_reconnect_attempts, Some(3));
        assert_eq!(config.connection.reconnect_delay_ms, 500);
        assert_eq!(config.player.nickname.as_deref(), Some("blob"));
    }

    #[test]
    fn test_load_writes_default_file() {
        let dir = std::env::temp_dir().join(format!("cellview-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("client.toml");
        let _ = std::fs::remove_file(&path);

        let config = ClientConfig::load_from(&path).unwrap();
        assert!(path.exists());
        let reloaded = ClientConfig::load_from(&path).unwrap();
        assert_eq!(reloaded.connection.url, config.connection.url);
        assert_eq!(reloaded.view.frame_interval_ms, 16);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
