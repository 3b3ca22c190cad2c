//! Client configuration at `~/.pairchat/config.toml`.
//!
//! Provides default server, display name, gender and timing settings.
//! CLI flags always override config file values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Top-level config file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Default chat settings.
    #[serde(default)]
    pub default: DefaultConfig,
}

/// Default chat settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultConfig {
    /// Pairing server endpoint.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Display name shown to the peer (empty = ask on the command line).
    #[serde(default)]
    pub name: String,

    /// Gender tag sent to the server (empty = ask on the command line).
    #[serde(default)]
    pub gender: String,

    /// Silence window before the peer typing indicator clears.
    #[serde(default = "default_typing_expiry_ms")]
    pub typing_expiry_ms: u64,

    /// Largest image accepted by `/image` and `/fulfill`, in KiB (0 = no limit).
    #[serde(default)]
    pub max_image_kib: u64,
}

impl Default for DefaultConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            name: String::new(),
            gender: String::new(),
            typing_expiry_ms: default_typing_expiry_ms(),
            max_image_kib: 0,
        }
    }
}

fn default_server_url() -> String {
    "wss://pair.example.invalid/chat".to_string()
}

fn default_typing_expiry_ms() -> u64 {
    pairchat_core::DEFAULT_TYPING_EXPIRY.as_millis() as u64
}

impl DefaultConfig {
    pub fn typing_expiry(&self) -> Duration {
        Duration::from_millis(self.typing_expiry_ms)
    }

    pub fn max_image_kib(&self) -> Option<u64> {
        (self.max_image_kib > 0).then_some(self.max_image_kib)
    }
}

/// `~/.pairchat`, or the current directory when there is no home.
pub fn state_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_default().join(".pairchat")
}

impl Config {
    /// Load configuration from a TOML file, returning defaults if the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config at {}", path.display()))?;

        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = Config::default();
        assert_eq!(cfg.default.typing_expiry_ms, 3000);
        assert_eq!(cfg.default.typing_expiry(), Duration::from_millis(3000));
        assert_eq!(cfg.default.max_image_kib(), None);
        assert!(cfg.default.name.is_empty());
        assert!(cfg.default.server_url.starts_with("wss://"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[default]
server_url = "ws://localhost:9000/chat"
name = "Sam"
gender = "Male"
typing_expiry_ms = 1000
max_image_kib = 512
"#;
        let cfg: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.default.server_url, "ws://localhost:9000/chat");
        assert_eq!(cfg.default.name, "Sam");
        assert_eq!(cfg.default.gender, "Male");
        assert_eq!(cfg.default.typing_expiry(), Duration::from_millis(1000));
        assert_eq!(cfg.default.max_image_kib(), Some(512));
    }

    #[test]
    fn parse_partial_toml_config() {
        let toml_str = r#"
[default]
name = "Ana"
"#;
        let cfg: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.default.name, "Ana");
        assert_eq!(cfg.default.typing_expiry_ms, 3000); // default
        assert_eq!(cfg.default.server_url, default_server_url()); // default
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert!(cfg.default.gender.is_empty());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[default\nname = ").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
