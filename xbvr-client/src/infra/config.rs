use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable that overrides the configured server URL
pub const SERVER_URL_ENV: &str = "XBVR_SERVER_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server_url: String,
    /// Items requested per list page
    pub page_limit: u64,
    pub request_timeout_secs: u64,
    /// Ceiling for list endpoints that return whole collections at once
    pub extended_timeout_secs: u64,
    /// Remote session history bound; `None` keeps every archived scene
    pub history_limit: Option<usize>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:9999".to_string(),
            page_limit: 80,
            request_timeout_secs: 30,
            extended_timeout_secs: 180,
            history_limit: Some(100),
        }
    }
}

impl ClientConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("xbvr-client").join("config.json"))
    }

    pub fn load() -> Self {
        let mut config = Self::default_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default();

        // Allow env var to override config file for server URL
        if let Ok(server_url) = std::env::var(SERVER_URL_ENV) {
            config.server_url = server_url;
        }

        config
    }

    /// Read `path`, falling back to defaults when it is missing or malformed.
    pub fn load_from(path: &Path) -> Self {
        if path.exists()
            && let Ok(content) = std::fs::read_to_string(path)
        {
            match serde_json::from_str::<ClientConfig>(&content) {
                Ok(config) => return config,
                Err(e) => log::warn!(
                    "[ClientConfig] Ignoring malformed {}: {}",
                    path.display(),
                    e
                ),
            }
        }
        Self::default()
    }

    pub fn save(&self) -> Result<(), std::io::Error> {
        match Self::default_path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn extended_timeout(&self) -> Duration {
        Duration::from_secs(self.extended_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load_from(&dir.path().join("nope.json"));
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = ClientConfig {
            server_url: "http://media.lan:9999".into(),
            page_limit: 40,
            history_limit: None,
            ..ClientConfig::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(ClientConfig::load_from(&path), config);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "page_limit": 20 }"#).unwrap();
        let config = ClientConfig::load_from(&path);
        assert_eq!(config.page_limit, 20);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn malformed_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(ClientConfig::load_from(&path), ClientConfig::default());
    }
}
