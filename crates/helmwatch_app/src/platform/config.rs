use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use helmwatch_engine::{ApiSettings, EngineConfig, Endpoints};
use serde::{Deserialize, Serialize};

use super::logging::LogDestination;

pub const DEFAULT_CONFIG_FILE: &str = "helmwatch.ron";
pub const SERVER_URL_ENV: &str = "HELMWATCH_SERVER_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server_url: String,
    pub api_prefix: String,
    pub poll_interval_ms: u64,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub transfer_timeout_ms: u64,
    pub download_dir: PathBuf,
    pub log_level: String,
    pub log_destination: LogDestination,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let api = ApiSettings::default();
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            api_prefix: "/api".to_string(),
            poll_interval_ms: 1000,
            connect_timeout_ms: api.connect_timeout.as_millis() as u64,
            request_timeout_ms: api.request_timeout.as_millis() as u64,
            transfer_timeout_ms: api.transfer_timeout.as_millis() as u64,
            download_dir: PathBuf::from("downloads"),
            log_level: "info".to_string(),
            log_destination: LogDestination::File,
        }
    }
}

impl ClientConfig {
    /// Applies `HELMWATCH_SERVER_URL` when set and non-empty.
    pub fn with_env_overrides(self) -> Self {
        self.with_server_override(std::env::var(SERVER_URL_ENV).ok())
    }

    fn with_server_override(mut self, server_url: Option<String>) -> Self {
        if let Some(url) = server_url.filter(|url| !url.trim().is_empty()) {
            self.server_url = url.trim().to_string();
        }
        self
    }

    pub fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        let endpoints = Endpoints::new(&self.server_url, &self.api_prefix)
            .with_context(|| format!("invalid server url {:?}", self.server_url))?;
        Ok(EngineConfig {
            endpoints,
            settings: ApiSettings {
                connect_timeout: Duration::from_millis(self.connect_timeout_ms),
                request_timeout: Duration::from_millis(self.request_timeout_ms),
                transfer_timeout: Duration::from_millis(self.transfer_timeout_ms),
            },
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            download_dir: self.download_dir.clone(),
        })
    }
}

/// Reads a RON config file. A missing file yields the defaults.
pub fn load(path: &Path) -> anyhow::Result<ClientConfig> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(ClientConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read config from {path:?}"));
        }
    };

    ron::from_str(&content).with_context(|| format!("failed to parse config from {path:?}"))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::Duration;

    use tempfile::TempDir;

    use super::{load, ClientConfig};
    use crate::platform::logging::LogDestination;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load(&temp.path().join("absent.ron")).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.poll_interval_ms, 1000);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("helmwatch.ron");
        fs::write(
            &path,
            r#"(server_url: "http://cams.local:8080", log_destination: Both)"#,
        )
        .unwrap();

        let config = load(&path).unwrap();
        assert_eq!(config.server_url, "http://cams.local:8080");
        assert_eq!(config.log_destination, LogDestination::Both);
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.download_dir, PathBuf::from("downloads"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("helmwatch.ron");
        fs::write(&path, "(server_url: ").unwrap();
        assert!(load(&path).is_err());
    }

    #[test]
    fn server_override_replaces_url() {
        let config = ClientConfig::default()
            .with_server_override(Some(" http://10.0.0.5:5000 ".to_string()));
        assert_eq!(config.server_url, "http://10.0.0.5:5000");

        let untouched = ClientConfig::default().with_server_override(Some(String::new()));
        assert_eq!(untouched.server_url, ClientConfig::default().server_url);
    }

    #[test]
    fn engine_config_converts_durations() {
        let config = ClientConfig {
            poll_interval_ms: 250,
            ..ClientConfig::default()
        };
        let engine = config.engine_config().unwrap();
        assert_eq!(engine.poll_interval, Duration::from_millis(250));
        assert_eq!(
            engine.endpoints.upload().as_str(),
            "http://127.0.0.1:5000/api/upload"
        );
    }

    #[test]
    fn bad_server_url_is_rejected() {
        let config = ClientConfig {
            server_url: "nowhere".to_string(),
            ..ClientConfig::default()
        };
        assert!(config.engine_config().is_err());
    }
}
