use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_API_BASE, DEFAULT_MODEL};

/// Runtime settings. The API key is deliberately absent: it is supplied per
/// session and only ever held in memory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_base: String,
    pub model: String,
    pub http_proxy: String,
    pub https_proxy: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    /// Sessions untouched for this long are dropped. `0` keeps them forever.
    pub session_idle_ttl_secs: u64,
}

const CONFIG_FILE_PATH: &str = "config.toml";

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_SESSION_IDLE_TTL_SECS: u64 = 60 * 60;

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            http_proxy: String::new(),
            https_proxy: String::new(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            session_idle_ttl_secs: DEFAULT_SESSION_IDLE_TTL_SECS,
        }
    }
}

impl Config {
    /// `config.toml` in the working directory (if any), then environment
    /// overrides.
    pub fn new() -> Self {
        let mut config = Self::from_file(CONFIG_FILE_PATH).unwrap_or_default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Read a TOML config file. Missing or unparsable files yield `None`.
    pub fn from_file(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return None;
        }
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Failed to read {}: {}", path.display(), e);
                return None;
            }
        };
        match toml::from_str::<Config>(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Ignoring malformed {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Apply overrides from a variable lookup (normally `std::env::var`).
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_base) = lookup("API_BASE") {
            self.api_base = api_base;
        }
        if let Some(model) = lookup("MODEL") {
            self.model = model;
        }
        if let Some(http_proxy) = lookup("HTTP_PROXY") {
            self.http_proxy = http_proxy;
        }
        if let Some(https_proxy) = lookup("HTTPS_PROXY") {
            self.https_proxy = https_proxy;
        }
        if let Some(port) = lookup("APP_PORT").and_then(|v| v.trim().parse().ok()) {
            self.port = port;
        }
        if let Some(limit) = lookup("MAX_UPLOAD_BYTES").and_then(|v| v.trim().parse().ok()) {
            self.max_upload_bytes = limit;
        }
        if let Some(ttl) = lookup("SESSION_IDLE_TTL_SECS").and_then(|v| v.trim().parse().ok()) {
            self.session_idle_ttl_secs = ttl;
        }
    }

    pub fn session_idle_ttl(&self) -> Option<Duration> {
        (self.session_idle_ttl_secs > 0).then(|| Duration::from_secs(self.session_idle_ttl_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_openai() {
        let config = Config::default();
        assert_eq!(config.api_base, "https://api.openai.com/v1");
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn env_overrides_fields() {
        let mut config = Config::default();
        config.apply_env(lookup_from(&[
            ("API_BASE", "http://localhost:9000/v1"),
            ("MODEL", "gpt-4o-mini"),
            ("APP_PORT", "9090"),
        ]));
        assert_eq!(config.api_base, "http://localhost:9000/v1");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.port, 9090);
    }

    #[test]
    fn unparsable_numbers_are_ignored() {
        let mut config = Config::default();
        config.apply_env(lookup_from(&[("APP_PORT", "eighty"), ("MAX_UPLOAD_BYTES", "")]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn zero_idle_ttl_disables_eviction() {
        let mut config = Config::default();
        assert_eq!(config.session_idle_ttl(), Some(Duration::from_secs(3600)));

        config.apply_env(lookup_from(&[("SESSION_IDLE_TTL_SECS", "0")]));
        assert_eq!(config.session_idle_ttl(), None);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "model = \"gpt-4o\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn malformed_toml_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "model = [").unwrap();

        assert!(Config::from_file(&path).is_none());
    }

    #[test]
    fn missing_file_is_none() {
        assert!(Config::from_file("/definitely/not/here/config.toml").is_none());
    }
}
