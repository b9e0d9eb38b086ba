//! Dashboard configuration.
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! `config/admin.{toml,yaml,json}` file, then `LIBRARY_ADMIN__*` environment
//! variables (`LIBRARY_ADMIN__API_URL=https://library.example/api`).

use crate::error::AdminError;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use config::builder::DefaultState;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub api_url: String,
    #[serde(default)]
    pub api_token: Option<String>,
    pub request_timeout_secs: u64,
    pub list_limit: u32,
    pub debounce_ms: u64,
    pub cache_buffer: usize,
    /// Mailbox size of the URL parameter store.
    pub params_buffer: usize,
    pub max_cover_bytes: usize,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            request_timeout_secs: 15,
            list_limit: 10,
            debounce_ms: 350,
            cache_buffer: 64,
            params_buffer: 16,
            max_cover_bytes: 5 * 1024 * 1024,
        }
    }
}

impl AdminConfig {
    /// Load configuration from the optional file and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        defaults()?
            .add_source(File::with_name("config/admin").required(false))
            .add_source(
                Environment::with_prefix("LIBRARY_ADMIN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Defaults overlaid with a TOML document.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        defaults()?
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    pub fn base_url(&self) -> Result<Url, AdminError> {
        Ok(Url::parse(&self.api_url)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let d = AdminConfig::default();
    Config::builder()
        .set_default("api_url", d.api_url)?
        .set_default("request_timeout_secs", d.request_timeout_secs)?
        .set_default("list_limit", u64::from(d.list_limit))?
        .set_default("debounce_ms", d.debounce_ms)?
        .set_default("cache_buffer", d.cache_buffer as u64)?
        .set_default("params_buffer", d.params_buffer as u64)?
        .set_default("max_cover_bytes", d.max_cover_bytes as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AdminConfig::from_toml("").unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.list_limit, 10);
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
        assert_eq!(config.debounce(), Duration::from_millis(350));
        assert_eq!(config.max_cover_bytes, 5 * 1024 * 1024);
        assert_eq!(config.cache_buffer, 64);
        assert_eq!(config.params_buffer, 16);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let config = AdminConfig::from_toml(
            r#"
            api_url = "https://library.example/api"
            api_token = "secret"
            list_limit = 25
            params_buffer = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.list_limit, 25);
        assert_eq!(config.params_buffer, 4);
        assert_eq!(config.cache_buffer, 64);
        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert_eq!(config.base_url().unwrap().host_str(), Some("library.example"));
        assert_eq!(config.debounce_ms, 350);
    }

    #[test]
    fn test_bad_url_is_rejected() {
        let config = AdminConfig::from_toml(r#"api_url = "not a url""#).unwrap();
        assert!(matches!(config.base_url(), Err(AdminError::InvalidUrl(_))));
    }
}
