//! Configuration for the Spine registry.
//!
//! Loaded from a TOML file; secrets may be supplied through the environment
//! instead (`SPINE_DATABASE_URL`, `CLOUDFLARE_API_TOKEN`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use spine_core::RegistrationOptions;

/// Environment variable overriding `database.url`.
pub const ENV_DATABASE_URL: &str = "SPINE_DATABASE_URL";
/// Environment variable overriding `cloudflare.api_token`.
pub const ENV_CLOUDFLARE_API_TOKEN: &str = "CLOUDFLARE_API_TOKEN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpineConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub cloudflare: CloudflareConfig,

    #[serde(default)]
    pub registration: RegistrationConfig,

    #[serde(default)]
    pub domains: DomainsConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Database connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `SeaORM` connection URL (sqlite, mysql or postgres).
    #[serde(default = "default_database_url")]
    pub url: String,
}

/// Cloudflare account settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudflareConfig {
    /// API token with Zone:Read and DNS:Edit.
    #[serde(default)]
    pub api_token: String,

    /// Comment on the A record that marks a zone as open for registration.
    #[serde(default = "default_availability_tag")]
    pub availability_tag: String,

    /// Whether created CNAMEs are proxied through Cloudflare.
    #[serde(default = "default_proxied")]
    pub proxied: bool,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Registration tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationConfig {
    /// Deadline for each provider call, in seconds.
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,

    /// Retries after losing a `dns_records` insert race.
    #[serde(default = "default_unique_violation_retries")]
    pub unique_violation_retries: u32,
}

/// Root-domain availability cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainsConfig {
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

/// Log output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Filter directive (e.g. "info", "spine_core=debug,warn"); `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_database_url() -> String {
    "sqlite://spine.db?mode=rwc".to_string()
}

fn default_availability_tag() -> String {
    spine_provider::DEFAULT_AVAILABILITY_TAG.to_string()
}

fn default_proxied() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_provider_timeout_secs() -> u64 {
    30
}

fn default_unique_violation_retries() -> u32 {
    3
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

impl Default for CloudflareConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            availability_tag: default_availability_tag(),
            proxied: default_proxied(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            provider_timeout_secs: default_provider_timeout_secs(),
            unique_violation_retries: default_unique_violation_retries(),
        }
    }
}

impl Default for DomainsConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl SpineConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`; empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_DATABASE_URL) {
            self.database.url = url;
        }
        if let Some(token) = get(ENV_CLOUDFLARE_API_TOKEN) {
            self.cloudflare.api_token = token;
        }
    }

    /// Check settings that have no usable default.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Missing("database.url"));
        }
        if self.cloudflare.api_token.trim().is_empty() {
            return Err(ConfigError::Missing("cloudflare.api_token"));
        }
        if self.cloudflare.availability_tag.trim().is_empty() {
            return Err(ConfigError::Missing("cloudflare.availability_tag"));
        }
        Ok(())
    }

    pub fn registration_options(&self) -> RegistrationOptions {
        RegistrationOptions {
            provider_timeout: Duration::from_secs(self.registration.provider_timeout_secs),
            unique_violation_retries: self.registration.unique_violation_retries,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.cloudflare.request_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.domains.cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_document_uses_defaults() {
        let config = SpineConfig::from_toml_str("").unwrap();
        assert_eq!(config.database.url, "sqlite://spine.db?mode=rwc");
        assert_eq!(config.cloudflare.availability_tag, "spine");
        assert!(config.cloudflare.proxied);
        assert_eq!(config.telemetry.log_level, "info");

        let options = config.registration_options();
        assert_eq!(options, RegistrationOptions::default());
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn parses_all_sections() {
        let config = SpineConfig::from_toml_str(
            r#"
            [database]
            url = "postgres://spine@localhost/spine"

            [cloudflare]
            api_token = "cf-token"
            availability_tag = "sharify"
            proxied = false

            [registration]
            provider_timeout_secs = 5
            unique_violation_retries = 1

            [domains]
            cache_ttl_secs = 60

            [telemetry]
            log_level = "spine_core=debug,info"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.url, "postgres://spine@localhost/spine");
        assert_eq!(config.cloudflare.api_token, "cf-token");
        assert_eq!(config.cloudflare.availability_tag, "sharify");
        assert!(!config.cloudflare.proxied);
        assert_eq!(
            config.registration_options().provider_timeout,
            Duration::from_secs(5)
        );
        assert_eq!(config.registration_options().unique_violation_retries, 1);
        assert_eq!(config.cache_ttl(), Duration::from_secs(60));
        config.validate().unwrap();
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = SpineConfig::from_toml_str("[database\nurl = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = SpineConfig::from_toml_str(
            r#"
            [database]
            url = "sqlite://file.db"
            [cloudflare]
            api_token = "from-file"
            "#,
        )
        .unwrap();
        let env: HashMap<&str, &str> = [
            (ENV_DATABASE_URL, "mysql://spine@db/spine"),
            (ENV_CLOUDFLARE_API_TOKEN, "from-env"),
        ]
        .into_iter()
        .collect();

        config.apply_overrides(|key| env.get(key).map(ToString::to_string));
        assert_eq!(config.database.url, "mysql://spine@db/spine");
        assert_eq!(config.cloudflare.api_token, "from-env");
    }

    #[test]
    fn blank_environment_values_are_ignored() {
        let mut config = SpineConfig::default();
        config.cloudflare.api_token = "from-file".into();

        config.apply_overrides(|_| Some("  ".to_string()));
        assert_eq!(config.cloudflare.api_token, "from-file");
    }

    #[test]
    fn missing_token_fails_validation() {
        let config = SpineConfig::default();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("cloudflare.api_token")));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = SpineConfig::load(Path::new("/nonexistent/spine.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
