//! Configuration management.
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. Built-in defaults
//! 2. An optional TOML file (`--config`, `./abstract-api-mcp.toml` or
//!    `<config dir>/abstract-api-mcp/config.toml`)
//! 3. Environment variables
//!
//! API keys use one variable per service (`ABSTRACT_EMAIL_API_KEY`,
//! `ABSTRACT_IP_API_KEY`, ...). HTTP settings use the `ABSTRACT_MCP` prefix with a
//! double underscore separator, e.g. `ABSTRACT_MCP_HTTP__TIMEOUT_SECS=10`.
//!
//! ```toml
//! [api_keys]
//! email = "your-email-key"
//! ip = "your-ip-key"
//!
//! [http]
//! timeout_secs = 30
//! long_timeout_secs = 60
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::ServiceKey;

/// Name of the configuration file looked up in the working and config directories
pub const CONFIG_FILE_NAME: &str = "abstract-api-mcp.toml";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// API keys, one per service
    #[serde(default)]
    pub api_keys: ApiKeys,

    /// Outbound HTTP settings
    #[serde(default)]
    pub http: HttpConfig,
}

/// API keys for the Abstract API services
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiKeys {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub vat: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub holidays: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub scrape: Option<String>,
    #[serde(default)]
    pub screenshot: Option<String>,
}

impl Default for ApiKeys {
    fn default() -> Self {
        let mut keys = Self::empty();
        keys.apply_env();
        keys
    }
}

impl ApiKeys {
    /// No keys at all, ignoring the environment
    pub fn empty() -> Self {
        Self {
            email: None,
            phone: None,
            vat: None,
            ip: None,
            timezone: None,
            holidays: None,
            exchange: None,
            company: None,
            scrape: None,
            screenshot: None,
        }
    }

    /// The key for one service
    pub fn get(&self, service: ServiceKey) -> Option<&str> {
        self.slot(service).as_deref()
    }

    /// Override keys with any non-empty `ABSTRACT_<SERVICE>_API_KEY` variables
    pub fn apply_env(&mut self) {
        for service in ServiceKey::ALL {
            if let Ok(value) = std::env::var(service.env_var()) {
                if !value.trim().is_empty() {
                    *self.slot_mut(service) = Some(value);
                }
            }
        }
    }

    fn slot(&self, service: ServiceKey) -> &Option<String> {
        match service {
            ServiceKey::Email => &self.email,
            ServiceKey::Phone => &self.phone,
            ServiceKey::Vat => &self.vat,
            ServiceKey::Ip => &self.ip,
            ServiceKey::Timezone => &self.timezone,
            ServiceKey::Holidays => &self.holidays,
            ServiceKey::Exchange => &self.exchange,
            ServiceKey::Company => &self.company,
            ServiceKey::Scrape => &self.scrape,
            ServiceKey::Screenshot => &self.screenshot,
        }
    }

    fn slot_mut(&mut self, service: ServiceKey) -> &mut Option<String> {
        match service {
            ServiceKey::Email => &mut self.email,
            ServiceKey::Phone => &mut self.phone,
            ServiceKey::Vat => &mut self.vat,
            ServiceKey::Ip => &mut self.ip,
            ServiceKey::Timezone => &mut self.timezone,
            ServiceKey::Holidays => &mut self.holidays,
            ServiceKey::Exchange => &mut self.exchange,
            ServiceKey::Company => &mut self.company,
            ServiceKey::Scrape => &mut self.scrape,
            ServiceKey::Screenshot => &mut self.screenshot,
        }
    }
}

impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let configured: Vec<&str> = ServiceKey::ALL
            .iter()
            .filter(|s| self.get(**s).is_some())
            .map(|s| s.id())
            .collect();
        f.debug_struct("ApiKeys")
            .field("configured", &configured)
            .finish()
    }
}

/// Outbound HTTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout for regular calls
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Request timeout for scraping and screenshots
    #[serde(default = "default_long_timeout")]
    pub long_timeout_secs: u64,

    /// TCP connect timeout
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Route every service through this base URL instead of the production hosts.
    /// Requests go to `<base_url>/<service>/<path>`.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Custom User-Agent header
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            long_timeout_secs: default_long_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            base_url: None,
            user_agent: None,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn long_timeout(&self) -> Duration {
        Duration::from_secs(self.long_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_long_timeout() -> u64 {
    60
}

fn default_connect_timeout() -> u64 {
    10
}

/// Load configuration from a file, then apply environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(
            config::Environment::with_prefix("ABSTRACT_MCP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let mut config: Config = settings.try_deserialize()?;
    config.api_keys.apply_env();
    Ok(config)
}

/// Look for a configuration file in the working directory, then the user config directory
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("abstract-api-mcp").join("config.toml"))
        .filter(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_http_config() {
        let http = HttpConfig::default();
        assert_eq!(http.timeout(), Duration::from_secs(30));
        assert_eq!(http.long_timeout(), Duration::from_secs(60));
        assert_eq!(http.connect_timeout(), Duration::from_secs(10));
        assert!(http.base_url.is_none());
    }

    #[test]
    fn test_api_keys_lookup() {
        let keys = ApiKeys {
            company: Some("company-key".to_string()),
            ..ApiKeys::empty()
        };
        assert_eq!(keys.get(ServiceKey::Company), Some("company-key"));
        assert_eq!(keys.get(ServiceKey::Email), None);
    }

    #[test]
    fn test_api_keys_debug_hides_values() {
        let keys = ApiKeys {
            scrape: Some("do-not-print".to_string()),
            ..ApiKeys::empty()
        };
        let debug = format!("{:?}", keys);
        assert!(debug.contains("scrape"));
        assert!(!debug.contains("do-not-print"));
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(
            br#"
[api_keys]
holidays = "holiday-key"

[http]
timeout_secs = 5
base_url = "http://localhost:9999"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.http.long_timeout_secs, 60);
        assert_eq!(
            config.http.base_url.as_deref(),
            Some("http://localhost:9999")
        );
        // Env may add more keys, but the file's holiday key survives unless overridden
        assert!(config.api_keys.get(ServiceKey::Holidays).is_some());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config(Path::new("/nonexistent/abstract-api-mcp.toml"));
        assert!(result.is_err());
    }
}
