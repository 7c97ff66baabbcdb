//! HTTP client utilities.

use reqwest::{header, Client};
use std::sync::Arc;

use crate::config::HttpConfig;

/// Default User-Agent sent upstream
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client with sensible defaults.
///
/// Wraps one reqwest connection pool. Clones share the pool, and the pool is
/// released when the last clone is dropped.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Build a client from the HTTP configuration
    pub fn from_config(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .user_agent(config.user_agent.as_deref().unwrap_or(USER_AGENT))
            .default_headers(headers)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Get the underlying client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_format() {
        assert!(USER_AGENT.starts_with("abstract-api-mcp/"));
    }

    #[test]
    fn test_from_config_shares_pool() {
        let http = HttpClient::from_config(&HttpConfig::default()).unwrap();
        let clone = http.clone();
        assert!(Arc::ptr_eq(&http.client, &clone.client));
    }
}
