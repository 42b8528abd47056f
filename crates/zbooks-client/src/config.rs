//! Client configuration.

use std::time::Duration;

/// Configuration for [`ApiClient`](crate::ApiClient).
///
/// Configuration precedence for the base URL:
/// 1. Explicit `with_base_url`
/// 2. `ZBOOKS_API_URL` environment variable (via [`ClientConfig::from_env`])
/// 3. Default (`http://localhost:8000/api`)
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the ZBooks API, without a trailing slash.
    pub base_url: String,

    /// Transport timeout applied to every request.
    pub timeout: Duration,

    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: concat!("zbooks-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Default configuration with the `ZBOOKS_API_URL` override applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("ZBOOKS_API_URL") {
            if !url.trim().is_empty() {
                config.base_url = url;
            }
        }
        config
    }

    /// Set the API base URL. A trailing slash is stripped so endpoint paths
    /// can always start with `/`.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let url = base_url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Set the transport timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
