//! Client configuration

use std::fmt;

/// Default LinkTap service address
pub const DEFAULT_BASE_URL: &str = "https://www.link-tap.com/";

/// Account credentials attached to every API call
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub api_key: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            api_key: api_key.into(),
        }
    }

    /// API key with everything but the last four characters hidden
    ///
    /// Keys of four characters or fewer are hidden entirely.
    pub fn masked_key(&self) -> String {
        if self.api_key.chars().count() <= 4 {
            return "****".to_string();
        }
        let visible: String = self
            .api_key
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("****{visible}")
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("api_key", &self.masked_key())
            .finish()
    }
}

/// Client configuration for connecting to the LinkTap API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service base URL (e.g., "https://www.link-tap.com/")
    pub base_url: String,

    /// Account credentials
    pub credentials: Credentials,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            credentials: Credentials::new(username, api_key),
            timeout: 30,
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// API root: the base URL with `api/` appended
    pub fn api_url(&self) -> String {
        let base = self.base_url.trim();
        if base.ends_with('/') {
            format!("{base}api/")
        } else {
            format!("{base}/api/")
        }
    }

    /// Create an HTTP client from this configuration
    pub fn build_http_client(&self) -> crate::ClientResult<crate::HttpClient> {
        crate::HttpClient::new(self)
    }
}
