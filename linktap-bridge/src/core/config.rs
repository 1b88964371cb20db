use std::time::Duration;

use linktap_client::config::DEFAULT_BASE_URL;
use linktap_client::ClientConfig;

use super::error::{BridgeError, BridgeResult};

/// Bridge configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | LINKTAP_API_URL | https://www.link-tap.com/ | LinkTap service address |
/// | LINKTAP_USERNAME | (required) | account user |
/// | LINKTAP_API_KEY | (required) | account API key |
/// | LINKTAP_RESTORE_MODE | true | restore previous mode after manual watering |
/// | LINKTAP_DEBUG | 0 | debug verbosity bitmask |
/// | LINKTAP_HEARTBEAT_SECS | 15 | host heartbeat period |
/// | LINKTAP_REQUEST_TIMEOUT_SECS | 30 | HTTP timeout |
/// | LINKTAP_DEVICES_FILE | (unset) | device table of the stand-alone host |
/// | LOG_DIR | (unset) | directory for rolling log files |
///
/// # Example
///
/// ```ignore
/// LINKTAP_USERNAME=alice LINKTAP_API_KEY=... LINKTAP_DEBUG=2 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub username: String,
    pub api_key: String,
    /// Return to the previous watering mode after a manual mode.
    /// Declared for the host UI; no bridge behavior depends on it yet.
    pub restore_previous_mode: bool,
    /// Debug verbosity bitmask (0, 1, 2, 4, 8, 16 and their sums)
    pub debug_level: u32,
    pub heartbeat_secs: u64,
    pub request_timeout_secs: u64,
    pub devices_file: Option<String>,
    pub log_dir: Option<String>,
}

impl Config {
    /// Configuration with defaults for everything but the credentials
    pub fn new(username: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            username: username.into(),
            api_key: api_key.into(),
            restore_previous_mode: true,
            debug_level: 0,
            heartbeat_secs: 15,
            request_timeout_secs: 30,
            devices_file: None,
            log_dir: None,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> BridgeResult<Self> {
        let username = required_var("LINKTAP_USERNAME")?;
        let api_key = required_var("LINKTAP_API_KEY")?;
        let defaults = Self::new(username, api_key);

        Ok(Self {
            api_url: std::env::var("LINKTAP_API_URL").unwrap_or(defaults.api_url),
            restore_previous_mode: parsed_var("LINKTAP_RESTORE_MODE")
                .unwrap_or(defaults.restore_previous_mode),
            debug_level: parsed_var("LINKTAP_DEBUG").unwrap_or(defaults.debug_level),
            heartbeat_secs: parsed_var("LINKTAP_HEARTBEAT_SECS")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.heartbeat_secs),
            request_timeout_secs: parsed_var("LINKTAP_REQUEST_TIMEOUT_SECS")
                .unwrap_or(defaults.request_timeout_secs),
            devices_file: std::env::var("LINKTAP_DEVICES_FILE").ok(),
            log_dir: std::env::var("LOG_DIR").ok(),
            ..defaults
        })
    }

    pub fn heartbeat(&self) -> Duration {
        Duration::from_secs(self.heartbeat_secs.max(1))
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.api_url, &self.username, &self.api_key)
            .with_timeout(self.request_timeout_secs)
    }

    /// Log filter for the debug verbosity bitmask
    ///
    /// `0` logs at info, the plugin/device bits (2, 4, 8) at debug, the
    /// connection bit (16) or the framework-all value (1) at trace.
    pub fn log_level(&self) -> &'static str {
        match self.debug_level {
            0 => "info",
            mask if mask == 1 || mask & 16 != 0 => "trace",
            _ => "debug",
        }
    }
}

fn required_var(name: &str) -> BridgeResult<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| BridgeError::Config(format!("{name} is not set")))
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
