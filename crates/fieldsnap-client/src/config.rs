//! Client configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the client can start with
//! zero configuration for local development.

use std::time::Duration;

use fieldsnap_shared::constants::{DEFAULT_HIGH_ACCURACY, DEFAULT_LOCATION_TIMEOUT_MS};

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the authentication server.
    /// Env: `FIELDSNAP_SERVER_URL`
    /// Default: `http://127.0.0.1:8080`
    pub server_url: String,

    /// Geolocation acquisition timeout.
    /// Env: `FIELDSNAP_LOCATION_TIMEOUT_MS`
    /// Default: `5000`
    pub location_timeout: Duration,

    /// Whether to request a high-accuracy fix.
    /// Env: `FIELDSNAP_HIGH_ACCURACY` (true/false)
    /// Default: `true`
    pub high_accuracy: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080".to_string(),
            location_timeout: Duration::from_millis(DEFAULT_LOCATION_TIMEOUT_MS),
            high_accuracy: DEFAULT_HIGH_ACCURACY,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("FIELDSNAP_SERVER_URL") {
            config.server_url = url;
        }

        if let Ok(val) = std::env::var("FIELDSNAP_LOCATION_TIMEOUT_MS") {
            if let Ok(ms) = val.parse::<u64>() {
                config.location_timeout = Duration::from_millis(ms);
            } else {
                tracing::warn!(
                    value = %val,
                    "Invalid FIELDSNAP_LOCATION_TIMEOUT_MS, using default"
                );
            }
        }

        if let Ok(val) = std::env::var("FIELDSNAP_HIGH_ACCURACY") {
            config.high_accuracy = val != "false" && val != "0";
        }

        config
    }
}
