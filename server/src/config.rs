// Configuration knobs for the server process

use std::time::Duration;

/// Default local-only port of the wire protocol.
pub const DEFAULT_PORT: u16 = 59123;
/// Voice catalog location, relative to the working directory.
pub const DEFAULT_VOICES_MAP: &str = "models/voices.json";
/// Upper bound on an accepted request body.
pub const REQUEST_BODY_LIMIT: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub voices_map: String,
    pub request_timeout_secs: u64,
    /// Per-request tracing is off by default so stdout stays readable for an
    /// operator watching the process. Fatal diagnostics always log.
    pub request_logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            voices_map: DEFAULT_VOICES_MAP.to_string(),
            request_timeout_secs: 60,
            request_logging: false,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.port);

        let voices_map = std::env::var("VOICES_MAP").unwrap_or(defaults.voices_map);

        let request_timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.request_timeout_secs);

        let request_logging = std::env::var("REQUEST_LOGGING")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.request_logging);

        Self {
            port,
            voices_map,
            request_timeout_secs,
            request_logging,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
