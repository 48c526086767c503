//! Client settings.
//!
//! Layered lowest to highest: built-in defaults, an optional TOML file,
//! `NETPULSE_*` environment variables, then command-line flags (applied by
//! the binary after loading).
//!
//! ```toml
//! daemon_url = "http://10.0.0.5:7331"
//! stale_after_ms = 8000
//! log_file = "/tmp/netpulse-dash.log"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::control::{DEFAULT_API_PREFIX, DEFAULT_ENDPOINT};
use crate::transport::ReconnectPolicy;

pub const ENV_PREFIX: &str = "NETPULSE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// HTTP origin of the daemon.
    pub daemon_url: String,
    pub stream_path: String,
    pub api_prefix: String,
    pub reconnect_initial_ms: u64,
    pub reconnect_max_ms: u64,
    pub request_timeout_ms: u64,
    /// A target whose newest sample is older than this is flagged stale.
    pub stale_after_ms: u64,
    /// Redraw and drain interval of the dashboard.
    pub tick_ms: u64,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Where the dashboard writes logs. Unset discards them in TUI mode.
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            daemon_url: DEFAULT_ENDPOINT.to_string(),
            stream_path: "/ws".to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            reconnect_initial_ms: 1000,
            reconnect_max_ms: 30_000,
            request_timeout_ms: 5000,
            stale_after_ms: 5000,
            tick_ms: 100,
            log_level: "netpulse_dash=info".to_string(),
            log_file: None,
        }
    }
}

impl Settings {
    /// Load defaults, then `path` if given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy::from_millis(self.reconnect_initial_ms, self.reconnect_max_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(10))
    }
}
