// crates/liars-dice-harness/src/config/harness.rs
// ============================================================================
// Module: Harness Config Types
// Description: Typed run configuration for the Liar's Dice harness.
// Purpose: Resolve the target server address and carry load-test settings.
// Dependencies: std, thiserror, url
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::load::LoadRun;
use crate::load::Thresholds;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Port used when the server URL does not carry one.
pub const DEFAULT_SERVER_PORT: u16 = 8080;
/// Directory receiving run reports when none is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "results";
/// Per-request timeout applied by the HTTP client.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of concurrent load workers.
const DEFAULT_LOAD_WORKERS: usize = 20;
/// Default number of games each load worker creates.
const DEFAULT_GAMES_PER_WORKER: usize = 500;
/// Players requested for every load-test game.
const DEFAULT_LOAD_PLAYERS: u32 = 5;
/// Dice requested for every load-test game.
const DEFAULT_LOAD_DICE: u32 = 5;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment value was missing, malformed, or out of range.
    #[error("{0}")]
    Env(String),
    /// The server URL could not be parsed.
    #[error("invalid server url {url}: {reason}")]
    InvalidServerUrl {
        /// URL as configured.
        url: String,
        /// Parser failure.
        reason: String,
    },
    /// The server URL has no host component.
    #[error("server url {0} has no host")]
    MissingHost(String),
    /// No server URL was provided by flags or environment.
    #[error("a server url is required")]
    MissingServerUrl,
}

// ============================================================================
// SECTION: Load Settings
// ============================================================================

/// Settings for the concurrent game-creation scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSettings {
    /// Number of concurrent workers.
    pub workers: usize,
    /// Games created sequentially by each worker.
    pub games_per_worker: usize,
    /// `numPlayers` sent with every create call.
    pub players: u32,
    /// `numDice` sent with every create call.
    pub dice: u32,
    /// Maximum acceptable latency of any single call.
    pub per_call_max: Duration,
    /// Maximum acceptable mean latency.
    pub average_max: Duration,
    /// Hard bound on a single call; expiry counts as a call error.
    pub per_call_timeout: Duration,
}

impl Default for LoadSettings {
    fn default() -> Self {
        let thresholds = Thresholds::default();
        Self {
            workers: DEFAULT_LOAD_WORKERS,
            games_per_worker: DEFAULT_GAMES_PER_WORKER,
            players: DEFAULT_LOAD_PLAYERS,
            dice: DEFAULT_LOAD_DICE,
            per_call_max: thresholds.per_call_max,
            average_max: thresholds.average_max,
            per_call_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl LoadSettings {
    /// Builds the load run described by these settings.
    #[must_use]
    pub const fn load_run(&self) -> LoadRun {
        LoadRun {
            worker_count: self.workers,
            operations_per_worker: self.games_per_worker,
            thresholds: Thresholds {
                per_call_max: self.per_call_max,
                average_max: self.average_max,
            },
            per_call_timeout: self.per_call_timeout,
        }
    }
}

// ============================================================================
// SECTION: Harness Config
// ============================================================================

/// Run configuration shared by the client, the suite, and the load harness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Server under test, with or without scheme and port.
    pub server_url: String,
    /// Port used when `server_url` carries none.
    pub server_port: u16,
    /// Accept invalid TLS certificates.
    pub skip_ssl_verification: bool,
    /// Directory receiving run reports.
    pub output_directory: PathBuf,
    /// Per-request timeout applied by the HTTP client.
    pub request_timeout: Duration,
    /// Execute scenarios known to crash the reference server.
    pub run_known_crashes: bool,
    /// Concurrent creation settings.
    pub load: LoadSettings,
}

impl HarnessConfig {
    /// Creates a configuration targeting `server_url` with default settings.
    #[must_use]
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            server_port: DEFAULT_SERVER_PORT,
            skip_ssl_verification: false,
            output_directory: PathBuf::from(DEFAULT_OUTPUT_DIR),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            run_known_crashes: false,
            load: LoadSettings::default(),
        }
    }

    /// Sets the per-request timeout for the HTTP client and the load harness.
    pub const fn set_request_timeout(&mut self, timeout: Duration) {
        self.request_timeout = timeout;
        self.load.per_call_timeout = timeout;
    }

    /// Resolves `scheme://host:port/` for the server under test.
    ///
    /// A bare host gets the `http` scheme. The port embedded in the URL wins
    /// over [`HarnessConfig::server_port`]. Paths and queries are dropped so
    /// only the configured server is ever contacted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the URL is empty, unparsable, or hostless.
    pub fn connection_string(&self) -> Result<Url, ConfigError> {
        let trimmed = self.server_url.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::MissingServerUrl);
        }
        let raw = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("http://{trimmed}")
        };
        let parsed = Url::parse(&raw).map_err(|err| ConfigError::InvalidServerUrl {
            url: self.server_url.clone(),
            reason: err.to_string(),
        })?;
        let host = parsed
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| ConfigError::MissingHost(self.server_url.clone()))?;
        let port = parsed.port().unwrap_or(self.server_port);
        let base = format!("{}://{host}:{port}/", parsed.scheme());
        Url::parse(&base).map_err(|err| ConfigError::InvalidServerUrl {
            url: self.server_url.clone(),
            reason: err.to_string(),
        })
    }
}
