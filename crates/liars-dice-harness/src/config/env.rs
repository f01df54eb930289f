// crates/liars-dice-harness/src/config/env.rs
// ============================================================================
// Module: Harness Environment
// Description: Environment-backed overrides for harness configuration.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use super::ConfigError;
use super::HarnessConfig;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for harness configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessEnv {
    /// Server under test (host or URL).
    ServerUrl,
    /// Fallback port when the server URL carries none.
    ServerPort,
    /// Skip TLS certificate verification (`true`/`false` or `1`/`0`).
    SkipSsl,
    /// Directory receiving run reports.
    OutputDir,
    /// Per-request timeout in seconds (positive integer).
    TimeoutSeconds,
}

impl HarnessEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ServerUrl => "LIARS_DICE_TEST_SERVER_URL",
            Self::ServerPort => "LIARS_DICE_TEST_SERVER_PORT",
            Self::SkipSsl => "LIARS_DICE_TEST_SKIP_SSL",
            Self::OutputDir => "LIARS_DICE_TEST_OUTPUT_DIR",
            Self::TimeoutSeconds => "LIARS_DICE_TEST_TIMEOUT_SEC",
        }
    }
}

// ============================================================================
// SECTION: Overrides
// ============================================================================

/// Typed overrides derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnvOverrides {
    /// Optional server URL override.
    pub server_url: Option<String>,
    /// Optional server port override.
    pub server_port: Option<u16>,
    /// Optional TLS verification override.
    pub skip_ssl_verification: Option<bool>,
    /// Optional output directory override.
    pub output_directory: Option<PathBuf>,
    /// Optional per-request timeout override.
    pub request_timeout: Option<Duration>,
}

impl EnvOverrides {
    /// Loads overrides from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] when a value is not valid UTF-8, is empty,
    /// or fails validation (for example, an invalid port or boolean value).
    pub fn load() -> Result<Self, ConfigError> {
        let server_url = read_env_nonempty(HarnessEnv::ServerUrl.as_str())?;
        let server_port = read_env_nonempty(HarnessEnv::ServerPort.as_str())?
            .map(|value| parse_port(HarnessEnv::ServerPort.as_str(), &value))
            .transpose()?;
        let skip_ssl_verification = read_env_nonempty(HarnessEnv::SkipSsl.as_str())?
            .map(|value| parse_bool(HarnessEnv::SkipSsl.as_str(), &value))
            .transpose()?;
        let output_directory =
            read_env_nonempty(HarnessEnv::OutputDir.as_str())?.map(PathBuf::from);
        let request_timeout = read_env_nonempty(HarnessEnv::TimeoutSeconds.as_str())?
            .map(|value| parse_timeout_seconds(HarnessEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?;
        Ok(Self {
            server_url,
            server_port,
            skip_ssl_verification,
            output_directory,
            request_timeout,
        })
    }

    /// Applies the overrides that are set onto `config`.
    #[must_use]
    pub fn apply(&self, mut config: HarnessConfig) -> HarnessConfig {
        if let Some(server_url) = &self.server_url {
            config.server_url.clone_from(server_url);
        }
        if let Some(port) = self.server_port {
            config.server_port = port;
        }
        if let Some(skip) = self.skip_ssl_verification {
            config.skip_ssl_verification = skip;
        }
        if let Some(dir) = &self.output_directory {
            config.output_directory.clone_from(dir);
        }
        if let Some(timeout) = self.request_timeout {
            config.set_request_timeout(timeout);
        }
        config
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns [`ConfigError::Env`] when the variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, ConfigError> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string()
            .map(Some)
            .map_err(|_| ConfigError::Env(format!("{name} must be valid UTF-8")))
    })
}

/// Reads an environment variable and rejects empty values.
fn read_env_nonempty(name: &str) -> Result<Option<String>, ConfigError> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => {
            Err(ConfigError::Env(format!("{name} must not be empty")))
        }
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a non-zero TCP port.
fn parse_port(name: &str, raw: &str) -> Result<u16, ConfigError> {
    let port: u16 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env(format!("{name} must be a port number (1-65535)")))?;
    if port == 0 {
        return Err(ConfigError::Env(format!("{name} must be greater than zero")));
    }
    Ok(port)
}

/// Parses a positive timeout value expressed in whole seconds.
fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, ConfigError> {
    let secs: u64 = raw.trim().parse().map_err(|_| {
        ConfigError::Env(format!("{name} must be a positive integer number of seconds"))
    })?;
    if secs == 0 {
        return Err(ConfigError::Env(format!("{name} must be greater than zero")));
    }
    Ok(Duration::from_secs(secs))
}

/// Parses a boolean literal.
fn parse_bool(name: &str, raw: &str) -> Result<bool, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(ConfigError::Env(format!("{name} must be 1, 0, true, or false")))
}
