// crates/liars-dice-harness/src/config/mod.rs
// ============================================================================
// Module: Harness Configuration
// Description: Centralized configuration for Liar's Dice test runs.
// Purpose: Provide typed access to target server settings and load defaults.
// Dependencies: std, thiserror, url
// ============================================================================

//! ## Overview
//! Run configuration is an explicit [`HarnessConfig`] value handed to the
//! client, the suite runner, and the load harness. Environment variables can
//! override defaults through [`EnvOverrides`]; the configuration is never
//! mutated once a run starts.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;
mod harness;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod harness_tests;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::EnvOverrides;
pub use env::HarnessEnv;
pub use env::read_env_strict;
pub use harness::ConfigError;
pub use harness::DEFAULT_OUTPUT_DIR;
pub use harness::DEFAULT_REQUEST_TIMEOUT;
pub use harness::DEFAULT_SERVER_PORT;
pub use harness::HarnessConfig;
pub use harness::LoadSettings;
