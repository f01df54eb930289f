// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for Liar's Dice system-tests.
// Purpose: Provide the game server stub and artifact utilities.
// Dependencies: system-tests, liars-dice-harness
// ============================================================================

//! ## Overview
//! Shared helpers for Liar's Dice system-tests.
//! Invariants:
//! - Every test talks to its own stub server on a loopback port.
//! - Every test writes its report under its own run root.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod artifacts;
pub mod game_server_stub;
