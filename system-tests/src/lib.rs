// system-tests/src/lib.rs
// ============================================================================
// Module: Liar's Dice System Tests Library
// Description: Shared configuration for system test binaries.
// Purpose: Provide common settings for the end-to-end suites.
// Dependencies: std
// ============================================================================

//! ## Overview
//! This crate hosts shared configuration used by the end-to-end test
//! binaries in `system-tests/tests`, which run the scenario suite and the
//! load harness against an in-process stub of the game server.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
