// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for the static website system-tests.
// Purpose: Provide emulator fixtures, scenario definitions, and artifact utilities.
// Dependencies: system-tests, sitestack-harness
// ============================================================================

//! ## Overview
//! Shared helpers for the static website system-tests.
//! Invariants:
//! - Every scenario gets its own state, plan, and tool data directory.
//! - Helpers never mutate the process environment.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod artifacts;
pub mod infra;
pub mod logging;
pub mod readiness;
pub mod scenarios;
