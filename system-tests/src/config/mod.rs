// system-tests/src/config/mod.rs
// ============================================================================
// Module: System Test Configuration
// Description: Centralized configuration for the static website system tests.
// Purpose: Provide typed access to test environment settings and defaults.
// Dependencies: sitestack-harness
// ============================================================================

//! ## Overview
//! System-test configuration is read from environment variables once per test
//! and mapped into a small typed structure. Scenarios receive explicit values
//! from it and never read or write the process environment themselves.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::SystemTestConfig;
pub use env::SystemTestEnv;
pub use env::read_env_strict;
