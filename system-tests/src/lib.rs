// system-tests/src/lib.rs
// ============================================================================
// Module: Sitestack System Tests Library
// Description: Shared configuration for the static website system tests.
// Purpose: Provide typed run settings for the feature-gated test binaries.
// Dependencies: sitestack-harness
// ============================================================================

//! ## Overview
//! This crate hosts the configuration shared by the system-test binaries in
//! `system-tests/tests`. Every scenario there provisions the static website
//! module against a local cloud emulator and always tears down.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
