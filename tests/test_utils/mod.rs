//! Test Utilities and Mocks
//!
//! Shared fixtures for the integration, contract and unit test binaries.
//! Each binary includes this module with `#[path]`, so not every helper is
//! used everywhere.

#![allow(dead_code)]

pub mod fixtures;

// Re-exports for convenience
pub use fixtures::{create_test_config, recording_command, CallLog, TestHarness};
pub use mock_console::ChannelDriver;
