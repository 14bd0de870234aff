//! Common test utilities for the theme CLI.
//!
//! - `cli`: CLI runner with output verification and fluent assertions
//! - `env`: Locked environment variable overrides
//! - `fixtures`: Stores, services, and themes for integration tests
#![allow(dead_code)]

pub mod cli;
pub mod env;

use tracing_subscriber::EnvFilter;

pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
