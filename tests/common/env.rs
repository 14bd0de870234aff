//! Environment variable helpers for tests.
#![allow(dead_code)]

use env_lock::{EnvGuard as LockedEnvGuard, lock_env};
use tracing::{instrument, trace};

/// RAII guard to restore environment variables on drop.
pub struct EnvGuard<'a> {
    _guard: LockedEnvGuard<'a>,
}

impl<'a> EnvGuard<'a> {
    #[must_use]
    #[instrument]
    pub fn set(key: &'a str, value: &str) -> Self {
        trace!(key, value, "Setting env var");
        let guard = lock_env([(key, Some(value))]);
        Self { _guard: guard }
    }

    /// Sets and removes several variables under one lock.
    #[must_use]
    pub fn apply(vars: &[(&'a str, Option<&str>)]) -> Self {
        let guard = lock_env(vars.iter().copied());
        Self { _guard: guard }
    }
}

#[must_use]
pub fn with_rtheme_env(db: &str, user: Option<&str>) -> EnvGuard<'static> {
    EnvGuard::apply(&[("RTHEME_DB", Some(db)), ("RTHEME_USER", user)])
}
