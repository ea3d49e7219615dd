//! Test utilities shared across crate-level unit tests.

use std::sync::{LazyLock, Mutex, MutexGuard};

static ENV_MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Serializes tests that depend on `PIWIK_TRACKER_ENV` or on warning
/// emission. Process environment is shared across the test harness threads.
pub fn env_guard() -> MutexGuard<'static, ()> {
    ENV_MUTEX.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
