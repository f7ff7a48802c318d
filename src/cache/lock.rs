use std::sync::{Mutex, MutexGuard};

use tracing::warn;

/// Lock `lock`, recovering the guard if a previous holder panicked.
pub(crate) fn mutex_lock<'a, T>(
    lock: &'a Mutex<T>,
    target: &'static str,
    op: &'static str,
) -> MutexGuard<'a, T> {
    match lock.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!(
                op,
                target_module = target,
                lock_kind = "mutex.lock",
                result = "poisoned_recovered",
                hint = "cached state may be stale after a panic in another task",
                "Recovered from poisoned cache lock"
            );
            poisoned.into_inner()
        }
    }
}
