// ctail - app/cancel.rs
//
// Cooperative cancellation. The token wraps an `Arc<AtomicBool>` that a
// signal handler sets; the engine and the session loop check it at every
// poll boundary and during sleeps, which are sliced into
// `CANCEL_CHECK_INTERVAL_MS` steps.

use crate::util::constants::CANCEL_CHECK_INTERVAL_MS;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Shared cancel flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Safe to call from any thread, any number of times.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Sleep for `duration`, waking early on cancellation.
    ///
    /// Returns `true` if the token was cancelled before or during the sleep.
    pub fn sleep(&self, duration: Duration) -> bool {
        let slice = Duration::from_millis(CANCEL_CHECK_INTERVAL_MS);
        let mut remaining = duration;
        while !remaining.is_zero() {
            if self.is_cancelled() {
                return true;
            }
            let step = remaining.min(slice);
            std::thread::sleep(step);
            remaining -= step;
        }
        self.is_cancelled()
    }
}
