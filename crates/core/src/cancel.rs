//! Cooperative cancellation for the query pipeline (§5's abort signal).
//!
//! A `CancellationToken` is a cheap, clonable handle shared between a caller
//! and every operator in an executor tree. The caller flips it with
//! `cancel()` from any thread; operators poll `is_canceled()` at the top of
//! `Init`/`Next` and return `Error::Canceled` once it fires. Checking this
//! more often than strictly necessary is always safe, just wasteful; the
//! configured check stride (`EngineConfig::cancel_check_stride`) exists to
//! bound that overhead for tight per-row loops, not to delay the check.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

/// A shared abort flag. Cloning shares the same underlying flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// A token that is never canceled unless `cancel()` is called on this
    /// handle or a clone of it.
    pub fn new() -> Self {
        Self { flag: Arc::new(AtomicBool::new(false)) }
    }

    /// Fires the abort signal. Visible to every clone of this token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// A row counter that fires a cancellation check only every `stride` calls,
/// so a tight per-row loop pays the atomic load once per `stride` rows
/// rather than once per row.
#[derive(Debug)]
pub struct CancelCheck {
    token: CancellationToken,
    stride: u32,
    counter: u32,
}

impl CancelCheck {
    pub fn new(token: CancellationToken, stride: u32) -> Self {
        Self { token, stride: stride.max(1), counter: 0 }
    }

    /// Call once per row (or per loop iteration). Returns `true` if this call
    /// landed on a check boundary and the token was canceled.
    pub fn tick(&mut self) -> bool {
        self.counter += 1;
        if self.counter >= self.stride {
            self.counter = 0;
            return self.token.is_canceled();
        }
        false
    }
}
