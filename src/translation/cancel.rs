//! Cooperative cancellation for translation runs.
//!
//! A [`CancellationToken`] is checked at chunk boundaries, before retries and
//! before each language group. In-flight provider calls are never interrupted;
//! their results are discarded once the token is observed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cloneable, thread-safe cancellation signal.
///
/// Clones share state. A token created with [`child_token`](Self::child_token)
/// is cancelled when its parent is, but cancelling the child leaves the parent
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<CancellationInner>,
}

#[derive(Debug, Default)]
struct CancellationInner {
    cancelled: AtomicBool,
    parent: Option<CancellationToken>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
            || self
                .inner
                .parent
                .as_ref()
                .is_some_and(Self::is_cancelled)
    }

    pub fn child_token(&self) -> Self {
        Self {
            inner: Arc::new(CancellationInner {
                cancelled: AtomicBool::new(false),
                parent: Some(self.clone()),
            }),
        }
    }
}
