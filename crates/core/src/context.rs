//! Cancellation context carried into every store operation.
//!
//! A [`Context`] is a cheap, clonable handle. Cancelling a context cancels every
//! context derived from it via [`Context::child`], [`Context::with_timeout`] or
//! [`Context::with_deadline`]; cancelling a child leaves its parent untouched.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use thiserror::Error;

/// Why a context stopped.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CancelReason {
    /// `cancel()` was called on the context or one of its ancestors.
    Cancelled,
    /// The context's (or an ancestor's) deadline has passed.
    DeadlineExceeded,
}

impl core::fmt::Display for CancelReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CancelReason::Cancelled => f.write_str("context cancelled"),
            CancelReason::DeadlineExceeded => f.write_str("context deadline exceeded"),
        }
    }
}

/// Error returned when an operation observes a stopped context.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct Cancelled {
    pub reason: CancelReason,
}

impl Cancelled {
    pub fn reason(&self) -> CancelReason {
        self.reason
    }
}

#[derive(Debug, Default)]
struct ContextInner {
    cancelled: AtomicBool,
    deadline: Option<Instant>,
    parent: Option<Context>,
}

/// Cancellation and deadline signal for a unit of work.
#[derive(Debug, Clone, Default)]
pub struct Context {
    inner: Arc<ContextInner>,
}

impl Context {
    /// A root context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context that stops when either it or `self` stops.
    pub fn child(&self) -> Self {
        self.derive(None)
    }

    /// Derive a context that additionally stops at `deadline`.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        self.derive(Some(deadline))
    }

    /// Derive a context that additionally stops after `timeout` from now.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.derive(Some(Instant::now() + timeout))
    }

    fn derive(&self, deadline: Option<Instant>) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                cancelled: AtomicBool::new(false),
                deadline,
                parent: Some(self.clone()),
            }),
        }
    }

    /// Cancel this context (and, transitively, everything derived from it).
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
    }

    /// The earliest deadline along the ancestor chain, if any.
    pub fn deadline(&self) -> Option<Instant> {
        let own = self.inner.deadline;
        let inherited = self.inner.parent.as_ref().and_then(Context::deadline);
        match (own, inherited) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// The reason this context has stopped, or `None` while it is live.
    ///
    /// Explicit cancellation takes precedence over an expired deadline.
    pub fn err(&self) -> Option<Cancelled> {
        if self.is_cancelled() {
            return Some(Cancelled {
                reason: CancelReason::Cancelled,
            });
        }
        match self.deadline() {
            Some(deadline) if Instant::now() >= deadline => Some(Cancelled {
                reason: CancelReason::DeadlineExceeded,
            }),
            _ => None,
        }
    }

    /// `?`-friendly form of [`Context::err`].
    pub fn check(&self) -> Result<(), Cancelled> {
        match self.err() {
            Some(cancelled) => Err(cancelled),
            None => Ok(()),
        }
    }

    fn is_cancelled(&self) -> bool {
        let mut current = Some(self);
        while let Some(ctx) = current {
            if ctx.inner.cancelled.load(Ordering::Acquire) {
                return true;
            }
            current = ctx.inner.parent.as_ref();
        }
        false
    }
}
