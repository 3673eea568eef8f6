//! Cooperative cancellation shared across stream combinators, cells, and
//! the convergence orchestrator.
//!
//! Every async operation that might run for a while checks the token at
//! each yield point rather than being forcibly aborted — an in-flight
//! emission always completes once started.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

/// Errors raised when a stream combinator observes cancellation.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum StreamError {
    #[error("stream cancelled")]
    Cancelled,
}

/// A cooperative cancellation token.
///
/// The caller sets the token; the callee checks it between emissions.
/// Cancellation mid-emission has no effect until the next check point.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// `Err(StreamError::Cancelled)` if cancellation has been requested.
    pub fn check(&self) -> Result<(), StreamError> {
        if self.is_cancelled() {
            Err(StreamError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_starts_uncancelled() {
        assert!(!CancellationToken::new().is_cancelled());
    }

    #[test]
    fn cancel_sets_token() {
        let token = CancellationToken::new();
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn cloned_token_shares_state() {
        let token = CancellationToken::new();
        let clone = token.clone();
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
