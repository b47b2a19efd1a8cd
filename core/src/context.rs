//! Cancellation and deadlines for a single call.
//!
//! # Design
//! A `Context` is a `CancellationToken` plus an optional deadline. Contexts
//! form a tree: a child ends whenever its parent ends, and may carry a
//! tighter deadline of its own. `Context::run` races a future against the
//! context and drops the future as soon as the context ends, which is how an
//! in-flight round trip gives its connection back.
//!
//! Deadlines are timed by Tokio, so calls with a deadline must run on a Tokio
//! runtime with the time driver enabled.

use std::future::Future;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::error::ApiError;

/// Why a context ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    Canceled,
    DeadlineExceeded,
}

impl From<ContextError> for ApiError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::Canceled => ApiError::Canceled,
            ContextError::DeadlineExceeded => ApiError::Timeout,
        }
    }
}

/// Cancellation scope passed to every client call.
#[derive(Debug, Clone)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

/// Cancels the context it was created with, and all of that context's
/// children.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

impl Context {
    /// A context that never ends.
    pub fn background() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// A context that ends when the returned handle is canceled.
    pub fn with_cancel() -> (Self, CancelHandle) {
        Self::background().child_with_cancel()
    }

    /// A context that ends `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().child_with_timeout(timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// A context that ends when `self` ends.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// A child that can also be canceled on its own.
    pub fn child_with_cancel(&self) -> (Self, CancelHandle) {
        let child = self.child();
        let handle = CancelHandle {
            token: child.token.clone(),
        };
        (child, handle)
    }

    /// A child whose deadline is the earlier of the parent's and
    /// `timeout` from now.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let mut child = self.child();
        // An overflowing deadline is as good as none.
        if let Some(own) = Instant::now().checked_add(timeout) {
            child.deadline = Some(match self.deadline {
                Some(parent) => parent.min(own),
                None => own,
            });
        }
        child
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, zero once it has passed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// `Some` once the context has ended. Cancellation is reported ahead of
    /// an elapsed deadline.
    pub fn err(&self) -> Option<ContextError> {
        if self.token.is_cancelled() {
            return Some(ContextError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves when the context ends.
    pub async fn done(&self) -> ContextError {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => ContextError::Canceled,
                    _ = tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)) => {
                        ContextError::DeadlineExceeded
                    }
                }
            }
            None => {
                self.token.cancelled().await;
                ContextError::Canceled
            }
        }
    }

    /// Drive `fut` to completion unless the context ends first, in which
    /// case `fut` is dropped unfinished.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, ContextError>
    where
        F: Future,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }
        tokio::select! {
            biased;
            err = self.done() => Err(err),
            out = fut => Ok(out),
        }
    }
}
