//! Cancellation and deadline token passed to every blocking operation.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::SqlFacadeError;

/// Caller-supplied cancellation/deadline token.
///
/// Cloning a `Context` yields a handle to the *same* token; use [`Context::with_cancel`],
/// [`Context::with_timeout`] or [`Context::with_deadline`] to derive a child that can be
/// cancelled (or can expire) without affecting its parent. Cancelling a parent cancels every
/// child derived from it.
///
/// ```rust
/// use std::time::Duration;
/// use sql_facade::Context;
///
/// let root = Context::new();
/// let request = root.with_timeout(Duration::from_secs(5));
/// assert!(request.deadline().is_some());
///
/// root.cancel();
/// assert!(request.err().is_some_and(|e| e.is_canceled()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never done until [`Context::cancel`] is called.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Child context that can be cancelled independently of `self`.
    #[must_use]
    pub fn with_cancel(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Child context that expires after `timeout` (or earlier, if `self` expires first).
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Child context that expires at `deadline` (or earlier, if `self` expires first).
    #[must_use]
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// Cancel this context and every context derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The underlying token, for wiring into other cancellation-aware code.
    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Why this context is done, or `None` while it is still live.
    ///
    /// Explicit cancellation wins over an expired deadline.
    #[must_use]
    pub fn err(&self) -> Option<SqlFacadeError> {
        if self.token.is_cancelled() {
            return Some(SqlFacadeError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(SqlFacadeError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    () = self.token.cancelled() => {}
                    () = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }

    /// Drive a native future to completion unless this context finishes first.
    ///
    /// A context that is already done never polls `fut`. Otherwise the native future is
    /// dropped as soon as the context finishes; sqlx futures release their resources on drop.
    pub(crate) async fn run<T, F>(&self, fut: F) -> Result<T, SqlFacadeError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }
        tokio::select! {
            biased;
            () = self.done() => Err(self.err().unwrap_or(SqlFacadeError::Canceled)),
            res = fut => res.map_err(SqlFacadeError::from),
        }
    }
}

impl From<CancellationToken> for Context {
    fn from(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }
}
