use thiserror::Error;

/// Errors surfaced by the facade.
///
/// Everything the native driver reports arrives unchanged in [`SqlFacadeError::Driver`]:
/// the variant is transparent, so `Display` and `source()` are the driver's own and callers
/// can match on the inner [`sqlx::Error`] exactly as they would without the facade.
/// The remaining variants originate from the caller's [`Context`](crate::Context) or from
/// misuse of a [`Rows`](crate::Rows) cursor, never from reinterpreting a driver error.
#[derive(Debug, Error)]
pub enum SqlFacadeError {
    #[error(transparent)]
    Driver(#[from] sqlx::Error),

    #[error("context canceled")]
    Canceled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,

    #[error("scan called without a current row; call advance() first")]
    NoCurrentRow,
}

impl SqlFacadeError {
    /// Borrow the native driver error, if this is one.
    #[must_use]
    pub fn as_driver(&self) -> Option<&sqlx::Error> {
        match self {
            Self::Driver(err) => Some(err),
            _ => None,
        }
    }

    /// Take ownership of the native driver error, if this is one.
    ///
    /// # Errors
    /// Hands `self` back unchanged when it did not come from the driver.
    pub fn into_driver(self) -> Result<sqlx::Error, Self> {
        match self {
            Self::Driver(err) => Ok(err),
            other => Err(other),
        }
    }

    #[must_use]
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }

    #[must_use]
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, Self::DeadlineExceeded)
    }
}
