//! Dispatch errors.

use thiserror::Error;

use crate::history::{BoxError, CacheError};

/// Errors surfaced by [`Router::process`](super::Router::process).
#[derive(Debug, Error)]
pub enum RouterError {
    /// No handler is registered for the subject. Callers should log and drop
    /// the message rather than treat this as fatal.
    #[error("handler not found for subject {subject:?}")]
    NotFound { subject: String },

    /// The history cache failed; the handler was not invoked.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Whatever the handler returned, passed through untouched.
    #[error(transparent)]
    Handler(BoxError),
}

impl RouterError {
    /// Wrap a handler failure.
    pub fn handler(err: impl Into<BoxError>) -> Self {
        RouterError::Handler(err.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RouterError::NotFound { .. })
    }
}
