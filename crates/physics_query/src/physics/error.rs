//! Query facade errors

use super::backend::BackendError;
use std::fmt;
use thiserror::Error;

/// Errors returned by the query facade
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// Facade is not in a state that allows the operation
    #[error("Invalid state: {0}")]
    InvalidState(&'static str),

    /// Native allocation failed
    #[error("Native resources exhausted ({capacity} live handles)")]
    ResourceExhausted {
        /// Backend handle capacity that was hit
        capacity: usize,
    },

    /// Caller passed an unusable argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Backend failure not covered above
    #[error("Backend error: {0}")]
    Backend(BackendError),
}

impl From<BackendError> for QueryError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::OutOfHandles { capacity } => Self::ResourceExhausted { capacity },
            BackendError::UnknownBody => Self::InvalidArgument("unknown rigid body".to_string()),
            other => Self::Backend(other),
        }
    }
}

/// Failed `initialize`: the cause plus the world the caller handed in
///
/// Like `std::sync::mpsc::SendError`, the value is returned rather than dropped.
pub struct InitError<B> {
    error: QueryError,
    world: B,
}

impl<B> InitError<B> {
    pub(crate) fn new(error: QueryError, world: B) -> Self {
        Self { error, world }
    }

    /// Cause of the failure
    pub fn error(&self) -> &QueryError {
        &self.error
    }

    /// Take the world back
    pub fn into_world(self) -> B {
        self.world
    }

    /// Drop the world and keep the cause
    pub fn into_error(self) -> QueryError {
        self.error
    }
}

impl<B> fmt::Debug for InitError<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitError").field("error", &self.error).finish_non_exhaustive()
    }
}

impl<B> fmt::Display for InitError<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Initialization failed: {}", self.error)
    }
}

impl<B> std::error::Error for InitError<B> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
