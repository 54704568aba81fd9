//! Service error types.

use thiserror::Error;

use crate::tournament::TournamentError;

/// Errors returned through a [`TournamentHandle`](super::TournamentHandle)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The actor stopped and no longer accepts messages
    #[error("Tournament service is closed")]
    Closed,

    /// The engine refused the operation
    #[error(transparent)]
    Rejected(#[from] TournamentError),
}

impl ServiceError {
    /// Message for a toast, without internal ids
    pub fn client_message(&self) -> String {
        match self {
            ServiceError::Closed => self.to_string(),
            ServiceError::Rejected(e) => e.client_message(),
        }
    }
}

/// Result type for service calls
pub type ServiceResult<T> = Result<T, ServiceError>;
