use thiserror::Error;

use poultrybook_core::DomainError;

use crate::store::StoreError;

pub type EngineResult<T> = Result<T, EngineError>;

/// Failure of a bookkeeping operation as seen by the caller.
///
/// Nothing is retried: a store failure in the middle of a multi-step
/// sequence surfaces here unchanged.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Input rejected before any store call.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A mutating or loading call was made without a signed-in user.
    #[error("sign-in required")]
    AuthRequired,

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DomainError> for EngineError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg)
            | DomainError::InvariantViolation(msg)
            | DomainError::InvalidId(msg) => EngineError::Validation(msg),
            DomainError::NotFound(what) => EngineError::NotFound(what),
        }
    }
}
