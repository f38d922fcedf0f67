use corporativo_core::{DomainError, ValidationErrors};
use thiserror::Error;

use crate::record_store::StoreError;

/// Failure of a service operation.
///
/// Business outcomes (validation, missing records, conflicts, rejected rules)
/// carry the caller-facing message. Everything else is internal.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Whether the failure is an internal one (storage or unexpected).
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Internal(_))
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(errors) => Self::Validation(errors),
            DomainError::NotFound(msg) => Self::NotFound(msg),
            DomainError::Conflict(msg) => Self::Conflict(msg),
            DomainError::BadRequest(msg) => Self::BadRequest(msg),
        }
    }
}
