//! Domain error model.

use serde::Serialize;
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Ordered list of human-readable validation messages.
///
/// Displays as the messages joined with `", "`, which is the form returned to
/// API callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, msg: impl Into<String>) {
        self.0.push(msg.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }

    pub fn into_messages(self) -> Vec<String> {
        self.0
    }

    /// `Ok(())` when no message was collected.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<Vec<String>> for ValidationErrors {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

impl core::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// business rules, conflicts). Storage failures belong to the infra layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// One or more payload fields failed validation.
    #[error("{0}")]
    Validation(ValidationErrors),

    /// A referenced record does not exist (or is not usable).
    #[error("{0}")]
    NotFound(String),

    /// A uniqueness rule would be broken (e.g. duplicate RUC).
    #[error("{0}")]
    Conflict(String),

    /// The request is well-formed but a business rule rejects it.
    #[error("{0}")]
    BadRequest(String),
}

impl DomainError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_display_joined_in_order() {
        let mut errs = ValidationErrors::new();
        errs.push("first");
        errs.push("second");
        assert_eq!(errs.to_string(), "first, second");
        assert_eq!(DomainError::from(errs).to_string(), "first, second");
    }

    #[test]
    fn empty_validation_errors_is_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
        let errs = ValidationErrors::from(vec!["x".to_string()]);
        assert_eq!(errs.into_result().unwrap_err().len(), 1);
    }
}
