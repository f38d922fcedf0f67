//! `corporativo-core`: shared building blocks for the empresa/sede directory.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod clock;
pub mod entity;
pub mod error;
pub mod id;
pub mod validation;

pub use entity::Entity;
pub use error::{DomainError, DomainResult, ValidationErrors};
pub use id::{EmpresaId, SedeId};
