//! Sede (branch) domain module.
//!
//! A sede belongs to exactly one empresa. Among the active sedes of an
//! empresa at most one is the principal branch; this crate models the
//! records and their lifecycle, the services enforce the cross-record rule.

pub mod sede;
pub mod validation;

pub use sede::{CreateSedeRequest, NewSede, Sede, SedePatch, SedeState, UpdateSedeRequest};
pub use validation::{validate_create_sede, validate_update_sede};
