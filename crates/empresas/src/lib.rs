//! Empresa (company) domain module.
//!
//! Records, request payloads and their validation, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod empresa;
pub mod validation;

pub use empresa::{CreateEmpresaRequest, Empresa, EmpresaPatch, NewEmpresa, UpdateEmpresaRequest};
pub use validation::{validate_create_empresa, validate_update_empresa};
