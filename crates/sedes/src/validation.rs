//! Payload validation for sede create/update requests.

use corporativo_core::ValidationErrors;
use corporativo_core::validation::Validator;

use crate::sede::{CreateSedeRequest, UpdateSedeRequest};

pub fn validate_create_sede(req: &CreateSedeRequest) -> ValidationErrors {
    let mut v = Validator::new();
    v.required_non_blank(req.empresa_id.as_deref(), "ID de empresa es requerido")
        .required_min_len(
            req.nombre.as_deref(),
            2,
            "Nombre es requerido y debe tener al menos 2 caracteres",
        )
        .required_min_len(
            req.direccion.as_deref(),
            5,
            "Dirección es requerida y debe tener al menos 5 caracteres",
        );
    v.finish()
}

pub fn validate_update_sede(req: &UpdateSedeRequest) -> ValidationErrors {
    let mut v = Validator::new();
    v.optional_min_len(req.nombre.as_deref(), 2, "Nombre debe tener al menos 2 caracteres")
        .optional_min_len(req.direccion.as_deref(), 5, "Dirección debe tener al menos 5 caracteres");
    v.finish()
}
