//! Payload validation for empresa create/update requests.

use corporativo_core::ValidationErrors;
use corporativo_core::validation::Validator;

use crate::empresa::{CreateEmpresaRequest, UpdateEmpresaRequest};

/// Validate a create payload; messages come back in field order.
pub fn validate_create_empresa(req: &CreateEmpresaRequest) -> ValidationErrors {
    let mut v = Validator::new();
    v.required_ruc(req.ruc.as_deref(), "RUC es requerido y debe tener 11 dígitos")
        .required_min_len(
            req.nombre.as_deref(),
            2,
            "Nombre es requerido y debe tener al menos 2 caracteres",
        )
        .required_min_len(
            req.razon_social.as_deref(),
            2,
            "Razón social es requerida y debe tener al menos 2 caracteres",
        )
        .required_min_len(
            req.direccion.as_deref(),
            5,
            "Dirección es requerida y debe tener al menos 5 caracteres",
        )
        .optional_email(req.email.as_deref(), "Email debe tener un formato válido");
    v.finish()
}

/// Validate only the fields present in an update payload.
pub fn validate_update_empresa(req: &UpdateEmpresaRequest) -> ValidationErrors {
    let mut v = Validator::new();
    v.optional_min_len(req.nombre.as_deref(), 2, "Nombre debe tener al menos 2 caracteres")
        .optional_min_len(
            req.razon_social.as_deref(),
            2,
            "Razón social debe tener al menos 2 caracteres",
        )
        .optional_min_len(req.direccion.as_deref(), 5, "Dirección debe tener al menos 5 caracteres")
        .optional_email(req.email.as_deref(), "Email debe tener un formato válido");
    v.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn valid_create() -> CreateEmpresaRequest {
        CreateEmpresaRequest {
            ruc: Some("20100070970".to_string()),
            nombre: Some("Acme".to_string()),
            razon_social: Some("Acme S.A.".to_string()),
            direccion: Some("Av. Central 123".to_string()),
            telefono: Some("+51 1 555 0000".to_string()),
            email: Some("contacto@acme.pe".to_string()),
        }
    }

    #[test]
    fn valid_create_payload_has_no_errors() {
        assert!(validate_create_empresa(&valid_create()).is_empty());
    }

    #[test]
    fn empty_create_payload_reports_every_required_field_in_order() {
        let errs = validate_create_empresa(&CreateEmpresaRequest::default());
        assert_eq!(
            errs.messages(),
            [
                "RUC es requerido y debe tener 11 dígitos",
                "Nombre es requerido y debe tener al menos 2 caracteres",
                "Razón social es requerida y debe tener al menos 2 caracteres",
                "Dirección es requerida y debe tener al menos 5 caracteres",
            ]
        );
    }

    #[test]
    fn create_rejects_malformed_ruc_and_email() {
        let mut req = valid_create();
        req.ruc = Some("123".to_string());
        req.email = Some("no-es-email".to_string());
        let errs = validate_create_empresa(&req);
        assert_eq!(
            errs.messages(),
            ["RUC es requerido y debe tener 11 dígitos", "Email debe tener un formato válido"]
        );
    }

    #[test]
    fn create_accepts_empty_email() {
        let mut req = valid_create();
        req.email = Some(String::new());
        assert!(validate_create_empresa(&req).is_empty());
    }

    #[test]
    fn create_trims_before_measuring() {
        let mut req = valid_create();
        req.nombre = Some("  A  ".to_string());
        req.direccion = Some("  Av 1   ".to_string());
        let errs = validate_create_empresa(&req);
        assert_eq!(errs.len(), 2);
    }

    #[test]
    fn update_only_checks_present_fields() {
        assert!(validate_update_empresa(&UpdateEmpresaRequest::default()).is_empty());

        let req = UpdateEmpresaRequest {
            direccion: Some("Av".to_string()),
            email: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(
            validate_update_empresa(&req).messages(),
            ["Dirección debe tener al menos 5 caracteres"]
        );
    }

    proptest! {
        #[test]
        fn update_with_long_enough_fields_is_valid(
            nombre in "[A-Za-z]{2,30}",
            direccion in "[A-Za-z0-9 ]{0,10}[A-Za-z]{5,20}",
        ) {
            let req = UpdateEmpresaRequest {
                nombre: Some(nombre),
                direccion: Some(direccion),
                ..Default::default()
            };
            prop_assert!(validate_update_empresa(&req).is_empty());
        }
    }
}
