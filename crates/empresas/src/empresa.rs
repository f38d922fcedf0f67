use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use corporativo_core::{EmpresaId, Entity, ValidationErrors};

use crate::validation::{validate_create_empresa, validate_update_empresa};

/// Persisted company record (wire layout is camelCase).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Empresa {
    pub id: EmpresaId,
    /// Tax identifier; unique across active and inactive records.
    pub ruc: String,
    pub nombre: String,
    pub razon_social: String,
    pub direccion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub activo: bool,
    pub fecha_creacion: DateTime<Utc>,
    pub fecha_actualizacion: DateTime<Utc>,
}

impl Entity for Empresa {
    type Id = EmpresaId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn is_active(&self) -> bool {
        self.activo
    }
}

/// Inbound create payload.
///
/// Every field is optional at the serde level so that a missing field is
/// reported as a validation message rather than a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateEmpresaRequest {
    pub ruc: Option<String>,
    pub nombre: Option<String>,
    pub razon_social: Option<String>,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
}

impl CreateEmpresaRequest {
    /// Validate and turn the payload into a [`NewEmpresa`].
    pub fn validate(self) -> Result<NewEmpresa, ValidationErrors> {
        validate_create_empresa(&self).into_result()?;
        Ok(NewEmpresa {
            ruc: self.ruc.unwrap_or_default(),
            nombre: self.nombre.unwrap_or_default(),
            razon_social: self.razon_social.unwrap_or_default(),
            direccion: self.direccion.unwrap_or_default(),
            telefono: self.telefono,
            email: self.email,
        })
    }
}

/// A validated create payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmpresa {
    pub ruc: String,
    pub nombre: String,
    pub razon_social: String,
    pub direccion: String,
    pub telefono: Option<String>,
    pub email: Option<String>,
}

impl NewEmpresa {
    /// Materialize the record: active, with both timestamps set to `now`.
    pub fn into_empresa(self, id: EmpresaId, now: DateTime<Utc>) -> Empresa {
        Empresa {
            id,
            ruc: self.ruc,
            nombre: self.nombre,
            razon_social: self.razon_social,
            direccion: self.direccion,
            telefono: self.telefono,
            email: self.email,
            activo: true,
            fecha_creacion: now,
            fecha_actualizacion: now,
        }
    }
}

/// Inbound partial update payload. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateEmpresaRequest {
    pub nombre: Option<String>,
    pub razon_social: Option<String>,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub activo: Option<bool>,
}

impl UpdateEmpresaRequest {
    /// Validate the present fields and turn the payload into an [`EmpresaPatch`].
    pub fn validate(self) -> Result<EmpresaPatch, ValidationErrors> {
        validate_update_empresa(&self).into_result()?;
        Ok(EmpresaPatch {
            nombre: self.nombre,
            razon_social: self.razon_social,
            direccion: self.direccion,
            telefono: self.telefono,
            email: self.email,
            activo: self.activo,
        })
    }
}

/// Business-field changes for an empresa.
///
/// Serializes to exactly the present fields (camelCase), which is the shape
/// the record store merges into the stored record. `fechaActualizacion` is not
/// part of the patch: it is refreshed by the service on every write and does
/// not count as a change on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmpresaPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub razon_social: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activo: Option<bool>,
}

impl EmpresaPatch {
    pub fn is_empty(&self) -> bool {
        self.field_names().is_empty()
    }

    /// Wire names of the fields this patch changes.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.nombre.is_some() {
            names.push("nombre");
        }
        if self.razon_social.is_some() {
            names.push("razonSocial");
        }
        if self.direccion.is_some() {
            names.push("direccion");
        }
        if self.telefono.is_some() {
            names.push("telefono");
        }
        if self.email.is_some() {
            names.push("email");
        }
        if self.activo.is_some() {
            names.push("activo");
        }
        names
    }
}
