use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use corporativo_core::{EmpresaId, Entity, SedeId, ValidationErrors};

use crate::validation::{validate_create_sede, validate_update_sede};

/// Persisted branch record (wire layout is camelCase).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sede {
    pub id: SedeId,
    /// Owning empresa. Integrity is checked by the services, not by storage.
    pub empresa_id: EmpresaId,
    pub nombre: String,
    pub direccion: String,
    pub is_principal: bool,
    pub activo: bool,
    pub fecha_creacion: DateTime<Utc>,
    pub fecha_actualizacion: DateTime<Utc>,
}

/// Lifecycle state of a sede.
///
/// ```text
/// {nonexistent} -> ActiveBranch <-> ActivePrincipal
///                        \               /
///                         `-> Inactive <'   (terminal for this system)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SedeState {
    ActivePrincipal,
    ActiveBranch,
    Inactive,
}

impl Sede {
    pub fn state(&self) -> SedeState {
        match (self.activo, self.is_principal) {
            (false, _) => SedeState::Inactive,
            (true, true) => SedeState::ActivePrincipal,
            (true, false) => SedeState::ActiveBranch,
        }
    }

    /// Whether applying `patch` claims the principal slot of the empresa.
    ///
    /// True when the patch flags a non-principal sede as principal, or when it
    /// reactivates a sede that keeps (or gains) the principal flag. A sede
    /// already flagged principal and active is not promoted again.
    pub fn is_promoted_by(&self, patch: &SedePatch) -> bool {
        let flagged = patch.is_principal == Some(true) && !self.is_principal;
        let reactivated = patch.activo == Some(true)
            && !self.activo
            && patch.is_principal.unwrap_or(self.is_principal);
        flagged || reactivated
    }
}

impl Entity for Sede {
    type Id = SedeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn is_active(&self) -> bool {
        self.activo
    }
}

/// Inbound create payload; see [`crate::validation`] for the rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateSedeRequest {
    pub empresa_id: Option<String>,
    pub nombre: Option<String>,
    pub direccion: Option<String>,
    pub is_principal: Option<bool>,
}

impl CreateSedeRequest {
    pub fn validate(self) -> Result<NewSede, ValidationErrors> {
        validate_create_sede(&self).into_result()?;
        Ok(NewSede {
            empresa_id: EmpresaId::from(self.empresa_id.unwrap_or_default()),
            nombre: self.nombre.unwrap_or_default(),
            direccion: self.direccion.unwrap_or_default(),
            is_principal: self.is_principal.unwrap_or(false),
        })
    }
}

/// A validated create payload. `is_principal` defaults to `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSede {
    pub empresa_id: EmpresaId,
    pub nombre: String,
    pub direccion: String,
    pub is_principal: bool,
}

impl NewSede {
    pub fn into_sede(self, id: SedeId, now: DateTime<Utc>) -> Sede {
        Sede {
            id,
            empresa_id: self.empresa_id,
            nombre: self.nombre,
            direccion: self.direccion,
            is_principal: self.is_principal,
            activo: true,
            fecha_creacion: now,
            fecha_actualizacion: now,
        }
    }
}

/// Inbound partial update payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateSedeRequest {
    pub nombre: Option<String>,
    pub direccion: Option<String>,
    pub is_principal: Option<bool>,
    pub activo: Option<bool>,
}

impl UpdateSedeRequest {
    pub fn validate(self) -> Result<SedePatch, ValidationErrors> {
        validate_update_sede(&self).into_result()?;
        Ok(SedePatch {
            nombre: self.nombre,
            direccion: self.direccion,
            is_principal: self.is_principal,
            activo: self.activo,
        })
    }
}

/// Business-field changes for a sede; serializes to the present fields only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SedePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_principal: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activo: Option<bool>,
}

impl SedePatch {
    pub fn is_empty(&self) -> bool {
        self.field_names().is_empty()
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        [
            ("nombre", self.nombre.is_some()),
            ("direccion", self.direccion.is_some()),
            ("isPrincipal", self.is_principal.is_some()),
            ("activo", self.activo.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corporativo_core::clock;
    use serde_json::json;

    fn new_sede(principal: Option<bool>) -> Sede {
        CreateSedeRequest {
            empresa_id: Some("emp-1".to_string()),
            nombre: Some("Sede Central".to_string()),
            direccion: Some("Av. Arequipa 1000".to_string()),
            is_principal: principal,
        }
        .validate()
        .unwrap()
        .into_sede(SedeId::generate(), clock::now())
    }

    #[test]
    fn is_principal_defaults_to_false() {
        let sede = new_sede(None);
        assert!(!sede.is_principal);
        assert_eq!(sede.state(), SedeState::ActiveBranch);
    }

    #[test]
    fn state_follows_flags() {
        let mut sede = new_sede(Some(true));
        assert_eq!(sede.state(), SedeState::ActivePrincipal);
        sede.activo = false;
        assert_eq!(sede.state(), SedeState::Inactive);
        sede.is_principal = false;
        assert_eq!(sede.state(), SedeState::Inactive);
    }

    #[test]
    fn promotion_only_when_not_already_principal() {
        let promote = SedePatch {
            is_principal: Some(true),
            ..Default::default()
        };
        assert!(new_sede(None).is_promoted_by(&promote));
        assert!(!new_sede(Some(true)).is_promoted_by(&promote));

        let demote = SedePatch {
            is_principal: Some(false),
            ..Default::default()
        };
        assert!(!new_sede(Some(true)).is_promoted_by(&demote));
        assert!(!new_sede(None).is_promoted_by(&SedePatch::default()));
    }

    #[test]
    fn reactivating_a_principal_is_a_promotion() {
        let mut sede = new_sede(Some(true));
        sede.activo = false;
        let reactivate = SedePatch {
            activo: Some(true),
            ..Default::default()
        };
        assert!(sede.is_promoted_by(&reactivate));

        let reactivate_as_branch = SedePatch {
            activo: Some(true),
            is_principal: Some(false),
            ..Default::default()
        };
        assert!(!sede.is_promoted_by(&reactivate_as_branch));
    }

    #[test]
    fn wire_layout_uses_empresa_id_and_is_principal() {
        let sede = new_sede(Some(true));
        let v = serde_json::to_value(&sede).unwrap();
        assert_eq!(v["empresaId"], json!("emp-1"));
        assert_eq!(v["isPrincipal"], json!(true));
        let back: Sede = serde_json::from_value(v).unwrap();
        assert_eq!(back, sede);
    }

    #[test]
    fn patch_field_names_and_shape() {
        let patch = UpdateSedeRequest {
            direccion: Some("Calle Los Olivos 12".to_string()),
            is_principal: Some(true),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(patch.field_names(), ["direccion", "isPrincipal"]);
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({ "direccion": "Calle Los Olivos 12", "isPrincipal": true })
        );
        assert!(UpdateSedeRequest::default().validate().unwrap().is_empty());
    }
}
