use corporativo_core::{EmpresaId, clock};
use corporativo_empresas::{CreateEmpresaRequest, Empresa, UpdateEmpresaRequest};
use tracing::{info, instrument, warn};

use super::{ListParams, ListResponse, ServiceError, decode, encode, touched};
use crate::record_store::{Collection, FieldChanges, Filter, Index, PageRequest, RecordStore};

pub const MSG_NOT_FOUND: &str = "Empresa no encontrada";
pub const MSG_DUPLICATE_RUC: &str = "Ya existe una empresa con este RUC";
pub const MSG_HAS_ACTIVE_SEDES: &str = "No se puede eliminar la empresa porque tiene sedes activas";
pub const MSG_EMPTY_UPDATE: &str = "Debe proporcionar al menos un campo para actualizar";

/// Company lifecycle: create, read, list, partial update, soft delete.
#[derive(Debug, Clone)]
pub struct EmpresaService<S> {
    store: S,
}

impl<S: RecordStore> EmpresaService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Create an active empresa.
    ///
    /// The RUC must not belong to any stored empresa, active or not.
    #[instrument(skip_all, fields(ruc = req.ruc.as_deref().unwrap_or_default()))]
    pub async fn create(&self, req: CreateEmpresaRequest) -> Result<Empresa, ServiceError> {
        let new = req.validate()?;

        let existing = self
            .store
            .query(
                Index::EmpresaByRuc,
                &Filter::eq("ruc", new.ruc.as_str()),
                None,
                PageRequest::new(1, None),
            )
            .await?;
        if existing.count > 0 {
            warn!("duplicate ruc rejected");
            return Err(ServiceError::conflict(MSG_DUPLICATE_RUC));
        }

        let empresa = new.into_empresa(EmpresaId::generate(), clock::now());
        self.store.put(Collection::Empresas, encode(&empresa)?).await?;
        info!(empresa_id = %empresa.id, "empresa created");
        Ok(empresa)
    }

    /// Fetch by id, active or not.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Empresa, ServiceError> {
        self.find(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(MSG_NOT_FOUND))
    }

    /// Active empresas, one page at a time.
    #[instrument(skip_all, fields(limit = ?params.limit))]
    pub async fn list(&self, params: ListParams) -> Result<ListResponse<Empresa>, ServiceError> {
        let page = self
            .store
            .scan(Collection::Empresas, &Filter::active(), params.page_request())
            .await?;
        ListResponse::from_page(page)
    }

    /// Apply the present fields and refresh `fechaActualizacion`.
    ///
    /// The timestamp refresh alone is not an update: a payload without any
    /// business field is rejected.
    #[instrument(skip(self, req))]
    pub async fn update(&self, id: &str, req: UpdateEmpresaRequest) -> Result<Empresa, ServiceError> {
        let patch = req.validate()?;
        let current = self.get(id).await?;

        if patch.is_empty() {
            return Err(ServiceError::bad_request(MSG_EMPTY_UPDATE));
        }

        let changes = touched(FieldChanges::from_patch(&patch)?, clock::now());
        let updated = self
            .store
            .update_fields(Collection::Empresas, current.id.as_str(), changes)
            .await?;
        info!(fields = ?patch.field_names(), "empresa updated");
        decode(updated)
    }

    /// Mark the empresa inactive.
    ///
    /// Refused while any active sede still references it.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let current = self.get(id).await?;

        let active_sedes = self
            .store
            .query(
                Index::SedeByEmpresaId,
                &Filter::eq("empresaId", current.id.as_str()),
                Some(&Filter::active()),
                PageRequest::unbounded(),
            )
            .await?;
        if active_sedes.count > 0 {
            warn!(active_sedes = active_sedes.count, "empresa delete refused");
            return Err(ServiceError::bad_request(MSG_HAS_ACTIVE_SEDES));
        }

        let changes = touched(FieldChanges::new().set("activo", false), clock::now());
        self.store
            .update_fields(Collection::Empresas, current.id.as_str(), changes)
            .await?;
        info!("empresa soft-deleted");
        Ok(())
    }

    async fn find(&self, id: &str) -> Result<Option<Empresa>, ServiceError> {
        self.store
            .get(Collection::Empresas, id)
            .await?
            .map(decode)
            .transpose()
    }
}
