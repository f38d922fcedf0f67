//! Sede service.
//!
//! ## Principal write path
//!
//! At most one active sede per empresa holds `isPrincipal = true`. A create or
//! update that claims the principal slot first demotes every other active
//! principal of the empresa (one write each), then performs its own write.
//! Nothing spans the writes: if the main write fails after a demotion, the
//! empresa is left without a principal. That outcome is logged at `error` with
//! the demoted ids and surfaced as an internal failure; no compensation is
//! attempted.

use chrono::{DateTime, Utc};
use corporativo_core::{EmpresaId, Entity, SedeId, clock};
use corporativo_empresas::Empresa;
use corporativo_sedes::{CreateSedeRequest, Sede, UpdateSedeRequest};
use tracing::{error, info, instrument};

use super::empresas::MSG_EMPTY_UPDATE;
use super::{ListParams, ListResponse, ServiceError, decode, encode, touched};
use crate::record_store::{Collection, FieldChanges, Filter, Index, PageRequest, RecordStore, StoreError};

pub const MSG_NOT_FOUND: &str = "Sede no encontrada";
pub const MSG_EMPRESA_UNAVAILABLE: &str = "Empresa no encontrada o inactiva";

/// Branch lifecycle, including the single-active-principal rule.
#[derive(Debug, Clone)]
pub struct SedeService<S> {
    store: S,
}

impl<S: RecordStore> SedeService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Create an active sede under an active empresa.
    #[instrument(skip_all, fields(empresa_id = req.empresa_id.as_deref().unwrap_or_default()))]
    pub async fn create(&self, req: CreateSedeRequest) -> Result<Sede, ServiceError> {
        let new = req.validate()?;

        let empresa: Empresa = self
            .store
            .get(Collection::Empresas, new.empresa_id.as_str())
            .await?
            .map(decode)
            .transpose()?
            .ok_or_else(|| ServiceError::not_found(MSG_EMPRESA_UNAVAILABLE))?;
        empresa.ensure_active(MSG_EMPRESA_UNAVAILABLE)?;

        let now = clock::now();
        let demoted = if new.is_principal {
            self.demote_principals(&new.empresa_id, None, now).await?
        } else {
            Vec::new()
        };

        let sede = new.into_sede(SedeId::generate(), now);
        let record = encode(&sede)?;
        if let Err(e) = self.store.put(Collection::Sedes, record).await {
            report_principal_gap(&sede.empresa_id, &demoted, &e);
            return Err(e.into());
        }
        info!(sede_id = %sede.id, is_principal = sede.is_principal, "sede created");
        Ok(sede)
    }

    /// Fetch by id, active or not.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Sede, ServiceError> {
        self.store
            .get(Collection::Sedes, id)
            .await?
            .map(decode)
            .transpose()?
            .ok_or_else(|| ServiceError::not_found(MSG_NOT_FOUND))
    }

    /// Active sedes across all empresas.
    #[instrument(skip_all, fields(limit = ?params.limit))]
    pub async fn list(&self, params: ListParams) -> Result<ListResponse<Sede>, ServiceError> {
        let page = self
            .store
            .scan(Collection::Sedes, &Filter::active(), params.page_request())
            .await?;
        ListResponse::from_page(page)
    }

    /// Active sedes of one empresa.
    ///
    /// The empresa itself is not looked up: an unknown id yields an empty page.
    #[instrument(skip(self, params), fields(limit = ?params.limit))]
    pub async fn list_by_empresa(
        &self,
        empresa_id: &str,
        params: ListParams,
    ) -> Result<ListResponse<Sede>, ServiceError> {
        let page = self
            .store
            .query(
                Index::SedeByEmpresaId,
                &Filter::eq("empresaId", empresa_id),
                Some(&Filter::active()),
                params.page_request(),
            )
            .await?;
        ListResponse::from_page(page)
    }

    /// Apply the present fields and refresh `fechaActualizacion`.
    ///
    /// A patch that claims the principal slot demotes the sibling principal(s)
    /// before the sede itself is written.
    #[instrument(skip(self, req))]
    pub async fn update(&self, id: &str, req: UpdateSedeRequest) -> Result<Sede, ServiceError> {
        let patch = req.validate()?;
        let current = self.get(id).await?;

        if patch.is_empty() {
            return Err(ServiceError::bad_request(MSG_EMPTY_UPDATE));
        }

        let now = clock::now();
        let demoted = if current.is_promoted_by(&patch) {
            self.demote_principals(&current.empresa_id, Some(&current.id), now)
                .await?
        } else {
            Vec::new()
        };

        let changes = touched(FieldChanges::from_patch(&patch)?, now);
        let updated = match self
            .store
            .update_fields(Collection::Sedes, current.id.as_str(), changes)
            .await
        {
            Ok(doc) => doc,
            Err(e) => {
                report_principal_gap(&current.empresa_id, &demoted, &e);
                return Err(e.into());
            }
        };
        info!(fields = ?patch.field_names(), "sede updated");
        decode(updated)
    }

    /// Mark the sede inactive. Deleting the principal leaves the empresa
    /// without one until another sede is promoted.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let current = self.get(id).await?;
        let changes = touched(FieldChanges::new().set("activo", false), clock::now());
        self.store
            .update_fields(Collection::Sedes, current.id.as_str(), changes)
            .await?;
        info!(was_principal = current.is_principal, "sede soft-deleted");
        Ok(())
    }

    /// Clear the principal flag on every active principal of `empresa_id`
    /// other than `keep`, returning the ids that were demoted.
    async fn demote_principals(
        &self,
        empresa_id: &EmpresaId,
        keep: Option<&SedeId>,
        now: DateTime<Utc>,
    ) -> Result<Vec<SedeId>, ServiceError> {
        let principals = self
            .store
            .query(
                Index::SedeByEmpresaPrincipal,
                &Filter::eq("empresaId", empresa_id.as_str()).and("isPrincipal", true),
                Some(&Filter::active()),
                PageRequest::unbounded(),
            )
            .await?;

        let mut demoted = Vec::new();
        for doc in principals.items {
            let sede: Sede = decode(doc)?;
            if Some(&sede.id) == keep {
                continue;
            }
            let changes = touched(FieldChanges::new().set("isPrincipal", false), now);
            if let Err(e) = self
                .store
                .update_fields(Collection::Sedes, sede.id.as_str(), changes)
                .await
            {
                report_principal_gap(empresa_id, &demoted, &e);
                return Err(e.into());
            }
            info!(sede_id = %sede.id, "previous principal demoted");
            demoted.push(sede.id);
        }
        Ok(demoted)
    }
}

fn report_principal_gap(empresa_id: &EmpresaId, demoted: &[SedeId], err: &StoreError) {
    if demoted.is_empty() {
        return;
    }
    let demoted: Vec<&str> = demoted.iter().map(SedeId::as_str).collect();
    error!(
        empresa_id = %empresa_id,
        demoted = ?demoted,
        error = %err,
        "write failed after principal demotion; empresa has no active principal"
    );
}
