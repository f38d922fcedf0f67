use std::sync::Arc;

use corporativo_infra::config::{Settings, StoreSettings};
use corporativo_infra::record_store::{InMemoryRecordStore, PostgresRecordStore, RecordStore, StoreError};
use corporativo_infra::services::{EmpresaService, SedeService};

/// Shared record store handle; one per process.
pub type SharedStore = Arc<dyn RecordStore>;

/// Services shared by every handler.
#[derive(Clone)]
pub struct AppServices {
    pub empresas: EmpresaService<SharedStore>,
    pub sedes: SedeService<SharedStore>,
}

impl AppServices {
    pub fn new(store: SharedStore) -> Self {
        Self {
            empresas: EmpresaService::new(store.clone()),
            sedes: SedeService::new(store),
        }
    }

    /// Services over a fresh in-memory store (dev/tests).
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryRecordStore::new()))
    }
}

/// Select and open the record store described by `settings`.
pub async fn build_services(settings: &Settings) -> Result<AppServices, StoreError> {
    let store: SharedStore = match &settings.store {
        StoreSettings::InMemory => {
            tracing::info!("using in-memory record store");
            Arc::new(InMemoryRecordStore::new())
        }
        StoreSettings::Postgres(db) => {
            tracing::info!(
                empresas = %settings.tables.empresas,
                sedes = %settings.tables.sedes,
                "using postgres record store"
            );
            let store = PostgresRecordStore::connect(db, settings.tables.clone()).await?;
            store.ensure_schema().await?;
            Arc::new(store)
        }
    };
    Ok(AppServices::new(store))
}
