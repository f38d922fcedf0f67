//! Empresa and Sede services.
//!
//! Each service owns a record store handle passed in at construction. Every
//! operation is a short sequence of single-record reads and writes awaited in
//! order; cross-record rules (RUC uniqueness, one active principal per
//! empresa) are read-check-write and carry no isolation.

pub mod empresas;
pub mod error;
pub mod sedes;

pub use empresas::EmpresaService;
pub use error::ServiceError;
pub use sedes::SedeService;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::record_store::{Cursor, Document, FieldChanges, Page, PageRequest, StoreError};

pub const DEFAULT_PAGE_LIMIT: u32 = 50;
pub const MAX_PAGE_LIMIT: u32 = 1000;

pub(crate) const FECHA_ACTUALIZACION: &str = "fechaActualizacion";

/// Paging parameters of a list operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListParams {
    pub limit: Option<u32>,
    pub cursor: Option<Cursor>,
}

impl ListParams {
    /// Page request with the limit defaulted and clamped to `1..=MAX_PAGE_LIMIT`.
    pub fn page_request(self) -> PageRequest {
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT);
        PageRequest::new(limit, self.cursor)
    }
}

/// One page of typed records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_evaluated_key: Option<Cursor>,
}

impl<T: DeserializeOwned> ListResponse<T> {
    pub(crate) fn from_page(page: Page) -> Result<Self, ServiceError> {
        let items = page
            .items
            .into_iter()
            .map(decode)
            .collect::<Result<Vec<T>, _>>()?;
        Ok(Self {
            count: items.len(),
            items,
            last_evaluated_key: page.last_evaluated_key,
        })
    }
}

pub(crate) fn decode<T: DeserializeOwned>(doc: Document) -> Result<T, ServiceError> {
    serde_json::from_value(JsonValue::Object(doc))
        .map_err(|e| StoreError::InvalidDocument(e.to_string()).into())
}

pub(crate) fn encode<T: Serialize>(record: &T) -> Result<Document, ServiceError> {
    match serde_json::to_value(record) {
        Ok(JsonValue::Object(map)) => Ok(map),
        Ok(other) => Err(ServiceError::Internal(format!("record encoded as non-object: {other}"))),
        Err(e) => Err(ServiceError::Internal(e.to_string())),
    }
}

/// Refresh `fechaActualizacion` alongside `changes`.
pub(crate) fn touched(changes: FieldChanges, now: DateTime<Utc>) -> FieldChanges {
    changes.set(
        FECHA_ACTUALIZACION,
        now.to_rfc3339_opts(SecondsFormat::AutoSi, true),
    )
}
