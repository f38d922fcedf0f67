use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// One persisted record in its wire (camelCase) layout.
pub type Document = serde_json::Map<String, JsonValue>;

/// Primary key attribute shared by both collections.
pub const ID_ATTRIBUTE: &str = "id";

/// Logical collection of records.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Empresas,
    Sedes,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Empresas => "empresas",
            Collection::Sedes => "sedes",
        }
    }
}

impl core::fmt::Display for Collection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Secondary indexes available for [`RecordStore::query`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Index {
    /// Empresas by `ruc`.
    EmpresaByRuc,
    /// Sedes by `empresaId`.
    SedeByEmpresaId,
    /// Sedes by (`empresaId`, `isPrincipal`).
    SedeByEmpresaPrincipal,
}

impl Index {
    pub fn name(&self) -> &'static str {
        match self {
            Index::EmpresaByRuc => "RUC-index",
            Index::SedeByEmpresaId => "EmpresaId-index",
            Index::SedeByEmpresaPrincipal => "EmpresaId-IsPrincipal-index",
        }
    }

    pub fn collection(&self) -> Collection {
        match self {
            Index::EmpresaByRuc => Collection::Empresas,
            Index::SedeByEmpresaId | Index::SedeByEmpresaPrincipal => Collection::Sedes,
        }
    }

    pub fn key_attributes(&self) -> &'static [&'static str] {
        match self {
            Index::EmpresaByRuc => &["ruc"],
            Index::SedeByEmpresaId => &["empresaId"],
            Index::SedeByEmpresaPrincipal => &["empresaId", "isPrincipal"],
        }
    }

    /// A key condition must constrain exactly the index key attributes.
    pub fn check_key(&self, key: &Filter) -> Result<(), StoreError> {
        let expected = self.key_attributes();
        let same = key.len() == expected.len() && expected.iter().all(|a| key.constrains(a));
        if same {
            Ok(())
        } else {
            Err(StoreError::InvalidKeyCondition {
                index: self.name(),
                reason: format!(
                    "expected equality on {:?}, got {:?}",
                    expected,
                    key.attributes().collect::<Vec<_>>()
                ),
            })
        }
    }
}

/// Conjunction of attribute equality conditions.
///
/// Used both as an index key condition and as a post-read filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Filter(Document);

impl Filter {
    /// Filter that matches every record.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(attribute: &str, value: impl Into<JsonValue>) -> Self {
        Self::all().and(attribute, value)
    }

    pub fn and(mut self, attribute: &str, value: impl Into<JsonValue>) -> Self {
        self.0.insert(attribute.to_string(), value.into());
        self
    }

    /// Only active records (`activo = true`).
    pub fn active() -> Self {
        Self::eq("activo", true)
    }

    pub fn matches(&self, record: &Document) -> bool {
        self.0.iter().all(|(attr, expected)| record.get(attr) == Some(expected))
    }

    pub fn constrains(&self, attribute: &str) -> bool {
        self.0.contains_key(attribute)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_document(&self) -> &Document {
        &self.0
    }
}

/// Attribute values to set on an existing record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldChanges(Document);

impl FieldChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Changes taken from a typed patch that serializes to its present fields.
    pub fn from_patch<P: Serialize>(patch: &P) -> Result<Self, StoreError> {
        match serde_json::to_value(patch) {
            Ok(JsonValue::Object(map)) => Ok(Self(map)),
            Ok(other) => Err(StoreError::InvalidDocument(format!(
                "patch must serialize to an object, got {other}"
            ))),
            Err(e) => Err(StoreError::InvalidDocument(e.to_string())),
        }
    }

    pub fn set(mut self, attribute: &str, value: impl Into<JsonValue>) -> Self {
        self.0.insert(attribute.to_string(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn as_document(&self) -> &Document {
        &self.0
    }

    pub fn into_document(self) -> Document {
        self.0
    }

    /// The primary key is immutable.
    pub(crate) fn check_mutable(&self) -> Result<(), StoreError> {
        if self.0.contains_key(ID_ATTRIBUTE) {
            return Err(StoreError::InvalidDocument("the id attribute cannot be changed".to_string()));
        }
        Ok(())
    }
}

/// Opaque continuation token: the key attributes of the last evaluated record.
///
/// This is a key structure, never a page number. Callers echo it back as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(Document);

impl Cursor {
    /// Cursor pointing at `record`, carrying its id plus the given key attributes.
    pub fn after(record: &Document, key_attributes: &[&str]) -> Self {
        let mut key = Document::new();
        for attr in std::iter::once(&ID_ATTRIBUTE).chain(key_attributes) {
            if let Some(v) = record.get(*attr) {
                key.insert((*attr).to_string(), v.clone());
            }
        }
        Self(key)
    }

    /// Parse the JSON text a caller sent back (already URL-decoded).
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let value: JsonValue =
            serde_json::from_str(raw).map_err(|e| StoreError::InvalidCursor(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: JsonValue) -> Result<Self, StoreError> {
        match value {
            JsonValue::Object(map) if map.get(ID_ATTRIBUTE).is_some_and(JsonValue::is_string) => {
                Ok(Self(map))
            }
            _ => Err(StoreError::InvalidCursor("expected an object with a string id".to_string())),
        }
    }

    /// Id of the last evaluated record; evaluation resumes strictly after it.
    pub fn id(&self) -> &str {
        self.0.get(ID_ATTRIBUTE).and_then(JsonValue::as_str).unwrap_or_default()
    }

    /// JSON text form, suitable for the `lastEvaluatedKey` query parameter.
    pub fn to_json_string(&self) -> String {
        JsonValue::Object(self.0.clone()).to_string()
    }

    pub fn as_document(&self) -> &Document {
        &self.0
    }
}

/// Page bounds for scans and index queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageRequest {
    /// Maximum number of records to *evaluate* (before filtering); `None` reads to the end.
    pub limit: Option<u32>,
    pub cursor: Option<Cursor>,
}

impl PageRequest {
    pub fn new(limit: u32, cursor: Option<Cursor>) -> Self {
        Self {
            limit: Some(limit),
            cursor,
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }
}

/// One page of results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Document>,
    /// Number of items returned (after filtering).
    pub count: usize,
    /// Present when evaluation stopped at the limit and more records remain.
    pub last_evaluated_key: Option<Cursor>,
}

impl Page {
    pub fn new(items: Vec<Document>, last_evaluated_key: Option<Cursor>) -> Self {
        Self {
            count: items.len(),
            items,
            last_evaluated_key,
        }
    }
}

/// Record store operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid key condition for {index}: {reason}")]
    InvalidKeyCondition { index: &'static str, reason: String },

    #[error("record {collection}/{id} does not exist")]
    NotFound { collection: Collection, id: String },

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("invalid cursor: {0}")]
    InvalidCursor(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// The `id` of a document about to be written.
pub(crate) fn document_id(record: &Document) -> Result<&str, StoreError> {
    record
        .get(ID_ATTRIBUTE)
        .and_then(JsonValue::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| StoreError::InvalidDocument("record needs a non-empty string id".to_string()))
}

/// Gateway over the record collections.
///
/// All reads and writes are single-record; there is no multi-record
/// atomicity. Callers composing read-check-write sequences get no isolation.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch one record by primary key.
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError>;

    /// Records whose index key equals `key`, optionally narrowed by `filter`.
    async fn query(
        &self,
        index: Index,
        key: &Filter,
        filter: Option<&Filter>,
        page: PageRequest,
    ) -> Result<Page, StoreError>;

    /// All records of a collection matching `filter`, in pages.
    async fn scan(
        &self,
        collection: Collection,
        filter: &Filter,
        page: PageRequest,
    ) -> Result<Page, StoreError>;

    /// Insert or replace a whole record.
    async fn put(&self, collection: Collection, record: Document) -> Result<(), StoreError>;

    /// Set attributes on an existing record and return the full updated record.
    async fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        changes: FieldChanges,
    ) -> Result<Document, StoreError>;
}

#[async_trait::async_trait]
impl<S> RecordStore for Arc<S>
where
    S: RecordStore + ?Sized,
{
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        (**self).get(collection, id).await
    }

    async fn query(
        &self,
        index: Index,
        key: &Filter,
        filter: Option<&Filter>,
        page: PageRequest,
    ) -> Result<Page, StoreError> {
        (**self).query(index, key, filter, page).await
    }

    async fn scan(
        &self,
        collection: Collection,
        filter: &Filter,
        page: PageRequest,
    ) -> Result<Page, StoreError> {
        (**self).scan(collection, filter, page).await
    }

    async fn put(&self, collection: Collection, record: Document) -> Result<(), StoreError> {
        (**self).put(collection, record).await
    }

    async fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        changes: FieldChanges,
    ) -> Result<Document, StoreError> {
        (**self).update_fields(collection, id, changes).await
    }
}
