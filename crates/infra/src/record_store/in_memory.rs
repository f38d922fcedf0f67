use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use super::r#trait::{
    Collection, Cursor, Document, FieldChanges, Filter, Index, Page, PageRequest, RecordStore,
    StoreError, document_id,
};

type Records = BTreeMap<String, Document>;

/// In-memory record store.
///
/// Intended for tests/dev. Records are kept per collection in id order, which
/// is also the evaluation order for scans and index queries.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    collections: RwLock<HashMap<Collection, Records>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records (active or not) in a collection.
    pub fn len(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .map(|c| c.get(&collection).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }

    fn read_page(
        &self,
        collection: Collection,
        candidate: &Filter,
        filter: Option<&Filter>,
        key_attributes: &[&str],
        page: &PageRequest,
    ) -> Result<Page, StoreError> {
        let collections = self.collections.read().map_err(|_| poisoned())?;
        let Some(records) = collections.get(&collection) else {
            return Ok(Page::default());
        };

        let start = page.cursor.as_ref().map(Cursor::id);
        let evaluated = records
            .iter()
            .filter(|(id, _)| start.is_none_or(|after| id.as_str() > after))
            .map(|(_, record)| record)
            .filter(|record| candidate.matches(record));

        Ok(paginate(evaluated, filter, key_attributes, page.limit))
    }
}

/// Evaluate up to `limit` candidates, then apply `filter`.
///
/// The cursor is only emitted when the limit cut evaluation short and at least
/// one more candidate exists.
fn paginate<'a>(
    mut candidates: impl Iterator<Item = &'a Document>,
    filter: Option<&Filter>,
    key_attributes: &[&str],
    limit: Option<u32>,
) -> Page {
    let mut items = Vec::new();
    let mut evaluated = 0usize;
    let mut last: Option<&Document> = None;

    while limit.is_none_or(|l| evaluated < l as usize) {
        let Some(record) = candidates.next() else {
            return Page::new(items, None);
        };
        evaluated += 1;
        last = Some(record);
        if filter.is_none_or(|f| f.matches(record)) {
            items.push(record.clone());
        }
    }

    let more = candidates.next().is_some();
    let cursor = last.filter(|_| more).map(|r| Cursor::after(r, key_attributes));
    Page::new(items, cursor)
}

fn poisoned() -> StoreError {
    StoreError::Backend("in-memory store lock poisoned".to_string())
}

#[async_trait::async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().map_err(|_| poisoned())?;
        Ok(collections.get(&collection).and_then(|r| r.get(id)).cloned())
    }

    async fn query(
        &self,
        index: Index,
        key: &Filter,
        filter: Option<&Filter>,
        page: PageRequest,
    ) -> Result<Page, StoreError> {
        index.check_key(key)?;
        self.read_page(index.collection(), key, filter, index.key_attributes(), &page)
    }

    async fn scan(
        &self,
        collection: Collection,
        filter: &Filter,
        page: PageRequest,
    ) -> Result<Page, StoreError> {
        self.read_page(collection, &Filter::all(), Some(filter), &[], &page)
    }

    async fn put(&self, collection: Collection, record: Document) -> Result<(), StoreError> {
        let id = document_id(&record)?.to_string();
        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        collections.entry(collection).or_default().insert(id, record);
        Ok(())
    }

    async fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        changes: FieldChanges,
    ) -> Result<Document, StoreError> {
        changes.check_mutable()?;
        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        let record = collections
            .get_mut(&collection)
            .and_then(|r| r.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_string(),
            })?;
        record.extend(changes.into_document());
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value as JsonValue, json};

    fn doc(v: JsonValue) -> Document {
        v.as_object().cloned().unwrap()
    }

    fn sede(id: &str, empresa: &str, principal: bool, activo: bool) -> Document {
        doc(json!({
            "id": id,
            "empresaId": empresa,
            "isPrincipal": principal,
            "activo": activo,
        }))
    }

    async fn seeded() -> InMemoryRecordStore {
        let store = InMemoryRecordStore::new();
        for (id, empresa, principal, activo) in [
            ("s1", "e1", true, true),
            ("s2", "e1", false, false),
            ("s3", "e2", false, true),
            ("s4", "e1", false, true),
            ("s5", "e1", true, false),
        ] {
            store.put(Collection::Sedes, sede(id, empresa, principal, activo)).await.unwrap();
        }
        store
    }

    fn ids(page: &Page) -> Vec<&str> {
        page.items.iter().map(|d| d["id"].as_str().unwrap()).collect()
    }

    #[tokio::test]
    async fn get_put_roundtrip_and_missing() {
        let store = seeded().await;
        let found = store.get(Collection::Sedes, "s3").await.unwrap().unwrap();
        assert_eq!(found["empresaId"], json!("e2"));
        assert!(store.get(Collection::Sedes, "nope").await.unwrap().is_none());
        assert!(store.get(Collection::Empresas, "s3").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_requires_an_id() {
        let store = InMemoryRecordStore::new();
        let err = store.put(Collection::Empresas, doc(json!({ "ruc": "1" }))).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidDocument(_)));
    }

    #[tokio::test]
    async fn scan_filters_after_evaluating_and_pages_by_key() {
        let store = seeded().await;

        let page = store
            .scan(Collection::Sedes, &Filter::active(), PageRequest::new(2, None))
            .await
            .unwrap();
        // s1 and s2 evaluated, s2 filtered out.
        assert_eq!(ids(&page), ["s1"]);
        assert_eq!(page.count, 1);
        let cursor = page.last_evaluated_key.clone().unwrap();
        assert_eq!(cursor.id(), "s2");

        let page = store
            .scan(Collection::Sedes, &Filter::active(), PageRequest::new(2, Some(cursor)))
            .await
            .unwrap();
        assert_eq!(ids(&page), ["s3", "s4"]);
        let cursor = page.last_evaluated_key.clone().unwrap();

        let page = store
            .scan(Collection::Sedes, &Filter::active(), PageRequest::new(2, Some(cursor)))
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert!(page.last_evaluated_key.is_none());
    }

    #[tokio::test]
    async fn no_cursor_when_limit_exactly_exhausts_records() {
        let store = seeded().await;
        let page = store
            .scan(Collection::Sedes, &Filter::all(), PageRequest::new(5, None))
            .await
            .unwrap();
        assert_eq!(page.count, 5);
        assert!(page.last_evaluated_key.is_none());
    }

    #[tokio::test]
    async fn query_by_index_with_filter() {
        let store = seeded().await;

        let page = store
            .query(
                Index::SedeByEmpresaId,
                &Filter::eq("empresaId", "e1"),
                Some(&Filter::active()),
                PageRequest::unbounded(),
            )
            .await
            .unwrap();
        assert_eq!(ids(&page), ["s1", "s4"]);

        let page = store
            .query(
                Index::SedeByEmpresaPrincipal,
                &Filter::eq("empresaId", "e1").and("isPrincipal", true),
                Some(&Filter::active()),
                PageRequest::unbounded(),
            )
            .await
            .unwrap();
        assert_eq!(ids(&page), ["s1"]);
    }

    #[tokio::test]
    async fn query_cursor_carries_index_keys() {
        let store = seeded().await;
        let page = store
            .query(
                Index::SedeByEmpresaId,
                &Filter::eq("empresaId", "e1"),
                None,
                PageRequest::new(1, None),
            )
            .await
            .unwrap();
        let cursor = page.last_evaluated_key.unwrap();
        assert_eq!(
            serde_json::to_value(&cursor).unwrap(),
            json!({ "id": "s1", "empresaId": "e1" })
        );
    }

    #[tokio::test]
    async fn query_rejects_wrong_key_condition() {
        let store = seeded().await;
        let err = store
            .query(Index::EmpresaByRuc, &Filter::eq("empresaId", "e1"), None, PageRequest::unbounded())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidKeyCondition { .. }));
    }

    #[tokio::test]
    async fn update_fields_merges_and_returns_full_record() {
        let store = seeded().await;
        let updated = store
            .update_fields(
                Collection::Sedes,
                "s1",
                FieldChanges::new().set("isPrincipal", false).set("nombre", "Central"),
            )
            .await
            .unwrap();
        assert_eq!(updated["isPrincipal"], json!(false));
        assert_eq!(updated["nombre"], json!("Central"));
        assert_eq!(updated["empresaId"], json!("e1"));
        assert_eq!(store.get(Collection::Sedes, "s1").await.unwrap().unwrap(), updated);
    }

    #[tokio::test]
    async fn update_fields_never_creates_records() {
        let store = seeded().await;
        let err = store
            .update_fields(Collection::Sedes, "ghost", FieldChanges::new().set("activo", false))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert_eq!(store.len(Collection::Sedes), 5);
    }
}
