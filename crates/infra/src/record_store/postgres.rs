//! Postgres-backed record store.
//!
//! Each collection is a table `(id TEXT PRIMARY KEY, doc JSONB)`. Secondary
//! index lookups and filters are JSONB containment (`doc @> {...}`), served by
//! a GIN index per table.
//!
//! ## Error Mapping
//!
//! Every `sqlx::Error` surfaces as `StoreError::Backend` naming the operation;
//! a JSONB value that is not an object surfaces as `StoreError::InvalidDocument`.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::instrument;

use super::r#trait::{
    Collection, Cursor, Document, FieldChanges, Filter, Index, Page, PageRequest, RecordStore,
    StoreError, document_id,
};
use crate::config::{DatabaseSettings, TableNames};

/// Postgres-backed record store.
///
/// `Send + Sync`; the pool is shared and cheap to clone.
#[derive(Debug, Clone)]
pub struct PostgresRecordStore {
    pool: Arc<PgPool>,
    tables: TableNames,
}

impl PostgresRecordStore {
    pub fn new(pool: PgPool, tables: TableNames) -> Self {
        Self {
            pool: Arc::new(pool),
            tables,
        }
    }

    /// Open a pool from settings.
    pub async fn connect(db: &DatabaseSettings, tables: TableNames) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(db.max_connections)
            .connect(&db.url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool, tables))
    }

    /// Create the collection tables and their indexes if missing.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for collection in [Collection::Empresas, Collection::Sedes] {
            let table = self.table(collection);
            let ddl = [
                format!(
                    "CREATE TABLE IF NOT EXISTS {table} (
                        id TEXT PRIMARY KEY,
                        doc JSONB NOT NULL
                    )"
                ),
                format!(
                    "CREATE INDEX IF NOT EXISTS {table}_doc_gin ON {table} USING GIN (doc jsonb_path_ops)"
                ),
            ];
            for stmt in ddl {
                sqlx::query(&stmt)
                    .execute(&*self.pool)
                    .await
                    .map_err(|e| map_sqlx_error("ensure_schema", e))?;
            }
        }
        Ok(())
    }

    fn table(&self, collection: Collection) -> &str {
        self.tables.for_collection(collection)
    }

    /// Evaluate records in id order after the cursor, matching `candidate`,
    /// then apply `filter`.
    ///
    /// One row past the limit is fetched to learn whether more records remain.
    async fn read_page(
        &self,
        collection: Collection,
        candidate: &Filter,
        filter: &Filter,
        key_attributes: &[&str],
        page: PageRequest,
    ) -> Result<Page, StoreError> {
        let sql = format!(
            r#"
            SELECT id, doc, doc @> $2 AS matched
            FROM {}
            WHERE doc @> $1
              AND ($3::text IS NULL OR id > $3)
            ORDER BY id ASC
            LIMIT $4
            "#,
            self.table(collection)
        );

        let rows = sqlx::query(&sql)
            .bind(JsonValue::Object(candidate.as_document().clone()))
            .bind(JsonValue::Object(filter.as_document().clone()))
            .bind(page.cursor.as_ref().map(|c| c.id().to_string()))
            .bind(page.limit.map(|l| i64::from(l) + 1))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("read_page", e))?;

        let mut evaluated = Vec::with_capacity(rows.len());
        for row in rows {
            let doc: JsonValue = row.try_get("doc").map_err(|e| map_sqlx_error("read_page", e))?;
            let matched: bool = row.try_get("matched").map_err(|e| map_sqlx_error("read_page", e))?;
            evaluated.push((into_document(doc)?, matched));
        }

        let more = page.limit.is_some_and(|l| evaluated.len() > l as usize);
        if let Some(l) = page.limit {
            evaluated.truncate(l as usize);
        }

        let cursor = if more {
            evaluated.last().map(|(doc, _)| Cursor::after(doc, key_attributes))
        } else {
            None
        };
        let items = evaluated
            .into_iter()
            .filter_map(|(doc, matched)| matched.then_some(doc))
            .collect();
        Ok(Page::new(items, cursor))
    }
}

#[async_trait::async_trait]
impl RecordStore for PostgresRecordStore {
    #[instrument(skip(self), fields(table = %self.table(collection)), err)]
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        let sql = format!("SELECT doc FROM {} WHERE id = $1", self.table(collection));
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get", e))?;

        match row {
            Some(row) => {
                let doc: JsonValue = row.try_get("doc").map_err(|e| map_sqlx_error("get", e))?;
                Ok(Some(into_document(doc)?))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, key, filter), fields(index = index.name()), err)]
    async fn query(
        &self,
        index: Index,
        key: &Filter,
        filter: Option<&Filter>,
        page: PageRequest,
    ) -> Result<Page, StoreError> {
        index.check_key(key)?;
        let all = Filter::all();
        self.read_page(
            index.collection(),
            key,
            filter.unwrap_or(&all),
            index.key_attributes(),
            page,
        )
        .await
    }

    #[instrument(skip(self, filter), fields(table = %self.table(collection)), err)]
    async fn scan(
        &self,
        collection: Collection,
        filter: &Filter,
        page: PageRequest,
    ) -> Result<Page, StoreError> {
        self.read_page(collection, &Filter::all(), filter, &[], page).await
    }

    #[instrument(skip(self, record), fields(table = %self.table(collection)), err)]
    async fn put(&self, collection: Collection, record: Document) -> Result<(), StoreError> {
        let id = document_id(&record)?.to_string();
        let sql = format!(
            r#"
            INSERT INTO {} (id, doc)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET doc = EXCLUDED.doc
            "#,
            self.table(collection)
        );
        sqlx::query(&sql)
            .bind(id)
            .bind(JsonValue::Object(record))
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("put", e))?;
        Ok(())
    }

    #[instrument(skip(self, changes), fields(table = %self.table(collection)), err)]
    async fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        changes: FieldChanges,
    ) -> Result<Document, StoreError> {
        changes.check_mutable()?;
        let sql = format!(
            "UPDATE {} SET doc = doc || $2 WHERE id = $1 RETURNING doc",
            self.table(collection)
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(JsonValue::Object(changes.into_document()))
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_fields", e))?;

        let row = row.ok_or_else(|| StoreError::NotFound {
            collection,
            id: id.to_string(),
        })?;
        let doc: JsonValue = row.try_get("doc").map_err(|e| map_sqlx_error("update_fields", e))?;
        into_document(doc)
    }
}

fn into_document(value: JsonValue) -> Result<Document, StoreError> {
    match value {
        JsonValue::Object(map) => Ok(map),
        other => Err(StoreError::InvalidDocument(format!("stored doc is not an object: {other}"))),
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => StoreError::Backend(format!(
            "database error in {}: {} (code {})",
            operation,
            db_err.message(),
            db_err.code().as_deref().unwrap_or("none")
        )),
        sqlx::Error::PoolTimedOut => StoreError::Backend(format!("connection pool timed out in {operation}")),
        sqlx::Error::PoolClosed => StoreError::Backend(format!("connection pool closed in {operation}")),
        other => StoreError::Backend(format!("{operation}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    //! These run against a real database: `DATABASE_URL=... cargo test -- --ignored`.

    use super::*;
    use serde_json::json;

    async fn store() -> PostgresRecordStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for postgres tests");
        let tables = TableNames {
            empresas: format!("test_empresas_{}", std::process::id()),
            sedes: format!("test_sedes_{}", std::process::id()),
        };
        let db = DatabaseSettings {
            url,
            max_connections: 2,
        };
        let store = PostgresRecordStore::connect(&db, tables).await.unwrap();
        store.ensure_schema().await.unwrap();
        store
    }

    #[tokio::test]
    #[ignore]
    async fn put_get_update_roundtrip() {
        let store = store().await;
        let id = uuid::Uuid::now_v7().to_string();
        let record = json!({ "id": id, "empresaId": "e1", "isPrincipal": true, "activo": true });
        store
            .put(Collection::Sedes, record.as_object().cloned().unwrap())
            .await
            .unwrap();

        let updated = store
            .update_fields(Collection::Sedes, &id, FieldChanges::new().set("isPrincipal", false))
            .await
            .unwrap();
        assert_eq!(updated["isPrincipal"], json!(false));
        assert_eq!(store.get(Collection::Sedes, &id).await.unwrap().unwrap(), updated);

        let missing = store
            .update_fields(Collection::Sedes, "missing", FieldChanges::new().set("activo", false))
            .await;
        assert!(matches!(missing, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    #[ignore]
    async fn principal_index_query_filters_active() {
        let store = store().await;
        let empresa = uuid::Uuid::now_v7().to_string();
        for (principal, activo) in [(true, false), (true, true), (false, true)] {
            let record = json!({
                "id": uuid::Uuid::now_v7().to_string(),
                "empresaId": empresa,
                "isPrincipal": principal,
                "activo": activo,
            });
            store
                .put(Collection::Sedes, record.as_object().cloned().unwrap())
                .await
                .unwrap();
        }

        let page = store
            .query(
                Index::SedeByEmpresaPrincipal,
                &Filter::eq("empresaId", empresa.as_str()).and("isPrincipal", true),
                Some(&Filter::active()),
                PageRequest::unbounded(),
            )
            .await
            .unwrap();
        assert_eq!(page.count, 1);
        assert!(page.last_evaluated_key.is_none());
    }
}
