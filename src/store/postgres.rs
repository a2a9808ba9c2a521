use std::collections::HashMap;

use serde_json::Value;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use super::{Document, DocumentId, DocumentStore, Filter, StoreError};
use async_trait::async_trait;

/// Postgres-backed document store.
///
/// One JSONB table holds every collection; equality filters compile to
/// `@>` containment and updates to a `data || patch` shallow merge. Each
/// registered unique key becomes a partial unique index, so uniqueness
/// holds even when two requests pass the application-level duplicate check
/// at the same time.
pub struct PgStore {
    pool: PgPool,
    unique_keys: HashMap<String, String>,
}

const CREATE_DOCUMENTS_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS documents (
    seq BIGSERIAL,
    id UUID PRIMARY KEY,
    collection TEXT NOT NULL,
    data JSONB NOT NULL
)";

const CREATE_COLLECTION_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS ix_documents_collection ON documents (collection)";

impl PgStore {
    /// Connect with an explicit pool size; call `migrate` before serving
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self { pool, unique_keys: HashMap::new() })
    }

    /// Register unique fields, e.g. `[("users", "email")]` (chainable)
    pub fn with_unique_keys(mut self, keys: &[(&str, &str)]) -> Self {
        for (collection, field) in keys {
            self.unique_keys
                .insert(collection.to_string(), field.to_string());
        }
        self
    }

    /// Create the documents table and the per-collection unique indexes
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_DOCUMENTS_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_COLLECTION_INDEX).execute(&self.pool).await?;

        for (collection, field) in &self.unique_keys {
            // Rows without the field index as NULL, so only present values
            // conflict - absent keys never collide.
            let sql = format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {} ON documents ((data->>'{}')) WHERE collection = '{}'",
                index_name(collection, field),
                quote_literal(field),
                quote_literal(collection),
            );
            sqlx::query(&sql).execute(&self.pool).await?;
        }

        info!(
            "Document store schema ready ({} unique keys)",
            self.unique_keys.len()
        );
        Ok(())
    }

    async fn find_raw(
        &self,
        collection: &str,
        filter: &Filter,
        limit_one: bool,
    ) -> Result<Vec<Document>, StoreError> {
        let mut sql =
            String::from("SELECT id, data FROM documents WHERE collection = $1 AND data @> $2");
        if filter.id_term().is_some() {
            sql.push_str(" AND id = $3");
        }
        sql.push_str(" ORDER BY seq");
        if limit_one {
            sql.push_str(" LIMIT 1");
        }

        let mut query = sqlx::query(&sql)
            .bind(collection)
            .bind(Value::Object(filter.terms().clone()));
        if let Some(id) = filter.id_term() {
            query = query.bind(id.as_uuid());
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(row_to_document).collect()
    }

    /// Map constraint violations onto the field they guard
    fn classify(&self, collection: &str, err: sqlx::Error) -> StoreError {
        if let sqlx::Error::Database(ref db) = err {
            if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) {
                let field = self
                    .unique_keys
                    .get(collection)
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string());
                return StoreError::UniqueViolation { field };
            }
        }
        StoreError::Sqlx(err)
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let mut docs = self.find_raw(collection, filter, true).await?;
        Ok(docs.pop())
    }

    async fn find_many(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<Document>, StoreError> {
        self.find_raw(collection, filter, false).await
    }

    async fn insert(&self, collection: &str, fields: Document) -> Result<Document, StoreError> {
        let id = DocumentId::new();
        let row = sqlx::query(
            "INSERT INTO documents (id, collection, data) VALUES ($1, $2, $3) RETURNING id, data",
        )
        .bind(id.as_uuid())
        .bind(collection)
        .bind(Value::from(fields))
        .fetch_one(&self.pool)
        .await
        .map_err(|err| self.classify(collection, err))?;

        row_to_document(row)
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: DocumentId,
        patch: Document,
    ) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query(
            "UPDATE documents SET data = data || $3 WHERE id = $1 AND collection = $2 RETURNING id, data",
        )
        .bind(id.as_uuid())
        .bind(collection)
        .bind(Value::from(patch))
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| self.classify(collection, err))?;

        row.map(row_to_document).transpose()
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Closed document store pool");
    }
}

fn row_to_document(row: PgRow) -> Result<Document, StoreError> {
    let id: Uuid = row.try_get("id")?;
    let data: Value = row.try_get("data")?;
    match data {
        Value::Object(fields) => Ok(Document::from_parts(DocumentId::from(id), fields)),
        _ => Err(StoreError::QueryFailed(
            "document payload was not a JSON object".to_string(),
        )),
    }
}

fn index_name(collection: &str, field: &str) -> String {
    format!("uq_documents_{}_{}", identifier(collection), identifier(field))
}

/// Reduce to characters valid in an unquoted identifier
fn identifier(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

/// Escape for inclusion in a single-quoted SQL literal
fn quote_literal(value: &str) -> String {
    value.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_names_are_identifier_safe() {
        assert_eq!(
            index_name("categories", "categoryName"),
            "uq_documents_categories_categoryname"
        );
        assert_eq!(index_name("a-b", "x.y"), "uq_documents_a_b_x_y");
    }

    #[test]
    fn literals_escape_quotes() {
        assert_eq!(quote_literal("plain"), "plain");
        assert_eq!(quote_literal("o'brien"), "o''brien");
    }
}
