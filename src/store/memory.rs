use std::collections::HashMap;

use tokio::sync::RwLock;

use super::{Document, DocumentId, DocumentStore, Filter, StoreError};
use async_trait::async_trait;

/// In-memory document store.
///
/// Serves local runs without a `DATABASE_URL` and the test suites. Documents
/// live in per-collection vectors, so listing order is insertion order —
/// the same store-native order the Postgres backend exposes. Uniqueness for
/// the registered `(collection, field)` pairs is enforced under the write
/// lock, which makes check-then-insert atomic here.
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    unique_keys: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            unique_keys: HashMap::new(),
        }
    }

    /// Register unique fields, e.g. `[("users", "email")]` (chainable)
    pub fn with_unique_keys(mut self, keys: &[(&str, &str)]) -> Self {
        for (collection, field) in keys {
            self.unique_keys
                .insert(collection.to_string(), field.to_string());
        }
        self
    }

    /// A conflict exists when another document carries the same non-null value
    fn unique_conflict(&self, collection: &str, docs: &[Document], fields: &Document) -> Option<String> {
        let field = self.unique_keys.get(collection)?;
        let value = fields.get(field).filter(|v| !v.is_null())?;
        docs.iter()
            .any(|doc| doc.get(field) == Some(value))
            .then(|| field.clone())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| filter.matches(doc)).cloned()))
    }

    async fn find_many(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|doc| filter.matches(doc)).cloned().collect())
            .unwrap_or_default())
    }

    async fn insert(&self, collection: &str, fields: Document) -> Result<Document, StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();

        if let Some(field) = self.unique_conflict(collection, docs, &fields) {
            return Err(StoreError::UniqueViolation { field });
        }

        let doc = Document::from_parts(DocumentId::new(), fields.into_fields());
        docs.push(doc.clone());
        Ok(doc)
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: DocumentId,
        patch: Document,
    ) -> Result<Option<Document>, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(None);
        };
        let Some(position) = docs.iter().position(|doc| doc.id() == Some(id)) else {
            return Ok(None);
        };

        // A patch moving the unique field onto another document's value
        // fails the same way the Postgres index does.
        let others: Vec<Document> = docs
            .iter()
            .filter(|doc| doc.id() != Some(id))
            .cloned()
            .collect();
        if let Some(field) = self.unique_conflict(collection, &others, &patch) {
            return Err(StoreError::UniqueViolation { field });
        }

        docs[position].merge(patch);
        Ok(Some(docs[position].clone()))
    }
}
