pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors that can occur at the document store boundary
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique value already exists for field '{field}'")]
    UniqueViolation { field: String },
    #[error("query failed: {0}")]
    QueryFailed(String),
    #[error("query failed")]
    Sqlx(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Sqlx(err)
    }
}

/// Identifier assigned by the store when a document is inserted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

#[derive(Debug, thiserror::Error)]
#[error("invalid document id: {0}")]
pub struct InvalidDocumentId(String);

impl DocumentId {
    /// Mint a fresh id (v4)
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a client-supplied id string
    pub fn parse(input: &str) -> Result<Self, InvalidDocumentId> {
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|_| InvalidDocumentId(input.to_string()))
    }

    /// Syntactic validity check without keeping the parse result
    pub fn is_valid(input: &str) -> bool {
        Self::parse(input).is_ok()
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for DocumentId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// A schemaless record: a JSON object with an `id` field once stored
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build a document from any serializable value; must serialize to an object
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(serde::ser::Error::custom(format!(
                "expected a JSON object, got {}",
                value_kind(&other)
            ))),
        }
    }

    /// Reassemble a document loaded from the store, injecting its id field
    pub fn from_parts(id: DocumentId, mut fields: Map<String, Value>) -> Self {
        fields.insert("id".to_string(), Value::String(id.to_string()));
        Self(fields)
    }

    /// Store-assigned id, if this document has been persisted
    pub fn id(&self) -> Option<DocumentId> {
        self.get("id")
            .and_then(Value::as_str)
            .and_then(|s| DocumentId::parse(s).ok())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Set a field value (chainable)
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Remove a field and return its value
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Shallow merge: every field of `patch` overwrites this document's
    pub fn merge(&mut self, patch: Document) -> &mut Self {
        for (field, value) in patch.0 {
            self.0.insert(field, value);
        }
        self
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Document {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Value::Object(doc.0)
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Equality filter over documents: an optional id term plus field terms
#[derive(Debug, Clone, Default)]
pub struct Filter {
    id: Option<DocumentId>,
    terms: Map<String, Value>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to the document with this id (chainable)
    pub fn id(mut self, id: DocumentId) -> Self {
        self.id = Some(id);
        self
    }

    /// Require `field == value` (chainable)
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.terms.insert(field.into(), value.into());
        self
    }

    pub fn id_term(&self) -> Option<DocumentId> {
        self.id
    }

    /// Field terms as a JSON object, for JSONB containment queries
    pub fn terms(&self) -> &Map<String, Value> {
        &self.terms
    }

    /// In-memory evaluation; a missing field never matches a term
    pub fn matches(&self, doc: &Document) -> bool {
        if let Some(id) = self.id {
            if doc.id() != Some(id) {
                return false;
            }
        }
        self.terms
            .iter()
            .all(|(field, value)| doc.get(field) == Some(value))
    }
}

/// Persistence boundary for documents, keyed by collection name.
///
/// `insert` assigns the id. `update_by_id` applies a shallow merge and
/// returns the post-update document, or `None` when no document matched.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError>;

    async fn find_many(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<Document>, StoreError>;

    async fn insert(&self, collection: &str, fields: Document) -> Result<Document, StoreError>;

    async fn update_by_id(
        &self,
        collection: &str,
        id: DocumentId,
        patch: Document,
    ) -> Result<Option<Document>, StoreError>;

    /// Backend liveness probe for the health endpoint
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Release backend resources; called once during shutdown
    async fn close(&self) {}
}
