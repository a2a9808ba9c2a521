use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::blob::BlobRef;
use crate::store::{Document, DocumentId, DocumentStore, Filter, StoreError};

/// Errors from gateway operations, mapped to wire responses by the handlers
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("a record with the same key already exists")]
    Duplicate { existing: Option<Document> },
    #[error("invalid id format")]
    InvalidId,
    #[error("no matching record")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Static description of one resource kind served by the gateway.
///
/// A kind names its collection, the field that distinguishes records
/// (duplicate checks key on it), and the typed create/patch inputs. The
/// typed inputs are the whole write surface: `id`, `isDeleted`, and `image`
/// are absent from them, so clients cannot set store-managed state.
pub trait ResourceKind: Send + Sync + 'static {
    const COLLECTION: &'static str;
    /// Human name used in response messages
    const DISPLAY: &'static str;
    /// Field the duplicate check keys on
    const KEY_FIELD: &'static str;
    /// Kinds without the lifecycle flag (users) are never soft-deleted
    const SOFT_DELETE: bool = true;
    /// Kinds without an image field (users) ignore uploads entirely
    const HAS_IMAGE: bool = true;

    type Create: DeserializeOwned + Serialize + Send + Sync + 'static;
    type Patch: DeserializeOwned + Serialize + Send + Sync + 'static;

    /// Distinguishing value of a create input
    fn key(input: &Self::Create) -> &str;

    /// Pre-store validation hook; failures surface before any store access
    fn validate(_input: &Self::Create) -> Result<(), GatewayError> {
        Ok(())
    }
}

/// Generic resource gateway: create / list / get / update / soft-delete,
/// implemented once over the injected store handle and instantiated per
/// kind. The legacy service repeated this block per resource with drifting
/// copies; the type parameter is what keeps the four resources in lockstep.
pub struct Gateway<K: ResourceKind> {
    store: Arc<dyn DocumentStore>,
    _kind: PhantomData<K>,
}

impl<K: ResourceKind> Gateway<K> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store, _kind: PhantomData }
    }

    /// Insert a new record unless one with the same key exists.
    ///
    /// The duplicate pre-check is deliberately isDeleted-agnostic: a
    /// soft-deleted record still occupies its key. The check exists for its
    /// error payload (the conflicting record); the store's unique
    /// constraint is what actually closes the check-then-insert race, and a
    /// concurrent winner is re-fetched and reported as the same duplicate.
    pub async fn create(
        &self,
        input: K::Create,
        image: Option<&BlobRef>,
    ) -> Result<Document, GatewayError> {
        K::validate(&input)?;

        let by_key = Filter::new().eq(K::KEY_FIELD, K::key(&input));
        if let Some(existing) = self.store.find_one(K::COLLECTION, &by_key).await? {
            return Err(GatewayError::Duplicate { existing: Some(existing) });
        }

        let mut fields = Document::from_serialize(&input)?;
        if K::HAS_IMAGE {
            match image {
                Some(reference) => fields.set("image", reference.as_str()),
                None => fields.set("image", Value::Null),
            };
        }
        if K::SOFT_DELETE {
            fields.set("isDeleted", false);
        }

        match self.store.insert(K::COLLECTION, fields).await {
            Ok(doc) => Ok(doc),
            Err(StoreError::UniqueViolation { .. }) => {
                let existing = self.store.find_one(K::COLLECTION, &by_key).await?;
                Err(GatewayError::Duplicate { existing })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// All records that are not soft-deleted, in store-native order
    pub async fn list(&self) -> Result<Vec<Document>, GatewayError> {
        let filter = if K::SOFT_DELETE {
            Filter::new().eq("isDeleted", false)
        } else {
            Filter::new()
        };
        Ok(self.store.find_many(K::COLLECTION, &filter).await?)
    }

    /// Fetch one active record; syntactically bad ids fail before the store
    pub async fn get(&self, id: &str) -> Result<Document, GatewayError> {
        let id = DocumentId::parse(id).map_err(|_| GatewayError::InvalidId)?;
        let mut filter = Filter::new().id(id);
        if K::SOFT_DELETE {
            filter = filter.eq("isDeleted", false);
        }
        self.store
            .find_one(K::COLLECTION, &filter)
            .await?
            .ok_or(GatewayError::NotFound)
    }

    /// Merge the patch into the record and return the updated state.
    ///
    /// No isDeleted filter here: soft-deleted records accept updates. Fields
    /// the patch leaves as `None` are not serialized and survive untouched.
    pub async fn update(
        &self,
        id: &str,
        patch: K::Patch,
        image: Option<&BlobRef>,
    ) -> Result<Document, GatewayError> {
        // An id that does not parse cannot name any stored record
        let Ok(id) = DocumentId::parse(id) else {
            return Err(GatewayError::NotFound);
        };

        let mut fields = Document::from_serialize(&patch)?;
        if let Some(reference) = image {
            // Overwrites the reference only; the previous blob stays put
            fields.set("image", reference.as_str());
        }

        self.store
            .update_by_id(K::COLLECTION, id, fields)
            .await?
            .ok_or(GatewayError::NotFound)
    }

    /// Flag the record as deleted; repeat calls simply re-flag it
    pub async fn soft_delete(&self, id: &str) -> Result<Document, GatewayError> {
        let id = DocumentId::parse(id).map_err(|_| GatewayError::InvalidId)?;

        let mut patch = Document::new();
        patch.set("isDeleted", true);

        self.store
            .update_by_id(K::COLLECTION, id, patch)
            .await?
            .ok_or(GatewayError::NotFound)
    }
}
