//! Persistence handle
//!
//! [`DbContext`] opens a document database from a connection string and hands
//! out typed collections. Repositories only see the [`DocumentCollection`]
//! trait, so the backend is chosen once at start-up:
//!
//! - `memory://...` keeps documents in process
//! - `mongodb://...` / `mongodb+srv://...` uses the MongoDB driver
//!   (`mongodb-store` feature)

mod context;
mod error;
mod memory;
#[cfg(feature = "mongodb-store")]
mod mongo;

pub use context::{DbContext, StoreBackend};
pub use error::StoreError;
pub use memory::{MemoryCollection, MemoryStore};
#[cfg(feature = "mongodb-store")]
pub use mongo::MongoCollection;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Name of the identifier field inside a stored document
pub const ID_FIELD: &str = "_id";

/// Top-level fields of a partial document, used for in-place updates
pub type FieldSet = serde_json::Map<String, serde_json::Value>;

/// A record stored in a collection, addressed by its identifier
pub trait Document: Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
    fn id(&self) -> &str;
}

/// Operations on one collection of documents
///
/// `Ok(None)` means no document has the identifier; it is not an error.
/// Updates and deletes by id are single atomic operations on the store.
#[async_trait]
pub trait DocumentCollection<T: Document>: Send + Sync {
    fn name(&self) -> &str;

    async fn find_all(&self) -> Result<Vec<T>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<T>, StoreError>;

    /// Fails with [`StoreError::DuplicateKey`] if the identifier is taken
    async fn insert_one(&self, document: &T) -> Result<(), StoreError>;

    /// Overwrite the given top-level fields and return the updated document.
    /// The identifier field is never modified.
    async fn update_fields(&self, id: &str, fields: FieldSet) -> Result<Option<T>, StoreError>;

    /// Remove the document and return it as it was before deletion
    async fn delete_by_id(&self, id: &str) -> Result<Option<T>, StoreError>;

    /// Remove every document, returning how many were removed
    async fn delete_all(&self) -> Result<u64, StoreError>;
}

/// Serialize a value into the field set of a partial update
pub fn field_set<S: Serialize>(value: &S) -> Result<FieldSet, StoreError> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(mut fields) => {
            fields.remove(ID_FIELD);
            Ok(fields)
        }
        other => Err(StoreError::InvalidDocument(format!(
            "expected an object, found {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Changes {
        name: String,
        price: f64,
    }

    #[test]
    fn field_set_keeps_top_level_fields() {
        let fields = field_set(&Changes {
            name: "Lamp".to_string(),
            price: 12.5,
        })
        .unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["name"], "Lamp");
        assert_eq!(fields["price"], 12.5);
    }

    #[test]
    fn field_set_drops_the_identifier() {
        let fields = field_set(&serde_json::json!({ "_id": "p-1", "name": "Lamp" })).unwrap();
        assert!(!fields.contains_key(ID_FIELD));
    }

    #[test]
    fn field_set_rejects_non_objects() {
        assert!(matches!(
            field_set(&42),
            Err(StoreError::InvalidDocument(_))
        ));
    }
}
