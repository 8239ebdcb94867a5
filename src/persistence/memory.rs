use super::{Document, DocumentCollection, FieldSet, ID_FIELD, StoreError};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

type Documents = Arc<DashMap<String, Value>>;

/// In-process document store
///
/// Collections are keyed by `"{database}.{collection}"` and hold JSON
/// documents keyed by identifier. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<DashMap<String, Documents>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collection<T: Document>(&self, database: &str, name: &str) -> MemoryCollection<T> {
        let key = format!("{}.{}", database, name);
        let documents = Arc::clone(&self.collections.entry(key).or_default());
        MemoryCollection {
            name: name.to_string(),
            documents,
            _marker: PhantomData,
        }
    }
}

pub struct MemoryCollection<T> {
    name: String,
    documents: Documents,
    _marker: PhantomData<fn() -> T>,
}

#[cfg(test)]
impl<T> MemoryCollection<T> {
    fn len(&self) -> usize {
        self.documents.len()
    }

    fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

fn decode<T: Document>(value: Value) -> Result<T, StoreError> {
    Ok(serde_json::from_value(value)?)
}

#[async_trait]
impl<T: Document> DocumentCollection<T> for MemoryCollection<T> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find_all(&self) -> Result<Vec<T>, StoreError> {
        self.documents
            .iter()
            .map(|entry| decode(entry.value().clone()))
            .collect()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<T>, StoreError> {
        self.documents
            .get(id)
            .map(|entry| decode(entry.value().clone()))
            .transpose()
    }

    async fn insert_one(&self, document: &T) -> Result<(), StoreError> {
        let value = serde_json::to_value(document)?;
        if !value.is_object() {
            return Err(StoreError::InvalidDocument(format!(
                "document {} is not an object",
                document.id()
            )));
        }

        match self.documents.entry(document.id().to_string()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateKey {
                collection: self.name.clone(),
                id: document.id().to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(())
            }
        }
    }

    async fn update_fields(&self, id: &str, fields: FieldSet) -> Result<Option<T>, StoreError> {
        // The entry guard is held until the write lands, so the lookup and
        // the write cannot interleave with another writer on the same id.
        let Some(mut entry) = self.documents.get_mut(id) else {
            return Ok(None);
        };

        let mut updated = entry.value().clone();
        if let Value::Object(current) = &mut updated {
            for (key, value) in fields {
                if key != ID_FIELD {
                    current.insert(key, value);
                }
            }
        }

        let document = decode(updated.clone())?;
        *entry.value_mut() = updated;
        Ok(Some(document))
    }

    async fn delete_by_id(&self, id: &str) -> Result<Option<T>, StoreError> {
        self.documents
            .remove(id)
            .map(|(_, value)| decode(value))
            .transpose()
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let mut removed = 0u64;
        self.documents.retain(|_, _| {
            removed += 1;
            false
        });
        Ok(removed)
    }
}
