use super::{Document, DocumentCollection, FieldSet, ID_FIELD, StoreError};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::Collection;
use mongodb::bson::{Document as BsonDocument, doc};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::ReturnDocument;

const DUPLICATE_KEY_CODE: i32 = 11000;

/// A MongoDB collection behind the [`DocumentCollection`] interface
pub struct MongoCollection<T: Send + Sync> {
    inner: Collection<T>,
}

impl<T: Send + Sync> MongoCollection<T> {
    pub fn new(inner: Collection<T>) -> Self {
        Self { inner }
    }
}

fn by_id(id: &str) -> BsonDocument {
    let mut filter = BsonDocument::new();
    filter.insert(ID_FIELD, id);
    filter
}

/// `{ "$set": fields }` without the identifier
fn set_fields(mut fields: FieldSet) -> Result<BsonDocument, StoreError> {
    fields.remove(ID_FIELD);
    let changes = mongodb::bson::to_document(&fields)?;
    Ok(doc! { "$set": changes })
}

fn is_duplicate_key(kind: &ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}

#[async_trait]
impl<T: Document> DocumentCollection<T> for MongoCollection<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn find_all(&self) -> Result<Vec<T>, StoreError> {
        let cursor = self.inner.find(doc! {}).await?;
        Ok(cursor.try_collect::<Vec<T>>().await?)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<T>, StoreError> {
        Ok(self.inner.find_one(by_id(id)).await?)
    }

    async fn insert_one(&self, document: &T) -> Result<(), StoreError> {
        let Err(e) = self.inner.insert_one(document).await else {
            return Ok(());
        };

        if is_duplicate_key(&e.kind) {
            return Err(StoreError::DuplicateKey {
                collection: self.inner.name().to_string(),
                id: document.id().to_string(),
            });
        }
        Err(e.into())
    }

    async fn update_fields(&self, id: &str, fields: FieldSet) -> Result<Option<T>, StoreError> {
        Ok(self
            .inner
            .find_one_and_update(by_id(id), set_fields(fields)?)
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn delete_by_id(&self, id: &str) -> Result<Option<T>, StoreError> {
        Ok(self.inner.find_one_and_delete(by_id(id)).await?)
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        Ok(self.inner.delete_many(doc! {}).await?.deleted_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::Bson;
    use mongodb::error::WriteError;
    use serde_json::json;

    fn write_error(code: i32) -> ErrorKind {
        let write_error: WriteError =
            mongodb::bson::from_document(doc! { "code": code, "errmsg": "write failed" })
                .unwrap();
        ErrorKind::Write(WriteFailure::WriteError(write_error))
    }

    #[test]
    fn id_filter_matches_the_identifier_field() {
        assert_eq!(by_id("p-1"), doc! { "_id": "p-1" });
    }

    #[test]
    fn set_fields_never_touches_the_identifier() {
        let fields = match json!({ "_id": "p-9", "name": "Lamp", "price": 12.5 }) {
            serde_json::Value::Object(fields) => fields,
            _ => unreachable!(),
        };

        let update = set_fields(fields).unwrap();
        let set = update.get_document("$set").unwrap();
        assert!(!set.contains_key(ID_FIELD));
        assert_eq!(set.get("name"), Some(&Bson::String("Lamp".to_string())));
        assert_eq!(set.get("price"), Some(&Bson::Double(12.5)));
    }

    #[test]
    fn only_code_11000_is_a_duplicate_key() {
        assert!(is_duplicate_key(&write_error(DUPLICATE_KEY_CODE)));
        assert!(!is_duplicate_key(&write_error(121)));
    }
}
