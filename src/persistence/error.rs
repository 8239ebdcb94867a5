use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(String),

    #[error("Unsupported connection string scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Store backend '{0}' is not compiled in")]
    BackendUnavailable(String),

    #[error("Duplicate key {id} in collection {collection}")]
    DuplicateKey { collection: String, id: String },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[cfg(feature = "mongodb-store")]
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[cfg(feature = "mongodb-store")]
    #[error("BSON serialization failed: {0}")]
    Bson(#[from] mongodb::bson::ser::Error),
}
