use super::{Document, DocumentCollection, MemoryStore, StoreError};
use crate::config::DatabaseSettings;
use crate::lifecycle::{LifecycleError, OnModuleDestroy, OnModuleInit};
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use strum_macros::{Display, EnumString};

/// Store backend, selected by the connection string scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum StoreBackend {
    #[strum(to_string = "memory")]
    Memory,
    #[strum(to_string = "mongodb", serialize = "mongodb+srv")]
    MongoDb,
}

impl StoreBackend {
    pub fn from_connection_string(connection_string: &str) -> Result<Self, StoreError> {
        let (scheme, _) = connection_string
            .split_once("://")
            .ok_or_else(|| StoreError::InvalidConnectionString(connection_string.to_string()))?;
        Self::from_str(scheme).map_err(|_| StoreError::UnsupportedScheme(scheme.to_string()))
    }
}

#[derive(Clone)]
enum StoreClient {
    Memory(MemoryStore),
    #[cfg(feature = "mongodb-store")]
    MongoDb(mongodb::Client),
}

/// Connection to the document database plus the selected database name
///
/// Built once at start-up, registered in the container and injected where
/// collections are needed. Clones share the underlying client.
#[derive(Clone)]
pub struct DbContext {
    client: StoreClient,
    settings: DatabaseSettings,
    connected: Arc<AtomicBool>,
}

impl DbContext {
    pub async fn connect(settings: DatabaseSettings) -> Result<Self, StoreError> {
        let backend = StoreBackend::from_connection_string(&settings.connection_string)?;

        let client = match backend {
            StoreBackend::Memory => StoreClient::Memory(MemoryStore::new()),
            #[cfg(feature = "mongodb-store")]
            StoreBackend::MongoDb => {
                let client = mongodb::Client::with_uri_str(&settings.connection_string).await?;
                StoreClient::MongoDb(client)
            }
            #[cfg(not(feature = "mongodb-store"))]
            StoreBackend::MongoDb => {
                return Err(StoreError::BackendUnavailable(backend.to_string()));
            }
        };

        tracing::info!(
            backend = %backend,
            database = %settings.database_name,
            "Document store client created"
        );

        Ok(Self {
            client,
            settings,
            connected: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Fresh in-process store
    pub fn in_memory(database_name: impl Into<String>) -> Self {
        Self {
            client: StoreClient::Memory(MemoryStore::new()),
            settings: DatabaseSettings::in_memory(database_name),
            connected: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn settings(&self) -> &DatabaseSettings {
        &self.settings
    }

    pub fn backend(&self) -> StoreBackend {
        match &self.client {
            StoreClient::Memory(_) => StoreBackend::Memory,
            #[cfg(feature = "mongodb-store")]
            StoreClient::MongoDb(_) => StoreBackend::MongoDb,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn collection<T: Document>(&self, name: &str) -> Arc<dyn DocumentCollection<T>> {
        match &self.client {
            StoreClient::Memory(store) => {
                Arc::new(store.collection::<T>(&self.settings.database_name, name))
            }
            #[cfg(feature = "mongodb-store")]
            StoreClient::MongoDb(client) => Arc::new(super::MongoCollection::new(
                client
                    .database(&self.settings.database_name)
                    .collection::<T>(name),
            )),
        }
    }

    /// Round-trip to the server; a no-op for the in-process store
    pub async fn ping(&self) -> Result<(), StoreError> {
        match &self.client {
            StoreClient::Memory(_) => Ok(()),
            #[cfg(feature = "mongodb-store")]
            StoreClient::MongoDb(client) => {
                client
                    .database(&self.settings.database_name)
                    .run_command(mongodb::bson::doc! { "ping": 1 })
                    .await?;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl OnModuleInit for DbContext {
    async fn on_module_init(&mut self) -> Result<(), LifecycleError> {
        tracing::info!("DbContext: checking connection...");
        self.ping()
            .await
            .map_err(|e| LifecycleError::init_failed(e.to_string()))?;
        self.connected.store(true, Ordering::SeqCst);
        tracing::info!("DbContext: connection ready");
        Ok(())
    }
}

#[async_trait]
impl OnModuleDestroy for DbContext {
    async fn on_module_destroy(&mut self) -> Result<(), LifecycleError> {
        tracing::info!("DbContext: closing connection...");
        match &self.client {
            StoreClient::Memory(_) => {}
            #[cfg(feature = "mongodb-store")]
            StoreClient::MongoDb(client) => client.clone().shutdown().await,
        }
        self.connected.store(false, Ordering::SeqCst);
        tracing::info!("DbContext: connection closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        #[serde(rename = "_id")]
        id: String,
        text: String,
    }

    impl Document for Note {
        fn id(&self) -> &str {
            &self.id
        }
    }

    #[test]
    fn backend_follows_scheme() {
        assert_eq!(
            StoreBackend::from_connection_string("memory://local").unwrap(),
            StoreBackend::Memory
        );
        assert_eq!(
            StoreBackend::from_connection_string("mongodb://localhost:27017").unwrap(),
            StoreBackend::MongoDb
        );
        assert_eq!(
            StoreBackend::from_connection_string("mongodb+srv://cluster.example.net").unwrap(),
            StoreBackend::MongoDb
        );
        assert_eq!(StoreBackend::MongoDb.to_string(), "mongodb");
    }

    #[test]
    fn unknown_scheme_is_rejected() {
        assert!(matches!(
            StoreBackend::from_connection_string("postgres://localhost"),
            Err(StoreError::UnsupportedScheme(ref s)) if s == "postgres"
        ));
        assert!(matches!(
            StoreBackend::from_connection_string("localhost:27017"),
            Err(StoreError::InvalidConnectionString(_))
        ));
    }

    #[cfg(not(feature = "mongodb-store"))]
    #[tokio::test]
    async fn mongodb_requires_the_feature() {
        let settings = DatabaseSettings {
            connection_string: "mongodb://localhost:27017".to_string(),
            ..DatabaseSettings::in_memory("ProductDb")
        };
        assert!(matches!(
            DbContext::connect(settings).await,
            Err(StoreError::BackendUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn lifecycle_hooks_track_connection_state() {
        let mut db = DbContext::connect(DatabaseSettings::in_memory("ProductDb"))
            .await
            .unwrap();
        assert_eq!(db.backend(), StoreBackend::Memory);
        assert!(!db.is_connected());

        db.on_module_init().await.unwrap();
        assert!(db.is_connected());

        let observer = db.clone();
        db.on_module_destroy().await.unwrap();
        assert!(!observer.is_connected());
    }

    #[tokio::test]
    async fn collections_share_data_across_clones() {
        let db = DbContext::in_memory("ProductDb");
        let notes = db.collection::<Note>("notes");
        notes
            .insert_one(&Note {
                id: "n-1".to_string(),
                text: "hello".to_string(),
            })
            .await
            .unwrap();

        let again = db.clone().collection::<Note>("notes");
        assert_eq!(again.name(), "notes");
        assert_eq!(again.find_all().await.unwrap().len(), 1);
    }
}
