use crate::error::{ProductPocError, Result};
use dashmap::DashMap;
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub const CONNECTION_STRING_KEY: &str = "MONGODB_URI";
pub const DATABASE_NAME_KEY: &str = "DATABASE_NAME";
pub const PRODUCTS_COLLECTION_KEY: &str = "PRODUCTS_COLLECTION_NAME";
pub const HOST_KEY: &str = "HOST";
pub const PORT_KEY: &str = "PORT";
pub const INIT_TIMEOUT_KEY: &str = "INIT_TIMEOUT_SECS";

const DEFAULT_CONNECTION_STRING: &str = "memory://local";
const DEFAULT_DATABASE_NAME: &str = "ProductDb";
const DEFAULT_PRODUCTS_COLLECTION: &str = "Products";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_INIT_TIMEOUT_SECS: u64 = 30;

/// Key/value view of the process configuration
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `.env` (if present) and then the process environment
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }

        let service = Self::new();
        for (key, value) in env::vars() {
            service.set(&key, &value);
        }
        service
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.clone())
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }

    /// Parse a value, falling back to `default` when the key is unset
    pub fn parse_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e: T::Err| ProductPocError::config(key, format!("{raw:?}: {e}"))),
            None => Ok(default),
        }
    }
}

/// Where the product documents live
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseSettings {
    pub connection_string: String,
    pub database_name: String,
    pub products_collection_name: String,
}

impl DatabaseSettings {
    /// In-process store, used by tests and local runs
    pub fn in_memory(database_name: impl Into<String>) -> Self {
        Self {
            connection_string: DEFAULT_CONNECTION_STRING.to_string(),
            database_name: database_name.into(),
            products_collection_name: DEFAULT_PRODUCTS_COLLECTION.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseSettings,
    pub host: String,
    pub port: u16,
    pub init_timeout: Duration,
}

impl AppConfig {
    pub fn from_config(config: &ConfigService) -> Result<Self> {
        let database = DatabaseSettings {
            connection_string: config.get_or(CONNECTION_STRING_KEY, DEFAULT_CONNECTION_STRING),
            database_name: config.get_or(DATABASE_NAME_KEY, DEFAULT_DATABASE_NAME),
            products_collection_name: config
                .get_or(PRODUCTS_COLLECTION_KEY, DEFAULT_PRODUCTS_COLLECTION),
        };

        if database.database_name.is_empty() {
            return Err(ProductPocError::config(DATABASE_NAME_KEY, "must not be empty"));
        }
        if database.products_collection_name.is_empty() {
            return Err(ProductPocError::config(
                PRODUCTS_COLLECTION_KEY,
                "must not be empty",
            ));
        }

        Ok(Self {
            database,
            host: config.get_or(HOST_KEY, DEFAULT_HOST),
            port: config.parse_or(PORT_KEY, DEFAULT_PORT)?,
            init_timeout: Duration::from_secs(
                config.parse_or(INIT_TIMEOUT_KEY, DEFAULT_INIT_TIMEOUT_SECS)?,
            ),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_the_in_memory_store() {
        let config = AppConfig::from_config(&ConfigService::new()).unwrap();
        assert_eq!(config.database.connection_string, "memory://local");
        assert_eq!(config.database.database_name, "ProductDb");
        assert_eq!(config.database.products_collection_name, "Products");
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.init_timeout, Duration::from_secs(30));
    }

    #[test]
    fn values_override_defaults() {
        let service = ConfigService::new();
        service.set(CONNECTION_STRING_KEY, "mongodb://localhost:27017");
        service.set(DATABASE_NAME_KEY, "Catalog");
        service.set(PRODUCTS_COLLECTION_KEY, "Items");
        service.set(HOST_KEY, "127.0.0.1");
        service.set(PORT_KEY, "8080");

        let config = AppConfig::from_config(&service).unwrap();
        assert_eq!(
            config.database,
            DatabaseSettings {
                connection_string: "mongodb://localhost:27017".to_string(),
                database_name: "Catalog".to_string(),
                products_collection_name: "Items".to_string(),
            }
        );
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn invalid_port_is_a_config_error() {
        let service = ConfigService::new();
        service.set(PORT_KEY, "eighty");

        let err = AppConfig::from_config(&service).unwrap_err();
        assert!(matches!(err, ProductPocError::Config { ref key, .. } if key == PORT_KEY));
    }

    #[test]
    fn empty_collection_name_is_rejected() {
        let service = ConfigService::new();
        service.set(PRODUCTS_COLLECTION_KEY, "");
        assert!(AppConfig::from_config(&service).is_err());
    }
}
