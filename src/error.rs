use crate::lifecycle::LifecycleError;
use crate::persistence::StoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProductPocError>;

#[derive(Debug, Error)]
pub enum ProductPocError {
    #[error("Dependency not found: {type_name}")]
    DependencyNotFound { type_name: String },

    #[error("Failed to downcast type: {type_name}")]
    DowncastFailed { type_name: String },

    #[error("Invalid configuration for {key}: {message}")]
    Config { key: String, message: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProductPocError {
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            key: key.into(),
            message: message.into(),
        }
    }
}

// Every failure that reaches the HTTP boundary is an unstructured 500.
impl axum::response::IntoResponse for ProductPocError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!(error = %self, "request failed");
        (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            self.to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn store_errors_surface_as_internal_server_error() {
        let err = ProductPocError::from(StoreError::DuplicateKey {
            collection: "Products".to_string(),
            id: "p-1".to_string(),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn config_error_names_the_key() {
        let err = ProductPocError::config("PORT", "not a number");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for PORT: not a number"
        );
    }
}
