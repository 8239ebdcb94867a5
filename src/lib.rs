//! # product-poc
//!
//! CRUD HTTP service for a `Product` resource stored in a document database.
//!
//! The service is assembled from three layers wired through a small
//! dependency injection container:
//!
//! - **Controller**: maps `/api/product` requests onto the service and
//!   translates "not found" into 404
//! - **Service**: assigns identifiers to new products and delegates storage
//! - **Repository**: reads and writes the products collection through
//!   [`persistence::DocumentCollection`]
//!
//! The collection is either the in-process store (`memory://` connection
//! strings) or MongoDB (`mongodb://`, behind the `mongodb-store` feature).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use product_poc::app_module::AppModule;
//! use product_poc::persistence::DbContext;
//! use product_poc::prelude::*;
//!
//! # async fn run() -> product_poc::Result<()> {
//! let infrastructure = ContainerBuilder::new()
//!     .register(DbContext::in_memory("ProductDb"))
//!     .build();
//! let container = AppModule::create_container(infrastructure)?;
//! let app = Application::builder().container(container).build().await?;
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! AppModule::serve(listener, app, shutdown_signal()).await?;
//! # Ok(())
//! # }
//! ```

extern crate self as product_poc;

pub mod app_module;
pub mod config;
pub mod di;
pub mod error;
pub mod lifecycle;
pub mod module;
pub mod persistence;
pub mod product;

// Re-export core types
pub use di::{Container, ContainerBuilder, Injectable};
pub use error::{ProductPocError, Result};
pub use module::Module;

pub use product_poc_macros::{
    Injectable as DeriveInjectable, controller, delete, get, module, patch, post, put, routes,
};

pub use async_trait::async_trait;
pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use product_poc::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        DeriveInjectable as Injectable, controller, delete, get, module, patch, post, put, routes,
    };
    pub use crate::di::{Container, ContainerBuilder, Injectable};
    pub use crate::error::{ProductPocError, Result};
    pub use crate::lifecycle::{
        Application, ApplicationBuilder, LifecycleError, LifecycleManager, OnModuleDestroy,
        OnModuleInit, shutdown_signal,
    };
    pub use crate::module::Module;
    pub use async_trait::async_trait;
    pub use axum::{
        Json, Router,
        extract::{Path, State},
        http::StatusCode,
        response::{IntoResponse, Response},
    };
    pub use std::sync::Arc;
}
