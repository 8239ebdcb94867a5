pub mod controller;
pub mod dto;
pub mod model;
pub mod repository;
pub mod service;

pub use controller::ProductController;
pub use dto::{CreateProductDto, ProductDto, UpdateProductDto};
pub use model::{Product, ProductChanges};
pub use repository::{ProductRepository, ProductRepositoryImpl};
pub use service::ProductService;

use crate::prelude::*;

/// Product stack: repository binding, repository, service and controller.
///
/// Expects a [`DbContext`](crate::persistence::DbContext) in the container.
#[module(
    bindings = [(dyn ProductRepository => ProductRepositoryImpl)],
    providers = [ProductRepositoryImpl, ProductService],
    controllers = [ProductController],
)]
pub struct ProductModule;
