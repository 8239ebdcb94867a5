use crate::di::Container;
use crate::error::Result;

/// Trait for components that are built from the DI container
///
/// Usually implemented with `#[derive(Injectable)]`, which resolves every
/// `Arc<...>` field from the container.
///
/// # Example
/// ```ignore
/// use product_poc::prelude::*;
///
/// #[derive(Injectable)]
/// pub struct ProductService {
///     // Bound to ProductRepositoryImpl by ProductModule
///     repository: Arc<dyn ProductRepository>,
/// }
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Create an instance by resolving dependencies from the container
    ///
    /// # Errors
    /// Returns an error if any required dependency is not registered.
    fn inject(container: &Container) -> Result<Self>;
}
