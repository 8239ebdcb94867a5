use crate::di::Container;
use crate::error::Result;

/// A group of components that registers itself into the container
///
/// Usually implemented with `#[module]`, which registers trait bindings,
/// imported modules, providers and controllers in that order.
///
/// # Example
/// ```ignore
/// #[module(
///     bindings = [(dyn ProductRepository => ProductRepositoryImpl)],
///     providers = [ProductRepositoryImpl, ProductService],
///     controllers = [ProductController],
/// )]
/// pub struct ProductModule;
/// ```
pub trait Module {
    fn register(container: &mut Container) -> Result<()>;
}
