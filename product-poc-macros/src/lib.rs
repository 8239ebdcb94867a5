use proc_macro::TokenStream;

mod controller;
mod http_methods;
mod injectable;
mod module;

/// Derive macro that builds a component from the DI container.
///
/// Every field must be an `Arc<T>`. Concrete types are looked up with
/// `Container::resolve`, trait objects (`Arc<dyn Trait>`) with
/// `Container::resolve_trait`.
///
/// # Example
/// ```ignore
/// use product_poc::prelude::*;
///
/// #[derive(Injectable)]
/// pub struct ProductService {
///     repository: Arc<dyn ProductRepository>,
/// }
/// ```
#[proc_macro_derive(Injectable)]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    injectable::derive_injectable(input)
}

/// Marks a struct as a controller mounted at `path`.
///
/// Generates the `Injectable` impl (same rules as the derive) plus
/// `BASE_PATH` / `base_path()`.
///
/// # Example
/// ```ignore
/// #[controller(path = "/api/product")]
/// pub struct ProductController {
///     service: Arc<ProductService>,
/// }
/// ```
#[proc_macro_attribute]
pub fn controller(attr: TokenStream, item: TokenStream) -> TokenStream {
    controller::controller_attribute(attr, item)
}

/// Generates `router(Arc<Self>) -> Router<S>` from the route attributes of
/// an impl block.
///
/// Parameters marked `#[param]` are extracted with `Path`, `#[query]` with
/// `Query` and `#[body]` with `Json` (must be last). Handlers return anything
/// implementing `IntoResponse`.
///
/// # Example
/// ```ignore
/// #[routes]
/// impl ProductController {
///     #[get("/{id}")]
///     pub async fn get_by_id(&self, #[param] id: String) -> Result<Response> {
///         // ...
///     }
///
///     #[put("/{id}")]
///     pub async fn update(&self, #[param] id: String, #[body] dto: UpdateProductDto) -> Result<Response> {
///         // ...
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn routes(attr: TokenStream, item: TokenStream) -> TokenStream {
    controller::routes_attribute(attr, item)
}

/// Declares a module: trait bindings, imported modules, providers and
/// controllers, registered in that order.
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
#[proc_macro_attribute]
pub fn module(attr: TokenStream, item: TokenStream) -> TokenStream {
    module::module_attribute(attr, item)
}

/// HTTP GET route, read by `#[routes]`
#[proc_macro_attribute]
pub fn get(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute(attr, item)
}

/// HTTP POST route, read by `#[routes]`
#[proc_macro_attribute]
pub fn post(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute(attr, item)
}

/// HTTP PUT route, read by `#[routes]`
#[proc_macro_attribute]
pub fn put(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute(attr, item)
}

/// HTTP DELETE route, read by `#[routes]`
#[proc_macro_attribute]
pub fn delete(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute(attr, item)
}

/// HTTP PATCH route, read by `#[routes]`
#[proc_macro_attribute]
pub fn patch(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute(attr, item)
}
