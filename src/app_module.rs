use crate::prelude::*;
use crate::product::{ProductController, ProductModule};
use axum::ServiceExt;
use axum::extract::Request;
use axum::http::Uri;
use axum::http::uri::PathAndQuery;
use std::future::Future;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower::util::MapRequest;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

/// Root module: imports every feature module
#[module(imports = [ProductModule])]
pub struct AppModule;

/// Controller mount points; a request path matching one of them in any
/// letter case is rewritten to the canonical spelling.
const ROUTE_PREFIXES: &[&str] = &[ProductController::BASE_PATH];

/// The router behind path normalisation
pub type AppService = NormalizePath<MapRequest<Router, fn(Request) -> Request>>;

impl AppModule {
    /// HTTP router for all controllers, with request tracing
    pub fn router(container: &Container) -> Result<Router> {
        let product_controller = container.resolve::<ProductController>()?;

        let router = Router::new()
            .nest(
                ProductController::base_path(),
                ProductController::router(product_controller),
            )
            .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));
        Ok(router)
    }

    /// [`Self::router`] wrapped so paths are normalised before routing:
    /// a trailing slash is dropped and controller prefixes ignore case.
    pub fn service(container: &Container) -> Result<AppService> {
        let router = Self::router(container)?;
        Ok(ServiceBuilder::new()
            .layer(NormalizePathLayer::trim_trailing_slash())
            .map_request(canonical_prefix as fn(Request) -> Request)
            .service(router))
    }

    /// Serve `app` until `signal` completes, wait for in-flight requests,
    /// then run the destroy hooks.
    pub async fn serve<F>(listener: TcpListener, app: Application, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let service = Self::service(app.container())?;

        axum::serve(listener, ServiceExt::<Request>::into_make_service(service))
            .with_graceful_shutdown(signal)
            .await?;

        app.shutdown().await?;
        Ok(())
    }
}

fn canonical_prefix(mut request: Request) -> Request {
    if let Some(uri) = rewrite_prefix(request.uri()) {
        *request.uri_mut() = uri;
    }
    request
}

fn rewrite_prefix(uri: &Uri) -> Option<Uri> {
    let path = uri.path();
    let base = ROUTE_PREFIXES
        .iter()
        .copied()
        .find(|base| starts_with_ignore_case(path, base))?;
    if path.starts_with(base) {
        return None;
    }

    let mut rewritten = format!("{}{}", base, &path[base.len()..]);
    if let Some(query) = uri.query() {
        rewritten.push('?');
        rewritten.push_str(query);
    }

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(rewritten.parse::<PathAndQuery>().ok()?);
    Uri::from_parts(parts).ok()
}

/// `base` followed by the end of the path or a `/`
fn starts_with_ignore_case(path: &str, base: &str) -> bool {
    path.len() >= base.len()
        && path.as_bytes()[..base.len()].eq_ignore_ascii_case(base.as_bytes())
        && matches!(path.as_bytes().get(base.len()), None | Some(b'/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::{RwLock, oneshot};

    /// Records whether the server still accepted connections when the
    /// destroy hooks ran
    struct ListenerCheck {
        addr: SocketAddr,
        accepting: Arc<AtomicBool>,
    }

    #[async_trait]
    impl OnModuleDestroy for ListenerCheck {
        async fn on_module_destroy(&mut self) -> std::result::Result<(), LifecycleError> {
            let accepting = tokio::net::TcpStream::connect(self.addr).await.is_ok();
            self.accepting.store(accepting, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn destroy_hooks_run_after_the_server_stops() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepting = Arc::new(AtomicBool::new(true));

        let container = AppModule::create_container(
            ContainerBuilder::new()
                .register(crate::persistence::DbContext::in_memory("ProductDb"))
                .build(),
        )
        .unwrap();
        let app = Application::builder()
            .container(container)
            .on_destroy(
                Arc::new(RwLock::new(ListenerCheck {
                    addr,
                    accepting: Arc::clone(&accepting),
                })),
                "ListenerCheck",
            )
            .build()
            .await
            .unwrap();

        let (stop, stopped) = oneshot::channel::<()>();
        let server = tokio::spawn(AppModule::serve(listener, app, async move {
            let _ = stopped.await;
        }));

        // The server is up before the signal fires.
        assert!(tokio::net::TcpStream::connect(addr).await.is_ok());

        stop.send(()).unwrap();
        server.await.unwrap().unwrap();
        assert!(!accepting.load(Ordering::SeqCst));
    }

    fn rewritten(uri: &str) -> Option<String> {
        rewrite_prefix(&uri.parse::<Uri>().unwrap()).map(|u| u.to_string())
    }

    #[test]
    fn prefix_case_is_canonicalised() {
        assert_eq!(rewritten("/API/Product"), Some("/api/product".to_string()));
        assert_eq!(
            rewritten("/api/PRODUCT/AbC-1?x=Y"),
            Some("/api/product/AbC-1?x=Y".to_string())
        );
    }

    #[test]
    fn canonical_and_foreign_paths_are_left_alone() {
        assert_eq!(rewritten("/api/product/abc"), None);
        assert_eq!(rewritten("/api/products"), None);
        assert_eq!(rewritten("/health"), None);
    }
}
