use anyhow::Context;
use product_poc::app_module::AppModule;
use product_poc::config::{AppConfig, ConfigService};
use product_poc::persistence::DbContext;
use product_poc::prelude::*;
use tokio::sync::RwLock;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "product_poc=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    tracing::info!("Starting product service...");

    // 1. Configuration
    let config = ConfigService::from_env();
    let settings = AppConfig::from_config(&config)?;

    // 2. Document store client (connection is verified in OnModuleInit)
    let db = DbContext::connect(settings.database.clone())
        .await
        .context("failed to create document store client")?;
    let db_lifecycle = Arc::new(RwLock::new(db.clone()));

    // 3. Container: infrastructure first, then AppModule
    let container = AppModule::create_container(ContainerBuilder::new().register(db).build())
        .context("failed to register AppModule")?;

    // 4. Lifecycle
    let app = Application::builder()
        .container(container)
        .register_lifecycle(db_lifecycle, "DbContext")
        .init_timeout(settings.init_timeout)
        .build()
        .await
        .context("failed to initialize application")?;

    // 5. HTTP
    let addr = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("Server listening on http://{}", addr);

    // In-flight requests drain before the store is closed.
    AppModule::serve(listener, app, async {
        shutdown_signal().await;
        tracing::info!("Initiating graceful shutdown...");
    })
    .await
    .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}
