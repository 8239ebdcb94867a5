use super::LifecycleError;
use async_trait::async_trait;

/// Called once the container is built, before the server accepts requests.
///
/// The database handle uses it to verify the connection.
#[async_trait]
pub trait OnModuleInit: Send + Sync {
    async fn on_module_init(&mut self) -> Result<(), LifecycleError>;
}

/// Called during graceful shutdown, in reverse registration order.
#[async_trait]
pub trait OnModuleDestroy: Send + Sync {
    async fn on_module_destroy(&mut self) -> Result<(), LifecycleError>;
}
