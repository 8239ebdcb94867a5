use super::{LifecycleError, LifecycleManager, OnModuleDestroy, OnModuleInit, Result};
use crate::di::Container;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// A started application: the frozen container plus the hooks to run on
/// shutdown.
///
/// # Example
///
/// ```rust,ignore
/// let app = Application::builder()
///     .container(container)
///     .register_lifecycle(Arc::new(RwLock::new(db.clone())), "DbContext")
///     .init_timeout(Duration::from_secs(30))
///     .build()
///     .await?;
///
/// // serve...
///
/// app.shutdown().await?;
/// ```
pub struct Application {
    container: Arc<Container>,
    lifecycle_manager: Arc<LifecycleManager>,
}

impl Application {
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::new()
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    pub fn lifecycle_manager(&self) -> &Arc<LifecycleManager> {
        &self.lifecycle_manager
    }

    /// Run the OnModuleDestroy hooks
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Shutting down application...");
        self.lifecycle_manager.call_module_destroy().await?;
        tracing::info!("Application shutdown complete");
        Ok(())
    }
}

pub struct ApplicationBuilder {
    container: Option<Container>,
    lifecycle_manager: LifecycleManager,
    init_timeout: Option<Duration>,
}

impl Default for ApplicationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationBuilder {
    pub fn new() -> Self {
        Self {
            container: None,
            lifecycle_manager: LifecycleManager::new(),
            init_timeout: None,
        }
    }

    pub fn container(mut self, container: Container) -> Self {
        self.container = Some(container);
        self
    }

    /// Upper bound for all OnModuleInit hooks together
    pub fn init_timeout(mut self, timeout: Duration) -> Self {
        self.init_timeout = Some(timeout);
        self
    }

    pub fn on_init<T>(mut self, service: Arc<RwLock<T>>, name: impl Into<String>) -> Self
    where
        T: OnModuleInit + 'static,
    {
        self.lifecycle_manager.register_init(service, name);
        self
    }

    pub fn on_destroy<T>(mut self, service: Arc<RwLock<T>>, name: impl Into<String>) -> Self
    where
        T: OnModuleDestroy + 'static,
    {
        self.lifecycle_manager.register_destroy(service, name);
        self
    }

    /// Register a component for both init and destroy
    pub fn register_lifecycle<T>(self, service: Arc<RwLock<T>>, name: impl Into<String>) -> Self
    where
        T: OnModuleInit + OnModuleDestroy + 'static,
    {
        let name = name.into();
        self.on_init(Arc::clone(&service), name.clone())
            .on_destroy(service, name)
    }

    /// Run the OnModuleInit hooks and freeze the container
    pub async fn build(self) -> Result<Application> {
        let container = self
            .container
            .ok_or_else(|| LifecycleError::init_failed("Container not provided"))?;

        tracing::info!("Starting application initialization...");

        match self.init_timeout {
            Some(timeout) => {
                self.lifecycle_manager
                    .call_module_init_with_timeout(timeout)
                    .await?
            }
            None => self.lifecycle_manager.call_module_init().await?,
        }

        tracing::info!("Application initialization complete");

        Ok(Application {
            container: Arc::new(container),
            lifecycle_manager: Arc::new(self.lifecycle_manager),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowStore;

    #[async_trait::async_trait]
    impl OnModuleInit for SlowStore {
        async fn on_module_init(&mut self) -> Result<()> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl OnModuleDestroy for SlowStore {
        async fn on_module_destroy(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_build_requires_container() {
        let err = Application::builder().build().await.err().unwrap();
        assert!(matches!(err, LifecycleError::InitializationFailed(_)));
    }

    #[tokio::test]
    async fn test_init_timeout_is_enforced() {
        let err = Application::builder()
            .container(Container::new())
            .register_lifecycle(Arc::new(RwLock::new(SlowStore)), "SlowStore")
            .init_timeout(Duration::from_millis(10))
            .build()
            .await
            .err()
            .unwrap();
        assert!(matches!(err, LifecycleError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_build_and_shutdown() {
        let app = Application::builder()
            .container(Container::new())
            .register_lifecycle(Arc::new(RwLock::new(SlowStore)), "SlowStore")
            .build()
            .await
            .unwrap();
        assert_eq!(app.lifecycle_manager().destroy_hook_count(), 1);
        app.shutdown().await.unwrap();
    }
}
