use crate::di::Container;
use std::sync::Arc;

/// Builder for the application container
///
/// Infrastructure that has no DI dependencies of its own (configuration,
/// the database handle) is registered here before any module runs.
///
/// # Example
/// ```ignore
/// let container = ContainerBuilder::new()
///     .register(config)
///     .register(db_context)
///     .build();
/// ```
pub struct ContainerBuilder {
    container: Container,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self {
            container: Container::new(),
        }
    }

    /// Register a concrete instance
    pub fn register<T: 'static + Send + Sync>(mut self, instance: T) -> Self {
        self.container.register(instance);
        self
    }

    /// Bind a trait to a concrete type that is (or will be) registered
    pub fn bind<Trait, Impl, F>(mut self, caster: F) -> Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        Impl: 'static + Send + Sync,
        F: Fn(Arc<Impl>) -> Arc<Trait> + 'static + Send + Sync,
    {
        self.container.register_trait::<Trait, Impl, F>(caster);
        self
    }

    /// Register an already built trait object
    pub fn provide<Trait>(mut self, instance: Arc<Trait>) -> Self
    where
        Trait: ?Sized + 'static + Send + Sync,
    {
        self.container.register_trait_instance(instance);
        self
    }

    pub fn build(self) -> Container {
        self.container
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Clock: Send + Sync {
        fn now(&self) -> u64;
    }

    struct FixedClock(u64);

    impl Clock for FixedClock {
        fn now(&self) -> u64 {
            self.0
        }
    }

    #[test]
    fn bind_resolves_through_registered_impl() {
        let container = ContainerBuilder::new()
            .register(FixedClock(7))
            .bind::<dyn Clock, FixedClock, _>(|c| c as Arc<dyn Clock>)
            .build();

        assert_eq!(container.resolve_trait::<dyn Clock>().unwrap().now(), 7);
    }

    #[test]
    fn provide_registers_a_prebuilt_trait_object() {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(42));
        let container = ContainerBuilder::new().provide(clock).build();

        assert!(container.contains::<dyn Clock>());
        assert_eq!(container.resolve_trait::<dyn Clock>().unwrap().now(), 42);
        assert!(container.is_empty());
    }
}
