use crate::error::{ProductPocError, Result};
use dashmap::DashMap;
use std::any::{Any, TypeId, type_name};
use std::sync::Arc;

type AnyArc = Arc<dyn Any + Send + Sync>;

/// Turns a registered concrete instance into an `Arc<Arc<dyn Trait>>`
/// erased as `Arc<dyn Any>`.
type CasterFn = Arc<dyn Fn(AnyArc) -> Option<AnyArc> + Send + Sync>;

#[derive(Clone)]
struct Binding {
    impl_id: TypeId,
    caster: CasterFn,
}

/// Thread-safe dependency injection container.
///
/// Concrete components are stored once and handed out as `Arc<T>`. A trait
/// object is resolved either from a binding to a registered concrete type or
/// from a trait object registered directly, which is how the runtime-selected
/// store collection is provided.
#[derive(Clone, Default)]
pub struct Container {
    services: DashMap<TypeId, AnyArc>,
    bindings: DashMap<TypeId, Binding>,
    trait_instances: DashMap<TypeId, AnyArc>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: 'static + Send + Sync>(&mut self, instance: T) -> &mut Self {
        self.services.insert(TypeId::of::<T>(), Arc::new(instance));
        self
    }

    pub fn register_trait<Trait, Impl, F>(&mut self, caster_fn: F) -> &mut Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        Impl: 'static + Send + Sync,
        F: Fn(Arc<Impl>) -> Arc<Trait> + 'static + Send + Sync,
    {
        let caster: CasterFn = Arc::new(move |instance: AnyArc| {
            let concrete = instance.downcast::<Impl>().ok()?;
            let trait_obj: Arc<Trait> = caster_fn(concrete);
            Some(Arc::new(trait_obj) as AnyArc)
        });

        self.bindings.insert(
            TypeId::of::<Trait>(),
            Binding {
                impl_id: TypeId::of::<Impl>(),
                caster,
            },
        );
        self
    }

    pub fn register_trait_instance<Trait>(&mut self, instance: Arc<Trait>) -> &mut Self
    where
        Trait: ?Sized + 'static + Send + Sync,
    {
        self.trait_instances
            .insert(TypeId::of::<Trait>(), Arc::new(instance));
        self
    }

    pub fn resolve<T: 'static + Send + Sync>(&self) -> Result<Arc<T>> {
        let instance = self
            .services
            .get(&TypeId::of::<T>())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ProductPocError::DependencyNotFound {
                type_name: type_name::<T>().to_string(),
            })?;

        instance
            .downcast::<T>()
            .map_err(|_| ProductPocError::DowncastFailed {
                type_name: type_name::<T>().to_string(),
            })
    }

    pub fn resolve_trait<T: ?Sized + 'static + Send + Sync>(&self) -> Result<Arc<T>> {
        let trait_id = TypeId::of::<T>();

        let erased = match self.trait_instances.get(&trait_id) {
            Some(entry) => entry.value().clone(),
            None => {
                let binding = self
                    .bindings
                    .get(&trait_id)
                    .map(|entry| entry.value().clone())
                    .ok_or_else(|| ProductPocError::DependencyNotFound {
                        type_name: format!("No binding found for trait '{}'", type_name::<T>()),
                    })?;

                let instance = self
                    .services
                    .get(&binding.impl_id)
                    .map(|entry| entry.value().clone())
                    .ok_or_else(|| ProductPocError::DependencyNotFound {
                        type_name: format!(
                            "Implementation for trait '{}' not registered",
                            type_name::<T>()
                        ),
                    })?;

                (binding.caster)(instance).ok_or_else(|| ProductPocError::DowncastFailed {
                    type_name: type_name::<T>().to_string(),
                })?
            }
        };

        // The erased value is an Arc<T> wrapped in one more Arc.
        let wrapper = erased
            .downcast::<Arc<T>>()
            .map_err(|_| ProductPocError::DowncastFailed {
                type_name: format!("Arc<{}>", type_name::<T>()),
            })?;
        Ok(wrapper.as_ref().clone())
    }

    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        let type_id = TypeId::of::<T>();
        self.services.contains_key(&type_id)
            || self.bindings.contains_key(&type_id)
            || self.trait_instances.contains_key(&type_id)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CatalogSettings {
        collection: &'static str,
    }

    trait PriceSource: Send + Sync {
        fn price_of(&self, id: &str) -> Option<f64>;
    }

    struct FixedPrices;

    impl PriceSource for FixedPrices {
        fn price_of(&self, id: &str) -> Option<f64> {
            (id == "p-1").then_some(10.0)
        }
    }

    #[test]
    fn test_register_and_resolve() {
        let mut container = Container::new();
        container.register(CatalogSettings {
            collection: "Products",
        });
        let settings = container.resolve::<CatalogSettings>().unwrap();
        assert_eq!(settings.collection, "Products");
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn test_resolve_missing_dependency() {
        let container = Container::new();
        let err = container.resolve::<CatalogSettings>().err().unwrap();
        assert!(matches!(err, ProductPocError::DependencyNotFound { .. }));
    }

    #[test]
    fn test_register_and_resolve_trait_binding() {
        let mut container = Container::new();
        container.register(FixedPrices);
        container.register_trait::<dyn PriceSource, FixedPrices, _>(|i| i as Arc<dyn PriceSource>);
        let prices = container.resolve_trait::<dyn PriceSource>().unwrap();
        assert_eq!(prices.price_of("p-1"), Some(10.0));
        assert_eq!(prices.price_of("p-2"), None);
    }

    #[test]
    fn test_binding_without_implementation_fails() {
        let mut container = Container::new();
        container.register_trait::<dyn PriceSource, FixedPrices, _>(|i| i as Arc<dyn PriceSource>);
        assert!(container.resolve_trait::<dyn PriceSource>().is_err());
    }

    #[test]
    fn test_register_trait_instance() {
        let mut container = Container::new();
        let prices: Arc<dyn PriceSource> = Arc::new(FixedPrices);
        container.register_trait_instance(prices);
        assert!(container.contains::<dyn PriceSource>());
        let resolved = container.resolve_trait::<dyn PriceSource>().unwrap();
        assert_eq!(resolved.price_of("p-1"), Some(10.0));
    }
}
