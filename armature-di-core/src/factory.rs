// Factory bindings and registration specs

use crate::{Error, InjectionResolver, Result, ServiceFactory, ServiceLocator, ServiceRef};
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

/// Closure factory signature
pub type FactoryFn = dyn Fn(&dyn ServiceLocator, &str) -> Result<ServiceRef> + Send + Sync;

/// A value bound to a service id in the factory registry
#[derive(Clone)]
pub enum Factory {
    /// Callable invoked with the locator and the requested id
    Closure(Arc<FactoryFn>),
    /// Pre-built factory object
    Object(Arc<dyn ServiceFactory>),
    /// A bound value that cannot be invoked
    Inert(ServiceRef),
}

impl Factory {
    pub fn closure<F>(factory: F) -> Self
    where
        F: Fn(&dyn ServiceLocator, &str) -> Result<ServiceRef> + Send + Sync + 'static,
    {
        Factory::Closure(Arc::new(factory))
    }

    /// Closure factory producing a `T`, ignoring the requested id
    pub fn of<T, F>(factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&dyn ServiceLocator) -> Result<T> + Send + Sync + 'static,
    {
        Self::closure(move |locator, _id| factory(locator).map(ServiceRef::new))
    }

    pub fn object<F: ServiceFactory>(factory: F) -> Self {
        Factory::Object(Arc::new(factory))
    }

    pub fn inert<T: Any + Send + Sync>(value: T) -> Self {
        Factory::Inert(ServiceRef::new(value))
    }

    pub fn is_invokable(&self) -> bool {
        !matches!(self, Factory::Inert(_))
    }

    /// Invoke the factory for `id`; inert bindings fail with `InvalidFactory`
    pub fn invoke(&self, locator: &dyn ServiceLocator, id: &str) -> Result<ServiceRef> {
        match self {
            Factory::Closure(factory) => factory(locator, id),
            Factory::Object(factory) => factory.create(locator, id),
            Factory::Inert(value) => Err(Error::InvalidFactory {
                id: id.to_string(),
                factory: value.clone(),
            }),
        }
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Factory::Closure(_) => f.write_str("Factory::Closure"),
            Factory::Object(_) => f.write_str("Factory::Object"),
            Factory::Inert(value) => f.debug_tuple("Factory::Inert").field(value).finish(),
        }
    }
}

/// What to bind when registering a factory.
///
/// Strings convert to [`FactorySpec::Resolver`] when they name the injection
/// resolver and to [`FactorySpec::TypeName`] otherwise.
#[derive(Debug, Clone)]
pub enum FactorySpec {
    /// Constructible type to instantiate eagerly and bind as the factory
    TypeName(String),
    /// The container's injection resolver
    Resolver,
    /// Bound as given
    Factory(Factory),
    /// Raw configuration value, bound as an inert factory
    Value(serde_json::Value),
}

impl FactorySpec {
    /// Factory spec naming the type `T`
    pub fn type_of<T: ?Sized + 'static>() -> Self {
        FactorySpec::from(type_name::<T>())
    }

    /// Factory spec from a parsed configuration value
    pub fn from_value(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(name) => FactorySpec::from(name),
            other => FactorySpec::Value(other),
        }
    }
}

impl From<&str> for FactorySpec {
    fn from(name: &str) -> Self {
        if name == InjectionResolver::service_id() {
            FactorySpec::Resolver
        } else {
            FactorySpec::TypeName(name.to_string())
        }
    }
}

impl From<String> for FactorySpec {
    fn from(name: String) -> Self {
        if name == InjectionResolver::service_id() {
            FactorySpec::Resolver
        } else {
            FactorySpec::TypeName(name)
        }
    }
}

impl From<Factory> for FactorySpec {
    fn from(factory: Factory) -> Self {
        FactorySpec::Factory(factory)
    }
}
