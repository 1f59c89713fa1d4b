// Core traits for the service container

use crate::{Error, Result, ServiceRef, TypeDescriptor};
use std::any::{type_name, Any};
use std::sync::Arc;

/// Read access to services by id.
///
/// The container implements this, and every factory receives one so it can
/// pull its own dependencies.
pub trait ServiceLocator {
    /// Return the service registered under `id`
    fn get(&self, id: &str) -> Result<ServiceRef>;

    /// Check whether `id` can be served
    fn has(&self, id: &str) -> bool;
}

/// Typed helpers available on every locator
pub trait ServiceLocatorExt: ServiceLocator {
    /// Get a service and downcast it to `T`
    fn get_as<T: Any + Send + Sync>(&self, id: &str) -> Result<Arc<T>> {
        let service = self.get(id)?;
        service.downcast::<T>().ok_or_else(|| Error::TypeMismatch {
            id: id.to_string(),
            expected: type_name::<T>(),
            actual: service.type_name(),
        })
    }

    /// Get the service registered under the type name of `T`
    fn get_typed<T: Any + Send + Sync>(&self) -> Result<Arc<T>> {
        self.get_as::<T>(type_name::<T>())
    }
}

impl<L: ServiceLocator + ?Sized> ServiceLocatorExt for L {}

/// An object that produces services on demand
pub trait ServiceFactory: Send + Sync + 'static {
    /// Create the service requested as `id`.
    ///
    /// `id` is the id the factory is bound to; most factories ignore it.
    fn create(&self, locator: &dyn ServiceLocator, id: &str) -> Result<ServiceRef>;
}

/// Types that describe their own constructor for auto-wiring
pub trait Injectable: Sized + Send + Sync + 'static {
    fn descriptor() -> TypeDescriptor;
}
