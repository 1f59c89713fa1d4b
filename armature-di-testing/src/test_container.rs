// Test container for dependency injection

use crate::MockFactory;
use armature_di_core::{Result, ServiceContainer, ServiceRef, TypeCatalog};
use std::any::Any;

/// Service container wrapper with shortcuts for registering test doubles
pub struct TestContainer {
    container: ServiceContainer,
}

impl TestContainer {
    pub fn new() -> Self {
        Self::with_catalog(TypeCatalog::new())
    }

    pub fn with_catalog(catalog: TypeCatalog) -> Self {
        Self {
            container: ServiceContainer::new(catalog),
        }
    }

    /// Bind a mock factory to `id`, returning a handle sharing its call log
    pub fn register_mock(&self, id: &str, mock: MockFactory) -> Result<MockFactory> {
        self.container.add_factory(mock.binding(), id)?;
        Ok(mock)
    }

    /// Bind a mock factory whose products are never cached
    pub fn register_transient_mock(&self, id: &str, mock: MockFactory) -> Result<MockFactory> {
        let mock = self.register_mock(id, mock)?;
        self.container.set_singletone(false, id)?;
        Ok(mock)
    }

    /// Seed an instance, returning its handle for identity checks
    pub fn register_instance<T: Any + Send + Sync>(&self, id: &str, value: T) -> Result<ServiceRef> {
        let service = ServiceRef::new(value);
        self.container.add(service.clone(), id)?;
        Ok(service)
    }

    pub fn get(&self, id: &str) -> Result<ServiceRef> {
        self.container.get(id)
    }

    /// Get the underlying container
    pub fn inner(&self) -> &ServiceContainer {
        &self.container
    }
}

impl Default for TestContainer {
    fn default() -> Self {
        Self::new()
    }
}
