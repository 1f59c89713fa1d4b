// Mock locators and factories for testing

use armature_di_core::{
    Error, Factory, NotCreatedReason, Registry, Result, ServiceFactory, ServiceLocator,
    ServiceRef,
};
use parking_lot::Mutex;
use std::any::Any;
use std::sync::Arc;

/// A call made against a [`MockLocator`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorCall {
    Has(String),
    Get(String),
}

/// Map-backed locator that records every lookup
#[derive(Clone, Default)]
pub struct MockLocator {
    services: Registry<ServiceRef>,
    calls: Arc<Mutex<Vec<LocatorCall>>>,
}

impl MockLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `service` under `id`
    pub fn with_service(mut self, id: impl Into<String>, service: ServiceRef) -> Self {
        self.services.add(service, id);
        self
    }

    /// Serve a freshly wrapped `value` under `id`
    pub fn with_value<T: Any + Send + Sync>(self, id: impl Into<String>, value: T) -> Self {
        self.with_service(id, ServiceRef::new(value))
    }

    /// The handle served under `id`, for identity checks
    pub fn service(&self, id: &str) -> Option<ServiceRef> {
        self.services.get(id).cloned()
    }

    pub fn calls(&self) -> Vec<LocatorCall> {
        self.calls.lock().clone()
    }

    /// Number of `get` calls for `id`
    pub fn get_count(&self, id: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, LocatorCall::Get(requested) if requested == id))
            .count()
    }

    /// Whether `id` was fetched with `get`
    pub fn was_requested(&self, id: &str) -> bool {
        self.get_count(id) > 0
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }
}

impl ServiceLocator for MockLocator {
    fn get(&self, id: &str) -> Result<ServiceRef> {
        self.calls.lock().push(LocatorCall::Get(id.to_string()));
        self.services
            .get(id)
            .cloned()
            .ok_or_else(|| Error::ServiceNotFound { id: id.to_string() })
    }

    fn has(&self, id: &str) -> bool {
        self.calls.lock().push(LocatorCall::Has(id.to_string()));
        self.services.has(id)
    }
}

type Producer = Arc<dyn Fn() -> Result<ServiceRef> + Send + Sync>;

/// Factory that counts its invocations.
///
/// Clones share the call log, so a clone can be registered while the
/// original stays in the test for inspection.
#[derive(Clone)]
pub struct MockFactory {
    produce: Producer,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockFactory {
    /// Create a new value with `produce` on every call
    pub fn producing<T, F>(produce: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::from_producer(Arc::new(move || Ok(ServiceRef::new(produce()))))
    }

    /// Return the same handle on every call
    pub fn returning(service: ServiceRef) -> Self {
        Self::from_producer(Arc::new(move || Ok(service.clone())))
    }

    /// Fail every call with a construction error
    pub fn failing(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::from_producer(Arc::new(move || {
            Err(Error::not_created(
                "MockFactory",
                NotCreatedReason::Construction {
                    message: message.clone(),
                },
            ))
        }))
    }

    fn from_producer(produce: Producer) -> Self {
        Self {
            produce,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Ids the factory was invoked for, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn was_called_with(&self, id: &str) -> bool {
        self.calls.lock().iter().any(|called| called == id)
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// A factory binding sharing this mock's call log
    pub fn binding(&self) -> Factory {
        Factory::object(self.clone())
    }
}

impl ServiceFactory for MockFactory {
    fn create(&self, _locator: &dyn ServiceLocator, id: &str) -> Result<ServiceRef> {
        self.calls.lock().push(id.to_string());
        (self.produce)()
    }
}

/// Wraps a factory and records the ids it is invoked for
pub struct Spy<F> {
    inner: Arc<F>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl<F> Clone for Spy<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            calls: Arc::clone(&self.calls),
        }
    }
}

impl<F: ServiceFactory> Spy<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner: Arc::new(inner),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn was_called(&self, id: &str) -> bool {
        self.calls.lock().iter().any(|called| called == id)
    }

    /// Get the wrapped factory
    pub fn inner(&self) -> &F {
        &self.inner
    }

    pub fn binding(&self) -> Factory {
        Factory::object(self.clone())
    }
}

impl<F: ServiceFactory> ServiceFactory for Spy<F> {
    fn create(&self, locator: &dyn ServiceLocator, id: &str) -> Result<ServiceRef> {
        self.calls.lock().push(id.to_string());
        self.inner.create(locator, id)
    }
}
