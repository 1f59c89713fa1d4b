// Service container

use crate::config::CONFIG_KEY;
use crate::logging::{debug, trace, warn};
use crate::{
    ContainerConfig, Error, Factory, FactorySpec, InjectionResolver, Registry, Result,
    ServiceFactory, ServiceLocator, ServiceLocatorExt, ServiceRef, Settings, TypeCatalog,
};
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, ThreadId};

/// Ids currently being created, per thread
#[derive(Default)]
struct ResolutionStack {
    stacks: Mutex<HashMap<ThreadId, Vec<String>>>,
}

impl ResolutionStack {
    /// Push `id` for the current thread, failing if it is already being created
    fn enter(&self, id: &str) -> Result<ResolutionGuard<'_>> {
        let thread = thread::current().id();
        let mut stacks = self.stacks.lock();
        let stack = stacks.entry(thread).or_default();

        if let Some(start) = stack.iter().position(|entry| entry == id) {
            let mut chain = stack[start..].to_vec();
            chain.push(id.to_string());
            return Err(Error::CircularDependency { chain });
        }

        stack.push(id.to_string());
        Ok(ResolutionGuard {
            stack: self,
            thread,
        })
    }

    fn depth(&self) -> usize {
        let thread = thread::current().id();
        self.stacks.lock().get(&thread).map_or(0, Vec::len)
    }
}

struct ResolutionGuard<'a> {
    stack: &'a ResolutionStack,
    thread: ThreadId,
}

impl Drop for ResolutionGuard<'_> {
    fn drop(&mut self) {
        let mut stacks = self.stack.stacks.lock();
        if let Some(stack) = stacks.get_mut(&self.thread) {
            stack.pop();
            if stack.is_empty() {
                stacks.remove(&self.thread);
            }
        }
    }
}

struct Inner {
    services: RwLock<Registry<ServiceRef>>,
    factories: RwLock<Registry<Factory>>,
    singletones: RwLock<Registry<bool>>,
    catalog: TypeCatalog,
    resolving: ResolutionStack,
}

/// Lazily creates services from registered factories and caches them
/// according to the singleton policy.
///
/// The container is a cheap handle; clones share the same state. An id
/// without a singleton entry is cached after its first creation. An id
/// flagged `false` is created anew on every [`get`](ServiceContainer::get).
#[derive(Clone)]
pub struct ServiceContainer {
    inner: Arc<Inner>,
}

impl ServiceContainer {
    /// Create a container whose injection resolver builds types from `catalog`
    pub fn new(catalog: TypeCatalog) -> Self {
        Self::with_values(catalog, Vec::<(String, ServiceRef)>::new())
    }

    /// Create a container with services already in its cache
    pub fn with_values<K, I>(catalog: TypeCatalog, values: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ServiceRef)>,
    {
        let services: Registry<ServiceRef> = values.into_iter().collect();

        let mut factories = Registry::new();
        factories.add(
            Factory::object(InjectionResolver::new(catalog.clone())),
            InjectionResolver::service_id(),
        );
        let mut singletones = Registry::new();
        singletones.add(false, InjectionResolver::service_id());

        debug!(
            seeded = services.count(),
            known_types = catalog.count(),
            "Creating new service container"
        );

        Self {
            inner: Arc::new(Inner {
                services: RwLock::new(services),
                factories: RwLock::new(factories),
                singletones: RwLock::new(singletones),
                catalog,
                resolving: ResolutionStack::default(),
            }),
        }
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.inner.catalog
    }

    /// Load configuration values and the `services` section.
    ///
    /// Every factory is registered before any singleton flag is applied.
    pub fn init(&self, config: ContainerConfig) -> Result<()> {
        self.add(ServiceRef::new(config.values()), CONFIG_KEY)?;

        if let Some(services) = config.services() {
            debug!(
                factories = services.factories().count(),
                singletones = services.singletones().count(),
                "Initializing services from configuration"
            );
            for (id, spec) in services.factories().iter() {
                self.add_factory(spec.clone(), id)?;
            }
            for (id, is_singleton) in services.singletones().iter() {
                self.set_singletone(*is_singleton, id)?;
            }
        }

        Ok(())
    }

    /// Put a service into the cache, replacing any cached instance
    pub fn add(&self, service: ServiceRef, id: impl Into<String>) -> Result<()> {
        let id = valid_id(id.into())?;
        trace!(service = %id, "Adding service instance");
        self.inner.services.write().add(service, id);
        Ok(())
    }

    /// Typed [`ServiceContainer::add`]
    pub fn add_instance<T: Any + Send + Sync>(&self, value: T, id: impl Into<String>) -> Result<()> {
        self.add(ServiceRef::new(value), id)
    }

    /// Return the service registered under `id`, creating it when needed
    pub fn get(&self, id: &str) -> Result<ServiceRef> {
        if self.inner.singletones.read().get(id) == Some(&false) {
            trace!(service = %id, "Creating transient service");
            return self.create_service(id);
        }

        if let Some(service) = self.inner.services.read().get(id).cloned() {
            trace!(service = %id, "Service resolved from cache");
            return Ok(service);
        }

        let service = self.create_service(id)?;
        let mut services = self.inner.services.write();
        match services.get(id) {
            Some(stored) => Ok(stored.clone()),
            None => {
                services.add(service.clone(), id);
                debug!(service = %id, "Service created and cached");
                Ok(service)
            }
        }
    }

    /// Whether `id` is cached or has a factory
    pub fn has(&self, id: &str) -> bool {
        self.inner.services.read().has(id) || self.inner.factories.read().has(id)
    }

    /// Number of cached services
    pub fn count(&self) -> usize {
        self.inner.services.read().count()
    }

    /// Bind a factory to `id`.
    ///
    /// A type name known to the catalog is constructed right away through the
    /// injection resolver and the instance becomes the factory.
    pub fn add_factory(&self, spec: impl Into<FactorySpec>, id: impl Into<String>) -> Result<()> {
        let id = valid_id(id.into())?;

        let factory = match spec.into() {
            FactorySpec::TypeName(name) if self.inner.catalog.contains(&name) => {
                self.construct_factory(&name)?
            }
            FactorySpec::TypeName(name) => {
                warn!(service = %id, type_name = %name, "Factory names an unknown type");
                Factory::inert(name)
            }
            FactorySpec::Resolver => {
                Factory::Object(self.resolver()? as Arc<dyn ServiceFactory>)
            }
            FactorySpec::Factory(factory) => factory,
            FactorySpec::Value(value) => Factory::inert(value),
        };

        debug!(service = %id, factory = ?factory, "Factory registered");
        self.inner.factories.write().add(factory, id);
        Ok(())
    }

    /// Set whether `id` is cached after creation
    pub fn set_singletone(&self, is_singleton: bool, id: impl Into<String>) -> Result<()> {
        let id = valid_id(id.into())?;
        trace!(service = %id, singleton = is_singleton, "Setting singleton policy");
        self.inner.singletones.write().add(is_singleton, id);
        Ok(())
    }

    pub fn set_singleton(&self, is_singleton: bool, id: impl Into<String>) -> Result<()> {
        self.set_singletone(is_singleton, id)
    }

    /// Snapshot of the factory registry
    pub fn factories(&self) -> Registry<Factory> {
        self.inner.factories.read().clone()
    }

    /// Snapshot of the singleton policy
    pub fn singletones(&self) -> Registry<bool> {
        self.inner.singletones.read().clone()
    }

    /// A fresh injection resolver from this container
    pub fn resolver(&self) -> Result<Arc<InjectionResolver>> {
        self.get_as::<InjectionResolver>(InjectionResolver::service_id())
    }

    /// Configuration values stored by [`ServiceContainer::init`]
    pub fn settings(&self) -> Result<Arc<Settings>> {
        self.get_as::<Settings>(CONFIG_KEY)
    }

    fn construct_factory(&self, type_name: &str) -> Result<Factory> {
        let resolver = self.resolver()?;
        let instance = resolver.resolve(self, type_name)?;

        let cast = self
            .inner
            .catalog
            .describe(type_name)
            .and_then(|descriptor| descriptor.as_factory(&instance));
        Ok(match cast {
            Some(factory) => Factory::Object(factory),
            None => {
                warn!(type_name = %type_name, "Constructed type is not a factory");
                Factory::Inert(instance)
            }
        })
    }

    fn create_service(&self, id: &str) -> Result<ServiceRef> {
        let factory = self
            .inner
            .factories
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::ServiceNotFound { id: id.to_string() })?;

        let _guard = self.inner.resolving.enter(id)?;
        trace!(
            service = %id,
            depth = self.inner.resolving.depth(),
            "Invoking factory"
        );

        factory.invoke(self, id).inspect_err(|err| {
            warn!(service = %id, kind = ?err.kind(), error = %err, "Service creation failed");
        })
    }
}

fn valid_id(id: String) -> Result<String> {
    if id.trim().is_empty() {
        Err(Error::InvalidServiceName { name: id })
    } else {
        Ok(id)
    }
}

impl ServiceLocator for ServiceContainer {
    fn get(&self, id: &str) -> Result<ServiceRef> {
        ServiceContainer::get(self, id)
    }

    fn has(&self, id: &str) -> bool {
        ServiceContainer::has(self, id)
    }
}

impl Default for ServiceContainer {
    fn default() -> Self {
        Self::new(TypeCatalog::new())
    }
}

impl fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceContainer")
            .field(
                "services",
                &self.inner.services.read().keys().collect::<Vec<_>>(),
            )
            .field(
                "factories",
                &self.inner.factories.read().keys().collect::<Vec<_>>(),
            )
            .field("catalog", &self.inner.catalog)
            .finish()
    }
}
