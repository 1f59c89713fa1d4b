// Catalog of constructible types known to the injection resolver

use crate::logging::{debug, trace};
use crate::{Injectable, Registry, TypeDescriptor};
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared, cheaply clonable set of type descriptors keyed by type name.
///
/// A type name the catalog does not know is treated as an opaque id by the
/// injection resolver.
#[derive(Clone, Default)]
pub struct TypeCatalog {
    types: Arc<RwLock<Registry<TypeDescriptor>>>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor, replacing any previous one with the same name
    pub fn register(&self, descriptor: TypeDescriptor) {
        let name = descriptor.name().to_string();
        trace!(type_name = %name, "Registering type descriptor");

        let replaced = self.types.write().add(descriptor, name.clone());
        debug!(
            type_name = %name,
            replaced = replaced.is_some(),
            "Type registered in catalog"
        );
    }

    /// Register the descriptor an [`Injectable`] type provides
    pub fn register_type<T: Injectable>(&self) {
        self.register(T::descriptor());
    }

    /// Builder-style [`TypeCatalog::register_type`]
    pub fn with_type<T: Injectable>(self) -> Self {
        self.register_type::<T>();
        self
    }

    /// Builder-style [`TypeCatalog::register`]
    pub fn with_descriptor(self, descriptor: TypeDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.read().has(type_name)
    }

    pub fn describe(&self, type_name: &str) -> Option<TypeDescriptor> {
        self.types.read().get(type_name).cloned()
    }

    pub fn count(&self) -> usize {
        self.types.read().count()
    }

    /// Registered type names in registration order
    pub fn type_names(&self) -> Vec<String> {
        self.types.read().keys().map(str::to_string).collect()
    }
}

impl std::fmt::Debug for TypeCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeCatalog")
            .field("types", &self.type_names())
            .finish()
    }
}
