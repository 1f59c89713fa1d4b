// armature-di - a configuration-driven service container
//
// Services are looked up by string id. Each id is either seeded with an
// instance or bound to a factory, and the singleton policy decides whether
// a created service is cached. Factories may be named by type, in which
// case the injection resolver builds them by resolving constructor
// parameters against the container.

// Re-export core functionality
pub use armature_di_core::*;

// Re-export the derive macro
#[cfg(feature = "macros")]
pub use armature_di_macro::Injectable;

// Re-export optional crates
#[cfg(feature = "config")]
pub use armature_di_config;

#[cfg(feature = "testing")]
pub use armature_di_testing;

/// Prelude for common imports.
///
/// ```
/// use armature_di::prelude::*;
///
/// let container = ServiceContainer::default();
/// container
///     .add_factory(Factory::of(|_| Ok(String::from("hello"))), "greeting")
///     .unwrap();
///
/// let greeting = container.get_as::<String>("greeting").unwrap();
/// assert_eq!(greeting.as_str(), "hello");
/// ```
pub mod prelude {
    pub use armature_di_core::{
        ContainerConfig, Error, ErrorKind, Factory, FactorySpec, Injectable, InjectionResolver,
        ParameterDescriptor, Result, ServiceContainer, ServiceFactory, ServiceLocator,
        ServiceLocatorExt, ServiceRef, TypeCatalog, TypeDescriptor,
    };

    #[cfg(feature = "macros")]
    pub use armature_di_macro::Injectable;

    #[cfg(feature = "config")]
    pub use armature_di_config::{ServiceConfigBuilder, bootstrap};
}
