// Auto-wiring resolver

use crate::logging::{debug, trace};
use crate::{
    Arguments, Error, NotCreatedReason, ParameterDescriptor, Result, ServiceFactory,
    ServiceLocator, ServiceRef, TypeCatalog, TypeShape, Visibility,
};
use std::any::type_name;

/// Builds instances of catalog types by resolving their constructor
/// parameters against a [`ServiceLocator`].
///
/// Names the catalog does not know pass through unchanged as a `String`
/// service. Resolving the resolver's own id yields a new resolver sharing
/// the same catalog.
#[derive(Debug, Clone, Default)]
pub struct InjectionResolver {
    catalog: TypeCatalog,
}

impl InjectionResolver {
    pub fn new(catalog: TypeCatalog) -> Self {
        Self { catalog }
    }

    /// Service id the resolver is registered under in every container
    pub fn service_id() -> &'static str {
        type_name::<InjectionResolver>()
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    /// Resolve `name` to a service
    pub fn resolve(&self, locator: &dyn ServiceLocator, name: &str) -> Result<ServiceRef> {
        if name.trim().is_empty() {
            return Err(Error::InvalidServiceName {
                name: name.to_string(),
            });
        }

        if name == Self::service_id() {
            trace!("Resolver requested itself, creating a new resolver");
            return Ok(ServiceRef::new(InjectionResolver::new(self.catalog.clone())));
        }

        match self.catalog.describe(name) {
            Some(descriptor) => self.instantiate(locator, descriptor.name(), descriptor.shape()),
            None => {
                trace!(service = %name, "Unknown type name, passing through");
                Ok(ServiceRef::new(name.to_string()))
            }
        }
    }

    fn instantiate(
        &self,
        locator: &dyn ServiceLocator,
        type_name: &str,
        shape: &TypeShape,
    ) -> Result<ServiceRef> {
        match shape {
            TypeShape::Abstract => Err(Error::not_created(
                type_name,
                NotCreatedReason::AbstractType,
            )),
            TypeShape::NoConstructor(instantiate) => {
                debug!(type_name = %type_name, "Instantiating type without constructor");
                instantiate(Arguments::new(type_name))
            }
            TypeShape::Constructor(constructor) => {
                if constructor.visibility() != Visibility::Public {
                    return Err(Error::not_created(
                        type_name,
                        NotCreatedReason::ConstructorNotAccessible,
                    ));
                }

                let arguments =
                    self.prepare_parameters(locator, type_name, constructor.parameters())?;
                debug!(
                    type_name = %type_name,
                    arguments = arguments.len(),
                    "Instantiating auto-wired type"
                );
                constructor.instantiate(arguments)
            }
        }
    }

    fn prepare_parameters(
        &self,
        locator: &dyn ServiceLocator,
        type_name: &str,
        parameters: &[ParameterDescriptor],
    ) -> Result<Arguments> {
        let mut arguments = Arguments::new(type_name);
        for parameter in parameters {
            let value = Self::parameter_value(locator, parameter)?;
            arguments.push(parameter.name(), value);
        }
        Ok(arguments)
    }

    /// Value for one parameter: service, then default, then null
    fn parameter_value(
        locator: &dyn ServiceLocator,
        parameter: &ParameterDescriptor,
    ) -> Result<Option<ServiceRef>> {
        let key = parameter.lookup_key();
        if locator.has(key) {
            trace!(parameter = %parameter.name(), key = %key, "Resolving parameter from locator");
            return locator.get(key).map(Some);
        }

        if let Some(default) = parameter.default_value() {
            return Ok(Some(default.clone()));
        }

        if parameter.allows_null() {
            return Ok(None);
        }

        Err(Error::not_created(
            parameter.owning_type(),
            NotCreatedReason::ParameterUnreachable {
                parameter: parameter.name().to_string(),
            },
        ))
    }
}

impl ServiceFactory for InjectionResolver {
    fn create(&self, locator: &dyn ServiceLocator, id: &str) -> Result<ServiceRef> {
        self.resolve(locator, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, Registry, TypeDescriptor};
    use std::sync::Arc;

    #[derive(Default)]
    struct WithoutConstructor;

    struct WithoutConstructorParams {
        a: String,
    }

    struct WithTypedParams {
        a: Arc<WithoutConstructor>,
        b: Arc<WithoutConstructorParams>,
    }

    struct WithNullable {
        b: Option<Arc<String>>,
    }

    struct WithNamedParams {
        a: Arc<String>,
        b: Arc<String>,
    }

    struct WithDefaultOrNull {
        v: Option<Arc<String>>,
    }

    struct Unreachable;

    struct Locator(Registry<ServiceRef>);

    impl ServiceLocator for Locator {
        fn get(&self, id: &str) -> Result<ServiceRef> {
            self.0
                .get(id)
                .cloned()
                .ok_or_else(|| Error::ServiceNotFound { id: id.to_string() })
        }

        fn has(&self, id: &str) -> bool {
            self.0.has(id)
        }
    }

    fn catalog() -> TypeCatalog {
        TypeCatalog::new()
            .with_descriptor(TypeDescriptor::builder::<WithoutConstructor>().default_instance())
            .with_descriptor(
                TypeDescriptor::builder::<WithoutConstructorParams>().construct(|_| {
                    Ok(WithoutConstructorParams {
                        a: "asd".to_string(),
                    })
                }),
            )
            .with_descriptor(TypeDescriptor::abstract_type("app::AbstractClass"))
            .with_descriptor(
                TypeDescriptor::builder::<Unreachable>()
                    .named("app::WithNonPublicConstructor")
                    .private()
                    .construct(|_| Ok(Unreachable)),
            )
            .with_descriptor(
                TypeDescriptor::builder::<WithTypedParams>()
                    .parameter(ParameterDescriptor::typed::<WithoutConstructor>("a"))
                    .parameter(ParameterDescriptor::typed::<WithoutConstructorParams>("b"))
                    .construct(|args| {
                        Ok(WithTypedParams {
                            a: args.get(0)?,
                            b: args.get(1)?,
                        })
                    }),
            )
            .with_descriptor(
                TypeDescriptor::builder::<WithNullable>()
                    .parameter(ParameterDescriptor::typed::<String>("b").nullable())
                    .construct(|args| Ok(WithNullable { b: args.optional(0)? })),
            )
            .with_descriptor(
                TypeDescriptor::builder::<WithNamedParams>()
                    .parameter(ParameterDescriptor::named("notClassService"))
                    .parameter(ParameterDescriptor::named("c").with_default("C".to_string()))
                    .construct(|args| {
                        Ok(WithNamedParams {
                            a: args.get(0)?,
                            b: args.get(1)?,
                        })
                    }),
            )
            .with_descriptor(
                TypeDescriptor::builder::<WithDefaultOrNull>()
                    .parameter(
                        ParameterDescriptor::named("v")
                            .with_default("D".to_string())
                            .nullable(),
                    )
                    .construct(|args| Ok(WithDefaultOrNull { v: args.optional(0)? })),
            )
            .with_descriptor(
                TypeDescriptor::builder::<Unreachable>()
                    .parameter(ParameterDescriptor::of_type("unexistedService", "i64"))
                    .construct(|_| Ok(Unreachable)),
            )
    }

    fn locator() -> Locator {
        let mut services = Registry::new();
        services.add(
            ServiceRef::new("notClassService".to_string()),
            "notClassService",
        );
        services.add(ServiceRef::new(WithoutConstructor), type_name::<WithoutConstructor>());
        services.add(
            ServiceRef::new(WithoutConstructorParams {
                a: "asd".to_string(),
            }),
            type_name::<WithoutConstructorParams>(),
        );
        Locator(services)
    }

    #[test]
    fn test_create_self() {
        let resolver = InjectionResolver::new(catalog());
        let created = resolver
            .resolve(&locator(), InjectionResolver::service_id())
            .unwrap();
        let created = created.downcast::<InjectionResolver>().unwrap();
        assert_eq!(created.catalog().count(), resolver.catalog().count());
    }

    #[test]
    fn test_invalid_service_name() {
        let resolver = InjectionResolver::new(catalog());
        let err = resolver.resolve(&locator(), "  ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidServiceName);
    }

    #[test]
    fn test_unknown_name_passes_through() {
        let resolver = InjectionResolver::new(catalog());
        let service = resolver.resolve(&locator(), "notClassService").unwrap();
        assert_eq!(
            service.downcast_ref::<String>().map(String::as_str),
            Some("notClassService")
        );
    }

    #[test]
    fn test_abstract_and_private_are_rejected() {
        let resolver = InjectionResolver::new(catalog());

        let err = resolver.resolve(&locator(), "app::AbstractClass").unwrap_err();
        assert_eq!(err.code(), 1);

        let err = resolver
            .resolve(&locator(), "app::WithNonPublicConstructor")
            .unwrap_err();
        assert_eq!(err.code(), 2);
        assert_eq!(err.service(), Some("app::WithNonPublicConstructor"));
    }

    #[test]
    fn test_constructor_without_parameters() {
        let resolver = InjectionResolver::new(catalog());
        let service = resolver
            .resolve(&locator(), type_name::<WithoutConstructorParams>())
            .unwrap();
        assert_eq!(
            service.downcast_ref::<WithoutConstructorParams>().map(|s| s.a.as_str()),
            Some("asd")
        );
    }

    #[test]
    fn test_typed_parameters_come_from_locator() {
        let locator = locator();
        let resolver = InjectionResolver::new(catalog());
        let service = resolver
            .resolve(&locator, type_name::<WithTypedParams>())
            .unwrap();
        let service = service.downcast::<WithTypedParams>().unwrap();

        let registered = locator.get(type_name::<WithoutConstructor>()).unwrap();
        assert!(ServiceRef::from_arc(service.a.clone()).ptr_eq(&registered));
        assert_eq!(service.b.a, "asd");
    }

    #[test]
    fn test_nullable_parameter_becomes_null() {
        let resolver = InjectionResolver::new(catalog());
        let service = resolver
            .resolve(&locator(), type_name::<WithNullable>())
            .unwrap();
        assert!(service.downcast::<WithNullable>().unwrap().b.is_none());
    }

    #[test]
    fn test_named_parameters_and_defaults() {
        let resolver = InjectionResolver::new(catalog());
        let service = resolver
            .resolve(&locator(), type_name::<WithNamedParams>())
            .unwrap();
        let service = service.downcast::<WithNamedParams>().unwrap();
        assert_eq!(service.a.as_str(), "notClassService");
        assert_eq!(service.b.as_str(), "C");
    }

    #[test]
    fn test_default_wins_over_null_and_service_wins_over_default() {
        let resolver = InjectionResolver::new(catalog());
        let value = |locator: &Locator| {
            resolver
                .resolve(locator, type_name::<WithDefaultOrNull>())
                .unwrap()
                .downcast::<WithDefaultOrNull>()
                .unwrap()
                .v
                .as_deref()
                .cloned()
        };

        let mut locator = locator();
        assert_eq!(value(&locator), Some("D".to_string()));

        locator.0.add(ServiceRef::new("S".to_string()), "v");
        assert_eq!(value(&locator), Some("S".to_string()));
    }

    #[test]
    fn test_unreachable_parameter() {
        let resolver = InjectionResolver::new(catalog());
        let err = resolver
            .resolve(&locator(), type_name::<Unreachable>())
            .unwrap_err();

        assert_eq!(err.code(), 3);
        assert_eq!(err.service(), Some(type_name::<Unreachable>()));
        assert!(matches!(
            err,
            Error::ServiceNotCreated {
                reason: NotCreatedReason::ParameterUnreachable { ref parameter },
                ..
            } if parameter == "unexistedService"
        ));
    }
}
