use armature_di_core::*;
use std::any::type_name;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct Object {
    a: u32,
}

struct Counting {
    calls: Arc<AtomicUsize>,
}

impl ServiceFactory for Counting {
    fn create(&self, _locator: &dyn ServiceLocator, _id: &str) -> Result<ServiceRef> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ServiceRef::new(Object { a: 1 }))
    }
}

#[derive(Default)]
struct TestFactory;

impl ServiceFactory for TestFactory {
    fn create(&self, _locator: &dyn ServiceLocator, _id: &str) -> Result<ServiceRef> {
        Ok(ServiceRef::new(Object { a: 0 }))
    }
}

struct TestService {
    factory: Arc<TestFactory>,
}

#[derive(Default)]
struct NotAFactory;

fn catalog() -> TypeCatalog {
    TypeCatalog::new()
        .with_descriptor(
            TypeDescriptor::builder::<TestFactory>()
                .factory()
                .default_instance(),
        )
        .with_descriptor(
            TypeDescriptor::builder::<TestService>()
                .parameter(ParameterDescriptor::typed::<TestFactory>("factory"))
                .construct(|args| {
                    Ok(TestService {
                        factory: args.get(0)?,
                    })
                }),
        )
        .with_descriptor(TypeDescriptor::builder::<NotAFactory>().default_instance())
}

fn config() -> ContainerConfig {
    ContainerConfig::new()
        .factory("test", Factory::of(|_| Ok(Object { a: 0 })))
        .factory("test2", Factory::of(|_| Ok(Object { a: 0 })))
        .singletone("test2", false)
}

#[test]
fn test_initial_service_loading() {
    let service = ServiceRef::new(Object { a: 5 });
    let container = ServiceContainer::with_values(TypeCatalog::new(), [("test", service.clone())]);

    assert_eq!(container.count(), 1);
    assert!(container.get("test").unwrap().ptr_eq(&service));
}

#[test]
fn test_init_counts() {
    let container = ServiceContainer::default();
    container.init(config()).unwrap();

    assert_eq!(container.factories().count(), 3);
    assert_eq!(container.singletones().count(), 2);
    assert!(container.has(CONFIG_KEY));
}

#[test]
fn test_singletons_and_transients() {
    let container = ServiceContainer::default();
    container.init(config()).unwrap();

    let test = container.get("test").unwrap();
    assert!(test.ptr_eq(&container.get("test").unwrap()));

    let test2 = container.get("test2").unwrap();
    assert!(!test2.ptr_eq(&container.get("test2").unwrap()));
}

#[test]
fn test_factory_invoked_once_for_singleton() {
    let calls = Arc::new(AtomicUsize::new(0));
    let container = ServiceContainer::default();
    container
        .init(config().factory(
            "test3",
            Factory::object(Counting {
                calls: calls.clone(),
            }),
        ))
        .unwrap();

    let test3 = container.get("test3").unwrap();
    assert!(test3.ptr_eq(&container.get("test3").unwrap()));
    assert_eq!(test3.downcast_ref::<Object>().map(|o| o.a), Some(1));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_service_not_found() {
    let container = ServiceContainer::default();
    container.init(config()).unwrap();

    let err = container.get("NotExistingService").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ServiceNotFound);
    assert_eq!(err.service(), Some("NotExistingService"));
}

#[test]
fn test_invalid_factory() {
    let config = ContainerConfig::from_value(serde_json::json!({
        "services": { "factories": { "test3": 1 } }
    }))
    .unwrap();
    let container = ServiceContainer::default();
    container.init(config).unwrap();

    let err = container.get("test3").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFactory);
    assert_eq!(
        err.factory().and_then(|f| f.downcast_ref::<serde_json::Value>()),
        Some(&serde_json::json!(1))
    );
    assert!(!container.settings().unwrap().has("missing"));
}

#[test]
fn test_create_from_type_named_factory() {
    let container = ServiceContainer::new(catalog());
    container
        .init(config().factory("test3", type_name::<TestFactory>()))
        .unwrap();

    let test3 = container.get("test3").unwrap();
    assert!(test3.is::<Object>());
    assert!(test3.ptr_eq(&container.get("test3").unwrap()));
}

#[test]
fn test_type_named_non_factory_is_invalid() {
    let container = ServiceContainer::new(catalog());
    container
        .add_factory(type_name::<NotAFactory>(), "plain")
        .unwrap();

    let err = container.get("plain").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFactory);
    assert!(err.factory().is_some_and(|f| f.is::<NotAFactory>()));
}

#[test]
fn test_unknown_type_name_is_invalid() {
    let container = ServiceContainer::new(catalog());
    container.add_factory("app::Missing", "missing").unwrap();

    assert!(container.has("missing"));
    let err = container.get("missing").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFactory);
}

#[test]
fn test_get_injection_resolver() {
    let container = ServiceContainer::default();
    let resolver = container.get(InjectionResolver::service_id()).unwrap();
    assert!(resolver.is::<InjectionResolver>());
}

#[test]
fn test_create_from_injection_resolver() {
    let factory = ServiceRef::new(TestFactory);
    let container =
        ServiceContainer::with_values(catalog(), [(type_name::<TestFactory>(), factory.clone())]);
    container
        .init(config().factory(type_name::<TestService>(), InjectionResolver::service_id()))
        .unwrap();

    let service = container.get_typed::<TestService>().unwrap();
    assert!(ServiceRef::from_arc(service.factory.clone()).ptr_eq(&factory));
}

#[test]
fn test_has() {
    let container = ServiceContainer::default();
    container.init(config()).unwrap();

    assert!(container.has(InjectionResolver::service_id()));
    assert!(container.has("test"));
    assert!(!container.has("other"));
}

#[test]
fn test_factories_registered_before_singletones() {
    let config = ContainerConfig::new()
        .singletone("later", false)
        .factory("later", Factory::of(|_| Ok(Object { a: 2 })));
    let container = ServiceContainer::default();
    container.init(config).unwrap();

    let first = container.get("later").unwrap();
    assert!(!first.ptr_eq(&container.get("later").unwrap()));
    assert_eq!(container.count(), 1);
}

#[test]
fn test_failed_creation_leaves_cache_untouched() {
    let container = ServiceContainer::default();
    container
        .add_factory(
            Factory::closure(|_, id| {
                Err(Error::not_created(
                    id,
                    NotCreatedReason::Construction {
                        message: "boom".to_string(),
                    },
                ))
            }),
            "broken",
        )
        .unwrap();

    assert!(container.get("broken").is_err());
    assert_eq!(container.count(), 0);
}

#[test]
fn test_circular_dependency() {
    let container = ServiceContainer::default();
    container
        .add_factory(Factory::closure(|locator, _| locator.get("b")), "a")
        .unwrap();
    container
        .add_factory(Factory::closure(|locator, _| locator.get("a")), "b")
        .unwrap();

    match container.get("a") {
        Err(Error::CircularDependency { chain }) => assert_eq!(chain, vec!["a", "b", "a"]),
        other => panic!("expected a circular dependency, got {:?}", other),
    }
}

#[test]
fn test_factory_receives_requested_id() {
    let container = ServiceContainer::default();
    container
        .add_factory(Factory::closure(|_, id| Ok(ServiceRef::new(id.to_string()))), "named")
        .unwrap();

    assert_eq!(container.get_as::<String>("named").unwrap().as_str(), "named");
    let err = container.get_as::<u8>("named").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}

#[test]
fn test_clones_share_state() {
    let container = ServiceContainer::default();
    let handle = container.clone();
    handle.add_instance(3u16, "port").unwrap();

    assert_eq!(container.get_as::<u16>("port").unwrap().as_ref(), &3);
}

struct Eager;

impl ServiceFactory for Eager {
    fn create(&self, _locator: &dyn ServiceLocator, _id: &str) -> Result<ServiceRef> {
        Ok(ServiceRef::new(Object { a: 2 }))
    }
}

#[test]
fn test_type_named_factory_is_constructed_at_registration() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let counter = constructed.clone();
    let catalog = TypeCatalog::new().with_descriptor(
        TypeDescriptor::builder::<Eager>()
            .factory()
            .construct(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Eager)
            }),
    );
    let container = ServiceContainer::new(catalog);

    container.add_factory(type_name::<Eager>(), "eager").unwrap();
    assert_eq!(constructed.load(Ordering::SeqCst), 1);

    container.get("eager").unwrap();
    container.get("eager").unwrap();
    assert_eq!(constructed.load(Ordering::SeqCst), 1);
}
