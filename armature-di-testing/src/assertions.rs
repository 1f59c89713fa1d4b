// Test assertions for services and container errors

use armature_di_core::{Error, ErrorKind, Result, ServiceRef};
use std::any::{type_name, Any};
use std::fmt::Debug;

/// Assert that two handles point at the same instance
pub fn assert_same_instance(left: &ServiceRef, right: &ServiceRef) {
    assert!(
        left.ptr_eq(right),
        "Expected the same instance, got two {:?} and {:?}",
        left,
        right
    );
}

/// Assert that two handles point at different instances
pub fn assert_distinct_instances(left: &ServiceRef, right: &ServiceRef) {
    assert!(
        !left.ptr_eq(right),
        "Expected distinct instances, both handles point at one {:?}",
        left
    );
}

/// Assert that a service holds a `T`
pub fn assert_service_type<T: Any>(service: &ServiceRef) {
    assert!(
        service.is::<T>(),
        "Expected a {}, got {}",
        type_name::<T>(),
        service.type_name()
    );
}

/// Assert that a result failed with the given kind, returning the error
pub fn assert_error_kind<T: Debug>(result: &Result<T>, expected: ErrorKind) -> &Error {
    match result {
        Ok(value) => panic!("Expected a {:?} error, got Ok({:?})", expected, value),
        Err(err) => {
            assert_eq!(
                err.kind(),
                expected,
                "Expected a {:?} error, got {}",
                expected,
                err
            );
            err
        }
    }
}

/// Assert that creation failed with the given diagnostic code
pub fn assert_not_created<T: Debug>(result: &Result<T>, code: u16) {
    let err = assert_error_kind(result, ErrorKind::ServiceNotCreated);
    assert_eq!(err.code(), code, "Expected code {}, got {}", code, err);
}
