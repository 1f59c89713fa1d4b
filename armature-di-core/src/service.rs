// Type-erased service handles

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

/// Shared handle to a service value of any type.
///
/// Cloning a handle never clones the value; two handles are the same
/// instance when [`ServiceRef::ptr_eq`] holds.
#[derive(Clone)]
pub struct ServiceRef {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl ServiceRef {
    /// Wrap a freshly built value
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wrap an already shared value without re-allocating it
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            value,
            type_name: type_name::<T>(),
        }
    }

    /// Name of the concrete type behind the handle
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.value.clone().downcast::<T>().ok()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Whether both handles point at the same allocation
    pub fn ptr_eq(&self, other: &ServiceRef) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.value), Arc::as_ptr(&other.value))
    }
}

impl fmt::Debug for ServiceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ServiceRef").field(&self.type_name).finish()
    }
}
