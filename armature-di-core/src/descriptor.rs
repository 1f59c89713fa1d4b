//! Constructor metadata for auto-wiring.
//!
//! Rust has no runtime reflection, so every type the injection resolver can
//! build carries a [`TypeDescriptor`]: its name, whether it can be
//! instantiated at all, and the ordered list of constructor parameters with
//! their declared types, defaults and nullability.
//!
//! Descriptors are written by hand with [`TypeDescriptor::builder`] or
//! generated by `#[derive(Injectable)]`.
//!
//! ```
//! use armature_di_core::{ParameterDescriptor, TypeDescriptor};
//! use std::sync::Arc;
//!
//! struct Logger;
//!
//! struct Mailer {
//!     logger: Arc<Logger>,
//!     retries: Arc<u32>,
//! }
//!
//! let descriptor = TypeDescriptor::builder::<Mailer>()
//!     .parameter(ParameterDescriptor::typed::<Logger>("logger"))
//!     .parameter(ParameterDescriptor::named("retries").with_default(3u32))
//!     .construct(|args| {
//!         Ok(Mailer {
//!             logger: args.get(0)?,
//!             retries: args.get(1)?,
//!         })
//!     });
//!
//! assert_eq!(descriptor.parameters().len(), 2);
//! assert_eq!(descriptor.parameters()[0].owning_type(), descriptor.name());
//! ```

use crate::{Error, NotCreatedReason, Result, ServiceFactory, ServiceRef};
use std::any::{type_name, Any};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Builds an instance from the resolved positional arguments
pub type Instantiate = Arc<dyn Fn(Arguments) -> Result<ServiceRef> + Send + Sync>;

/// Views a constructed instance as a service factory
pub type FactoryCast = fn(&ServiceRef) -> Option<Arc<dyn ServiceFactory>>;

fn cast_factory<T: ServiceFactory>(instance: &ServiceRef) -> Option<Arc<dyn ServiceFactory>> {
    instance
        .downcast::<T>()
        .map(|factory| factory as Arc<dyn ServiceFactory>)
}

/// One constructor parameter
#[derive(Debug, Clone)]
pub struct ParameterDescriptor {
    name: String,
    declared_type: Option<String>,
    default: Option<ServiceRef>,
    allows_null: bool,
    owning_type: String,
}

impl ParameterDescriptor {
    /// A parameter without a declared type, looked up by its name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: None,
            default: None,
            allows_null: false,
            owning_type: String::new(),
        }
    }

    /// A parameter declared as `T`, looked up by the type name of `T`
    pub fn typed<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::of_type(name, type_name::<T>())
    }

    /// A parameter with an explicit declared type name
    pub fn of_type(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            declared_type: Some(declared_type.into()),
            ..Self::named(name)
        }
    }

    /// Value used when no service is registered under the lookup key
    pub fn with_default<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.default = Some(ServiceRef::new(value));
        self
    }

    /// Accept null when neither a service nor a default is available
    pub fn nullable(mut self) -> Self {
        self.allows_null = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> Option<&str> {
        self.declared_type.as_deref()
    }

    pub fn default_value(&self) -> Option<&ServiceRef> {
        self.default.as_ref()
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn allows_null(&self) -> bool {
        self.allows_null
    }

    /// Name of the type whose constructor declares this parameter
    pub fn owning_type(&self) -> &str {
        &self.owning_type
    }

    /// Key used to look the parameter up in the locator
    pub fn lookup_key(&self) -> &str {
        self.declared_type.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone)]
struct Argument {
    name: String,
    value: Option<ServiceRef>,
}

/// Positional constructor arguments produced by auto-wiring.
///
/// A slot holding `None` is a null argument.
#[derive(Debug, Clone)]
pub struct Arguments {
    type_name: String,
    slots: Vec<Argument>,
}

impl Arguments {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            slots: Vec::new(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: Option<ServiceRef>) {
        self.slots.push(Argument {
            name: name.into(),
            value,
        });
    }

    pub fn with(mut self, name: impl Into<String>, value: Option<ServiceRef>) -> Self {
        self.push(name, value);
        self
    }

    /// Type being constructed
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.slots.get(index).map(|slot| slot.name.as_str())
    }

    pub fn raw(&self, index: usize) -> Option<&ServiceRef> {
        self.slots.get(index).and_then(|slot| slot.value.as_ref())
    }

    pub fn is_null(&self, index: usize) -> bool {
        self.slots
            .get(index)
            .is_some_and(|slot| slot.value.is_none())
    }

    /// Downcast a non-null argument
    pub fn get<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>> {
        self.optional::<T>(index)?
            .ok_or_else(|| self.mismatch::<T>(index))
    }

    /// Downcast an argument that may be null
    pub fn optional<T: Any + Send + Sync>(&self, index: usize) -> Result<Option<Arc<T>>> {
        let slot = self.slots.get(index).ok_or_else(|| {
            Error::not_created(
                &self.type_name,
                NotCreatedReason::Construction {
                    message: format!("missing argument #{}", index),
                },
            )
        })?;

        match &slot.value {
            None => Ok(None),
            Some(value) => value
                .downcast::<T>()
                .map(Some)
                .ok_or_else(|| self.mismatch::<T>(index)),
        }
    }

    /// Clone the value out of a non-null argument
    pub fn cloned<T: Clone + Any + Send + Sync>(&self, index: usize) -> Result<T> {
        self.get::<T>(index).map(|value| T::clone(&value))
    }

    fn mismatch<T>(&self, index: usize) -> Error {
        let parameter = self
            .name(index)
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{}", index));
        Error::not_created(
            &self.type_name,
            NotCreatedReason::ArgumentMismatch {
                parameter,
                expected: type_name::<T>(),
            },
        )
    }
}

/// Constructor visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

/// A declared constructor
#[derive(Clone)]
pub struct ConstructorDescriptor {
    visibility: Visibility,
    parameters: Vec<ParameterDescriptor>,
    instantiate: Instantiate,
}

impl ConstructorDescriptor {
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    pub fn instantiate(&self, arguments: Arguments) -> Result<ServiceRef> {
        (self.instantiate)(arguments)
    }
}

/// How a type can be instantiated
#[derive(Clone)]
pub enum TypeShape {
    /// Cannot be instantiated
    Abstract,
    /// No declared constructor; built with zero arguments
    NoConstructor(Instantiate),
    /// Built from its constructor parameters
    Constructor(ConstructorDescriptor),
}

/// Everything the injection resolver knows about a constructible type
#[derive(Clone)]
pub struct TypeDescriptor {
    name: String,
    shape: TypeShape,
    factory_cast: Option<FactoryCast>,
}

impl TypeDescriptor {
    /// Start a descriptor for `T`, named after its type name
    pub fn builder<T: Any + Send + Sync>() -> DescriptorBuilder<T> {
        DescriptorBuilder {
            name: type_name::<T>().to_string(),
            visibility: Visibility::Public,
            parameters: Vec::new(),
            factory_cast: None,
            _marker: PhantomData,
        }
    }

    pub fn abstract_type(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: TypeShape::Abstract,
            factory_cast: None,
        }
    }

    /// Abstract descriptor named after `T`, typically a `dyn Trait`
    pub fn abstract_of<T: ?Sized + 'static>() -> Self {
        Self::abstract_type(type_name::<T>())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &TypeShape {
        &self.shape
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self.shape, TypeShape::Abstract)
    }

    /// Whether instances of the type can serve as factories
    pub fn is_factory(&self) -> bool {
        self.factory_cast.is_some()
    }

    /// Constructor parameters; empty for abstract and constructor-less types
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        match &self.shape {
            TypeShape::Constructor(constructor) => constructor.parameters(),
            _ => &[],
        }
    }

    /// View an instance of this type as a factory, if the type is one
    pub fn as_factory(&self, instance: &ServiceRef) -> Option<Arc<dyn ServiceFactory>> {
        self.factory_cast.and_then(|cast| cast(instance))
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match &self.shape {
            TypeShape::Abstract => "abstract",
            TypeShape::NoConstructor(_) => "no-constructor",
            TypeShape::Constructor(c) if c.visibility == Visibility::Private => "private-constructor",
            TypeShape::Constructor(_) => "constructor",
        };
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("shape", &shape)
            .field("parameters", &self.parameters())
            .field("factory", &self.is_factory())
            .finish()
    }
}

/// Fluent builder for [`TypeDescriptor`]
pub struct DescriptorBuilder<T> {
    name: String,
    visibility: Visibility,
    parameters: Vec<ParameterDescriptor>,
    factory_cast: Option<FactoryCast>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> DescriptorBuilder<T> {
    /// Register under a custom name instead of the Rust type name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Mark the constructor as not publicly invocable
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    pub fn parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Instances of `T` can be bound as factories
    pub fn factory(mut self) -> Self
    where
        T: ServiceFactory,
    {
        self.factory_cast = Some(cast_factory::<T>);
        self
    }

    /// Finish with a constructor taking the declared parameters in order
    pub fn construct<F>(self, construct: F) -> TypeDescriptor
    where
        F: Fn(Arguments) -> Result<T> + Send + Sync + 'static,
    {
        let name = self.name;
        let parameters = self
            .parameters
            .into_iter()
            .map(|mut parameter| {
                parameter.owning_type = name.clone();
                parameter
            })
            .collect();

        TypeDescriptor {
            name,
            shape: TypeShape::Constructor(ConstructorDescriptor {
                visibility: self.visibility,
                parameters,
                instantiate: Arc::new(move |args: Arguments| -> Result<ServiceRef> {
                    construct(args).map(ServiceRef::new)
                }),
            }),
            factory_cast: self.factory_cast,
        }
    }

    /// Finish as a type without a declared constructor.
    ///
    /// Parameters and visibility set on the builder do not apply.
    pub fn instantiate<F>(self, create: F) -> TypeDescriptor
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        TypeDescriptor {
            name: self.name,
            shape: TypeShape::NoConstructor(Arc::new(
                move |_: Arguments| -> Result<ServiceRef> { Ok(ServiceRef::new(create())) },
            )),
            factory_cast: self.factory_cast,
        }
    }

    /// Constructor-less type built with `Default`
    pub fn default_instance(self) -> TypeDescriptor
    where
        T: Default,
    {
        self.instantiate(T::default)
    }
}
