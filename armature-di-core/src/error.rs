// Error types for the service container

use crate::ServiceRef;
use std::fmt;
use thiserror::Error;

/// Why the injection resolver could not build an instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotCreatedReason {
    /// The type is abstract and has no instantiable shape
    AbstractType,
    /// The constructor exists but is not public
    ConstructorNotAccessible,
    /// No service, default or null could satisfy a parameter
    ParameterUnreachable { parameter: String },
    /// A resolved argument has a different type than the constructor expects
    ArgumentMismatch {
        parameter: String,
        expected: &'static str,
    },
    /// The constructor closure reported its own failure
    Construction { message: String },
}

impl NotCreatedReason {
    /// Numeric diagnostic code of the reason
    pub fn code(&self) -> u16 {
        match self {
            NotCreatedReason::AbstractType => 1,
            NotCreatedReason::ConstructorNotAccessible => 2,
            NotCreatedReason::ParameterUnreachable { .. } => 3,
            NotCreatedReason::ArgumentMismatch { .. } => 4,
            NotCreatedReason::Construction { .. } => 5,
        }
    }
}

impl fmt::Display for NotCreatedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotCreatedReason::AbstractType => write!(f, "type is abstract"),
            NotCreatedReason::ConstructorNotAccessible => {
                write!(f, "constructor is not accessible")
            }
            NotCreatedReason::ParameterUnreachable { parameter } => {
                write!(f, "parameter {} is unreachable", parameter)
            }
            NotCreatedReason::ArgumentMismatch {
                parameter,
                expected,
            } => write!(f, "argument {} is not a {}", parameter, expected),
            NotCreatedReason::Construction { message } => write!(f, "{}", message),
        }
    }
}

/// Coarse error classification for callers that branch on the failure kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidServiceName,
    ServiceNotFound,
    InvalidFactory,
    ServiceNotCreated,
    CircularDependency,
    TypeMismatch,
    Config,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Service name must be a non-empty string, got {name:?}")]
    InvalidServiceName { name: String },

    #[error("Service {id} not found")]
    ServiceNotFound { id: String },

    #[error("Invalid factory for service {id}: {factory:?}")]
    InvalidFactory { id: String, factory: ServiceRef },

    #[error("Cannot create instances of {type_name}: {reason}")]
    ServiceNotCreated {
        type_name: String,
        reason: NotCreatedReason,
    },

    #[error("Circular dependency detected: {}", .chain.join(" -> "))]
    CircularDependency { chain: Vec<String> },

    #[error("Service {id} is a {actual}, not a {expected}")]
    TypeMismatch {
        id: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub fn not_created(type_name: impl Into<String>, reason: NotCreatedReason) -> Self {
        Error::ServiceNotCreated {
            type_name: type_name.into(),
            reason,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidServiceName { .. } => ErrorKind::InvalidServiceName,
            Error::ServiceNotFound { .. } => ErrorKind::ServiceNotFound,
            Error::InvalidFactory { .. } => ErrorKind::InvalidFactory,
            Error::ServiceNotCreated { .. } => ErrorKind::ServiceNotCreated,
            Error::CircularDependency { .. } => ErrorKind::CircularDependency,
            Error::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    /// Numeric code; only creation failures distinguish their reasons
    pub fn code(&self) -> u16 {
        match self {
            Error::ServiceNotCreated { reason, .. } => reason.code(),
            _ => 1,
        }
    }

    /// The service id or type name the error is about, if any
    pub fn service(&self) -> Option<&str> {
        match self {
            Error::InvalidServiceName { name } => Some(name),
            Error::ServiceNotFound { id }
            | Error::InvalidFactory { id, .. }
            | Error::TypeMismatch { id, .. } => Some(id),
            Error::ServiceNotCreated { type_name, .. } => Some(type_name),
            Error::CircularDependency { chain } => chain.last().map(String::as_str),
            Error::Config(_) => None,
        }
    }

    /// The offending factory value of an `InvalidFactory` error
    pub fn factory(&self) -> Option<&ServiceRef> {
        match self {
            Error::InvalidFactory { factory, .. } => Some(factory),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
