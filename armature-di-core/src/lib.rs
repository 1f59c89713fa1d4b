// Core of the armature-di service container
// Registries, factories, the singleton policy and constructor auto-wiring

pub mod catalog;
pub mod config;
pub mod container;
pub mod descriptor;
pub mod error;
pub mod factory;
pub mod logging;
pub mod registry;
pub mod resolver;
pub mod service;
pub mod traits;

pub use catalog::*;
pub use config::*;
pub use container::*;
pub use descriptor::*;
pub use error::*;
pub use factory::*;
pub use registry::*;
pub use resolver::*;
pub use service::*;
pub use traits::*;
