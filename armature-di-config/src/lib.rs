// Configuration loading for armature-di containers
//
// Reads JSON, TOML and env files plus prefixed environment variables into
// the `ContainerConfig` a `ServiceContainer` is initialized with.

pub mod builder;
pub mod env;
pub mod error;
pub mod loader;

pub use builder::{bootstrap, ServiceConfigBuilder};
pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};

use armature_di_core::ContainerConfig;
use std::path::Path;

/// Load a single configuration file, detecting its format from the name
pub fn load_file(path: impl AsRef<Path>) -> Result<ContainerConfig> {
    let path = path.as_ref();
    let value = ConfigLoader::auto(path)?.load_file(path)?;
    Ok(ContainerConfig::from_value(value)?)
}

/// Parse a configuration document of a known format
pub fn parse_str(content: &str, format: FileFormat) -> Result<ContainerConfig> {
    let value = ConfigLoader::new(format).parse(content)?;
    Ok(ContainerConfig::from_value(value)?)
}
