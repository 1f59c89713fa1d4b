// Layered configuration builder

use crate::{ConfigError, ConfigLoader, EnvLoader, FileFormat, Result};
use armature_di_core::logging::debug;
use armature_di_core::{ContainerConfig, FactorySpec, ServiceContainer, TypeCatalog};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Builds a [`ContainerConfig`] from layered sources.
///
/// Layers apply in order: `.env` file, configuration files in the order they
/// were added, then prefixed environment variables. Tables merge deeply and
/// later scalars replace earlier ones. Programmatic factories, singleton
/// flags and values are applied last.
#[derive(Default)]
pub struct ServiceConfigBuilder {
    env_prefix: Option<String>,
    load_env: bool,
    load_dotenv: bool,
    dotenv_path: Option<PathBuf>,
    config_files: Vec<(PathBuf, Option<FileFormat>)>,
    factories: Vec<(String, FactorySpec)>,
    singletones: Vec<(String, bool)>,
    values: Map<String, Value>,
}

impl ServiceConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set environment variable prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Enable loading from environment variables
    pub fn load_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Load `.env` into the process environment if one is found
    pub fn load_dotenv(mut self) -> Self {
        self.load_dotenv = true;
        self.dotenv_path = None;
        self
    }

    /// Load a specific dotenv file; a missing file is an error
    pub fn load_dotenv_from(mut self, path: impl Into<PathBuf>) -> Self {
        self.load_dotenv = true;
        self.dotenv_path = Some(path.into());
        self
    }

    /// Add a configuration file with an explicit format
    pub fn add_file(mut self, path: impl Into<PathBuf>, format: FileFormat) -> Self {
        self.config_files.push((path.into(), Some(format)));
        self
    }

    /// Add a configuration file whose format is detected from its name
    pub fn add_file_auto(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_files.push((path.into(), None));
        self
    }

    pub fn factory(mut self, id: impl Into<String>, spec: impl Into<FactorySpec>) -> Self {
        self.factories.push((id.into(), spec.into()));
        self
    }

    pub fn singletone(mut self, id: impl Into<String>, is_singleton: bool) -> Self {
        self.singletones.push((id.into(), is_singleton));
        self
    }

    pub fn value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Merge every layer into one document
    pub fn build_value(&self) -> Result<Value> {
        if self.load_dotenv {
            match &self.dotenv_path {
                Some(path) => {
                    dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
                }
                None => {
                    dotenvy::dotenv().ok();
                }
            }
        }

        let mut document = Value::Object(Map::new());

        for (path, format) in &self.config_files {
            let loader = match format {
                Some(format) => ConfigLoader::new(*format),
                None => ConfigLoader::auto(path)?,
            };
            let layer = loader.load_file(path)?;
            debug!(path = %path.display(), "Merging configuration file");
            merge(&mut document, layer, path)?;
        }

        if self.load_env {
            let loader = EnvLoader::new(self.env_prefix.clone());
            merge(&mut document, loader.load(), Path::new("<environment>"))?;
        }

        if let Value::Object(map) = &mut document {
            for (key, value) in &self.values {
                map.insert(key.clone(), value.clone());
            }
        }

        Ok(document)
    }

    /// Build the container configuration
    pub fn build(self) -> Result<ContainerConfig> {
        let mut config = ContainerConfig::from_value(self.build_value()?)?;

        for (id, spec) in self.factories {
            config = config.factory(id, spec);
        }
        for (id, is_singleton) in self.singletones {
            config = config.singletone(id, is_singleton);
        }

        Ok(config)
    }
}

/// Deep-merge `layer` into `document`
fn merge(document: &mut Value, layer: Value, source: &Path) -> Result<()> {
    let Value::Object(layer) = layer else {
        return Err(ConfigError::ParseError(format!(
            "{} must contain a table at the top level",
            source.display()
        )));
    };
    if let Value::Object(target) = document {
        merge_tables(target, layer);
    }
    Ok(())
}

fn merge_tables(target: &mut Map<String, Value>, layer: Map<String, Value>) {
    for (key, value) in layer {
        let replacement = match (target.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                merge_tables(existing, incoming);
                None
            }
            (_, value) => Some(value),
        };
        if let Some(value) = replacement {
            target.insert(key, value);
        }
    }
}

/// Build the configuration and initialize a container with it
pub fn bootstrap(builder: ServiceConfigBuilder, catalog: TypeCatalog) -> Result<ServiceContainer> {
    let config = builder.build()?;
    let container = ServiceContainer::new(catalog);
    container.init(config)?;
    Ok(container)
}
