//! Container configuration structure.
//!
//! A [`ContainerConfig`] carries the `services` section the container reads
//! during [`init`](crate::ServiceContainer::init) plus every top-level value,
//! which stays retrievable through the reserved [`CONFIG_KEY`] service as
//! [`Settings`].
//!
//! ```
//! use armature_di_core::{ContainerConfig, Factory};
//! use serde_json::json;
//!
//! let config = ContainerConfig::from_value(json!({
//!     "app": { "name": "demo" },
//!     "services": {
//!         "factories": { "mailer": "app::Mailer" },
//!         "singletones": { "mailer": false }
//!     }
//! }))
//! .unwrap()
//! .factory("clock", Factory::of(|_| Ok(42u64)));
//!
//! assert_eq!(config.services().unwrap().factories().count(), 2);
//! assert!(config.values().has("app"));
//! ```

use crate::{Error, FactorySpec, Registry, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Reserved service id holding the configuration values
pub const CONFIG_KEY: &str = "config";

pub const SERVICES_KEY: &str = "services";

pub const FACTORIES_KEY: &str = "factories";

pub const SINGLETONES_KEY: &str = "singletones";

/// Loose truthiness used for singleton flags coming from configuration
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// The `services` section
#[derive(Debug, Clone, Default)]
pub struct ServicesConfig {
    factories: Registry<FactorySpec>,
    singletones: Registry<bool>,
}

impl ServicesConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn factory(mut self, id: impl Into<String>, spec: impl Into<FactorySpec>) -> Self {
        self.factories.add(spec.into(), id);
        self
    }

    pub fn singletone(mut self, id: impl Into<String>, is_singleton: bool) -> Self {
        self.singletones.add(is_singleton, id);
        self
    }

    pub fn factories(&self) -> &Registry<FactorySpec> {
        &self.factories
    }

    pub fn singletones(&self) -> &Registry<bool> {
        &self.singletones
    }

    fn from_object(services: &Map<String, Value>) -> Result<Self> {
        let mut config = ServicesConfig::new();

        if let Some(factories) = services.get(FACTORIES_KEY) {
            let factories = factories.as_object().ok_or_else(|| {
                Error::Config(format!("{}.{} must be a table", SERVICES_KEY, FACTORIES_KEY))
            })?;
            for (id, spec) in factories {
                config.factories.add(FactorySpec::from_value(spec.clone()), id.as_str());
            }
        }

        if let Some(singletones) = services.get(SINGLETONES_KEY) {
            let singletones = singletones.as_object().ok_or_else(|| {
                Error::Config(format!(
                    "{}.{} must be a table",
                    SERVICES_KEY, SINGLETONES_KEY
                ))
            })?;
            for (id, flag) in singletones {
                config.singletones.add(is_truthy(flag), id.as_str());
            }
        }

        Ok(config)
    }
}

/// Configuration handed to [`ServiceContainer::init`](crate::ServiceContainer::init)
#[derive(Debug, Clone, Default)]
pub struct ContainerConfig {
    services: Option<ServicesConfig>,
    values: Map<String, Value>,
}

impl ContainerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert a parsed configuration document.
    ///
    /// The document must be an object. String factories convert through
    /// [`FactorySpec::from`]; any other factory value is kept as a raw value.
    pub fn from_value(value: Value) -> Result<Self> {
        let values = match value {
            Value::Object(values) => values,
            other => {
                return Err(Error::Config(format!(
                    "configuration must be a table, got {}",
                    other
                )));
            }
        };

        let services = match values.get(SERVICES_KEY) {
            None => None,
            Some(Value::Object(services)) => Some(ServicesConfig::from_object(services)?),
            Some(other) => {
                return Err(Error::Config(format!(
                    "{} must be a table, got {}",
                    SERVICES_KEY, other
                )));
            }
        };

        Ok(Self { services, values })
    }

    /// Add or replace a factory in the `services` section
    pub fn factory(mut self, id: impl Into<String>, spec: impl Into<FactorySpec>) -> Self {
        let services = self.services.take().unwrap_or_default();
        self.services = Some(services.factory(id, spec));
        self
    }

    /// Set a singleton flag in the `services` section
    pub fn singletone(mut self, id: impl Into<String>, is_singleton: bool) -> Self {
        let services = self.services.take().unwrap_or_default();
        self.services = Some(services.singletone(id, is_singleton));
        self
    }

    pub fn singleton(self, id: impl Into<String>, is_singleton: bool) -> Self {
        self.singletone(id, is_singleton)
    }

    pub fn with_services(mut self, services: ServicesConfig) -> Self {
        self.services = Some(services);
        self
    }

    /// Set a top-level value
    pub fn value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn services(&self) -> Option<&ServicesConfig> {
        self.services.as_ref()
    }

    /// Top-level values, in document order
    pub fn values(&self) -> Settings {
        Settings::from_map(&self.values)
    }
}

/// Read-only view of configuration values stored under [`CONFIG_KEY`]
#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: Registry<Value>,
}

impl Settings {
    fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            values: map
                .iter()
                .map(|(key, value)| (key.as_str(), value.clone()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.has(key)
    }

    pub fn count(&self) -> usize {
        self.values.count()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys()
    }

    /// Look up a dotted path such as `database.pool.size`
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.values.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Deserialize the value at a dotted path
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        self.lookup(path)
            .map(|value| {
                serde_json::from_value(value.clone())
                    .map_err(|e| Error::Config(format!("{}: {}", path, e)))
            })
            .transpose()
    }
}
