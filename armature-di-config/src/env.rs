// Environment variable loading

use crate::{ConfigError, Result};
use armature_di_core::{FACTORIES_KEY, SERVICES_KEY, SINGLETONES_KEY};
use serde_json::{Map, Value};
use std::env;

/// Separator between nested key segments, as in `APP_DATABASE__HOST`
pub const NESTING_SEPARATOR: &str = "__";

/// Environment variable loader.
///
/// With a prefix, only `PREFIX_*` variables are read and the prefix is
/// stripped. Keys are lower-cased and split on `__` into nested tables, so
/// `APP_SINGLETONES__MAILER=false` lands in `services.singletones.mailer`.
/// `FACTORIES__<ID>` keys land in `services.factories` the same way.
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::new(Some(prefix.into()))
    }

    /// Load the process environment
    pub fn load(&self) -> Value {
        self.from_vars(env::vars())
    }

    /// Build a configuration document from key/value pairs
    pub fn from_vars<I, K, V>(&self, vars: I) -> Value
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut root = Map::new();

        for (key, value) in vars {
            let Some(key) = self.strip_prefix(key.as_ref()) else {
                continue;
            };
            let mut path: Vec<String> = key
                .to_lowercase()
                .split(NESTING_SEPARATOR)
                .map(str::to_string)
                .collect();
            if path.iter().any(String::is_empty) {
                continue;
            }
            if path.len() > 1 && (path[0] == SINGLETONES_KEY || path[0] == FACTORIES_KEY) {
                path.insert(0, SERVICES_KEY.to_string());
            }
            insert_path(&mut root, &path, parse_scalar(value.as_ref()));
        }

        Value::Object(root)
    }

    fn strip_prefix<'a>(&self, key: &'a str) -> Option<&'a str> {
        match &self.prefix {
            Some(prefix) => key
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix('_')),
            None => Some(key),
        }
    }

    /// Load a specific environment variable
    pub fn load_var(&self, key: &str) -> Result<String> {
        let full_key = if let Some(ref prefix) = self.prefix {
            format!("{}_{}", prefix, key.to_uppercase())
        } else {
            key.to_uppercase()
        };

        env::var(&full_key).map_err(ConfigError::EnvError)
    }

    /// Load with default value
    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|_| default.to_string())
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Booleans and numbers are typed; everything else stays a string
fn parse_scalar(raw: &str) -> Value {
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(int) = raw.parse::<i64>() {
        return Value::from(int);
    }
    match raw.parse::<f64>() {
        Ok(float) if float.is_finite() => Value::from(float),
        _ => Value::String(raw.to_string()),
    }
}

fn insert_path(map: &mut Map<String, Value>, path: &[String], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut current = map;
    for segment in parents {
        let entry = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Value::Object(next) = entry else {
            return;
        };
        current = next;
    }
    current.insert(last.clone(), value);
}
