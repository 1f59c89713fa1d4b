// Error types for configuration loading

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvError(#[from] std::env::VarError),

    #[error(transparent)]
    Container(#[from] armature_di_core::Error),
}

impl From<ConfigError> for armature_di_core::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Container(err) => err,
            other => armature_di_core::Error::Config(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
