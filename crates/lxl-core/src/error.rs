//! Error types for lxl-core

use thiserror::Error;

/// Result type alias using lxl-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for lxl
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration format
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Config root could not be determined
    #[error("Could not determine the Lite XL config directory")]
    NoConfigRoot,

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// TOML decoding error
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML encoding error
    #[error("TOML encoding error: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing or joining error
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Unrecognised addon type
    #[error("Unrecognized addon type: {value}")]
    UnknownAddonType { value: String },
}

impl Error {
    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an unknown addon type error
    pub fn unknown_addon_type(value: impl Into<String>) -> Self {
        Self::UnknownAddonType {
            value: value.into(),
        }
    }
}
