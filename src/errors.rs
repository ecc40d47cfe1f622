use thiserror::Error;
use crate::bus::i2c::I2CError;

/// Errors surfaced by the INA219 driver
///
/// `E` is the error type of the underlying word transport. Transport errors
/// are carried unchanged; the driver does not classify or retry them.
#[derive(Error, Debug)]
pub enum SensorError<E>
where
    E: std::error::Error + 'static,
{
    #[error("I2C communication failed: {0}")]
    I2c(#[from] E),

    #[error("INA219 at {address:#04x} reported a math overflow, current and power are out of range")]
    MathOverflow { address: u8 },
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from '{path}': {source}")]
    LoadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration format: {0}")]
    FormatError(#[from] toml::de::Error),

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Result type aliases for convenience
pub type SensorResult<T, E = I2CError> = Result<T, SensorError<E>>;
pub type ConfigResult<T> = Result<T, ConfigError>;
