//! Configuration errors and validation.

use thiserror::Error;

/// Errors raised while validating configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A field holds a value outside its allowed range or form.
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Name of the offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Trait for configuration types that can check themselves before use.
pub trait ConfigValidator {
    /// Validates the configuration, returning the first problem found.
    fn validate(&self) -> Result<(), ConfigError>;
}

/// Rejects zero for a count-like field.
pub(crate) fn ensure_positive(field: &str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }
    Ok(())
}
