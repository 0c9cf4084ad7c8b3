//! Settings errors.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, saving or validating settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// A value breaks a validation rule.
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },

    /// The file extension is neither `.json` nor `.toml`.
    #[error("Unsupported settings format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Neither a config nor a home directory is known on this platform.
    #[error("No settings directory available")]
    NoSettingsDirectory,

    /// Reading or writing the file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The JSON file is malformed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The TOML file is malformed.
    #[error("TOML error: {0}")]
    TomlRead(#[from] toml::de::Error),

    /// The settings could not be written as TOML.
    #[error("TOML error: {0}")]
    TomlWrite(#[from] toml::ser::Error),
}

impl SettingsError {
    /// Shorthand for [`SettingsError::InvalidSetting`]
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = SettingsError::invalid("pricing.divisor", "must be > 0");
        assert_eq!(
            err.to_string(),
            "Invalid setting 'pricing.divisor': must be > 0"
        );

        let err = SettingsError::UnsupportedFormat(PathBuf::from("settings.yaml"));
        assert_eq!(err.to_string(), "Unsupported settings format: settings.yaml");
    }

    #[test]
    fn test_io_conversion() {
        let err: SettingsError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, SettingsError::Io(_)));
    }
}
