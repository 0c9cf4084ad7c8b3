//! Error handling for ConfigKit
//!
//! Provides error types for the two layers of the configurator:
//! - Configuration errors (input boundary, colour literals, catalog lookups)
//! - Session errors (viewer script loading and session initialisation)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Configuration error type
///
/// Raised at the input boundary before a value reaches the store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// Input text could not be read as a number
    #[error("Invalid number for {field}: {input:?}")]
    InvalidNumber {
        /// The field the input was meant for.
        field: String,
        /// The raw input text.
        input: String,
    },

    /// Input parsed but is NaN or infinite
    #[error("Value for {field} must be finite")]
    NonFinite {
        /// The field the input was meant for.
        field: String,
    },

    /// Colour literal is not `#rgb` or `#rrggbb`
    #[error("Invalid colour: {input:?}")]
    InvalidColor {
        /// The rejected colour literal.
        input: String,
    },

    /// Design id is not in the catalog
    #[error("Unknown design: {id}")]
    UnknownDesign {
        /// The requested design id.
        id: String,
    },
}

/// Render session error type
///
/// Every variant is terminal for the session that raised it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// The viewer client script could not be loaded
    #[error("Failed to load viewer script {url}: {reason}")]
    ScriptLoadFailed {
        /// Script URL.
        url: String,
        /// Reason reported by the runtime.
        reason: String,
    },

    /// The viewer client could not be constructed after the script loaded
    #[error("Viewer client unavailable: {reason}")]
    ClientUnavailable {
        /// Reason reported by the runtime.
        reason: String,
    },

    /// The viewer reported an initialisation error for the model
    #[error("Error loading model {model_id}")]
    InitFailed {
        /// Model identifier that failed to load.
        model_id: String,
    },

    /// The session was torn down before it became ready
    #[error("Render session terminated")]
    Terminated,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_display() {
        let err = SessionError::InitFailed {
            model_id: "5f94fb035fa74f43abda3ada8f0a719e".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Error loading model 5f94fb035fa74f43abda3ada8f0a719e"
        );
    }
}
