//! Events published by the store and the render session controller.
//!
//! Every event is cloneable and serializable so it can be logged or
//! replayed; `Display` gives the one-line log form.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::configuration::{Configuration, ConfigurationField};
use crate::session::SessionStatus;

/// Anything published on the bus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AppEvent {
    /// A store write
    Configuration(ConfigurationEvent),
    /// A render session transition
    Session(SessionEvent),
    /// A failure or skipped update
    Error(ErrorEvent),
}

impl AppEvent {
    /// Category used by [`EventFilter`](super::EventFilter)
    pub fn category(&self) -> EventCategory {
        match self {
            Self::Configuration(_) => EventCategory::Configuration,
            Self::Session(_) => EventCategory::Session,
            Self::Error(_) => EventCategory::Error,
        }
    }
}

impl fmt::Display for AppEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(e) => write!(f, "{}", e),
            Self::Session(e) => write!(f, "{}", e),
            Self::Error(e) => write!(f, "{}", e),
        }
    }
}

/// Top-level event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Store writes
    Configuration,
    /// Session lifecycle
    Session,
    /// Failures and warnings
    Error,
}

/// Store writes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ConfigurationEvent {
    /// One field was written
    Changed {
        /// Field written
        field: ConfigurationField,
        /// Whole configuration after the write
        configuration: Configuration,
    },
}

impl fmt::Display for ConfigurationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Changed {
                field,
                configuration: c,
            } => write!(
                f,
                "{} set: {}x{}x{} mm, {}",
                field, c.width, c.height, c.depth, c.color
            ),
        }
    }
}

/// Render session lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Status moved
    StatusChanged {
        /// Model the session is bound to
        model_id: String,
        /// Status before
        old: SessionStatus,
        /// Status after
        new: SessionStatus,
    },
    /// Session torn down
    Terminated {
        /// Model the session was bound to
        model_id: String,
        /// Status at teardown
        last_status: SessionStatus,
    },
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StatusChanged { model_id, old, new } => {
                write!(f, "Session {}: {} -> {}", model_id, old, new)
            }
            Self::Terminated {
                model_id,
                last_status,
            } => write!(f, "Session {} terminated ({})", model_id, last_status),
        }
    }
}

/// How bad an [`ErrorEvent`] is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    /// Something was skipped; nothing stopped
    Warning,
    /// One component stopped; the rest keeps working
    Error,
}

/// Failures surfaced to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ErrorEvent {
    /// The viewer for a model could not be loaded
    ViewerFailed {
        /// Model that failed
        model_id: String,
        /// Failure as shown to the user
        message: String,
    },
    /// The colour material is not in the model
    MaterialMissing {
        /// Model searched
        model_id: String,
        /// Material name looked up
        material: String,
    },
    /// Input text was refused at the edit boundary
    InputRejected {
        /// Field the text was typed into
        field: String,
        /// Reason
        message: String,
    },
}

impl ErrorEvent {
    /// Severity of this event
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ViewerFailed { .. } => ErrorSeverity::Error,
            Self::MaterialMissing { .. } | Self::InputRejected { .. } => ErrorSeverity::Warning,
        }
    }
}

impl fmt::Display for ErrorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ViewerFailed { model_id, message } => {
                write!(f, "Viewer for {} failed: {}", model_id, message)
            }
            Self::MaterialMissing { model_id, material } => {
                write!(f, "Material '{}' not found in {}", material, model_id)
            }
            Self::InputRejected { field, message } => write!(f, "{} rejected: {}", field, message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let changed = AppEvent::Configuration(ConfigurationEvent::Changed {
            field: ConfigurationField::Width,
            configuration: Configuration::default(),
        });
        let terminated = AppEvent::Session(SessionEvent::Terminated {
            model_id: "small-cube".to_string(),
            last_status: SessionStatus::Ready,
        });
        assert_eq!(changed.category(), EventCategory::Configuration);
        assert_eq!(terminated.category(), EventCategory::Session);
    }

    #[test]
    fn test_log_lines() {
        let status = AppEvent::Session(SessionEvent::StatusChanged {
            model_id: "small-table".to_string(),
            old: SessionStatus::Loading,
            new: SessionStatus::Ready,
        });
        assert_eq!(status.to_string(), "Session small-table: Loading -> Ready");

        let missing = AppEvent::Error(ErrorEvent::MaterialMissing {
            model_id: "small-cube".to_string(),
            material: "table_surface".to_string(),
        });
        assert_eq!(
            missing.to_string(),
            "Material 'table_surface' not found in small-cube"
        );
    }

    #[test]
    fn test_json_form_keeps_configuration() {
        let configuration = Configuration {
            depth: 350.0,
            ..Default::default()
        };
        let event = AppEvent::Configuration(ConfigurationEvent::Changed {
            field: ConfigurationField::Depth,
            configuration,
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"#000000\""));

        match serde_json::from_str::<AppEvent>(&json).unwrap() {
            AppEvent::Configuration(ConfigurationEvent::Changed {
                field,
                configuration: parsed,
            }) => {
                assert_eq!(field, ConfigurationField::Depth);
                assert_eq!(parsed, configuration);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_severity() {
        let failed = ErrorEvent::ViewerFailed {
            model_id: "small-table".to_string(),
            message: "Error loading model small-table".to_string(),
        };
        let rejected = ErrorEvent::InputRejected {
            field: "width".to_string(),
            message: "not a number".to_string(),
        };
        assert_eq!(failed.severity(), ErrorSeverity::Error);
        assert_eq!(rejected.severity(), ErrorSeverity::Warning);
    }
}
