//! Render session status shared between the viewer crate and event consumers.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a render session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SessionStatus {
    /// Created, viewer not requested yet
    #[default]
    Uninitialized,
    /// Script load or session initialisation in flight
    Loading,
    /// Viewer is live and accepts scale/material commands
    Ready,
    /// Script load or initialisation failed; terminal
    Failed,
}

impl SessionStatus {
    /// Check if commands may be issued in this status
    pub fn accepts_commands(&self) -> bool {
        matches!(self, SessionStatus::Ready)
    }

    /// Check if this status can no longer change without a new session
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Failed)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "Uninitialized"),
            Self::Loading => write!(f, "Loading"),
            Self::Ready => write!(f, "Ready"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}
