//! Viewer client interface
//!
//! The external viewer ships as a script loaded into the host environment.
//! Once loaded it exposes a client whose `init(model_id, {success, error})`
//! yields an API handle for scale and material commands. These traits
//! mirror that call shape; callbacks may fire at any later point.

use configkit_core::SessionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Completion callback for a script injection
pub type ScriptCallback = Box<dyn FnOnce(Result<(), String>)>;

/// Result callback for a material lookup; `None` when the name is unknown
pub type MaterialCallback = Box<dyn FnOnce(Option<Material>)>;

/// Viewer event listener
pub type EventListener = Box<dyn Fn()>;

/// Named surface-appearance resource inside a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Material name within the model
    pub name: String,
    /// Diffuse colour as channel fractions
    pub diffuse_color: [f32; 3],
}

impl Material {
    /// Create a material
    pub fn new(name: impl Into<String>, diffuse_color: [f32; 3]) -> Self {
        Self {
            name: name.into(),
            diffuse_color,
        }
    }
}

/// Viewer rendering quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// Low quality
    Low,
    /// Medium quality
    Medium,
    /// High quality
    #[default]
    High,
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Unknown quality: {}", s)),
        }
    }
}

/// Callbacks handed to [`ViewerClient::init`]
pub struct InitCallbacks {
    /// Called with the live API once the model is initialised
    pub success: Box<dyn FnOnce(Box<dyn ViewerApi>)>,
    /// Called when the model cannot be initialised
    pub error: Box<dyn FnOnce()>,
}

/// Live viewer API for one initialised model
pub trait ViewerApi {
    /// Set rendering quality
    fn set_quality(&self, level: Quality);

    /// Start rendering
    fn start(&self);

    /// Register a listener for a named viewer event
    fn add_event_listener(&self, event: &str, listener: EventListener);

    /// Scale the model, in meters per unit
    fn set_scale(&self, x: f64, y: f64, z: f64);

    /// Look up a material by name
    fn get_material(&self, name: &str, callback: MaterialCallback);

    /// Apply a modified material
    fn set_material(&self, material: Material);
}

/// Viewer client constructed from the loaded script
pub trait ViewerClient {
    /// Initialise a model; exactly one of the callbacks fires
    fn init(&self, model_id: &str, callbacks: InitCallbacks);
}

/// Host environment the viewer script is loaded into
pub trait ViewerRuntime {
    /// Add the script to the environment; `on_complete` fires when it loads or fails
    fn inject_script(&self, url: &str, on_complete: ScriptCallback);

    /// Remove a previously injected script
    fn remove_script(&self, url: &str);

    /// Construct a client from the loaded script
    fn create_client(&self, api_version: &str) -> Result<Box<dyn ViewerClient>, SessionError>;
}

/// Viewer connection options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerOptions {
    /// URL of the viewer client script
    pub script_url: String,
    /// Client API version requested from the script
    pub api_version: String,
    /// Quality set right after initialisation
    pub quality: Quality,
    /// Material whose diffuse colour follows the configuration
    pub material_name: String,
    /// Viewer event signalling readiness
    pub ready_event: String,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            script_url: "https://static.sketchfab.com/release/webgl-api.js".to_string(),
            api_version: "1.10.0".to_string(),
            quality: Quality::High,
            material_name: "table_surface".to_string(),
            ready_event: "viewerready".to_string(),
        }
    }
}
