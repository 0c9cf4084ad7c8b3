//! # ConfigKit Viewer
//!
//! Lifecycle of the remote 3D viewer session and its synchronisation with
//! the configuration store.
//!
//! - [`api`]: the call shape of the external viewer client library
//! - [`script`]: process-wide registry for the viewer's client script
//! - [`session`]: one live session bound to a model identifier
//! - [`controller`]: mounts, tears down and drives sessions from signals
//! - [`sim`]: in-memory viewer runtime for headless runs and tests

pub mod api;
pub mod controller;
pub mod script;
pub mod session;
pub mod sim;

pub use api::{
    EventListener, InitCallbacks, Material, MaterialCallback, Quality, ScriptCallback, ViewerApi,
    ViewerClient, ViewerOptions, ViewerRuntime,
};
pub use controller::RenderSessionController;
pub use script::{script_registry, ScriptLease, ScriptRegistry, ScriptState};
pub use session::{ReadyListener, RenderSession, SessionSignal, SessionToken, SignalSender};
pub use sim::{Delivery, SimulatedRuntime, ViewerCall};
