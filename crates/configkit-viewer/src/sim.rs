//! Simulated viewer runtime
//!
//! An in-memory [`ViewerRuntime`] that records every call and lets the host
//! decide when callbacks fire. With [`Delivery::Immediate`] each callback
//! fires inside the call that registered it; with [`Delivery::Manual`]
//! callbacks wait until `complete_scripts`, `complete_inits`, `fire_event`
//! or `resolve_materials` is called, in whatever order the host chooses.

use crate::api::{
    EventListener, InitCallbacks, Material, MaterialCallback, Quality, ScriptCallback, ViewerApi,
    ViewerClient, ViewerRuntime,
};
use configkit_core::SessionError;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// When simulated callbacks fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delivery {
    /// Inside the call that registered them
    #[default]
    Immediate,
    /// When the host triggers them
    Manual,
}

/// One recorded call into the simulated viewer
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerCall {
    /// Script added to the environment
    InjectScript(String),
    /// Script removed from the environment
    RemoveScript(String),
    /// Client constructed for an API version
    CreateClient(String),
    /// `init` for a model
    Init(String),
    /// `setQuality`
    SetQuality(Quality),
    /// `start`
    Start,
    /// `addEventListener` for an event name
    AddEventListener(String),
    /// `setScale`
    SetScale(f64, f64, f64),
    /// `getMaterial` by name
    GetMaterial(String),
    /// `setMaterial`
    SetMaterial(Material),
}

impl ViewerCall {
    /// Whether this call changes what the model looks like
    pub fn is_command(&self) -> bool {
        matches!(self, ViewerCall::SetScale(..) | ViewerCall::SetMaterial(_))
    }
}

#[derive(Default)]
struct SimState {
    delivery: Delivery,
    fail_script: bool,
    fail_init: bool,
    fail_client: bool,
    materials: Vec<Material>,
    calls: Vec<ViewerCall>,
    scripts: Vec<String>,
    pending_scripts: VecDeque<(String, ScriptCallback)>,
    pending_inits: VecDeque<InitCallbacks>,
    listeners: Vec<(String, Rc<dyn Fn()>)>,
    pending_materials: VecDeque<(String, MaterialCallback)>,
}

/// In-memory viewer runtime
#[derive(Clone)]
pub struct SimulatedRuntime {
    state: Rc<RefCell<SimState>>,
}

impl SimulatedRuntime {
    /// Immediate delivery, one black `table_surface` material
    pub fn new() -> Self {
        let state = SimState {
            materials: vec![Material::new("table_surface", [0.0, 0.0, 0.0])],
            ..Default::default()
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Set the callback delivery mode
    pub fn with_delivery(self, delivery: Delivery) -> Self {
        self.state.borrow_mut().delivery = delivery;
        self
    }

    /// Replace the model's materials
    pub fn with_materials(self, materials: Vec<Material>) -> Self {
        self.state.borrow_mut().materials = materials;
        self
    }

    /// Make every script load fail
    pub fn failing_script(self) -> Self {
        self.state.borrow_mut().fail_script = true;
        self
    }

    /// Make every model initialisation fail
    pub fn failing_init(self) -> Self {
        self.state.borrow_mut().fail_init = true;
        self
    }

    /// Make client construction fail
    pub fn failing_client(self) -> Self {
        self.state.borrow_mut().fail_client = true;
        self
    }

    /// Add a material to the model
    pub fn add_material(&self, material: Material) {
        self.state.borrow_mut().materials.push(material);
    }

    /// Every call so far, in order
    pub fn calls(&self) -> Vec<ViewerCall> {
        self.state.borrow().calls.clone()
    }

    /// Scale and material commands so far
    pub fn commands(&self) -> Vec<ViewerCall> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| c.is_command())
            .cloned()
            .collect()
    }

    /// Count calls matching a predicate
    pub fn count(&self, predicate: impl Fn(&ViewerCall) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|c| predicate(c)).count()
    }

    /// Most recent `setScale` arguments
    pub fn last_scale(&self) -> Option<(f64, f64, f64)> {
        self.state.borrow().calls.iter().rev().find_map(|c| match c {
            ViewerCall::SetScale(x, y, z) => Some((*x, *y, *z)),
            _ => None,
        })
    }

    /// Current state of a material in the model
    pub fn material(&self, name: &str) -> Option<Material> {
        self.state
            .borrow()
            .materials
            .iter()
            .find(|m| m.name == name)
            .cloned()
    }

    /// Whether a script is present in the environment
    pub fn script_present(&self, url: &str) -> bool {
        self.state.borrow().scripts.iter().any(|s| s == url)
    }

    /// Number of registered listeners for an event
    pub fn listener_count(&self, event: &str) -> usize {
        self.state
            .borrow()
            .listeners
            .iter()
            .filter(|(name, _)| name == event)
            .count()
    }

    /// Finish every pending script load
    pub fn complete_scripts(&self) -> usize {
        let pending: Vec<_> = self.state.borrow_mut().pending_scripts.drain(..).collect();
        let count = pending.len();
        for (url, callback) in pending {
            self.finish_script(url, callback);
        }
        count
    }

    /// Finish every pending model initialisation
    pub fn complete_inits(&self) -> usize {
        let pending: Vec<_> = self.state.borrow_mut().pending_inits.drain(..).collect();
        let count = pending.len();
        for callbacks in pending {
            self.finish_init(callbacks);
        }
        count
    }

    /// Fire an event to its listeners in registration order
    pub fn fire_event(&self, event: &str) -> usize {
        let listeners = self.listeners_for(event);
        for listener in &listeners {
            listener();
        }
        listeners.len()
    }

    /// Fire an event to its listeners in reverse registration order
    pub fn fire_event_reversed(&self, event: &str) -> usize {
        let listeners = self.listeners_for(event);
        for listener in listeners.iter().rev() {
            listener();
        }
        listeners.len()
    }

    /// Fire a single listener of an event, by registration index
    ///
    /// Returns false when no listener is registered at that index.
    pub fn fire_listener(&self, event: &str, index: usize) -> bool {
        let Some(listener) = self.listeners_for(event).get(index).cloned() else {
            return false;
        };
        listener();
        true
    }

    /// Answer every pending material lookup in request order
    pub fn resolve_materials(&self) -> usize {
        let pending: Vec<_> = self.state.borrow_mut().pending_materials.drain(..).collect();
        let count = pending.len();
        for (name, callback) in pending {
            let material = self.material(&name);
            callback(material);
        }
        count
    }

    /// Answer every pending material lookup, newest first
    pub fn resolve_materials_reversed(&self) -> usize {
        let pending: Vec<_> = self.state.borrow_mut().pending_materials.drain(..).collect();
        let count = pending.len();
        for (name, callback) in pending.into_iter().rev() {
            let material = self.material(&name);
            callback(material);
        }
        count
    }

    fn record(&self, call: ViewerCall) {
        self.state.borrow_mut().calls.push(call);
    }

    fn immediate(&self) -> bool {
        self.state.borrow().delivery == Delivery::Immediate
    }

    fn listeners_for(&self, event: &str) -> Vec<Rc<dyn Fn()>> {
        self.state
            .borrow()
            .listeners
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, listener)| listener.clone())
            .collect()
    }

    fn finish_script(&self, url: String, callback: ScriptCallback) {
        let failed = self.state.borrow().fail_script;
        if failed {
            callback(Err(format!("network error loading {}", url)));
        } else {
            self.state.borrow_mut().scripts.push(url);
            callback(Ok(()));
        }
    }

    fn finish_init(&self, callbacks: InitCallbacks) {
        let failed = self.state.borrow().fail_init;
        if failed {
            (callbacks.error)();
        } else {
            (callbacks.success)(Box::new(SimulatedApi {
                runtime: self.clone(),
            }));
        }
    }
}

impl Default for SimulatedRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewerRuntime for SimulatedRuntime {
    fn inject_script(&self, url: &str, on_complete: ScriptCallback) {
        self.record(ViewerCall::InjectScript(url.to_string()));
        if self.immediate() {
            self.finish_script(url.to_string(), on_complete);
        } else {
            self.state
                .borrow_mut()
                .pending_scripts
                .push_back((url.to_string(), on_complete));
        }
    }

    fn remove_script(&self, url: &str) {
        self.record(ViewerCall::RemoveScript(url.to_string()));
        self.state.borrow_mut().scripts.retain(|s| s != url);
    }

    fn create_client(&self, api_version: &str) -> Result<Box<dyn ViewerClient>, SessionError> {
        self.record(ViewerCall::CreateClient(api_version.to_string()));
        let state = self.state.borrow();
        if state.fail_client || state.scripts.is_empty() {
            return Err(SessionError::ClientUnavailable {
                reason: "viewer constructor is not defined".to_string(),
            });
        }
        Ok(Box::new(SimulatedClient {
            runtime: self.clone(),
        }))
    }
}

struct SimulatedClient {
    runtime: SimulatedRuntime,
}

impl ViewerClient for SimulatedClient {
    fn init(&self, model_id: &str, callbacks: InitCallbacks) {
        self.runtime.record(ViewerCall::Init(model_id.to_string()));
        if self.runtime.immediate() {
            self.runtime.finish_init(callbacks);
        } else {
            self.runtime
                .state
                .borrow_mut()
                .pending_inits
                .push_back(callbacks);
        }
    }
}

struct SimulatedApi {
    runtime: SimulatedRuntime,
}

impl ViewerApi for SimulatedApi {
    fn set_quality(&self, level: Quality) {
        self.runtime.record(ViewerCall::SetQuality(level));
    }

    fn start(&self) {
        self.runtime.record(ViewerCall::Start);
    }

    fn add_event_listener(&self, event: &str, listener: EventListener) {
        self.runtime
            .record(ViewerCall::AddEventListener(event.to_string()));
        let listener: Rc<dyn Fn()> = Rc::from(listener);
        self.runtime
            .state
            .borrow_mut()
            .listeners
            .push((event.to_string(), listener.clone()));
        if self.runtime.immediate() {
            listener();
        }
    }

    fn set_scale(&self, x: f64, y: f64, z: f64) {
        self.runtime.record(ViewerCall::SetScale(x, y, z));
    }

    fn get_material(&self, name: &str, callback: MaterialCallback) {
        self.runtime.record(ViewerCall::GetMaterial(name.to_string()));
        if self.runtime.immediate() {
            callback(self.runtime.material(name));
        } else {
            self.runtime
                .state
                .borrow_mut()
                .pending_materials
                .push_back((name.to_string(), callback));
        }
    }

    fn set_material(&self, material: Material) {
        self.runtime.record(ViewerCall::SetMaterial(material.clone()));
        let mut state = self.runtime.state.borrow_mut();
        match state.materials.iter().position(|m| m.name == material.name) {
            Some(index) => state.materials[index] = material,
            None => state.materials.push(material),
        }
    }
}
