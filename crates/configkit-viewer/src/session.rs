//! Render session
//!
//! A [`RenderSession`] is one live connection to the viewer for one model
//! identifier. It owns the client and API handles exclusively and records
//! what it last applied so re-applying the same configuration is a no-op.
//!
//! Viewer callbacks never touch a session directly. They post a
//! [`SessionSignal`] tagged with the issuing session's [`SessionToken`];
//! the controller routes each signal to the session only if the token
//! still matches the live session.

use crate::api::{InitCallbacks, Material, ViewerApi, ViewerClient, ViewerOptions, ViewerRuntime};
use crate::script::{ScriptLease, ScriptRegistry};
use configkit_core::event_bus::{AppEvent, ErrorEvent};
use configkit_core::{emit, Configuration, Rgb, SessionError, SessionStatus, SubscriptionId};
use std::rc::Rc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Identity of one session; stale callbacks carry an old token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(Uuid);

impl SessionToken {
    /// Create a new unique token
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// The two independent listeners registered for the viewer's ready event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadyListener {
    /// Applies the scale
    Scale,
    /// Applies the material colour
    Material,
}

/// Event delivered to the controller by viewer callbacks and the store
pub enum SessionSignal {
    /// Viewer script is usable
    ScriptLoaded {
        /// Receiving session
        token: SessionToken,
    },
    /// Viewer script failed to load
    ScriptFailed {
        /// Receiving session
        token: SessionToken,
        /// Reason reported by the runtime
        reason: String,
    },
    /// Model initialised; carries the live API
    InitSucceeded {
        /// Receiving session
        token: SessionToken,
        /// API handle, owned by the session from now on
        api: Box<dyn ViewerApi>,
    },
    /// Model failed to initialise
    InitFailed {
        /// Receiving session
        token: SessionToken,
    },
    /// A ready listener fired
    ViewerReady {
        /// Receiving session
        token: SessionToken,
        /// Which listener fired
        listener: ReadyListener,
    },
    /// A material lookup returned
    MaterialResolved {
        /// Receiving session
        token: SessionToken,
        /// Lookup sequence number
        request: u64,
        /// Colour the lookup was made for
        color: Rgb,
        /// Material, or `None` when the name is unknown
        material: Option<Material>,
    },
    /// The configuration store changed
    ConfigurationChanged {
        /// Receiving session
        token: SessionToken,
        /// Configuration after the change
        configuration: Configuration,
    },
}

impl SessionSignal {
    /// Token of the session this signal is addressed to
    pub fn token(&self) -> SessionToken {
        match self {
            Self::ScriptLoaded { token }
            | Self::ScriptFailed { token, .. }
            | Self::InitSucceeded { token, .. }
            | Self::InitFailed { token }
            | Self::ViewerReady { token, .. }
            | Self::MaterialResolved { token, .. }
            | Self::ConfigurationChanged { token, .. } => *token,
        }
    }

    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::ScriptLoaded { .. } => "ScriptLoaded",
            Self::ScriptFailed { .. } => "ScriptFailed",
            Self::InitSucceeded { .. } => "InitSucceeded",
            Self::InitFailed { .. } => "InitFailed",
            Self::ViewerReady { .. } => "ViewerReady",
            Self::MaterialResolved { .. } => "MaterialResolved",
            Self::ConfigurationChanged { .. } => "ConfigurationChanged",
        }
    }
}

impl std::fmt::Debug for SessionSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(self.name())
            .field("token", &self.token())
            .finish_non_exhaustive()
    }
}

/// Sending half of a controller's signal channel
pub type SignalSender = mpsc::UnboundedSender<SessionSignal>;

/// One live connection to the viewer for one model
pub struct RenderSession {
    token: SessionToken,
    model_id: String,
    status: SessionStatus,
    lease: Option<ScriptLease>,
    client: Option<Box<dyn ViewerClient>>,
    api: Option<Box<dyn ViewerApi>>,
    subscription: Option<SubscriptionId>,
    /// Latest configuration received before Ready
    pending: Option<Configuration>,
    applied_scale: Option<(f64, f64, f64)>,
    requested_color: Option<Rgb>,
    applied_color: Option<Rgb>,
    material_requests: u64,
    commands_issued: usize,
    error: Option<SessionError>,
}

impl RenderSession {
    /// Create an uninitialised session for a model
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            token: SessionToken::new(),
            model_id: model_id.into(),
            status: SessionStatus::Uninitialized,
            lease: None,
            client: None,
            api: None,
            subscription: None,
            pending: None,
            applied_scale: None,
            requested_color: None,
            applied_color: None,
            material_requests: 0,
            commands_issued: 0,
            error: None,
        }
    }

    /// Session identity
    pub fn token(&self) -> SessionToken {
        self.token
    }

    /// Model this session is bound to
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Current status
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Error that moved the session to Failed
    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    /// Scale last sent to the viewer
    pub fn applied_scale(&self) -> Option<(f64, f64, f64)> {
        self.applied_scale
    }

    /// Colour last written to the material
    pub fn applied_color(&self) -> Option<Rgb> {
        self.applied_color
    }

    /// Number of scale/material commands issued
    pub fn commands_issued(&self) -> usize {
        self.commands_issued
    }

    /// Whether a configuration change is waiting for Ready
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether this session injected the viewer script
    pub fn injected_script(&self) -> bool {
        self.lease.as_ref().is_some_and(ScriptLease::injected)
    }

    pub(crate) fn set_subscription(&mut self, id: SubscriptionId) {
        self.subscription = Some(id);
    }

    pub(crate) fn take_subscription(&mut self) -> Option<SubscriptionId> {
        self.subscription.take()
    }

    /// Uninitialized -> Loading: take a hold on the viewer script
    pub(crate) fn begin_loading(
        &mut self,
        registry: &Rc<ScriptRegistry>,
        runtime: &dyn ViewerRuntime,
        options: &ViewerOptions,
        tx: &SignalSender,
    ) {
        if self.status != SessionStatus::Uninitialized {
            return;
        }
        self.status = SessionStatus::Loading;
        self.lease = Some(registry.acquire(&options.script_url, self.token, tx, runtime));
    }

    /// Script is usable: build the client and initialise the model
    pub(crate) fn on_script_loaded(
        &mut self,
        runtime: &dyn ViewerRuntime,
        options: &ViewerOptions,
        tx: &SignalSender,
    ) {
        if self.status != SessionStatus::Loading || self.client.is_some() {
            tracing::debug!("Session {} ignoring repeated script load", self.token);
            return;
        }

        let client = match runtime.create_client(&options.api_version) {
            Ok(client) => client,
            Err(err) => {
                self.fail(err);
                return;
            }
        };

        let token = self.token;
        let on_success = tx.clone();
        let on_error = tx.clone();
        tracing::info!("Initialising model {} (session {})", self.model_id, token);
        client.init(
            &self.model_id,
            InitCallbacks {
                success: Box::new(move |api| {
                    on_success
                        .send(SessionSignal::InitSucceeded { token, api })
                        .ok();
                }),
                error: Box::new(move || {
                    on_error.send(SessionSignal::InitFailed { token }).ok();
                }),
            },
        );
        self.client = Some(client);
    }

    /// Model initialised: configure the viewer and register ready listeners
    pub(crate) fn on_init_succeeded(
        &mut self,
        api: Box<dyn ViewerApi>,
        options: &ViewerOptions,
        tx: &SignalSender,
    ) {
        if self.status != SessionStatus::Loading || self.api.is_some() {
            tracing::warn!("Session {} ignoring repeated init success", self.token);
            return;
        }

        api.set_quality(options.quality);
        api.start();

        for listener in [ReadyListener::Scale, ReadyListener::Material] {
            let token = self.token;
            let tx = tx.clone();
            api.add_event_listener(
                &options.ready_event,
                Box::new(move || {
                    tx.send(SessionSignal::ViewerReady { token, listener }).ok();
                }),
            );
        }
        self.api = Some(api);
    }

    /// A ready listener fired: reach Ready and apply that listener's part
    ///
    /// `current` is the store's configuration. Anything queued while loading
    /// is superseded by it, so the queue is dropped on the transition.
    pub(crate) fn on_viewer_ready(
        &mut self,
        listener: ReadyListener,
        current: Configuration,
        options: &ViewerOptions,
        tx: &SignalSender,
    ) {
        match self.status {
            SessionStatus::Loading if self.api.is_some() => {
                self.status = SessionStatus::Ready;
                tracing::info!("Session {} ready for model {}", self.token, self.model_id);
                if self.pending.take().is_some() {
                    tracing::debug!("Session {} flushed queued configuration", self.token);
                }
            }
            SessionStatus::Ready => {}
            _ => return,
        }

        match listener {
            ReadyListener::Scale => self.apply_scale(&current),
            ReadyListener::Material => self.request_material(current.color, options, tx),
        }
    }

    /// Store changed: apply in place when Ready, queue while loading
    pub(crate) fn on_configuration_changed(
        &mut self,
        configuration: Configuration,
        options: &ViewerOptions,
        tx: &SignalSender,
    ) {
        match self.status {
            SessionStatus::Ready => {
                self.apply_scale(&configuration);
                self.request_material(configuration.color, options, tx);
            }
            SessionStatus::Uninitialized | SessionStatus::Loading => {
                tracing::debug!("Session {} queued configuration until ready", self.token);
                self.pending = Some(configuration);
            }
            SessionStatus::Failed => {}
        }
    }

    /// A material lookup returned
    pub(crate) fn on_material_resolved(
        &mut self,
        request: u64,
        color: Rgb,
        material: Option<Material>,
        options: &ViewerOptions,
    ) {
        if request != self.material_requests {
            tracing::debug!(
                "Session {} dropping superseded material lookup #{}",
                self.token,
                request
            );
            return;
        }
        let Some(api) = self.api.as_ref().filter(|_| self.status.accepts_commands()) else {
            return;
        };

        match material {
            Some(mut material) => {
                material.diffuse_color = color.to_unit_rgb();
                api.set_material(material);
                self.applied_color = Some(color);
                self.commands_issued += 1;
                tracing::debug!("Session {} material colour set to {}", self.token, color);
            }
            None => {
                // Allow the next change to look it up again
                self.requested_color = None;
                tracing::warn!(
                    "Session {}: material {} not found, colour {} skipped",
                    self.token,
                    options.material_name,
                    color
                );
                emit!(AppEvent::Error(ErrorEvent::MaterialMissing {
                    model_id: self.model_id.clone(),
                    material: options.material_name.clone(),
                }))
                .ok();
            }
        }
    }

    /// Record a terminal failure
    pub(crate) fn fail(&mut self, error: SessionError) {
        tracing::error!("Session {} for {} failed: {}", self.token, self.model_id, error);
        self.status = SessionStatus::Failed;
        self.error = Some(error);
        self.api = None;
        self.client = None;
    }

    /// Release everything the session holds
    pub(crate) fn teardown(&mut self, registry: &ScriptRegistry, runtime: &dyn ViewerRuntime) {
        if let Some(lease) = self.lease.take() {
            registry.release(lease, runtime);
        }
        self.api = None;
        self.client = None;
        self.pending = None;
    }

    fn apply_scale(&mut self, configuration: &Configuration) {
        let Some(api) = self.api.as_ref().filter(|_| self.status.accepts_commands()) else {
            return;
        };
        let scale = configuration.scale();
        if self.applied_scale == Some(scale) {
            return;
        }
        api.set_scale(scale.0, scale.1, scale.2);
        self.applied_scale = Some(scale);
        self.commands_issued += 1;
        tracing::debug!("Session {} scale set to {:?}", self.token, scale);
    }

    fn request_material(&mut self, color: Rgb, options: &ViewerOptions, tx: &SignalSender) {
        let Some(api) = self.api.as_ref().filter(|_| self.status.accepts_commands()) else {
            return;
        };
        if self.requested_color == Some(color) {
            return;
        }

        self.material_requests += 1;
        self.requested_color = Some(color);
        let token = self.token;
        let request = self.material_requests;
        let tx = tx.clone();
        api.get_material(
            &options.material_name,
            Box::new(move |material| {
                tx.send(SessionSignal::MaterialResolved {
                    token,
                    request,
                    color,
                    material,
                })
                .ok();
            }),
        );
    }
}

impl std::fmt::Debug for RenderSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSession")
            .field("token", &self.token)
            .field("model_id", &self.model_id)
            .field("status", &self.status)
            .field("commands_issued", &self.commands_issued)
            .finish()
    }
}
