//! Render Session Controller
//!
//! Owns at most one [`RenderSession`] and keeps the viewer in step with the
//! [`ConfigurationStore`]:
//!
//! - `mount(model_id)` creates a session on first mount or when the model
//!   changes; mounting the same model again keeps the live session
//! - configuration changes are applied in place to the Ready session and
//!   never recreate it
//! - `unmount()` (also run on drop) tears the session down and releases its
//!   hold on the viewer script
//!
//! All viewer callbacks and store notifications arrive as [`SessionSignal`]s
//! on one channel and are handled on the caller's thread by [`pump`] or
//! [`run_until_ready`]. Signals addressed to a torn-down session are dropped.
//!
//! [`pump`]: RenderSessionController::pump
//! [`run_until_ready`]: RenderSessionController::run_until_ready

use crate::api::{ViewerOptions, ViewerRuntime};
use crate::script::{script_registry, ScriptRegistry};
use crate::session::{RenderSession, SessionSignal, SignalSender};
use configkit_core::event_bus::{AppEvent, ErrorEvent, SessionEvent};
use configkit_core::{emit, ConfigurationStore, SessionError, SessionStatus};
use std::rc::Rc;
use tokio::sync::mpsc;

/// Drives render sessions for one hosting view
pub struct RenderSessionController {
    runtime: Rc<dyn ViewerRuntime>,
    registry: Rc<ScriptRegistry>,
    store: Rc<ConfigurationStore>,
    options: ViewerOptions,
    tx: SignalSender,
    rx: mpsc::UnboundedReceiver<SessionSignal>,
    session: Option<RenderSession>,
    last_error: Option<SessionError>,
}

impl RenderSessionController {
    /// Create a controller using the thread's shared script registry
    pub fn new(
        runtime: Rc<dyn ViewerRuntime>,
        store: Rc<ConfigurationStore>,
        options: ViewerOptions,
    ) -> Self {
        Self::with_registry(runtime, store, options, script_registry())
    }

    /// Create a controller with an explicit script registry
    pub fn with_registry(
        runtime: Rc<dyn ViewerRuntime>,
        store: Rc<ConfigurationStore>,
        options: ViewerOptions,
        registry: Rc<ScriptRegistry>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            runtime,
            registry,
            store,
            options,
            tx,
            rx,
            session: None,
            last_error: None,
        }
    }

    /// Show the viewer for `model_id`
    ///
    /// Returns true if a new session was started. A different model tears
    /// the old session down first.
    pub fn mount(&mut self, model_id: &str) -> bool {
        if self
            .session
            .as_ref()
            .is_some_and(|s| s.model_id() == model_id)
        {
            tracing::debug!("Model {} already mounted, keeping session", model_id);
            return false;
        }

        self.unmount();
        self.last_error = None;

        let mut session = RenderSession::new(model_id);
        let token = session.token();
        tracing::info!("Mounting model {} (session {})", model_id, token);

        let tx = self.tx.clone();
        let subscription = self.store.subscribe(move |configuration| {
            tx.send(SessionSignal::ConfigurationChanged {
                token,
                configuration: *configuration,
            })
            .ok();
        });
        session.set_subscription(subscription);

        let before = session.status();
        session.begin_loading(
            &self.registry,
            self.runtime.as_ref(),
            &self.options,
            &self.tx,
        );
        publish_status(&session, before);
        self.session = Some(session);
        true
    }

    /// Tear down the live session, if any
    pub fn unmount(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };

        if let Some(id) = session.take_subscription() {
            self.store.unsubscribe(id);
        }
        session.teardown(&self.registry, self.runtime.as_ref());

        tracing::info!(
            "Session {} for {} terminated ({})",
            session.token(),
            session.model_id(),
            session.status()
        );
        emit!(AppEvent::Session(SessionEvent::Terminated {
            model_id: session.model_id().to_string(),
            last_status: session.status(),
        }))
        .ok();
    }

    /// Status of the live session; Uninitialized when nothing is mounted
    pub fn status(&self) -> SessionStatus {
        self.session
            .as_ref()
            .map_or(SessionStatus::Uninitialized, RenderSession::status)
    }

    /// Model of the live session
    pub fn model_id(&self) -> Option<&str> {
        self.session.as_ref().map(RenderSession::model_id)
    }

    /// The live session
    pub fn session(&self) -> Option<&RenderSession> {
        self.session.as_ref()
    }

    /// Failure of the current mount, if it failed
    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    /// Viewer options in use
    pub fn options(&self) -> &ViewerOptions {
        &self.options
    }

    /// Handle every signal queued so far, including ones raised while handling
    ///
    /// Returns the number of signals handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(signal) = self.rx.try_recv() {
            self.handle(signal);
            handled += 1;
        }
        handled
    }

    /// Handle signals until the live session is Ready or has failed
    pub async fn run_until_ready(&mut self) -> Result<(), SessionError> {
        loop {
            match self.status() {
                SessionStatus::Ready => return Ok(()),
                SessionStatus::Failed => {
                    return Err(self.last_error.clone().unwrap_or(SessionError::Terminated))
                }
                _ if self.session.is_none() => return Err(SessionError::Terminated),
                _ => {}
            }

            match self.rx.recv().await {
                Some(signal) => self.handle(signal),
                None => return Err(SessionError::Terminated),
            }
        }
    }

    fn handle(&mut self, signal: SessionSignal) {
        let token = signal.token();
        let Some(session) = self.session.as_mut().filter(|s| s.token() == token) else {
            tracing::warn!(
                "Ignoring {} for torn-down session {}",
                signal.name(),
                token
            );
            return;
        };
        let before = session.status();
        let runtime = self.runtime.as_ref();

        match signal {
            SessionSignal::ScriptLoaded { .. } => {
                session.on_script_loaded(runtime, &self.options, &self.tx)
            }
            SessionSignal::ScriptFailed { reason, .. } => {
                if before == SessionStatus::Loading {
                    session.fail(SessionError::ScriptLoadFailed {
                        url: self.options.script_url.clone(),
                        reason,
                    });
                }
            }
            SessionSignal::InitSucceeded { api, .. } => {
                session.on_init_succeeded(api, &self.options, &self.tx)
            }
            SessionSignal::InitFailed { .. } => {
                if before == SessionStatus::Loading {
                    let model_id = session.model_id().to_string();
                    session.fail(SessionError::InitFailed { model_id });
                }
            }
            SessionSignal::ViewerReady { listener, .. } => session.on_viewer_ready(
                listener,
                self.store.configuration(),
                &self.options,
                &self.tx,
            ),
            SessionSignal::MaterialResolved {
                request,
                color,
                material,
                ..
            } => session.on_material_resolved(request, color, material, &self.options),
            SessionSignal::ConfigurationChanged { configuration, .. } => {
                session.on_configuration_changed(configuration, &self.options, &self.tx)
            }
        }

        if session.status() == SessionStatus::Failed && before != SessionStatus::Failed {
            let error = session.error().cloned().unwrap_or(SessionError::Terminated);
            emit!(AppEvent::Error(ErrorEvent::ViewerFailed {
                model_id: session.model_id().to_string(),
                message: error.to_string(),
            }))
            .ok();
            self.last_error = Some(error);
        }
        publish_status(session, before);
    }
}

impl Drop for RenderSessionController {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for RenderSessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSessionController")
            .field("session", &self.session)
            .field("options", &self.options)
            .finish()
    }
}

fn publish_status(session: &RenderSession, before: SessionStatus) {
    if session.status() == before {
        return;
    }
    emit!(AppEvent::Session(SessionEvent::StatusChanged {
        model_id: session.model_id().to_string(),
        old: before,
        new: session.status(),
    }))
    .ok();
}
