//! Process-wide viewer script registry
//!
//! The viewer client script is a global resource of the host environment.
//! The registry, keyed by script URL, makes sure it is injected once no
//! matter how many sessions ask for it, tells every waiting session when it
//! has loaded, and removes it only when the last session holding it is torn
//! down.

use crate::api::ViewerRuntime;
use crate::session::{SessionSignal, SessionToken, SignalSender};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Load state of one script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptState {
    /// Injected, load pending
    Loading,
    /// Loaded and usable
    Loaded,
    /// Load failed
    Failed(String),
}

struct ScriptEntry {
    state: ScriptState,
    /// Session that injected the script
    loaded_by: SessionToken,
    holders: Vec<SessionToken>,
    waiters: Vec<(SessionToken, SignalSender)>,
}

/// A session's hold on a script; hand back with [`ScriptRegistry::release`]
#[must_use = "a lease must be released when its session is torn down"]
#[derive(Debug)]
pub struct ScriptLease {
    url: String,
    token: SessionToken,
    injected: bool,
}

impl ScriptLease {
    /// Script URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether acquiring this lease injected the script
    pub fn injected(&self) -> bool {
        self.injected
    }
}

enum AcquireAction {
    Inject,
    AlreadyLoaded,
    Wait,
}

/// Registry of scripts present in the host environment
#[derive(Default)]
pub struct ScriptRegistry {
    entries: RefCell<HashMap<String, ScriptEntry>>,
}

impl ScriptRegistry {
    /// Create an empty registry
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Take a hold on the script at `url` for a session
    ///
    /// Injects the script if nobody has; otherwise joins the existing load.
    /// The session is told through `notify` once the script is usable
    /// ([`SessionSignal::ScriptLoaded`]) or has failed
    /// ([`SessionSignal::ScriptFailed`]). A previously failed script is
    /// injected again.
    pub fn acquire(
        self: &Rc<Self>,
        url: &str,
        token: SessionToken,
        notify: &SignalSender,
        runtime: &dyn ViewerRuntime,
    ) -> ScriptLease {
        let action = {
            let mut entries = self.entries.borrow_mut();
            match entries.get_mut(url) {
                None => {
                    entries.insert(
                        url.to_string(),
                        ScriptEntry {
                            state: ScriptState::Loading,
                            loaded_by: token,
                            holders: vec![token],
                            waiters: vec![(token, notify.clone())],
                        },
                    );
                    AcquireAction::Inject
                }
                Some(entry) => {
                    entry.holders.push(token);
                    match entry.state {
                        ScriptState::Loaded => AcquireAction::AlreadyLoaded,
                        ScriptState::Loading => {
                            entry.waiters.push((token, notify.clone()));
                            AcquireAction::Wait
                        }
                        ScriptState::Failed(_) => {
                            entry.state = ScriptState::Loading;
                            entry.loaded_by = token;
                            entry.waiters.push((token, notify.clone()));
                            AcquireAction::Inject
                        }
                    }
                }
            }
        };

        let injected = matches!(action, AcquireAction::Inject);
        match action {
            AcquireAction::Inject => {
                tracing::info!("Injecting viewer script {} for session {}", url, token);
                let registry: Weak<Self> = Rc::downgrade(self);
                let url_owned = url.to_string();
                runtime.inject_script(
                    url,
                    Box::new(move |result| {
                        if let Some(registry) = registry.upgrade() {
                            registry.complete(&url_owned, result);
                        }
                    }),
                );
            }
            AcquireAction::AlreadyLoaded => {
                tracing::debug!("Viewer script {} already loaded, skipping reload", url);
                notify.send(SessionSignal::ScriptLoaded { token }).ok();
            }
            AcquireAction::Wait => {
                tracing::debug!("Session {} waiting on in-flight load of {}", token, url);
            }
        }

        ScriptLease {
            url: url.to_string(),
            token,
            injected,
        }
    }

    /// Drop a session's hold; removes the script when no holder remains
    pub fn release(&self, lease: ScriptLease, runtime: &dyn ViewerRuntime) {
        let removed = {
            let mut entries = self.entries.borrow_mut();
            let Some(entry) = entries.get_mut(&lease.url) else {
                return;
            };
            entry.holders.retain(|t| *t != lease.token);
            entry.waiters.retain(|(t, _)| *t != lease.token);

            if entry.holders.is_empty() {
                entries.remove(&lease.url)
            } else {
                tracing::debug!(
                    "Viewer script {} still held by {} session(s)",
                    lease.url,
                    entry.holders.len()
                );
                None
            }
        };

        if let Some(entry) = removed {
            tracing::info!(
                "Removing viewer script {} (loaded by session {})",
                lease.url,
                entry.loaded_by
            );
            runtime.remove_script(&lease.url);
        }
    }

    /// Current state of the script at `url`
    pub fn state(&self, url: &str) -> Option<ScriptState> {
        self.entries.borrow().get(url).map(|e| e.state.clone())
    }

    /// Number of sessions holding the script at `url`
    pub fn holder_count(&self, url: &str) -> usize {
        self.entries
            .borrow()
            .get(url)
            .map_or(0, |e| e.holders.len())
    }

    /// Session that injected the script at `url`
    pub fn loaded_by(&self, url: &str) -> Option<SessionToken> {
        self.entries.borrow().get(url).map(|e| e.loaded_by)
    }

    fn complete(&self, url: &str, result: Result<(), String>) {
        let waiters = {
            let mut entries = self.entries.borrow_mut();
            let Some(entry) = entries.get_mut(url) else {
                tracing::debug!("Load of {} finished after every holder left", url);
                return;
            };
            entry.state = match &result {
                Ok(()) => ScriptState::Loaded,
                Err(reason) => ScriptState::Failed(reason.clone()),
            };
            std::mem::take(&mut entry.waiters)
        };

        match &result {
            Ok(()) => tracing::info!("Viewer script {} loaded", url),
            Err(reason) => tracing::error!("Viewer script {} failed to load: {}", url, reason),
        }

        for (token, notify) in waiters {
            let signal = match &result {
                Ok(()) => SessionSignal::ScriptLoaded { token },
                Err(reason) => SessionSignal::ScriptFailed {
                    token,
                    reason: reason.clone(),
                },
            };
            notify.send(signal).ok();
        }
    }
}

thread_local! {
    static SCRIPT_REGISTRY: Rc<ScriptRegistry> = ScriptRegistry::new();
}

/// Registry shared by every controller on this thread
pub fn script_registry() -> Rc<ScriptRegistry> {
    SCRIPT_REGISTRY.with(Rc::clone)
}
