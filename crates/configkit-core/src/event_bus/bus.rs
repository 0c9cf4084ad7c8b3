//! Event bus and its global instance.

use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::{Arc, OnceLock};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{AppEvent, EventCategory, SessionEvent};

/// Handle returned by a subscription, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0.simple())
    }
}

/// Which events a subscriber receives
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EventFilter {
    /// Everything
    #[default]
    All,
    /// Events in any of the listed categories
    Categories(Vec<EventCategory>),
    /// Session events for one model identifier
    Model(String),
}

impl EventFilter {
    /// Check an event against the filter
    pub fn matches(&self, event: &AppEvent) -> bool {
        match self {
            Self::All => true,
            Self::Categories(categories) => categories.contains(&event.category()),
            Self::Model(model) => match event {
                AppEvent::Session(
                    SessionEvent::StatusChanged { model_id, .. }
                    | SessionEvent::Terminated { model_id, .. },
                ) => model_id == model,
                _ => false,
            },
        }
    }
}

type Handler = Arc<dyn Fn(&AppEvent) + Send + Sync>;

struct Subscriber {
    id: SubscriptionId,
    filter: EventFilter,
    handler: Handler,
}

/// Sizing of the bus
#[derive(Debug, Clone, PartialEq)]
pub struct EventBusConfig {
    /// Broadcast buffer per async receiver
    pub capacity: usize,
    /// Events kept for [`EventBus::history`]; 0 keeps none
    pub history_limit: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            history_limit: 0,
        }
    }
}

/// Error types for event bus operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EventBusError {
    /// Nobody received the event
    #[error("No active subscribers")]
    NoSubscribers,
}

/// Application-wide publish/subscribe hub
///
/// Synchronous handlers run on the publishing thread in subscription order.
/// Async consumers take a [`broadcast::Receiver`] from [`EventBus::receiver`].
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
    subscribers: RwLock<Vec<Subscriber>>,
    history: Mutex<VecDeque<AppEvent>>,
    config: EventBusConfig,
}

impl EventBus {
    /// Bus with default sizing and no history
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    /// Bus with explicit sizing
    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.capacity.max(1));
        Self {
            sender,
            subscribers: RwLock::new(Vec::new()),
            history: Mutex::new(VecDeque::with_capacity(config.history_limit)),
            config,
        }
    }

    /// Deliver an event to matching handlers and async receivers
    ///
    /// Returns how many handlers and receivers got it. Handlers are called
    /// with no lock held, so they may subscribe, unsubscribe or publish.
    pub fn publish(&self, event: AppEvent) -> Result<usize, EventBusError> {
        self.remember(&event);

        let handlers: Vec<Handler> = self
            .subscribers
            .read()
            .iter()
            .filter(|s| s.filter.matches(&event))
            .map(|s| s.handler.clone())
            .collect();
        for handler in &handlers {
            handler(&event);
        }

        let receivers = self.sender.send(event).unwrap_or(0);
        match handlers.len() + receivers {
            0 => Err(EventBusError::NoSubscribers),
            delivered => Ok(delivered),
        }
    }

    /// Register a synchronous handler
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(&AppEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.subscribers.write().push(Subscriber {
            id,
            filter,
            handler: Arc::new(handler),
        });
        tracing::debug!("Event bus subscription {} added", id);
        id
    }

    /// Remove a handler; false if it was not registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let Some(index) = subscribers.iter().position(|s| s.id == id) else {
            return false;
        };
        subscribers.remove(index);
        tracing::debug!("Event bus subscription {} removed", id);
        true
    }

    /// Receiver for async consumers
    pub fn receiver(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Number of synchronous handlers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Retained events, oldest first
    pub fn history(&self) -> Vec<AppEvent> {
        self.history.lock().iter().cloned().collect()
    }

    /// Most recent retained event in a category
    pub fn last(&self, category: EventCategory) -> Option<AppEvent> {
        self.history
            .lock()
            .iter()
            .rev()
            .find(|e| e.category() == category)
            .cloned()
    }

    /// Drop retained events
    pub fn clear_history(&self) {
        self.history.lock().clear();
    }

    /// Sizing in use
    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    fn remember(&self, event: &AppEvent) {
        let limit = self.config.history_limit;
        if limit == 0 {
            return;
        }
        let mut history = self.history.lock();
        if history.len() == limit {
            history.pop_front();
        }
        history.push_back(event.clone());
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("config", &self.config)
            .finish()
    }
}

static EVENT_BUS: OnceLock<EventBus> = OnceLock::new();

/// The process-wide bus, created on first use
pub fn event_bus() -> &'static EventBus {
    EVENT_BUS.get_or_init(EventBus::new)
}

/// Create the process-wide bus with explicit sizing
///
/// Fails with the rejected config if the bus already exists.
pub fn init_event_bus(config: EventBusConfig) -> Result<(), EventBusConfig> {
    EVENT_BUS
        .set(EventBus::with_config(config))
        .map_err(|bus| bus.config.clone())
}

/// Publish an event to the global event bus
#[macro_export]
macro_rules! emit {
    ($event:expr) => {
        $crate::event_bus::event_bus().publish($event)
    };
}
