//! Configuration State Store
//!
//! Single source of truth for the current [`Configuration`]. Field setters
//! replace one field and notify every subscriber synchronously. The store
//! performs no validation; see [`crate::input::InputBoundary`] for the
//! clamping edit boundary.
//!
//! The store lives on the UI thread and is shared as `Rc<ConfigurationStore>`.

use crate::color::Rgb;
use crate::configuration::{Configuration, ConfigurationField, Price, Pricing};
use crate::event_bus::{AppEvent, ConfigurationEvent, SubscriptionId};
use crate::units::Dimension;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

type StoreHandler = Rc<dyn Fn(&Configuration)>;

/// Holds the current configuration and notifies subscribers on change
pub struct ConfigurationStore {
    configuration: Cell<Configuration>,
    pricing: Pricing,
    handlers: RefCell<Vec<(SubscriptionId, StoreHandler)>>,
    notifying: Cell<bool>,
    /// A write happened while subscribers were being notified
    deferred: Cell<bool>,
}

impl ConfigurationStore {
    /// Create a store with the default configuration and pricing
    pub fn new() -> Self {
        Self::with_configuration(Configuration::default(), Pricing::default())
    }

    /// Create a store with an initial configuration and pricing rules
    pub fn with_configuration(configuration: Configuration, pricing: Pricing) -> Self {
        Self {
            configuration: Cell::new(configuration),
            pricing,
            handlers: RefCell::new(Vec::new()),
            notifying: Cell::new(false),
            deferred: Cell::new(false),
        }
    }

    /// Current configuration
    pub fn configuration(&self) -> Configuration {
        self.configuration.get()
    }

    /// Pricing rules used by [`Self::get_price`]
    pub fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    /// Derived price of the current configuration
    pub fn get_price(&self) -> Price {
        self.configuration.get().price(&self.pricing)
    }

    /// Replace the width
    pub fn set_width(&self, value: f64) {
        self.set_dimension(Dimension::Width, value);
    }

    /// Replace the height
    pub fn set_height(&self, value: f64) {
        self.set_dimension(Dimension::Height, value);
    }

    /// Replace the depth
    pub fn set_depth(&self, value: f64) {
        self.set_dimension(Dimension::Depth, value);
    }

    /// Replace one dimension
    pub fn set_dimension(&self, dimension: Dimension, value: f64) {
        self.write(dimension.into(), |c| c.set_dimension(dimension, value));
    }

    /// Replace the colour
    pub fn set_color(&self, color: Rgb) {
        self.write(ConfigurationField::Color, |c| c.color = color);
    }

    /// Register a change handler
    ///
    /// Handlers run in subscription order after every write. A write made
    /// from inside a handler is applied immediately but its notification is
    /// delivered after the current round completes.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&Configuration) + 'static,
    {
        let id = SubscriptionId::new();
        self.handlers.borrow_mut().push((id, Rc::new(handler)));
        tracing::debug!("Store subscription {} added", id);
        id
    }

    /// Remove a change handler
    ///
    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        let removed = handlers.len() != before;
        if removed {
            tracing::debug!("Store subscription {} removed", id);
        }
        removed
    }

    /// Number of registered handlers
    pub fn subscriber_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    fn write(&self, field: ConfigurationField, apply: impl FnOnce(&mut Configuration)) {
        let mut configuration = self.configuration.get();
        apply(&mut configuration);
        self.configuration.set(configuration);

        tracing::debug!("Configuration {} set: {:?}", field, configuration);
        crate::emit!(AppEvent::Configuration(ConfigurationEvent::Changed {
            field,
            configuration,
        }))
        .ok();

        self.notify();
    }

    fn notify(&self) {
        if self.notifying.get() {
            self.deferred.set(true);
            return;
        }

        self.notifying.set(true);
        loop {
            self.deferred.set(false);
            let snapshot = self.configuration.get();
            let handlers: Vec<StoreHandler> = self
                .handlers
                .borrow()
                .iter()
                .map(|(_, handler)| handler.clone())
                .collect();
            for handler in &handlers {
                handler(&snapshot);
            }
            if !self.deferred.get() {
                break;
            }
        }
        self.notifying.set(false);
    }
}

impl Default for ConfigurationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConfigurationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurationStore")
            .field("configuration", &self.configuration.get())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
