//! # ConfigKit Core
//!
//! Core types and state for the ConfigKit product configurator.
//! Provides the configuration model (dimensions and colour), price
//! derivation, the configuration state store, the design catalog,
//! the application event bus and the shared error types.

pub mod catalog;
pub mod color;
pub mod configuration;
pub mod error;
pub mod event_bus;
pub mod input;
pub mod session;
pub mod store;
pub mod units;

pub use catalog::{Design, DesignCatalog};
pub use color::Rgb;
pub use configuration::{Configuration, ConfigurationField, Price, Pricing};
pub use error::{ConfigurationError, SessionError};
pub use input::InputBoundary;
pub use session::SessionStatus;
pub use store::ConfigurationStore;
pub use units::{mm_to_m, ConfigurationBounds, Dimension, DimensionBounds};

// Re-export event bus for convenience
pub use event_bus::{
    event_bus, AppEvent, ConfigurationEvent, ErrorEvent, EventBus, EventBusConfig, EventCategory,
    EventFilter, SessionEvent, SubscriptionId,
};
