//! ConfigKit Settings Crate
//!
//! Persisted application settings: viewer options, pricing rules, dimension
//! bounds, the initial configuration and the design catalog.

pub mod config;
pub mod error;

pub use config::Config;
pub use error::{SettingsError, SettingsResult};
