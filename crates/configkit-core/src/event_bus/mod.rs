//! # Event Bus Module
//!
//! Application-wide publish/subscribe for decoupled components.
//!
//! ## Overview
//!
//! - The configuration store publishes every field change
//! - The render session controller publishes lifecycle transitions and failures
//! - Subscribers filter by [`EventCategory`] and receive events synchronously,
//!   or poll a broadcast receiver from async code
//!
//! ## Usage
//!
//! ```rust,ignore
//! use configkit_core::event_bus::{event_bus, AppEvent, EventCategory, EventFilter};
//!
//! let subscription = event_bus().subscribe(
//!     EventFilter::Categories(vec![EventCategory::Error]),
//!     |event: &AppEvent| {
//!         if let AppEvent::Error(error) = event {
//!             eprintln!("{}", error);
//!         }
//!     },
//! );
//!
//! event_bus().unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
