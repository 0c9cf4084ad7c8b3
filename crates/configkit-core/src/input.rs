//! Edit boundary between user input controls and the store
//!
//! Numeric fields are parsed, rejected when non-numeric, and clamped into
//! their declared range before they reach the [`ConfigurationStore`], so the
//! store never sees a value that would produce a nonsensical price.

use crate::color::Rgb;
use crate::configuration::Configuration;
use crate::error::ConfigurationError;
use crate::event_bus::{AppEvent, ErrorEvent};
use crate::store::ConfigurationStore;
use crate::units::{ConfigurationBounds, Dimension};

/// Validating front for store writes coming from input controls
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputBoundary {
    bounds: ConfigurationBounds,
}

impl InputBoundary {
    /// Create a boundary enforcing the given bounds
    pub fn new(bounds: ConfigurationBounds) -> Self {
        Self { bounds }
    }

    /// Bounds enforced by this boundary
    pub fn bounds(&self) -> &ConfigurationBounds {
        &self.bounds
    }

    /// Parse raw field text and clamp it into the dimension's range
    pub fn parse_dimension(
        &self,
        dimension: Dimension,
        raw: &str,
    ) -> Result<f64, ConfigurationError> {
        let trimmed = raw.trim();
        let value: f64 = trimmed
            .parse()
            .map_err(|_| ConfigurationError::InvalidNumber {
                field: dimension.to_string(),
                input: raw.to_string(),
            })?;
        self.clamp_value(dimension, value)
    }

    /// Clamp an already numeric value, rejecting NaN and infinities
    pub fn clamp_value(&self, dimension: Dimension, value: f64) -> Result<f64, ConfigurationError> {
        if !value.is_finite() {
            return Err(ConfigurationError::NonFinite {
                field: dimension.to_string(),
            });
        }
        let clamped = self.bounds.clamp(dimension, value);
        if clamped != value {
            tracing::debug!("Clamped {} from {} to {}", dimension, value, clamped);
        }
        Ok(clamped)
    }

    /// Parse, clamp and write a dimension; the store is untouched on error
    ///
    /// Returns the value actually written.
    pub fn submit_dimension(
        &self,
        store: &ConfigurationStore,
        dimension: Dimension,
        raw: &str,
    ) -> Result<f64, ConfigurationError> {
        let value = self
            .parse_dimension(dimension, raw)
            .inspect_err(|e| reject(&dimension.to_string(), e))?;
        store.set_dimension(dimension, value);
        Ok(value)
    }

    /// Clamp and write a numeric dimension value
    pub fn submit_value(
        &self,
        store: &ConfigurationStore,
        dimension: Dimension,
        value: f64,
    ) -> Result<f64, ConfigurationError> {
        let value = self
            .clamp_value(dimension, value)
            .inspect_err(|e| reject(&dimension.to_string(), e))?;
        store.set_dimension(dimension, value);
        Ok(value)
    }

    /// Parse and write a colour picker value
    pub fn submit_color(
        &self,
        store: &ConfigurationStore,
        raw: &str,
    ) -> Result<Rgb, ConfigurationError> {
        let color = raw.parse::<Rgb>().inspect_err(|e| reject("color", e))?;
        store.set_color(color);
        Ok(color)
    }

    /// Clamp every dimension of a configuration
    pub fn clamp_configuration(&self, configuration: Configuration) -> Configuration {
        let mut clamped = configuration;
        for dimension in Dimension::ALL {
            let value = configuration.dimension(dimension);
            if value.is_finite() {
                clamped.set_dimension(dimension, self.bounds.clamp(dimension, value));
            } else {
                clamped.set_dimension(dimension, self.bounds.get(dimension).min);
            }
        }
        clamped
    }
}

fn reject(field: &str, error: &ConfigurationError) {
    tracing::warn!("Rejected {} input: {}", field, error);
    crate::emit!(AppEvent::Error(ErrorEvent::InputRejected {
        field: field.to_string(),
        message: error.to_string(),
    }))
    .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_clamp() {
        let boundary = InputBoundary::default();
        assert_eq!(boundary.parse_dimension(Dimension::Width, "300"), Ok(300.0));
        assert_eq!(boundary.parse_dimension(Dimension::Width, " 612.5 "), Ok(500.0));
        assert_eq!(boundary.parse_dimension(Dimension::Height, "50"), Ok(100.0));
        assert_eq!(boundary.parse_dimension(Dimension::Depth, "-1"), Ok(200.0));
    }

    #[test]
    fn test_rejects_non_numeric() {
        let boundary = InputBoundary::default();
        assert!(matches!(
            boundary.parse_dimension(Dimension::Width, ""),
            Err(ConfigurationError::InvalidNumber { .. })
        ));
        assert!(matches!(
            boundary.parse_dimension(Dimension::Width, "abc"),
            Err(ConfigurationError::InvalidNumber { .. })
        ));
        assert!(matches!(
            boundary.parse_dimension(Dimension::Height, "NaN"),
            Err(ConfigurationError::NonFinite { .. })
        ));
        assert!(matches!(
            boundary.parse_dimension(Dimension::Depth, "inf"),
            Err(ConfigurationError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_failed_submit_leaves_store_untouched() {
        let boundary = InputBoundary::default();
        let store = ConfigurationStore::new();

        assert!(boundary
            .submit_dimension(&store, Dimension::Width, "wide")
            .is_err());
        assert!(boundary.submit_color(&store, "blue").is_err());
        assert_eq!(store.configuration(), Configuration::default());
    }

    #[test]
    fn test_rejection_is_published() {
        use crate::event_bus::{event_bus, EventCategory, EventFilter};
        use parking_lot::Mutex;
        use std::sync::Arc;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let id = event_bus().subscribe(
            EventFilter::Categories(vec![EventCategory::Error]),
            move |event: &AppEvent| {
                if let AppEvent::Error(ErrorEvent::InputRejected { field, message }) = event {
                    sink.lock().push((field.clone(), message.clone()));
                }
            },
        );

        let store = ConfigurationStore::new();
        InputBoundary::default()
            .submit_dimension(&store, Dimension::Depth, "12cm-unique")
            .ok();
        event_bus().unsubscribe(id);

        assert!(seen
            .lock()
            .iter()
            .any(|(field, message)| field == "depth" && message.contains("12cm-unique")));
    }

    #[test]
    fn test_submit_writes_clamped_value() {
        let boundary = InputBoundary::default();
        let store = ConfigurationStore::new();

        assert_eq!(
            boundary.submit_dimension(&store, Dimension::Width, "9000"),
            Ok(500.0)
        );
        assert_eq!(boundary.submit_value(&store, Dimension::Height, 10.0), Ok(100.0));
        assert_eq!(
            boundary.submit_color(&store, "#FF0000"),
            Ok(Rgb::new(255, 0, 0))
        );

        let c = store.configuration();
        assert_eq!((c.width, c.height, c.depth), (500.0, 100.0, 200.0));
        assert_eq!(c.color, Rgb::new(255, 0, 0));
    }

    #[test]
    fn test_clamp_configuration() {
        let boundary = InputBoundary::default();
        let clamped = boundary.clamp_configuration(Configuration {
            width: 10.0,
            height: f64::NAN,
            depth: 700.0,
            color: Rgb::BLACK,
        });
        assert_eq!((clamped.width, clamped.height, clamped.depth), (200.0, 100.0, 500.0));
    }
}
