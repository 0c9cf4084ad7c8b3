//! Configuration value object and price derivation
//!
//! A [`Configuration`] holds the user-adjustable attributes of one product
//! instance. The price is derived from it on every read and never stored.

use crate::color::Rgb;
use crate::units::{mm_to_m, Dimension};
use serde::{Deserialize, Serialize};
use std::fmt;

/// User-adjustable attribute set: three dimensions in millimeters and a colour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Width in mm
    pub width: f64,
    /// Height in mm
    pub height: f64,
    /// Depth in mm
    pub depth: f64,
    /// Surface colour
    pub color: Rgb,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            width: 200.0,
            height: 100.0,
            depth: 200.0,
            color: Rgb::BLACK,
        }
    }
}

impl Configuration {
    /// Value of one dimension
    pub fn dimension(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Width => self.width,
            Dimension::Height => self.height,
            Dimension::Depth => self.depth,
        }
    }

    /// Replace one dimension, leaving everything else untouched
    pub fn set_dimension(&mut self, dimension: Dimension, value: f64) {
        match dimension {
            Dimension::Width => self.width = value,
            Dimension::Height => self.height = value,
            Dimension::Depth => self.depth = value,
        }
    }

    /// Volume in cubic millimeters
    pub fn volume_mm3(&self) -> f64 {
        self.width * self.height * self.depth
    }

    /// Viewer scale factors (meters) as `(x, y, z)`
    pub fn scale(&self) -> (f64, f64, f64) {
        (mm_to_m(self.width), mm_to_m(self.height), mm_to_m(self.depth))
    }

    /// Derive the price using the given pricing rules
    pub fn price(&self, pricing: &Pricing) -> Price {
        pricing.price_for(self)
    }
}

/// Field of a configuration touched by a store write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfigurationField {
    /// Width changed
    Width,
    /// Height changed
    Height,
    /// Depth changed
    Depth,
    /// Colour changed
    Color,
}

impl From<Dimension> for ConfigurationField {
    fn from(value: Dimension) -> Self {
        match value {
            Dimension::Width => Self::Width,
            Dimension::Height => Self::Height,
            Dimension::Depth => Self::Depth,
        }
    }
}

impl fmt::Display for ConfigurationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Width => write!(f, "width"),
            Self::Height => write!(f, "height"),
            Self::Depth => write!(f, "depth"),
            Self::Color => write!(f, "color"),
        }
    }
}

/// Price rules: `round(volume / divisor, decimals)` shown with a currency symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    /// Symbol prefixed to the amount
    pub currency_symbol: String,
    /// Cubic millimeters per currency unit
    pub divisor: f64,
    /// Decimal places kept after rounding
    pub decimals: u32,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            currency_symbol: "£".to_string(),
            divisor: 10_000.0,
            decimals: 2,
        }
    }
}

impl Pricing {
    /// Compute the price of a configuration
    pub fn price_for(&self, configuration: &Configuration) -> Price {
        let factor = 10f64.powi(self.decimals as i32);
        let raw = configuration.volume_mm3() / self.divisor;
        Price {
            amount: (raw * factor).round() / factor,
            currency_symbol: self.currency_symbol.clone(),
            decimals: self.decimals,
        }
    }
}

/// Derived price of a configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    /// Rounded amount
    pub amount: f64,
    /// Currency symbol used for display
    pub currency_symbol: String,
    /// Decimal places shown
    pub decimals: u32,
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:.*}",
            self.currency_symbol, self.decimals as usize, self.amount
        )
    }
}
