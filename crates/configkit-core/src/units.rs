//! Dimension bounds and unit conversion
//!
//! Dimensions are entered in millimeters; the viewer works in meters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Millimeters per meter
pub const MM_PER_M: f64 = 1000.0;

/// One of the three configurable dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// Width (viewer X axis)
    Width,
    /// Height (viewer Y axis)
    Height,
    /// Depth (viewer Z axis)
    Depth,
}

impl Dimension {
    /// All dimensions in viewer axis order
    pub const ALL: [Dimension; 3] = [Dimension::Width, Dimension::Height, Dimension::Depth];

    /// Input label shown next to the field
    pub fn label(&self) -> &'static str {
        match self {
            Self::Width => "Width (mm)",
            Self::Height => "Height (mm)",
            Self::Depth => "Depth (mm)",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Width => write!(f, "width"),
            Self::Height => write!(f, "height"),
            Self::Depth => write!(f, "depth"),
        }
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "width" | "w" => Ok(Self::Width),
            "height" | "h" => Ok(Self::Height),
            "depth" | "d" => Ok(Self::Depth),
            _ => Err(format!("Unknown dimension: {}", s)),
        }
    }
}

/// Inclusive `[min, max]` range for one dimension, in millimeters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionBounds {
    /// Smallest accepted value
    pub min: f64,
    /// Largest accepted value
    pub max: f64,
}

impl DimensionBounds {
    /// Create a new range
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamp a value into the range
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    /// Check whether a value lies inside the range
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Check that the range is positive and not inverted
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min > 0.0 && self.min <= self.max
    }
}

/// Bounds for all three dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationBounds {
    /// Width range
    pub width: DimensionBounds,
    /// Height range
    pub height: DimensionBounds,
    /// Depth range
    pub depth: DimensionBounds,
}

impl ConfigurationBounds {
    /// Bounds for the given dimension
    pub fn get(&self, dimension: Dimension) -> DimensionBounds {
        match dimension {
            Dimension::Width => self.width,
            Dimension::Height => self.height,
            Dimension::Depth => self.depth,
        }
    }

    /// Clamp a value for the given dimension
    pub fn clamp(&self, dimension: Dimension, value: f64) -> f64 {
        self.get(dimension).clamp(value)
    }
}

impl Default for ConfigurationBounds {
    fn default() -> Self {
        Self {
            width: DimensionBounds::new(200.0, 500.0),
            height: DimensionBounds::new(100.0, 200.0),
            depth: DimensionBounds::new(200.0, 500.0),
        }
    }
}

/// Convert millimeters to meters
pub fn mm_to_m(value_mm: f64) -> f64 {
    value_mm / MM_PER_M
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mm_to_m() {
        assert_eq!(mm_to_m(250.0), 0.25);
        assert_eq!(mm_to_m(300.0), 0.3);
        assert_eq!(mm_to_m(100.0), 0.1);
    }

    #[test]
    fn test_default_bounds() {
        let bounds = ConfigurationBounds::default();
        assert_eq!(bounds.get(Dimension::Width), DimensionBounds::new(200.0, 500.0));
        assert_eq!(bounds.get(Dimension::Height), DimensionBounds::new(100.0, 200.0));
        assert_eq!(bounds.get(Dimension::Depth), DimensionBounds::new(200.0, 500.0));
    }

    #[test]
    fn test_clamp() {
        let bounds = ConfigurationBounds::default();
        assert_eq!(bounds.clamp(Dimension::Width, 150.0), 200.0);
        assert_eq!(bounds.clamp(Dimension::Width, 650.0), 500.0);
        assert_eq!(bounds.clamp(Dimension::Height, 150.0), 150.0);
        assert_eq!(bounds.clamp(Dimension::Height, -5.0), 100.0);
        assert_eq!(bounds.clamp(Dimension::Depth, 1e9), 500.0);
    }

    #[test]
    fn test_bounds_validity() {
        assert!(DimensionBounds::new(100.0, 200.0).is_valid());
        assert!(DimensionBounds::new(100.0, 100.0).is_valid());
        assert!(!DimensionBounds::new(300.0, 200.0).is_valid());
        assert!(!DimensionBounds::new(0.0, 200.0).is_valid());
        assert!(!DimensionBounds::new(1.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_dimension_parse() {
        assert_eq!("Width".parse::<Dimension>().unwrap(), Dimension::Width);
        assert_eq!(" h ".parse::<Dimension>().unwrap(), Dimension::Height);
        assert!("length".parse::<Dimension>().is_err());
    }

    #[test]
    fn test_dimension_label() {
        let labels: Vec<_> = Dimension::ALL.iter().map(Dimension::label).collect();
        assert_eq!(labels, ["Width (mm)", "Height (mm)", "Depth (mm)"]);
    }
}
