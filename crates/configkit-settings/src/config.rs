//! Configuration and settings management for ConfigKit
//!
//! Settings are stored as JSON or TOML (chosen by file extension) in the
//! platform configuration directory. Sections:
//! - Viewer connection options
//! - Pricing rules
//! - Dimension bounds
//! - Initial configuration
//! - Design catalog

use crate::error::{SettingsError, SettingsResult};
use configkit_core::{
    Configuration, ConfigurationBounds, ConfigurationStore, Design, DesignCatalog, Dimension,
    InputBoundary, Pricing,
};
use configkit_viewer::ViewerOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "configkit";
const CONFIG_FILE: &str = "config.toml";

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Viewer connection options
    pub viewer: ViewerOptions,
    /// Price rules
    pub pricing: Pricing,
    /// Accepted dimension ranges
    pub bounds: ConfigurationBounds,
    /// Configuration shown before any user edit
    pub defaults: Configuration,
    /// Designs offered to the user
    pub catalog: DesignCatalog,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform location of the settings file
    pub fn default_path() -> SettingsResult<PathBuf> {
        let base = dirs::config_dir()
            .or_else(dirs::home_dir)
            .ok_or(SettingsError::NoSettingsDirectory)?;
        Ok(base.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = match Format::of(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::info!("Loaded settings from {}", path.display());
        Ok(config)
    }

    /// Load from `path` when it exists, otherwise use defaults
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No settings at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML), creating parent directories
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        tracing::info!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        // Viewer
        for (key, value) in [
            ("viewer.script_url", &self.viewer.script_url),
            ("viewer.api_version", &self.viewer.api_version),
            ("viewer.material_name", &self.viewer.material_name),
            ("viewer.ready_event", &self.viewer.ready_event),
        ] {
            if value.trim().is_empty() {
                return Err(SettingsError::invalid(key, "must not be empty"));
            }
        }

        // Pricing
        if !(self.pricing.divisor.is_finite() && self.pricing.divisor > 0.0) {
            return Err(SettingsError::invalid("pricing.divisor", "must be > 0"));
        }
        if self.pricing.decimals > 6 {
            return Err(SettingsError::invalid("pricing.decimals", "must be at most 6"));
        }

        // Bounds and defaults
        for dimension in Dimension::ALL {
            let bounds = self.bounds.get(dimension);
            if !bounds.is_valid() {
                return Err(SettingsError::invalid(
                    format!("bounds.{}", dimension),
                    format!("invalid range {}..{}", bounds.min, bounds.max),
                ));
            }
            let value = self.defaults.dimension(dimension);
            if !bounds.contains(value) {
                return Err(SettingsError::invalid(
                    format!("defaults.{}", dimension),
                    format!("{} outside {}..{}", value, bounds.min, bounds.max),
                ));
            }
        }

        // Catalog
        if let Some(design) = self
            .catalog
            .designs()
            .iter()
            .find(|d| d.id.trim().is_empty() || d.model_id.trim().is_empty())
        {
            return Err(SettingsError::invalid(
                "catalog",
                format!("design '{}' needs an id and a model id", design.name),
            ));
        }
        if let Some(id) = self.catalog.duplicate_id() {
            return Err(SettingsError::invalid(
                "catalog",
                format!("duplicate design id '{}'", id),
            ));
        }

        Ok(())
    }

    /// Edit boundary using the configured bounds
    pub fn input_boundary(&self) -> InputBoundary {
        InputBoundary::new(self.bounds)
    }

    /// Fresh store holding the configured defaults and pricing
    pub fn store(&self) -> ConfigurationStore {
        ConfigurationStore::with_configuration(self.defaults, self.pricing.clone())
    }

    /// Look up a design in the configured catalog
    pub fn design(&self, id: &str) -> SettingsResult<&Design> {
        self.catalog
            .find(id)
            .map_err(|e| SettingsError::invalid("design", e.to_string()))
    }
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            _ => Err(SettingsError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}
