//! # ConfigKit
//!
//! An interactive product configurator: the user adjusts the dimensions and
//! colour of a design, sees its price update immediately and watches a
//! remote 3D viewer follow every change.
//!
//! ## Architecture
//!
//! ConfigKit is organized as a workspace with multiple crates:
//!
//! 1. **configkit-core** - Configuration, pricing, state store, catalog, events
//! 2. **configkit-viewer** - Viewer client traits, script registry, render sessions
//! 3. **configkit-settings** - Persisted settings in JSON or TOML
//! 4. **configkit** - Logging setup and the headless walkthrough binary

pub use configkit_core::{
    event_bus, AppEvent, Configuration, ConfigurationBounds, ConfigurationError,
    ConfigurationEvent, ConfigurationStore, Design, DesignCatalog, Dimension, DimensionBounds,
    ErrorEvent, InputBoundary, Price, Pricing, Rgb, SessionError, SessionEvent, SessionStatus,
};

pub use configkit_viewer::{
    Delivery, Material, Quality, RenderSessionController, ScriptRegistry, SimulatedRuntime,
    ViewerApi, ViewerCall, ViewerClient, ViewerOptions, ViewerRuntime,
};

pub use configkit_settings::{Config, SettingsError};

use anyhow::{bail, Context};
use std::rc::Rc;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Design shown when none is named
pub const DEFAULT_DESIGN: &str = "small-table";

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("logging already initialised")?;

    Ok(())
}

/// Outcome of a headless walkthrough
#[derive(Debug, Clone, PartialEq)]
pub struct WalkthroughReport {
    /// Design that was configured
    pub design: Design,
    /// Price of the starting configuration
    pub initial_price: Price,
    /// Price after the edits
    pub final_price: Price,
    /// Configuration after the edits
    pub configuration: Configuration,
    /// Session status at the end
    pub status: SessionStatus,
    /// Scale last sent to the viewer
    pub scale: Option<(f64, f64, f64)>,
    /// Scale and material commands the viewer received
    pub commands: Vec<ViewerCall>,
}

/// Mount a design on the simulated viewer, wait for Ready and apply a
/// width and colour edit through the input boundary
pub fn run_walkthrough(config: &Config, design_id: &str) -> anyhow::Result<WalkthroughReport> {
    let design = config.design(design_id)?.clone();
    let store = Rc::new(config.store());
    let boundary = config.input_boundary();

    let runtime = SimulatedRuntime::new().with_materials(vec![Material::new(
        config.viewer.material_name.as_str(),
        [0.0, 0.0, 0.0],
    )]);
    let mut controller = RenderSessionController::new(
        Rc::new(runtime.clone()),
        store.clone(),
        config.viewer.clone(),
    );

    let initial_price = store.get_price();
    tracing::info!("{}: starting at {}", design.name, initial_price);

    controller.mount(&design.model_id);
    controller.pump();
    if controller.status() != SessionStatus::Ready {
        match controller.last_error() {
            Some(err) => bail!("viewer failed for {}: {}", design.id, err),
            None => bail!("viewer for {} not ready ({})", design.id, controller.status()),
        }
    }

    boundary.submit_dimension(&store, Dimension::Width, "300")?;
    boundary.submit_color(&store, "#8b4513")?;
    controller.pump();

    let final_price = store.get_price();
    tracing::info!("{}: now {}", design.name, final_price);

    let report = WalkthroughReport {
        design,
        initial_price,
        final_price,
        configuration: store.configuration(),
        status: controller.status(),
        scale: runtime.last_scale(),
        commands: runtime.commands(),
    };
    controller.unmount();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walkthrough_small_table() {
        let report = run_walkthrough(&Config::default(), "small-table").unwrap();

        assert_eq!(report.design.model_id, "5f94fb035fa74f43abda3ada8f0a719e");
        assert_eq!(report.initial_price.to_string(), "£400.00");
        assert_eq!(report.final_price.to_string(), "£600.00");
        assert_eq!(report.configuration.width, 300.0);
        assert_eq!(report.configuration.color, Rgb::new(0x8b, 0x45, 0x13));
        assert_eq!(report.status, SessionStatus::Ready);
        assert_eq!(report.scale, Some((0.3, 0.1, 0.2)));
        assert!(matches!(report.commands.last(), Some(ViewerCall::SetMaterial(_))));
    }

    #[test]
    fn test_walkthrough_unknown_design() {
        let err = run_walkthrough(&Config::default(), "large-sofa").unwrap_err();
        assert!(err.to_string().contains("large-sofa"));
        assert!(matches!(
            err.downcast_ref::<SettingsError>(),
            Some(SettingsError::InvalidSetting { .. })
        ));
    }

    #[test]
    fn test_walkthrough_custom_material() {
        let mut config = Config::default();
        config.viewer.material_name = "cube_face".to_string();

        let report = run_walkthrough(&config, "small-cube").unwrap();
        let colours: Vec<[f32; 3]> = report
            .commands
            .iter()
            .filter_map(|c| match c {
                ViewerCall::SetMaterial(m) => Some(m.diffuse_color),
                _ => None,
            })
            .collect();
        assert_eq!(colours.len(), 2);
        assert_eq!(colours[1][0], 139.0 / 255.0);
    }
}
