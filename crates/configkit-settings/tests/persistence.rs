//! Settings files on disk

use configkit_core::{Design, DesignCatalog, DimensionBounds, Rgb};
use configkit_settings::{Config, SettingsError};
use configkit_viewer::Quality;
use std::fs;
use tempfile::TempDir;

fn customised() -> Config {
    let mut config = Config::default();
    config.viewer.quality = Quality::Medium;
    config.viewer.material_name = "desk_top".to_string();
    config.pricing.currency_symbol = "€".to_string();
    config.bounds.width = DimensionBounds::new(150.0, 800.0);
    config.defaults.width = 180.0;
    config.defaults.color = Rgb::new(0x33, 0x66, 0x99);
    config.catalog = DesignCatalog::new(vec![Design::new(
        "desk",
        "Desk",
        "A writing desk.",
        "0123456789abcdef",
    )]);
    config
}

#[test]
fn test_toml_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let config = customised();
    config.save_to_file(&path).unwrap();
    let loaded = Config::load_from_file(&path).unwrap();

    assert_eq!(loaded, config);
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("#336699"));
    assert!(text.contains("quality = \"medium\""));
}

#[test]
fn test_json_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    let config = customised();
    config.save_to_file(&path).unwrap();
    assert_eq!(Config::load_from_file(&path).unwrap(), config);
}

#[test]
fn test_save_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("configkit").join("config.toml");

    Config::default().save_to_file(&path).unwrap();
    assert!(path.exists());
}

#[test]
fn test_partial_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "[viewer]\nmaterial_name = \"chair_seat\"\n",
    )
    .unwrap();

    let config = Config::load_from_file(&path).unwrap();
    assert_eq!(config.viewer.material_name, "chair_seat");
    assert_eq!(config.viewer.ready_event, "viewerready");
    assert_eq!(config.catalog, DesignCatalog::builtin());
    assert_eq!(config.store().get_price().to_string(), "£400.00");
}

#[test]
fn test_invalid_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r##"{"defaults": {"width": 900.0, "height": 100.0, "depth": 200.0, "color": "#000000"}}"##)
        .unwrap();

    let err = Config::load_from_file(&path).unwrap_err();
    assert!(matches!(err, SettingsError::InvalidSetting { .. }));
}

#[test]
fn test_malformed_colour_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r##"{"defaults": {"width": 200.0, "height": 100.0, "depth": 200.0, "color": "blue"}}"##)
        .unwrap();

    assert!(matches!(
        Config::load_from_file(&path),
        Err(SettingsError::Json(_))
    ));
}

#[test]
fn test_load_or_default_without_file() {
    let dir = TempDir::new().unwrap();
    let config = Config::load_or_default(&dir.path().join("missing.toml")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_boundary_from_settings_clamps() {
    let config = customised();
    let store = config.store();
    let boundary = config.input_boundary();

    let written = boundary
        .submit_dimension(&store, configkit_core::Dimension::Width, "120")
        .unwrap();
    assert_eq!(written, 150.0);
    assert_eq!(store.configuration().width, 150.0);
    assert_eq!(config.design("desk").unwrap().model_id, "0123456789abcdef");
    assert!(config.design("small-cube").is_err());
}
