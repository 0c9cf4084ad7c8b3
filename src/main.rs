use anyhow::Context;
use configkit::{
    init_logging, run_walkthrough, Config, Dimension, BUILD_DATE, DEFAULT_DESIGN, VERSION,
};

fn main() -> anyhow::Result<()> {
    init_logging()?;
    tracing::info!("ConfigKit {} ({})", VERSION, BUILD_DATE);

    let design_id = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_DESIGN.to_string());

    let config = match Config::default_path() {
        Ok(path) => Config::load_or_default(&path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        Err(err) => {
            tracing::warn!("{}, using default settings", err);
            Config::default()
        }
    };

    let report = run_walkthrough(&config, &design_id)?;
    tracing::info!(
        "{} ({}): {} -> {}, session {}",
        report.design.name,
        report.design.route(),
        report.initial_price,
        report.final_price,
        report.status
    );
    for dimension in Dimension::ALL {
        tracing::info!(
            "{}: {}",
            dimension.label(),
            report.configuration.dimension(dimension)
        );
    }
    for command in &report.commands {
        tracing::info!("viewer command: {:?}", command);
    }

    Ok(())
}
