use crate::config::ExperimentConfig;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::{info, warn};
use std::fs::File;
use std::path::Path;

use crate::topology::{GeometricGraph, TopologyKind};

/// Load and parse an experiment from a YAML file
pub fn load_config(config_path: &Path) -> Result<ExperimentConfig> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration file {:?}", config_path))?;

    let config: ExperimentConfig = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration file {:?}", config_path))?;

    finish(config)
}

/// Parse an experiment from YAML text
pub fn parse_config(yaml: &str) -> Result<ExperimentConfig> {
    let config: ExperimentConfig = serde_yaml::from_str(yaml).wrap_err("Failed to parse configuration")?;
    finish(config)
}

fn finish(config: ExperimentConfig) -> Result<ExperimentConfig> {
    info!(
        "Detected {} experiment on a {} topology with {} nodes",
        config.experiment.protocol(),
        config.topology.kind.as_str(),
        config.topology.nodes
    );

    config.validate()?;
    check_radius(&config);

    Ok(config)
}

/// Warn when a geometric radius is likely to need many regeneration attempts
fn check_radius(config: &ExperimentConfig) {
    if config.topology.kind != TopologyKind::Geometric {
        return;
    }
    let Some(radius) = config.topology.radius else {
        return;
    };

    let threshold = GeometricGraph::connectivity_radius(config.topology.nodes);
    if radius < threshold {
        warn!(
            "Radius {} is below the connectivity threshold {:.3} for {} nodes; \
             generating a connected graph may take many attempts",
            radius, threshold, config.topology.nodes
        );
    }
}
