//! Experiment orchestrator.
//!
//! This module turns a validated [`ExperimentConfig`] into a finished run:
//! it builds the topology, prepares the protocol parameters, drives the
//! matching round scheduler and packages the outcome for reporting.

use color_eyre::eyre::{eyre, Context, Result};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::{Experiment, ExperimentConfig};
use crate::simulation::{
    run_averaging, run_si, run_si_async, run_sir, AveragingOutcome, AveragingParams, DisseminationOutcome,
};
use crate::topology::{build_topology, SchedulingMode, TopologyKind};

/// Largest initial value drawn when an averaging experiment gives none
pub const MAX_DRAWN_VALUE: u32 = 100;

/// What was run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub protocol: String,
    pub topology: TopologyKind,
    pub nodes: usize,
    pub scheduling: SchedulingMode,
    pub seed: u64,
}

/// Per-protocol outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunResult {
    Dissemination(DisseminationOutcome),
    Averaging(AveragingOutcome),
}

/// A finished experiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub metadata: RunMetadata,
    pub result: RunResult,
}

/// Run `config` with a random source seeded from `seed`
pub fn run_experiment(config: &ExperimentConfig, seed: u64) -> Result<RunReport> {
    let mut rng = StdRng::seed_from_u64(seed);
    let result = run_with_rng(config, &mut rng)?;

    Ok(RunReport {
        metadata: RunMetadata {
            protocol: config.experiment.protocol().to_string(),
            topology: config.topology.kind,
            nodes: config.topology.nodes,
            scheduling: config.topology.scheduling,
            seed,
        },
        result,
    })
}

/// Run `config`, drawing every random decision from `rng`
pub fn run_with_rng(config: &ExperimentConfig, rng: &mut dyn RngCore) -> Result<RunResult> {
    config.validate()?;

    let topology_config = &config.topology;
    let mut topology = build_topology(
        topology_config.kind,
        topology_config.nodes,
        topology_config.radius,
        topology_config.scheduling,
        rng,
    )
    .context("Failed to build topology")?;

    let result = match &config.experiment {
        experiment @ Experiment::Si { .. } => {
            let params = experiment
                .si_params()
                .ok_or_else(|| eyre!("SI experiment without SI parameters"))?;
            RunResult::Dissemination(run_si(topology.as_mut(), &params, rng)?)
        }
        experiment @ Experiment::SiAsync { .. } => {
            let params = experiment
                .si_params()
                .ok_or_else(|| eyre!("SI experiment without SI parameters"))?;
            RunResult::Dissemination(run_si_async(topology.as_mut(), &params, rng)?)
        }
        experiment @ Experiment::Sir { .. } => {
            let params = experiment
                .sir_params()
                .ok_or_else(|| eyre!("SIR experiment without SIR parameters"))?;
            RunResult::Dissemination(run_sir(topology.as_mut(), &params, rng)?)
        }
        Experiment::Averaging {
            algorithm,
            rounds,
            loss_probability,
            initial_values,
        } => {
            let values = match initial_values {
                Some(values) => values.clone(),
                None => draw_initial_values(topology.len(), rng),
            };
            let params = AveragingParams {
                mode: *algorithm,
                rounds: *rounds,
                loss_probability: *loss_probability,
            };
            RunResult::Averaging(run_averaging(topology.as_mut(), &params, &values, rng)?)
        }
    };

    Ok(result)
}

/// Draw one integer value in `0..=MAX_DRAWN_VALUE` per node
pub fn draw_initial_values(nodes: usize, rng: &mut dyn RngCore) -> Vec<f64> {
    let values: Vec<f64> = (0..nodes).map(|_| f64::from(rng.gen_range(0..=MAX_DRAWN_VALUE))).collect();
    info!("Drew {} initial values in [0, {}]", nodes, MAX_DRAWN_VALUE);
    values
}
