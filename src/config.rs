use serde::{Deserialize, Serialize};

use crate::simulation::{AveragingMode, GossipMode, SiParams, SirParams};
use crate::topology::{SchedulingMode, TopologyKind};

/// Log levels accepted by `general.log_level`
const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Top-level experiment file: one topology and one protocol run on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    pub topology: TopologyConfig,
    pub experiment: Experiment,
}

/// Settings shared by every experiment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Seed for the run's random source; drawn at startup when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

/// Topology section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyConfig {
    pub kind: TopologyKind,
    pub nodes: usize,
    /// Connection radius, geometric graphs only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default)]
    pub scheduling: SchedulingMode,
}

/// Protocol to run, tagged by `protocol`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "protocol", rename_all = "snake_case")]
pub enum Experiment {
    Si {
        #[serde(default)]
        mode: GossipMode,
        #[serde(default)]
        start_node: usize,
        #[serde(default)]
        loss_probability: f64,
    },
    SiAsync {
        #[serde(default)]
        mode: GossipMode,
        #[serde(default)]
        start_node: usize,
        #[serde(default)]
        loss_probability: f64,
    },
    Sir {
        #[serde(default)]
        mode: GossipMode,
        #[serde(default)]
        start_node: usize,
        #[serde(default = "default_k")]
        k: f64,
        #[serde(default)]
        loss_probability: f64,
    },
    Averaging {
        algorithm: AveragingMode,
        rounds: usize,
        #[serde(default)]
        loss_probability: f64,
        /// One value per node; drawn from the run's random source when absent
        #[serde(skip_serializing_if = "Option::is_none")]
        initial_values: Option<Vec<f64>>,
    },
}

fn default_k() -> f64 {
    1.0
}

impl Experiment {
    /// Protocol name as written in the `protocol` tag
    pub fn protocol(&self) -> &'static str {
        match self {
            Experiment::Si { .. } => "si",
            Experiment::SiAsync { .. } => "si_async",
            Experiment::Sir { .. } => "sir",
            Experiment::Averaging { .. } => "averaging",
        }
    }

    /// SI parameters for `si` and `si_async` experiments
    pub fn si_params(&self) -> Option<SiParams> {
        match *self {
            Experiment::Si {
                mode,
                start_node,
                loss_probability,
            }
            | Experiment::SiAsync {
                mode,
                start_node,
                loss_probability,
            } => Some(SiParams {
                push: mode.push(),
                pull: mode.pull(),
                start_node,
                loss_probability,
            }),
            _ => None,
        }
    }

    /// SIR parameters for `sir` experiments
    pub fn sir_params(&self) -> Option<SirParams> {
        match *self {
            Experiment::Sir {
                mode,
                start_node,
                k,
                loss_probability,
            } => Some(SirParams {
                push: mode.push(),
                pull: mode.pull(),
                start_node,
                k,
                loss_probability,
            }),
            _ => None,
        }
    }

    fn loss_probability(&self) -> f64 {
        match *self {
            Experiment::Si { loss_probability, .. }
            | Experiment::SiAsync { loss_probability, .. }
            | Experiment::Sir { loss_probability, .. }
            | Experiment::Averaging { loss_probability, .. } => loss_probability,
        }
    }

    fn start_node(&self) -> Option<usize> {
        match *self {
            Experiment::Si { start_node, .. }
            | Experiment::SiAsync { start_node, .. }
            | Experiment::Sir { start_node, .. } => Some(start_node),
            Experiment::Averaging { .. } => None,
        }
    }
}

impl ExperimentConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(level) = &self.general.log_level {
            if !LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
                return Err(ValidationError::InvalidGeneral(format!(
                    "log_level must be one of {:?}, got '{}'",
                    LOG_LEVELS, level
                )));
            }
        }

        self.validate_topology()?;
        self.validate_experiment()?;

        Ok(())
    }

    fn validate_topology(&self) -> Result<(), ValidationError> {
        let topology = &self.topology;
        if topology.nodes == 0 {
            return Err(ValidationError::InvalidTopology(
                "nodes must be at least 1".to_string(),
            ));
        }

        if let Some(radius) = topology.radius {
            if topology.kind != TopologyKind::Geometric {
                return Err(ValidationError::InvalidTopology(format!(
                    "radius is only valid for geometric topologies, not {}",
                    topology.kind.as_str()
                )));
            }
            if !(radius.is_finite() && radius > 0.0) {
                return Err(ValidationError::InvalidTopology(format!(
                    "radius must be a positive number, got {}",
                    radius
                )));
            }
        }

        Ok(())
    }

    fn validate_experiment(&self) -> Result<(), ValidationError> {
        let experiment = &self.experiment;
        let nodes = self.topology.nodes;

        let loss = experiment.loss_probability();
        if !(0.0..=1.0).contains(&loss) {
            return Err(ValidationError::InvalidExperiment(format!(
                "loss_probability must be within [0, 1], got {}",
                loss
            )));
        }

        // Dissemination only stops once the rumor spreads, so it needs some delivery
        if experiment.start_node().is_some() && loss >= 1.0 {
            return Err(ValidationError::InvalidExperiment(format!(
                "loss_probability must be below 1 for {}, got {}",
                experiment.protocol(),
                loss
            )));
        }

        if let Some(start_node) = experiment.start_node() {
            if start_node >= nodes {
                return Err(ValidationError::InvalidExperiment(format!(
                    "start_node {} is out of range for {} nodes",
                    start_node, nodes
                )));
            }
        }

        match experiment {
            Experiment::Sir { k, .. } if !(k.is_finite() && *k > 0.0) => {
                Err(ValidationError::InvalidExperiment(format!(
                    "k must be a positive number, got {}",
                    k
                )))
            }
            Experiment::Averaging { rounds: 0, .. } => Err(ValidationError::InvalidExperiment(
                "rounds must be at least 1".to_string(),
            )),
            Experiment::Averaging {
                initial_values: Some(values),
                ..
            } if values.len() != nodes => Err(ValidationError::InvalidExperiment(format!(
                "initial_values has {} entries but the topology has {} nodes",
                values.len(),
                nodes
            ))),
            _ => Ok(()),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid topology configuration: {0}")]
    InvalidTopology(String),
    #[error("Invalid experiment configuration: {0}")]
    InvalidExperiment(String),
}
