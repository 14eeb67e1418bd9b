//! Core data types for simulation runs: parameters, per-round records,
//! collected outcomes and precondition errors.

use serde::{Deserialize, Serialize};

/// Which directions a rumor-spreading protocol uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum GossipMode {
    /// Infected nodes send the rumor to their contact
    Push,
    /// Every node asks its contact for the rumor
    Pull,
    /// Both directions at once
    #[default]
    PushPull,
}

impl GossipMode {
    pub fn push(&self) -> bool {
        matches!(self, GossipMode::Push | GossipMode::PushPull)
    }

    pub fn pull(&self) -> bool {
        matches!(self, GossipMode::Pull | GossipMode::PushPull)
    }

    /// Mode with the given directions enabled, or `None` if neither is
    pub fn from_flags(push: bool, pull: bool) -> Option<Self> {
        match (push, pull) {
            (true, true) => Some(GossipMode::PushPull),
            (true, false) => Some(GossipMode::Push),
            (false, true) => Some(GossipMode::Pull),
            (false, false) => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GossipMode::Push => "push",
            GossipMode::Pull => "pull",
            GossipMode::PushPull => "push_pull",
        }
    }
}

/// Averaging protocol variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AveragingMode {
    PushSum,
    PushFlow,
}

impl AveragingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AveragingMode::PushSum => "push_sum",
            AveragingMode::PushFlow => "push_flow",
        }
    }
}

/// Parameters of an SI run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiParams {
    pub push: bool,
    pub pull: bool,
    pub start_node: usize,
    pub loss_probability: f64,
}

impl Default for SiParams {
    fn default() -> Self {
        Self {
            push: true,
            pull: true,
            start_node: 0,
            loss_probability: 0.0,
        }
    }
}

/// Parameters of an SIR run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SirParams {
    pub push: bool,
    pub pull: bool,
    pub start_node: usize,
    /// Expected number of redundant contacts tolerated before recovery
    pub k: f64,
    pub loss_probability: f64,
}

impl Default for SirParams {
    fn default() -> Self {
        Self {
            push: true,
            pull: true,
            start_node: 0,
            k: 1.0,
            loss_probability: 0.0,
        }
    }
}

/// Parameters of an averaging run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AveragingParams {
    pub mode: AveragingMode,
    pub rounds: usize,
    pub loss_probability: f64,
}

/// State counts and message total at the end of one round.
///
/// Round 0 is the initial state, before any message has been sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: usize,
    pub susceptible: usize,
    pub infected: usize,
    pub removed: usize,
    /// Messages sent since the start of the run, replies included
    pub messages_sent: u64,
}

/// Collected round records of a finished SI or SIR run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisseminationOutcome {
    pub records: Vec<RoundRecord>,
}

impl DisseminationOutcome {
    /// Infected count per round
    pub fn infected(&self) -> Vec<usize> {
        self.records.iter().map(|r| r.infected).collect()
    }

    /// Removed count per round
    pub fn removed(&self) -> Vec<usize> {
        self.records.iter().map(|r| r.removed).collect()
    }

    /// Cumulative messages sent per round
    pub fn messages(&self) -> Vec<u64> {
        self.records.iter().map(|r| r.messages_sent).collect()
    }

    /// Number of rounds executed after the initial state
    pub fn rounds(&self) -> usize {
        self.records.len().saturating_sub(1)
    }

    pub fn last(&self) -> Option<&RoundRecord> {
        self.records.last()
    }

    /// Messages sent over the whole run
    pub fn total_messages(&self) -> u64 {
        self.records.last().map_or(0, |r| r.messages_sent)
    }

    /// Nodes that heard the rumor by the end of the run (infected or removed)
    pub fn reached(&self) -> usize {
        self.records.last().map_or(0, |r| r.infected + r.removed)
    }
}

impl FromIterator<RoundRecord> for DisseminationOutcome {
    fn from_iter<I: IntoIterator<Item = RoundRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// Error and conservation metrics at the end of one averaging round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AveragingRound {
    pub round: usize,
    /// Root mean square error of the node estimates against the true mean
    pub rmse: f64,
    /// Flow-adjusted total value over total weight across all nodes
    pub conserved_mean: f64,
    /// Messages sent since the start of the run
    pub messages_sent: u64,
}

/// Collected result of an averaging run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AveragingOutcome {
    /// Mean of the initial values
    pub mean: f64,
    pub history: Vec<AveragingRound>,
    /// Per-node estimates after the last round
    pub estimates: Vec<f64>,
}

impl AveragingOutcome {
    /// RMSE after each executed round; the initial record is not included
    pub fn rmse(&self) -> Vec<f64> {
        self.history.iter().filter(|r| r.round > 0).map(|r| r.rmse).collect()
    }

    /// RMSE of the initial values
    pub fn initial_rmse(&self) -> Option<f64> {
        self.history.first().map(|r| r.rmse)
    }

    pub fn final_rmse(&self) -> Option<f64> {
        self.history.last().map(|r| r.rmse)
    }
}

/// Precondition violations detected when a run is set up
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("Loss probability {0} is outside [0, 1]")]
    InvalidLossProbability(f64),

    #[error("Recovery tolerance k must be a positive number, got {0}")]
    InvalidRecoveryTolerance(f64),

    #[error("Start node {start_node} is out of range for a topology with {nodes} nodes")]
    StartNodeOutOfRange { start_node: usize, nodes: usize },

    #[error("Got {values} initial values for a topology with {nodes} nodes")]
    ValueCountMismatch { values: usize, nodes: usize },

    #[error("At least one of push or pull must be enabled")]
    NoDirection,

    #[error("Topology has no nodes")]
    EmptyTopology,
}
