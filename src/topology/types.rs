//! Topology type definitions.
//!
//! This file contains the capability surface every topology exposes to the
//! round scheduler, the supported topology kinds and scheduling modes, and
//! construction errors.

use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Network topology patterns supported by the simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TopologyKind {
    /// Every node can contact every other node
    Complete,
    /// Nodes only contact their predecessor and successor
    Ring,
    /// Nodes in a 3-D unit cube, linked when closer than a radius
    Geometric,
}

impl TopologyKind {
    /// Returns a string representation of the topology kind
    pub fn as_str(&self) -> &'static str {
        match self {
            TopologyKind::Complete => "complete",
            TopologyKind::Ring => "ring",
            TopologyKind::Geometric => "geometric",
        }
    }
}

/// How a topology picks a node's contact for the round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingMode {
    /// Precomputed per-node pick sequence, replayed after `reset()`
    #[default]
    Fixed,
    /// Fresh uniform draw on every call
    Adaptive,
}

/// Errors raised while constructing a topology
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TopologyError {
    #[error("Topology must contain at least one node")]
    Empty,

    #[error("Invalid geometric radius {0}: must be a positive finite number")]
    InvalidRadius(f64),
}

/// Contact capability consumed by the round scheduler.
///
/// Node indices are `0..len()`. Passing an index outside that range is a
/// programming error and panics.
pub trait Topology {
    /// Number of nodes in the topology
    fn len(&self) -> usize;

    /// Returns true if the topology has no nodes
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pick the contact for `idx` this round.
    ///
    /// May return `idx` itself, which callers treat as "idle this round".
    fn sample_contact(&mut self, idx: usize, rng: &mut dyn RngCore) -> usize;

    /// All peers `idx` may ever contact, excluding `idx`, in ascending order
    fn neighbors(&self, idx: usize) -> Vec<usize>;

    /// Rewind replayable schedules without touching the topology structure
    fn reset(&mut self);

    /// Topology pattern of this instance
    fn kind(&self) -> TopologyKind;

    /// Scheduling mode this instance was built with
    fn scheduling(&self) -> SchedulingMode;
}

/// Panic unless `idx` addresses a node of a topology with `len` nodes
pub(crate) fn check_index(idx: usize, len: usize) {
    assert!(
        idx < len,
        "node index {} out of range for topology with {} nodes",
        idx,
        len
    );
}

/// Integer base-2 logarithm used to size fixed schedules (`log2(1) == 0`)
pub(crate) fn log2_floor(n: usize) -> usize {
    n.max(1).ilog2() as usize
}
