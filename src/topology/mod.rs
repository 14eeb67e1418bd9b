//! Network topology module.
//!
//! This module contains the topologies gossip protocols run over (complete
//! graph, ring, random geometric graph) and the replayable contact schedules
//! used by fixed scheduling.

pub mod types;
pub mod schedule;
pub mod complete;
pub mod ring;
pub mod geometric;

use rand::RngCore;

// Re-export key types for easier access
pub use types::{SchedulingMode, Topology, TopologyError, TopologyKind};
pub use complete::CompleteGraph;
pub use ring::RingGraph;
pub use geometric::GeometricGraph;

/// Radius used for geometric graphs when none is configured
pub const DEFAULT_RADIUS: f64 = 0.5;

/// Build a boxed topology of the requested kind.
///
/// `radius` is only used by geometric graphs and defaults to
/// [`DEFAULT_RADIUS`].
pub fn build_topology(
    kind: TopologyKind,
    nodes: usize,
    radius: Option<f64>,
    scheduling: SchedulingMode,
    rng: &mut dyn RngCore,
) -> Result<Box<dyn Topology>, TopologyError> {
    log::info!(
        "Building {} topology with {} nodes ({:?} scheduling)",
        kind.as_str(),
        nodes,
        scheduling
    );

    let topology: Box<dyn Topology> = match kind {
        TopologyKind::Complete => Box::new(CompleteGraph::new(nodes, scheduling, rng)?),
        TopologyKind::Ring => Box::new(RingGraph::new(nodes, scheduling, rng)?),
        TopologyKind::Geometric => Box::new(GeometricGraph::new(
            nodes,
            radius.unwrap_or(DEFAULT_RADIUS),
            scheduling,
            rng,
        )?),
    };
    Ok(topology)
}
