//! Node capability traits and shared state types.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::message::Message;

/// Epidemic state of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeState {
    /// Has not heard the rumor
    Susceptible,
    /// Knows the rumor and spreads it
    Infected,
    /// Knows the rumor but lost interest in spreading it
    Removed,
}

impl NodeState {
    /// Returns the single-letter name of the state
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeState::Susceptible => "S",
            NodeState::Infected => "I",
            NodeState::Removed => "R",
        }
    }
}

/// Per-round behavior shared by every protocol node.
///
/// A round tick produces the messages a node sends to the contact the
/// topology sampled for it; receiving a message mutates the node and may
/// produce a reply.
pub trait GossipNode {
    /// Index of this node in the topology
    fn idx(&self) -> usize;

    /// Messages to send to `peer` this round. `peer == idx()` means idle.
    fn on_round_tick(&mut self, peer: usize) -> Vec<Message>;

    /// Apply `message` and return the reply, if any
    fn on_receive(&mut self, message: &Message, rng: &mut dyn RngCore) -> Option<Message>;
}

/// Nodes of rumor-spreading protocols (SI, SIR)
pub trait EpidemicNode: GossipNode {
    /// Current epidemic state
    fn state(&self) -> NodeState;

    /// Make this node the seed of the rumor
    fn infect(&mut self);

    /// Whether a run with the given state counts has finished
    fn is_terminal(infected: usize, removed: usize, nodes: usize) -> bool;
}

/// Nodes of mass-conserving averaging protocols (Push-Sum, Push-Flow)
pub trait AveragingNode: GossipNode {
    /// Local estimate of the global mean
    fn estimate(&self) -> f64;

    /// Value and weight mass this node currently accounts for, net of the
    /// flows it has recorded toward its neighbors
    fn mass(&self) -> (f64, f64);
}
