//! Susceptible-Infected-Removed node (rumor mongering).
//!
//! An infected node that contacts a peer which already knows the rumor gets
//! feedback, and on each feedback loses interest with probability `1/k`.
//! Transitions are strictly S -> I -> R; R is absorbing.

use rand::{Rng, RngCore};

use super::si::dissemination_tick;
use super::types::{EpidemicNode, GossipNode, NodeState};
use crate::message::Message;

/// Node of the SIR rumor-mongering protocol
#[derive(Debug, Clone)]
pub struct SirNode {
    idx: usize,
    push: bool,
    pull: bool,
    state: NodeState,
    k: f64,
    recovery_probability: f64,
}

impl SirNode {
    /// Create a susceptible node that tolerates on average `k` redundant
    /// contacts before losing interest. `k` must be positive.
    pub fn new(idx: usize, push: bool, pull: bool, k: f64) -> Self {
        debug_assert!(k > 0.0);
        Self {
            idx,
            push,
            pull,
            state: NodeState::Susceptible,
            k,
            recovery_probability: (1.0 / k).min(1.0),
        }
    }

    pub fn k(&self) -> f64 {
        self.k
    }
}

impl GossipNode for SirNode {
    fn idx(&self) -> usize {
        self.idx
    }

    fn on_round_tick(&mut self, peer: usize) -> Vec<Message> {
        dissemination_tick(self.idx, self.state, self.push, self.pull, peer)
    }

    fn on_receive(&mut self, message: &Message, rng: &mut dyn RngCore) -> Option<Message> {
        debug_assert_eq!(message.recipient(), self.idx);
        match *message {
            Message::UpdateRequest { from, .. } => {
                (self.state == NodeState::Infected).then_some(Message::Update { from: self.idx, to: from })
            }
            Message::Update { from, .. } => match self.state {
                NodeState::Susceptible => {
                    self.state = NodeState::Infected;
                    None
                }
                NodeState::Infected | NodeState::Removed => Some(Message::Feedback { from: self.idx, to: from }),
            },
            Message::Feedback { .. } => {
                if self.state == NodeState::Infected && rng.gen_bool(self.recovery_probability) {
                    self.state = NodeState::Removed;
                }
                None
            }
            Message::FlowUpdate { .. } => None,
        }
    }
}

impl EpidemicNode for SirNode {
    fn state(&self) -> NodeState {
        self.state
    }

    fn infect(&mut self) {
        self.state = NodeState::Infected;
    }

    fn is_terminal(infected: usize, removed: usize, nodes: usize) -> bool {
        infected == 0 || infected + removed == nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_update_infects_susceptible_without_reply() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut node = SirNode::new(2, true, true, 2.0);
        assert_eq!(node.on_receive(&Message::Update { from: 0, to: 2 }, &mut rng), None);
        assert_eq!(node.state(), NodeState::Infected);
    }

    #[test]
    fn test_redundant_update_yields_feedback() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut node = SirNode::new(2, true, true, 2.0);
        node.infect();
        assert_eq!(
            node.on_receive(&Message::Update { from: 0, to: 2 }, &mut rng),
            Some(Message::Feedback { from: 2, to: 0 })
        );
    }

    #[test]
    fn test_feedback_with_k_one_always_removes() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut node = SirNode::new(1, true, false, 1.0);
        node.infect();
        node.on_receive(&Message::Feedback { from: 0, to: 1 }, &mut rng);
        assert_eq!(node.state(), NodeState::Removed);
    }

    #[test]
    fn test_removed_is_absorbing() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut node = SirNode::new(1, true, true, 1.0);
        node.infect();
        node.on_receive(&Message::Feedback { from: 0, to: 1 }, &mut rng);
        assert_eq!(node.state(), NodeState::Removed);

        // Neither updates nor further feedback bring it back
        let reply = node.on_receive(&Message::Update { from: 0, to: 1 }, &mut rng);
        assert_eq!(reply, Some(Message::Feedback { from: 1, to: 0 }));
        node.on_receive(&Message::Feedback { from: 0, to: 1 }, &mut rng);
        assert_eq!(node.state(), NodeState::Removed);

        // Removed nodes no longer push or answer requests
        assert_eq!(node.on_round_tick(0), vec![Message::UpdateRequest { from: 1, to: 0 }]);
        assert_eq!(node.on_receive(&Message::UpdateRequest { from: 0, to: 1 }, &mut rng), None);
    }

    #[test]
    fn test_feedback_ignored_by_susceptible() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut node = SirNode::new(1, true, true, 1.0);
        node.on_receive(&Message::Feedback { from: 0, to: 1 }, &mut rng);
        assert_eq!(node.state(), NodeState::Susceptible);
    }

    #[test]
    fn test_recovery_rate_follows_k() {
        let mut rng = StdRng::seed_from_u64(99);
        let trials = 4000;
        let mut removed = 0;
        for _ in 0..trials {
            let mut node = SirNode::new(1, true, true, 4.0);
            node.infect();
            node.on_receive(&Message::Feedback { from: 0, to: 1 }, &mut rng);
            if node.state() == NodeState::Removed {
                removed += 1;
            }
        }
        let rate = removed as f64 / trials as f64;
        assert!((rate - 0.25).abs() < 0.05, "observed recovery rate {}", rate);
    }

    #[test]
    fn test_terminal_conditions() {
        // Rumor died out
        assert!(SirNode::is_terminal(0, 3, 10));
        // Everyone has heard it
        assert!(SirNode::is_terminal(4, 6, 10));
        assert!(!SirNode::is_terminal(4, 5, 10));
    }
}
