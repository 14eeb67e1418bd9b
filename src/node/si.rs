//! Susceptible-Infected node.
//!
//! Once infected a node stays infected for the rest of the run.

use rand::RngCore;

use super::types::{EpidemicNode, GossipNode, NodeState};
use crate::message::Message;

/// Node of the SI dissemination protocol
#[derive(Debug, Clone)]
pub struct SiNode {
    idx: usize,
    push: bool,
    pull: bool,
    state: NodeState,
}

impl SiNode {
    pub fn new(idx: usize, push: bool, pull: bool) -> Self {
        Self {
            idx,
            push,
            pull,
            state: NodeState::Susceptible,
        }
    }
}

/// Round tick shared by SI and SIR nodes.
///
/// Infected nodes push an update when push is enabled; every node sends an
/// update request when pull is enabled.
pub(super) fn dissemination_tick(idx: usize, state: NodeState, push: bool, pull: bool, peer: usize) -> Vec<Message> {
    if peer == idx {
        return Vec::new();
    }

    let mut messages = Vec::with_capacity(2);
    if push && state == NodeState::Infected {
        messages.push(Message::Update { from: idx, to: peer });
    }
    if pull {
        messages.push(Message::UpdateRequest { from: idx, to: peer });
    }
    messages
}

impl GossipNode for SiNode {
    fn idx(&self) -> usize {
        self.idx
    }

    fn on_round_tick(&mut self, peer: usize) -> Vec<Message> {
        dissemination_tick(self.idx, self.state, self.push, self.pull, peer)
    }

    fn on_receive(&mut self, message: &Message, _rng: &mut dyn RngCore) -> Option<Message> {
        debug_assert_eq!(message.recipient(), self.idx);
        match *message {
            Message::UpdateRequest { from, .. } => {
                (self.state == NodeState::Infected).then_some(Message::Update { from: self.idx, to: from })
            }
            Message::Update { .. } => {
                self.state = NodeState::Infected;
                None
            }
            Message::Feedback { .. } | Message::FlowUpdate { .. } => None,
        }
    }
}

impl EpidemicNode for SiNode {
    fn state(&self) -> NodeState {
        self.state
    }

    fn infect(&mut self) {
        self.state = NodeState::Infected;
    }

    fn is_terminal(infected: usize, _removed: usize, nodes: usize) -> bool {
        infected == nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_idle_tick_sends_nothing() {
        let mut node = SiNode::new(3, true, true);
        node.infect();
        assert!(node.on_round_tick(3).is_empty());
    }

    #[test]
    fn test_push_only_when_infected() {
        let mut node = SiNode::new(0, true, false);
        assert!(node.on_round_tick(1).is_empty());

        node.infect();
        assert_eq!(node.on_round_tick(1), vec![Message::Update { from: 0, to: 1 }]);
    }

    #[test]
    fn test_pull_regardless_of_state() {
        let mut node = SiNode::new(0, false, true);
        assert_eq!(node.on_round_tick(2), vec![Message::UpdateRequest { from: 0, to: 2 }]);

        node.infect();
        assert_eq!(node.on_round_tick(2), vec![Message::UpdateRequest { from: 0, to: 2 }]);
    }

    #[test]
    fn test_push_pull_sends_both() {
        let mut node = SiNode::new(0, true, true);
        node.infect();
        let messages = node.on_round_tick(1);
        assert_eq!(messages.len(), 2);
        assert!(messages.contains(&Message::Update { from: 0, to: 1 }));
        assert!(messages.contains(&Message::UpdateRequest { from: 0, to: 1 }));
    }

    #[test]
    fn test_request_answered_only_when_infected() {
        let mut rng = StdRng::seed_from_u64(0);
        let request = Message::UpdateRequest { from: 4, to: 1 };

        let mut node = SiNode::new(1, true, true);
        assert_eq!(node.on_receive(&request, &mut rng), None);

        node.infect();
        assert_eq!(node.on_receive(&request, &mut rng), Some(Message::Update { from: 1, to: 4 }));
    }

    #[test]
    fn test_update_infects_and_is_idempotent() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut node = SiNode::new(1, true, true);
        let update = Message::Update { from: 0, to: 1 };

        assert_eq!(node.on_receive(&update, &mut rng), None);
        assert_eq!(node.state(), NodeState::Infected);
        assert_eq!(node.on_receive(&update, &mut rng), None);
        assert_eq!(node.state(), NodeState::Infected);
    }

    #[test]
    fn test_terminal_when_all_infected() {
        assert!(SiNode::is_terminal(5, 0, 5));
        assert!(!SiNode::is_terminal(4, 0, 5));
    }
}
