//! Averaging nodes: Push-Sum and Push-Flow.
//!
//! Both protocols converge every node's estimate to the mean of the initial
//! values. Push-Sum moves mass around additively, so a lost message destroys
//! mass for good. Push-Flow sends absolute per-neighbor flows instead; a later
//! message overwrites an earlier one, which makes it tolerant to loss.

use std::collections::HashMap;

use rand::RngCore;

use super::types::{AveragingNode, GossipNode};
use crate::message::Message;

/// Push-Sum node: splits its mass in half with one peer every round
#[derive(Debug, Clone)]
pub struct PushSumNode {
    idx: usize,
    x: f64,
    w: f64,
}

impl PushSumNode {
    pub fn new(idx: usize, value: f64) -> Self {
        Self { idx, x: value, w: 1.0 }
    }
}

impl GossipNode for PushSumNode {
    fn idx(&self) -> usize {
        self.idx
    }

    fn on_round_tick(&mut self, peer: usize) -> Vec<Message> {
        if peer == self.idx {
            return Vec::new();
        }

        self.x /= 2.0;
        self.w /= 2.0;
        vec![Message::FlowUpdate {
            from: self.idx,
            to: peer,
            x: self.x,
            w: self.w,
        }]
    }

    fn on_receive(&mut self, message: &Message, _rng: &mut dyn RngCore) -> Option<Message> {
        debug_assert_eq!(message.recipient(), self.idx);
        if let Message::FlowUpdate { x, w, .. } = *message {
            self.x += x;
            self.w += w;
        }
        None
    }
}

impl AveragingNode for PushSumNode {
    fn estimate(&self) -> f64 {
        self.x / self.w
    }

    fn mass(&self) -> (f64, f64) {
        (self.x, self.w)
    }
}

/// Push-Flow node: keeps an absolute outgoing flow per neighbor slot
#[derive(Debug, Clone)]
pub struct PushFlowNode {
    idx: usize,
    x: f64,
    w: f64,
    flows_x: Vec<f64>,
    flows_w: Vec<f64>,
    slots: HashMap<usize, usize>,
}

impl PushFlowNode {
    /// Create a node whose flow slots follow the order of `neighbors`
    pub fn new(idx: usize, value: f64, neighbors: &[usize]) -> Self {
        Self {
            idx,
            x: value,
            w: 1.0,
            flows_x: vec![0.0; neighbors.len()],
            flows_w: vec![0.0; neighbors.len()],
            slots: neighbors.iter().enumerate().map(|(slot, &peer)| (peer, slot)).collect(),
        }
    }

    fn slot(&self, peer: usize) -> usize {
        match self.slots.get(&peer) {
            Some(&slot) => slot,
            None => panic!("node {} has no flow slot for non-neighbor {}", self.idx, peer),
        }
    }

    /// Value and weight not yet handed out as flows
    fn surplus(&self) -> (f64, f64) {
        (
            self.x - self.flows_x.iter().sum::<f64>(),
            self.w - self.flows_w.iter().sum::<f64>(),
        )
    }

    /// Recorded flow pair toward `peer`
    pub fn flow_to(&self, peer: usize) -> (f64, f64) {
        let slot = self.slot(peer);
        (self.flows_x[slot], self.flows_w[slot])
    }
}

impl GossipNode for PushFlowNode {
    fn idx(&self) -> usize {
        self.idx
    }

    fn on_round_tick(&mut self, peer: usize) -> Vec<Message> {
        if peer == self.idx {
            return Vec::new();
        }

        let slot = self.slot(peer);
        let (surplus_x, surplus_w) = self.surplus();
        self.flows_x[slot] += surplus_x / 2.0;
        self.flows_w[slot] += surplus_w / 2.0;

        vec![Message::FlowUpdate {
            from: self.idx,
            to: peer,
            x: self.flows_x[slot],
            w: self.flows_w[slot],
        }]
    }

    fn on_receive(&mut self, message: &Message, _rng: &mut dyn RngCore) -> Option<Message> {
        debug_assert_eq!(message.recipient(), self.idx);
        if let Message::FlowUpdate { from, x, w, .. } = *message {
            let slot = self.slot(from);
            self.flows_x[slot] = -x;
            self.flows_w[slot] = -w;
        }
        None
    }
}

impl AveragingNode for PushFlowNode {
    fn estimate(&self) -> f64 {
        let (x, w) = self.surplus();
        x / w
    }

    fn mass(&self) -> (f64, f64) {
        self.surplus()
    }
}
