//! Synchronous round scheduler for rumor-spreading protocols (SI, SIR).
//!
//! Every round:
//!
//! 1. each node samples one contact and emits its tick messages;
//! 2. each message independently survives the loss model;
//! 3. surviving update requests are answered against the state at the start
//!    of the round, and each reply goes through the loss model again;
//! 4. surviving updates are applied; SIR nodes answer redundant updates with
//!    feedback, which is also subject to loss and applied last;
//! 5. state counts and the cumulative message total are recorded.
//!
//! The run is exposed as an iterator of [`RoundRecord`]s that starts with the
//! initial state (round 0) and ends with the first record satisfying the
//! protocol's termination predicate.

use log::{debug, info};
use rand::RngCore;

use super::loss::{retain_surviving, survives, validate_loss_probability, validate_recovery_tolerance, validate_start_node};
use super::types::{DisseminationOutcome, RoundRecord, SiParams, SimulationError, SirParams};
use crate::message::{Message, MessageKind};
use crate::node::{EpidemicNode, NodeState, SiNode, SirNode};
use crate::topology::Topology;

/// A rumor-spreading run in progress
pub struct EpidemicRun<'a, T: Topology + ?Sized, N: EpidemicNode> {
    topology: &'a mut T,
    rng: &'a mut dyn RngCore,
    nodes: Vec<N>,
    loss_probability: f64,
    round: usize,
    messages_sent: u64,
    started: bool,
    finished: bool,
}

impl<'a, T: Topology + ?Sized, N: EpidemicNode> EpidemicRun<'a, T, N> {
    /// Start a run over `nodes` with `start_node` as the seed.
    ///
    /// `nodes[i]` must be the node with index `i` of `topology`.
    pub fn new(
        topology: &'a mut T,
        mut nodes: Vec<N>,
        start_node: usize,
        loss_probability: f64,
        rng: &'a mut dyn RngCore,
    ) -> Result<Self, SimulationError> {
        validate_loss_probability(loss_probability)?;
        validate_start_node(topology, start_node)?;
        assert_eq!(nodes.len(), topology.len(), "one node per topology index is required");

        nodes[start_node].infect();

        Ok(Self {
            topology,
            rng,
            nodes,
            loss_probability,
            round: 0,
            messages_sent: 0,
            started: false,
            finished: false,
        })
    }

    /// Nodes in index order
    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    fn record(&self) -> RoundRecord {
        let mut record = RoundRecord {
            round: self.round,
            susceptible: 0,
            infected: 0,
            removed: 0,
            messages_sent: self.messages_sent,
        };
        for node in &self.nodes {
            match node.state() {
                NodeState::Susceptible => record.susceptible += 1,
                NodeState::Infected => record.infected += 1,
                NodeState::Removed => record.removed += 1,
            }
        }
        record
    }

    fn step(&mut self) {
        self.round += 1;

        let mut outgoing = Vec::new();
        for idx in 0..self.nodes.len() {
            let peer = self.topology.sample_contact(idx, self.rng);
            outgoing.extend(self.nodes[idx].on_round_tick(peer));
        }
        let mut sent = outgoing.len() as u64;

        let delivered = retain_surviving(outgoing, self.loss_probability, self.rng);
        let (requests, mut updates): (Vec<Message>, Vec<Message>) = delivered
            .into_iter()
            .partition(|m| m.kind() == MessageKind::UpdateRequest);

        for request in &requests {
            if let Some(reply) = self.nodes[request.recipient()].on_receive(request, self.rng) {
                sent += 1;
                if survives(self.loss_probability, self.rng) {
                    updates.push(reply);
                }
            }
        }

        let mut feedback = Vec::new();
        for update in &updates {
            if let Some(reply) = self.nodes[update.recipient()].on_receive(update, self.rng) {
                sent += 1;
                if survives(self.loss_probability, self.rng) {
                    feedback.push(reply);
                }
            }
        }

        for message in &feedback {
            self.nodes[message.recipient()].on_receive(message, self.rng);
        }

        self.messages_sent += sent;
    }
}

impl<T: Topology + ?Sized, N: EpidemicNode> Iterator for EpidemicRun<'_, T, N> {
    type Item = RoundRecord;

    fn next(&mut self) -> Option<RoundRecord> {
        if self.finished {
            return None;
        }

        if self.started {
            self.step();
        } else {
            self.started = true;
        }

        let record = self.record();
        debug!(
            "Round {}: S={} I={} R={} messages={}",
            record.round, record.susceptible, record.infected, record.removed, record.messages_sent
        );

        if N::is_terminal(record.infected, record.removed, self.nodes.len()) {
            self.finished = true;
        }
        Some(record)
    }
}

/// Start an SI run, yielding one record per round
pub fn si_rounds<'a, T: Topology + ?Sized>(
    topology: &'a mut T,
    params: &SiParams,
    rng: &'a mut dyn RngCore,
) -> Result<EpidemicRun<'a, T, SiNode>, SimulationError> {
    if !params.push && !params.pull {
        return Err(SimulationError::NoDirection);
    }
    let nodes = (0..topology.len()).map(|i| SiNode::new(i, params.push, params.pull)).collect();
    EpidemicRun::new(topology, nodes, params.start_node, params.loss_probability, rng)
}

/// Run SI dissemination until every node is infected
pub fn run_si<T: Topology + ?Sized>(
    topology: &mut T,
    params: &SiParams,
    rng: &mut dyn RngCore,
) -> Result<DisseminationOutcome, SimulationError> {
    info!(
        "Running SI (push={}, pull={}) on {} nodes from node {} with loss {}",
        params.push,
        params.pull,
        topology.len(),
        params.start_node,
        params.loss_probability
    );
    let outcome: DisseminationOutcome = si_rounds(topology, params, rng)?.collect();
    info!(
        "SI finished after {} rounds with {} messages",
        outcome.rounds(),
        outcome.total_messages()
    );
    Ok(outcome)
}

/// Start an SIR run, yielding one record per round
pub fn sir_rounds<'a, T: Topology + ?Sized>(
    topology: &'a mut T,
    params: &SirParams,
    rng: &'a mut dyn RngCore,
) -> Result<EpidemicRun<'a, T, SirNode>, SimulationError> {
    if !params.push && !params.pull {
        return Err(SimulationError::NoDirection);
    }
    validate_recovery_tolerance(params.k)?;
    let nodes = (0..topology.len())
        .map(|i| SirNode::new(i, params.push, params.pull, params.k))
        .collect();
    EpidemicRun::new(topology, nodes, params.start_node, params.loss_probability, rng)
}

/// Run SIR rumor mongering until the rumor dies out or reaches everyone
pub fn run_sir<T: Topology + ?Sized>(
    topology: &mut T,
    params: &SirParams,
    rng: &mut dyn RngCore,
) -> Result<DisseminationOutcome, SimulationError> {
    info!(
        "Running SIR (push={}, pull={}, k={}) on {} nodes from node {}",
        params.push,
        params.pull,
        params.k,
        topology.len(),
        params.start_node
    );
    let outcome: DisseminationOutcome = sir_rounds(topology, params, rng)?.collect();
    info!(
        "SIR finished after {} rounds: {} of {} nodes reached, {} messages",
        outcome.rounds(),
        outcome.reached(),
        topology.len(),
        outcome.total_messages()
    );
    Ok(outcome)
}
