//! Asynchronous SI scheduler with delayed delivery.
//!
//! Message production and loss work as in the synchronous scheduler, but
//! every surviving message is parked in a [`Mailbox`] for a random
//! `MIN_DELAY..=MAX_DELAY` rounds. Each round only the messages due in that
//! round are applied. Replies to pull requests are delayed the same way.

use log::{debug, info};
use rand::RngCore;

use super::loss::{retain_surviving, survives, validate_loss_probability, validate_start_node};
use super::mailbox::Mailbox;
use super::types::{DisseminationOutcome, RoundRecord, SiParams, SimulationError};
use crate::message::{Message, MessageKind};
use crate::node::{EpidemicNode, GossipNode, NodeState, SiNode};
use crate::topology::Topology;

/// An SI run with delayed delivery in progress
pub struct DelayedSiRun<'a, T: Topology + ?Sized> {
    topology: &'a mut T,
    rng: &'a mut dyn RngCore,
    nodes: Vec<SiNode>,
    mailbox: Mailbox<Message>,
    loss_probability: f64,
    messages_sent: u64,
    started: bool,
    finished: bool,
}

impl<'a, T: Topology + ?Sized> DelayedSiRun<'a, T> {
    pub fn new(topology: &'a mut T, params: &SiParams, rng: &'a mut dyn RngCore) -> Result<Self, SimulationError> {
        if !params.push && !params.pull {
            return Err(SimulationError::NoDirection);
        }
        validate_loss_probability(params.loss_probability)?;
        validate_start_node(topology, params.start_node)?;

        let mut nodes: Vec<SiNode> = (0..topology.len())
            .map(|i| SiNode::new(i, params.push, params.pull))
            .collect();
        nodes[params.start_node].infect();

        Ok(Self {
            topology,
            rng,
            nodes,
            mailbox: Mailbox::new(),
            loss_probability: params.loss_probability,
            messages_sent: 0,
            started: false,
            finished: false,
        })
    }

    pub fn nodes(&self) -> &[SiNode] {
        &self.nodes
    }

    /// Messages in flight
    pub fn in_flight(&self) -> usize {
        self.mailbox.pending()
    }

    fn record(&self) -> RoundRecord {
        let infected = self
            .nodes
            .iter()
            .filter(|n| n.state() == NodeState::Infected)
            .count();
        RoundRecord {
            round: self.mailbox.current_round(),
            susceptible: self.nodes.len() - infected,
            infected,
            removed: 0,
            messages_sent: self.messages_sent,
        }
    }

    fn step(&mut self) {
        self.mailbox.advance();

        let mut outgoing = Vec::new();
        for idx in 0..self.nodes.len() {
            let peer = self.topology.sample_contact(idx, self.rng);
            outgoing.extend(self.nodes[idx].on_round_tick(peer));
        }
        self.messages_sent += outgoing.len() as u64;

        for message in retain_surviving(outgoing, self.loss_probability, self.rng) {
            self.mailbox.schedule_random(message, self.rng);
        }

        let (requests, updates): (Vec<Message>, Vec<Message>) = self
            .mailbox
            .take_due()
            .into_iter()
            .partition(|m| m.kind() == MessageKind::UpdateRequest);

        for request in &requests {
            if let Some(reply) = self.nodes[request.recipient()].on_receive(request, self.rng) {
                self.messages_sent += 1;
                if survives(self.loss_probability, self.rng) {
                    self.mailbox.schedule_random(reply, self.rng);
                }
            }
        }

        for update in &updates {
            self.nodes[update.recipient()].on_receive(update, self.rng);
        }
    }
}

impl<T: Topology + ?Sized> Iterator for DelayedSiRun<'_, T> {
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
            "Round {}: S={} I={} messages={} in flight={}",
            record.round,
            record.susceptible,
            record.infected,
            record.messages_sent,
            self.mailbox.pending()
        );

        if SiNode::is_terminal(record.infected, record.removed, self.nodes.len()) {
            self.finished = true;
        }
        Some(record)
    }
}

/// Start an asynchronous SI run, yielding one record per round
pub fn si_async_rounds<'a, T: Topology + ?Sized>(
    topology: &'a mut T,
    params: &SiParams,
    rng: &'a mut dyn RngCore,
) -> Result<DelayedSiRun<'a, T>, SimulationError> {
    DelayedSiRun::new(topology, params, rng)
}

/// Run SI with delayed delivery until every node is infected
pub fn run_si_async<T: Topology + ?Sized>(
    topology: &mut T,
    params: &SiParams,
    rng: &mut dyn RngCore,
) -> Result<DisseminationOutcome, SimulationError> {
    info!(
        "Running asynchronous SI (push={}, pull={}) on {} nodes from node {} with loss {}",
        params.push,
        params.pull,
        topology.len(),
        params.start_node,
        params.loss_probability
    );
    let outcome: DisseminationOutcome = si_async_rounds(topology, params, rng)?.collect();
    info!(
        "Asynchronous SI finished after {} rounds with {} messages",
        outcome.rounds(),
        outcome.total_messages()
    );
    Ok(outcome)
}
