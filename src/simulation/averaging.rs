//! Round scheduler for averaging protocols (Push-Sum, Push-Flow).
//!
//! Nodes tick in index order. Each emitted flow passes the loss model and is
//! applied to its recipient before the next node ticks, so with no loss the
//! flow records of every edge stay antisymmetric and the flow-adjusted mean
//! is conserved exactly.

use log::{debug, info};
use rand::RngCore;

use super::loss::{survives, validate_loss_probability};
use super::types::{AveragingMode, AveragingOutcome, AveragingParams, AveragingRound, SimulationError};
use crate::node::{AveragingNode, PushFlowNode, PushSumNode};
use crate::topology::Topology;

/// An averaging run in progress, yielding one [`AveragingRound`] per round
pub struct AveragingRun<'a, T: Topology + ?Sized, N: AveragingNode> {
    topology: &'a mut T,
    rng: &'a mut dyn RngCore,
    nodes: Vec<N>,
    mean: f64,
    rounds: usize,
    loss_probability: f64,
    round: usize,
    messages_sent: u64,
    started: bool,
}

impl<'a, T: Topology + ?Sized, N: AveragingNode> AveragingRun<'a, T, N> {
    /// Start a run of `rounds` rounds; `nodes[i]` must be node `i` of `topology`
    pub fn new(
        topology: &'a mut T,
        nodes: Vec<N>,
        rounds: usize,
        loss_probability: f64,
        rng: &'a mut dyn RngCore,
    ) -> Result<Self, SimulationError> {
        validate_loss_probability(loss_probability)?;
        if topology.is_empty() {
            return Err(SimulationError::EmptyTopology);
        }
        if nodes.len() != topology.len() {
            return Err(SimulationError::ValueCountMismatch {
                values: nodes.len(),
                nodes: topology.len(),
            });
        }

        let mean = nodes.iter().map(|n| n.estimate()).sum::<f64>() / nodes.len() as f64;

        Ok(Self {
            topology,
            rng,
            nodes,
            mean,
            rounds,
            loss_probability,
            round: 0,
            messages_sent: 0,
            started: false,
        })
    }

    /// Mean of the initial values
    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    /// Current per-node estimates
    pub fn estimates(&self) -> Vec<f64> {
        self.nodes.iter().map(|n| n.estimate()).collect()
    }

    fn rmse(&self) -> f64 {
        let squared: f64 = self.nodes.iter().map(|n| (n.estimate() - self.mean).powi(2)).sum();
        (squared / self.nodes.len() as f64).sqrt()
    }

    fn conserved_mean(&self) -> f64 {
        let (x, w) = self
            .nodes
            .iter()
            .map(|n| n.mass())
            .fold((0.0, 0.0), |(sx, sw), (x, w)| (sx + x, sw + w));
        x / w
    }

    fn step(&mut self) {
        self.round += 1;

        for idx in 0..self.nodes.len() {
            let peer = self.topology.sample_contact(idx, self.rng);
            let outgoing = self.nodes[idx].on_round_tick(peer);
            for message in outgoing {
                self.messages_sent += 1;
                if survives(self.loss_probability, self.rng) {
                    self.nodes[message.recipient()].on_receive(&message, self.rng);
                }
            }
        }
    }
}

impl<T: Topology + ?Sized, N: AveragingNode> Iterator for AveragingRun<'_, T, N> {
    type Item = AveragingRound;

    fn next(&mut self) -> Option<AveragingRound> {
        if self.started {
            if self.round >= self.rounds {
                return None;
            }
            self.step();
        } else {
            self.started = true;
        }

        let record = AveragingRound {
            round: self.round,
            rmse: self.rmse(),
            conserved_mean: self.conserved_mean(),
            messages_sent: self.messages_sent,
        };
        debug!(
            "Round {}: rmse={:.6e} conserved mean={:.6} messages={}",
            record.round, record.rmse, record.conserved_mean, record.messages_sent
        );
        Some(record)
    }
}

fn collect_outcome<T: Topology + ?Sized, N: AveragingNode>(mut run: AveragingRun<'_, T, N>) -> AveragingOutcome {
    let history: Vec<AveragingRound> = run.by_ref().collect();
    AveragingOutcome {
        mean: run.mean(),
        history,
        estimates: run.estimates(),
    }
}

/// Run Push-Sum or Push-Flow for `params.rounds` rounds from `initial_values`
pub fn run_averaging<T: Topology + ?Sized>(
    topology: &mut T,
    params: &AveragingParams,
    initial_values: &[f64],
    rng: &mut dyn RngCore,
) -> Result<AveragingOutcome, SimulationError> {
    if initial_values.len() != topology.len() {
        return Err(SimulationError::ValueCountMismatch {
            values: initial_values.len(),
            nodes: topology.len(),
        });
    }

    info!(
        "Running {} on {} nodes for {} rounds with loss {}",
        params.mode.as_str(),
        topology.len(),
        params.rounds,
        params.loss_probability
    );

    let outcome = match params.mode {
        AveragingMode::PushSum => {
            let nodes = initial_values
                .iter()
                .enumerate()
                .map(|(i, &value)| PushSumNode::new(i, value))
                .collect();
            collect_outcome(AveragingRun::new(topology, nodes, params.rounds, params.loss_probability, rng)?)
        }
        AveragingMode::PushFlow => {
            let nodes = initial_values
                .iter()
                .enumerate()
                .map(|(i, &value)| PushFlowNode::new(i, value, &topology.neighbors(i)))
                .collect();
            collect_outcome(AveragingRun::new(topology, nodes, params.rounds, params.loss_probability, rng)?)
        }
    };

    info!(
        "{} finished: mean {:.6}, final rmse {:.6e}",
        params.mode.as_str(),
        outcome.mean,
        outcome.final_rmse().unwrap_or(0.0)
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::{CompleteGraph, GeometricGraph, RingGraph, SchedulingMode};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params(mode: AveragingMode, rounds: usize, loss_probability: f64) -> AveragingParams {
        AveragingParams {
            mode,
            rounds,
            loss_probability,
        }
    }

    fn values(n: usize) -> Vec<f64> {
        (0..n).map(|i| (i * 7 % 13) as f64).collect()
    }

    #[test]
    fn test_push_sum_three_nodes_converges() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut graph = CompleteGraph::new(3, SchedulingMode::Adaptive, &mut rng).unwrap();
        let outcome = run_averaging(
            &mut graph,
            &params(AveragingMode::PushSum, 50, 0.0),
            &[0.0, 3.0, 6.0],
            &mut rng,
        )
        .unwrap();

        assert_eq!(outcome.mean, 3.0);
        assert_eq!(outcome.history.len(), 51);
        assert_eq!(outcome.rmse().len(), 50);
        assert_eq!(outcome.initial_rmse(), Some(6.0_f64.sqrt()));
        for estimate in &outcome.estimates {
            assert!((estimate - 3.0).abs() < 1e-6, "estimate {}", estimate);
        }
    }

    #[test]
    fn test_mass_conserved_every_round_without_loss() {
        for mode in [AveragingMode::PushSum, AveragingMode::PushFlow] {
            let mut rng = StdRng::seed_from_u64(5);
            let mut graph = CompleteGraph::new(20, SchedulingMode::Adaptive, &mut rng).unwrap();
            let initial = values(20);
            let mean = initial.iter().sum::<f64>() / 20.0;

            let outcome = run_averaging(&mut graph, &params(mode, 40, 0.0), &initial, &mut rng).unwrap();
            for round in &outcome.history {
                assert!(
                    (round.conserved_mean - mean).abs() < 1e-9,
                    "{:?} drifted to {} in round {}",
                    mode,
                    round.conserved_mean,
                    round.round
                );
            }
        }
    }

    #[test]
    fn test_push_flow_on_sparse_topologies() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut ring = RingGraph::new(10, SchedulingMode::Adaptive, &mut rng).unwrap();
        let initial = values(10);
        let mean = initial.iter().sum::<f64>() / 10.0;
        let outcome = run_averaging(&mut ring, &params(AveragingMode::PushFlow, 30, 0.0), &initial, &mut rng).unwrap();
        assert!(outcome.history.iter().all(|r| (r.conserved_mean - mean).abs() < 1e-9));

        let mut geometric = GeometricGraph::new(25, 0.6, SchedulingMode::Fixed, &mut rng).unwrap();
        let initial = values(25);
        let outcome =
            run_averaging(&mut geometric, &params(AveragingMode::PushFlow, 60, 0.0), &initial, &mut rng).unwrap();
        let first = outcome.history[0].rmse;
        assert!(outcome.final_rmse().unwrap() < first);
    }

    #[test]
    fn test_rmse_decreases_overall() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut graph = CompleteGraph::new(32, SchedulingMode::Adaptive, &mut rng).unwrap();
        let outcome = run_averaging(
            &mut graph,
            &params(AveragingMode::PushSum, 40, 0.0),
            &values(32),
            &mut rng,
        )
        .unwrap();
        let rmse = outcome.rmse();
        assert_eq!(rmse.len(), 40);
        assert!(outcome.initial_rmse().unwrap() > 1.0);
        assert!(*rmse.last().unwrap() < 1e-3);
    }

    #[test]
    fn test_push_sum_loses_mass_under_loss() {
        // Lost Push-Sum messages take their mass with them; with many rounds
        // at high loss the total weight cannot stay at n.
        let mut rng = StdRng::seed_from_u64(21);
        let mut graph = CompleteGraph::new(16, SchedulingMode::Adaptive, &mut rng).unwrap();
        let initial = values(16);
        let nodes = initial.iter().enumerate().map(|(i, &v)| PushSumNode::new(i, v)).collect();
        let mut run = AveragingRun::new(&mut graph, nodes, 20, 0.5, &mut rng).unwrap();
        run.by_ref().for_each(drop);
        let total_w: f64 = run.nodes().iter().map(|n| n.mass().1).sum();
        assert!(total_w < 16.0);
    }

    #[test]
    fn test_zero_rounds_yields_initial_state() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut graph = CompleteGraph::new(4, SchedulingMode::Adaptive, &mut rng).unwrap();
        let outcome = run_averaging(
            &mut graph,
            &params(AveragingMode::PushFlow, 0, 0.0),
            &[1.0, 2.0, 3.0, 4.0],
            &mut rng,
        )
        .unwrap();
        assert_eq!(outcome.history.len(), 1);
        assert!(outcome.rmse().is_empty());
        assert_eq!(outcome.history[0].messages_sent, 0);
        assert_eq!(outcome.estimates, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_preconditions() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut graph = CompleteGraph::new(4, SchedulingMode::Adaptive, &mut rng).unwrap();

        let err = run_averaging(&mut graph, &params(AveragingMode::PushSum, 5, 0.0), &[1.0], &mut rng).unwrap_err();
        assert_eq!(err, SimulationError::ValueCountMismatch { values: 1, nodes: 4 });

        let err = run_averaging(
            &mut graph,
            &params(AveragingMode::PushSum, 5, -0.5),
            &[1.0, 2.0, 3.0, 4.0],
            &mut rng,
        )
        .unwrap_err();
        assert_eq!(err, SimulationError::InvalidLossProbability(-0.5));
    }
}
