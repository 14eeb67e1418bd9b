//! Complete graph topology.
//!
//! Every node may contact every node. Contacts are drawn uniformly from
//! `[0, n)`, so a node occasionally picks itself and stays idle for the round.

use log::debug;
use rand::{Rng, RngCore};

use super::schedule::PickSchedule;
use super::types::{check_index, log2_floor, SchedulingMode, Topology, TopologyError, TopologyKind};

/// Fully connected topology over `n` nodes
#[derive(Debug, Clone)]
pub struct CompleteGraph {
    n: usize,
    scheduling: SchedulingMode,
    schedule: Option<PickSchedule>,
}

impl CompleteGraph {
    /// Create a complete graph of `n` nodes.
    ///
    /// In fixed mode, `n * log2(n) * 5` picks are drawn up front and split
    /// evenly into per-node sequences.
    pub fn new(n: usize, scheduling: SchedulingMode, rng: &mut dyn RngCore) -> Result<Self, TopologyError> {
        if n == 0 {
            return Err(TopologyError::Empty);
        }

        let schedule = match scheduling {
            SchedulingMode::Fixed => {
                let per_node = log2_floor(n) * 5;
                debug!("Precomputing {} contacts per node for complete graph of {} nodes", per_node, n);
                Some(PickSchedule::generate(n, per_node, rng, |_, rng| rng.gen_range(0..n)))
            }
            SchedulingMode::Adaptive => None,
        };

        Ok(Self { n, scheduling, schedule })
    }
}

impl Topology for CompleteGraph {
    fn len(&self) -> usize {
        self.n
    }

    fn sample_contact(&mut self, idx: usize, rng: &mut dyn RngCore) -> usize {
        check_index(idx, self.n);
        let n = self.n;
        match self.schedule.as_mut() {
            Some(schedule) => schedule.next_pick(idx, |ext| ext.gen_range(0..n)),
            None => rng.gen_range(0..n),
        }
    }

    fn neighbors(&self, idx: usize) -> Vec<usize> {
        check_index(idx, self.n);
        (0..self.n).filter(|&peer| peer != idx).collect()
    }

    fn reset(&mut self) {
        if let Some(schedule) = self.schedule.as_mut() {
            schedule.rewind();
        }
    }

    fn kind(&self) -> TopologyKind {
        TopologyKind::Complete
    }

    fn scheduling(&self) -> SchedulingMode {
        self.scheduling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_empty_graph_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = CompleteGraph::new(0, SchedulingMode::Adaptive, &mut rng);
        assert_eq!(result.unwrap_err(), TopologyError::Empty);
    }

    #[test]
    fn test_neighbors_exclude_self() {
        let mut rng = StdRng::seed_from_u64(1);
        let graph = CompleteGraph::new(5, SchedulingMode::Adaptive, &mut rng).unwrap();
        assert_eq!(graph.neighbors(2), vec![0, 1, 3, 4]);
    }

    #[test]
    fn test_contacts_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut graph = CompleteGraph::new(10, SchedulingMode::Adaptive, &mut rng).unwrap();
        for _ in 0..200 {
            for idx in 0..10 {
                assert!(graph.sample_contact(idx, &mut rng) < 10);
            }
        }
    }

    #[test]
    fn test_fixed_schedule_size() {
        let mut rng = StdRng::seed_from_u64(3);
        let graph = CompleteGraph::new(16, SchedulingMode::Fixed, &mut rng).unwrap();
        let schedule = graph.schedule.as_ref().unwrap();
        // log2(16) * 5 picks per node, n * log2(n) * 5 in total
        assert_eq!(schedule.len_for(0), 20);
        assert_eq!((0..16).map(|i| schedule.len_for(i)).sum::<usize>(), 16 * 4 * 5);
    }

    #[test]
    fn test_fixed_reset_replays() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut graph = CompleteGraph::new(8, SchedulingMode::Fixed, &mut rng).unwrap();

        // Run past the precomputed length so the extension is exercised too
        let first: Vec<usize> = (0..40).map(|_| graph.sample_contact(3, &mut rng)).collect();
        graph.reset();
        let second: Vec<usize> = (0..40).map(|_| graph.sample_contact(3, &mut rng)).collect();

        assert_eq!(first, second);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_index_panics() {
        let mut rng = StdRng::seed_from_u64(1);
        let graph = CompleteGraph::new(4, SchedulingMode::Adaptive, &mut rng).unwrap();
        graph.neighbors(4);
    }
}
