//! Ring topology.
//!
//! Each round a node picks uniformly among its predecessor, itself and its
//! successor. Picking itself is a deliberate idle outcome with probability 1/3.

use rand::{Rng, RngCore};

use super::schedule::PickSchedule;
use super::types::{check_index, log2_floor, SchedulingMode, Topology, TopologyError, TopologyKind};

/// Cyclic topology where node `i` neighbors `i - 1` and `i + 1` (mod n)
#[derive(Debug, Clone)]
pub struct RingGraph {
    n: usize,
    scheduling: SchedulingMode,
    schedule: Option<PickSchedule>,
}

impl RingGraph {
    /// Create a ring of `n` nodes
    pub fn new(n: usize, scheduling: SchedulingMode, rng: &mut dyn RngCore) -> Result<Self, TopologyError> {
        if n == 0 {
            return Err(TopologyError::Empty);
        }

        let schedule = match scheduling {
            SchedulingMode::Fixed => Some(PickSchedule::generate(n, log2_floor(n) * 5, rng, |idx, rng| {
                draw_ring_contact(idx, n, rng)
            })),
            SchedulingMode::Adaptive => None,
        };

        Ok(Self { n, scheduling, schedule })
    }
}

fn draw_ring_contact(idx: usize, n: usize, rng: &mut dyn RngCore) -> usize {
    match rng.gen_range(0..3) {
        0 => (idx + n - 1) % n,
        1 => idx,
        _ => (idx + 1) % n,
    }
}

impl Topology for RingGraph {
    fn len(&self) -> usize {
        self.n
    }

    fn sample_contact(&mut self, idx: usize, rng: &mut dyn RngCore) -> usize {
        check_index(idx, self.n);
        let n = self.n;
        match self.schedule.as_mut() {
            Some(schedule) => schedule.next_pick(idx, |ext| draw_ring_contact(idx, n, ext)),
            None => draw_ring_contact(idx, n, rng),
        }
    }

    fn neighbors(&self, idx: usize) -> Vec<usize> {
        check_index(idx, self.n);
        let prev = (idx + self.n - 1) % self.n;
        let next = (idx + 1) % self.n;

        let mut peers: Vec<usize> = [prev, next].into_iter().filter(|&p| p != idx).collect();
        peers.sort_unstable();
        peers.dedup();
        peers
    }

    fn reset(&mut self) {
        if let Some(schedule) = self.schedule.as_mut() {
            schedule.rewind();
        }
    }

    fn kind(&self) -> TopologyKind {
        TopologyKind::Ring
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
    fn test_neighbors() {
        let mut rng = StdRng::seed_from_u64(1);
        let ring = RingGraph::new(5, SchedulingMode::Adaptive, &mut rng).unwrap();
        assert_eq!(ring.neighbors(0), vec![1, 4]);
        assert_eq!(ring.neighbors(2), vec![1, 3]);
        assert_eq!(ring.neighbors(4), vec![0, 3]);
    }

    #[test]
    fn test_small_ring_neighbors() {
        let mut rng = StdRng::seed_from_u64(1);
        let single = RingGraph::new(1, SchedulingMode::Adaptive, &mut rng).unwrap();
        assert!(single.neighbors(0).is_empty());

        let pair = RingGraph::new(2, SchedulingMode::Adaptive, &mut rng).unwrap();
        assert_eq!(pair.neighbors(0), vec![1]);
        assert_eq!(pair.neighbors(1), vec![0]);
    }

    #[test]
    fn test_contact_covers_both_sides_and_idle() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut ring = RingGraph::new(6, SchedulingMode::Adaptive, &mut rng).unwrap();

        let mut seen = [false; 6];
        for _ in 0..300 {
            let peer = ring.sample_contact(0, &mut rng);
            assert!(peer == 5 || peer == 0 || peer == 1, "unexpected contact {}", peer);
            seen[peer] = true;
        }
        assert!(seen[5] && seen[0] && seen[1]);
    }

    #[test]
    fn test_fixed_reset_replays() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut ring = RingGraph::new(10, SchedulingMode::Fixed, &mut rng).unwrap();

        let first: Vec<usize> = (0..50).map(|i| ring.sample_contact(i % 10, &mut rng)).collect();
        ring.reset();
        let second: Vec<usize> = (0..50).map(|i| ring.sample_contact(i % 10, &mut rng)).collect();
        assert_eq!(first, second);
    }
}
