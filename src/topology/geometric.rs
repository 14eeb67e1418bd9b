//! Random geometric graph topology.
//!
//! Nodes are placed uniformly at random in the 3-dimensional unit cube and
//! linked when their Euclidean distance is below the radius. The placement is
//! redrawn until the resulting graph is connected; once built, the adjacency
//! never changes. Each round a node picks uniformly among its neighbors plus
//! one extra slot that stands for "idle".

use std::f64::consts::PI;

use log::{debug, info, trace, warn};
use rand::{Rng, RngCore};

use super::schedule::PickSchedule;
use super::types::{check_index, SchedulingMode, Topology, TopologyError, TopologyKind};

/// A point in the unit cube
pub type Position = [f64; 3];

/// Connected random geometric graph with explicit adjacency lists
#[derive(Debug, Clone)]
pub struct GeometricGraph {
    radius: f64,
    positions: Vec<Position>,
    adjacency: Vec<Vec<usize>>,
    scheduling: SchedulingMode,
    schedule: Option<PickSchedule>,
}

impl GeometricGraph {
    /// Build a connected random geometric graph of `n` nodes.
    ///
    /// Placement is retried until the graph is connected. Radii well below
    /// [`GeometricGraph::connectivity_radius`] can take many attempts.
    pub fn new(
        n: usize,
        radius: f64,
        scheduling: SchedulingMode,
        rng: &mut dyn RngCore,
    ) -> Result<Self, TopologyError> {
        if n == 0 {
            return Err(TopologyError::Empty);
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(TopologyError::InvalidRadius(radius));
        }

        let threshold = Self::connectivity_radius(n);
        if radius < threshold {
            warn!(
                "Radius {:.3} is below the connectivity threshold {:.3} for {} nodes; generation may retry many times",
                radius, threshold, n
            );
        }

        let mut attempts = 0usize;
        let (positions, adjacency) = loop {
            attempts += 1;
            let positions: Vec<Position> = (0..n).map(|_| [rng.gen(), rng.gen(), rng.gen()]).collect();
            let adjacency = build_adjacency(&positions, radius);
            if is_connected(&adjacency) {
                break (positions, adjacency);
            }
            trace!("Geometric graph attempt {} is disconnected, regenerating", attempts);
        };

        let edges: usize = adjacency.iter().map(Vec::len).sum::<usize>() / 2;
        info!(
            "Built geometric graph: {} nodes, {} edges, radius {} ({} attempt(s))",
            n, edges, radius, attempts
        );

        let schedule = match scheduling {
            SchedulingMode::Fixed => {
                let per_node = ((n as f64).log2() / radius).floor() as usize * 5;
                debug!("Precomputing {} contacts per node for geometric graph", per_node);
                Some(PickSchedule::generate(n, per_node, rng, |idx, rng| {
                    draw_geometric_contact(idx, &adjacency[idx], rng)
                }))
            }
            SchedulingMode::Adaptive => None,
        };

        Ok(Self {
            radius,
            positions,
            adjacency,
            scheduling,
            schedule,
        })
    }

    /// Radius around which a 3-D random geometric graph of `n` nodes becomes
    /// connected with high probability: `(ln n / (4/3 * pi * n))^(1/3)`
    pub fn connectivity_radius(n: usize) -> f64 {
        if n < 2 {
            return 0.0;
        }
        let n = n as f64;
        (n.ln() / (4.0 / 3.0 * PI * n)).cbrt()
    }

    /// Distance threshold used to build the graph
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Node placements in the unit cube
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }
}

/// Uniform pick among `neighbors` plus one idle slot mapped back to `idx`
fn draw_geometric_contact(idx: usize, neighbors: &[usize], rng: &mut dyn RngCore) -> usize {
    let slot = rng.gen_range(0..neighbors.len() + 1);
    neighbors.get(slot).copied().unwrap_or(idx)
}

fn distance(a: &Position, b: &Position) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum::<f64>().sqrt()
}

/// Sorted adjacency lists linking every pair closer than `radius`
fn build_adjacency(positions: &[Position], radius: f64) -> Vec<Vec<usize>> {
    let n = positions.len();
    let mut adjacency = vec![Vec::new(); n];
    for i in 0..n {
        for j in (i + 1)..n {
            if distance(&positions[i], &positions[j]) < radius {
                adjacency[i].push(j);
                adjacency[j].push(i);
            }
        }
    }
    for neighbors in adjacency.iter_mut() {
        neighbors.sort_unstable();
    }
    adjacency
}

/// Depth-first reachability check from node 0
fn is_connected(adjacency: &[Vec<usize>]) -> bool {
    if adjacency.is_empty() {
        return true;
    }

    let mut visited = vec![false; adjacency.len()];
    let mut stack = vec![0usize];
    let mut reached = 0usize;

    while let Some(node) = stack.pop() {
        if visited[node] {
            continue;
        }
        visited[node] = true;
        reached += 1;

        for &neighbor in &adjacency[node] {
            if !visited[neighbor] {
                stack.push(neighbor);
            }
        }
    }

    reached == adjacency.len()
}

impl Topology for GeometricGraph {
    fn len(&self) -> usize {
        self.adjacency.len()
    }

    fn sample_contact(&mut self, idx: usize, rng: &mut dyn RngCore) -> usize {
        check_index(idx, self.adjacency.len());
        let neighbors = &self.adjacency[idx];
        match self.schedule.as_mut() {
            Some(schedule) => schedule.next_pick(idx, |ext| draw_geometric_contact(idx, neighbors, ext)),
            None => draw_geometric_contact(idx, neighbors, rng),
        }
    }

    fn neighbors(&self, idx: usize) -> Vec<usize> {
        check_index(idx, self.adjacency.len());
        self.adjacency[idx].clone()
    }

    fn reset(&mut self) {
        if let Some(schedule) = self.schedule.as_mut() {
            schedule.rewind();
        }
    }

    fn kind(&self) -> TopologyKind {
        TopologyKind::Geometric
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
    fn test_invalid_parameters() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            GeometricGraph::new(0, 0.5, SchedulingMode::Adaptive, &mut rng).unwrap_err(),
            TopologyError::Empty
        );
        assert!(matches!(
            GeometricGraph::new(10, 0.0, SchedulingMode::Adaptive, &mut rng),
            Err(TopologyError::InvalidRadius(_))
        ));
        assert!(matches!(
            GeometricGraph::new(10, f64::NAN, SchedulingMode::Adaptive, &mut rng),
            Err(TopologyError::InvalidRadius(_))
        ));
    }

    #[test]
    fn test_graph_is_connected_and_symmetric() {
        let mut rng = StdRng::seed_from_u64(21);
        let graph = GeometricGraph::new(60, 0.5, SchedulingMode::Adaptive, &mut rng).unwrap();

        assert!(is_connected(&graph.adjacency));
        for idx in 0..graph.len() {
            for &peer in &graph.neighbors(idx) {
                assert_ne!(peer, idx);
                assert!(graph.neighbors(peer).contains(&idx));
            }
        }
    }

    #[test]
    fn test_edges_respect_radius() {
        let mut rng = StdRng::seed_from_u64(4);
        let graph = GeometricGraph::new(40, 0.6, SchedulingMode::Adaptive, &mut rng).unwrap();
        let positions = graph.positions();

        for i in 0..graph.len() {
            let neighbors = graph.neighbors(i);
            for j in 0..graph.len() {
                if i == j {
                    continue;
                }
                let linked = neighbors.contains(&j);
                assert_eq!(linked, distance(&positions[i], &positions[j]) < 0.6);
            }
        }
    }

    #[test]
    fn test_contacts_are_neighbors_or_idle() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut graph = GeometricGraph::new(30, 0.5, SchedulingMode::Fixed, &mut rng).unwrap();

        for _ in 0..50 {
            for idx in 0..30 {
                let peer = graph.sample_contact(idx, &mut rng);
                assert!(peer == idx || graph.neighbors(idx).contains(&peer));
            }
        }
    }

    #[test]
    fn test_fixed_schedule_length() {
        let mut rng = StdRng::seed_from_u64(2);
        let graph = GeometricGraph::new(32, 0.5, SchedulingMode::Fixed, &mut rng).unwrap();
        // floor(log2(32) / 0.5) * 5
        assert_eq!(graph.schedule.as_ref().unwrap().len_for(0), 50);
    }

    #[test]
    fn test_reset_does_not_rebuild() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut graph = GeometricGraph::new(25, 0.5, SchedulingMode::Fixed, &mut rng).unwrap();
        let edges = graph.edge_count();
        let adjacency = graph.adjacency.clone();

        let first: Vec<usize> = (0..25).map(|i| graph.sample_contact(i, &mut rng)).collect();
        graph.reset();
        let second: Vec<usize> = (0..25).map(|i| graph.sample_contact(i, &mut rng)).collect();

        assert_eq!(first, second);
        assert_eq!(graph.edge_count(), edges);
        assert_eq!(graph.adjacency, adjacency);
    }

    #[test]
    fn test_is_connected_detects_split() {
        let split = vec![vec![1], vec![0], vec![3], vec![2]];
        assert!(!is_connected(&split));
        let joined = vec![vec![1], vec![0, 2], vec![1, 3], vec![2]];
        assert!(is_connected(&joined));
    }

    #[test]
    fn test_connectivity_radius() {
        assert_eq!(GeometricGraph::connectivity_radius(1), 0.0);
        let r = GeometricGraph::connectivity_radius(1000);
        assert!(r > 0.0 && r < 0.5);
    }
}
