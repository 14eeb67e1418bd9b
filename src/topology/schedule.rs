//! Replayable per-node contact schedules.
//!
//! Fixed scheduling precomputes a sequence of picks for every node so that
//! several protocol variants can be run against the exact same contact
//! pattern. Each node owns a cursor; `rewind` moves all cursors back to the
//! start. When a run outlives the precomputed picks, the schedule is extended
//! on demand from its own generator and the extension is kept, so later
//! replays see it too. A fixed schedule never draws from the run's random
//! source.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Per-node pick sequences with independent cursors
#[derive(Debug, Clone)]
pub struct PickSchedule {
    picks: Vec<Vec<usize>>,
    cursors: Vec<usize>,
    extension: StdRng,
}

impl PickSchedule {
    /// Build a schedule of `per_node` picks for each of `nodes` nodes.
    ///
    /// `draw(idx, rng)` produces one pick for node `idx`. The generator used
    /// for later extensions is seeded from `rng` as well.
    pub fn generate<F>(nodes: usize, per_node: usize, rng: &mut dyn RngCore, mut draw: F) -> Self
    where
        F: FnMut(usize, &mut dyn RngCore) -> usize,
    {
        let picks = (0..nodes)
            .map(|idx| (0..per_node).map(|_| draw(idx, &mut *rng)).collect())
            .collect();

        Self {
            picks,
            cursors: vec![0; nodes],
            extension: StdRng::seed_from_u64(rng.next_u64()),
        }
    }

    /// Next pick for `idx`, extending the sequence with `draw` once exhausted
    pub fn next_pick<F>(&mut self, idx: usize, draw: F) -> usize
    where
        F: FnOnce(&mut dyn RngCore) -> usize,
    {
        let cursor = self.cursors[idx];
        let sequence = &mut self.picks[idx];
        let pick = match sequence.get(cursor) {
            Some(&pick) => pick,
            None => {
                let pick = draw(&mut self.extension);
                sequence.push(pick);
                pick
            }
        };
        self.cursors[idx] = cursor + 1;
        pick
    }

    /// Move every cursor back to the first pick
    pub fn rewind(&mut self) {
        self.cursors.iter_mut().for_each(|c| *c = 0);
    }

    /// Number of picks currently stored for `idx`
    pub fn len_for(&self, idx: usize) -> usize {
        self.picks[idx].len()
    }
}
