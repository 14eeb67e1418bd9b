//! Delay queue for asynchronous delivery.
//!
//! Messages are scheduled a number of rounds into the future and become due
//! when the mailbox reaches that round. Storage is a ring of `MAX_DELAY + 1`
//! slots indexed by delivery round.

use rand::{Rng, RngCore};

/// Smallest delay drawn for an asynchronous message, in rounds
pub const MIN_DELAY: usize = 3;
/// Largest delay drawn for an asynchronous message, in rounds
pub const MAX_DELAY: usize = 5;

/// Round-indexed delay queue
#[derive(Debug, Clone)]
pub struct Mailbox<T> {
    slots: Vec<Vec<T>>,
    round: usize,
    pending: usize,
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Mailbox<T> {
    pub fn new() -> Self {
        Self {
            slots: (0..=MAX_DELAY).map(|_| Vec::new()).collect(),
            round: 0,
            pending: 0,
        }
    }

    fn slot_of(&self, round: usize) -> usize {
        round % self.slots.len()
    }

    /// Deliver `item` `delay` rounds after the current one
    pub fn schedule(&mut self, delay: usize, item: T) {
        assert!(
            (1..=MAX_DELAY).contains(&delay),
            "delay {} outside 1..={}",
            delay,
            MAX_DELAY
        );
        let slot = self.slot_of(self.round + delay);
        self.slots[slot].push(item);
        self.pending += 1;
    }

    /// Schedule `item` with a delay drawn uniformly from `MIN_DELAY..=MAX_DELAY`.
    ///
    /// Returns the delivery round.
    pub fn schedule_random(&mut self, item: T, rng: &mut dyn RngCore) -> usize {
        let delay = rng.gen_range(MIN_DELAY..=MAX_DELAY);
        self.schedule(delay, item);
        self.round + delay
    }

    /// Remove and return everything due in the current round, in scheduling order
    pub fn take_due(&mut self) -> Vec<T> {
        let slot = self.slot_of(self.round);
        let due = std::mem::take(&mut self.slots[slot]);
        self.pending -= due.len();
        due
    }

    /// Move to the next round
    pub fn advance(&mut self) {
        self.round += 1;
    }

    pub fn current_round(&self) -> usize {
        self.round
    }

    /// Messages scheduled but not yet taken
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_fixed_delay_delivery() {
        let mut mailbox = Mailbox::new();
        mailbox.schedule(3, "a");
        mailbox.schedule(1, "b");
        assert_eq!(mailbox.pending(), 2);

        assert!(mailbox.take_due().is_empty());
        mailbox.advance();
        assert_eq!(mailbox.take_due(), vec!["b"]);
        mailbox.advance();
        assert!(mailbox.take_due().is_empty());
        mailbox.advance();
        assert_eq!(mailbox.take_due(), vec!["a"]);
        assert!(mailbox.is_empty());
    }

    #[test]
    fn test_every_item_delivered_exactly_once() {
        let mut rng = StdRng::seed_from_u64(29);
        let mut mailbox = Mailbox::new();
        let mut delivered = vec![0usize; 100];

        for round in 0..20 {
            if round < 10 {
                for k in 0..10 {
                    let item = round * 10 + k;
                    let due = mailbox.schedule_random((item, round), &mut rng);
                    assert!(due >= round + MIN_DELAY && due <= round + MAX_DELAY);
                }
            }
            mailbox.advance();
            for (item, sent_at) in mailbox.take_due() {
                let waited = mailbox.current_round() - sent_at;
                assert!((MIN_DELAY..=MAX_DELAY).contains(&waited));
                delivered[item] += 1;
            }
        }
        assert!(delivered.iter().all(|&count| count == 1));
        assert!(mailbox.is_empty());
    }

    #[test]
    #[should_panic(expected = "delay")]
    fn test_delay_too_long_panics() {
        let mut mailbox = Mailbox::new();
        mailbox.schedule(MAX_DELAY + 1, ());
    }
}
