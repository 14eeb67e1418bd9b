//! Message loss model and run precondition checks.
//!
//! Every message independently survives with probability `1 - loss`.

use rand::{Rng, RngCore};

use super::types::SimulationError;
use crate::topology::Topology;

/// Fail unless `loss` is a probability
pub fn validate_loss_probability(loss: f64) -> Result<(), SimulationError> {
    if (0.0..=1.0).contains(&loss) {
        Ok(())
    } else {
        Err(SimulationError::InvalidLossProbability(loss))
    }
}

/// Fail unless the SIR tolerance `k` is a positive finite number
pub fn validate_recovery_tolerance(k: f64) -> Result<(), SimulationError> {
    if k.is_finite() && k > 0.0 {
        Ok(())
    } else {
        Err(SimulationError::InvalidRecoveryTolerance(k))
    }
}

/// Fail unless `start_node` addresses a node of `topology`
pub fn validate_start_node<T: Topology + ?Sized>(topology: &T, start_node: usize) -> Result<(), SimulationError> {
    if topology.is_empty() {
        return Err(SimulationError::EmptyTopology);
    }
    if start_node >= topology.len() {
        return Err(SimulationError::StartNodeOutOfRange {
            start_node,
            nodes: topology.len(),
        });
    }
    Ok(())
}

/// Bernoulli survival draw for one message
pub fn survives(loss: f64, rng: &mut dyn RngCore) -> bool {
    loss <= 0.0 || !rng.gen_bool(loss)
}

/// Keep each item with probability `1 - loss`, preserving order
pub fn retain_surviving<T>(items: Vec<T>, loss: f64, rng: &mut dyn RngCore) -> Vec<T> {
    if loss <= 0.0 {
        return items;
    }
    items.into_iter().filter(|_| survives(loss, rng)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_validate_loss_probability() {
        assert!(validate_loss_probability(0.0).is_ok());
        assert!(validate_loss_probability(0.5).is_ok());
        assert!(validate_loss_probability(1.0).is_ok());
        assert!(validate_loss_probability(-0.1).is_err());
        assert!(validate_loss_probability(1.1).is_err());
        assert!(validate_loss_probability(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_recovery_tolerance() {
        assert!(validate_recovery_tolerance(1.0).is_ok());
        assert!(validate_recovery_tolerance(0.5).is_ok());
        assert!(validate_recovery_tolerance(0.0).is_err());
        assert!(validate_recovery_tolerance(-2.0).is_err());
        assert!(validate_recovery_tolerance(f64::INFINITY).is_err());
    }

    #[test]
    fn test_no_loss_keeps_everything() {
        let mut rng = StdRng::seed_from_u64(1);
        let items: Vec<u32> = (0..100).collect();
        assert_eq!(retain_surviving(items.clone(), 0.0, &mut rng), items);
    }

    #[test]
    fn test_full_loss_drops_everything() {
        let mut rng = StdRng::seed_from_u64(1);
        let items: Vec<u32> = (0..100).collect();
        assert!(retain_surviving(items, 1.0, &mut rng).is_empty());
    }

    #[test]
    fn test_partial_loss_rate() {
        let mut rng = StdRng::seed_from_u64(42);
        let kept = retain_surviving((0..10_000).collect::<Vec<u32>>(), 0.3, &mut rng);
        let rate = kept.len() as f64 / 10_000.0;
        assert!((rate - 0.7).abs() < 0.03, "survival rate {}", rate);
        // Order is preserved
        assert!(kept.windows(2).all(|w| w[0] < w[1]));
    }
}
