//! Weighted random selection over a candidate pool.

use super::walker::WalkError;
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;

/// Draw one index with probability proportional to its weight.
///
/// Weights need not sum to one. A pool whose weights are all zero (or
/// otherwise invalid, e.g. NaN) cannot be drawn from and is reported as
/// [`WalkError::DegenerateWeights`].
pub fn pick_weighted<R: Rng>(rng: &mut R, weights: &[f64]) -> Result<usize, WalkError> {
    let distribution = WeightedIndex::new(weights)
        .map_err(|e| WalkError::DegenerateWeights(e.to_string()))?;

    Ok(distribution.sample(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_single_candidate_is_always_chosen() {
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..100 {
            assert_eq!(pick_weighted(&mut rng, &[42.0]).unwrap(), 0);
        }
    }

    #[test]
    fn test_zero_weight_is_never_chosen() {
        let mut rng = StdRng::seed_from_u64(2);

        for _ in 0..1000 {
            assert_ne!(pick_weighted(&mut rng, &[1.0, 0.0, 1.0]).unwrap(), 1);
        }
    }

    #[test]
    fn test_all_zero_weights_are_degenerate() {
        let mut rng = StdRng::seed_from_u64(3);

        let result = pick_weighted(&mut rng, &[0.0, 0.0, 0.0]);
        assert!(matches!(result, Err(WalkError::DegenerateWeights(_))));
    }

    #[test]
    fn test_empirical_frequencies_follow_the_weights() {
        // Fixed seed keeps this statistical check deterministic.
        let mut rng = StdRng::seed_from_u64(42);
        let weights = [1.0, 2.0, 3.0, 4.0];
        let total: f64 = weights.iter().sum();
        let draws = 40_000;

        let mut counts = [0usize; 4];
        for _ in 0..draws {
            counts[pick_weighted(&mut rng, &weights).unwrap()] += 1;
        }

        for (count, weight) in counts.iter().zip(weights.iter()) {
            let expected = weight / total;
            let observed = *count as f64 / draws as f64;
            assert!(
                (observed - expected).abs() < 0.01,
                "observed {observed}, expected {expected}"
            );
        }
    }
}
