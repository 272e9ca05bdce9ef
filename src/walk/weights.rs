//! Weighting strategies for the walk's candidate pools.
//!
//! A strategy scores, it never selects: given the candidate pairs of one
//! step it returns one non-negative weight per candidate, same order. Walk
//! state (the seed and the previously chosen track) is threaded in through
//! [`WeightContext`] on every call; strategies themselves stay stateless.

use super::walker::WalkError;
use crate::catalog::{Artist, Track};

/// Distances are clamped to this floor before exponentiation. An exact
/// audio-feature match is legitimate input and must not divide by zero.
const DISTANCE_FLOOR: f64 = 1e-6;

/// A (track, artist) pair eligible for the next draw. `via` is the related
/// artist the track was pulled from, which is what the popularity factor
/// refers to.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub track: Track,
    pub via: Artist,
}

/// Walk state visible to the strategies, threaded per call.
#[derive(Clone, Copy)]
pub struct WeightContext<'a> {
    /// The walk's origin track.
    pub seed: &'a Track,
    /// The winner of the previous selection, absent for the first decision.
    pub last: Option<&'a Track>,
}

pub trait WeightStrategy {
    /// One weight per candidate, same order, all non-negative.
    fn weigh(
        &self,
        candidates: &[Candidate],
        ctx: WeightContext<'_>,
    ) -> Result<Vec<f64>, WalkError>;
}

fn popularity_product(candidate: &Candidate) -> f64 {
    f64::from(candidate.track.popularity) * f64::from(candidate.via.popularity)
}

/// Popularity only: `track.popularity * artist.popularity`.
pub struct PopularWeight;

impl WeightStrategy for PopularWeight {
    fn weigh(
        &self,
        candidates: &[Candidate],
        _ctx: WeightContext<'_>,
    ) -> Result<Vec<f64>, WalkError> {
        Ok(candidates.iter().map(popularity_product).collect())
    }
}

/// Popularity divided by the fourth power of the distance to the previous
/// pick. The aggressive exponent turns small distance differences into
/// large weight differences, keeping the walk sonically close to wherever
/// it just was. The first decision has no previous pick and reduces to
/// [`PopularWeight`].
pub struct SimilarWeight;

impl WeightStrategy for SimilarWeight {
    fn weigh(
        &self,
        candidates: &[Candidate],
        ctx: WeightContext<'_>,
    ) -> Result<Vec<f64>, WalkError> {
        let last = match ctx.last {
            Some(track) => Some(track.feature_vector()?),
            None => None,
        };

        candidates
            .iter()
            .map(|candidate| {
                let base = popularity_product(candidate);
                let weight = match &last {
                    Some(last) => {
                        let distance = candidate
                            .track
                            .feature_vector()?
                            .distance(last)
                            .max(DISTANCE_FLOOR);
                        base / distance.powi(4)
                    }
                    None => base,
                };
                Ok(weight)
            })
            .collect()
    }
}

/// Popularity scaled by `distance(candidate, seed)` and divided by
/// `distance(candidate, last)^2`: the walk stays locally close to the
/// previous pick while being rewarded for moving away from the seed, so it
/// drifts. Both distances default to 1 for the first decision.
pub struct DriftingWeight;

impl WeightStrategy for DriftingWeight {
    fn weigh(
        &self,
        candidates: &[Candidate],
        ctx: WeightContext<'_>,
    ) -> Result<Vec<f64>, WalkError> {
        let last = match ctx.last {
            Some(track) => Some((track.feature_vector()?, ctx.seed.feature_vector()?)),
            None => None,
        };

        candidates
            .iter()
            .map(|candidate| {
                let base = popularity_product(candidate);
                let weight = match &last {
                    Some((last, seed)) => {
                        let vector = candidate.track.feature_vector()?;
                        let previous = vector.distance(last).max(DISTANCE_FLOOR);
                        base * vector.distance(seed) / previous.powi(2)
                    }
                    None => base,
                };
                Ok(weight)
            })
            .collect()
    }
}
