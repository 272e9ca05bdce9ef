//! The traversal-and-selection engine.

mod selection;
mod walker;
mod weights;

pub use selection::pick_weighted;
pub use walker::{ChainWalker, WalkError, WalkPolicy, MAX_ARTISTS, MAX_SONGS};
pub use weights::{
    Candidate, DriftingWeight, PopularWeight, SimilarWeight, WeightContext, WeightStrategy,
};
