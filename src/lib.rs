//! catenella
//!
//! Playlist generation as a weighted random walk over a music catalog's
//! artist-relation graph: start from a seed track, hop to related artists,
//! score their top tracks, draw one, repeat.

pub mod catalog;
pub mod gateway;
pub mod walk;

// Re-export commonly used types for convenience
pub use catalog::{Artist, AudioFeatures, FeatureVector, NotEnriched, Playlist, Track};
pub use gateway::{CatalogGateway, MemoryGateway, SpotifyGateway};
pub use walk::{ChainWalker, WalkError, WalkPolicy, WeightStrategy};
