//! CatalogGateway trait definition.

use crate::catalog::{Artist, Track};
use anyhow::Result;

/// The narrow data-fetch seam between the walk and the catalog.
///
/// The walker treats implementations as potentially slow, rate-limited
/// remote dependencies: it never assumes a fixed number of related artists
/// or top tracks per call, and it passes failures through unmodified.
/// Retry and backoff belong behind this trait, not in front of it.
pub trait CatalogGateway: Send + Sync {
    /// Get a track by ID, with the enrichment block populated.
    fn fetch_track(&self, track_id: &str) -> Result<Track>;

    /// Artists related to the given artist. Order carries no meaning;
    /// callers re-sort as needed.
    fn fetch_related_artists(&self, artist_id: &str) -> Result<Vec<Artist>>;

    /// An artist's current top tracks, possibly un-enriched.
    fn fetch_top_tracks(&self, artist_id: &str) -> Result<Vec<Track>>;

    /// Return the track with audio features and full artist records
    /// populated. Pure with respect to track identity: repeated calls for
    /// the same id are idempotent and side-effect-free on the catalog.
    fn enrich(&self, track: &Track) -> Result<Track>;
}
