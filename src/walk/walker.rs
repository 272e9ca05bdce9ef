//! The chain walker: a weighted random walk over the artist-relation graph.

use super::selection::pick_weighted;
use super::weights::{Candidate, WeightContext, WeightStrategy};
use crate::catalog::{Artist, NotEnriched, Track};
use crate::gateway::CatalogGateway;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// How many non-skipped related artists one step is willing to examine.
pub const MAX_ARTISTS: usize = 25;
/// How many candidate tracks each examined artist may contribute.
pub const MAX_SONGS: usize = 3;

#[derive(Debug, Error)]
pub enum WalkError {
    #[error(transparent)]
    NotEnriched(#[from] NotEnriched),

    #[error("track {0} has no artists")]
    NoPrimaryArtist(String),

    /// The candidate pool came up empty after exhausting the artist cap.
    /// Fatal for the step; the per-artist "exhausted" case is not.
    #[error(
        "no candidates around {pivot}: examined {artists_examined} related artists, \
         {tracks_filtered} tracks were filtered as already visited"
    )]
    NoCandidates {
        pivot: String,
        artists_examined: usize,
        tracks_filtered: usize,
    },

    #[error("cannot draw from the candidate pool: {0}")]
    DegenerateWeights(String),

    #[error(transparent)]
    Gateway(#[from] anyhow::Error),
}

/// Uniqueness policy for the walk.
#[derive(Clone, Copy, Debug)]
pub struct WalkPolicy {
    /// Never revisit an artist that already contributed a track.
    pub unique_artists: bool,
    /// Never emit the same track twice.
    pub unique_tracks: bool,
}

impl Default for WalkPolicy {
    fn default() -> Self {
        Self {
            unique_artists: true,
            unique_tracks: true,
        }
    }
}

/// An infinite, non-restartable iterator of tracks.
///
/// Each step hops from the previous pick's primary artist to its related
/// artists, gathers their top tracks into a candidate pool, scores the pool
/// with the weight strategy and draws one winner.
///
/// Selection runs one step ahead: the first emission is the seed itself
/// (no computation), and the call that emits track N has already selected
/// track N+1. A selection failure therefore surfaces on the advance *after*
/// the one that triggered it, and is retried from the same pivot on every
/// subsequent call until the visited state changes (see [`Self::reset`]).
///
/// The walker is single-threaded, pull-based state; gateway round-trips
/// happen inside [`Self::advance`], never in the background.
pub struct ChainWalker {
    gateway: Arc<dyn CatalogGateway>,
    strategy: Box<dyn WeightStrategy>,
    policy: WalkPolicy,
    seed: Track,
    /// The most recently emitted track.
    current: Option<Track>,
    /// The next track to emit; `None` while a selection failure is pending.
    pending: Option<Track>,
    /// Winner of the latest selection, threaded to the weight strategies.
    last: Option<Track>,
    visited_artists: HashSet<Artist>,
    visited_tracks: HashSet<Track>,
    rng: StdRng,
}

impl ChainWalker {
    /// Start a walk from an enriched seed track.
    pub fn new(
        gateway: Arc<dyn CatalogGateway>,
        seed: Track,
        strategy: Box<dyn WeightStrategy>,
        policy: WalkPolicy,
    ) -> Result<Self, WalkError> {
        Self::with_rng(gateway, seed, strategy, policy, StdRng::seed_from_u64(rand::random()))
    }

    /// Like [`Self::new`] but with a fixed RNG seed, for reproducible walks.
    pub fn seeded(
        gateway: Arc<dyn CatalogGateway>,
        seed: Track,
        strategy: Box<dyn WeightStrategy>,
        policy: WalkPolicy,
        rng_seed: u64,
    ) -> Result<Self, WalkError> {
        Self::with_rng(gateway, seed, strategy, policy, StdRng::seed_from_u64(rng_seed))
    }

    fn with_rng(
        gateway: Arc<dyn CatalogGateway>,
        seed: Track,
        strategy: Box<dyn WeightStrategy>,
        policy: WalkPolicy,
        rng: StdRng,
    ) -> Result<Self, WalkError> {
        // The seed drives the first hop and the Drifting strategy; it must
        // arrive enriched and with a primary artist.
        seed.feature_vector()?;
        if seed.primary_artist().is_none() {
            return Err(WalkError::NoPrimaryArtist(seed.id.clone()));
        }

        let visited_artists = seed.artists.iter().cloned().collect();
        let visited_tracks = HashSet::from([seed.clone()]);

        Ok(Self {
            gateway,
            strategy,
            policy,
            current: None,
            pending: Some(seed.clone()),
            last: None,
            seed,
            visited_artists,
            visited_tracks,
            rng,
        })
    }

    /// Forget every visited artist and track without moving the walk.
    ///
    /// The current position and the already-selected next track are kept
    /// as they are; only the uniqueness filters are relaxed. This is how a
    /// caller recovers from [`WalkError::NoCandidates`].
    pub fn reset(&mut self) {
        debug!(
            "Clearing visited state ({} artists, {} tracks)",
            self.visited_artists.len(),
            self.visited_tracks.len()
        );
        self.visited_artists.clear();
        self.visited_tracks.clear();
    }

    /// Emit the next track of the walk and precompute the one after it.
    pub fn advance(&mut self) -> Result<Track, WalkError> {
        let next = match self.pending.take() {
            Some(track) => track,
            None => {
                // The previous lookahead failed; retry it against the same
                // pivot. With unchanged visited state and gateway data the
                // retry fails the same way every time.
                let Some(pivot) = self.current.clone() else {
                    unreachable!("pending is only cleared after an emission");
                };
                let winner = self.select_next(&pivot)?;
                self.record_selection(&winner);
                winner
            }
        };

        self.current = Some(next.clone());

        match self.select_next(&next) {
            Ok(winner) => {
                self.record_selection(&winner);
                self.pending = Some(winner);
            }
            Err(err) => {
                // Surface on the next call; `next` itself was already
                // selected successfully and is still emitted.
                debug!("Could not select a track after {}: {}", next.name, err);
                self.pending = None;
            }
        }

        Ok(next)
    }

    fn record_selection(&mut self, winner: &Track) {
        self.last = Some(winner.clone());
        self.visited_artists.extend(winner.artists.iter().cloned());
        self.visited_tracks.insert(winner.clone());
    }

    /// One selection: gather candidates around `pivot`, prune, score, draw.
    fn select_next(&mut self, pivot: &Track) -> Result<Track, WalkError> {
        let pivot_artist = pivot
            .primary_artist()
            .ok_or_else(|| WalkError::NoPrimaryArtist(pivot.id.clone()))?
            .clone();

        let mut related = self.gateway.fetch_related_artists(&pivot_artist.id)?;
        debug!(
            "Fetched {} artists related to {}",
            related.len(),
            pivot_artist.name
        );
        // Spend the artist cap on the most prominent candidates first. The
        // sort is stable, so the gateway's order survives among equals.
        related.sort_by(|a, b| b.popularity.cmp(&a.popularity));

        let mut pool: Vec<Candidate> = Vec::new();
        let mut examined = 0;
        let mut filtered = 0;

        for artist in related {
            if examined == MAX_ARTISTS {
                debug!("Reached the cap of {MAX_ARTISTS} examined artists");
                break;
            }
            if self.policy.unique_artists && self.visited_artists.contains(&artist) {
                continue;
            }
            examined += 1;

            let top = self.gateway.fetch_top_tracks(&artist.id)?;
            let total = top.len();
            let mut candidates: Vec<Track> = top
                .into_iter()
                .filter(|track| {
                    !(self.policy.unique_tracks && self.visited_tracks.contains(track))
                })
                .collect();
            filtered += total - candidates.len();

            if candidates.is_empty() {
                // Expected once the walk has been in a neighbourhood for a
                // while; the artist just has nothing left to offer.
                debug!("Artist {} is exhausted, skipping", artist.name);
                continue;
            }

            candidates.shuffle(&mut self.rng);
            candidates.truncate(MAX_SONGS);
            for track in candidates {
                let track = self.gateway.enrich(&track)?;
                pool.push(Candidate {
                    track,
                    via: artist.clone(),
                });
            }
        }

        if pool.is_empty() {
            return Err(WalkError::NoCandidates {
                pivot: pivot_artist.name,
                artists_examined: examined,
                tracks_filtered: filtered,
            });
        }

        let ctx = WeightContext {
            seed: &self.seed,
            last: self.last.as_ref(),
        };
        let weights = self.strategy.weigh(&pool, ctx)?;
        let chosen = pick_weighted(&mut self.rng, &weights)?;
        let winner = pool.swap_remove(chosen).track;

        info!(
            "Selected {} by {} from {} candidates",
            winner.name,
            winner
                .primary_artist()
                .map(|a| a.name.as_str())
                .unwrap_or("unknown"),
            weights.len()
        );

        Ok(winner)
    }
}

impl Iterator for ChainWalker {
    type Item = Result<Track, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.advance())
    }
}
