//! In-memory catalog gateway.
//!
//! A deterministic implementation of [`CatalogGateway`] backed by plain
//! maps, for tests and offline experiments where the real backend is not
//! wanted.

use super::trait_def::CatalogGateway;
use crate::catalog::{Artist, AudioFeatures, Track};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryGateway {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    tracks: HashMap<String, Track>,
    features: HashMap<String, AudioFeatures>,
    related: HashMap<String, Vec<Artist>>,
    top_tracks: HashMap<String, Vec<Track>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a track for `fetch_track` lookups.
    pub fn insert_track(&self, track: Track) {
        self.inner
            .lock()
            .unwrap()
            .tracks
            .insert(track.id.clone(), track);
    }

    /// Register the related artists of an artist.
    pub fn set_related(&self, artist_id: &str, related: Vec<Artist>) {
        self.inner
            .lock()
            .unwrap()
            .related
            .insert(artist_id.to_string(), related);
    }

    /// Register the top tracks of an artist, in rank order.
    pub fn set_top_tracks(&self, artist_id: &str, tracks: Vec<Track>) {
        self.inner
            .lock()
            .unwrap()
            .top_tracks
            .insert(artist_id.to_string(), tracks);
    }

    /// Register the audio features handed out by `enrich`.
    pub fn set_features(&self, track_id: &str, features: AudioFeatures) {
        self.inner
            .lock()
            .unwrap()
            .features
            .insert(track_id.to_string(), features);
    }
}

impl CatalogGateway for MemoryGateway {
    fn fetch_track(&self, track_id: &str) -> Result<Track> {
        let track = self
            .inner
            .lock()
            .unwrap()
            .tracks
            .get(track_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown track {track_id}"))?;
        self.enrich(&track)
    }

    fn fetch_related_artists(&self, artist_id: &str) -> Result<Vec<Artist>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .related
            .get(artist_id)
            .cloned()
            .unwrap_or_default())
    }

    fn fetch_top_tracks(&self, artist_id: &str) -> Result<Vec<Track>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .top_tracks
            .get(artist_id)
            .cloned()
            .unwrap_or_default())
    }

    fn enrich(&self, track: &Track) -> Result<Track> {
        if track.is_enriched() {
            return Ok(track.clone());
        }

        let features = self
            .inner
            .lock()
            .unwrap()
            .features
            .get(&track.id)
            .cloned()
            .ok_or_else(|| {
                anyhow::anyhow!("no audio features registered for track {}", track.id)
            })?;

        Ok(Track {
            features: Some(features),
            ..track.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features() -> AudioFeatures {
        AudioFeatures {
            key: 0,
            mode: 1,
            time_signature: 4,
            acousticness: 0.5,
            danceability: 0.5,
            energy: 0.5,
            instrumentalness: 0.0,
            liveness: 0.1,
            loudness: -10.0,
            speechiness: 0.05,
            valence: 0.5,
            tempo: 120.0,
        }
    }

    fn track(id: &str) -> Track {
        Track {
            id: id.to_owned(),
            name: format!("Track {id}"),
            duration: 180_000,
            explicit: false,
            popularity: 50,
            artists: vec![],
            features: None,
        }
    }

    #[test]
    fn test_enrich_is_idempotent() {
        let gateway = MemoryGateway::new();
        gateway.set_features("t1", features());

        let once = gateway.enrich(&track("t1")).unwrap();
        let twice = gateway.enrich(&once).unwrap();

        assert!(once.is_enriched());
        assert_eq!(once.features, twice.features);
    }

    #[test]
    fn test_enrich_fails_without_registered_features() {
        let gateway = MemoryGateway::new();

        assert!(gateway.enrich(&track("t1")).is_err());
    }

    #[test]
    fn test_top_tracks_keep_registration_order() {
        let gateway = MemoryGateway::new();
        gateway.set_top_tracks("a1", vec![track("t1"), track("t2"), track("t3")]);

        let top = gateway.fetch_top_tracks("a1").unwrap();
        let ids: Vec<&str> = top.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["t1", "t2", "t3"]);
    }

    #[test]
    fn test_unknown_artist_yields_no_relations() {
        let gateway = MemoryGateway::new();

        assert!(gateway.fetch_related_artists("nobody").unwrap().is_empty());
        assert!(gateway.fetch_top_tracks("nobody").unwrap().is_empty());
    }

    #[test]
    fn test_fetch_track_enriches() {
        let gateway = MemoryGateway::new();
        gateway.insert_track(track("t1"));
        gateway.set_features("t1", features());

        let fetched = gateway.fetch_track("t1").unwrap();
        assert!(fetched.is_enriched());
    }
}
