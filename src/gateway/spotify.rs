//! Spotify Web API gateway.
//!
//! Authenticates with the client-credentials flow and keeps requests under
//! a self-imposed rate limit. Track, artist and audio-feature lookups are
//! memoized by id, which also keeps `enrich` idempotent as the gateway
//! contract requires.

use super::trait_def::CatalogGateway;
use crate::catalog::{Artist, AudioFeatures, Track};
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";
const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const RATE_LIMIT_INTERVAL: Duration = Duration::from_millis(100); // 10 req/sec
const TOKEN_EXPIRY_SLACK: Duration = Duration::from_secs(30);
const TOP_TRACKS_MARKET: &str = "US";

pub struct SpotifyGateway {
    client: Client,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<AccessToken>>,
    last_request: Mutex<Instant>,
    artist_cache: Mutex<HashMap<String, Artist>>,
    track_cache: Mutex<HashMap<String, Track>>,
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Deserialize)]
struct ArtistObject {
    id: String,
    name: String,
    // Simplified artist objects (inside track payloads) carry no popularity.
    #[serde(default)]
    popularity: u32,
}

#[derive(Deserialize)]
struct RelatedArtistsResponse {
    artists: Vec<ArtistObject>,
}

#[derive(Deserialize)]
struct TrackObject {
    id: String,
    name: String,
    duration_ms: u32,
    explicit: bool,
    #[serde(default)]
    popularity: u32,
    #[serde(default)]
    artists: Vec<ArtistObject>,
}

#[derive(Deserialize)]
struct TopTracksResponse {
    tracks: Vec<TrackObject>,
}

#[derive(Deserialize)]
struct AudioFeaturesResponse {
    key: i32,
    mode: i32,
    time_signature: i32,
    acousticness: f64,
    danceability: f64,
    energy: f64,
    instrumentalness: f64,
    liveness: f64,
    loudness: f64,
    speechiness: f64,
    valence: f64,
    tempo: f64,
}

impl From<ArtistObject> for Artist {
    fn from(obj: ArtistObject) -> Self {
        Artist {
            id: obj.id,
            name: obj.name,
            popularity: obj.popularity,
        }
    }
}

impl From<TrackObject> for Track {
    fn from(obj: TrackObject) -> Self {
        Track {
            id: obj.id,
            name: obj.name,
            duration: obj.duration_ms,
            explicit: obj.explicit,
            popularity: obj.popularity,
            artists: obj.artists.into_iter().map(Artist::from).collect(),
            features: None,
        }
    }
}

impl From<AudioFeaturesResponse> for AudioFeatures {
    fn from(r: AudioFeaturesResponse) -> Self {
        AudioFeatures {
            key: r.key,
            mode: r.mode,
            time_signature: r.time_signature,
            acousticness: r.acousticness,
            danceability: r.danceability,
            energy: r.energy,
            instrumentalness: r.instrumentalness,
            liveness: r.liveness,
            loudness: r.loudness,
            speechiness: r.speechiness,
            valence: r.valence,
            tempo: r.tempo,
        }
    }
}

impl SpotifyGateway {
    pub fn new(client_id: &str, client_secret: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            token: Mutex::new(None),
            last_request: Mutex::new(Instant::now() - RATE_LIMIT_INTERVAL),
            artist_cache: Mutex::new(HashMap::new()),
            track_cache: Mutex::new(HashMap::new()),
        })
    }

    /// Build a gateway from the `SPOTIFY_CLIENT_ID` / `SPOTIFY_CLIENT_SECRET`
    /// environment variables.
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var("SPOTIFY_CLIENT_ID")
            .context("SPOTIFY_CLIENT_ID is not set")?;
        let client_secret = std::env::var("SPOTIFY_CLIENT_SECRET")
            .context("SPOTIFY_CLIENT_SECRET is not set")?;
        Self::new(&client_id, &client_secret)
    }

    fn rate_limit(&self) {
        let mut last = self.last_request.lock().unwrap();
        let elapsed = last.elapsed();
        if elapsed < RATE_LIMIT_INTERVAL {
            std::thread::sleep(RATE_LIMIT_INTERVAL - elapsed);
        }
        *last = Instant::now();
    }

    /// Current bearer token, refreshed through the client-credentials flow
    /// when missing or about to expire.
    fn access_token(&self) -> Result<String> {
        let mut token = self.token.lock().unwrap();
        if let Some(current) = token.as_ref() {
            if current.expires_at > Instant::now() {
                return Ok(current.value.clone());
            }
        }

        debug!("Requesting a new Spotify access token");
        let response = self
            .client
            .post(SPOTIFY_TOKEN_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Spotify token request failed with status {}",
                response.status()
            );
        }

        let body: TokenResponse = response.json()?;
        let expires_at = Instant::now() + Duration::from_secs(body.expires_in)
            - TOKEN_EXPIRY_SLACK;
        let value = body.access_token.clone();
        *token = Some(AccessToken {
            value: body.access_token,
            expires_at,
        });

        Ok(value)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.rate_limit();
        let token = self.access_token()?;

        let response = self.client.get(url).bearer_auth(token).send()?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Spotify API request failed with status {} for {}",
                response.status(),
                url
            );
        }

        Ok(response.json()?)
    }

    /// Full artist record, memoized by id.
    fn artist(&self, artist_id: &str) -> Result<Artist> {
        if let Some(artist) = self.artist_cache.lock().unwrap().get(artist_id) {
            return Ok(artist.clone());
        }

        let obj: ArtistObject =
            self.get_json(&format!("{SPOTIFY_API_BASE}/artists/{artist_id}"))?;
        let artist = Artist::from(obj);
        self.artist_cache
            .lock()
            .unwrap()
            .insert(artist_id.to_string(), artist.clone());

        Ok(artist)
    }

    fn audio_features(&self, track_id: &str) -> Result<AudioFeatures> {
        let r: AudioFeaturesResponse =
            self.get_json(&format!("{SPOTIFY_API_BASE}/audio-features/{track_id}"))?;
        Ok(AudioFeatures::from(r))
    }
}

impl CatalogGateway for SpotifyGateway {
    fn fetch_track(&self, track_id: &str) -> Result<Track> {
        if let Some(track) = self.track_cache.lock().unwrap().get(track_id) {
            return Ok(track.clone());
        }

        let obj: TrackObject =
            self.get_json(&format!("{SPOTIFY_API_BASE}/tracks/{track_id}"))?;
        self.enrich(&Track::from(obj))
    }

    fn fetch_related_artists(&self, artist_id: &str) -> Result<Vec<Artist>> {
        let body: RelatedArtistsResponse = self.get_json(&format!(
            "{SPOTIFY_API_BASE}/artists/{artist_id}/related-artists"
        ))?;

        Ok(body.artists.into_iter().map(Artist::from).collect())
    }

    fn fetch_top_tracks(&self, artist_id: &str) -> Result<Vec<Track>> {
        let body: TopTracksResponse = self.get_json(&format!(
            "{SPOTIFY_API_BASE}/artists/{artist_id}/top-tracks?market={TOP_TRACKS_MARKET}"
        ))?;

        Ok(body.tracks.into_iter().map(Track::from).collect())
    }

    fn enrich(&self, track: &Track) -> Result<Track> {
        if let Some(cached) = self.track_cache.lock().unwrap().get(&track.id) {
            return Ok(cached.clone());
        }

        // Track payloads only carry simplified artist objects; swap them
        // for full records so popularity is available downstream.
        let mut artists = Vec::with_capacity(track.artists.len());
        for stub in &track.artists {
            artists.push(self.artist(&stub.id)?);
        }

        let features = self.audio_features(&track.id)?;

        let enriched = Track {
            artists,
            features: Some(features),
            ..track.clone()
        };
        self.track_cache
            .lock()
            .unwrap()
            .insert(enriched.id.clone(), enriched.clone());

        Ok(enriched)
    }
}
