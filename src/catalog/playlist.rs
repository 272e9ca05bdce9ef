use super::artist::Artist;
use super::track::Track;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// An ordered sequence of tracks, in walk order.
///
/// The container enforces no uniqueness; that is a walk-time policy. The
/// `id` is assigned externally once the playlist has been persisted
/// somewhere and stays `None` until then.
#[derive(Clone, Debug, Serialize)]
pub struct Playlist {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    tracks: Vec<Track>,
}

impl Playlist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            tracks: Vec::new(),
        }
    }

    pub fn push(&mut self, track: Track) {
        self.tracks.push(track);
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Total duration in milliseconds.
    pub fn duration(&self) -> u64 {
        self.tracks.iter().map(|t| u64::from(t.duration)).sum()
    }

    /// Every artist appearing across the playlist's tracks.
    pub fn artists(&self) -> HashSet<&Artist> {
        self.tracks.iter().flat_map(|t| t.artists.iter()).collect()
    }

    /// Membership by track identity.
    pub fn contains(&self, track: &Track) -> bool {
        self.tracks.iter().any(|t| t == track)
    }
}

impl fmt::Display for Playlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} tracks, {} artists, {} ms)",
            self.name,
            self.tracks.len(),
            self.artists().len(),
            self.duration()
        )
    }
}
