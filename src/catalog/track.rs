use super::artist::Artist;
use super::features::{FeatureVector, NotEnriched};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// The audio-analysis block of a track.
///
/// Populated by the catalog gateway during enrichment; the nine float fields
/// feed the feature vector, in declaration order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub key: i32,
    pub mode: i32,
    pub time_signature: i32,
    pub acousticness: f64,
    pub danceability: f64,
    pub energy: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub loudness: f64,
    pub speechiness: f64,
    pub valence: f64,
    pub tempo: f64,
}

/// A track as known to the catalog.
///
/// The first entry of `artists` is the primary artist and drives the graph
/// hops. A track is "enriched" when `features` is populated; requesting a
/// feature vector before that is an error.
///
/// Identity is the catalog `id` alone, like [`Artist`]: same id means same
/// track no matter what the other fields say.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    /// Duration in milliseconds.
    pub duration: u32,
    pub explicit: bool,
    pub popularity: u32,
    pub artists: Vec<Artist>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<AudioFeatures>,
}

impl Track {
    /// The artist used for related-artist hops.
    pub fn primary_artist(&self) -> Option<&Artist> {
        self.artists.first()
    }

    pub fn is_enriched(&self) -> bool {
        self.features.is_some()
    }

    /// The track's audio-feature vector.
    ///
    /// Fails with [`NotEnriched`] when the enrichment block is absent; the
    /// caller is expected to enrich via the gateway first, never to default.
    pub fn feature_vector(&self) -> Result<FeatureVector, NotEnriched> {
        self.features
            .as_ref()
            .map(FeatureVector::from)
            .ok_or_else(|| NotEnriched {
                track_id: self.id.clone(),
            })
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Track {}

impl Hash for Track {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str, popularity: u32) -> Track {
        Track {
            id: id.to_owned(),
            name: format!("Track {id}"),
            duration: 180_000,
            explicit: false,
            popularity,
            artists: vec![],
            features: None,
        }
    }

    #[test]
    fn test_equality_is_by_id_only() {
        let a = track("t1", 50);
        let b = track("t1", 10);
        let c = track("t2", 50);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_feature_vector_requires_enrichment() {
        let bare = track("t1", 50);

        let err = bare.feature_vector().unwrap_err();
        assert_eq!(err.track_id, "t1");
    }

    #[test]
    fn test_primary_artist_is_first() {
        let mut t = track("t1", 50);
        t.artists = vec![
            Artist {
                id: "a1".to_owned(),
                name: "Lead".to_owned(),
                popularity: 70,
            },
            Artist {
                id: "a2".to_owned(),
                name: "Feature".to_owned(),
                popularity: 40,
            },
        ];

        assert_eq!(t.primary_artist().unwrap().id, "a1");
    }

    #[test]
    fn test_parses_track_json_without_features() {
        let s = r#"
        {
            "id": "11dFghVXANMlKmJXsNCbNl",
            "name": "Cut To The Feeling",
            "duration": 207959,
            "explicit": false,
            "popularity": 63,
            "artists": [
                {
                    "id": "6sFIWsNpZYqfjUpaCgueju",
                    "name": "Carly Rae Jepsen",
                    "popularity": 74
                }
            ]
        }
        "#;
        let t: Track = serde_json::from_str(s).unwrap();

        assert_eq!(t.id, "11dFghVXANMlKmJXsNCbNl");
        assert!(!t.is_enriched());
        assert_eq!(t.primary_artist().unwrap().name, "Carly Rae Jepsen");
    }
}
