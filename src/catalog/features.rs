//! Audio-feature vectors and the distance between them.

use super::track::AudioFeatures;
use thiserror::Error;

/// A feature vector was requested from a track lacking the enrichment block.
#[derive(Debug, Error)]
#[error("track {track_id} has no audio features, enrich it first")]
pub struct NotEnriched {
    pub track_id: String,
}

/// A track's audio characteristics as a fixed-order 9-dimensional vector.
///
/// Component order is part of the contract: acousticness, danceability,
/// energy, instrumentalness, liveness, loudness, speechiness, valence,
/// tempo. Distances are only meaningful between vectors built by this type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureVector([f64; 9]);

impl FeatureVector {
    /// Euclidean distance to another vector.
    ///
    /// No normalization is applied; the raw feature scales (loudness in dB,
    /// tempo in BPM, the rest mostly 0..1) are the caller's business.
    pub fn distance(&self, other: &FeatureVector) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }

    pub fn components(&self) -> &[f64; 9] {
        &self.0
    }
}

impl From<&AudioFeatures> for FeatureVector {
    fn from(features: &AudioFeatures) -> Self {
        FeatureVector([
            features.acousticness,
            features.danceability,
            features.energy,
            features.instrumentalness,
            features.liveness,
            features.loudness,
            features.speechiness,
            features.valence,
            features.tempo,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(valence: f64, tempo: f64) -> AudioFeatures {
        AudioFeatures {
            key: 5,
            mode: 1,
            time_signature: 4,
            acousticness: 0.2,
            danceability: 0.6,
            energy: 0.8,
            instrumentalness: 0.0,
            liveness: 0.1,
            loudness: -7.5,
            speechiness: 0.05,
            valence,
            tempo,
        }
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = FeatureVector::from(&features(0.3, 120.0));
        let b = FeatureVector::from(&features(0.9, 87.0));

        assert_eq!(a.distance(&b), b.distance(&a));
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let a = FeatureVector::from(&features(0.3, 120.0));

        assert_eq!(a.distance(&a), 0.0);
    }

    #[test]
    fn test_distance_is_never_negative() {
        let a = FeatureVector::from(&features(0.0, 60.0));
        let b = FeatureVector::from(&features(1.0, 200.0));

        assert!(a.distance(&b) > 0.0);
    }

    #[test]
    fn test_single_component_delta() {
        let a = FeatureVector::from(&features(0.3, 120.0));
        let b = FeatureVector::from(&features(0.8, 120.0));

        assert!((a.distance(&b) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_integer_fields_do_not_enter_the_vector() {
        let mut other = features(0.3, 120.0);
        other.key = 11;
        other.mode = 0;
        other.time_signature = 7;

        let a = FeatureVector::from(&features(0.3, 120.0));
        let b = FeatureVector::from(&other);
        assert_eq!(a.distance(&b), 0.0);
    }
}
