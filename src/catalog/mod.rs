mod artist;
mod features;
mod playlist;
mod track;

pub use artist::Artist;
pub use features::{FeatureVector, NotEnriched};
pub use playlist::Playlist;
pub use track::{AudioFeatures, Track};
