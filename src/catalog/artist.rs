use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// An artist as known to the catalog.
///
/// Identity is the catalog `id` alone: two `Artist` values with the same id
/// compare equal and hash identically even when their other fields disagree
/// (e.g. a stale popularity snapshot). Visited-sets rely on this.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub popularity: u32,
}

impl PartialEq for Artist {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Artist {}

impl Hash for Artist {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
