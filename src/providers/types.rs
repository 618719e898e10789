use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregation channel that produced a candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provenance {
    #[default]
    #[serde(rename = "Search API")]
    Search,
    #[serde(rename = "Recommendations API")]
    Recommender,
    #[serde(rename = "Playlist Mining")]
    PlaylistMining,
    #[serde(rename = "Artist Target")]
    ArtistTarget,
}

/// How far a source can be believed when audio features are missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TrustLevel {
    /// Generic keyword search; needs corroboration.
    Unvetted,
    /// Filtered upstream by the recommender or a human curator.
    Vetted,
    /// The user asked for this artist by name.
    Requested,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Search => write!(f, "Search API"),
            Provenance::Recommender => write!(f, "Recommendations API"),
            Provenance::PlaylistMining => write!(f, "Playlist Mining"),
            Provenance::ArtistTarget => write!(f, "Artist Target"),
        }
    }
}

impl Provenance {
    pub fn trust(&self) -> TrustLevel {
        match self {
            Provenance::Search => TrustLevel::Unvetted,
            Provenance::Recommender | Provenance::PlaylistMining => TrustLevel::Vetted,
            Provenance::ArtistTarget => TrustLevel::Requested,
        }
    }
}
