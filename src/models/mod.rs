use serde::{Deserialize, Serialize};

use crate::providers::types::Provenance;

/// A track as returned by the catalog, before it enters the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    /// Credited artists in catalog order
    pub artists: Vec<String>,
    pub album_art: Option<String>,
    pub external_url: Option<String>,
    pub uri: String,
    /// Catalog popularity (0-100) if the endpoint reports it
    pub popularity: Option<u32>,
}

impl Track {
    /// Display string for all credited artists ("A, B").
    pub fn artist_display(&self) -> String {
        self.artists.join(", ")
    }

    pub fn primary_artist(&self) -> &str {
        self.artists.first().map(|s| s.as_str()).unwrap_or("")
    }
}

/// A track under consideration for the slate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub artist_primary: String,
    pub album_art: Option<String>,
    pub external_url: Option<String>,
    pub uri: String,
    pub popularity: Option<u32>,
    #[serde(skip)]
    pub source: Provenance,
    pub is_requested_artist: bool,
    pub explicit_artist_name: Option<String>,
}

impl Candidate {
    pub fn from_track(track: Track, source: Provenance) -> Self {
        let artist = track.artist_display();
        let artist_primary = track.primary_artist().to_string();
        Self {
            id: track.id,
            name: track.name,
            artist,
            artist_primary,
            album_art: track.album_art,
            external_url: track.external_url,
            uri: track.uri,
            popularity: track.popularity,
            source,
            is_requested_artist: false,
            explicit_artist_name: None,
        }
    }

    /// Near-duplicate key: alternate releases of one recording collapse here.
    pub fn signature(&self) -> String {
        format!(
            "{}-{}",
            self.name.trim().to_lowercase(),
            self.artist_primary.trim().to_lowercase()
        )
    }

    /// Key used for per-artist caps in the diversity selector.
    pub fn artist_key(&self) -> &str {
        if self.artist_primary.is_empty() {
            "Unknown"
        } else {
            &self.artist_primary
        }
    }
}

/// Per-track audio descriptors. Absence from a feature map means "unknown".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub energy: f32,
    pub danceability: f32,
    pub valence: f32,
    pub instrumentalness: f32,
    /// Beats per minute
    pub tempo: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistRef {
    pub id: String,
    pub name: String,
    pub track_count: Option<u32>,
}

/// Feature-targeted recommendation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationParams {
    pub seed_genres: Vec<String>,
    pub target_energy: Option<f32>,
    pub min_energy: Option<f32>,
    pub max_energy: Option<f32>,
    pub target_tempo: Option<f32>,
    pub max_tempo: Option<f32>,
    pub market: Option<String>,
}
