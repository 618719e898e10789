use crate::intent::Intent;
use crate::models::{ArtistRef, AudioFeatures, Candidate, PlaylistRef, RecommendationParams, Track};
use crate::recommendations::types::Explanation;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Read-only view of the music catalog.
///
/// Every method is infallible from the caller's point of view: upstream
/// failures are logged by the implementation and surface as empty results,
/// which the pipeline treats as "no signal".
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Unique identifier (e.g., "spotify")
    fn id(&self) -> &str;

    /// Keyword track search, one page.
    async fn search(&self, query: &str, market: Option<&str>) -> Vec<Track>;

    /// Best-matching artist for a free-text name.
    async fn search_artist(&self, name: &str) -> Option<ArtistRef>;

    /// Top tracks in `market`, or the provider's default market.
    async fn artist_top_tracks(&self, artist_id: &str, market: Option<&str>) -> Vec<Track>;

    async fn playlist_tracks(&self, playlist_id: &str) -> Vec<Track>;

    async fn search_playlists(&self, query: &str, limit: usize) -> Vec<PlaylistRef>;

    async fn recommendations(&self, params: &RecommendationParams) -> Vec<Track>;

    /// Feature lookup keyed by track id. Ids without data are simply absent.
    async fn audio_features(&self, ids: &[String]) -> HashMap<String, AudioFeatures>;
}

/// Turns a free-text request into a structured [`Intent`].
#[async_trait]
pub trait IntentParser: Send + Sync {
    async fn parse_intent(&self, text: &str) -> Result<Intent>;
}

/// Writes the human-readable copy for a finished slate.
#[async_trait]
pub trait TrackExplainer: Send + Sync {
    async fn explain(&self, tracks: &[Candidate], intent: &Intent) -> Result<Explanation>;
}
