//! Typed errors for the recommendation pipeline.
//!
//! Uses `thiserror` for ergonomic error definitions and implements
//! `Serialize` so errors can be handed to a JSON caller unchanged.

use serde::Serialize;
use thiserror::Error;

use super::types::FilterStats;

#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum RecommendationError {
    /// Every candidate was filtered out (or none were found). Carries the
    /// filter counters so the caller can show why.
    #[error("No tracks matched the request ({} candidates considered)", .0.total)]
    NoResults(FilterStats),

    #[error("Invalid playlist link: {0}")]
    InvalidPlaylistUrl(String),

    /// The playlist resolved but yielded no playable tracks
    #[error("Playlist '{0}' has no tracks")]
    EmptyPlaylist(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<crate::spotify::SpotifyError> for RecommendationError {
    fn from(e: crate::spotify::SpotifyError) -> Self {
        match e {
            crate::spotify::SpotifyError::InvalidUrl(msg) => {
                RecommendationError::InvalidPlaylistUrl(msg)
            }
            other => RecommendationError::Internal(other.to_string()),
        }
    }
}
