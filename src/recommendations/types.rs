//! Data types for the recommendation pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::intent::Intent;
use crate::models::{AudioFeatures, Candidate, Track};

/// Counters reported by the hard filter stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterStats {
    pub total: usize,
    /// Candidates with no audio features (counted once per request)
    pub audio_missing: usize,
    /// Rejected by blacklist or title pattern in the strict pass
    pub genre_filtered: usize,
    /// Rejected by feature thresholds in the strict pass
    pub audio_filtered: usize,
    /// Rejected for lacking features with no trusted source or soft title
    pub missing_rejected: usize,
    pub passed_strict: usize,
    /// Zero unless the relaxed pass ran
    pub passed_relaxed: usize,
}

/// Averaged audio descriptors on a 1-10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VibeStats {
    pub energy: u8,
    pub melancholy: u8,
    pub instrumental: u8,
    pub danceability: u8,
}

impl Default for VibeStats {
    fn default() -> Self {
        Self {
            energy: 5,
            melancholy: 5,
            instrumental: 5,
            danceability: 5,
        }
    }
}

/// Output of the selection stages, before any explanation is attached.
#[derive(Debug, Clone, Default)]
pub struct CandidateSelection {
    /// Final slate, shuffled
    pub tracks: Vec<Candidate>,
    pub stats: FilterStats,
    pub vibe: VibeStats,
    /// Features fetched for the pool, keyed by track id
    pub features: HashMap<String, AudioFeatures>,
}

impl CandidateSelection {
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

pub const FALLBACK_DESCRIPTION: &str =
    "A hand-picked mix built around the mood you described.";
pub const FALLBACK_REASON: &str = "Fits the requested vibe.";

/// Natural-language copy for a slate, keyed by track id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Explanation {
    pub description: String,
    #[serde(default)]
    pub per_track_reason: HashMap<String, String>,
    #[serde(default)]
    pub match_scores: HashMap<String, u8>,
}

impl Explanation {
    /// Generic copy used when no explainer is available or it failed.
    pub fn fallback(tracks: &[Candidate], default_score: u8) -> Self {
        Self {
            description: FALLBACK_DESCRIPTION.to_string(),
            per_track_reason: tracks
                .iter()
                .map(|t| (t.id.clone(), FALLBACK_REASON.to_string()))
                .collect(),
            match_scores: tracks.iter().map(|t| (t.id.clone(), default_score)).collect(),
        }
    }

    pub fn reason_for(&self, track_id: &str) -> &str {
        self.per_track_reason
            .get(track_id)
            .map(|s| s.as_str())
            .unwrap_or(FALLBACK_REASON)
    }

    pub fn score_for(&self, track_id: &str, default_score: u8) -> u8 {
        self.match_scores
            .get(track_id)
            .copied()
            .unwrap_or(default_score)
            .min(100)
    }
}

/// A selected track with its explanation attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedTrack {
    #[serde(flatten)]
    pub track: Candidate,
    pub reason: String,
    pub match_score: u8,
}

/// Result of a full free-text recommendation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub intent: Intent,
    pub description: String,
    pub tracks: Vec<RecommendedTrack>,
    pub vibe: VibeStats,
    pub stats: FilterStats,
}

/// Audio profile of an existing playlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistVibe {
    pub playlist_id: String,
    pub tracks: Vec<Track>,
    /// How many tracks had audio features
    pub analyzed: usize,
    pub vibe: VibeStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Track;
    use crate::providers::Provenance;

    fn candidate(id: &str) -> Candidate {
        Candidate::from_track(
            Track {
                id: id.to_string(),
                name: format!("Song {}", id),
                artists: vec!["Artist".to_string()],
                album_art: None,
                external_url: None,
                uri: format!("spotify:track:{}", id),
                popularity: None,
            },
            Provenance::Search,
        )
    }

    #[test]
    fn test_fallback_covers_every_track() {
        let tracks = vec![candidate("a"), candidate("b")];
        let explanation = Explanation::fallback(&tracks, 90);

        assert_eq!(explanation.description, FALLBACK_DESCRIPTION);
        assert_eq!(explanation.score_for("a", 0), 90);
        assert_eq!(explanation.reason_for("b"), FALLBACK_REASON);
    }

    #[test]
    fn test_partial_explanation_uses_defaults() {
        let explanation: Explanation = serde_json::from_str(
            r#"{ "description": "Rainy evening", "matchScores": { "a": 140 } }"#,
        )
        .unwrap();

        assert_eq!(explanation.score_for("a", 90), 100);
        assert_eq!(explanation.score_for("missing", 90), 90);
        assert_eq!(explanation.reason_for("a"), FALLBACK_REASON);
    }

    #[test]
    fn test_filter_stats_serialize_camel_case() {
        let json = serde_json::to_value(FilterStats {
            total: 3,
            audio_missing: 1,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(json["audioMissing"], 1);
        assert_eq!(json["passedRelaxed"], 0);
    }
}
