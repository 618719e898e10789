//! Recommendation engine implementation.
//!
//! Turns a listening request into a slate by:
//! 1. Parsing the request into an [`Intent`] (degrading to defaults)
//! 2. Aggregating a candidate pool from the catalog
//! 3. Applying hard filters, relaxed once if a slow request comes up short
//! 4. Selecting a diverse slate and scoring its vibe
//! 5. Attaching explanations (degrading to generic copy)

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

use super::aggregator::CandidateAggregator;
use super::diversity::DiversitySelector;
use super::errors::RecommendationError;
use super::filter;
use super::stats::vibe_stats;
use super::types::{
    CandidateSelection, Explanation, PlaylistVibe, RecommendedTrack, Recommendations,
};
use crate::config::PipelineConfig;
use crate::intent::Intent;
use crate::providers::{CatalogProvider, IntentParser, TrackExplainer};
use crate::spotify::SpotifyClient;

/// Engine for mood-driven track selection.
///
/// Holds no per-request state: everything a stage needs is passed to it. The
/// only shared mutable piece is the shuffle RNG.
pub struct RecommendationEngine {
    catalog: Arc<dyn CatalogProvider>,
    parser: Arc<dyn IntentParser>,
    explainer: Arc<dyn TrackExplainer>,
    config: PipelineConfig,
    rng: Mutex<StdRng>,
}

impl RecommendationEngine {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        parser: Arc<dyn IntentParser>,
        explainer: Arc<dyn TrackExplainer>,
        config: PipelineConfig,
    ) -> Self {
        let rng = match config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        log::info!(
            "Recommendation engine ready (catalog: {}, slate: {}, quota: {})",
            catalog.id(),
            config.slate_size,
            config.priority_quota
        );

        Self {
            catalog,
            parser,
            explainer,
            config,
            rng: Mutex::new(rng),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Parse free text, falling back to an empty intent if the parser fails.
    pub async fn parse_intent(&self, text: &str) -> Intent {
        match self.parser.parse_intent(text).await {
            Ok(intent) => intent.normalized(),
            Err(e) => {
                log::warn!("Intent parsing failed, using defaults: {}", e);
                Intent::default()
            }
        }
    }

    /// Run aggregation, filtering and selection for an intent.
    ///
    /// Never fails: an empty catalog response yields an empty slate whose
    /// stats report `total == 0`.
    pub async fn select_candidates(&self, intent: &Intent) -> CandidateSelection {
        let intent = intent.clone().normalized();

        let pool = CandidateAggregator::new(self.catalog.as_ref(), &self.config)
            .collect(&intent)
            .await;
        if pool.is_empty() {
            log::warn!("Catalog returned no candidates");
            return CandidateSelection::default();
        }

        let ids: Vec<String> = pool.iter().map(|c| c.id.clone()).collect();
        let features = self.catalog.audio_features(&ids).await;

        let (filtered, stats) =
            filter::filter_candidates(&pool, &features, &intent, self.config.relax_threshold);

        let selector = DiversitySelector::from_config(&self.config);
        let tracks = {
            let mut rng = self.rng.lock();
            selector.select(filtered, &intent.requested_artist_keys(), &mut *rng)
        };

        let vibe = vibe_stats(tracks.iter().map(|c| c.id.as_str()), &features);

        CandidateSelection {
            tracks,
            stats,
            vibe,
            features,
        }
    }

    /// Full run for a free-text request.
    pub async fn recommend(&self, text: &str) -> Result<Recommendations, RecommendationError> {
        let intent = self.parse_intent(text).await;
        log::info!(
            "Intent: moods={:?}, genres={:?}, artists={:?}, language={:?}",
            intent.moods,
            intent.explicit_genres,
            intent.explicit_artists,
            intent.effective_language()
        );

        let selection = self.select_candidates(&intent).await;
        if selection.is_empty() {
            return Err(RecommendationError::NoResults(selection.stats));
        }

        let default_score = self.config.default_match_score;
        let mut explanation = match self.explainer.explain(&selection.tracks, &intent).await {
            Ok(explanation) => explanation,
            Err(e) => {
                log::warn!("Explainer failed, using generic copy: {}", e);
                Explanation::fallback(&selection.tracks, default_score)
            }
        };
        if explanation.description.trim().is_empty() {
            explanation.description = Explanation::fallback(&[], default_score).description;
        }

        let tracks = selection
            .tracks
            .into_iter()
            .map(|track| RecommendedTrack {
                reason: explanation.reason_for(&track.id).to_string(),
                match_score: explanation.score_for(&track.id, default_score),
                track,
            })
            .collect();

        Ok(Recommendations {
            intent,
            description: explanation.description,
            tracks,
            vibe: selection.vibe,
            stats: selection.stats,
        })
    }

    /// Audio profile of an existing playlist given its link or id.
    pub async fn analyze_playlist(&self, link: &str) -> Result<PlaylistVibe, RecommendationError> {
        let playlist_id = SpotifyClient::extract_playlist_id(link)?;

        let tracks = self.catalog.playlist_tracks(&playlist_id).await;
        if tracks.is_empty() {
            return Err(RecommendationError::EmptyPlaylist(playlist_id));
        }

        let ids: Vec<String> = tracks.iter().map(|t| t.id.clone()).collect();
        let features = self.catalog.audio_features(&ids).await;
        let analyzed = ids.iter().filter(|id| features.contains_key(*id)).count();
        let vibe = vibe_stats(ids.iter().map(|id| id.as_str()), &features);

        log::info!(
            "Analyzed playlist {}: {}/{} tracks with features",
            playlist_id,
            analyzed,
            tracks.len()
        );

        Ok(PlaylistVibe {
            playlist_id,
            tracks,
            analyzed,
            vibe,
        })
    }
}
