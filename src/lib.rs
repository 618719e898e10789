pub mod config;
pub mod errors;
pub mod intent;
pub mod models;
pub mod providers;
pub mod recommendations;
pub mod spotify;

use std::sync::Arc;

use config::VibeConfig;
use errors::AppError;
use intent::KeywordIntentParser;
use recommendations::{DefaultExplainer, RecommendationEngine};
use spotify::SpotifyClient;

/// Engine wired to the Spotify catalog with the offline parser and generic
/// explanations.
pub fn build_engine(config: &VibeConfig) -> Result<RecommendationEngine, AppError> {
    config.validate()?;

    let catalog = SpotifyClient::new(config.spotify.clone(), config.pipeline.default_market.clone())?;

    Ok(RecommendationEngine::new(
        Arc::new(catalog),
        Arc::new(KeywordIntentParser::new()),
        Arc::new(DefaultExplainer::new(config.pipeline.default_match_score)),
        config.pipeline.clone(),
    ))
}
