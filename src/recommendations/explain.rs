use anyhow::Result;
use async_trait::async_trait;

use super::types::Explanation;
use crate::intent::Intent;
use crate::models::Candidate;
use crate::providers::TrackExplainer;

/// Explainer that always returns the generic copy.
#[derive(Debug, Clone)]
pub struct DefaultExplainer {
    pub default_score: u8,
}

impl DefaultExplainer {
    pub fn new(default_score: u8) -> Self {
        Self { default_score }
    }
}

impl Default for DefaultExplainer {
    fn default() -> Self {
        Self::new(crate::config::PipelineConfig::default().default_match_score)
    }
}

#[async_trait]
impl TrackExplainer for DefaultExplainer {
    async fn explain(&self, tracks: &[Candidate], _intent: &Intent) -> Result<Explanation> {
        Ok(Explanation::fallback(tracks, self.default_score))
    }
}
