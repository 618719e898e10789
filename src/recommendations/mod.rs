//! Candidate selection pipeline.
//!
//! Aggregates a pool from the catalog, filters it by mood, then picks a
//! diverse slate with reserved room for requested artists.

pub mod aggregator;
pub mod diversity;
pub mod engine;
pub mod errors;
pub mod explain;
pub mod filter;
pub mod stats;
pub mod types;

pub use engine::RecommendationEngine;
pub use errors::RecommendationError;
pub use explain::DefaultExplainer;
pub use types::{
    CandidateSelection, Explanation, FilterStats, PlaylistVibe, RecommendedTrack, Recommendations,
    VibeStats,
};
