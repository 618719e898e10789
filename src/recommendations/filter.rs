//! Hard filters over the candidate pool.
//!
//! Filtering is a pure function of (candidates, features, intent): the
//! output is always a subset of the input in its original order.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use super::types::FilterStats;
use crate::intent::{Intent, Mood};
use crate::models::{AudioFeatures, Candidate};
use crate::providers::TrustLevel;

/// Primary artists whose catalog leans rap/drill; excluded from slow slates.
const RAP_BLACKLIST: &[&str] = &[
    "uzi", "çakal", "cakal", "lvbel c5", "motive", "ati242", "batuflex", "murda", "ezhel",
    "khontkar", "şehinşah", "ceza", "sagopa", "gazapizm", "ben fero", "mero", "reckol", "sefo",
    "blok3",
];

static UPBEAT_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)remix|club|mix|dance|techno|drill|trap").unwrap());

static SAFE_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)acoustic|akustik|piyano|piano|slow|ballad").unwrap());

const ENERGETIC_MIN_ENERGY: f32 = 0.60;
const SLOW_MAX_DANCEABILITY: f32 = 0.58;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    Strict,
    Relaxed,
}

impl Strictness {
    pub fn max_energy(&self) -> f32 {
        match self {
            Strictness::Strict => 0.45,
            Strictness::Relaxed => 0.50,
        }
    }

    pub fn max_tempo(&self) -> f32 {
        match self {
            Strictness::Strict => 110.0,
            Strictness::Relaxed => 112.0,
        }
    }
}

/// Why a candidate was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Genre,
    /// Features present but outside the mood thresholds
    Audio,
    /// No features and nothing else vouching for the track
    MissingData,
}

/// Any credited artist (featured or joint) matches the rap blacklist.
pub fn is_blacklisted(candidate: &Candidate) -> bool {
    let credit = candidate.artist.to_lowercase();
    RAP_BLACKLIST.iter().any(|bad| credit.contains(bad))
}

/// Whether the full artist credit names a requested artist.
fn credits_requested_artist(candidate: &Candidate, intent: &Intent) -> bool {
    if candidate.is_requested_artist {
        return true;
    }
    let credit = candidate.artist.to_lowercase();
    intent
        .requested_artist_keys()
        .iter()
        .any(|key| credit.contains(key.as_str()))
}

/// Blacklist and title check; applies to slow requests only.
fn genre_check(candidate: &Candidate, intent: &Intent) -> Result<(), Rejection> {
    if !intent.is_slow() || credits_requested_artist(candidate, intent) {
        return Ok(());
    }
    if is_blacklisted(candidate) || UPBEAT_TITLE.is_match(&candidate.name) {
        return Err(Rejection::Genre);
    }
    Ok(())
}

/// Acceptance when no features exist: requested artist, then a vetted
/// source, then a title that reads as soft.
fn missing_features_check(candidate: &Candidate) -> Result<(), Rejection> {
    let trust = if candidate.is_requested_artist {
        TrustLevel::Requested
    } else {
        candidate.source.trust()
    };

    if trust >= TrustLevel::Vetted || SAFE_TITLE.is_match(&candidate.name) {
        Ok(())
    } else {
        Err(Rejection::MissingData)
    }
}

fn audio_check(
    candidate: &Candidate,
    features: Option<&AudioFeatures>,
    intent: &Intent,
    strictness: Strictness,
) -> Result<(), Rejection> {
    let Some(f) = features else {
        return missing_features_check(candidate);
    };

    if intent.is_slow()
        && (f.energy > strictness.max_energy()
            || f.tempo > strictness.max_tempo()
            || f.danceability > SLOW_MAX_DANCEABILITY)
    {
        return Err(Rejection::Audio);
    }
    if intent.has_mood(&Mood::Energetic) && f.energy < ENERGETIC_MIN_ENERGY {
        return Err(Rejection::Audio);
    }
    Ok(())
}

/// Verdict for a single candidate at the given strictness.
pub fn evaluate(
    candidate: &Candidate,
    features: Option<&AudioFeatures>,
    intent: &Intent,
    strictness: Strictness,
) -> Result<(), Rejection> {
    genre_check(candidate, intent)?;
    audio_check(candidate, features, intent, strictness)
}

/// One pass over the pool, tallying rejections into `stats`.
pub fn apply(
    candidates: &[Candidate],
    features: &HashMap<String, AudioFeatures>,
    intent: &Intent,
    strictness: Strictness,
    stats: &mut FilterStats,
) -> Vec<Candidate> {
    let mut passed = Vec::new();
    for candidate in candidates {
        match evaluate(candidate, features.get(&candidate.id), intent, strictness) {
            Ok(()) => passed.push(candidate.clone()),
            Err(Rejection::Genre) => stats.genre_filtered += 1,
            Err(Rejection::Audio) => stats.audio_filtered += 1,
            Err(Rejection::MissingData) => stats.missing_rejected += 1,
        }
    }
    passed
}

/// Strict pass, retried relaxed for slow requests that come up short.
///
/// Rejection counters reflect the strict pass only; the relaxed result, when
/// used, replaces the strict one.
pub fn filter_candidates(
    candidates: &[Candidate],
    features: &HashMap<String, AudioFeatures>,
    intent: &Intent,
    relax_threshold: usize,
) -> (Vec<Candidate>, FilterStats) {
    let mut stats = FilterStats {
        total: candidates.len(),
        audio_missing: candidates
            .iter()
            .filter(|c| !features.contains_key(&c.id))
            .count(),
        ..Default::default()
    };

    let strict = apply(candidates, features, intent, Strictness::Strict, &mut stats);
    stats.passed_strict = strict.len();

    if !intent.is_slow() || strict.len() >= relax_threshold {
        log::info!("Filter: {}/{} passed strict", strict.len(), stats.total);
        return (strict, stats);
    }

    let mut scratch = FilterStats::default();
    let relaxed = apply(candidates, features, intent, Strictness::Relaxed, &mut scratch);
    stats.passed_relaxed = relaxed.len();
    log::info!(
        "Filter: only {} passed strict, relaxed pass kept {}/{}",
        stats.passed_strict,
        relaxed.len(),
        stats.total
    );
    (relaxed, stats)
}
