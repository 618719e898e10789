//! Candidate pool assembly.
//!
//! Four independent channels (keyword search, the feature-targeted
//! recommender, playlist mining and requested-artist top tracks) are queried
//! concurrently, then merged in a fixed order so that the first occurrence of
//! a recording always wins.

use futures_util::future::join_all;
use std::collections::HashSet;

use crate::config::PipelineConfig;
use crate::intent::{Intent, Language, Mood};
use crate::models::{Candidate, RecommendationParams, Track};
use crate::providers::{CatalogProvider, Provenance};

/// Curated queries issued for slow Turkish requests.
const TURKISH_SLOW_BANK: [&str; 7] = [
    "türkçe slow hits",
    "türkçe damar",
    "türkçe duygusal",
    "türkçe akustik",
    "türkçe piyano",
    "sakin türkçe",
    "aşk şarkıları türkçe",
];

const DEFAULT_GENRE: &str = "pop";
const GENERAL_MOOD: &str = "general";

/// Keyword queries for an intent, deduplicated and capped.
///
/// Explicit artists get an `artist:` query each; they are appended last so
/// the cap trims artist queries before mood queries.
pub fn build_search_queries(intent: &Intent, max_queries: usize) -> Vec<String> {
    let language = intent.effective_language();
    let term = language.query_term();
    let mood = intent
        .primary_mood()
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| GENERAL_MOOD.to_string());

    let mut queries: Vec<String> = Vec::new();

    if language == Language::Turkish && intent.is_slow() {
        queries.extend(TURKISH_SLOW_BANK.iter().map(|q| q.to_string()));
    }

    let genres: Vec<&str> = if intent.explicit_genres.is_empty() {
        vec![DEFAULT_GENRE]
    } else {
        intent.explicit_genres.iter().map(|g| g.as_str()).collect()
    };

    for genre in genres {
        if language == Language::Turkish {
            queries.push(format!("{} {} {}", term, genre, mood));
            queries.push(format!("yerli {} {}", genre, mood));
            queries.push(format!("türkçe {}", genre));
        } else {
            queries.push(format!("{} {} {}", term, genre, mood).trim().to_string());
            queries.push(format!("{} {}", genre, mood));
        }
    }

    for artist in &intent.explicit_artists {
        queries.push(format!("artist:{}", artist));
    }

    let mut seen = HashSet::new();
    queries.retain(|q| seen.insert(q.to_lowercase()));
    queries.truncate(max_queries);
    queries
}

/// Recommender request for the primary mood, if it has a feature profile.
pub fn recommendation_params(intent: &Intent, market: Option<String>) -> Option<RecommendationParams> {
    let turkish = intent.effective_language() == Language::Turkish;
    let seeds = |rest: [&str; 2]| -> Vec<String> {
        let mut seeds = Vec::new();
        if turkish {
            seeds.push("turkish".to_string());
        }
        seeds.extend(rest.iter().map(|s| s.to_string()));
        seeds
    };

    match intent.primary_mood()? {
        Mood::Slow => Some(RecommendationParams {
            seed_genres: seeds(["pop", "acoustic"]),
            target_energy: Some(0.3),
            max_energy: Some(0.55),
            target_tempo: Some(100.0),
            max_tempo: Some(120.0),
            market,
            ..Default::default()
        }),
        Mood::Energetic => Some(RecommendationParams {
            seed_genres: seeds(["pop", "dance"]),
            target_energy: Some(0.8),
            min_energy: Some(0.6),
            market,
            ..Default::default()
        }),
        _ => None,
    }
}

/// Playlist title to mine for Turkish requests.
pub fn playlist_query(intent: &Intent) -> Option<&'static str> {
    if intent.effective_language() != Language::Turkish {
        return None;
    }
    if intent.is_slow() {
        Some("Türkçe Slow")
    } else if intent.has_mood(&Mood::Energetic) {
        Some("Türkçe Pop Hareketli")
    } else {
        Some("Türkçe Pop")
    }
}

/// Requested artist whose name matches the candidate's primary artist by
/// substring in either direction. Featured credits do not count.
pub fn requested_artist_match<'a>(candidate: &Candidate, requested: &'a [String]) -> Option<&'a str> {
    let primary = candidate.artist_primary.trim().to_lowercase();
    if primary.is_empty() {
        return None;
    }

    requested
        .iter()
        .find(|key| primary.contains(key.as_str()) || key.contains(primary.as_str()))
        .map(|key| key.as_str())
}

/// Merge channel outputs in order, dropping repeated ids and signatures.
pub fn merge_dedup<I>(channels: I) -> Vec<Candidate>
where
    I: IntoIterator<Item = Vec<Candidate>>,
{
    let mut seen_ids = HashSet::new();
    let mut seen_signatures = HashSet::new();
    let mut pool = Vec::new();

    for candidate in channels.into_iter().flatten() {
        let signature = candidate.signature();
        if seen_ids.contains(&candidate.id) || seen_signatures.contains(&signature) {
            continue;
        }
        seen_ids.insert(candidate.id.clone());
        seen_signatures.insert(signature);
        pool.push(candidate);
    }
    pool
}

/// Mark every candidate credited to a requested artist.
pub fn tag_requested(pool: &mut [Candidate], requested: &[String]) {
    if requested.is_empty() {
        return;
    }
    for candidate in pool.iter_mut() {
        if let Some(key) = requested_artist_match(candidate, requested) {
            candidate.is_requested_artist = true;
            if candidate.explicit_artist_name.is_none() {
                candidate.explicit_artist_name = Some(key.to_string());
            }
        }
    }
}

fn into_candidates(tracks: Vec<Track>, source: Provenance) -> Vec<Candidate> {
    tracks
        .into_iter()
        .map(|t| Candidate::from_track(t, source))
        .collect()
}

pub struct CandidateAggregator<'a> {
    catalog: &'a dyn CatalogProvider,
    config: &'a PipelineConfig,
}

impl<'a> CandidateAggregator<'a> {
    pub fn new(catalog: &'a dyn CatalogProvider, config: &'a PipelineConfig) -> Self {
        Self { catalog, config }
    }

    /// Build the deduplicated, provenance-tagged pool for an intent.
    pub async fn collect(&self, intent: &Intent) -> Vec<Candidate> {
        let market = intent.market(self.config.default_market.as_deref());

        let (searched, recommended, mined, targeted) = tokio::join!(
            self.keyword_search(intent, market.as_deref()),
            self.recommended(intent, market.clone()),
            self.mine_playlists(intent),
            self.artist_targets(intent, market.as_deref()),
        );

        log::info!(
            "Candidate channels: search={}, recommender={}, playlists={}, artists={}",
            searched.len(),
            recommended.len(),
            mined.len(),
            targeted.len()
        );

        let mut pool = merge_dedup([searched, recommended, mined, targeted]);
        tag_requested(&mut pool, &intent.requested_artist_keys());

        log::info!(
            "Candidate pool: {} unique ({} requested-artist)",
            pool.len(),
            pool.iter().filter(|c| c.is_requested_artist).count()
        );
        pool
    }

    async fn keyword_search(&self, intent: &Intent, market: Option<&str>) -> Vec<Candidate> {
        let queries = build_search_queries(intent, self.config.max_search_queries);
        log::debug!("Search queries: {:?}", queries);

        let results = join_all(queries.iter().map(|q| self.catalog.search(q, market))).await;
        results
            .into_iter()
            .flat_map(|tracks| into_candidates(tracks, Provenance::Search))
            .collect()
    }

    async fn recommended(&self, intent: &Intent, market: Option<String>) -> Vec<Candidate> {
        let Some(params) = recommendation_params(intent, market) else {
            return Vec::new();
        };
        into_candidates(self.catalog.recommendations(&params).await, Provenance::Recommender)
    }

    async fn mine_playlists(&self, intent: &Intent) -> Vec<Candidate> {
        let Some(query) = playlist_query(intent) else {
            return Vec::new();
        };

        let mut playlists = self
            .catalog
            .search_playlists(query, self.config.playlist_mining_limit)
            .await;
        playlists.truncate(self.config.playlist_mining_limit);
        log::debug!("Mining {} playlists for '{}'", playlists.len(), query);

        let results = join_all(playlists.iter().map(|p| self.catalog.playlist_tracks(&p.id))).await;
        results
            .into_iter()
            .flat_map(|tracks| into_candidates(tracks, Provenance::PlaylistMining))
            .collect()
    }

    async fn artist_targets(&self, intent: &Intent, market: Option<&str>) -> Vec<Candidate> {
        let lookups = intent.explicit_artists.iter().map(|name| async move {
            let Some(artist) = self.catalog.search_artist(name).await else {
                log::warn!("Requested artist '{}' not found in catalog", name);
                return Vec::new();
            };

            let key = name.trim().to_lowercase();
            into_candidates(
                self.catalog.artist_top_tracks(&artist.id, market).await,
                Provenance::ArtistTarget,
            )
            .into_iter()
            .map(|mut c| {
                c.is_requested_artist = true;
                c.explicit_artist_name = Some(key.clone());
                c
            })
            .collect::<Vec<_>>()
        });

        join_all(lookups).await.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::PromptLanguage;

    fn candidate(id: &str, name: &str, artists: &[&str], source: Provenance) -> Candidate {
        Candidate::from_track(
            Track {
                id: id.to_string(),
                name: name.to_string(),
                artists: artists.iter().map(|a| a.to_string()).collect(),
                album_art: None,
                external_url: None,
                uri: format!("spotify:track:{}", id),
                popularity: None,
            },
            source,
        )
    }

    fn turkish_slow() -> Intent {
        Intent {
            moods: vec![Mood::Slow],
            language: Language::Turkish,
            prompt_language: Some(PromptLanguage::Turkish),
            ..Default::default()
        }
    }

    #[test]
    fn test_turkish_slow_queries_use_bank_and_localized_variants() {
        let queries = build_search_queries(&turkish_slow(), 15);

        assert_eq!(&queries[..7], &TURKISH_SLOW_BANK.map(|q| q.to_string())[..]);
        assert!(queries.contains(&"türkçe pop slow".to_string()));
        assert!(queries.contains(&"yerli pop slow".to_string()));
        assert!(queries.contains(&"türkçe pop".to_string()));
        assert!(!queries.contains(&"pop slow".to_string()));
    }

    #[test]
    fn test_english_queries_include_generic_variant() {
        let intent = Intent {
            moods: vec![Mood::Chill],
            explicit_genres: vec!["indie".into(), "jazz".into()],
            language: Language::English,
            ..Default::default()
        };
        let queries = build_search_queries(&intent, 15);
        assert_eq!(
            queries,
            vec!["eng indie chill", "indie chill", "eng jazz chill", "jazz chill"]
        );
    }

    #[test]
    fn test_queries_are_capped_and_deduped() {
        let mut intent = turkish_slow();
        intent.explicit_artists = (0..20).map(|i| format!("Artist {}", i)).collect();
        let queries = build_search_queries(&intent, 15);
        assert_eq!(queries.len(), 15);

        let intent = Intent {
            explicit_genres: vec!["pop".into(), "pop".into()],
            language: Language::Mixed,
            prompt_language: Some(PromptLanguage::Other),
            ..Default::default()
        };
        assert_eq!(build_search_queries(&intent, 15), vec!["pop general"]);
    }

    #[test]
    fn test_recommendation_params_by_mood() {
        let slow = recommendation_params(&turkish_slow(), Some("TR".into())).unwrap();
        assert_eq!(slow.seed_genres, vec!["turkish", "pop", "acoustic"]);
        assert_eq!(slow.max_energy, Some(0.55));
        assert_eq!(slow.max_tempo, Some(120.0));

        let energetic = Intent {
            moods: vec![Mood::Energetic],
            language: Language::English,
            ..Default::default()
        };
        let params = recommendation_params(&energetic, None).unwrap();
        assert_eq!(params.seed_genres, vec!["pop", "dance"]);
        assert_eq!(params.min_energy, Some(0.6));

        let sad = Intent {
            moods: vec![Mood::Sad, Mood::Slow],
            ..Default::default()
        };
        assert!(recommendation_params(&sad, None).is_none());
    }

    #[test]
    fn test_playlist_query() {
        assert_eq!(playlist_query(&turkish_slow()), Some("Türkçe Slow"));
        let english = Intent {
            moods: vec![Mood::Slow],
            language: Language::English,
            ..Default::default()
        };
        assert_eq!(playlist_query(&english), None);
        let plain = Intent {
            language: Language::Turkish,
            ..Default::default()
        };
        assert_eq!(playlist_query(&plain), Some("Türkçe Pop"));

        let happy_then_energetic = Intent {
            moods: vec![Mood::Happy, Mood::Energetic],
            language: Language::Turkish,
            ..Default::default()
        };
        assert_eq!(playlist_query(&happy_then_energetic), Some("Türkçe Pop Hareketli"));
    }

    #[test]
    fn test_merge_keeps_first_occurrence() {
        let search = vec![
            candidate("1", "Gülümse", &["Sezen Aksu"], Provenance::Search),
            candidate("2", "Kuzu Kuzu", &["Tarkan"], Provenance::Search),
        ];
        let recs = vec![
            candidate("1", "Gülümse", &["Sezen Aksu"], Provenance::Recommender),
            candidate("3", "GÜLÜMSE ", &["sezen aksu"], Provenance::Recommender),
            candidate("4", "Firuze", &["Sezen Aksu"], Provenance::Recommender),
        ];

        let pool = merge_dedup([search, recs]);
        let ids: Vec<&str> = pool.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "4"]);
        assert_eq!(pool[0].source, Provenance::Search);
    }

    #[test]
    fn test_tagging_uses_primary_artist_in_either_direction() {
        let mut pool = vec![
            candidate("1", "A", &["Tarkan"], Provenance::Search),
            candidate("2", "B", &["Tarkan Tevetoğlu"], Provenance::Search),
            candidate("3", "C", &["Sezen"], Provenance::Search),
            candidate("4", "Yolla (Trap Remix)", &["DJ Ozan", "Tarkan"], Provenance::Search),
            candidate("5", "E", &["Teoman"], Provenance::Search),
        ];
        tag_requested(&mut pool, &["tarkan".to_string(), "sezen aksu".to_string()]);

        let tagged: Vec<Option<&str>> = pool.iter().map(|c| c.explicit_artist_name.as_deref()).collect();
        assert_eq!(
            tagged,
            vec![Some("tarkan"), Some("tarkan"), Some("sezen aksu"), None, None]
        );
        assert!(!pool[3].is_requested_artist);
        assert!(!pool[4].is_requested_artist);
    }

    #[test]
    fn test_tagging_keeps_existing_bucket() {
        let mut c = candidate("1", "A", &["Tarkan"], Provenance::ArtistTarget);
        c.is_requested_artist = true;
        c.explicit_artist_name = Some("tarkan tevetoğlu".to_string());
        let mut pool = vec![c];
        tag_requested(&mut pool, &["tarkan".to_string()]);
        assert_eq!(pool[0].explicit_artist_name.as_deref(), Some("tarkan tevetoğlu"));
    }
}
