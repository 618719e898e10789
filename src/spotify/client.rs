use async_trait::async_trait;
use futures_util::future::join_all;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use super::auth::TokenCache;
use super::models::SpotifyError;
use crate::config::{SpotifyConfig, AUDIO_FEATURES_CHUNK};
use crate::models::{ArtistRef, AudioFeatures, PlaylistRef, RecommendationParams, Track};
use crate::providers::traits::CatalogProvider;

/// Market used for endpoints that require one when the caller has none.
const FALLBACK_MARKET: &str = "US";
const RECOMMENDATION_LIMIT: &str = "50";
const PLAYLIST_PAGE_LIMIT: &str = "50";

pub struct SpotifyClient {
    http: Client,
    config: SpotifyConfig,
    auth: TokenCache,
    default_market: Option<String>,
}

impl SpotifyClient {
    pub fn new(config: SpotifyConfig, default_market: Option<String>) -> Result<Self, SpotifyError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("vibetune/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let auth = TokenCache::new(&config.client_id, &config.client_secret, &config.accounts_url);

        Ok(Self {
            http,
            config,
            auth,
            default_market,
        })
    }

    /// Extract playlist ID from various Spotify URL formats
    pub fn extract_playlist_id(url_or_id: &str) -> Result<String, SpotifyError> {
        let trimmed = url_or_id.trim();

        if let Some(id) = trimmed.strip_prefix("spotify:playlist:") {
            return Self::validate_id(id, url_or_id);
        }

        if trimmed.contains("spotify.com/playlist/") {
            if let Some(id_part) = trimmed.split("/playlist/").nth(1) {
                let id = id_part
                    .split(['?', '/', '#'])
                    .next()
                    .unwrap_or(id_part);
                return Self::validate_id(id, url_or_id);
            }
        }

        if trimmed.contains("spotify.link/") {
            return Err(SpotifyError::InvalidUrl(
                "Share links are not supported. Please use the full playlist URL.".to_string(),
            ));
        }

        if trimmed.len() == 22 && trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Ok(trimmed.to_string());
        }

        Err(SpotifyError::InvalidUrl(format!(
            "Could not extract playlist ID from: {}",
            url_or_id
        )))
    }

    fn validate_id(id: &str, original: &str) -> Result<String, SpotifyError> {
        if !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric()) {
            Ok(id.to_string())
        } else {
            Err(SpotifyError::InvalidUrl(format!(
                "Malformed playlist ID in: {}",
                original
            )))
        }
    }

    fn market<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .or(self.default_market.as_deref())
            .unwrap_or(FALLBACK_MARKET)
    }

    async fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<Value, SpotifyError> {
        let token = self.auth.bearer(&self.http).await?;
        let url = format!("{}{}", self.config.api_base.trim_end_matches('/'), path);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.auth.invalidate().await;
            return Err(SpotifyError::Auth(format!("401 at {}", path)));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SpotifyError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SpotifyError::ApiError(format!("HTTP {} at {} - {}", status, path, text)));
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Run a request and degrade any failure to `None` with a warning.
    async fn fetch(&self, operation: &str, path: &str, params: &[(&str, String)]) -> Option<Value> {
        match self.get_json(path, params).await {
            Ok(data) => Some(data),
            Err(e) => {
                log::warn!("Spotify {} failed: {}", operation, e);
                None
            }
        }
    }

    pub(crate) fn parse_track(item: &Value) -> Option<Track> {
        let id = item.get("id")?.as_str()?.to_string();
        let name = item.get("name")?.as_str()?.to_string();

        let artists: Vec<String> = item
            .get("artists")
            .and_then(|a| a.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|a| a.get("name")?.as_str())
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default();

        let album_art = item
            .get("album")
            .and_then(|a| a.get("images"))
            .and_then(|i| i.as_array())
            .and_then(|arr| arr.first())
            .and_then(|img| img.get("url"))
            .and_then(|u| u.as_str())
            .map(|s| s.to_string());

        let external_url = item
            .get("external_urls")
            .and_then(|e| e.get("spotify"))
            .and_then(|u| u.as_str())
            .map(|s| s.to_string());

        let uri = item
            .get("uri")
            .and_then(|u| u.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("spotify:track:{}", id));

        let popularity = item
            .get("popularity")
            .and_then(|p| p.as_u64())
            .map(|p| p as u32);

        Some(Track {
            id,
            name,
            artists,
            album_art,
            external_url,
            uri,
            popularity,
        })
    }

    fn parse_track_array(items: Option<&Value>) -> Vec<Track> {
        items
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(Self::parse_track).collect())
            .unwrap_or_default()
    }

    pub(crate) fn parse_search_tracks(data: &Value) -> Vec<Track> {
        Self::parse_track_array(data.get("tracks").and_then(|t| t.get("items")))
    }

    pub(crate) fn parse_playlist_items(data: &Value) -> Vec<Track> {
        data.get("items")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|item| item.get("track"))
                    .filter(|track| track.get("type").and_then(|t| t.as_str()) != Some("episode"))
                    .filter_map(Self::parse_track)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn parse_artists(data: &Value) -> Vec<ArtistRef> {
        data.get("artists")
            .and_then(|a| a.get("items"))
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|a| {
                        Some(ArtistRef {
                            id: a.get("id")?.as_str()?.to_string(),
                            name: a.get("name")?.as_str()?.to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Prefer an exact (case-insensitive) name match, else the top result.
    pub(crate) fn pick_artist(name: &str, mut artists: Vec<ArtistRef>) -> Option<ArtistRef> {
        let wanted = name.trim().to_lowercase();
        if let Some(pos) = artists.iter().position(|a| a.name.to_lowercase() == wanted) {
            return Some(artists.swap_remove(pos));
        }
        artists.into_iter().next()
    }

    pub(crate) fn parse_playlists(data: &Value) -> Vec<PlaylistRef> {
        data.get("playlists")
            .and_then(|p| p.get("items"))
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter(|p| !p.is_null())
                    .filter_map(|p| {
                        Some(PlaylistRef {
                            id: p.get("id")?.as_str()?.to_string(),
                            name: p.get("name").and_then(|n| n.as_str()).unwrap_or("").to_string(),
                            track_count: p
                                .get("tracks")
                                .and_then(|t| t.get("total"))
                                .and_then(|t| t.as_u64())
                                .map(|t| t as u32),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn parse_audio_features(data: &Value) -> HashMap<String, AudioFeatures> {
        let mut map = HashMap::new();
        let Some(entries) = data.get("audio_features").and_then(|v| v.as_array()) else {
            return map;
        };

        for entry in entries.iter().filter(|e| !e.is_null()) {
            let number = |key: &str| entry.get(key).and_then(|v| v.as_f64()).map(|v| v as f32);
            let (Some(id), Some(energy), Some(danceability), Some(valence), Some(instrumentalness), Some(tempo)) = (
                entry.get("id").and_then(|v| v.as_str()),
                number("energy"),
                number("danceability"),
                number("valence"),
                number("instrumentalness"),
                number("tempo"),
            ) else {
                continue;
            };

            map.insert(
                id.to_string(),
                AudioFeatures {
                    energy,
                    danceability,
                    valence,
                    instrumentalness,
                    tempo,
                },
            );
        }
        map
    }

    pub(crate) fn recommendation_query(params: &RecommendationParams) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("seed_genres", params.seed_genres.join(",")),
            ("limit", RECOMMENDATION_LIMIT.to_string()),
        ];
        let numeric = [
            ("target_energy", params.target_energy),
            ("min_energy", params.min_energy),
            ("max_energy", params.max_energy),
            ("target_tempo", params.target_tempo),
            ("max_tempo", params.max_tempo),
        ];
        for (key, value) in numeric {
            if let Some(v) = value {
                query.push((key, v.to_string()));
            }
        }
        if let Some(market) = &params.market {
            query.push(("market", market.clone()));
        }
        query
    }
}

#[async_trait]
impl CatalogProvider for SpotifyClient {
    fn id(&self) -> &str {
        "spotify"
    }

    async fn search(&self, query: &str, market: Option<&str>) -> Vec<Track> {
        let mut params = vec![
            ("q", query.to_string()),
            ("type", "track".to_string()),
            ("limit", self.config.search_limit.to_string()),
        ];
        if let Some(m) = market {
            params.push(("market", m.to_string()));
        }

        let tracks = self
            .fetch("search", "/search", &params)
            .await
            .map(|data| Self::parse_search_tracks(&data))
            .unwrap_or_default();
        log::debug!("Search '{}' returned {} tracks", query, tracks.len());
        tracks
    }

    async fn search_artist(&self, name: &str) -> Option<ArtistRef> {
        let params = [
            ("q", name.to_string()),
            ("type", "artist".to_string()),
            ("limit", "5".to_string()),
        ];
        let data = self.fetch("artist search", "/search", &params).await?;
        let artist = Self::pick_artist(name, Self::parse_artists(&data));
        if artist.is_none() {
            log::debug!("No artist found for '{}'", name);
        }
        artist
    }

    async fn artist_top_tracks(&self, artist_id: &str, market: Option<&str>) -> Vec<Track> {
        let params = [("market", self.market(market).to_string())];
        let path = format!("/artists/{}/top-tracks", artist_id);
        self.fetch("artist top tracks", &path, &params)
            .await
            .map(|data| Self::parse_track_array(data.get("tracks")))
            .unwrap_or_default()
    }

    async fn playlist_tracks(&self, playlist_id: &str) -> Vec<Track> {
        let params = [("limit", PLAYLIST_PAGE_LIMIT.to_string())];
        let path = format!("/playlists/{}/tracks", playlist_id);
        self.fetch("playlist tracks", &path, &params)
            .await
            .map(|data| Self::parse_playlist_items(&data))
            .unwrap_or_default()
    }

    async fn search_playlists(&self, query: &str, limit: usize) -> Vec<PlaylistRef> {
        let params = [
            ("q", query.to_string()),
            ("type", "playlist".to_string()),
            ("limit", limit.max(1).to_string()),
        ];
        let mut playlists = self
            .fetch("playlist search", "/search", &params)
            .await
            .map(|data| Self::parse_playlists(&data))
            .unwrap_or_default();
        playlists.truncate(limit);
        playlists
    }

    async fn recommendations(&self, params: &RecommendationParams) -> Vec<Track> {
        let query = Self::recommendation_query(params);
        self.fetch("recommendations", "/recommendations", &query)
            .await
            .map(|data| Self::parse_track_array(data.get("tracks")))
            .unwrap_or_default()
    }

    async fn audio_features(&self, ids: &[String]) -> HashMap<String, AudioFeatures> {
        let requests = ids.chunks(AUDIO_FEATURES_CHUNK).map(|chunk| async move {
            let params = [("ids", chunk.join(","))];
            self.fetch("audio features", "/audio-features", &params)
                .await
                .map(|data| Self::parse_audio_features(&data))
                .unwrap_or_default()
        });

        let mut features = HashMap::new();
        for chunk in join_all(requests).await {
            features.extend(chunk);
        }
        log::debug!("Audio features: {}/{} ids covered", features.len(), ids.len());
        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn track_json(id: &str, name: &str, artists: &[&str]) -> Value {
        json!({
            "id": id,
            "name": name,
            "uri": format!("spotify:track:{}", id),
            "popularity": 55,
            "artists": artists.iter().map(|a| json!({ "name": a })).collect::<Vec<_>>(),
            "album": { "images": [{ "url": "https://i.scdn.co/image/abc" }] },
            "external_urls": { "spotify": format!("https://open.spotify.com/track/{}", id) }
        })
    }

    #[test]
    fn test_market_prefers_requested_then_default() {
        let client = SpotifyClient::new(SpotifyConfig::default(), Some("DE".to_string())).unwrap();
        assert_eq!(client.market(Some("TR")), "TR");
        assert_eq!(client.market(None), "DE");

        let client = SpotifyClient::new(SpotifyConfig::default(), None).unwrap();
        assert_eq!(client.market(None), FALLBACK_MARKET);
    }

    #[test]
    fn test_extract_playlist_id_formats() {
        let id = "37i9dQZF1DXcBWIGoYBM5M";
        for input in [
            format!("https://open.spotify.com/playlist/{}", id),
            format!("https://open.spotify.com/playlist/{}?si=abc123", id),
            format!("spotify:playlist:{}", id),
            id.to_string(),
        ] {
            assert_eq!(SpotifyClient::extract_playlist_id(&input).unwrap(), id);
        }
    }

    #[test]
    fn test_extract_playlist_id_rejects_garbage() {
        assert!(SpotifyClient::extract_playlist_id("https://spotify.link/xyz").is_err());
        assert!(SpotifyClient::extract_playlist_id("not a playlist").is_err());
        assert!(SpotifyClient::extract_playlist_id("spotify:playlist:").is_err());
    }

    #[test]
    fn test_parse_search_tracks() {
        let data = json!({
            "tracks": { "items": [
                track_json("a1", "Gülümse", &["Sezen Aksu"]),
                { "id": null, "name": "local file" },
                track_json("a2", "Dudu", &["Tarkan", "Ozan"])
            ]}
        });

        let tracks = SpotifyClient::parse_search_tracks(&data);
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].name, "Gülümse");
        assert_eq!(tracks[0].album_art.as_deref(), Some("https://i.scdn.co/image/abc"));
        assert_eq!(tracks[1].artists, vec!["Tarkan".to_string(), "Ozan".to_string()]);
        assert_eq!(tracks[1].popularity, Some(55));
    }

    #[test]
    fn test_parse_playlist_items_skips_null_and_episodes() {
        let mut episode = track_json("e1", "Podcast", &["Host"]);
        episode["type"] = json!("episode");
        let data = json!({
            "items": [
                { "track": track_json("p1", "Ben Bazen", &["Sezen Aksu"]) },
                { "track": null },
                { "track": episode }
            ]
        });

        let tracks = SpotifyClient::parse_playlist_items(&data);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].id, "p1");
    }

    #[test]
    fn test_pick_artist_prefers_exact_match() {
        let data = json!({ "artists": { "items": [
            { "id": "x", "name": "Tarkan Tevetoğlu Tribute" },
            { "id": "y", "name": "tarkan" }
        ]}});
        let picked = SpotifyClient::pick_artist("Tarkan", SpotifyClient::parse_artists(&data)).unwrap();
        assert_eq!(picked.id, "y");

        let picked = SpotifyClient::pick_artist("Unknown", SpotifyClient::parse_artists(&data)).unwrap();
        assert_eq!(picked.id, "x");

        assert!(SpotifyClient::pick_artist("any", Vec::new()).is_none());
    }

    #[test]
    fn test_parse_playlists_skips_null_entries() {
        let data = json!({ "playlists": { "items": [
            null,
            { "id": "pl1", "name": "Türkçe Slow", "tracks": { "total": 80 } }
        ]}});
        let playlists = SpotifyClient::parse_playlists(&data);
        assert_eq!(playlists.len(), 1);
        assert_eq!(playlists[0].track_count, Some(80));
    }

    #[test]
    fn test_parse_audio_features_skips_missing() {
        let data = json!({ "audio_features": [
            { "id": "a", "energy": 0.3, "danceability": 0.4, "valence": 0.2, "instrumentalness": 0.0, "tempo": 90.0 },
            null,
            { "id": "b", "energy": 0.9 }
        ]});
        let map = SpotifyClient::parse_audio_features(&data);
        assert_eq!(map.len(), 1);
        assert!((map["a"].tempo - 90.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_recommendation_query_includes_only_set_fields() {
        let params = RecommendationParams {
            seed_genres: vec!["pop".into(), "acoustic".into()],
            target_energy: Some(0.3),
            max_tempo: Some(120.0),
            market: Some("TR".into()),
            ..Default::default()
        };
        let query = SpotifyClient::recommendation_query(&params);

        assert!(query.contains(&("seed_genres", "pop,acoustic".to_string())));
        assert!(query.contains(&("target_energy", "0.3".to_string())));
        assert!(query.contains(&("max_tempo", "120".to_string())));
        assert!(query.contains(&("market", "TR".to_string())));
        assert!(!query.iter().any(|(k, _)| *k == "min_energy"));
    }
}
