use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::AppError;

pub const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";
pub const SPOTIFY_ACCOUNTS_URL: &str = "https://accounts.spotify.com/api/token";
pub const REQUEST_TIMEOUT_SECONDS: u64 = 10;
/// Tokens are treated as expired this long before the server says so.
pub const TOKEN_EXPIRY_MARGIN_SECONDS: u64 = 60;
pub const AUDIO_FEATURES_CHUNK: usize = 100;

pub fn get_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vibetune")
}

pub fn get_config_file_path() -> PathBuf {
    get_config_dir().join("config.json")
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub api_base: String,
    pub accounts_url: String,
    pub request_timeout_secs: u64,
    /// Page size for search calls
    pub search_limit: u32,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            api_base: SPOTIFY_API_BASE.to_string(),
            accounts_url: SPOTIFY_ACCOUNTS_URL.to_string(),
            request_timeout_secs: REQUEST_TIMEOUT_SECONDS,
            search_limit: 20,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Final slate length
    pub slate_size: usize,
    /// Slots reserved for explicitly requested artists
    pub priority_quota: usize,
    pub max_search_queries: usize,
    pub playlist_mining_limit: usize,
    /// Below this many strict survivors a slow request is retried relaxed
    pub relax_threshold: usize,
    pub default_market: Option<String>,
    /// Fixed seed for shuffles; `None` draws from the OS
    pub shuffle_seed: Option<u64>,
    pub default_match_score: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            slate_size: 15,
            priority_quota: 6,
            max_search_queries: 15,
            playlist_mining_limit: 3,
            relax_threshold: 5,
            default_market: Some("TR".to_string()),
            shuffle_seed: None,
            default_match_score: 90,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VibeConfig {
    pub spotify: SpotifyConfig,
    pub pipeline: PipelineConfig,
}

impl VibeConfig {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self, AppError> {
        let mut config = Self::load_from(&get_config_file_path())?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path)?;
        let config: VibeConfig = serde_json::from_str(&text).map_err(|e| {
            AppError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(id) = lookup("SPOTIFY_CLIENT_ID") {
            self.spotify.client_id = id;
        }
        if let Some(secret) = lookup("SPOTIFY_CLIENT_SECRET") {
            self.spotify.client_secret = secret;
        }
        if let Some(market) = lookup("VIBETUNE_MARKET") {
            self.pipeline.default_market = if market.trim().is_empty() {
                None
            } else {
                Some(market.trim().to_uppercase())
            };
        }
        if let Some(seed) = lookup("VIBETUNE_SEED") {
            match seed.parse::<u64>() {
                Ok(s) => self.pipeline.shuffle_seed = Some(s),
                Err(_) => log::warn!("Ignoring non-numeric VIBETUNE_SEED '{}'", seed),
            }
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.spotify.client_id.is_empty() || self.spotify.client_secret.is_empty() {
            return Err(AppError::Config(
                "Spotify client credentials are missing (set SPOTIFY_CLIENT_ID / SPOTIFY_CLIENT_SECRET)"
                    .to_string(),
            ));
        }
        if self.pipeline.priority_quota > self.pipeline.slate_size {
            return Err(AppError::Config(format!(
                "priority_quota ({}) exceeds slate_size ({})",
                self.pipeline.priority_quota, self.pipeline.slate_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: VibeConfig =
            serde_json::from_str(r#"{ "pipeline": { "slate_size": 10 } }"#).unwrap();
        assert_eq!(config.pipeline.slate_size, 10);
        assert_eq!(config.pipeline.priority_quota, 6);
        assert_eq!(config.spotify.api_base, SPOTIFY_API_BASE);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("SPOTIFY_CLIENT_ID", "id"),
            ("SPOTIFY_CLIENT_SECRET", "secret"),
            ("VIBETUNE_MARKET", "us"),
            ("VIBETUNE_SEED", "42"),
        ]
        .into_iter()
        .collect();

        let mut config = VibeConfig::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.spotify.client_id, "id");
        assert_eq!(config.pipeline.default_market.as_deref(), Some("US"));
        assert_eq!(config.pipeline.shuffle_seed, Some(42));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_credentials_fail_validation() {
        assert!(matches!(
            VibeConfig::default().validate(),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = VibeConfig::load_from(Path::new("/nonexistent/vibetune.json")).unwrap();
        assert_eq!(config.pipeline.slate_size, 15);
    }
}
