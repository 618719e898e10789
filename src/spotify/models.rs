use serde::{Deserialize, Serialize};

/// Client-credentials token response from the accounts service.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

/// Error types for Spotify operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SpotifyError {
    InvalidUrl(String),
    NetworkError(String),
    ParseError(String),
    ApiError(String),
    Auth(String),
    RateLimited,
}

impl std::fmt::Display for SpotifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpotifyError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            SpotifyError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            SpotifyError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            SpotifyError::ApiError(msg) => write!(f, "API error: {}", msg),
            SpotifyError::Auth(msg) => write!(f, "Authentication failed: {}", msg),
            SpotifyError::RateLimited => write!(f, "Rate limited by Spotify"),
        }
    }
}

impl std::error::Error for SpotifyError {}

impl From<reqwest::Error> for SpotifyError {
    fn from(err: reqwest::Error) -> Self {
        SpotifyError::NetworkError(err.to_string())
    }
}

impl From<serde_json::Error> for SpotifyError {
    fn from(err: serde_json::Error) -> Self {
        SpotifyError::ParseError(err.to_string())
    }
}
