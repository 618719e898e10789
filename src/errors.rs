use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid playlist link: {0}")]
    InvalidPlaylist(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<crate::spotify::SpotifyError> for AppError {
    fn from(e: crate::spotify::SpotifyError) -> Self {
        use crate::spotify::SpotifyError;
        match e {
            SpotifyError::InvalidUrl(msg) => AppError::InvalidPlaylist(msg),
            SpotifyError::Auth(msg) => AppError::Auth(msg),
            other => AppError::Network(other.to_string()),
        }
    }
}
