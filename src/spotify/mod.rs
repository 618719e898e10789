pub mod auth;
pub mod client;
pub mod models;

pub use client::SpotifyClient;
pub use models::*;
