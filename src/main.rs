use anyhow::Result;
use clap::Parser;
use vibetune_lib::config::VibeConfig;
use vibetune_lib::recommendations::RecommendationError;

#[derive(Parser, Debug)]
#[command(name = "vibetune")]
#[command(about = "Mood-driven track selection over the Spotify catalog")]
#[command(version)]
struct Cli {
    /// Profile an existing playlist instead of building a slate
    #[arg(long, value_name = "LINK", conflicts_with = "request")]
    playlist: Option<String>,

    /// Free-text description of the vibe
    #[arg(required_unless_present = "playlist")]
    request: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = VibeConfig::load()?;
    let engine = vibetune_lib::build_engine(&config)?;

    let output = match cli.playlist {
        Some(link) => serde_json::to_string_pretty(&engine.analyze_playlist(&link).await?)?,
        None => match engine.recommend(&cli.request.join(" ")).await {
            Ok(recommendations) => serde_json::to_string_pretty(&recommendations)?,
            Err(err @ RecommendationError::NoResults(_)) => {
                log::warn!("{}", err);
                serde_json::to_string_pretty(&err)?
            }
            Err(err) => return Err(err.into()),
        },
    };

    println!("{}", output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_words_are_collected() {
        let cli = Cli::try_parse_from(["vibetune", "Tarkan", "gibi", "slow", "şarkılar"]).unwrap();
        assert_eq!(cli.request.join(" "), "Tarkan gibi slow şarkılar");
        assert!(cli.playlist.is_none());
    }

    #[test]
    fn test_playlist_flag() {
        let cli = Cli::try_parse_from(["vibetune", "--playlist", "https://open.spotify.com/playlist/abc"])
            .unwrap();
        assert_eq!(cli.playlist.as_deref(), Some("https://open.spotify.com/playlist/abc"));
        assert!(cli.request.is_empty());
    }

    #[test]
    fn test_rejects_missing_or_conflicting_input() {
        assert!(Cli::try_parse_from(["vibetune"]).is_err());
        assert!(Cli::try_parse_from(["vibetune", "--playlist"]).is_err());
        assert!(Cli::try_parse_from(["vibetune", "--playlist", "abc", "sad", "songs"]).is_err());
    }

    #[test]
    fn test_help_is_not_a_request() {
        let err = Cli::try_parse_from(["vibetune", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
