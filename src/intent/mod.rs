//! Structured representation of a listening request.
//!
//! Everything downstream of parsing consumes [`Intent`] only; free text is
//! never re-inspected after [`Intent::normalized`] has run.

pub mod keywords;

pub use keywords::KeywordIntentParser;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A mood tag. Known moods drive filtering; anything else is carried through
/// verbatim for query construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Mood {
    Slow,
    Energetic,
    Sad,
    Happy,
    Chill,
    Other(String),
}

impl Mood {
    /// Canonicalize a free-form mood tag, folding English/Turkish synonyms.
    pub fn parse(tag: &str) -> Mood {
        let tag = tag.trim().to_lowercase();
        match tag.as_str() {
            "slow" | "yavaş" | "yavas" | "sakin" | "ballad" | "calm" => Mood::Slow,
            "energetic" | "enerjik" | "hızlı" | "hizli" | "dans" | "hareketli" | "upbeat"
            | "party" => Mood::Energetic,
            "sad" | "hüzünlü" | "huzunlu" | "melankolik" | "melancholic" => Mood::Sad,
            "happy" | "mutlu" | "neşeli" | "neseli" => Mood::Happy,
            "chill" | "relaxed" | "rahat" => Mood::Chill,
            _ => Mood::Other(tag),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Mood::Slow => "slow",
            Mood::Energetic => "energetic",
            Mood::Sad => "sad",
            Mood::Happy => "happy",
            Mood::Chill => "chill",
            Mood::Other(tag) => tag,
        }
    }
}

impl From<String> for Mood {
    fn from(s: String) -> Self {
        Mood::parse(&s)
    }
}

impl From<Mood> for String {
    fn from(m: Mood) -> Self {
        m.as_str().to_string()
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Requested output language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "tr")]
    Turkish,
    #[serde(rename = "en")]
    English,
    #[default]
    #[serde(rename = "mixed", other)]
    Mixed,
}

impl Language {
    /// Word appended to keyword queries to bias them towards the language.
    pub fn query_term(&self) -> &'static str {
        match self {
            Language::Turkish => "türkçe",
            Language::English => "eng",
            Language::Mixed => "",
        }
    }
}

/// Language the request itself was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PromptLanguage {
    #[serde(rename = "tr")]
    Turkish,
    #[serde(rename = "en")]
    English,
    #[serde(rename = "other", other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Intent {
    /// First entry is the primary mood
    pub moods: Vec<Mood>,
    #[serde(alias = "explicitGenres")]
    pub explicit_genres: Vec<String>,
    /// Priority order for the diversity quota
    #[serde(alias = "explicitArtists")]
    pub explicit_artists: Vec<String>,
    pub language: Language,
    #[serde(alias = "promptLanguage")]
    pub prompt_language: Option<PromptLanguage>,
}

impl Intent {
    pub fn primary_mood(&self) -> Option<&Mood> {
        self.moods.first()
    }

    pub fn has_mood(&self, mood: &Mood) -> bool {
        self.moods.contains(mood)
    }

    pub fn is_slow(&self) -> bool {
        self.has_mood(&Mood::Slow)
    }

    /// Language after resolving `mixed` against the prompt language.
    ///
    /// A mixed request written in Turkish is treated as Turkish; one with no
    /// detected prompt language leans English; anything else stays mixed.
    pub fn effective_language(&self) -> Language {
        match self.language {
            Language::Mixed => match self.prompt_language {
                Some(PromptLanguage::Turkish) => Language::Turkish,
                Some(PromptLanguage::English) | None => Language::English,
                Some(PromptLanguage::Other) => Language::Mixed,
            },
            lang => lang,
        }
    }

    /// Lowercased explicit artists, in request order.
    pub fn requested_artist_keys(&self) -> Vec<String> {
        self.explicit_artists
            .iter()
            .map(|a| a.trim().to_lowercase())
            .filter(|a| !a.is_empty())
            .collect()
    }

    /// Catalog market to bias results towards.
    pub fn market(&self, default_market: Option<&str>) -> Option<String> {
        match self.effective_language() {
            Language::Turkish => Some("TR".to_string()),
            _ => default_market.map(|m| m.to_string()),
        }
    }

    /// Canonical form: trimmed tags, folded mood synonyms, no empties, no
    /// duplicate artists (compared case-insensitively, first spelling kept).
    pub fn normalized(self) -> Intent {
        let mut moods: Vec<Mood> = Vec::new();
        for mood in self.moods {
            let mood = Mood::parse(mood.as_str());
            if mood.as_str().is_empty() || moods.contains(&mood) {
                continue;
            }
            moods.push(mood);
        }

        let mut explicit_genres: Vec<String> = Vec::new();
        for genre in self.explicit_genres {
            let genre = genre.trim().to_lowercase();
            if !genre.is_empty() && !explicit_genres.contains(&genre) {
                explicit_genres.push(genre);
            }
        }

        let mut explicit_artists: Vec<String> = Vec::new();
        for artist in self.explicit_artists {
            let artist = artist.trim().to_string();
            if artist.is_empty() {
                continue;
            }
            let key = artist.to_lowercase();
            if explicit_artists.iter().any(|a| a.to_lowercase() == key) {
                continue;
            }
            explicit_artists.push(artist);
        }

        Intent {
            moods,
            explicit_genres,
            explicit_artists,
            language: self.language,
            prompt_language: self.prompt_language,
        }
    }
}
