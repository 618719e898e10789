//! Offline intent parser built from keyword tables.
//!
//! Used when no generative parser is configured, and as the degraded path
//! when one fails.

use super::{Intent, Language, Mood, PromptLanguage};
use crate::providers::traits::IntentParser;
use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

const MOOD_KEYWORDS: &[(&str, &[&str])] = &[
    ("slow", &["slow", "yavaş", "yavas", "sakin", "ballad", "calm"]),
    ("energetic", &["energetic", "enerjik", "hızlı", "hizli", "dans", "hareketli", "upbeat", "party"]),
    ("sad", &["sad", "hüzünlü", "huzunlu", "melankolik", "melancholic"]),
    ("happy", &["happy", "mutlu", "neşeli", "neseli"]),
    ("chill", &["chill", "relaxed", "rahat"]),
];

const GENRE_KEYWORDS: &[(&str, &[&str])] = &[
    ("pop", &["pop"]),
    ("rock", &["rock"]),
    ("metal", &["metal"]),
    ("jazz", &["jazz", "caz"]),
    ("hip-hop", &["hip hop", "hip-hop", "hiphop"]),
    ("rap", &["rap"]),
    ("r&b", &["r&b", "rnb"]),
    ("electronic", &["electronic", "elektronik", "edm"]),
    ("indie", &["indie"]),
    ("arabesk", &["arabesk"]),
    ("classical", &["classical", "klasik"]),
    ("folk", &["folk", "türkü", "turku"]),
];

static TURKISH_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(türkçe|turkce|turkish|yerli)\b").unwrap());

static ENGLISH_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(ingilizce|english|yabancı|yabanci|foreign)\b").unwrap()
});

static TURKISH_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[şŞıİğĞüÜöÖçÇ]").unwrap());

static TURKISH_STOPWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(ve|bir|için|gibi|şarkı|şarkılar|istiyorum|bana|biraz)\b").unwrap()
});

static ARTIST_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i),|\+|&|\bve\b|\band\b").unwrap());

/// Words that never belong to an artist name.
const FILLER_WORDS: &[&str] = &[
    "i", "want", "some", "songs", "song", "music", "like", "play", "me", "give", "please", "for",
    "the", "a", "an", "with", "by", "from", "tracks", "playlist", "vibe", "mood", "öneri", "öner",
    "şarkı", "şarkılar", "şarkıları", "müzik", "müzikler", "dinle", "gibi", "tarzı", "tarzında",
    "bana", "biraz", "istiyorum", "bir", "için", "türkçe", "turkce", "turkish", "yerli", "ingilizce",
    "english", "yabancı", "yabanci", "foreign",
];

fn is_keyword(word: &str) -> bool {
    let word = word.to_lowercase();
    FILLER_WORDS.contains(&word.as_str())
        || MOOD_KEYWORDS.iter().any(|(_, kws)| kws.contains(&word.as_str()))
        || GENRE_KEYWORDS.iter().any(|(_, kws)| kws.contains(&word.as_str()))
}

type PatternTable = Vec<(&'static str, Regex)>;

/// One case-insensitive alternation per table entry, anchored at a word start.
fn compile_table(table: &'static [(&'static str, &'static [&'static str])]) -> PatternTable {
    table
        .iter()
        .map(|(name, kws)| {
            let alternation: Vec<String> = kws.iter().map(|kw| regex::escape(kw)).collect();
            let pattern = format!(r"(?i)\b(?:{})", alternation.join("|"));
            (*name, Regex::new(&pattern).unwrap())
        })
        .collect()
}

static MOOD_PATTERNS: LazyLock<PatternTable> = LazyLock::new(|| compile_table(MOOD_KEYWORDS));

static GENRE_PATTERNS: LazyLock<PatternTable> = LazyLock::new(|| compile_table(GENRE_KEYWORDS));

/// Table entries hit in `text`, ordered by their earliest occurrence.
fn hits_in_order(text: &str, patterns: &PatternTable) -> Vec<&'static str> {
    let mut hits: Vec<(usize, &'static str)> = patterns
        .iter()
        .filter_map(|(name, re)| re.find(text).map(|m| (m.start(), *name)))
        .collect();
    hits.sort_by_key(|(pos, _)| *pos);
    hits.into_iter().map(|(_, name)| name).collect()
}

pub fn detect_moods(text: &str) -> Vec<Mood> {
    hits_in_order(text, &MOOD_PATTERNS)
        .into_iter()
        .map(Mood::parse)
        .collect()
}

pub fn detect_genres(text: &str) -> Vec<String> {
    hits_in_order(text, &GENRE_PATTERNS)
        .into_iter()
        .map(str::to_string)
        .collect()
}

pub fn detect_language(text: &str) -> Language {
    match (TURKISH_WORDS.is_match(text), ENGLISH_WORDS.is_match(text)) {
        (true, false) => Language::Turkish,
        (false, true) => Language::English,
        _ => Language::Mixed,
    }
}

pub fn detect_prompt_language(text: &str) -> PromptLanguage {
    if TURKISH_CHARS.is_match(text) || TURKISH_STOPWORDS.is_match(text) {
        PromptLanguage::Turkish
    } else if text.chars().any(|c| c.is_ascii_alphabetic()) {
        PromptLanguage::English
    } else {
        PromptLanguage::Other
    }
}

/// Capitalized word runs that survive keyword removal, in order.
///
/// "Tarkan gibi slow şarkılar" → ["Tarkan"]; "Sezen Aksu ve MFÖ" →
/// ["Sezen Aksu", "MFÖ"].
pub fn detect_artists(text: &str) -> Vec<String> {
    let mut artists: Vec<String> = Vec::new();

    for part in ARTIST_SEPARATORS.split(text) {
        let mut run: Vec<&str> = Vec::new();
        let words = part
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|w| !w.is_empty());

        for word in words {
            let capitalized = word.chars().next().is_some_and(|c| c.is_uppercase());
            if capitalized && !is_keyword(word) {
                run.push(word);
                continue;
            }
            if !run.is_empty() {
                artists.push(run.join(" "));
                run.clear();
            }
        }
        if !run.is_empty() {
            artists.push(run.join(" "));
        }
    }

    artists.retain(|a| a.chars().count() >= 2);
    artists
}

#[derive(Debug, Default, Clone)]
pub struct KeywordIntentParser;

impl KeywordIntentParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, text: &str) -> Intent {
        Intent {
            moods: detect_moods(text),
            explicit_genres: detect_genres(text),
            explicit_artists: detect_artists(text),
            language: detect_language(text),
            prompt_language: Some(detect_prompt_language(text)),
        }
        .normalized()
    }
}

#[async_trait]
impl IntentParser for KeywordIntentParser {
    async fn parse_intent(&self, text: &str) -> Result<Intent> {
        Ok(self.parse(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turkish_slow_request() {
        let intent = KeywordIntentParser::new().parse("sakin türkçe pop şarkılar istiyorum");

        assert_eq!(intent.moods, vec![Mood::Slow]);
        assert_eq!(intent.explicit_genres, vec!["pop".to_string()]);
        assert_eq!(intent.language, Language::Turkish);
        assert_eq!(intent.prompt_language, Some(PromptLanguage::Turkish));
        assert!(intent.explicit_artists.is_empty());
    }

    #[test]
    fn test_every_keyword_hits_its_entry() {
        for (mood, kws) in MOOD_KEYWORDS {
            for kw in *kws {
                assert!(detect_moods(kw).contains(&Mood::parse(mood)), "{} -> {}", kw, mood);
            }
        }
        for (genre, kws) in GENRE_KEYWORDS {
            for kw in *kws {
                assert!(detect_genres(&kw.to_uppercase()).contains(&genre.to_string()), "{} -> {}", kw, genre);
            }
        }
    }

    #[test]
    fn test_moods_keep_text_order() {
        let moods = detect_moods("something energetic but also a bit sad");
        assert_eq!(moods, vec![Mood::Energetic, Mood::Sad]);
    }

    #[test]
    fn test_artists_are_split_and_ordered() {
        let artists = detect_artists("Sezen Aksu ve Tarkan gibi slow şarkılar");
        assert_eq!(artists, vec!["Sezen Aksu".to_string(), "Tarkan".to_string()]);

        let artists = detect_artists("Play me some Radiohead, Portishead");
        assert_eq!(artists, vec!["Radiohead".to_string(), "Portishead".to_string()]);
    }

    #[test]
    fn test_sentence_start_keywords_are_not_artists() {
        assert!(detect_artists("Slow Türkçe şarkılar").is_empty());
    }

    #[test]
    fn test_english_prompt_defaults_to_mixed_language() {
        let intent = KeywordIntentParser::new().parse("chill indie for a rainy day");
        assert_eq!(intent.language, Language::Mixed);
        assert_eq!(intent.prompt_language, Some(PromptLanguage::English));
        assert_eq!(intent.effective_language(), Language::English);
        assert_eq!(intent.moods, vec![Mood::Chill]);
        assert_eq!(intent.explicit_genres, vec!["indie".to_string()]);
    }
}
