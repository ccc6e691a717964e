// Musical parameter extraction from voice commands

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Parameters found in an utterance. Absent fields are omitted when serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bpm: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
}

impl VoiceParameters {
    pub fn is_empty(&self) -> bool {
        self.bpm.is_none() && self.genre.is_none() && self.key.is_none() && self.mood.is_none()
    }
}

/// Genres recognized in commands, longest spellings first so "hip hop" beats "hop".
const GENRES: &[&str] = &[
    "drum and bass", "hip hop", "hip-hop", "lo-fi", "lofi", "r&b", "dubstep", "classical",
    "country", "ambient", "techno", "reggae", "house", "drill", "trap", "jazz", "rock",
    "funk", "soul", "edm", "pop",
];

const MOODS: &[&str] = &[
    "melancholic", "aggressive", "energetic", "uplifting", "romantic", "peaceful", "mellow",
    "happy", "chill", "calm", "dark", "epic", "sad",
];

static BPM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{2,3})\s*(?:bpm|beats per minute)\b").unwrap());

// Note letter must be upper case so "in a minute" isn't read as A.
static KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?i:in)\s+([A-G][#b]?)(?:\s*(?i:(major|minor|maj|min|m)))?(?:[^\w#]|$)").unwrap()
});

static GENRE_RES: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| vocabulary(GENRES));

static MOOD_RES: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| vocabulary(MOODS));

fn vocabulary(words: &[&'static str]) -> Vec<(&'static str, Regex)> {
    words
        .iter()
        .map(|w| {
            let pattern = format!(r"(?i)(?:^|[^\w&-]){}(?:$|[^\w&-])", regex::escape(w));
            (*w, Regex::new(&pattern).unwrap())
        })
        .collect()
}

/// Scan an utterance for BPM, genre, key signature and mood. Never fails.
pub fn extract_parameters(text: &str) -> VoiceParameters {
    let bpm = BPM_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok());

    let genre = first_word(&GENRE_RES, text).map(|g| match g {
        "hip-hop" => "hip hop",
        "lofi" => "lo-fi",
        other => other,
    });

    let key = KEY_RE.captures(text).and_then(|c| {
        let note = c.get(1)?.as_str();
        let mode = c.get(2).map(|m| match m.as_str().to_ascii_lowercase().as_str() {
            "major" | "maj" => "major",
            _ => "minor",
        });
        Some(match mode {
            Some(mode) => format!("{} {}", note, mode),
            None => note.to_string(),
        })
    });

    VoiceParameters {
        bpm,
        genre: genre.map(str::to_string),
        key,
        mood: first_word(&MOOD_RES, text).map(str::to_string),
    }
}

fn first_word(vocab: &[(&'static str, Regex)], text: &str) -> Option<&'static str> {
    vocab.iter().find(|(_, re)| re.is_match(text)).map(|(w, _)| *w)
}
