//! Voice command shortcut matching.
//!
//! A fixed set of frequent utterances ("play", "stop recording", ...) maps
//! straight to actions without any AI call or cache lookup. Matchers are tried
//! in a fixed priority order: exact phrase, then substring containment, then
//! word overlap. Within a tier the highest confidence wins. Equal confidence
//! goes to the longer pattern (characters for substring, words for fuzzy) and
//! then to the alphabetically first phrase, so the result never depends on
//! table iteration order.
//!
//! Patterns added at runtime live for the life of the process only.

use super::params::{extract_parameters, VoiceParameters};
use crate::metrics;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Minimum `len(pattern) / len(text)` for a substring match.
pub const SUBSTRING_THRESHOLD: f64 = 0.5;

/// Minimum share of pattern words present in the text for a fuzzy match.
pub const FUZZY_THRESHOLD: f64 = 0.7;

/// Built-in phrase -> action table.
const BUILTIN_PATTERNS: &[(&str, &str)] = &[
    // Playback
    ("play", "playback:start"),
    ("start playback", "playback:start"),
    ("play the track", "playback:start"),
    ("stop", "playback:stop"),
    ("stop playback", "playback:stop"),
    ("pause", "playback:pause"),
    ("resume", "playback:resume"),
    ("next track", "playback:next"),
    ("skip", "playback:next"),
    ("previous track", "playback:previous"),
    ("go back", "playback:previous"),
    ("loop this section", "playback:loop"),
    // Recording
    ("record", "recording:start"),
    ("start recording", "recording:start"),
    ("stop recording", "recording:stop"),
    // Volume
    ("volume up", "volume:up"),
    ("turn it up", "volume:up"),
    ("volume down", "volume:down"),
    ("turn it down", "volume:down"),
    ("mute", "volume:mute"),
    ("unmute", "volume:unmute"),
    // Editing
    ("undo", "edit:undo"),
    ("redo", "edit:redo"),
    ("save project", "project:save"),
    ("export project", "project:export"),
    // Generation and analysis
    ("create a beat", "generation:beat"),
    ("make a beat", "generation:beat"),
    ("generate music", "generation:music"),
    ("generate a melody", "generation:melody"),
    ("analyze my vocals", "analysis:vocals"),
    ("analyze the lyrics", "analysis:lyrics"),
    // Effects and tools
    ("add reverb", "effects:reverb"),
    ("add delay", "effects:delay"),
    ("metronome on", "metronome:on"),
    ("metronome off", "metronome:off"),
];

/// Which matcher produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    Exact,
    Substring,
    Fuzzy,
}

impl MatchTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchTier::Exact => "exact",
            MatchTier::Substring => "substring",
            MatchTier::Fuzzy => "fuzzy",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoicePattern {
    pub phrase: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceMatch {
    pub action: String,
    pub confidence: f64,
    pub tier: MatchTier,
    /// The table phrase that matched.
    pub pattern: String,
    pub parameters: VoiceParameters,
}

/// Lowercase, trim and collapse inner whitespace.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub struct PatternMatcher {
    // Phrase-ordered so scans are deterministic.
    patterns: RwLock<BTreeMap<String, String>>,
}

impl PatternMatcher {
    /// Matcher over the built-in table.
    pub fn new() -> Self {
        Self::with_patterns(BUILTIN_PATTERNS.iter().map(|(p, a)| (p.to_string(), a.to_string())))
    }

    /// Matcher over an arbitrary table.
    pub fn with_patterns<I>(patterns: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let table = patterns
            .into_iter()
            .map(|(phrase, action)| (normalize(&phrase), action))
            .filter(|(phrase, _)| !phrase.is_empty())
            .collect();
        Self {
            patterns: RwLock::new(table),
        }
    }

    /// Add or replace a phrase for the life of this process.
    pub fn add_pattern(&self, phrase: &str, action: &str) -> bool {
        let phrase = normalize(phrase);
        if phrase.is_empty() {
            return false;
        }
        debug!("Adding voice pattern '{}' -> {}", phrase, action);
        self.patterns.write().insert(phrase, action.to_string());
        true
    }

    pub fn patterns(&self) -> Vec<VoicePattern> {
        self.patterns
            .read()
            .iter()
            .map(|(phrase, action)| VoicePattern {
                phrase: phrase.clone(),
                action: action.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.patterns.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve an utterance to an action, or `None` when the caller must fall
    /// through to AI-based intent detection.
    pub fn match_pattern(&self, text: &str) -> Option<VoiceMatch> {
        let normalized = normalize(text);
        if normalized.is_empty() {
            metrics::record_voice_match("none");
            return None;
        }

        let table = self.patterns.read();
        let found = exact(&table, &normalized)
            .or_else(|| substring(&table, &normalized))
            .or_else(|| fuzzy(&table, &normalized));
        drop(table);

        match found {
            Some((tier, phrase, action, confidence)) => {
                debug!(
                    "Voice command '{}' matched '{}' ({}, {:.2})",
                    normalized, phrase, tier.as_str(), confidence
                );
                metrics::record_voice_match(tier.as_str());
                Some(VoiceMatch {
                    action,
                    confidence,
                    tier,
                    pattern: phrase,
                    parameters: extract_parameters(text.trim()),
                })
            }
            None => {
                debug!("No voice pattern for '{}'", normalized);
                metrics::record_voice_match("none");
                None
            }
        }
    }
}

impl Default for PatternMatcher {
    fn default() -> Self {
        Self::new()
    }
}

type Candidate = (MatchTier, String, String, f64);

fn exact(table: &BTreeMap<String, String>, text: &str) -> Option<Candidate> {
    table
        .get(text)
        .map(|action| (MatchTier::Exact, text.to_string(), action.clone(), 1.0))
}

fn substring(table: &BTreeMap<String, String>, text: &str) -> Option<Candidate> {
    let text_len = text.chars().count() as f64;
    best(table.iter().filter_map(|(phrase, action)| {
        if !text.contains(phrase.as_str()) {
            return None;
        }
        let confidence = phrase.chars().count() as f64 / text_len;
        (confidence > SUBSTRING_THRESHOLD)
            .then(|| (MatchTier::Substring, phrase.clone(), action.clone(), confidence))
    }))
}

fn fuzzy(table: &BTreeMap<String, String>, text: &str) -> Option<Candidate> {
    let words: HashSet<&str> = text.split(' ').collect();
    best(table.iter().filter_map(|(phrase, action)| {
        let pattern_words: Vec<&str> = phrase.split(' ').collect();
        let matching = pattern_words.iter().filter(|w| words.contains(*w)).count();
        let confidence = matching as f64 / pattern_words.len() as f64;
        (confidence >= FUZZY_THRESHOLD)
            .then(|| (MatchTier::Fuzzy, phrase.clone(), action.clone(), confidence))
    }))
}

/// Highest confidence, then the tier's size rule, then first in phrase order.
fn best<I: Iterator<Item = Candidate>>(candidates: I) -> Option<Candidate> {
    candidates.fold(None, |best: Option<Candidate>, candidate| match best {
        Some(current) if !beats(&candidate, &current) => Some(current),
        _ => Some(candidate),
    })
}

/// Ties on confidence go to the pattern with more words (fuzzy) or more
/// characters (substring); remaining ties keep the earlier phrase.
fn beats(candidate: &Candidate, current: &Candidate) -> bool {
    if candidate.3 != current.3 {
        return candidate.3 > current.3;
    }
    match candidate.0 {
        MatchTier::Fuzzy => word_count(&candidate.1) > word_count(&current.1),
        _ => candidate.1.chars().count() > current.1.chars().count(),
    }
}

fn word_count(phrase: &str) -> usize {
    phrase.split(' ').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Stop   Recording \n"), "stop recording");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_exact_tier() {
        let matcher = PatternMatcher::new();
        let m = matcher.match_pattern("  PLAY ").unwrap();
        assert_eq!(m.action, "playback:start");
        assert_eq!(m.confidence, 1.0);
        assert_eq!(m.tier, MatchTier::Exact);
    }

    #[test]
    fn test_substring_tier_prefers_longest_pattern() {
        let matcher = PatternMatcher::new();
        // Both "stop" and "stop recording" are contained; the longer one wins
        let m = matcher.match_pattern("stop recording now").unwrap();
        assert_eq!(m.tier, MatchTier::Substring);
        assert_eq!(m.action, "recording:stop");
        assert!((m.confidence - 14.0 / 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_substring_below_threshold_falls_through() {
        let matcher = PatternMatcher::with_patterns(vec![("play".to_string(), "playback:start".to_string())]);
        // 4 / 13 is not enough, and fuzzy needs the word "play" itself
        assert!(matcher.match_pattern("please replay").is_none());
    }

    #[test]
    fn test_fuzzy_tier() {
        let matcher = PatternMatcher::new();
        let m = matcher.match_pattern("could you turn the volume up a little").unwrap();
        assert_eq!(m.tier, MatchTier::Fuzzy);
        assert_eq!(m.action, "volume:up");
        assert_eq!(m.confidence, 1.0);
    }

    #[test]
    fn test_fuzzy_tie_prefers_more_words() {
        let matcher = PatternMatcher::with_patterns(vec![
            ("undo everything".to_string(), "edit:undo_all".to_string()),
            ("undo it all".to_string(), "edit:undo_it_all".to_string()),
        ]);
        // Both score 1.0; the three-word phrase wins although it is shorter in bytes
        let m = matcher.match_pattern("please undo it all everything").unwrap();
        assert_eq!(m.tier, MatchTier::Fuzzy);
        assert_eq!(m.action, "edit:undo_it_all");
    }

    #[test]
    fn test_fuzzy_threshold() {
        let matcher = PatternMatcher::with_patterns(vec![(
            "analyze the lyrics".to_string(),
            "analysis:lyrics".to_string(),
        )]);
        // 2 of 3 words is below 0.7
        assert!(matcher.match_pattern("analyze these lyrics").is_none());
        assert!(matcher.match_pattern("please analyze all the lyrics").is_some());
    }

    #[test]
    fn test_add_pattern_is_process_local() {
        let matcher = PatternMatcher::new();
        assert!(matcher.match_pattern("drop the bass").is_none());
        assert!(matcher.add_pattern("Drop The Bass", "effects:bass_drop"));
        assert_eq!(matcher.match_pattern("drop the bass").unwrap().action, "effects:bass_drop");
        assert!(!matcher.add_pattern("   ", "noop"));

        // A fresh matcher only knows the built-in table
        assert!(PatternMatcher::new().match_pattern("drop the bass").is_none());
    }

    #[test]
    fn test_parameters_attached() {
        let matcher = PatternMatcher::new();
        let m = matcher.match_pattern("make a beat in C minor at 90 bpm").unwrap();
        assert_eq!(m.action, "generation:beat");
        assert_eq!(m.parameters.bpm, Some(90));
        assert_eq!(m.parameters.key.as_deref(), Some("C minor"));
    }
}
