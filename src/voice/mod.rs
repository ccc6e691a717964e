//! Voice command shortcuts.
//!
//! - `matcher`: phrase table and the exact/substring/fuzzy matchers.
//! - `params`: BPM, genre, key and mood extraction.
//! - `resolver`: the voice request path (patterns, then cached AI intents).

pub mod matcher;
pub mod params;
pub mod resolver;

pub use matcher::{normalize, MatchTier, PatternMatcher, VoiceMatch, VoicePattern};
pub use params::{extract_parameters, VoiceParameters};
pub use resolver::{VoiceCommandResolver, VoiceResolution};
