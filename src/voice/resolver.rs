// Voice command path: shortcut patterns first, cached AI intents second

use super::matcher::{normalize, PatternMatcher, VoiceMatch};
use crate::cache::{CacheOptions, CacheService, ContentCategory, Provider};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Outcome of resolving an utterance without calling an AI provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum VoiceResolution {
    /// Built-in or runtime shortcut.
    Pattern(VoiceMatch),
    /// Intent an AI call produced earlier for the same utterance.
    Cached { intent: Value },
    /// Caller must run AI intent detection, then `remember` the result.
    Unresolved,
}

pub struct VoiceCommandResolver {
    matcher: Arc<PatternMatcher>,
    cache: Arc<CacheService>,
    intent_model: String,
}

impl VoiceCommandResolver {
    pub fn new(matcher: Arc<PatternMatcher>, cache: Arc<CacheService>, intent_model: impl Into<String>) -> Self {
        Self {
            matcher,
            cache,
            intent_model: intent_model.into(),
        }
    }

    pub fn matcher(&self) -> &Arc<PatternMatcher> {
        &self.matcher
    }

    /// Pattern matcher first; only on no match is the cache consulted.
    pub async fn resolve(&self, text: &str) -> Result<VoiceResolution> {
        if let Some(found) = self.matcher.match_pattern(text) {
            return Ok(VoiceResolution::Pattern(found));
        }

        let normalized = normalize(text);
        match self.cache.get::<_, Value>(&normalized, &self.options()).await? {
            Some(intent) => {
                debug!("Voice command '{}' served from cached intent", normalized);
                Ok(VoiceResolution::Cached { intent })
            }
            None => Ok(VoiceResolution::Unresolved),
        }
    }

    /// Cache the intent an AI call produced for `text`.
    pub async fn remember<T: Serialize + ?Sized>(&self, text: &str, intent: &T) -> Result<()> {
        self.cache.set(&normalize(text), intent, &self.options()).await
    }

    fn options(&self) -> CacheOptions {
        CacheOptions::new(Provider::OpenAi, self.intent_model.clone()).category(ContentCategory::Chat)
    }
}
