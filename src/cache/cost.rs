// Per-call cost estimates used to value cache hits

use crate::cache::models::Provider;
use crate::config::CostRule;

/// Lookup table of (provider, model substring) -> estimated cost of one upstream call.
#[derive(Debug, Clone, Default)]
pub struct CostTable {
    rules: Vec<CostRule>,
}

impl CostTable {
    pub fn new(rules: Vec<CostRule>) -> Self {
        Self { rules }
    }

    /// Estimated cost of one call to `model`, if any rule for `provider` matches.
    ///
    /// The longest matching pattern wins, so `gpt-4o-mini` is not priced as `gpt-4o`.
    pub fn estimate(&self, provider: Provider, model: &str) -> Option<f64> {
        let model = model.to_ascii_lowercase();
        self.rules
            .iter()
            .filter(|r| r.provider == provider && model.contains(&r.model_pattern.to_ascii_lowercase()))
            .max_by_key(|r| r.model_pattern.len())
            .map(|r| r.cost_per_call)
    }

    pub fn rules(&self) -> &[CostRule] {
        &self.rules
    }
}
