//! Analytics report models and the baseline cost assumptions behind them.

use crate::cache::Provider;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Assumed monthly spend per provider if nothing were cached.
///
/// These numbers are estimates supplied by configuration, not measurements;
/// every savings projection built on them inherits that caveat.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaselineCosts {
    monthly: HashMap<Provider, f64>,
}

impl BaselineCosts {
    pub fn new(monthly: HashMap<Provider, f64>) -> Self {
        Self { monthly }
    }

    /// Build from provider-name keys, skipping names that aren't a known provider.
    pub fn from_names(names: &BTreeMap<String, f64>) -> Self {
        let monthly = names
            .iter()
            .filter_map(|(name, cost)| match name.parse::<Provider>() {
                Ok(provider) => Some((provider, *cost)),
                Err(_) => {
                    warn!("Ignoring baseline cost for unknown provider '{}'", name);
                    None
                }
            })
            .collect();
        Self { monthly }
    }

    pub fn monthly(&self, provider: Provider) -> f64 {
        self.monthly.get(&provider).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderAnalytics {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub saved_cost: f64,
    /// `baseline monthly cost * hit rate`; assumes hit rate maps linearly onto spend.
    pub estimated_monthly_savings: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheAnalytics {
    pub total_hits: u64,
    pub total_misses: u64,
    pub hit_rate: f64,
    pub total_saved_cost: f64,
    pub by_provider: BTreeMap<Provider, ProviderAnalytics>,
    /// Accumulated `saved_cost` since the last stats reset.
    pub daily_savings: f64,
    pub monthly_savings: f64,
    pub projected_monthly_savings: f64,
}
