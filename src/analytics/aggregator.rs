// Savings analytics derived from cache counters

use super::models::{BaselineCosts, CacheAnalytics, ProviderAnalytics};
use crate::cache::{CacheService, Provider};
use crate::config::AnalyticsConfig;
use std::sync::Arc;
use tracing::debug;

const HIT_RATE_WEIGHT: f64 = 0.6;
const SAVINGS_WEIGHT: f64 = 0.3;
const SIZE_WEIGHT: f64 = 0.1;

const LOW_HIT_RATE: f64 = 0.3;
const SMALL_CACHE: usize = 100;
const LOW_PROVIDER_HIT_RATE: f64 = 0.2;
const MIN_PROVIDER_OBSERVATIONS: u64 = 10;

const DAYS_PER_MONTH: f64 = 30.0;

/// Read-only view over the cache counters. Holds no state of its own.
pub struct AnalyticsAggregator {
    cache: Arc<CacheService>,
    baselines: BaselineCosts,
    target_monthly_savings: f64,
    optimal_cache_size: u64,
}

impl AnalyticsAggregator {
    pub fn new(cache: Arc<CacheService>, config: &AnalyticsConfig) -> Self {
        Self {
            cache,
            baselines: BaselineCosts::from_names(&config.baseline_monthly_costs),
            target_monthly_savings: config.target_monthly_savings,
            optimal_cache_size: config.optimal_cache_size,
        }
    }

    pub fn with_baselines(mut self, baselines: BaselineCosts) -> Self {
        self.baselines = baselines;
        self
    }

    pub async fn get_analytics(&self) -> CacheAnalytics {
        let global = self.cache.get_stats(None, None).await;

        let mut analytics = CacheAnalytics {
            total_hits: global.hits,
            total_misses: global.misses,
            hit_rate: global.hit_rate,
            total_saved_cost: global.saved_cost,
            // No rollover exists for the accumulator; it reads as "since last reset".
            daily_savings: global.saved_cost,
            monthly_savings: global.saved_cost * DAYS_PER_MONTH,
            ..CacheAnalytics::default()
        };

        for provider in Provider::ALL {
            let stats = self.cache.get_stats(Some(provider), None).await;
            let estimated = self.baselines.monthly(provider) * stats.hit_rate;
            analytics.projected_monthly_savings += estimated;
            analytics.by_provider.insert(
                provider,
                ProviderAnalytics {
                    hits: stats.hits,
                    misses: stats.misses,
                    hit_rate: stats.hit_rate,
                    saved_cost: stats.saved_cost,
                    estimated_monthly_savings: estimated,
                },
            );
        }

        debug!(
            "Analytics: hit rate {:.3}, projected monthly savings {:.2}",
            analytics.hit_rate, analytics.projected_monthly_savings
        );
        analytics
    }

    /// Heuristic 0-100 score: 60% hit rate, 30% projected savings against the
    /// target, 10% cache size against the optimal size. Both ratios cap at 1.
    pub async fn get_efficiency_score(&self) -> f64 {
        let analytics = self.get_analytics().await;
        let info = self.cache.get_cache_info().await;

        let savings_ratio = ratio(analytics.projected_monthly_savings, self.target_monthly_savings);
        let size_ratio = ratio(info.total_keys as f64, self.optimal_cache_size as f64);

        let score = (HIT_RATE_WEIGHT * analytics.hit_rate
            + SAVINGS_WEIGHT * savings_ratio
            + SIZE_WEIGHT * size_ratio)
            * 100.0;
        score.clamp(0.0, 100.0)
    }

    /// Independent threshold rules; every rule that fires adds one line.
    pub async fn get_recommendations(&self) -> Vec<String> {
        let analytics = self.get_analytics().await;
        let info = self.cache.get_cache_info().await;
        let mut recommendations = Vec::new();

        if analytics.hit_rate < LOW_HIT_RATE {
            recommendations.push(format!(
                "Hit rate is {:.1}%. Consider semantic matching so near-identical prompts share cache entries.",
                analytics.hit_rate * 100.0
            ));
        }

        if info.total_keys < SMALL_CACHE {
            recommendations.push(format!(
                "Only {} cached entries. Consider pre-warming the cache with common generation requests.",
                info.total_keys
            ));
        }

        for (provider, stats) in &analytics.by_provider {
            let observations = stats.hits + stats.misses;
            if observations >= MIN_PROVIDER_OBSERVATIONS && stats.hit_rate < LOW_PROVIDER_HIT_RATE {
                recommendations.push(format!(
                    "{} hit rate is {:.1}% over {} lookups. Review its TTLs or request normalization.",
                    provider,
                    stats.hit_rate * 100.0,
                    observations
                ));
            }
        }

        recommendations
    }
}

/// `value / target` capped to [0, 1]; 0 for a non-positive target.
fn ratio(value: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 0.0;
    }
    (value / target).clamp(0.0, 1.0)
}
