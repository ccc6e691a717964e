// Cache savings analytics

mod aggregator;
mod models;

pub use aggregator::AnalyticsAggregator;
pub use models::{BaselineCosts, CacheAnalytics, ProviderAnalytics};
