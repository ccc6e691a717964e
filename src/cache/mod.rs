// AI response cache: key derivation, cost estimates, and the cache service

pub mod cost;
pub mod key;
pub mod models;
pub mod service;

pub use cost::CostTable;
pub use key::build_key;
pub use models::{hit_rate, CacheEntry, CacheInfo, CacheOptions, CacheStats, ContentCategory, Provider};
pub use service::CacheService;
