// studio-cache - Cost-control cache, voice command shortcuts and savings analytics for AI provider calls

pub mod analytics;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod metrics;
pub mod server;
pub mod store;
pub mod utils;
pub mod voice;
