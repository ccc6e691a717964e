//! Axum-based admin HTTP surface for studio-cache.
//!
//! Operators use these endpoints to watch hit rates and savings, clear
//! provider-scoped entries, reset counters, and try voice commands against the
//! shortcut table. Product traffic never goes through here; it uses the cache
//! library API in-process.
//!
//! # Components
//!
//! - `handlers`: Individual endpoints (health, metrics, stats, analytics, voice).
//! - `middleware`: Request ID tracking.
//! - `routes`: The router and shared state.

mod handlers;
mod middleware;
mod routes;

pub use routes::{create_router, AppState};
