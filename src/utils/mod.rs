//! Utility functions and helpers for studio-cache.
//!
//! # Submodules
//!
//! - `logging`: Tracing initialization and cache key formatting for logs.
//! - `retry`: Exponential backoff for establishing store connections.

pub mod logging;
pub mod retry;
