//! Caching subsystem: durable store and snapshot manager
//!
//! The store is a synchronous string key-value layer on the filesystem; the
//! manager builds the IPO snapshot policy on top of it - a 1-hour validity
//! window, wholesale replacement on refresh, and a fallback ladder that
//! guarantees callers always receive a renderable list.

mod manager;
mod store;

pub use manager::{CacheError, CacheManager, CACHE_WINDOW_MS};
pub use store::Store;
