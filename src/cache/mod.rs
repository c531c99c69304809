//! Generic offline caching layer for request/response pairs.
//!
//! This module provides a catalog-agnostic caching mechanism that:
//! - Stores responses in named generations, exactly one of which is current
//! - Serves app-shell assets cache-first and data routes network-first
//! - Degrades to a static fallback payload when network and cache both miss
//! - Exposes storage and network as injectable ports for testing

mod controller;
mod storage;
mod traits;

pub use controller::{CacheController, CACHE_GENERATION, DATA_ROUTE_MARKER, PRECACHE_PATHS};
pub use storage::{CacheStorage, CachedEntry, MemoryStorage, SqliteStorage};
pub use traits::{FallbackProvider, Fetch, Request, RequestMode, Response, Served, ServeSource};
