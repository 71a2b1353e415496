//! Client-side feed cache for chirp.
//!
//! Holds previously fetched feed pages and profile summaries, and patches
//! them in place after mutations instead of refetching. See [`FeedCache`].

pub mod cache;

pub use cache::{CacheEvent, FeedCache, FetchToken};
