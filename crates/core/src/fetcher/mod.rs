//! Feed fetching.
//!
//! This module provides a `Fetcher` trait producing candidate threads for a
//! subscription, an RSS implementation, and episode number extraction from
//! release titles.

mod episode;
mod rss_feed;
mod types;

pub use episode::parse_episodes;
pub use rss_feed::RssFetcher;
pub use types::*;
