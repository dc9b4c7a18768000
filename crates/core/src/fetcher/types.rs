//! Types for the feed fetcher.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::subscription::{Subscription, Thread};

/// Query for one subscription's candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedQuery {
    /// Free-text search term.
    pub term: String,
}

impl FeedQuery {
    pub fn new(term: impl Into<String>) -> Self {
        Self { term: term.into() }
    }

    /// Query searching for a subscription's name and keywords.
    pub fn for_subscription(subscription: &Subscription) -> Self {
        Self::new(subscription.query_string())
    }
}

/// Errors that can occur while fetching a feed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Feed connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Feed returned HTTP {status}: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Failed to parse feed: {0}")]
    ParseError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Source of candidate threads for a subscription.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Fetch unvalidated candidate threads matching `query`.
    async fn fetch(&self, query: &FeedQuery) -> Result<Vec<Thread>, FetchError>;
}
