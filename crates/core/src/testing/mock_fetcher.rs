//! Mock fetcher for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::fetcher::{FeedQuery, FetchError, Fetcher};
use crate::subscription::Thread;

/// Mock implementation of the Fetcher trait.
///
/// Results are keyed by query term. Unknown terms return an empty feed.
///
/// # Example
///
/// ```rust,ignore
/// let fetcher = MockFetcher::new();
/// fetcher.set_results("Show 1080p", vec![fixtures::thread("Show", 1.0)]).await;
/// fetcher.fail_for("Other 1080p").await;
///
/// db.update(&fetcher).await;
/// assert_eq!(fetcher.queries().await.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockFetcher {
    /// Configured results by query term.
    results: Arc<RwLock<HashMap<String, Vec<Thread>>>>,
    /// Terms whose fetch fails.
    failing: Arc<RwLock<HashSet<String>>>,
    /// Recorded queries.
    queries: Arc<RwLock<Vec<FeedQuery>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the candidates returned for `term`.
    pub async fn set_results(&self, term: impl Into<String>, threads: Vec<Thread>) {
        self.results.write().await.insert(term.into(), threads);
    }

    /// Make every fetch for `term` fail with a connection error.
    pub async fn fail_for(&self, term: impl Into<String>) {
        self.failing.write().await.insert(term.into());
    }

    /// Get all recorded queries.
    pub async fn queries(&self) -> Vec<FeedQuery> {
        self.queries.read().await.clone()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, query: &FeedQuery) -> Result<Vec<Thread>, FetchError> {
        self.queries.write().await.push(query.clone());

        if self.failing.read().await.contains(&query.term) {
            return Err(FetchError::ConnectionFailed(format!(
                "mock failure for {:?}",
                query.term
            )));
        }

        Ok(self
            .results
            .read()
            .await
            .get(&query.term)
            .cloned()
            .unwrap_or_default())
    }
}
