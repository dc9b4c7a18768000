//! RSS feed fetcher.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::episode::parse_episodes;
use super::types::{FeedQuery, FetchError, Fetcher};
use crate::config::FetcherConfig;
use crate::subscription::Thread;

/// Fetches candidate threads from an RSS search endpoint.
pub struct RssFetcher {
    client: Client,
    config: FetcherConfig,
}

impl RssFetcher {
    /// Create a new RssFetcher with the given configuration.
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .user_agent(concat!("episub/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Build the search URL for a query.
    fn build_search_url(&self, query: &FeedQuery) -> String {
        let separator = if self.config.url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}{}={}",
            self.config.url,
            separator,
            self.config.query_param,
            urlencoding::encode(&query.term)
        )
    }

    /// Turn an RSS document into candidate threads.
    ///
    /// Items without a title, a link or a recognisable episode are skipped.
    pub fn parse_feed(content: &str) -> Result<Vec<Thread>, FetchError> {
        let channel = content
            .parse::<rss::Channel>()
            .map_err(|e| FetchError::ParseError(e.to_string()))?;

        let threads = channel
            .items()
            .iter()
            .filter_map(|item| {
                let title = item.title()?.trim();
                let link = item
                    .enclosure()
                    .map(|enc| enc.url())
                    .or_else(|| item.link())
                    .filter(|link| !link.is_empty())?;

                let ep = parse_episodes(title);
                if ep.is_empty() {
                    debug!(title = title, "Skipping feed item without episode number");
                    return None;
                }

                Some(Thread::new(title, link, ep))
            })
            .collect();

        Ok(threads)
    }
}

#[async_trait]
impl Fetcher for RssFetcher {
    fn name(&self) -> &str {
        "rss"
    }

    async fn fetch(&self, query: &FeedQuery) -> Result<Vec<Thread>, FetchError> {
        let url = self.build_search_url(query);
        debug!(url = %url, "Fetching feed");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::ConnectionFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url,
            });
        }

        let content = response
            .text()
            .await
            .map_err(|e| FetchError::ConnectionFailed(e.to_string()))?;

        let threads = Self::parse_feed(&content)?;
        debug!(term = %query.term, candidates = threads.len(), "Feed fetch complete");
        Ok(threads)
    }
}
