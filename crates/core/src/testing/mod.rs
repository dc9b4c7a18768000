//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external seams (download
//! agents, feed fetchers and storage), allowing the database to be driven end
//! to end without spawning processes or touching the network.
//!
//! # Example
//!
//! ```rust,ignore
//! use episub_core::testing::{MemoryStore, MockDownloadAgent, MockFetcher};
//!
//! let agent = MockDownloadAgent::new(DownloadClient::Aria2);
//! let dispatcher = Dispatcher::new(config.download).with_agent(Arc::new(agent.clone()));
//! let db = Database::open(Arc::new(MemoryStore::new()), dispatcher)?;
//! ```

mod memory_store;
mod mock_download_agent;
mod mock_fetcher;

pub use memory_store::MemoryStore;
pub use mock_download_agent::{MockDownloadAgent, RecordedDispatch};
pub use mock_fetcher::MockFetcher;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::subscription::{Subscription, Thread};

    /// A thread for a single episode with a magnet link derived from the title.
    pub fn thread(name: &str, episode: f64) -> Thread {
        let title = format!("[Group] {} - {:02} [1080p]", name, episode);
        let link = format!(
            "magnet:?xt=urn:btih:{}",
            crate::subscription::sid::hash(&[&title])
        );
        Thread::new(title, link, vec![episode])
    }

    /// A batch thread covering `first..=last`.
    pub fn batch(name: &str, first: u32, last: u32) -> Thread {
        let title = format!("[Group] {} [{:02}-{:02}][1080p]", name, first, last);
        let link = format!("https://example.org/{}-{}-{}.torrent", name, first, last);
        Thread::new(title, link, (first..=last).map(f64::from).collect())
    }

    /// A subscription holding a thread for each of `episodes`.
    ///
    /// Panics if an episode is not finite.
    pub fn subscription(name: &str, keywords: &[&str], episodes: &[f64]) -> Subscription {
        let mut sub = Subscription::new(name, keywords.iter().copied());
        for &episode in episodes {
            sub.add(thread(name, episode)).expect("fixture episodes must be finite");
        }
        sub
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_subscription_fixture_is_sorted() {
            let sub = subscription("Show", &["kw"], &[1.0, 3.0, 2.0]);
            assert_eq!(sub.threads().len(), 3);
            assert_eq!(sub.latest(), 3.0);
        }

        #[test]
        #[should_panic(expected = "fixture episodes must be finite")]
        fn test_subscription_fixture_rejects_non_finite() {
            subscription("Show", &["kw"], &[1.0, f64::NAN]);
        }
    }
}
