//! The subscription entity.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

use super::selector::{EpisodeSelector, SelectorError};
use super::sid::{self, SidError};
use super::thread::{Thread, ThreadId, ValidationError};

/// Value of `latest` for a subscription without threads.
pub const NO_EPISODE: f64 = -1.0;

fn no_episode() -> f64 {
    NO_EPISODE
}

/// A tracked feed: a name, its matching keywords and every thread found so far.
///
/// Threads are kept newest first (descending leading episode) and `latest`
/// always mirrors the last episode of the topmost thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    name: String,
    keywords: Vec<String>,
    #[serde(default)]
    sid: Option<String>,
    #[serde(default)]
    threads: Vec<Thread>,
    #[serde(default = "no_episode")]
    latest: f64,
}

/// Outcome of merging a batch of candidates into a subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Candidates inserted.
    pub added: usize,
    /// Candidates already present (same title and link).
    pub duplicates: usize,
    /// Candidates that failed validation.
    pub rejected: usize,
}

impl Subscription {
    /// Create a subscription. Keywords are sorted and deduplicated.
    pub fn new<I, S>(name: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut keywords: Vec<String> = keywords.into_iter().map(Into::into).collect();
        keywords.sort();
        keywords.dedup();

        Self {
            name: name.into(),
            keywords,
            sid: None,
            threads: Vec::new(),
            latest: NO_EPISODE,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn sid(&self) -> Option<&str> {
        self.sid.as_deref()
    }

    /// Threads, newest first.
    pub fn threads(&self) -> &[Thread] {
        &self.threads
    }

    /// Most recent known episode, or [`NO_EPISODE`].
    pub fn latest(&self) -> f64 {
        self.latest
    }

    /// Search term sent to the feed: name followed by keywords.
    pub fn query_string(&self) -> String {
        std::iter::once(self.name.as_str())
            .chain(self.keywords.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether a thread with this identity is already tracked.
    pub fn contains(&self, id: &ThreadId) -> bool {
        self.threads.iter().any(|thread| &thread.id() == id)
    }

    /// Validate and insert a thread.
    ///
    /// On rejection the subscription is untouched and the error is both
    /// logged and returned; callers ingesting batches keep going.
    pub fn add(&mut self, thread: Thread) -> Result<(), ValidationError> {
        if let Err(e) = thread.validate() {
            warn!(subscription = %self.name, "Rejected thread: {}", e);
            return Err(e);
        }

        self.threads.push(thread);
        self.sort();
        Ok(())
    }

    /// Merge fetched candidates, skipping ones already tracked.
    pub fn merge<I>(&mut self, candidates: I) -> MergeReport
    where
        I: IntoIterator<Item = Thread>,
    {
        let mut known: HashSet<ThreadId> = self.threads.iter().map(Thread::id).collect();
        let mut report = MergeReport::default();

        for candidate in candidates {
            let id = candidate.id();
            if known.contains(&id) {
                report.duplicates += 1;
                continue;
            }
            match self.add(candidate) {
                Ok(()) => {
                    known.insert(id);
                    report.added += 1;
                }
                Err(_) => report.rejected += 1,
            }
        }

        debug!(
            subscription = %self.name,
            added = report.added,
            duplicates = report.duplicates,
            rejected = report.rejected,
            "Merged candidates"
        );
        report
    }

    /// Stable sort newest first and refresh `latest`.
    pub fn sort(&mut self) {
        self.threads
            .sort_by(|a, b| b.leading_episode().total_cmp(&a.leading_episode()));
        self.latest = self
            .threads
            .first()
            .and_then(Thread::last_episode)
            .unwrap_or(NO_EPISODE);
    }

    /// Assign a sid derived from `(name, keywords)` that is not in `existing`.
    pub fn generate_sid(&mut self, existing: &HashSet<String>) -> Result<&str, SidError> {
        let sid = sid::generate_sid(&self.name, &self.keywords, existing)?;
        Ok(self.sid.insert(sid).as_str())
    }

    /// Threads matching `selector`, see [`EpisodeSelector`].
    pub fn get_threads(&self, selector: &str) -> Result<Vec<&Thread>, SelectorError> {
        EpisodeSelector::parse(selector)?.resolve(&self.threads)
    }

    /// Bring a loaded record back in line with the invariants.
    ///
    /// Returns the number of threads dropped for failing validation.
    pub(crate) fn normalize(&mut self) -> usize {
        self.keywords.sort();
        self.keywords.dedup();

        let before = self.threads.len();
        self.threads.retain(|thread| match thread.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!(subscription = %self.name, "Dropping stored thread: {}", e);
                false
            }
        });
        self.sort();
        before - self.threads.len()
    }

    pub(crate) fn clear_sid(&mut self) {
        self.sid = None;
    }
}
