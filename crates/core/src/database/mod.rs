//! The subscription database.
//!
//! [`Database`] owns every [`Subscription`], assigns their sids, persists them
//! through a [`Store`] and hands threads to the download [`Dispatcher`].

mod migrate;
mod store;

pub use migrate::upgrade;
pub use store::{
    decode_record, encode_record, DatabaseRecord, JsonFileStore, Store, StoreError,
    SCHEMA_VERSION,
};

use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::download::{self, DispatchError, Dispatcher, DownloadOptions, ResolvedDownload};
use crate::fetcher::{FeedQuery, FetchError, Fetcher};
use crate::subscription::{MergeReport, SidError, Subscription, Thread, ValidationError};

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Sid(#[from] SidError),

    #[error("Thread rejected: {0}")]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Download failed: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Field used to look a subscription up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionKey {
    Sid(String),
    Name(String),
    /// 1-based position in [`Database::subscriptions`].
    Vid(usize),
}

/// A subscription whose fetch failed during [`Database::update`].
#[derive(Debug)]
pub struct UpdateFailure {
    pub name: String,
    pub error: FetchError,
}

/// Outcome of [`Database::update`].
#[derive(Debug, Default)]
pub struct UpdateReport {
    /// Subscriptions fetched successfully.
    pub fetched: usize,
    /// Threads merged across all subscriptions.
    pub merged: MergeReport,
    pub failures: Vec<UpdateFailure>,
}

/// The aggregate of all subscriptions.
pub struct Database {
    version: String,
    subscriptions: Vec<Subscription>,
    store: Arc<dyn Store>,
    dispatcher: Dispatcher,
}

impl Database {
    /// Load the stored database, or start an empty one.
    pub fn open(store: Arc<dyn Store>, dispatcher: Dispatcher) -> Result<Self, DatabaseError> {
        let record = match store.load()? {
            Some(record) => {
                info!(
                    version = %record.version,
                    subscriptions = record.subscriptions.len(),
                    "Loaded database"
                );
                record
            }
            None => {
                info!("Starting empty database");
                DatabaseRecord::empty()
            }
        };

        Ok(Self {
            version: record.version,
            subscriptions: record.subscriptions,
            store,
            dispatcher,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Subscriptions in list order.
    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Add a subscription and return its newly assigned sid.
    ///
    /// Any sid the subscription already carries is replaced by one unique
    /// within this database.
    pub fn add(&mut self, mut subscription: Subscription) -> Result<String, DatabaseError> {
        if subscription.name().trim().is_empty() {
            return Err(DatabaseError::InvalidArgument(
                "subscription name must not be empty".to_string(),
            ));
        }
        if subscription.keywords().iter().any(|k| k.trim().is_empty()) {
            return Err(DatabaseError::InvalidArgument(format!(
                "subscription {:?} has an empty keyword",
                subscription.name()
            )));
        }

        let sid = subscription.generate_sid(&self.sids())?.to_string();
        info!(
            sid = %sid,
            name = %subscription.name(),
            keywords = ?subscription.keywords(),
            "Added subscription"
        );
        self.subscriptions.push(subscription);
        Ok(sid)
    }

    /// Remove the subscription with the same sid.
    ///
    /// Returns `false` when no subscription matches.
    pub fn remove(&mut self, subscription: &Subscription) -> Result<bool, DatabaseError> {
        let sid = subscription.sid().ok_or_else(|| {
            DatabaseError::InvalidArgument(format!(
                "subscription {:?} has no sid",
                subscription.name()
            ))
        })?;
        Ok(self.remove_by_sid(sid).is_some())
    }

    /// Remove and return the subscription with `sid`.
    pub fn remove_by_sid(&mut self, sid: &str) -> Option<Subscription> {
        let index = self
            .subscriptions
            .iter()
            .position(|sub| sub.sid() == Some(sid))?;
        let removed = self.subscriptions.remove(index);
        info!(sid = %sid, name = %removed.name(), "Removed subscription");
        Some(removed)
    }

    /// Persist the whole database.
    pub fn save(&self) -> Result<(), DatabaseError> {
        let record = DatabaseRecord {
            version: self.version.clone(),
            subscriptions: self.subscriptions.clone(),
        };
        self.store.save(&record)?;
        Ok(())
    }

    pub fn has(&self, key: &SubscriptionKey) -> bool {
        self.position(key).is_some()
    }

    pub fn query(&self, key: &SubscriptionKey) -> Option<&Subscription> {
        self.position(key).map(|i| &self.subscriptions[i])
    }

    /// Resolve a user-supplied reference to a subscription.
    ///
    /// A matching sid wins. Only when no sid matches is an all-digit
    /// reference taken as a vid, since sids can be all digits too.
    pub fn resolve(&self, reference: &str) -> Option<SubscriptionKey> {
        let by_sid = SubscriptionKey::Sid(reference.to_string());
        if self.has(&by_sid) {
            return Some(by_sid);
        }

        if !reference.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let by_vid = SubscriptionKey::Vid(reference.parse().ok()?);
        self.has(&by_vid).then_some(by_vid)
    }

    /// Look a subscription up by sid or vid, see [`Database::resolve`].
    pub fn lookup(&self, reference: &str) -> Option<&Subscription> {
        self.resolve(reference).and_then(|key| self.query(&key))
    }

    /// Validate and insert a thread into the subscription matching `key`.
    ///
    /// Returns `false` when no subscription matches. The subscription keeps
    /// its threads sorted and its `latest` current; the list order is left
    /// for [`Database::sort`].
    pub fn add_thread(
        &mut self,
        key: &SubscriptionKey,
        thread: Thread,
    ) -> Result<bool, DatabaseError> {
        match self.position(key) {
            Some(i) => {
                self.subscriptions[i].add(thread)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn position(&self, key: &SubscriptionKey) -> Option<usize> {
        match key {
            SubscriptionKey::Sid(sid) => self
                .subscriptions
                .iter()
                .position(|sub| sub.sid() == Some(sid.as_str())),
            SubscriptionKey::Name(name) => {
                self.subscriptions.iter().position(|sub| sub.name() == name)
            }
            SubscriptionKey::Vid(vid) => {
                (1..=self.subscriptions.len()).contains(vid).then(|| vid - 1)
            }
        }
    }

    /// Sort every subscription's threads, then the subscriptions by
    /// descending `latest`. Ties keep their relative order.
    pub fn sort(&mut self) {
        for subscription in &mut self.subscriptions {
            subscription.sort();
        }
        self.subscriptions
            .sort_by(|a, b| b.latest().total_cmp(&a.latest()));
    }

    /// Hand a thread to a download agent.
    ///
    /// `options` override the configured defaults. The client is validated
    /// before anything is spawned and exactly one attempt is made.
    pub async fn download(
        &self,
        thread: &Thread,
        options: DownloadOptions,
    ) -> Result<ResolvedDownload, DatabaseError> {
        Ok(self.dispatcher.dispatch(thread, &options).await?)
    }

    /// Whether `client` names a supported download client.
    pub fn is_supported_client(client: &str) -> bool {
        download::is_supported_client(client)
    }

    /// Fetch new threads for every subscription and re-sort.
    ///
    /// Fetches run concurrently. A failing fetch is logged and reported
    /// without affecting the other subscriptions.
    pub async fn update(&mut self, fetcher: &dyn Fetcher) -> UpdateReport {
        let queries: Vec<FeedQuery> = self
            .subscriptions
            .iter()
            .map(FeedQuery::for_subscription)
            .collect();

        let results = join_all(queries.iter().map(|query| fetcher.fetch(query))).await;

        let mut report = UpdateReport::default();
        for (subscription, result) in self.subscriptions.iter_mut().zip(results) {
            match result {
                Ok(candidates) => {
                    let merged = subscription.merge(candidates);
                    if merged.added > 0 {
                        info!(
                            name = %subscription.name(),
                            added = merged.added,
                            latest = subscription.latest(),
                            "New threads"
                        );
                    }
                    report.fetched += 1;
                    report.merged.added += merged.added;
                    report.merged.duplicates += merged.duplicates;
                    report.merged.rejected += merged.rejected;
                }
                Err(error) => {
                    warn!(
                        fetcher = fetcher.name(),
                        name = %subscription.name(),
                        "Fetch failed: {}",
                        error
                    );
                    report.failures.push(UpdateFailure {
                        name: subscription.name().to_string(),
                        error,
                    });
                }
            }
        }

        self.sort();
        report
    }

    fn sids(&self) -> HashSet<String> {
        self.subscriptions
            .iter()
            .filter_map(|sub| sub.sid().map(str::to_string))
            .collect()
    }
}
