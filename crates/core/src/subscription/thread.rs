//! Threads: single releases discovered on a feed.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

/// Reasons a candidate thread is rejected by [`Subscription::add`].
///
/// [`Subscription::add`]: super::Subscription::add
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Thread has an empty title")]
    EmptyTitle,

    #[error("Thread '{title}' has an empty link")]
    EmptyLink { title: String },

    #[error("Thread '{title}' carries no episode numbers")]
    NoEpisodes { title: String },

    #[error("Thread '{title}' has a non-finite episode number: {value}")]
    NonFiniteEpisode { title: String, value: f64 },
}

/// Stable identity of a thread, derived from its title and link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreadId(String);

impl ThreadId {
    /// Hex digest backing this id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One discovered release.
///
/// `ep` holds more than one number when the release bundles several episodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    /// Release title as published on the feed.
    pub title: String,
    /// Download link (magnet URI or torrent URL).
    pub link: String,
    /// Episode numbers, in the order they were extracted.
    pub ep: Vec<f64>,
}

impl Thread {
    /// Create a thread. No validation happens until it is added to a subscription.
    pub fn new(title: impl Into<String>, link: impl Into<String>, ep: Vec<f64>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            ep,
        }
    }

    /// Content-derived identity, independent of where the thread is stored.
    pub fn id(&self) -> ThreadId {
        let mut hasher = Sha256::new();
        hasher.update(self.title.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.link.as_bytes());
        ThreadId(format!("{:x}", hasher.finalize()))
    }

    /// Check the title/link/episode contract.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.link.is_empty() {
            return Err(ValidationError::EmptyLink {
                title: self.title.clone(),
            });
        }
        if self.ep.is_empty() {
            return Err(ValidationError::NoEpisodes {
                title: self.title.clone(),
            });
        }
        if let Some(value) = self.ep.iter().copied().find(|e| !e.is_finite()) {
            return Err(ValidationError::NonFiniteEpisode {
                title: self.title.clone(),
                value,
            });
        }
        Ok(())
    }

    /// Whether this release includes episode `episode`.
    pub fn contains_episode(&self, episode: f64) -> bool {
        self.ep.iter().any(|e| *e == episode)
    }

    /// The sort key: first listed episode.
    pub fn leading_episode(&self) -> f64 {
        self.ep.first().copied().unwrap_or(f64::NEG_INFINITY)
    }

    /// Last listed episode (the newest one in a batch).
    pub fn last_episode(&self) -> Option<f64> {
        self.ep.last().copied()
    }

    /// Human readable episode label, e.g. `12` or `1-12`.
    pub fn episode_label(&self) -> String {
        match self.ep.as_slice() {
            [] => String::from("?"),
            [single] => single.to_string(),
            [first, .., last] => format!("{}-{}", first, last),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_well_formed_thread() {
        let thread = Thread::new("Show - 01", "magnet:?xt=urn:btih:aaa", vec![1.0]);
        assert!(thread.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_title() {
        let thread = Thread::new("", "l1", vec![1.0]);
        assert_eq!(thread.validate(), Err(ValidationError::EmptyTitle));
    }

    #[test]
    fn test_validate_rejects_empty_link() {
        let thread = Thread::new("E1", "", vec![1.0]);
        assert!(matches!(
            thread.validate(),
            Err(ValidationError::EmptyLink { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_missing_episodes() {
        let thread = Thread::new("E1", "l1", vec![]);
        assert!(matches!(
            thread.validate(),
            Err(ValidationError::NoEpisodes { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_non_finite_episode() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let thread = Thread::new("E1", "l1", vec![1.0, bad]);
            assert!(matches!(
                thread.validate(),
                Err(ValidationError::NonFiniteEpisode { .. })
            ));
        }
    }

    #[test]
    fn test_id_depends_on_title_and_link_only() {
        let a = Thread::new("E1", "l1", vec![1.0]);
        let b = Thread::new("E1", "l1", vec![2.0]);
        let c = Thread::new("E1", "l2", vec![1.0]);
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
        assert_eq!(a.id().as_str().len(), 64);
    }

    #[test]
    fn test_id_is_not_fooled_by_concatenation() {
        let a = Thread::new("ab", "c", vec![1.0]);
        let b = Thread::new("a", "bc", vec![1.0]);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_contains_episode() {
        let thread = Thread::new("Batch", "l", vec![1.0, 2.0, 3.0]);
        assert!(thread.contains_episode(2.0));
        assert!(!thread.contains_episode(4.0));
    }

    #[test]
    fn test_episode_label() {
        assert_eq!(Thread::new("a", "b", vec![5.0]).episode_label(), "5");
        assert_eq!(Thread::new("a", "b", vec![12.5]).episode_label(), "12.5");
        assert_eq!(
            Thread::new("a", "b", vec![1.0, 2.0, 3.0]).episode_label(),
            "1-3"
        );
    }

    #[test]
    fn test_thread_serialization_shape() {
        let thread = Thread::new("E1", "l1", vec![1.0]);
        let json = serde_json::to_value(&thread).unwrap();
        assert_eq!(json["title"], "E1");
        assert_eq!(json["link"], "l1");
        assert_eq!(json["ep"][0], 1.0);
    }
}
