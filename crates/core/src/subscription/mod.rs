//! Subscriptions and the episode matching engine.
//!
//! This module provides the `Subscription` entity, which keeps the threads
//! discovered for one feed in newest-first order, the `EpisodeSelector` used to
//! pick threads by episode number, and sid generation.

mod selector;
pub mod sid;
mod thread;
mod types;

pub use selector::{EpisodeSelector, SelectorError, SelectorToken};
pub use sid::SidError;
pub use thread::{Thread, ThreadId, ValidationError};
pub use types::{MergeReport, Subscription, NO_EPISODE};
