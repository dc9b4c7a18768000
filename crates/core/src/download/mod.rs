//! Download dispatch.
//!
//! This module provides a `DownloadAgent` trait for handing threads to a
//! download client (aria2, Deluge) and the `Dispatcher` that resolves per-call
//! options against the configured defaults.

mod agents;
mod dispatcher;
mod process;
mod types;

pub use agents::{Aria2Agent, DelugeAgent};
pub use dispatcher::Dispatcher;
pub use process::ProcessLauncher;
pub use types::*;
