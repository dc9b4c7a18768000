//! Types for download dispatch.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use crate::subscription::Thread;

/// Errors that can occur while handing a thread to a download client.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Unsupported download client: {0}")]
    UnsupportedClient(String),

    #[error("No agent registered for download client: {0}")]
    AgentUnavailable(DownloadClient),

    #[error("Failed to launch {}: {source}", .program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{client} agent exited with {}", exit_label(.code))]
    Exited {
        client: DownloadClient,
        code: Option<i32>,
    },

    #[error("Failed to encode agent arguments: {0}")]
    Encode(#[from] serde_json::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Supported download clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadClient {
    Aria2,
    Deluge,
}

impl DownloadClient {
    pub const ALL: [DownloadClient; 2] = [DownloadClient::Aria2, DownloadClient::Deluge];

    /// Returns the configuration/CLI name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadClient::Aria2 => "aria2",
            DownloadClient::Deluge => "deluge",
        }
    }
}

impl fmt::Display for DownloadClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DownloadClient {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DownloadClient::ALL
            .into_iter()
            .find(|client| client.as_str() == s)
            .ok_or_else(|| DispatchError::UnsupportedClient(s.to_string()))
    }
}

/// Whether `client` names a supported download client.
pub fn is_supported_client(client: &str) -> bool {
    client.parse::<DownloadClient>().is_ok()
}

/// Per-call overrides of the configured download defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
}

impl DownloadOptions {
    /// Set the client.
    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = Some(client.into());
        self
    }

    /// Set the destination directory.
    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Set the JSON-RPC endpoint.
    pub fn with_jsonrpc(mut self, jsonrpc: impl Into<String>) -> Self {
        self.jsonrpc = Some(jsonrpc.into());
        self
    }
}

/// Effective settings for one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDownload {
    pub client: DownloadClient,
    pub options: AgentOptions,
}

/// Options handed to the agent program as its second argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentOptions {
    pub destination: String,
    pub jsonrpc: String,
}

/// A capability able to hand a thread over to one download client.
#[async_trait]
pub trait DownloadAgent: Send + Sync {
    /// Agent name for logging.
    fn name(&self) -> &str;

    /// The client this agent drives.
    fn client(&self) -> DownloadClient;

    /// Dispatch a single thread. Resolves once the client accepted it.
    async fn dispatch(
        &self,
        thread: &Thread,
        options: &AgentOptions,
    ) -> Result<(), DispatchError>;
}
