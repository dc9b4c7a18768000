//! aria2 and Deluge download agents.

use async_trait::async_trait;
use std::path::PathBuf;

use super::process::ProcessLauncher;
use super::types::{AgentOptions, DispatchError, DownloadAgent, DownloadClient};
use crate::subscription::Thread;

/// Hands threads to aria2 through its agent program.
#[derive(Debug, Clone)]
pub struct Aria2Agent {
    launcher: ProcessLauncher,
}

impl Aria2Agent {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            launcher: ProcessLauncher::new(DownloadClient::Aria2, program),
        }
    }
}

#[async_trait]
impl DownloadAgent for Aria2Agent {
    fn name(&self) -> &str {
        "aria2"
    }

    fn client(&self) -> DownloadClient {
        DownloadClient::Aria2
    }

    async fn dispatch(
        &self,
        thread: &Thread,
        options: &AgentOptions,
    ) -> Result<(), DispatchError> {
        self.launcher.run(thread, options).await
    }
}

/// Hands threads to Deluge through its agent program.
#[derive(Debug, Clone)]
pub struct DelugeAgent {
    launcher: ProcessLauncher,
}

impl DelugeAgent {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            launcher: ProcessLauncher::new(DownloadClient::Deluge, program),
        }
    }
}

#[async_trait]
impl DownloadAgent for DelugeAgent {
    fn name(&self) -> &str {
        "deluge"
    }

    fn client(&self) -> DownloadClient {
        DownloadClient::Deluge
    }

    async fn dispatch(
        &self,
        thread: &Thread,
        options: &AgentOptions,
    ) -> Result<(), DispatchError> {
        self.launcher.run(thread, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agents_report_their_client() {
        let aria2 = Aria2Agent::new("episub-aria2");
        let deluge = DelugeAgent::new("episub-deluge");
        assert_eq!(aria2.client(), DownloadClient::Aria2);
        assert_eq!(aria2.name(), "aria2");
        assert_eq!(deluge.client(), DownloadClient::Deluge);
        assert_eq!(deluge.name(), "deluge");
    }

    #[tokio::test]
    async fn test_agent_surfaces_launch_failure() {
        let agent = DelugeAgent::new("/nonexistent/episub-deluge");
        let thread = Thread::new("E1", "l1", vec![1.0]);
        let options = AgentOptions {
            destination: ".".to_string(),
            jsonrpc: String::new(),
        };

        let result = agent.dispatch(&thread, &options).await;

        assert!(matches!(result, Err(DispatchError::Launch { .. })));
    }
}
