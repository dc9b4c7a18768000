//! Resolution of download options and routing to agents.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use super::agents::{Aria2Agent, DelugeAgent};
use super::types::{
    AgentOptions, DispatchError, DownloadAgent, DownloadClient, DownloadOptions,
    ResolvedDownload,
};
use crate::config::DownloadConfig;
use crate::subscription::Thread;

/// Routes threads to the agent of the requested client.
///
/// Explicit [`DownloadOptions`] win over the configured defaults. The client
/// is checked before any agent is involved, so an unsupported client never
/// spawns a process.
pub struct Dispatcher {
    defaults: DownloadConfig,
    agents: HashMap<DownloadClient, Arc<dyn DownloadAgent>>,
}

impl Dispatcher {
    /// Create a dispatcher with no agents registered.
    pub fn new(defaults: DownloadConfig) -> Self {
        Self {
            defaults,
            agents: HashMap::new(),
        }
    }

    /// Create a dispatcher with the process agents named in the config.
    pub fn from_config(config: &DownloadConfig) -> Self {
        Self::new(config.clone())
            .with_agent(Arc::new(Aria2Agent::new(config.agents.aria2.clone())))
            .with_agent(Arc::new(DelugeAgent::new(config.agents.deluge.clone())))
    }

    /// Register (or replace) the agent for its client.
    pub fn with_agent(mut self, agent: Arc<dyn DownloadAgent>) -> Self {
        self.agents.insert(agent.client(), agent);
        self
    }

    pub fn defaults(&self) -> &DownloadConfig {
        &self.defaults
    }

    /// Merge `options` over the defaults and validate the client.
    pub fn resolve(&self, options: &DownloadOptions) -> Result<ResolvedDownload, DispatchError> {
        let client = options
            .client
            .as_deref()
            .unwrap_or(self.defaults.client.as_str())
            .parse::<DownloadClient>()?;

        Ok(ResolvedDownload {
            client,
            options: AgentOptions {
                destination: options
                    .destination
                    .clone()
                    .unwrap_or_else(|| self.defaults.destination.clone()),
                jsonrpc: options
                    .jsonrpc
                    .clone()
                    .unwrap_or_else(|| self.defaults.jsonrpc.clone()),
            },
        })
    }

    /// Dispatch one thread. Exactly one attempt is made.
    pub async fn dispatch(
        &self,
        thread: &Thread,
        options: &DownloadOptions,
    ) -> Result<ResolvedDownload, DispatchError> {
        let resolved = self.resolve(options)?;
        let agent = self
            .agents
            .get(&resolved.client)
            .ok_or(DispatchError::AgentUnavailable(resolved.client))?;

        agent.dispatch(thread, &resolved.options).await?;

        info!(
            client = %resolved.client,
            title = %thread.title,
            destination = %resolved.options.destination,
            "Dispatched thread"
        );
        Ok(resolved)
    }
}
