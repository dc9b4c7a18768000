//! Mock download agent for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::download::{AgentOptions, DispatchError, DownloadAgent, DownloadClient};
use crate::subscription::Thread;

/// A recorded dispatch for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedDispatch {
    /// The thread that was handed over.
    pub thread: Thread,
    /// The resolved options it was handed over with.
    pub options: AgentOptions,
}

/// Mock implementation of the DownloadAgent trait.
///
/// Records every dispatch instead of spawning a process. Clones share state,
/// so a test can keep one handle and register another with a dispatcher.
///
/// # Example
///
/// ```rust,ignore
/// let agent = MockDownloadAgent::new(DownloadClient::Aria2);
/// let dispatcher = Dispatcher::new(config).with_agent(Arc::new(agent.clone()));
///
/// dispatcher.dispatch(&thread, &DownloadOptions::default()).await?;
///
/// assert_eq!(agent.dispatched().await.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockDownloadAgent {
    client: DownloadClient,
    /// Recorded dispatch calls.
    dispatched: Arc<RwLock<Vec<RecordedDispatch>>>,
    /// If set, the next dispatch exits with this code.
    next_exit_code: Arc<RwLock<Option<i32>>>,
}

impl MockDownloadAgent {
    /// Create a mock agent standing in for `client`.
    pub fn new(client: DownloadClient) -> Self {
        Self {
            client,
            dispatched: Arc::new(RwLock::new(Vec::new())),
            next_exit_code: Arc::new(RwLock::new(None)),
        }
    }

    /// Get all recorded dispatches.
    pub async fn dispatched(&self) -> Vec<RecordedDispatch> {
        self.dispatched.read().await.clone()
    }

    /// Make the next dispatch fail as if the agent exited with `code`.
    pub async fn fail_next_with_code(&self, code: i32) {
        *self.next_exit_code.write().await = Some(code);
    }
}

#[async_trait]
impl DownloadAgent for MockDownloadAgent {
    fn name(&self) -> &str {
        "mock"
    }

    fn client(&self) -> DownloadClient {
        self.client
    }

    async fn dispatch(&self, thread: &Thread, options: &AgentOptions) -> Result<(), DispatchError> {
        if let Some(code) = self.next_exit_code.write().await.take() {
            return Err(DispatchError::Exited {
                client: self.client,
                code: Some(code),
            });
        }

        self.dispatched.write().await.push(RecordedDispatch {
            thread: thread.clone(),
            options: options.clone(),
        });
        Ok(())
    }
}
