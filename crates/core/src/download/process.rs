//! Process adapter shared by the download agents.
//!
//! An agent program receives two positional arguments: the thread as JSON and
//! `{destination, jsonrpc}` as JSON. It inherits our stdio and reports success
//! through exit code 0.

use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

use super::types::{AgentOptions, DispatchError, DownloadClient};
use crate::subscription::Thread;

/// Launches an external agent program for one client.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    client: DownloadClient,
    program: PathBuf,
}

impl ProcessLauncher {
    pub fn new(client: DownloadClient, program: impl Into<PathBuf>) -> Self {
        Self {
            client,
            program: program.into(),
        }
    }

    /// Builds the two positional arguments passed to the program.
    pub fn build_args(
        thread: &Thread,
        options: &AgentOptions,
    ) -> Result<[String; 2], DispatchError> {
        Ok([serde_json::to_string(thread)?, serde_json::to_string(options)?])
    }

    /// Run the program to completion. One attempt, no timeout.
    pub async fn run(&self, thread: &Thread, options: &AgentOptions) -> Result<(), DispatchError> {
        let args = Self::build_args(thread, options)?;

        debug!(
            client = %self.client,
            program = %self.program.display(),
            title = %thread.title,
            "Launching download agent"
        );

        let status = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| DispatchError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            warn!(
                client = %self.client,
                title = %thread.title,
                code = ?status.code(),
                "Download agent failed"
            );
            Err(DispatchError::Exited {
                client: self.client,
                code: status.code(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> AgentOptions {
        AgentOptions {
            destination: "/downloads".to_string(),
            jsonrpc: "http://localhost:6800/jsonrpc".to_string(),
        }
    }

    #[test]
    fn test_build_args() {
        let thread = Thread::new("Show - 01", "magnet:?xt=urn:btih:abc", vec![1.0]);
        let [first, second] = ProcessLauncher::build_args(&thread, &options()).unwrap();

        let decoded: Thread = serde_json::from_str(&first).unwrap();
        assert_eq!(decoded, thread);

        let decoded: AgentOptions = serde_json::from_str(&second).unwrap();
        assert_eq!(decoded, options());
    }

    #[tokio::test]
    async fn test_missing_program_is_launch_error() {
        let launcher = ProcessLauncher::new(
            DownloadClient::Aria2,
            "/nonexistent/episub-agent-that-does-not-exist",
        );
        let thread = Thread::new("E1", "l1", vec![1.0]);

        let result = launcher.run(&thread, &options()).await;

        assert!(matches!(result, Err(DispatchError::Launch { .. })));
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        fn script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
            let path = dir.path().join(name);
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            let mut perms = std::fs::metadata(&path).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&path, perms).unwrap();
            path
        }

        #[tokio::test]
        async fn test_zero_exit_is_success_and_args_are_passed() {
            let dir = TempDir::new().unwrap();
            let out = dir.path().join("args.txt");
            let program = script(
                &dir,
                "agent.sh",
                &format!(
                    "printf '%s\\n%s\\n' \"$1\" \"$2\" > '{}'",
                    out.display()
                ),
            );
            let launcher = ProcessLauncher::new(DownloadClient::Deluge, program);
            let thread = Thread::new("E1", "l1", vec![1.0]);

            launcher.run(&thread, &options()).await.unwrap();

            let written = std::fs::read_to_string(&out).unwrap();
            let mut lines = written.lines();
            let decoded: Thread = serde_json::from_str(lines.next().unwrap()).unwrap();
            assert_eq!(decoded, thread);
            let decoded: AgentOptions = serde_json::from_str(lines.next().unwrap()).unwrap();
            assert_eq!(decoded.destination, "/downloads");
        }

        #[tokio::test]
        async fn test_non_zero_exit_carries_code() {
            let dir = TempDir::new().unwrap();
            let program = script(&dir, "agent.sh", "exit 7");
            let launcher = ProcessLauncher::new(DownloadClient::Aria2, program);
            let thread = Thread::new("E1", "l1", vec![1.0]);

            let result = launcher.run(&thread, &options()).await;

            match result {
                Err(DispatchError::Exited { client, code }) => {
                    assert_eq!(client, DownloadClient::Aria2);
                    assert_eq!(code, Some(7));
                }
                other => panic!("Expected Exited error, got {:?}", other),
            }
        }
    }
}
