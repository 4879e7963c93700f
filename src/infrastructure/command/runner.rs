// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Command runners: the single path by which the crate touches processes

use super::spec::{CommandInput, CommandSpec, RunResult};
use crate::shared::error::{NodeError, Result};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[async_trait::async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs the command to completion. A non-zero exit is an `ExecutionFailure`.
    async fn run_cmd(&self, spec: CommandSpec) -> Result<RunResult>;
}

/// Runs commands on the local host.
#[derive(Debug, Clone, Default)]
pub struct HostRunner {
    timeout: Option<Duration>,
}

impl HostRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    async fn run_inner(&self, spec: CommandSpec, command_line: &str) -> Result<RunResult> {
        let CommandSpec {
            program,
            args,
            stdin,
        } = spec;

        let mut cmd = Command::new(&program);
        cmd.args(&args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| NodeError::ExecutionFailure {
            command: command_line.to_string(),
            output: String::new(),
            source: Some(e),
        })?;

        let pipe = child.stdin.take();
        let feed = async move {
            if let (Some(input), Some(mut pipe)) = (stdin, pipe) {
                match input {
                    CommandInput::Bytes(bytes) => pipe.write_all(&bytes).await?,
                    CommandInput::Reader(mut reader) => {
                        tokio::io::copy(&mut reader, &mut pipe).await?;
                    }
                }
                pipe.shutdown().await?;
            }
            Ok::<(), std::io::Error>(())
        };

        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output.map_err(|e| NodeError::ExecutionFailure {
            command: command_line.to_string(),
            output: String::new(),
            source: Some(e),
        })?;

        let rr = RunResult {
            command: command_line.to_string(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !output.status.success() {
            return Err(NodeError::execution(
                format!("{} ({})", command_line, output.status),
                rr.output(),
            ));
        }

        // the process exited cleanly but did not take all of its input
        if let Err(e) = fed {
            return Err(NodeError::ExecutionFailure {
                command: command_line.to_string(),
                output: rr.output(),
                source: Some(e),
            });
        }

        Ok(rr)
    }
}

#[async_trait::async_trait]
impl CommandRunner for HostRunner {
    async fn run_cmd(&self, spec: CommandSpec) -> Result<RunResult> {
        let command_line = spec.to_string();
        tracing::debug!(command = %command_line, "running command");

        match self.timeout {
            Some(after) => tokio::time::timeout(after, self.run_inner(spec, &command_line))
                .await
                .map_err(|_| NodeError::Timeout {
                    command: command_line.clone(),
                    after,
                })?,
            None => self.run_inner(spec, &command_line).await,
        }
    }
}

/// Runs commands inside a container through `<oci> exec`.
#[derive(Clone)]
pub struct ExecRunner {
    oci_binary: String,
    container: String,
    inner: Arc<dyn CommandRunner>,
}

impl ExecRunner {
    pub fn new(
        oci_binary: impl Into<String>,
        container: impl Into<String>,
        inner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            oci_binary: oci_binary.into(),
            container: container.into(),
            inner,
        }
    }

    /// Rewrites `spec` into the equivalent `<oci> exec` invocation.
    pub fn wrap(&self, spec: CommandSpec) -> CommandSpec {
        let mut args = vec!["exec".to_string(), "--privileged".to_string()];
        if spec.has_stdin() {
            args.push("-i".to_string());
        }
        args.push(self.container.clone());
        args.push(spec.program);
        args.extend(spec.args);

        CommandSpec {
            program: self.oci_binary.clone(),
            args,
            stdin: spec.stdin,
        }
    }
}

#[async_trait::async_trait]
impl CommandRunner for ExecRunner {
    async fn run_cmd(&self, spec: CommandSpec) -> Result<RunResult> {
        self.inner.run_cmd(self.wrap(spec)).await
    }
}
