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

use super::types::{ContainerState, CopyAsset, CreateOpts};
use crate::infrastructure::command::{CommandRunner, CommandSpec};
use crate::infrastructure::constants::{FORMAT_CONTAINER_STATUS, FORMAT_SECURITY_OPTIONS};
use crate::shared::error::{NodeError, Result};
use std::sync::Arc;

/// Engine-level operations keyed by container name or id.
#[async_trait::async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Output lines of `inspect` rendered with a Go template.
    async fn inspect(&self, name: &str, format: &str) -> Result<Vec<String>>;

    async fn copy(&self, oci_binary: &str, name: &str, asset: &CopyAsset) -> Result<()>;

    async fn status(&self, oci_binary: &str, name: &str) -> Result<ContainerState>;

    async fn pause(&self, oci_binary: &str, name: &str) -> Result<()>;

    async fn stop(&self, name: &str) -> Result<()>;

    async fn remove(&self, oci_binary: &str, name: &str) -> Result<()>;

    /// Returns the id of the new container.
    async fn create_container(
        &self,
        oci_binary: &str,
        image: &str,
        opts: CreateOpts,
    ) -> Result<String>;

    /// Whether the engine daemon runs with userns-remap enabled.
    async fn userns_remap(&self) -> bool;
}

/// Drives the engine CLI (`docker`, `podman`) through a host runner.
#[derive(Clone)]
pub struct CliEngine {
    oci_binary: String,
    runner: Arc<dyn CommandRunner>,
}

impl CliEngine {
    pub fn new(oci_binary: impl Into<String>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            oci_binary: oci_binary.into(),
            runner,
        }
    }

    async fn run(&self, oci_binary: &str, args: Vec<String>) -> Result<Vec<String>> {
        let rr = self
            .runner
            .run_cmd(CommandSpec::new(oci_binary).args(args))
            .await?;
        Ok(rr.stdout_lines())
    }
}

/// True if any security option reported by `info` names userns.
pub fn has_userns_option(security_options: &[String]) -> bool {
    security_options.iter().any(|o| o.contains("name=userns"))
}

#[async_trait::async_trait]
impl ContainerEngine for CliEngine {
    async fn inspect(&self, name: &str, format: &str) -> Result<Vec<String>> {
        self.run(
            &self.oci_binary,
            vec![
                "inspect".to_string(),
                "-f".to_string(),
                format.to_string(),
                name.to_string(),
            ],
        )
        .await
    }

    async fn copy(&self, oci_binary: &str, name: &str, asset: &CopyAsset) -> Result<()> {
        self.run(
            oci_binary,
            vec![
                "cp".to_string(),
                asset.source_path.clone(),
                format!("{}:{}", name, asset.target_path()),
            ],
        )
        .await?;
        Ok(())
    }

    async fn status(&self, oci_binary: &str, name: &str) -> Result<ContainerState> {
        let lines = self
            .run(
                oci_binary,
                vec![
                    "inspect".to_string(),
                    "-f".to_string(),
                    FORMAT_CONTAINER_STATUS.to_string(),
                    name.to_string(),
                ],
            )
            .await?;
        match lines.as_slice() {
            [status] => status.parse(),
            _ => Err(NodeError::malformed(format!(
                "expected one status line for {}, got {}",
                name,
                lines.len()
            ))),
        }
    }

    async fn pause(&self, oci_binary: &str, name: &str) -> Result<()> {
        self.run(oci_binary, vec!["pause".to_string(), name.to_string()])
            .await?;
        Ok(())
    }

    async fn stop(&self, name: &str) -> Result<()> {
        self.run(&self.oci_binary, vec!["stop".to_string(), name.to_string()])
            .await?;
        Ok(())
    }

    async fn remove(&self, oci_binary: &str, name: &str) -> Result<()> {
        self.run(
            oci_binary,
            vec![
                "rm".to_string(),
                "-f".to_string(),
                "-v".to_string(),
                name.to_string(),
            ],
        )
        .await?;
        Ok(())
    }

    async fn create_container(
        &self,
        oci_binary: &str,
        image: &str,
        opts: CreateOpts,
    ) -> Result<String> {
        let mut args = vec!["run".to_string()];
        args.extend(opts.to_args());
        args.push(image.to_string());

        let lines = self.run(oci_binary, args).await?;
        Ok(lines.into_iter().next().unwrap_or_default())
    }

    async fn userns_remap(&self) -> bool {
        let lines = match self
            .run(
                &self.oci_binary,
                vec![
                    "info".to_string(),
                    "--format".to_string(),
                    FORMAT_SECURITY_OPTIONS.to_string(),
                ],
            )
            .await
        {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!(error = %e, "unable to query engine security options");
                return false;
            }
        };

        let raw = lines.join("");
        match serde_json::from_str::<Option<Vec<String>>>(&raw) {
            Ok(options) => has_userns_option(&options.unwrap_or_default()),
            Err(e) => {
                tracing::warn!(error = %e, output = %raw, "unexpected security options output");
                false
            }
        }
    }
}
