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

use super::handle::Node;
use super::params::CreateParams;
use crate::domain::config::NodeConfig;
use crate::infrastructure::command::CommandRunner;
use crate::infrastructure::constants::FORMAT_CONTAINER_ID;
use crate::infrastructure::oci::{ContainerEngine, CreateOpts};
use crate::shared::error::{NodeError, Result};
use std::sync::Arc;

/// Provisions node containers and binds handles to existing ones.
#[derive(Clone)]
pub struct NodeFactory {
    engine: Arc<dyn ContainerEngine>,
    config: NodeConfig,
}

impl NodeFactory {
    pub fn new(engine: Arc<dyn ContainerEngine>, config: NodeConfig) -> Self {
        Self { engine, config }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Creates the node container and returns a handle bound to `runner`.
    ///
    /// If the container is created but cannot be found afterwards, the error is
    /// `NodeError::NotBound` carrying the container name, so callers can still clean
    /// it up (see [`NodeError::orphaned_container`]).
    pub async fn create_node(
        &self,
        params: CreateParams,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Node> {
        params.validate()?;

        let userns_remap = self.engine.userns_remap().await;
        let run_args = params.run_args(&self.config, userns_remap);
        let opts = CreateOpts::new()
            .with_run_args(run_args)
            .with_mounts(params.mounts)
            .with_port_mappings(params.port_mappings);

        let id = self
            .engine
            .create_container(&self.config.oci_binary, &params.image, opts)
            .await
            .map_err(|e| NodeError::engine("oci create", e))?;
        tracing::info!(node = %params.name, id = %id, image = %params.image, "node container created");

        self.find(&params.name, runner)
            .await
            .map_err(|e| NodeError::NotBound {
                name: params.name.clone(),
                source: Box::new(e),
            })
    }

    /// Returns a fresh handle for an existing container.
    pub async fn find(&self, name: &str, runner: Arc<dyn CommandRunner>) -> Result<Node> {
        let lines = self
            .engine
            .inspect(name, FORMAT_CONTAINER_ID)
            .await
            .map_err(|e| NodeError::not_found(name, e))?;
        if lines.iter().all(|l| l.trim().is_empty()) {
            return Err(NodeError::not_found(
                name,
                NodeError::malformed("engine returned no container id"),
            ));
        }

        Ok(Node::new(
            name,
            runner,
            Arc::clone(&self.engine),
            self.config.clone(),
        ))
    }
}
