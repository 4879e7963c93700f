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

use super::cache::NodeCache;
use crate::domain::config::NodeConfig;
use crate::infrastructure::command::{CommandRunner, CommandSpec};
use crate::infrastructure::constants::FORMAT_NETWORK_ADDRESSES;
use crate::infrastructure::oci::{ContainerEngine, ContainerState, CopyAsset};
use crate::shared::error::{NodeError, Result, ResultExt};
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncRead;

/// Handle to one node container.
///
/// Obtained from [`NodeFactory::create_node`](super::NodeFactory::create_node) or
/// [`NodeFactory::find`](super::NodeFactory::find). The handle does not re-check that
/// the container still exists; after [`Node::remove`] it must not be used again.
pub struct Node {
    name: String,
    cache: NodeCache,
    runner: Arc<dyn CommandRunner>,
    engine: Arc<dyn ContainerEngine>,
    config: NodeConfig,
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("cache", &self.cache)
            .field("oci_binary", &self.config.oci_binary)
            .finish()
    }
}

/// Parent directory of `dest`, `.` for a bare file name.
fn parent_dir(dest: &str) -> String {
    match Path::new(dest).parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_string_lossy().into_owned(),
        _ => ".".to_string(),
    }
}

impl Node {
    pub(crate) fn new(
        name: impl Into<String>,
        runner: Arc<dyn CommandRunner>,
        engine: Arc<dyn ContainerEngine>,
        config: NodeConfig,
    ) -> Self {
        Self {
            name: name.into(),
            cache: NodeCache::new(),
            runner,
            engine,
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Addresses resolved so far, without querying the engine.
    pub fn cached_ip(&self) -> (String, String) {
        self.cache.ip()
    }

    /// Writes `content` to `dest` on the node and sets its mode to `perm`.
    ///
    /// Runs `mkdir -p`, `cp /dev/stdin` and `chmod` in order and stops at the first
    /// failure. Earlier steps are not undone.
    pub async fn write_file(
        &self,
        dest: &str,
        content: impl Into<Vec<u8>>,
        perm: &str,
    ) -> Result<()> {
        let dir = parent_dir(dest);
        self.runner
            .run_cmd(CommandSpec::new("mkdir").args(["-p", dir.as_str()]))
            .await
            .with_context(|| format!("failed to create directory {} for {}", dir, dest))?;

        if let Err(e) = self
            .runner
            .run_cmd(
                CommandSpec::new("cp")
                    .args(["/dev/stdin", dest])
                    .stdin_bytes(content),
            )
            .await
        {
            tracing::warn!(node = %self.name, dir = %dir, "write aborted, directory left in place");
            return Err(e.context(format!("failed to run: cp /dev/stdin {}", dest)));
        }

        if let Err(e) = self
            .runner
            .run_cmd(CommandSpec::new("chmod").args([perm, dest]))
            .await
        {
            tracing::warn!(node = %self.name, dest = %dest, "chmod failed, file left in place");
            return Err(e.context(format!("failed to run: chmod {} {}", perm, dest)));
        }

        tracing::debug!(node = %self.name, dest = %dest, perm = %perm, "file written");
        Ok(())
    }

    /// IPv4 and IPv6 address of the node. Cached once both are known.
    pub async fn ip(&self) -> Result<(String, String)> {
        let (cached_v4, cached_v6) = self.cache.ip();
        if !cached_v4.is_empty() && !cached_v6.is_empty() {
            return Ok((cached_v4, cached_v6));
        }

        let lines = self
            .engine
            .inspect(&self.name, FORMAT_NETWORK_ADDRESSES)
            .await
            .map_err(|e| NodeError::engine("inspect", e))
            .context("failed to get container details")?;
        if lines.len() != 1 {
            return Err(NodeError::malformed(format!(
                "file should only be one line, got {} lines",
                lines.len()
            )));
        }

        let ips: Vec<&str> = lines[0].split(',').collect();
        if ips.len() != 2 {
            return Err(NodeError::malformed(format!(
                "container addresses should have 2 values, got {} values",
                ips.len()
            )));
        }

        let (ipv4, ipv6) = (ips[0].to_string(), ips[1].to_string());
        self.cache.set(|cache| {
            cache.ipv4 = ipv4.clone();
            cache.ipv6 = ipv6.clone();
        });
        Ok((ipv4, ipv6))
    }

    /// Imports an image archive into the node's containerd image store.
    pub async fn load_image_archive(
        &self,
        image: impl AsyncRead + Send + Unpin + 'static,
    ) -> Result<()> {
        self.runner
            .run_cmd(
                CommandSpec::new("ctr")
                    .args([
                        format!("--namespace={}", self.config.image_namespace),
                        "images".to_string(),
                        "import".to_string(),
                        "-".to_string(),
                    ])
                    .stdin_reader(image),
            )
            .await
            .context("failed to load image")?;
        Ok(())
    }

    /// Copies a local file or directory into the node, then applies its permissions.
    pub async fn copy(&self, oci_binary: &str, asset: &CopyAsset) -> Result<()> {
        self.engine
            .copy(oci_binary, &self.name, asset)
            .await
            .map_err(|e| NodeError::engine("copy", e))
            .context("failed to copy file/folder")?;

        let target = asset.target_path();
        if let Err(e) = self
            .runner
            .run_cmd(CommandSpec::new("chmod").args([asset.permissions.as_str(), target.as_str()]))
            .await
        {
            tracing::warn!(node = %self.name, target = %target, "chmod failed, copied content left in place");
            return Err(e.context("failed to chmod file permissions"));
        }
        Ok(())
    }

    pub async fn status(&self) -> Result<ContainerState> {
        self.engine
            .status(&self.config.oci_binary, &self.name)
            .await
            .map_err(|e| NodeError::engine(format!("status of {}", self.name), e))
    }

    /// Pauses all processes in the node.
    pub async fn pause(&self) -> Result<()> {
        self.engine
            .pause(&self.config.oci_binary, &self.name)
            .await
            .map_err(|e| NodeError::engine(format!("pause {}", self.name), e))
    }

    pub async fn stop(&self) -> Result<()> {
        self.engine
            .stop(&self.name)
            .await
            .map_err(|e| NodeError::engine(format!("stop {}", self.name), e))
    }

    pub async fn remove(&self) -> Result<()> {
        self.engine
            .remove(&self.config.oci_binary, &self.name)
            .await
            .map_err(|e| NodeError::engine(format!("remove {}", self.name), e))?;
        tracing::info!(node = %self.name, "node removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir("/etc/kubernetes/admin.conf"), "/etc/kubernetes");
        assert_eq!(parent_dir("/admin.conf"), "/");
        assert_eq!(parent_dir("admin.conf"), ".");
    }
}
