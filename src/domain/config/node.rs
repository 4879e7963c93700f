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

//! Injectable defaults for node handles

use crate::infrastructure::constants::{
    CLUSTER_LABEL_KEY, DEFAULT_OCI, K8S_IMAGE_NAMESPACE, NODE_ROLE_KEY,
};
use crate::shared::error::{NodeError, Result};
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::Path;
use std::time::Duration;

/// Identifiers shared by every node of a tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Engine binary used for status, pause, remove and create
    pub oci_binary: String,
    pub cluster_label_key: String,
    pub role_label_key: String,
    /// containerd namespace images are imported into
    pub image_namespace: String,
    pub command_timeout_secs: Option<u64>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            oci_binary: DEFAULT_OCI.to_string(),
            cluster_label_key: CLUSTER_LABEL_KEY.to_string(),
            role_label_key: NODE_ROLE_KEY.to_string(),
            image_namespace: K8S_IMAGE_NAMESPACE.to_string(),
            command_timeout_secs: None,
        }
    }
}

impl NodeConfig {
    /// Load configuration from a TOML or YAML file, chosen by extension.
    pub fn from<T: AsRef<Path>>(path: T) -> Result<Self> {
        let path = path.as_ref();
        let content = read_to_string(path).map_err(|e| {
            NodeError::config_error(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let conf: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            _ => toml::from_str(&content)?,
        };
        conf.validate()?;
        Ok(conf)
    }

    /// Defaults when no path is given.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => Self::from(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.oci_binary.trim().is_empty() {
            return Err(NodeError::config_error("oci_binary must not be empty"));
        }
        if self.role_label_key.trim().is_empty() {
            return Err(NodeError::config_error("role_label_key must not be empty"));
        }
        if self.image_namespace.trim().is_empty() {
            return Err(NodeError::config_error("image_namespace must not be empty"));
        }
        if self.command_timeout_secs == Some(0) {
            return Err(NodeError::config_error(
                "command_timeout_secs must be > 0 when set",
            ));
        }
        Ok(())
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_secs.map(Duration::from_secs)
    }

    /// `<cluster_label_key>=<cluster>`
    pub fn cluster_label(&self, cluster: &str) -> String {
        format!("{}={}", self.cluster_label_key, cluster)
    }

    /// `<role_label_key>=<role>`
    pub fn role_label(&self, role: &str) -> String {
        format!("{}={}", self.role_label_key, role)
    }
}
