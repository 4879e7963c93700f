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

//! Value objects exchanged with the container engine

use crate::infrastructure::constants::DEFAULT_ASSET_PERMISSIONS;
use crate::shared::error::NodeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Container state as observed through the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerState {
    None,
    Running,
    Paused,
    Starting,
    Stopping,
    Stopped,
    Error,
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "",
            Self::Running => "Running",
            Self::Paused => "Paused",
            Self::Starting => "Starting",
            Self::Stopping => "Stopping",
            Self::Stopped => "Stopped",
            Self::Error => "Error",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ContainerState {
    type Err = NodeError;

    /// Parses the engine's `{{.State.Status}}` value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "running" => Ok(Self::Running),
            "paused" => Ok(Self::Paused),
            "restarting" => Ok(Self::Starting),
            "removing" => Ok(Self::Stopping),
            "created" | "exited" => Ok(Self::Stopped),
            "dead" => Ok(Self::Error),
            other => Err(NodeError::malformed(format!(
                "unknown container status {:?}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MountPropagation {
    /// Private, the engine default
    #[default]
    None,
    HostToContainer,
    Bidirectional,
}

/// A host path bound into the node container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mount {
    pub container_path: String,
    pub host_path: String,
    pub readonly: bool,
    pub selinux_relabel: bool,
    pub propagation: MountPropagation,
}

impl Mount {
    pub fn new(host_path: impl Into<String>, container_path: impl Into<String>) -> Self {
        Self {
            host_path: host_path.into(),
            container_path: container_path.into(),
            ..Default::default()
        }
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn to_arg(&self) -> String {
        let mut bind = format!("{}:{}", self.host_path, self.container_path);
        let mut attrs = Vec::new();
        if self.readonly {
            attrs.push("ro");
        }
        if self.selinux_relabel {
            attrs.push("Z");
        }
        match self.propagation {
            MountPropagation::None => {}
            MountPropagation::HostToContainer => attrs.push("rslave"),
            MountPropagation::Bidirectional => attrs.push("rshared"),
        }
        if !attrs.is_empty() {
            bind = format!("{}:{}", bind, attrs.join(","));
        }
        format!("--volume={}", bind)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortProtocol {
    #[default]
    Tcp,
    Udp,
    Sctp,
}

impl fmt::Display for PortProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => write!(f, "tcp"),
            Self::Udp => write!(f, "udp"),
            Self::Sctp => write!(f, "sctp"),
        }
    }
}

impl FromStr for PortProtocol {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(Self::Tcp),
            "udp" => Ok(Self::Udp),
            "sctp" => Ok(Self::Sctp),
            other => Err(NodeError::invalid_params(format!(
                "unknown port protocol: {}",
                other
            ))),
        }
    }
}

/// A container port published on the host. A `host_port` of 0 lets the engine pick one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortMapping {
    pub container_port: u16,
    pub host_port: u16,
    pub listen_address: String,
    pub protocol: PortProtocol,
}

impl Default for PortMapping {
    fn default() -> Self {
        Self {
            container_port: 0,
            host_port: 0,
            listen_address: "127.0.0.1".to_string(),
            protocol: PortProtocol::Tcp,
        }
    }
}

impl PortMapping {
    pub fn to_arg(&self) -> String {
        let host_port = if self.host_port == 0 {
            String::new()
        } else {
            self.host_port.to_string()
        };
        format!(
            "--publish={}:{}:{}/{}",
            self.listen_address, host_port, self.container_port, self.protocol
        )
    }
}

/// A local file or directory to place inside the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyAsset {
    pub source_path: String,
    pub target_dir: String,
    pub target_name: String,
    pub permissions: String,
}

impl CopyAsset {
    pub fn new(
        source_path: impl Into<String>,
        target_dir: impl Into<String>,
        target_name: impl Into<String>,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            target_dir: target_dir.into(),
            target_name: target_name.into(),
            permissions: DEFAULT_ASSET_PERMISSIONS.to_string(),
        }
    }

    pub fn with_permissions(mut self, permissions: impl Into<String>) -> Self {
        self.permissions = permissions.into();
        self
    }

    /// `target_name` alone when no directory is set, relative to the engine's working directory.
    pub fn target_path(&self) -> String {
        if self.target_dir.is_empty() {
            return self.target_name.clone();
        }
        format!(
            "{}/{}",
            self.target_dir.trim_end_matches('/'),
            self.target_name
        )
    }
}

/// Options for `run`: raw run arguments, mounts and port mappings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateOpts {
    pub run_args: Vec<String>,
    pub mounts: Vec<Mount>,
    pub port_mappings: Vec<PortMapping>,
}

impl CreateOpts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_run_args(mut self, args: Vec<String>) -> Self {
        self.run_args.extend(args);
        self
    }

    pub fn with_mounts(mut self, mounts: Vec<Mount>) -> Self {
        self.mounts.extend(mounts);
        self
    }

    pub fn with_port_mappings(mut self, port_mappings: Vec<PortMapping>) -> Self {
        self.port_mappings.extend(port_mappings);
        self
    }

    /// Arguments following `run`, without the image.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = self.run_args.clone();
        args.extend(self.mounts.iter().map(Mount::to_arg));
        args.extend(self.port_mappings.iter().map(PortMapping::to_arg));
        args
    }
}
