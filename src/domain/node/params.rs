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

//! Declarative parameters for a new node container

use crate::domain::config::NodeConfig;
use crate::infrastructure::constants::{
    MAX_NODE_NAME_LEN, NODE_NAME_PATTERN, NODE_RUN_FLAGS, USERNS_HOST_FLAG,
};
use crate::infrastructure::oci::{Mount, PortMapping};
use crate::shared::error::{NodeError, Result};
use regex::Regex;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateParams {
    /// Container name and hostname
    pub name: String,
    /// Image the node container is created from
    pub image: String,
    /// Passed verbatim to `--label`
    pub cluster_label: String,
    pub role: String,
    pub mounts: Vec<Mount>,
    pub port_mappings: Vec<PortMapping>,
    pub cpus: String,
    pub memory: String,
    pub envs: HashMap<String, String>,
    /// Appended after the generated arguments, no conflict detection
    pub extra_args: Vec<String>,
}

impl CreateParams {
    pub fn validate(&self) -> Result<()> {
        let re = Regex::new(NODE_NAME_PATTERN)
            .map_err(|e| NodeError::invalid_params(format!("bad name pattern: {}", e)))?;
        if self.name.len() > MAX_NODE_NAME_LEN || !re.is_match(&self.name) {
            return Err(NodeError::invalid_params(format!(
                "invalid node name {:?}: must match {} and be at most {} characters",
                self.name, NODE_NAME_PATTERN, MAX_NODE_NAME_LEN
            )));
        }
        if self.image.trim().is_empty() {
            return Err(NodeError::invalid_params(format!(
                "node {} has no image",
                self.name
            )));
        }
        if let Some(key) = self
            .envs
            .keys()
            .find(|k| k.is_empty() || k.contains('='))
        {
            return Err(NodeError::invalid_params(format!(
                "invalid environment variable name {:?}",
                key
            )));
        }
        Ok(())
    }

    /// Engine `run` arguments for this node.
    pub fn run_args(&self, config: &NodeConfig, userns_remap: bool) -> Vec<String> {
        let mut args = vec![
            format!("--cpus={}", self.cpus),
            format!("--memory={}", self.memory),
        ];
        args.extend(NODE_RUN_FLAGS.iter().map(|f| f.to_string()));
        args.extend([
            "--hostname".to_string(),
            self.name.clone(),
            "--name".to_string(),
            self.name.clone(),
            "--label".to_string(),
            self.cluster_label.clone(),
            "--label".to_string(),
            config.role_label(&self.role),
        ]);

        for (key, val) in &self.envs {
            args.push("-e".to_string());
            args.push(format!("{}={}", key, val));
        }

        args.extend(self.extra_args.iter().cloned());

        if userns_remap {
            args.push(USERNS_HOST_FLAG.to_string());
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> CreateParams {
        CreateParams {
            name: "n1".to_string(),
            image: "img:tag".to_string(),
            cluster_label: "io.k8s.sigs.kic.cluster=kic".to_string(),
            role: "control-plane".to_string(),
            cpus: "2".to_string(),
            memory: "2g".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_run_args_fixed_layout() {
        let args = params().run_args(&NodeConfig::default(), false);
        assert_eq!(
            args,
            vec![
                "--cpus=2",
                "--memory=2g",
                "-d",
                "-t",
                "--privileged",
                "--security-opt",
                "seccomp=unconfined",
                "--tmpfs",
                "/tmp",
                "--tmpfs",
                "/run",
                "-v",
                "/lib/modules:/lib/modules:ro",
                "--hostname",
                "n1",
                "--name",
                "n1",
                "--label",
                "io.k8s.sigs.kic.cluster=kic",
                "--label",
                "io.k8s.sigs.kic.role=control-plane",
            ]
        );
    }

    #[test]
    fn test_run_args_env_extra_and_userns() {
        let mut p = params();
        p.envs.insert("container".to_string(), "docker".to_string());
        p.envs.insert("KUBECONFIG".to_string(), "/etc/admin.conf".to_string());
        p.extra_args = vec!["--network".to_string(), "kic".to_string()];

        let args = p.run_args(&NodeConfig::default(), true);
        assert_eq!(args.iter().filter(|a| *a == "-e").count(), 2);
        assert!(args.contains(&"container=docker".to_string()));
        assert!(args.contains(&"KUBECONFIG=/etc/admin.conf".to_string()));

        let n = args.len();
        assert_eq!(&args[n - 3..], &["--network", "kic", "--userns=host"]);
    }

    #[test]
    fn test_run_args_role_key_from_config() {
        let config = NodeConfig {
            role_label_key: "example.com/role".to_string(),
            ..Default::default()
        };
        let args = params().run_args(&config, false);
        assert_eq!(args.last().unwrap(), "example.com/role=control-plane");
    }

    #[test]
    fn test_validate() {
        assert!(params().validate().is_ok());

        let mut p = params();
        p.name = "-bad".to_string();
        assert!(matches!(p.validate(), Err(NodeError::InvalidParams(_))));

        let mut p = params();
        p.name = "a".repeat(64);
        assert!(p.validate().is_err());

        let mut p = params();
        p.image = " ".to_string();
        assert!(p.validate().is_err());

        let mut p = params();
        p.envs.insert("A=B".to_string(), "c".to_string());
        assert!(p.validate().is_err());
    }
}
