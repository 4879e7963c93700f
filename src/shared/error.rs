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

use std::time::Duration;
use thiserror::Error;
pub type Result<T> = std::result::Result<T, NodeError>;

#[derive(Error, Debug)]
pub enum NodeError {
    #[error("command failed: {command}, output: {output:?}")]
    ExecutionFailure {
        command: String,
        output: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("malformed output: {0}")]
    MalformedOutput(String),

    #[error("can't find node '{name}'")]
    NotFound {
        name: String,
        #[source]
        source: Box<NodeError>,
    },

    #[error("{operation} failed")]
    EngineFailure {
        operation: String,
        #[source]
        source: Box<NodeError>,
    },

    #[error("{context}")]
    Context {
        context: String,
        #[source]
        source: Box<NodeError>,
    },

    #[error("container '{name}' was created but could not be bound to a node")]
    NotBound {
        name: String,
        #[source]
        source: Box<NodeError>,
    },

    #[error("command timed out after {after:?}: {command}")]
    Timeout { command: String, after: Duration },

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl NodeError {
    pub fn execution(command: impl Into<String>, output: impl Into<String>) -> Self {
        Self::ExecutionFailure {
            command: command.into(),
            output: output.into(),
            source: None,
        }
    }

    pub fn malformed(context: impl Into<String>) -> Self {
        Self::MalformedOutput(context.into())
    }

    pub fn not_found(name: impl Into<String>, source: NodeError) -> Self {
        Self::NotFound {
            name: name.into(),
            source: Box::new(source),
        }
    }

    pub fn engine(operation: impl Into<String>, source: NodeError) -> Self {
        Self::EngineFailure {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    pub fn invalid_params(context: impl Into<String>) -> Self {
        Self::InvalidParams(context.into())
    }

    pub fn config_error(context: impl Into<String>) -> Self {
        Self::ConfigError(context.into())
    }

    /// Name of a container that exists in the engine without a usable handle.
    pub fn orphaned_container(&self) -> Option<&str> {
        match self {
            Self::NotBound { name, .. } => Some(name),
            Self::Context { source, .. } => source.orphaned_container(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Context { source, .. } | Self::NotBound { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    pub fn is_malformed_output(&self) -> bool {
        match self {
            Self::MalformedOutput(_) => true,
            Self::Context { source, .. } => source.is_malformed_output(),
            _ => false,
        }
    }

    pub fn is_execution_failure(&self) -> bool {
        match self {
            Self::ExecutionFailure { .. } | Self::Timeout { .. } => true,
            Self::Context { source, .. } => source.is_execution_failure(),
            _ => false,
        }
    }

    pub fn is_engine_failure(&self) -> bool {
        match self {
            Self::EngineFailure { .. } => true,
            Self::Context { source, .. } => source.is_engine_failure(),
            _ => false,
        }
    }
}

/// Attaches local context to a failing result.
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;

    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(context))
    }

    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| e.context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_chain_keeps_kind() {
        let err = NodeError::malformed("got 2 lines").context("failed to get container details");
        assert!(err.is_malformed_output());
        assert_eq!(err.to_string(), "failed to get container details");
        assert_eq!(
            format!("{:#}", anyhow::Error::from(err)),
            "failed to get container details: malformed output: got 2 lines"
        );
    }

    #[test]
    fn test_chain_reports_each_cause_once() {
        let err = NodeError::engine(
            "inspect",
            NodeError::execution("docker inspect -f x n1", "No such object"),
        )
        .context("failed to get container details");

        let report = format!("{:?}", anyhow::Error::from(err));
        assert_eq!(report.matches("No such object").count(), 1, "{}", report);
        assert_eq!(report.matches("inspect failed").count(), 1, "{}", report);
    }

    #[test]
    fn test_orphaned_container() {
        let err = NodeError::NotBound {
            name: "n1".to_string(),
            source: Box::new(NodeError::not_found(
                "n1",
                NodeError::execution("docker inspect -f {{.Id}} n1", "No such object"),
            )),
        };
        assert_eq!(err.orphaned_container(), Some("n1"));
        assert!(err.is_not_found());
        assert_eq!(NodeError::malformed("x").orphaned_container(), None);
    }
}
