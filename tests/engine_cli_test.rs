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

use kic_node::*;
use std::sync::{Arc, Mutex};

/// Replies with canned stdout and records the command lines it saw.
#[derive(Default)]
struct ScriptedRunner {
    stdout: String,
    fail: bool,
    seen: Mutex<Vec<(String, bool)>>,
}

impl ScriptedRunner {
    fn replying(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            ..Default::default()
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn commands(&self) -> Vec<String> {
        self.seen.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
    }
}

#[async_trait::async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run_cmd(&self, spec: CommandSpec) -> Result<RunResult> {
        let command = spec.to_string();
        self.seen
            .lock()
            .unwrap()
            .push((command.clone(), spec.has_stdin()));
        if self.fail {
            return Err(NodeError::execution(command, "Cannot connect to the Docker daemon"));
        }
        Ok(RunResult {
            command,
            exit_code: Some(0),
            stdout: self.stdout.clone(),
            stderr: String::new(),
        })
    }
}

#[tokio::test]
async fn test_create_container_argv() {
    let runner = Arc::new(ScriptedRunner::replying("0123456789ab\n"));
    let engine = CliEngine::new("docker", runner.clone());

    let opts = CreateOpts::new()
        .with_run_args(vec!["-d".to_string(), "--name".to_string(), "n1".to_string()])
        .with_mounts(vec![Mount::new("/lib/modules", "/lib/modules").readonly()])
        .with_port_mappings(vec![PortMapping {
            container_port: 6443,
            host_port: 0,
            ..Default::default()
        }]);

    let id = engine.create_container("docker", "img:tag", opts).await.unwrap();
    assert_eq!(id, "0123456789ab");
    assert_eq!(
        runner.commands(),
        vec![
            "docker run -d --name n1 --volume=/lib/modules:/lib/modules:ro \
             --publish=127.0.0.1::6443/tcp img:tag"
        ]
    );
}

#[tokio::test]
async fn test_status_parses_engine_state() {
    let runner = Arc::new(ScriptedRunner::replying("paused\n"));
    let engine = CliEngine::new("docker", runner.clone());

    assert_eq!(
        engine.status("podman", "n1").await.unwrap(),
        ContainerState::Paused
    );
    assert_eq!(
        runner.commands(),
        vec!["podman inspect -f {{.State.Status}} n1"]
    );
}

#[tokio::test]
async fn test_status_unknown_value() {
    let engine = CliEngine::new("docker", Arc::new(ScriptedRunner::replying("zombie\n")));
    let err = engine.status("docker", "n1").await.unwrap_err();
    assert!(err.is_malformed_output());
}

#[tokio::test]
async fn test_lifecycle_argv() {
    let runner = Arc::new(ScriptedRunner::default());
    let engine = CliEngine::new("docker", runner.clone());

    engine.pause("docker", "n1").await.unwrap();
    engine.stop("n1").await.unwrap();
    engine.remove("docker", "n1").await.unwrap();
    engine
        .copy("docker", "n1", &CopyAsset::new("/tmp/a.yaml", "/kind", "a.yaml"))
        .await
        .unwrap();

    assert_eq!(
        runner.commands(),
        vec![
            "docker pause n1",
            "docker stop n1",
            "docker rm -f -v n1",
            "docker cp /tmp/a.yaml n1:/kind/a.yaml",
        ]
    );
}

#[tokio::test]
async fn test_inspect_returns_lines() {
    let runner = Arc::new(ScriptedRunner::replying("172.17.0.2,fd00::2\n"));
    let engine = CliEngine::new("docker", runner.clone());

    let lines = engine.inspect("n1", "{{.Id}}").await.unwrap();
    assert_eq!(lines, vec!["172.17.0.2,fd00::2"]);
    assert_eq!(runner.commands(), vec!["docker inspect -f {{.Id}} n1"]);
}

#[tokio::test]
async fn test_userns_remap_detection() {
    let on = CliEngine::new(
        "docker",
        Arc::new(ScriptedRunner::replying(
            "[\"name=seccomp,profile=default\",\"name=userns\"]\n",
        )),
    );
    assert!(on.userns_remap().await);

    let off = CliEngine::new(
        "docker",
        Arc::new(ScriptedRunner::replying("[\"name=seccomp,profile=default\"]\n")),
    );
    assert!(!off.userns_remap().await);

    let null = CliEngine::new("docker", Arc::new(ScriptedRunner::replying("null\n")));
    assert!(!null.userns_remap().await);

    let down = CliEngine::new("docker", Arc::new(ScriptedRunner::failing()));
    assert!(!down.userns_remap().await);
}

#[tokio::test]
async fn test_node_commands_run_inside_container() {
    let host = Arc::new(ScriptedRunner::replying("n1-id\n"));
    let engine = Arc::new(CliEngine::new("docker", host.clone()));
    let factory = NodeFactory::new(engine, NodeConfig::default());

    let runner = Arc::new(ExecRunner::new("docker", "n1", host.clone()));
    let node = factory.find("n1", runner).await.unwrap();
    node.write_file("/kind/version", "v1.30.0", "0644")
        .await
        .unwrap();

    let seen = host.seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            ("docker inspect -f {{.Id}} n1".to_string(), false),
            ("docker exec --privileged n1 mkdir -p /kind".to_string(), false),
            (
                "docker exec --privileged -i n1 cp /dev/stdin /kind/version".to_string(),
                true
            ),
            (
                "docker exec --privileged n1 chmod 0644 /kind/version".to_string(),
                false
            ),
        ]
    );
}

#[tokio::test]
async fn test_find_reports_engine_error_as_not_found() {
    let engine = Arc::new(CliEngine::new("docker", Arc::new(ScriptedRunner::failing())));
    let factory = NodeFactory::new(engine, NodeConfig::default());

    let err = factory
        .find("n1", Arc::new(HostRunner::new()))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "can't find node 'n1'");
    let chain = format!("{:#}", anyhow::Error::from(err));
    assert_eq!(chain.matches("Cannot connect to the Docker daemon").count(), 1, "{}", chain);
}
