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

/// Container engine
pub const DEFAULT_OCI: &str = "docker";

/// Node labels
pub const CLUSTER_LABEL_KEY: &str = "io.k8s.sigs.kic.cluster";
pub const NODE_ROLE_KEY: &str = "io.k8s.sigs.kic.role";
pub const ROLE_CONTROL_PLANE: &str = "control-plane";

/// containerd namespace used by the kubelet
pub const K8S_IMAGE_NAMESPACE: &str = "k8s.io";

/// Inspect templates
pub const FORMAT_CONTAINER_ID: &str = "{{.Id}}";
pub const FORMAT_CONTAINER_STATUS: &str = "{{.State.Status}}";
pub const FORMAT_NETWORK_ADDRESSES: &str =
    "{{range .NetworkSettings.Networks}}{{.IPAddress}},{{.GlobalIPv6Address}}{{end}}";
pub const FORMAT_SECURITY_OPTIONS: &str = "{{json .SecurityOptions}}";

/// Fixed run flags for a node container. Running containers inside the node
/// requires a privileged container, no seccomp, writable /tmp and /run and
/// the host kernel modules.
pub const NODE_RUN_FLAGS: &[&str] = &[
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
];

/// Needed on engines running with userns-remap enabled
pub const USERNS_HOST_FLAG: &str = "--userns=host";

/// Node name limits (hostname label)
pub const MAX_NODE_NAME_LEN: usize = 63;
pub const NODE_NAME_PATTERN: &str = r"^[a-zA-Z0-9][a-zA-Z0-9_.-]*$";

/// Default permission mode for copied assets
pub const DEFAULT_ASSET_PERMISSIONS: &str = "0644";
