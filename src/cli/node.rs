//! Node lifecycle commands

use crate::cli::display::{NodeInfo, TableRenderer};
use crate::domain::config::NodeConfig;
use crate::domain::node::{CreateParams, Node, NodeFactory};
use crate::infrastructure::command::{CommandRunner, ExecRunner, HostRunner};
use crate::infrastructure::constants::ROLE_CONTROL_PLANE;
use crate::infrastructure::oci::{
    CliEngine, ContainerState, CopyAsset, Mount, PortMapping, PortProtocol,
};
use clap::{Args, Parser};
use std::collections::HashMap;
use std::sync::Arc;

/// Engine selection shared by every command
#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    /// Path to a kic-node configuration file (TOML or YAML)
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Container engine binary (overrides oci_binary from the config file)
    #[arg(long)]
    pub oci: Option<String>,
}

/// Wiring between the CLI and the node library
pub struct NodeContext {
    pub factory: NodeFactory,
    host: Arc<dyn CommandRunner>,
}

impl NodeContext {
    pub fn new(args: &EngineArgs) -> anyhow::Result<Self> {
        let mut config = NodeConfig::load(args.config.as_deref())?;
        if let Some(ref oci) = args.oci {
            config.oci_binary = oci.clone();
        }

        let host: Arc<dyn CommandRunner> = match config.command_timeout() {
            Some(timeout) => Arc::new(HostRunner::with_timeout(timeout)),
            None => Arc::new(HostRunner::new()),
        };
        let engine = Arc::new(CliEngine::new(config.oci_binary.clone(), Arc::clone(&host)));

        Ok(Self {
            factory: NodeFactory::new(engine, config),
            host,
        })
    }

    /// Runner executing inside the named node container
    pub fn runner_for(&self, name: &str) -> Arc<dyn CommandRunner> {
        Arc::new(ExecRunner::new(
            self.factory.config().oci_binary.clone(),
            name,
            Arc::clone(&self.host),
        ))
    }

    pub async fn find(&self, name: &str) -> anyhow::Result<Node> {
        Ok(self.factory.find(name, self.runner_for(name)).await?)
    }
}

/// Parse `KEY=VALUE`
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.is_empty() => Ok((k.to_string(), v.to_string())),
        _ => Err(format!("invalid KEY=VALUE: {}", s)),
    }
}

/// Parse `host:container[:ro]`
pub fn parse_mount(s: &str) -> Result<Mount, String> {
    let parts: Vec<&str> = s.split(':').collect();
    match parts.as_slice() {
        [host, container] if !host.is_empty() && !container.is_empty() => {
            Ok(Mount::new(*host, *container))
        }
        [host, container, "ro"] if !host.is_empty() && !container.is_empty() => {
            Ok(Mount::new(*host, *container).readonly())
        }
        _ => Err(format!("invalid mount, expected host:container[:ro]: {}", s)),
    }
}

/// Parse `[addr:]host:container[/proto]`; an empty host port lets the engine choose.
pub fn parse_publish(s: &str) -> Result<PortMapping, String> {
    let (ports, protocol) = match s.split_once('/') {
        Some((p, proto)) => (p, proto.parse::<PortProtocol>().map_err(|e| e.to_string())?),
        None => (s, PortProtocol::Tcp),
    };

    let parts: Vec<&str> = ports.split(':').collect();
    let (addr, host, container) = match parts.as_slice() {
        [host, container] => (None, *host, *container),
        [addr, host, container] => (Some(*addr), *host, *container),
        _ => return Err(format!("invalid port mapping: {}", s)),
    };

    let port = |p: &str| -> Result<u16, String> {
        if p.is_empty() {
            Ok(0)
        } else {
            p.parse::<u16>()
                .map_err(|e| format!("invalid port {:?} in {}: {}", p, s, e))
        }
    };

    let mut mapping = PortMapping {
        container_port: port(container)?,
        host_port: port(host)?,
        protocol,
        ..Default::default()
    };
    if mapping.container_port == 0 {
        return Err(format!("container port is required: {}", s));
    }
    if let Some(addr) = addr.filter(|a| !a.is_empty()) {
        mapping.listen_address = addr.to_string();
    }
    Ok(mapping)
}

#[derive(Parser, Debug, Clone)]
pub struct CreateCommand {
    /// Node name, used as container name and hostname
    #[arg(long, short = 'n')]
    pub name: String,

    /// Node image
    #[arg(long)]
    pub image: String,

    /// Cluster name, rendered as the cluster label value
    #[arg(long, default_value = "kic")]
    pub cluster: String,

    #[arg(long, default_value = ROLE_CONTROL_PLANE)]
    pub role: String,

    #[arg(long, default_value = "2")]
    pub cpus: String,

    #[arg(long, default_value = "2g")]
    pub memory: String,

    /// Environment variables (-e KEY=VALUE)
    #[arg(short = 'e', long = "env", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub envs: Vec<(String, String)>,

    /// Bind mounts (host:container[:ro])
    #[arg(long = "mount", value_parser = parse_mount)]
    pub mounts: Vec<Mount>,

    /// Published ports ([addr:]host:container[/proto])
    #[arg(long = "publish", short = 'p', value_parser = parse_publish)]
    pub port_mappings: Vec<PortMapping>,

    /// Extra engine run arguments, after `--`
    #[arg(last = true)]
    pub extra_args: Vec<String>,

    #[command(flatten)]
    pub engine: EngineArgs,
}

impl CreateCommand {
    pub fn to_params(&self, config: &NodeConfig) -> CreateParams {
        CreateParams {
            name: self.name.clone(),
            image: self.image.clone(),
            cluster_label: config.cluster_label(&self.cluster),
            role: self.role.clone(),
            mounts: self.mounts.clone(),
            port_mappings: self.port_mappings.clone(),
            cpus: self.cpus.clone(),
            memory: self.memory.clone(),
            envs: self.envs.iter().cloned().collect::<HashMap<_, _>>(),
            extra_args: self.extra_args.clone(),
        }
    }

    pub async fn execute(&self) -> anyhow::Result<()> {
        let ctx = NodeContext::new(&self.engine)?;
        let params = self.to_params(ctx.factory.config());

        match ctx
            .factory
            .create_node(params, ctx.runner_for(&self.name))
            .await
        {
            Ok(node) => {
                println!("Node {} created", node.name());
                Ok(())
            }
            Err(e) => {
                if let Some(name) = e.orphaned_container() {
                    eprintln!(
                        "⚠ container {} exists but is not usable, remove it with: kic-node rm -n {}",
                        name, name
                    );
                }
                Err(anyhow::Error::from(e).context(format!("Failed to create node {}", self.name)))
            }
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct NodeNameArgs {
    /// Node name
    #[arg(long, short = 'n')]
    pub name: String,

    #[command(flatten)]
    pub engine: EngineArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct StatusCommand {
    #[command(flatten)]
    pub node: NodeNameArgs,
}

impl StatusCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let ctx = NodeContext::new(&self.node.engine)?;
        let node = ctx.find(&self.node.name).await?;
        let state = node.status().await?;

        let addresses = if state == ContainerState::Running {
            match node.ip().await {
                Ok(ips) => Some(ips),
                Err(e) => {
                    let e = anyhow::Error::from(e);
                    tracing::warn!(node = %node.name(), error = %format!("{:#}", e), "unable to resolve node addresses");
                    None
                }
            }
        } else {
            None
        };

        let info = NodeInfo {
            name: node.name().to_string(),
            state,
            addresses,
        };
        println!("{}", TableRenderer::new().render_nodes(&[info]));
        Ok(())
    }
}

#[derive(Parser, Debug, Clone)]
pub struct IpCommand {
    #[command(flatten)]
    pub node: NodeNameArgs,
}

impl IpCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let ctx = NodeContext::new(&self.node.engine)?;
        let node = ctx.find(&self.node.name).await?;
        let (ipv4, ipv6) = node.ip().await?;
        println!("{}", ipv4);
        if !ipv6.is_empty() {
            println!("{}", ipv6);
        }
        Ok(())
    }
}

#[derive(Parser, Debug, Clone)]
pub struct PauseCommand {
    #[command(flatten)]
    pub node: NodeNameArgs,
}

impl PauseCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let ctx = NodeContext::new(&self.node.engine)?;
        ctx.find(&self.node.name).await?.pause().await?;
        println!("Node {} paused", self.node.name);
        Ok(())
    }
}

#[derive(Parser, Debug, Clone)]
pub struct StopCommand {
    #[command(flatten)]
    pub node: NodeNameArgs,
}

impl StopCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let ctx = NodeContext::new(&self.node.engine)?;
        ctx.find(&self.node.name).await?.stop().await?;
        println!("Node {} stopped", self.node.name);
        Ok(())
    }
}

#[derive(Parser, Debug, Clone)]
pub struct RemoveCommand {
    #[command(flatten)]
    pub node: NodeNameArgs,
}

impl RemoveCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let ctx = NodeContext::new(&self.node.engine)?;
        ctx.find(&self.node.name).await?.remove().await?;
        println!("Node {} removed", self.node.name);
        Ok(())
    }
}

#[derive(Parser, Debug, Clone)]
pub struct WriteFileCommand {
    #[command(flatten)]
    pub node: NodeNameArgs,

    /// Destination path inside the node
    #[arg(long)]
    pub dest: String,

    /// Permission mode, passed to chmod verbatim
    #[arg(long, default_value = "0644")]
    pub perm: String,

    /// Local file to read the content from
    #[arg(long, conflicts_with = "content", required_unless_present = "content")]
    pub source: Option<String>,

    /// Inline content
    #[arg(long)]
    pub content: Option<String>,
}

impl WriteFileCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let content = match (&self.source, &self.content) {
            (Some(path), _) => tokio::fs::read(path)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path, e))?,
            (None, Some(content)) => content.clone().into_bytes(),
            (None, None) => anyhow::bail!("either --source or --content is required"),
        };

        let ctx = NodeContext::new(&self.node.engine)?;
        let node = ctx.find(&self.node.name).await?;
        node.write_file(&self.dest, content, &self.perm).await?;
        println!("✓ Wrote {} on {}", self.dest, self.node.name);
        Ok(())
    }
}

#[derive(Parser, Debug, Clone)]
pub struct LoadImageCommand {
    #[command(flatten)]
    pub node: NodeNameArgs,

    /// Image archive (docker save / ctr export)
    #[arg(long)]
    pub archive: String,
}

impl LoadImageCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let archive = tokio::fs::File::open(&self.archive)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to open {}: {}", self.archive, e))?;

        let ctx = NodeContext::new(&self.node.engine)?;
        let node = ctx.find(&self.node.name).await?;
        node.load_image_archive(archive).await?;
        println!("✓ Loaded {} into {}", self.archive, self.node.name);
        Ok(())
    }
}

#[derive(Parser, Debug, Clone)]
pub struct CopyCommand {
    #[command(flatten)]
    pub node: NodeNameArgs,

    /// Local file or directory
    #[arg(long)]
    pub source: String,

    #[arg(long)]
    pub target_dir: String,

    /// Defaults to the source file name
    #[arg(long)]
    pub target_name: Option<String>,

    #[arg(long, default_value = "0644")]
    pub perm: String,
}

impl CopyCommand {
    pub fn to_asset(&self) -> anyhow::Result<CopyAsset> {
        if self.target_dir.trim().is_empty() {
            anyhow::bail!("--target-dir must not be empty");
        }
        let target_name = match &self.target_name {
            Some(name) => name.clone(),
            None => std::path::Path::new(&self.source)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| anyhow::anyhow!("cannot derive a target name from {}", self.source))?,
        };
        Ok(CopyAsset::new(&self.source, &self.target_dir, target_name).with_permissions(&self.perm))
    }

    pub async fn execute(&self) -> anyhow::Result<()> {
        let asset = self.to_asset()?;
        let ctx = NodeContext::new(&self.node.engine)?;
        let node = ctx.find(&self.node.name).await?;
        let oci_binary = ctx.factory.config().oci_binary.clone();
        node.copy(&oci_binary, &asset).await?;
        println!("✓ Copied {} to {}:{}", self.source, self.node.name, asset.target_path());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("A=b=c").unwrap(),
            ("A".to_string(), "b=c".to_string())
        );
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }

    #[test]
    fn test_parse_mount() {
        assert_eq!(parse_mount("/a:/b").unwrap(), Mount::new("/a", "/b"));
        assert!(parse_mount("/a:/b:ro").unwrap().readonly);
        assert!(parse_mount("/a").is_err());
        assert!(parse_mount("/a:/b:rw").is_err());
    }

    #[test]
    fn test_parse_publish() {
        let pm = parse_publish("8443:6443").unwrap();
        assert_eq!(pm.host_port, 8443);
        assert_eq!(pm.container_port, 6443);
        assert_eq!(pm.listen_address, "127.0.0.1");
        assert_eq!(pm.protocol, PortProtocol::Tcp);

        let pm = parse_publish("0.0.0.0::53/udp").unwrap();
        assert_eq!(pm.host_port, 0);
        assert_eq!(pm.listen_address, "0.0.0.0");
        assert_eq!(pm.protocol, PortProtocol::Udp);

        assert!(parse_publish("80").is_err());
        assert!(parse_publish("80:x").is_err());
        assert!(parse_publish("80:443/icmp").is_err());
    }

    #[test]
    fn test_create_to_params() {
        let cmd = CreateCommand::parse_from([
            "create", "-n", "n1", "--image", "img:tag", "-e", "A=1", "--mount", "/a:/b:ro", "-p",
            "8443:6443", "--", "--network", "kic",
        ]);
        let params = cmd.to_params(&NodeConfig::default());
        assert_eq!(params.name, "n1");
        assert_eq!(params.cluster_label, "io.k8s.sigs.kic.cluster=kic");
        assert_eq!(params.role, "control-plane");
        assert_eq!(params.envs.get("A").map(String::as_str), Some("1"));
        assert_eq!(params.mounts.len(), 1);
        assert_eq!(params.port_mappings[0].host_port, 8443);
        assert_eq!(params.extra_args, vec!["--network", "kic"]);
    }

    #[test]
    fn test_copy_target_name_defaults_to_file_name() {
        let cmd = CopyCommand::parse_from([
            "cp", "-n", "n1", "--source", "/tmp/kubeadm.yaml", "--target-dir", "/kind",
        ]);
        let asset = cmd.to_asset().unwrap();
        assert_eq!(asset.target_path(), "/kind/kubeadm.yaml");
        assert_eq!(asset.permissions, "0644");
    }

    #[test]
    fn test_copy_rejects_empty_target_dir() {
        let cmd = CopyCommand::parse_from([
            "cp", "-n", "n1", "--source", "/tmp/kubeadm.yaml", "--target-dir", "",
        ]);
        assert!(cmd.to_asset().is_err());
    }
}
