// CLI command definitions

use super::node::{
    CopyCommand, CreateCommand, IpCommand, LoadImageCommand, PauseCommand, RemoveCommand,
    StatusCommand, StopCommand, WriteFileCommand,
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "kic-node",
    version,
    about = "Manage Kubernetes-in-container node containers",
    long_about = "Provision, populate, inspect and tear down the containers that act as Kubernetes cluster nodes"
)]
pub struct CliArgs {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Create a node container
    Create(CreateCommand),

    /// Show node status and addresses
    Status(StatusCommand),

    /// Print the node's IPv4 and IPv6 addresses
    Ip(IpCommand),

    /// Pause all processes in a node
    Pause(PauseCommand),

    /// Stop a node
    Stop(StopCommand),

    /// Remove a node
    #[command(name = "rm")]
    Remove(RemoveCommand),

    /// Write content to a file inside a node
    WriteFile(WriteFileCommand),

    /// Import an image archive into the node's image store
    LoadImage(LoadImageCommand),

    /// Copy a local file or directory into a node
    #[command(name = "cp")]
    Copy(CopyCommand),
}
