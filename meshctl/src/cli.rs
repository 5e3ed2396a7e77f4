//! Command-line definition

use crate::install::InstallArgs;
use crate::output::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Install and manage the EaseMesh control plane",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Mesh control plane API address (host:port)
    #[arg(short, long, global = true, env = "MESHCTL_SERVER")]
    pub server: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where to find the Kubernetes cluster
#[derive(Debug, Clone, Default, Args)]
pub struct ClusterArgs {
    /// Path to a kubeconfig file
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long)]
    pub context: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Deploy the mesh control plane onto Kubernetes
    Install {
        #[command(flatten)]
        args: InstallArgs,
        #[command(flatten)]
        cluster: ClusterArgs,
    },
    /// Check the cluster can host the mesh control plane without deploying
    Precheck {
        #[command(flatten)]
        args: InstallArgs,
        #[command(flatten)]
        cluster: ClusterArgs,
    },
    /// Remove the mesh control plane from Kubernetes
    Reset {
        #[command(flatten)]
        args: InstallArgs,
        #[command(flatten)]
        cluster: ClusterArgs,
    },
    /// Show mesh resources
    Get {
        #[command(subcommand)]
        resource: GetCommands,
    },
    /// Delete a mesh resource
    Delete {
        #[command(subcommand)]
        resource: DeleteCommands,
    },
    /// Create mesh resources from a YAML file
    Create {
        /// Manifest with one or more YAML documents
        #[arg(short = 'f', long)]
        file: PathBuf,
    },
    /// Create or update mesh resources from a YAML file
    Apply {
        /// Manifest with one or more YAML documents
        #[arg(short = 'f', long)]
        file: PathBuf,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum GetCommands {
    /// HTTPRouteGroups; all of them when no name is given
    #[command(name = "httproutegroup", visible_aliases = ["httproutegroups", "hrg"])]
    HttpRouteGroup { name: Option<String> },
}

#[derive(Subcommand)]
pub enum DeleteCommands {
    #[command(name = "httproutegroup", visible_aliases = ["httproutegroups", "hrg"])]
    HttpRouteGroup { name: String },
}
