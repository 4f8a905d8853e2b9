//! CLI argument definitions for stagehand.
//!
//! Uses `clap` derive macros to define the full command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "stagehand",
    version,
    about = "Release locally staged Maven modules to Maven Central",
    long_about = "stagehand bundles the local Maven repositories of one or more modules into a \
                  single Central Portal deployment, or drives a legacy Nexus staging repository \
                  through close and release."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to ~/.stagehand/config.toml)
    #[arg(long, global = true, env = "STAGEHAND_CONFIG")]
    pub config: Option<PathBuf>,

    /// Repository service username (portal token name)
    #[arg(long, global = true, env = "STAGEHAND_USERNAME")]
    pub username: Option<String>,

    /// Repository service password (portal token secret)
    #[arg(long, global = true, env = "STAGEHAND_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Bundle and upload modules as one Central Portal deployment
    Publish {
        /// Module to release, as group:artifact:version=path/to/local/repo
        #[arg(long = "project", required = true)]
        projects: Vec<String>,
        /// Root build directory; bundles are staged under <dir>/publish
        #[arg(long, default_value = "build")]
        build_dir: PathBuf,
        /// Publish automatically once validated
        #[arg(long)]
        automatic: bool,
        /// Wait for the deployment to pass validation
        #[arg(long)]
        validate: bool,
    },

    /// Drop a Central Portal deployment
    Drop {
        /// Deployment id
        deployment_id: String,
    },

    /// Show the status of a deployment
    Status {
        /// Deployment id
        deployment_id: String,
    },

    /// Wait for a deployment to pass validation
    Validate {
        /// Deployment id
        deployment_id: String,
    },

    /// Publish a validated deployment
    Release {
        /// Deployment id
        deployment_id: String,
    },

    /// Legacy Nexus staging repository workflow
    Nexus {
        #[command(subcommand)]
        action: NexusAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum NexusAction {
    /// List the account's staging profiles
    Profiles,
    /// Open a staging repository for a group
    Create {
        /// Maven group the repository is for
        #[arg(long)]
        group: String,
        /// Staging profile id or name (resolved from the group by default)
        #[arg(long)]
        profile: Option<String>,
    },
    /// Close a staging repository and release it
    CloseAndRelease {
        /// Repository id, required when several are open
        #[arg(long)]
        repository: Option<String>,
    },
    /// Drop a staging repository
    Drop {
        /// Repository id
        #[arg(long)]
        repository: String,
    },
}

/// Parse command-line arguments into a [`Cli`] struct.
pub fn parse() -> Cli {
    Cli::parse()
}
