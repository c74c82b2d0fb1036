// src/cli.rs
//! CLI definitions for pypi-client
//!
//! Command implementations live in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pypi-client")]
#[command(version)]
#[command(about = "Local cache of the Python Package Index", long_about = None)]
pub struct Cli {
    /// Configuration file (default: <config dir>/pypi-client/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Snapshot file, overriding the configured one
    #[arg(short, long, global = true)]
    pub snapshot: Option<PathBuf>,

    /// XML-RPC endpoint, overriding the configured one
    #[arg(short, long, global = true)]
    pub url: Option<String>,

    /// Log debug messages
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List cached packages, refreshing the list when it is stale
    List {
        /// Refresh the package list even if it is recent
        #[arg(short, long)]
        force: bool,
    },

    /// Refresh the package list from the index
    Refresh {
        /// Categories to browse (default: configured categories)
        categories: Vec<String>,
    },

    /// Fetch the releases of a package
    Releases {
        /// Package name
        name: String,

        /// Include hidden releases
        #[arg(long)]
        show_hidden: bool,
    },

    /// Fetch the roles of a package
    Roles {
        /// Package name
        name: String,
    },

    /// Fetch the download counts of a release
    Downloads {
        /// Package name
        name: String,
        /// Release version
        version: String,
    },

    /// Fetch the files of a release
    Urls {
        /// Package name
        name: String,
        /// Release version
        version: String,
    },

    /// Fetch the metadata of a release
    ReleaseData {
        /// Package name
        name: String,
        /// Release version
        version: String,
    },

    /// Show a cached package or release
    Show {
        /// Package name
        name: String,
        /// Release version
        version: Option<String>,
    },
}
