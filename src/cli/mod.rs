//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the
//! crates-mock binary.

use std::net::SocketAddr;

use clap::{Parser, Subcommand};

/// Environment variable holding a JSON configuration override.
pub const CONFIG_ENV: &str = "CRATES_MOCK_CONFIG";

/// Default listen address for `serve`.
pub const DEFAULT_ADDR: &str = "127.0.0.1:4200";

/// Mock crates.io backend command-line interface.
#[derive(Parser, Debug)]
#[command(name = "crates-mock", about = "Mock crates.io backend", version)]
pub struct Cli {
    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the mock server over HTTP.
    Serve {
        /// Address to listen on.
        #[arg(long, default_value = DEFAULT_ADDR)]
        addr: SocketAddr,

        /// JSON object overlaid onto the default configuration.
        #[arg(long, env = CONFIG_ENV)]
        config: Option<String>,

        /// Start with an empty database instead of the sample registry.
        #[arg(long)]
        empty: bool,
    },

    /// Print the route table in match order.
    Routes,

    /// Show a crate from the sample registry, with its documentation link.
    Show {
        /// Crate name.
        #[arg(value_name = "CRATE")]
        krate: String,

        /// Version to display instead of the highest one.
        #[arg(long)]
        version: Option<String>,

        /// Ask the real docs.rs instead of the mock.
        #[arg(long)]
        live_docs: bool,
    },

    /// Resolve a documentation link against the real docs.rs.
    DocsLink {
        /// Crate name.
        #[arg(value_name = "CRATE")]
        krate: String,

        /// Crate version.
        version: String,

        /// Documentation URL declared by the crate.
        #[arg(long)]
        documentation: Option<String>,

        /// Probe timeout in seconds.
        #[arg(long, default_value = "10")]
        timeout: u64,
    },
}
