//! CLI command definitions and handlers

use clap::{Parser, Subcommand};

pub mod args;
pub mod context;
pub mod init;
pub mod scan;
pub mod server;
pub mod status;

pub use args::{OutputFormat, WaitArgs};
pub use context::CommandContext;

/// Nessop CLI - companion for Nessus-style scanners
#[derive(Parser, Debug)]
#[command(name = "nessop")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json)
    #[arg(
        long,
        global = true,
        env = "NESSOP_FORMAT",
        default_value = "table",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "NESSOP_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Override scanner URL
    #[arg(long, global = true, env = "NESSOP_URL", hide_env = true)]
    pub url: Option<String>,

    /// Override scanner username
    #[arg(long, global = true, env = "NESSOP_USERNAME", hide_env = true)]
    pub username: Option<String>,

    /// Scanner password (environment only)
    #[arg(long, global = true, env = "NESSOP_PASSWORD", hide = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "NESSOP_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Nessop configuration
    Init,

    /// Show connection and session status
    Status,

    /// Display version information
    Version,

    /// End the cached session on the scanner
    Logout,

    /// Scanner server information
    #[command(subcommand)]
    Server(ServerCommands),

    /// View, launch and export scans
    #[command(subcommand)]
    Scan(ScanCommands),
}

/// Server information subcommands
#[derive(Subcommand, Debug)]
pub enum ServerCommands {
    /// Show whether the scanner is ready
    Status,

    /// Show scanner version and build
    Properties,
}

/// Scan management subcommands
#[derive(Subcommand, Debug)]
pub enum ScanCommands {
    /// List scans
    List {
        /// Only show scans in this folder
        #[arg(long)]
        folder: Option<u64>,
    },

    /// Show a single scan
    Get {
        /// Scan ID
        scan_id: String,
    },

    /// Launch a scan
    Launch {
        /// Scan ID
        scan_id: String,

        /// Wait for the scan to finish
        #[arg(long)]
        wait: bool,

        #[command(flatten)]
        poll: WaitArgs,
    },

    /// Wait for a scan to finish
    Wait {
        /// Scan ID
        scan_id: String,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Export a scan report and download it
    Export {
        /// Scan ID
        scan_id: String,

        /// Report format (nessus, csv, html, pdf, db)
        #[arg(
            long = "report-format",
            short = 'f',
            id = "report_format",
            default_value = "nessus"
        )]
        report_format: String,

        /// File to write the report to
        #[arg(long, short = 'o')]
        output: String,

        #[command(flatten)]
        wait: WaitArgs,
    },
}
