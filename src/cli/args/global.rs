//! Global CLI options shared across all commands
//!
//! Collects the global flags into one struct so handlers take a single
//! argument instead of threading each flag through.

use crate::cli::{Cli, OutputFormat};

/// Global CLI options passed to all command handlers.
///
/// # Precedence
///
/// CLI flag > environment variable > config file > default. This struct
/// captures the CLI/env layer; config file values are merged in
/// `CommandContext`.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Output format (table, json)
    pub format: OutputFormat,

    /// Custom config file path (defaults to ~/.nessop/config.yaml)
    pub config: Option<String>,

    /// Scanner URL override
    pub url: Option<String>,

    /// Username override
    pub username: Option<String>,

    /// Password override
    pub password: Option<String>,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            url: cli.url.clone(),
            username: cli.username.clone(),
            password: cli.password.clone(),
        }
    }

    /// Get config path as `Option<&str>`.
    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }

    /// Whether every connection setting was supplied without a config file.
    pub fn has_inline_credentials(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}
