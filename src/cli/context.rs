//! Command execution context
//!
//! Loads configuration, builds the scanner client and reuses or renews the
//! cached session token so each handler starts with a working session.

use log::debug;

use nessop::client::ScannerClient;
use nessop::config::Config;
use nessop::error::{ApiError, ConfigError, Error, Result};

use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;

/// Load the config file and layer the CLI/env overrides on top.
///
/// The cached token belongs to the config file's scanner, so a `--url`
/// override drops it and stops the renewed token from being written back.
fn resolve_config(opts: &GlobalOptions) -> Result<(Config, bool)> {
    let (mut config, mut persist_token) = match Config::load_at(opts.config_ref()) {
        Ok(config) => (config, true),
        Err(Error::Config(ConfigError::NotFound)) if opts.has_inline_credentials() => {
            (Config::default(), false)
        }
        Err(err) => return Err(err),
    };

    if let Some(url) = &opts.url {
        if config.url.as_deref() != Some(url.as_str()) {
            debug!("URL overridden; ignoring cached session token");
            config.token = None;
            persist_token = false;
        }
        config.url = Some(url.clone());
        config.use_tls = None;
    }
    if let Some(username) = &opts.username {
        config.username = Some(username.clone());
    }
    if let Some(password) = &opts.password {
        config.password = Some(password.clone());
    }
    config.validate_auth()?;

    Ok((config, persist_token))
}

/// Context for command execution containing config, client, and runtime options.
pub struct CommandContext {
    /// Loaded configuration with CLI overrides applied
    pub config: Config,
    /// Scanner client with a session
    pub client: ScannerClient,
    /// Output format preference
    pub format: OutputFormat,
    /// Config file override path
    config_file: Option<String>,
    /// Whether the session token is cached in the config file
    persist_token: bool,
}

impl CommandContext {
    /// Create a new command context.
    ///
    /// A missing config file is tolerated when credentials come from the
    /// command line or environment; the session token is then not cached.
    pub async fn new(opts: &GlobalOptions) -> Result<Self> {
        let (config, persist_token) = resolve_config(opts)?;

        let client = ScannerClient::connect(config.connection()?).await?;

        match &config.token {
            Some(token) => {
                debug!("Using cached session token");
                client.sessions().set_token(token.clone()).await;
            }
            None => {
                let (username, password) = match (&config.username, &config.password) {
                    (Some(username), Some(password)) => (username.clone(), password.clone()),
                    _ => return Err(ConfigError::MissingCredentials.into()),
                };
                if !client.authenticate(&username, &password).await {
                    return Err(ApiError::Unauthorized.into());
                }
            }
        }

        Ok(Self {
            config,
            client,
            format: opts.format,
            config_file: opts.config.clone(),
            persist_token,
        })
    }

    /// Write a renewed session token back to the config file.
    ///
    /// Only the token is updated; CLI overrides are not persisted.
    pub async fn finish(self) -> Result<()> {
        let token = self.client.sessions().token().await;
        if !self.persist_token || token == self.config.token {
            return Ok(());
        }

        debug!("Session token changed; updating config");
        let mut stored = Config::load_at(self.config_file.as_deref())?;
        stored.token = token;
        stored.save_at(self.config_file.as_deref())
    }
}
