//! Status and logout commands

use colored::Colorize;
use log::debug;

use nessop::client::{Degraded, Reply};
use nessop::config::Config;
use nessop::{ConfigError, Error, Result};

use crate::cli::CommandContext;
use crate::cli::args::GlobalOptions;

/// Show what is configured, without contacting the scanner.
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}\n", "Nessop Configuration Status".bold());

    let config = match Config::load_at(opts.config_ref()) {
        Ok(config) => config,
        Err(Error::Config(ConfigError::NotFound)) => {
            println!("{} Configuration not found", "✗".red());
            println!();
            println!("Run {} to create a configuration file.", "nessop init".cyan());
            println!();
            return Ok(());
        }
        Err(err) => return Err(err),
    };

    let config_path = Config::resolve_path(opts.config_ref())?;
    println!("Config file: {}", config_path.display().to_string().cyan());
    println!();

    let url = opts.url.as_deref().unwrap_or(config.url());
    println!("{} Scanner: {}", "○".dimmed(), url.cyan());

    if config.verify_tls {
        println!("{} TLS certificate verified", "✓".green());
    } else if !url.starts_with("http://") {
        println!("{} TLS certificate not verified", "⚠".yellow());
    }

    match (&config.username, &config.password) {
        (Some(username), Some(_)) => println!("{} Credentials for {}", "✓".green(), username.bold()),
        (Some(username), None) => {
            println!("{} No password stored for {}", "✗".red(), username.bold());
            println!("  → Run 'nessop init' or set NESSOP_PASSWORD");
        }
        _ => {
            println!("{} Credentials not configured", "✗".red());
            println!("  → Run 'nessop init' to configure");
        }
    }

    if config.token.is_some() {
        println!("{} Session token cached", "✓".green());
    } else {
        println!(
            "{} Session token not cached (will log in on next command)",
            "○".dimmed()
        );
    }

    let prefs = &config.preferences;
    println!(
        "{} Retries: {} every {}s, polling every {}s",
        "○".dimmed(),
        prefs.retries,
        prefs.retry_sleep_secs,
        prefs.poll_sleep_secs
    );
    println!();

    Ok(())
}

/// End the session on the scanner and forget the cached token.
pub async fn logout(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    match ctx.client.logout().await {
        // The scanner answers a logout with an empty body.
        Reply::Json(_) | Reply::Degraded(Degraded::Unparseable { .. }) => {
            println!("{} Logged out", "✓".green())
        }
        reply => {
            debug!("logout reply: {:?}", reply);
            println!("{} Scanner did not confirm the logout; cached token dropped anyway", "⚠".yellow());
        }
    }
    ctx.finish().await
}
