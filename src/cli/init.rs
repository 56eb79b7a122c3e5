//! Init command implementation

use colored::Colorize;
use dialoguer::{Confirm, Input, Password, theme::ColorfulTheme};

use nessop::client::ScannerClient;
use nessop::config::{Config, DEFAULT_URL};
use nessop::{ApiError, Result};

use crate::cli::args::GlobalOptions;

/// Run the init command
///
/// Prompts for the scanner address and credentials, logs in once to prove
/// them, then writes the config file with the session token cached.
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    let theme = ColorfulTheme::default();
    let existing = Config::load_at(opts.config_ref()).unwrap_or_default();

    println!("{}", "Welcome to Nessop!".bold().green());
    println!("Let's connect to your scanner.\n");

    let url: String = Input::with_theme(&theme)
        .with_prompt("Scanner URL")
        .default(
            opts.url
                .clone()
                .or(existing.url.clone())
                .unwrap_or_else(|| DEFAULT_URL.to_string()),
        )
        .interact_text()?;

    let verify_tls = if url.starts_with("https://") {
        Confirm::with_theme(&theme)
            .with_prompt("Verify the scanner's TLS certificate?")
            .default(existing.verify_tls)
            .interact()?
    } else {
        false
    };

    let mut username = Input::<String>::with_theme(&theme).with_prompt("Username");
    if let Some(default) = opts.username.clone().or(existing.username.clone()) {
        username = username.default(default);
    }
    let username = username.interact_text()?;

    let password = match &opts.password {
        Some(password) => password.clone(),
        None => Password::with_theme(&theme)
            .with_prompt("Password")
            .interact()?,
    };

    let mut config = Config {
        url: Some(url),
        verify_tls,
        use_tls: None,
        username: Some(username.clone()),
        password: Some(password.clone()),
        token: None,
        preferences: existing.preferences,
    };

    println!("\n{}", "Logging in...".cyan());
    let client = ScannerClient::connect(config.connection()?).await?;
    if !client.authenticate(&username, &password).await {
        println!("{}", "✗ Login failed".red());
        return Err(ApiError::Unauthorized.into());
    }
    println!("{}", "✓ Login successful!".green());

    config.token = client.sessions().token().await;
    config.save_at(opts.config_ref())?;

    let config_path = Config::resolve_path(opts.config_ref())?;
    println!(
        "\n{} Configuration saved to: {}",
        "✓".green(),
        config_path.display()
    );

    println!("\n{}", "You're all set! Try running:".bold());
    println!("  {} - Check the scanner", "nessop server status".cyan());
    println!("  {} - List scans", "nessop scan list".cyan());

    Ok(())
}
