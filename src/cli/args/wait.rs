//! Polling argument types for commands that wait on the scanner

use std::time::Duration;

use clap::Args;

use nessop::client::PollOptions;
use nessop::{ConfigError, Result};

/// Shared wait arguments for commands that poll a scan or export.
///
/// ```ignore
/// Wait {
///     #[command(flatten)]
///     wait: WaitArgs,
/// }
/// ```
#[derive(Args, Debug, Default, Clone)]
pub struct WaitArgs {
    /// Seconds between status checks (defaults to the configured poll interval)
    #[arg(long)]
    pub interval: Option<f64>,

    /// Give up after this many seconds (default: wait indefinitely)
    #[arg(long)]
    pub timeout: Option<f64>,
}

fn seconds(flag: &str, value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value).map_err(|_| {
        ConfigError::Invalid(format!("--{flag} must be a non-negative number, got {value}")).into()
    })
}

impl WaitArgs {
    /// Convert CLI args to poll options, starting from `defaults`.
    pub fn to_options(&self, defaults: PollOptions) -> Result<PollOptions> {
        let mut options = defaults;
        if let Some(interval) = self.interval {
            options.interval = seconds("interval", interval)?;
        }
        if let Some(timeout) = self.timeout {
            options = options.with_deadline(seconds("timeout", timeout)?);
        }
        Ok(options)
    }
}
