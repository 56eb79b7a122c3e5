//! Scan management commands

use std::future::Future;
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use serde::Serialize;
use tabled::Tabled;

use nessop::client::{ScanDetails, ScanStatus, ScanSummary};
use nessop::{Result, ScannerApi};

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat, WaitArgs};
use crate::output::formatters::{format_bytes, format_relative_time};
use crate::output::{json, print_list, table};

/// Table row for `scan list`
#[derive(Debug, Clone, Tabled)]
pub struct ScanRow {
    #[tabled(rename = "ID")]
    pub id: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "STATUS")]
    pub status: String,

    #[tabled(rename = "FOLDER")]
    pub folder: String,

    #[tabled(rename = "MODIFIED")]
    pub modified: String,
}

impl From<ScanSummary> for ScanRow {
    fn from(scan: ScanSummary) -> Self {
        Self {
            id: scan.id,
            name: scan.name,
            status: scan.status.unwrap_or_else(|| "--".to_string()),
            folder: scan
                .folder_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "--".to_string()),
            modified: format_relative_time(scan.last_modification_date),
        }
    }
}

/// JSON result of commands that wait on a scan
#[derive(Debug, Serialize)]
struct WaitResult<'a> {
    scan_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    scan_uuid: Option<String>,
    status: ScanStatus,
}

fn spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

/// Run `work` behind a spinner when printing a table.
async fn with_spinner<T, F>(format: OutputFormat, message: String, work: F) -> T
where
    F: Future<Output = T>,
{
    match format {
        OutputFormat::Table => {
            let bar = spinner(message);
            let result = work.await;
            bar.finish_and_clear();
            result
        }
        OutputFormat::Json => work.await,
    }
}

fn colored_status(status: &ScanStatus) -> String {
    match status {
        ScanStatus::Completed | ScanStatus::Imported => status.to_string().green().to_string(),
        ScanStatus::Canceled => status.to_string().yellow().to_string(),
        ScanStatus::Error(message) => format!("{} ({})", "error".red(), message),
        _ => status.to_string(),
    }
}

/// List scans
pub async fn list(opts: &GlobalOptions, folder: Option<u64>) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let scans = ctx.client.list_scans(folder).await?;
    debug!("Fetched {} scans", scans.len());

    print_list::<_, ScanRow>(&scans, ctx.format)?;
    ctx.finish().await
}

fn or_dash<T: ToString>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "--".to_string())
}

fn details_record(details: &ScanDetails) -> String {
    let info = &details.info;
    table::format_record(&[
        ("Name", or_dash(&info.name)),
        ("Status", or_dash(&info.status)),
        ("UUID", or_dash(&info.uuid)),
        ("Policy", or_dash(&info.policy)),
        ("Targets", or_dash(&info.targets)),
        ("Hosts", or_dash(&info.hostcount)),
        ("Started", format_relative_time(info.scan_start)),
        ("Finished", format_relative_time(info.scan_end)),
    ])
}

/// Show a single scan
pub async fn get(opts: &GlobalOptions, scan_id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let details = ctx.client.scan_details(scan_id).await?;

    match ctx.format {
        OutputFormat::Json => println!("{}", json::format_json(&details)?),
        OutputFormat::Table => println!("{}", details_record(&details)),
    }

    ctx.finish().await
}

async fn wait_and_report(
    ctx: &CommandContext,
    scan_id: &str,
    scan_uuid: Option<String>,
    args: &WaitArgs,
) -> Result<()> {
    let options = args.to_options(ctx.client.poll_options())?;
    let status = with_spinner(
        ctx.format,
        format!("Waiting for scan {scan_id}"),
        ctx.client.scan_wait(scan_id, options),
    )
    .await?;

    match ctx.format {
        OutputFormat::Json => println!(
            "{}",
            json::format_json(&WaitResult {
                scan_id,
                scan_uuid,
                status,
            })?
        ),
        OutputFormat::Table => println!("Scan {} finished: {}", scan_id.bold(), colored_status(&status)),
    }
    Ok(())
}

/// Launch a scan, optionally waiting for it to finish
pub async fn launch(opts: &GlobalOptions, scan_id: &str, wait: bool, poll: &WaitArgs) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let scan_uuid = ctx.client.scan_launch(scan_id).await?;

    if wait {
        if ctx.format == OutputFormat::Table {
            println!("{} Launched scan {} ({})", "✓".green(), scan_id.bold(), scan_uuid);
        }
        wait_and_report(&ctx, scan_id, Some(scan_uuid), poll).await?;
    } else {
        match ctx.format {
            OutputFormat::Json => println!(
                "{}",
                json::format_json(&serde_json::json!({
                    "scan_id": scan_id,
                    "scan_uuid": scan_uuid,
                }))?
            ),
            OutputFormat::Table => {
                println!("{} Launched scan {} ({})", "✓".green(), scan_id.bold(), scan_uuid)
            }
        }
    }

    ctx.finish().await
}

/// Wait for a scan to finish
pub async fn wait(opts: &GlobalOptions, scan_id: &str, args: &WaitArgs) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    wait_and_report(&ctx, scan_id, None, args).await?;
    ctx.finish().await
}

/// Export a scan report and write it to `output`
pub async fn export(
    opts: &GlobalOptions,
    scan_id: &str,
    format: &str,
    output: &str,
    args: &WaitArgs,
) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let options = args.to_options(ctx.client.poll_options())?;

    let report = with_spinner(
        ctx.format,
        format!("Exporting scan {scan_id} as {format}"),
        ctx.client.export_and_download(scan_id, format, options),
    )
    .await?;
    std::fs::write(output, &report)?;

    match ctx.format {
        OutputFormat::Json => println!(
            "{}",
            json::format_json(&serde_json::json!({
                "scan_id": scan_id,
                "format": format,
                "path": output,
                "bytes": report.len(),
            }))?
        ),
        OutputFormat::Table => println!(
            "{} Wrote {} report ({}) to {}",
            "✓".green(),
            format,
            format_bytes(report.len()),
            output.cyan()
        ),
    }

    ctx.finish().await
}
