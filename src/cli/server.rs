//! Server information commands

use nessop::{Result, ScannerApi};

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::output::{json, table};

fn or_dash(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "--".to_string())
}

/// Show whether the scanner is ready
pub async fn status(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let status = ctx.client.server_status().await?;

    match ctx.format {
        OutputFormat::Json => println!("{}", json::format_json(&status)?),
        OutputFormat::Table => {
            let mut fields = vec![("Status", status.status.clone())];
            if let Some(progress) = status.progress {
                fields.push(("Progress", format!("{progress}%")));
            }
            println!("{}", table::format_record(&fields));
        }
    }

    ctx.finish().await
}

/// Show scanner version and build
pub async fn properties(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let props = ctx.client.server_properties().await?;

    match ctx.format {
        OutputFormat::Json => println!("{}", json::format_json(&props)?),
        OutputFormat::Table => println!(
            "{}",
            table::format_record(&[
                ("Type", or_dash(&props.nessus_type)),
                ("Version", or_dash(&props.server_version)),
                ("Build", or_dash(&props.server_build)),
                ("UI version", or_dash(&props.nessus_ui_version)),
                ("Platform", or_dash(&props.platform)),
            ])
        ),
    }

    ctx.finish().await
}
