//! Nessop CLI - companion for Nessus-style scanners

use clap::Parser;

mod cli;
mod output;

use cli::{Cli, Commands, ScanCommands, ServerCommands};
use cli::args::GlobalOptions;
use nessop::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    if debug {
        builder.filter_module("nessop", log::LevelFilter::Debug);
    }
    builder.format_timestamp_millis().init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Init => cli::init::run(&opts).await,
        Commands::Status => cli::status::run(&opts),
        Commands::Version => {
            println!("nessop version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Logout => cli::status::logout(&opts).await,
        Commands::Server(server_cmd) => match server_cmd {
            ServerCommands::Status => cli::server::status(&opts).await,
            ServerCommands::Properties => cli::server::properties(&opts).await,
        },
        Commands::Scan(scan_cmd) => match scan_cmd {
            ScanCommands::List { folder } => cli::scan::list(&opts, folder).await,
            ScanCommands::Get { scan_id } => cli::scan::get(&opts, &scan_id).await,
            ScanCommands::Launch {
                scan_id,
                wait,
                poll,
            } => cli::scan::launch(&opts, &scan_id, wait, &poll).await,
            ScanCommands::Wait { scan_id, wait } => cli::scan::wait(&opts, &scan_id, &wait).await,
            ScanCommands::Export {
                scan_id,
                report_format,
                output,
                wait,
            } => cli::scan::export(&opts, &scan_id, &report_format, &output, &wait).await,
        },
    }
}
