pub mod report;
pub mod serve;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use report::{process_report_command, process_users_command, ReportCommand};
use serve::{process_serve_command, ServeCommand};
use tracing::level_filters::LevelFilter;

use crate::utils::{
    dir::create_application_default_path,
    logging::{enable_logging, CLI_PREFIX, SERVER_PREFIX},
};

#[derive(Parser, Debug)]
#[command(name = "Presence analyzer", version, long_about = None)]
#[command(about = "Analyzes employee presence grouped by weekday", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, global = true, help = "Enable verbose logging into the console")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Directory for log files. By default $XDG_STATE_HOME/presence-analyzer/logs or $HOME/.local/state/presence-analyzer/logs"
    )]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Start the HTTP server with JSON API and pages")]
    Serve {
        #[command(flatten)]
        command: ServeCommand,
    },
    #[command(about = "Print weekday statistics of a user")]
    Report {
        #[command(flatten)]
        command: ReportCommand,
    },
    #[command(about = "List users present in the data")]
    Users {
        #[arg(long, help = "CSV file with presence data")]
        data: PathBuf,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    let log_dir = args
        .log_dir
        .map_or_else(|| create_application_default_path().map(|v| v.join("logs")), Ok)?;

    match args.commands {
        Commands::Serve { command } => {
            // Server always reports into the console.
            enable_logging(SERVER_PREFIX, &log_dir, logging_level, true)?;
            process_serve_command(command).await
        }
        Commands::Report { command } => {
            enable_logging(CLI_PREFIX, &log_dir, logging_level, args.log)?;
            process_report_command(command).await
        }
        Commands::Users { data } => {
            enable_logging(CLI_PREFIX, &log_dir, logging_level, args.log)?;
            process_users_command(data).await
        }
    }
}
