use crate::report::{run_export, run_report, ExportArgs, ReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use obe_analytics::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "OBE Analytics",
    about = "Serve and inspect program outcome attainment analytics",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Compute analytics from a snapshot file without starting the server
    Analytics {
        #[command(subcommand)]
        command: AnalyticsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum AnalyticsCommand {
    /// Print the outcome attainment report
    Report(ReportArgs),
    /// Write one report section as CSV
    Export(ExportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Serve analytics from this JSON snapshot instead of APP_SNAPSHOT_PATH
    #[arg(long)]
    pub(crate) snapshot: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Analytics {
            command: AnalyticsCommand::Report(args),
        } => run_report(args),
        Command::Analytics {
            command: AnalyticsCommand::Export(args),
        } => run_export(args),
    }
}
