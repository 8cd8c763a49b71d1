use crate::commands::{
    run_analytics, run_designations, run_evaluate, run_report, AnalyticsArgs, DesignationsArgs,
    EvaluateArgs, ReportArgs,
};
use ce_tracker::config::AppConfig;
use ce_tracker::error::AppError;
use ce_tracker::telemetry;
use clap::{Parser, Subcommand};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "ce-tracker",
    about = "Track continuing-education hours against designation renewal requirements",
    version
)]
struct Cli {
    /// Override APP_LOG_LEVEL for this run
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compliance dashboard for every designation in a backup file
    Report(ReportArgs),
    /// Evaluate one designation against the records in a backup file
    Evaluate(EvaluateArgs),
    /// List the renewal rules for every supported designation
    Designations(DesignationsArgs),
    /// Hours by category, month, year and provider
    Analytics(AnalyticsArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;

    if let Some(level) = cli.log_level {
        config.telemetry.log_level = level;
    }

    telemetry::init(&config.telemetry)?;
    debug!(environment = ?config.environment, "configuration loaded");

    match cli.command {
        Command::Report(args) => run_report(args, &config),
        Command::Evaluate(args) => run_evaluate(args, &config),
        Command::Designations(args) => run_designations(args, &config),
        Command::Analytics(args) => run_analytics(args),
    }
}
