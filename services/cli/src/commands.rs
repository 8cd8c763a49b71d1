use crate::infra::{load_backup, load_catalog, resolve_as_of, today};
use crate::render;
use ce_tracker::compliance::{ComplianceEvaluator, DesignationCode, UserDesignation};
use ce_tracker::config::AppConfig;
use ce_tracker::error::AppError;
use ce_tracker::records::summarize;
use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Backup file exported from the tracker
    #[arg(long)]
    pub(crate) backup: PathBuf,
    /// Evaluation date (YYYY-MM-DD). Defaults to CE_AS_OF, then today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Only report on this designation
    #[arg(long)]
    pub(crate) designation: Option<DesignationCode>,
    /// Profile table overriding the built-in rules
    #[arg(long)]
    pub(crate) profiles: Option<PathBuf>,
    /// Print the dashboard as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Designation code, e.g. CFP or ChFC
    #[arg(long)]
    pub(crate) designation: DesignationCode,
    /// Acquisition or last renewal date (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) anchor: NaiveDate,
    /// Backup file holding the CE records to count
    #[arg(long)]
    pub(crate) records: PathBuf,
    /// Licensing state for CPA and CLE
    #[arg(long)]
    pub(crate) state: Option<String>,
    /// Birth month (1-12) for birth-month cycles
    #[arg(long)]
    pub(crate) birth_month: Option<u32>,
    /// Evaluation date (YYYY-MM-DD). Defaults to CE_AS_OF, then today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    #[arg(long)]
    pub(crate) profiles: Option<PathBuf>,
    /// Print the full report as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DesignationsArgs {
    #[arg(long)]
    pub(crate) profiles: Option<PathBuf>,
    /// Print the profile table as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct AnalyticsArgs {
    /// Backup file exported from the tracker
    #[arg(long)]
    pub(crate) backup: PathBuf,
    /// Reference date for the trailing twelve months (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_report(args: ReportArgs, config: &AppConfig) -> Result<(), AppError> {
    let as_of = resolve_as_of(args.as_of, &config.evaluation);
    let catalog = load_catalog(&config.evaluation, args.profiles.as_deref())?;
    let evaluator = ComplianceEvaluator::new(catalog);
    let outcome = load_backup(&args.backup, today())?;

    let holdings: Vec<UserDesignation> = outcome
        .designations
        .iter()
        .filter(|holding| args.designation.map_or(true, |code| holding.code == code))
        .cloned()
        .collect();
    info!(
        records = outcome.records.len(),
        designations = holdings.len(),
        %as_of,
        "building compliance dashboard"
    );

    let entries = evaluator.dashboard(&outcome.records, &holdings, as_of);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    render::import_outcome(&outcome);
    render::dashboard(&entries, as_of);
    Ok(())
}

pub(crate) fn run_evaluate(args: EvaluateArgs, config: &AppConfig) -> Result<(), AppError> {
    let as_of = resolve_as_of(args.as_of, &config.evaluation);
    let catalog = load_catalog(&config.evaluation, args.profiles.as_deref())?;
    let evaluator = ComplianceEvaluator::new(catalog);
    let outcome = load_backup(&args.records, today())?;

    let mut holding = UserDesignation::new(args.designation, args.anchor);
    if let Some(state) = args.state {
        holding = holding.with_state(state);
    }
    if let Some(month) = args.birth_month {
        holding = holding.with_birth_month(month);
    }

    let report = evaluator.evaluate_holding(&outcome.records, &holding, as_of)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    render::report(&report);
    Ok(())
}

pub(crate) fn run_designations(args: DesignationsArgs, config: &AppConfig) -> Result<(), AppError> {
    let catalog = load_catalog(&config.evaluation, args.profiles.as_deref())?;

    if args.json {
        let profiles: Vec<_> = catalog.iter().collect();
        println!("{}", serde_json::to_string_pretty(&profiles)?);
        return Ok(());
    }

    for profile in catalog.iter() {
        render::profile(profile);
    }
    Ok(())
}

pub(crate) fn run_analytics(args: AnalyticsArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(today);
    let outcome = load_backup(&args.backup, today)?;
    let analytics = summarize(&outcome.records, today);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analytics)?);
        return Ok(());
    }

    render::analytics(&analytics);
    Ok(())
}
