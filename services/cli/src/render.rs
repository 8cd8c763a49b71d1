use ce_tracker::compliance::{
    ComplianceReport, CycleAnchor, DashboardEntry, DesignationProfile, RequirementBucket,
};
use ce_tracker::records::{CeAnalytics, ImportOutcome};
use chrono::NaiveDate;

const BAR_WIDTH: usize = 20;

pub(crate) fn import_outcome(outcome: &ImportOutcome) {
    println!("{}", outcome.summary());
    let (notes, hidden) = outcome.display_notes();
    for note in notes {
        println!("  - {note}");
    }
    if hidden > 0 {
        println!("  ... and {hidden} more");
    }
    println!();
}

pub(crate) fn dashboard(entries: &[DashboardEntry], as_of: NaiveDate) {
    println!("Compliance as of {as_of}");
    if entries.is_empty() {
        println!("  No designations on file.");
        return;
    }

    for entry in entries {
        println!();
        match entry {
            DashboardEntry::Evaluated(report) => self::report(report),
            DashboardEntry::Failed {
                designation,
                reason,
            } => println!("{designation}: could not be evaluated ({reason})"),
        }
    }
}

pub(crate) fn report(report: &ComplianceReport) {
    let summary = report.summary();
    println!(
        "{} [{}] {} to {}",
        summary.designation, summary.status_label, summary.period_start, summary.period_end
    );
    println!(
        "  Total      {} {} of {} ({} remaining)",
        progress_bar(summary.total_percentage),
        hours(summary.total_earned),
        hours(summary.total_required),
        hours(summary.total_remaining)
    );
    if let Some(proration) = report.proration {
        println!(
            "  Prorated: joined with {} of {} periods remaining",
            proration.remaining_periods, proration.total_periods
        );
    }

    for requirement in &summary.requirements {
        println!(
            "  {:<10} {} {} earned, needs {}{}",
            requirement.label,
            progress_bar(requirement.percentage),
            hours(requirement.earned_hours),
            requirement.required_label,
            if requirement.satisfied { "" } else { " (short)" }
        );
    }

    for year in &summary.annual {
        println!(
            "  {:<10} {} {} of {}",
            year.year,
            progress_bar(year.percentage),
            hours(year.earned_hours),
            hours(year.required_hours)
        );
    }

    if !summary.category_hours.is_empty() {
        let breakdown: Vec<String> = summary
            .category_hours
            .iter()
            .map(|entry| format!("{} {}", entry.category_label, hours(entry.hours)))
            .collect();
        println!("  By category: {}", breakdown.join(", "));
    }
}

pub(crate) fn profile(profile: &DesignationProfile) {
    println!("{} - {} ({})", profile.code, profile.name, profile.issuing_body);
    println!(
        "  {} hours every {} months, {}",
        hours_plain(profile.total_hours),
        profile.cycle_months,
        anchor_label(profile.anchor)
    );
    for requirement in &profile.sub_requirements {
        let minimum = match requirement.minimum.hours() {
            Some(value) => format!("{} hours", hours_plain(value)),
            None => "at least one course".to_string(),
        };
        let bucket = match requirement.bucket {
            RequirementBucket::Category { category } => category.label(),
            RequirementBucket::SponsorApproved => "sponsor-approved",
            RequirementBucket::EthicsCourse => "ethics courses",
        };
        println!("  - {minimum} of {bucket}");
    }
    if let Some(annual) = profile.annual_minimum_hours {
        println!("  - {} hours every calendar year", hours_plain(annual));
    }
    if let Some(proration) = profile.proration {
        println!(
            "  - prorated in {}-month periods for new holders",
            proration.period_months
        );
    }
    if !profile.state_variants.is_empty() {
        let states: Vec<&str> = profile.state_variants.keys().map(String::as_str).collect();
        println!("  State rules: {}", states.join(", "));
    }
    for note in &profile.notes {
        println!("  Note: {note}");
    }
}

pub(crate) fn analytics(analytics: &CeAnalytics) {
    println!(
        "{} records, {} total, {} average",
        analytics.total_records,
        hours(analytics.total_hours),
        hours(analytics.average_hours)
    );

    println!("\nBy category ({}):", analytics.categories_count());
    for (category, value) in &analytics.hours_by_category {
        println!("  {category:<18} {}", hours(*value));
    }

    println!("\nLast 12 months:");
    for (month, value) in &analytics.monthly_hours {
        println!("  {month} {}", hours(*value));
    }

    println!("\nBy year:");
    for (year, value) in &analytics.yearly_hours {
        println!("  {year} {}", hours(*value));
    }

    println!("\nTop providers:");
    for entry in &analytics.top_providers {
        println!("  {:<24} {}", entry.provider, hours(entry.hours));
    }
}

fn anchor_label(anchor: CycleAnchor) -> String {
    match anchor {
        CycleAnchor::Holder => "from the acquisition date".to_string(),
        CycleAnchor::BirthMonth => "from the holder's birth month".to_string(),
        CycleAnchor::SharedEpoch { year } => format!("in fixed periods counted from {year}"),
    }
}

fn hours(value: f64) -> String {
    format!("{}h", hours_plain(value))
}

/// Whole numbers without a fraction, otherwise one decimal place.
fn hours_plain(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

fn progress_bar(percentage: f64) -> String {
    let filled = ((percentage.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        percentage
    )
}
