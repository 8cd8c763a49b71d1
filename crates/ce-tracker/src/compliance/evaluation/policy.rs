use super::super::domain::ComplianceCycle;
use super::super::profile::{DesignationProfile, Minimum, SubRequirement};
use super::cycle::shift_months;
use super::rules::Tally;
use super::{AnnualProgress, ComplianceReport, ProrationApplied, RequirementProgress};
use chrono::{Datelike, NaiveDate};

/// Slack for accumulated floating-point error in summed hours.
const HOURS_TOLERANCE: f64 = 1e-9;

/// Whether `earned` covers `required` once summation error is discounted.
fn meets(earned: f64, required: f64) -> bool {
    earned + HOURS_TOLERANCE >= required
}

/// Hour targets for one cycle after proration.
pub(crate) struct Targets {
    pub total: f64,
    pub sub_requirements: Vec<SubRequirement>,
    pub proration: Option<ProrationApplied>,
}

pub(crate) fn targets_for(
    profile: &DesignationProfile,
    cycle: &ComplianceCycle,
    anchor_date: NaiveDate,
) -> Targets {
    let proration = profile
        .proration
        .filter(|_| anchor_date > cycle.start && anchor_date < cycle.end)
        .and_then(|proration| {
            let total_periods = profile.cycle_months / proration.period_months;
            let elapsed = (1..total_periods)
                .take_while(|period| {
                    shift_months(cycle.start, i64::from(period * proration.period_months))
                        .map(|boundary| boundary <= anchor_date)
                        .unwrap_or(false)
                })
                .count() as i32;

            (total_periods > 0).then_some(ProrationApplied {
                remaining_periods: total_periods - elapsed,
                total_periods,
            })
        });

    let Some(applied) = proration else {
        return Targets {
            total: profile.total_hours,
            sub_requirements: profile.sub_requirements.clone(),
            proration: None,
        };
    };

    let total = profile.total_hours * f64::from(applied.remaining_periods)
        / f64::from(applied.total_periods);
    let sub_requirements = profile
        .sub_requirements
        .iter()
        .map(|requirement| match requirement.minimum {
            Minimum::Hours { hours } => SubRequirement {
                bucket: requirement.bucket,
                minimum: Minimum::Hours {
                    hours: hours.min(total),
                },
            },
            Minimum::AnyCourse => *requirement,
        })
        .collect();

    Targets {
        total,
        sub_requirements,
        proration: Some(applied),
    }
}

pub(crate) fn assemble(
    profile: &DesignationProfile,
    cycle: ComplianceCycle,
    as_of: NaiveDate,
    targets: Targets,
    tally: Tally,
) -> ComplianceReport {
    let requirements: Vec<RequirementProgress> = targets
        .sub_requirements
        .iter()
        .map(|requirement| {
            let earned_hours = tally.hours_for(requirement.bucket);
            let courses = tally.courses_for(requirement.bucket);
            let satisfied = match requirement.minimum {
                Minimum::Hours { hours } => meets(earned_hours, hours),
                Minimum::AnyCourse => courses > 0,
            };

            RequirementProgress {
                bucket: requirement.bucket,
                minimum: requirement.minimum,
                earned_hours,
                courses,
                satisfied,
            }
        })
        .collect();

    let annual_progress: Vec<AnnualProgress> = match profile.annual_minimum_hours {
        Some(required) => {
            let last_year = as_of.year().min(cycle.last_day().year());
            (cycle.start.year()..=last_year)
                .map(|year| {
                    let earned_hours = tally.hours_in_year(year);
                    AnnualProgress {
                        year,
                        earned_hours,
                        required_hours: required,
                        satisfied: meets(earned_hours, required),
                    }
                })
                .collect()
        }
        None => Vec::new(),
    };

    let compliant = meets(tally.total, targets.total)
        && requirements.iter().all(|progress| progress.satisfied)
        && annual_progress.iter().all(|progress| progress.satisfied);

    ComplianceReport {
        designation: profile.code,
        as_of,
        cycle,
        total_earned: tally.total,
        total_required: targets.total,
        records_counted: tally.records,
        category_hours: tally.by_category,
        requirements,
        annual_progress,
        proration: targets.proration,
        compliant,
    }
}
