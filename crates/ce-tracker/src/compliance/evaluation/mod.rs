pub(crate) mod cycle;
mod policy;
mod rules;

use super::domain::{CeCategory, ComplianceCycle, DesignationCode};
use super::profile::{DesignationProfile, Minimum, ProfileDefect, RequirementBucket};
use crate::records::CeRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Evaluate `records` against `profile` for the cycle containing `as_of`.
///
/// The evaluation is pure: identical inputs always produce an identical
/// report, and nothing is logged, stored or mutated. Every record is
/// validated, including records outside the active window, so the call either
/// returns a complete report or fails as a whole.
pub fn evaluate(
    records: &[CeRecord],
    profile: &DesignationProfile,
    anchor_date: NaiveDate,
    as_of: NaiveDate,
) -> Result<ComplianceReport, EvaluationError> {
    profile
        .validate()
        .map_err(|defect| EvaluationError::InvalidProfile {
            code: profile.code,
            defect,
        })?;

    let dated = rules::dated_records(records)?;
    let cycle = cycle::active_cycle(profile.anchor, profile.cycle_months, anchor_date, as_of)
        .ok_or(EvaluationError::CycleOutOfRange { as_of })?;

    let targets = policy::targets_for(profile, &cycle, anchor_date);
    let tally = rules::tally(&dated, &cycle);

    Ok(policy::assemble(profile, cycle, as_of, targets, tally))
}

/// Reasons a record cannot be evaluated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordDefect {
    #[error("hours must be a non-negative number (found {0})")]
    InvalidHours(f64),
    #[error("completion date is missing")]
    MissingDate,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    /// Misconfigured reference data; an operator-facing defect.
    #[error("designation profile {code} is invalid: {defect}")]
    InvalidProfile {
        code: DesignationCode,
        defect: ProfileDefect,
    },
    /// Malformed input data; the caller may exclude or report the record.
    #[error("record {index} (\"{title}\") is invalid: {defect}")]
    InvalidRecord {
        index: usize,
        title: String,
        defect: RecordDefect,
    },
    #[error("no representable renewal cycle contains {as_of}")]
    CycleOutOfRange { as_of: NaiveDate },
}

/// Progress toward one sub-requirement within the cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementProgress {
    pub bucket: RequirementBucket,
    pub minimum: Minimum,
    pub earned_hours: f64,
    pub courses: usize,
    pub satisfied: bool,
}

/// Hours earned in one calendar year of the cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualProgress {
    pub year: i32,
    pub earned_hours: f64,
    pub required_hours: f64,
    pub satisfied: bool,
}

/// Scaling applied to a holder who joined part-way through the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProrationApplied {
    pub remaining_periods: i32,
    pub total_periods: i32,
}

/// Compliance position for one designation and one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub designation: DesignationCode,
    pub as_of: NaiveDate,
    pub cycle: ComplianceCycle,
    pub total_earned: f64,
    pub total_required: f64,
    pub records_counted: usize,
    pub category_hours: BTreeMap<CeCategory, f64>,
    pub requirements: Vec<RequirementProgress>,
    pub annual_progress: Vec<AnnualProgress>,
    pub proration: Option<ProrationApplied>,
    pub compliant: bool,
}
