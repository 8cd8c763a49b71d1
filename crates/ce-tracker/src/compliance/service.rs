use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{debug, warn};

use super::catalog::ProfileCatalog;
use super::domain::{ComplianceCycle, DesignationCode, UserDesignation};
use super::evaluation::{cycle, evaluate, ComplianceReport, EvaluationError};
use super::profile::{CycleAnchor, DesignationProfile};
use crate::records::CeRecord;

/// Evaluates a holder's designations against the shared profile catalog.
#[derive(Debug, Clone)]
pub struct ComplianceEvaluator {
    catalog: Arc<ProfileCatalog>,
}

/// One row of a holder's compliance dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DashboardEntry {
    Evaluated(ComplianceReport),
    Failed {
        designation: DesignationCode,
        reason: String,
    },
}

impl DashboardEntry {
    pub fn designation(&self) -> DesignationCode {
        match self {
            DashboardEntry::Evaluated(report) => report.designation,
            DashboardEntry::Failed { designation, .. } => *designation,
        }
    }

    pub fn report(&self) -> Option<&ComplianceReport> {
        match self {
            DashboardEntry::Evaluated(report) => Some(report),
            DashboardEntry::Failed { .. } => None,
        }
    }
}

impl ComplianceEvaluator {
    pub fn new(catalog: ProfileCatalog) -> Self {
        Self::shared(Arc::new(catalog))
    }

    pub fn shared(catalog: Arc<ProfileCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &ProfileCatalog {
        &self.catalog
    }

    /// Evaluate one holding for the cycle containing `as_of`.
    pub fn evaluate_holding(
        &self,
        records: &[CeRecord],
        holding: &UserDesignation,
        as_of: NaiveDate,
    ) -> Result<ComplianceReport, ComplianceError> {
        let profile = self.profile_for(holding)?;
        let anchor = anchor_date(&profile, holding)?;
        let report = evaluate(records, &profile, anchor, as_of)?;
        Ok(report)
    }

    /// Cycle of `holding` that contains `date`.
    pub fn cycle_for(
        &self,
        holding: &UserDesignation,
        date: NaiveDate,
    ) -> Result<ComplianceCycle, ComplianceError> {
        let profile = self.profile_for(holding)?;
        profile
            .validate()
            .map_err(|defect| EvaluationError::InvalidProfile {
                code: profile.code,
                defect,
            })?;
        let anchor = anchor_date(&profile, holding)?;
        cycle::active_cycle(profile.anchor, profile.cycle_months, anchor, date)
            .ok_or(ComplianceError::Evaluation(EvaluationError::CycleOutOfRange {
                as_of: date,
            }))
    }

    /// Evaluate every holding independently; one failing holding never hides the others.
    pub fn dashboard(
        &self,
        records: &[CeRecord],
        holdings: &[UserDesignation],
        as_of: NaiveDate,
    ) -> Vec<DashboardEntry> {
        holdings
            .iter()
            .map(|holding| match self.evaluate_holding(records, holding, as_of) {
                Ok(report) => {
                    debug!(
                        designation = %holding.code,
                        earned = report.total_earned,
                        required = report.total_required,
                        compliant = report.compliant,
                        "designation evaluated"
                    );
                    DashboardEntry::Evaluated(report)
                }
                Err(err) => {
                    warn!(designation = %holding.code, error = %err, "designation evaluation failed");
                    DashboardEntry::Failed {
                        designation: holding.code,
                        reason: err.to_string(),
                    }
                }
            })
            .collect()
    }

    fn profile_for(&self, holding: &UserDesignation) -> Result<DesignationProfile, ComplianceError> {
        self.catalog
            .resolve(holding.code, holding.state.as_deref())
            .ok_or(ComplianceError::UnknownDesignation(holding.code))
    }
}

impl Default for ComplianceEvaluator {
    fn default() -> Self {
        Self::new(ProfileCatalog::standard())
    }
}

fn anchor_date(
    profile: &DesignationProfile,
    holding: &UserDesignation,
) -> Result<NaiveDate, ComplianceError> {
    match profile.anchor {
        CycleAnchor::BirthMonth => {
            let month = holding
                .birth_month
                .ok_or(ComplianceError::MissingBirthMonth(holding.code))?;
            NaiveDate::from_ymd_opt(holding.acquired_on.year(), month, 1)
                .ok_or(ComplianceError::InvalidBirthMonth(month))
        }
        CycleAnchor::Holder | CycleAnchor::SharedEpoch { .. } => Ok(holding.acquired_on),
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComplianceError {
    #[error("no renewal profile is configured for {0}")]
    UnknownDesignation(DesignationCode),
    #[error("{0} renewal cycles are anchored to a birth month, but none was recorded")]
    MissingBirthMonth(DesignationCode),
    #[error("birth month must be between 1 and 12 (found {0})")]
    InvalidBirthMonth(u32),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}
