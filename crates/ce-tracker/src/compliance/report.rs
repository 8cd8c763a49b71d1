use super::domain::{CeCategory, DesignationCode};
use super::evaluation::{AnnualProgress, ComplianceReport, RequirementProgress};
use super::profile::Minimum;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct RequirementView {
    pub label: &'static str,
    pub required_label: String,
    pub earned_hours: f64,
    pub remaining_hours: f64,
    pub percentage: f64,
    pub satisfied: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnnualView {
    pub year: i32,
    pub earned_hours: f64,
    pub required_hours: f64,
    pub percentage: f64,
    pub satisfied: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryHoursEntry {
    pub category: CeCategory,
    pub category_label: &'static str,
    pub hours: f64,
}

/// Display-ready summary of a [`ComplianceReport`].
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceSummaryView {
    pub designation: DesignationCode,
    pub period_start: NaiveDate,
    /// Last day inside the cycle (inclusive).
    pub period_end: NaiveDate,
    pub total_required: f64,
    pub total_earned: f64,
    pub total_remaining: f64,
    pub total_percentage: f64,
    pub category_hours: Vec<CategoryHoursEntry>,
    pub requirements: Vec<RequirementView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annual: Vec<AnnualView>,
    pub prorated: bool,
    pub status_label: &'static str,
    pub is_complete: bool,
}

impl ComplianceReport {
    pub fn total_remaining(&self) -> f64 {
        (self.total_required - self.total_earned).max(0.0)
    }

    pub fn total_percentage(&self) -> f64 {
        percentage(self.total_earned, self.total_required)
    }

    pub fn summary(&self) -> ComplianceSummaryView {
        let category_hours = CeCategory::ordered()
            .into_iter()
            .filter_map(|category| {
                self.category_hours
                    .get(&category)
                    .map(|hours| CategoryHoursEntry {
                        category,
                        category_label: category.label(),
                        hours: *hours,
                    })
            })
            .collect();

        ComplianceSummaryView {
            designation: self.designation,
            period_start: self.cycle.start,
            period_end: self.cycle.last_day(),
            total_required: self.total_required,
            total_earned: self.total_earned,
            total_remaining: self.total_remaining(),
            total_percentage: self.total_percentage(),
            category_hours,
            requirements: self.requirements.iter().map(RequirementProgress::to_view).collect(),
            annual: self.annual_progress.iter().map(AnnualProgress::to_view).collect(),
            prorated: self.proration.is_some(),
            status_label: if self.compliant { "Complete" } else { "In Progress" },
            is_complete: self.compliant,
        }
    }
}

impl RequirementProgress {
    pub fn to_view(&self) -> RequirementView {
        let (required_label, remaining_hours, percentage) = match self.minimum {
            Minimum::Hours { hours } => (
                format!("{hours:.1} hours"),
                (hours - self.earned_hours).max(0.0),
                percentage(self.earned_hours, hours),
            ),
            Minimum::AnyCourse => (
                "at least one course".to_string(),
                0.0,
                if self.courses > 0 { 100.0 } else { 0.0 },
            ),
        };

        RequirementView {
            label: self.bucket.label(),
            required_label,
            earned_hours: self.earned_hours,
            remaining_hours,
            percentage,
            satisfied: self.satisfied,
        }
    }
}

impl AnnualProgress {
    pub fn to_view(&self) -> AnnualView {
        AnnualView {
            year: self.year,
            earned_hours: self.earned_hours,
            required_hours: self.required_hours,
            percentage: percentage(self.earned_hours, self.required_hours),
            satisfied: self.satisfied,
        }
    }
}

fn percentage(earned: f64, required: f64) -> f64 {
    if required <= 0.0 {
        return 100.0;
    }
    (earned / required * 100.0).clamp(0.0, 100.0)
}
