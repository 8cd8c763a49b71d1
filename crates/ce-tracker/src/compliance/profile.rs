use super::domain::{CeCategory, DesignationCode};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a profile's renewal cycles are positioned on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CycleAnchor {
    /// Cycles step from the holder's acquisition or renewal date.
    Holder,
    /// Cycles start on the first day of the anchor date's month.
    BirthMonth,
    /// Cycles are shared by every holder and step from January 1 of `year`.
    SharedEpoch { year: i32 },
}

/// Which hours a sub-requirement counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequirementBucket {
    Category { category: CeCategory },
    /// Courses pre-approved by the credentialing body.
    SponsorApproved,
    /// Courses flagged as ethics courses, whatever their category.
    EthicsCourse,
}

impl RequirementBucket {
    pub fn label(&self) -> &'static str {
        match self {
            RequirementBucket::Category { category } => category.label(),
            RequirementBucket::SponsorApproved => "Sponsor-approved",
            RequirementBucket::EthicsCourse => "Ethics course",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Minimum {
    Hours { hours: f64 },
    /// At least one course in the bucket, regardless of length.
    AnyCourse,
}

impl Minimum {
    pub fn hours(&self) -> Option<f64> {
        match self {
            Minimum::Hours { hours } => Some(*hours),
            Minimum::AnyCourse => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubRequirement {
    pub bucket: RequirementBucket,
    pub minimum: Minimum,
}

impl SubRequirement {
    pub fn category_hours(category: CeCategory, hours: f64) -> Self {
        Self {
            bucket: RequirementBucket::Category { category },
            minimum: Minimum::Hours { hours },
        }
    }
}

/// Requirement scaling for holders who join part-way through a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proration {
    pub period_months: i32,
}

/// Overrides applied when the holder's credential was issued by a given state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StateVariant {
    #[serde(default)]
    pub cycle_months: Option<i32>,
    #[serde(default)]
    pub total_hours: Option<f64>,
    #[serde(default)]
    pub sub_requirements: Option<Vec<SubRequirement>>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Renewal rule for one designation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignationProfile {
    pub code: DesignationCode,
    pub name: String,
    pub issuing_body: String,
    pub cycle_months: i32,
    pub anchor: CycleAnchor,
    pub total_hours: f64,
    #[serde(default)]
    pub sub_requirements: Vec<SubRequirement>,
    #[serde(default)]
    pub annual_minimum_hours: Option<f64>,
    #[serde(default)]
    pub proration: Option<Proration>,
    #[serde(default)]
    pub state_variants: BTreeMap<String, StateVariant>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notes: Vec<String>,
}

/// Misconfiguration found in a profile.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileDefect {
    #[error("cycle length must be positive (found {0} months)")]
    NonPositiveCycle(i32),
    #[error("total requirement must be a non-negative number (found {0})")]
    InvalidTotal(f64),
    #[error("{label} minimum must be a non-negative number (found {hours})")]
    InvalidSubMinimum { label: &'static str, hours: f64 },
    #[error("{label} minimum of {hours} exceeds the total requirement of {total}")]
    SubMinimumExceedsTotal {
        label: &'static str,
        hours: f64,
        total: f64,
    },
    #[error("annual minimum must be a non-negative number (found {0})")]
    InvalidAnnualMinimum(f64),
    #[error("shared epoch year {0} is outside the supported date range")]
    InvalidEpochYear(i32),
    #[error("proration period of {period} months must be positive and divide the {cycle} month cycle")]
    InvalidProrationPeriod { period: i32, cycle: i32 },
}

impl DesignationProfile {
    pub fn new(
        code: DesignationCode,
        name: &str,
        issuing_body: &str,
        cycle_months: i32,
        anchor: CycleAnchor,
        total_hours: f64,
    ) -> Self {
        Self {
            code,
            name: name.to_string(),
            issuing_body: issuing_body.to_string(),
            cycle_months,
            anchor,
            total_hours,
            sub_requirements: Vec::new(),
            annual_minimum_hours: None,
            proration: None,
            state_variants: BTreeMap::new(),
            description: String::new(),
            notes: Vec::new(),
        }
    }

    pub fn with_sub_requirement(mut self, requirement: SubRequirement) -> Self {
        self.sub_requirements.push(requirement);
        self
    }

    pub fn with_annual_minimum(mut self, hours: f64) -> Self {
        self.annual_minimum_hours = Some(hours);
        self
    }

    pub fn with_proration(mut self, period_months: i32) -> Self {
        self.proration = Some(Proration { period_months });
        self
    }

    pub fn with_state_variant(mut self, state: &str, variant: StateVariant) -> Self {
        self.state_variants
            .insert(state.trim().to_ascii_uppercase(), variant);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_note(mut self, note: &str) -> Self {
        self.notes.push(note.to_string());
        self
    }

    /// Apply the state variant for `state`, if one is configured.
    pub fn for_state(&self, state: Option<&str>) -> DesignationProfile {
        let variant = state.and_then(|code| {
            self.state_variants
                .get(code.trim().to_ascii_uppercase().as_str())
        });

        let mut resolved = self.clone();
        if let Some(variant) = variant {
            if let Some(months) = variant.cycle_months {
                resolved.cycle_months = months;
            }
            if let Some(total) = variant.total_hours {
                resolved.total_hours = total;
            }
            if let Some(subs) = &variant.sub_requirements {
                resolved.sub_requirements = subs.clone();
            }
            if let Some(description) = &variant.description {
                resolved.description = description.clone();
            }
        }
        resolved
    }

    pub fn validate(&self) -> Result<(), ProfileDefect> {
        if self.cycle_months <= 0 {
            return Err(ProfileDefect::NonPositiveCycle(self.cycle_months));
        }

        if let CycleAnchor::SharedEpoch { year } = self.anchor {
            if NaiveDate::from_ymd_opt(year, 1, 1).is_none() {
                return Err(ProfileDefect::InvalidEpochYear(year));
            }
        }

        if !self.total_hours.is_finite() || self.total_hours < 0.0 {
            return Err(ProfileDefect::InvalidTotal(self.total_hours));
        }

        for requirement in &self.sub_requirements {
            if let Some(hours) = requirement.minimum.hours() {
                let label = requirement.bucket.label();
                if !hours.is_finite() || hours < 0.0 {
                    return Err(ProfileDefect::InvalidSubMinimum { label, hours });
                }
                if hours > self.total_hours {
                    return Err(ProfileDefect::SubMinimumExceedsTotal {
                        label,
                        hours,
                        total: self.total_hours,
                    });
                }
            }
        }

        if let Some(hours) = self.annual_minimum_hours {
            if !hours.is_finite() || hours < 0.0 {
                return Err(ProfileDefect::InvalidAnnualMinimum(hours));
            }
        }

        if let Some(proration) = self.proration {
            if proration.period_months <= 0 || self.cycle_months % proration.period_months != 0 {
                return Err(ProfileDefect::InvalidProrationPeriod {
                    period: proration.period_months,
                    cycle: self.cycle_months,
                });
            }
        }

        Ok(())
    }
}
