use super::domain::{CeCategory, DesignationCode};
use super::profile::{
    CycleAnchor, DesignationProfile, Minimum, ProfileDefect, RequirementBucket, StateVariant,
    SubRequirement,
};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// Read-only table of designation profiles keyed by code.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileCatalog {
    profiles: BTreeMap<DesignationCode, DesignationProfile>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read profile table: {0}")]
    Io(#[from] std::io::Error),
    #[error("profile table is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("profile {code}{} is invalid: {defect}", state_suffix(.state))]
    InvalidProfile {
        code: DesignationCode,
        state: Option<String>,
        defect: ProfileDefect,
    },
}

fn state_suffix(state: &Option<String>) -> String {
    state
        .as_ref()
        .map(|state| format!(" ({state})"))
        .unwrap_or_default()
}

impl ProfileCatalog {
    /// Build a catalog, rejecting any profile (or state variant) that fails validation.
    pub fn from_profiles<I>(profiles: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = DesignationProfile>,
    {
        let catalog = Self {
            profiles: profiles
                .into_iter()
                .map(|profile| (profile.code, profile))
                .collect(),
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Standard table, overlaid with the JSON array of profiles read from `reader`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let overrides: Vec<DesignationProfile> = serde_json::from_reader(reader)?;
        Self::standard().merge(overrides)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn merge(mut self, overrides: Vec<DesignationProfile>) -> Result<Self, CatalogError> {
        for profile in overrides {
            self.profiles.insert(profile.code, profile);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        for profile in self.profiles.values() {
            profile
                .validate()
                .map_err(|defect| CatalogError::InvalidProfile {
                    code: profile.code,
                    state: None,
                    defect,
                })?;

            for state in profile.state_variants.keys() {
                profile.for_state(Some(state)).validate().map_err(|defect| {
                    CatalogError::InvalidProfile {
                        code: profile.code,
                        state: Some(state.clone()),
                        defect,
                    }
                })?;
            }
        }
        Ok(())
    }

    pub fn get(&self, code: DesignationCode) -> Option<&DesignationProfile> {
        self.profiles.get(&code)
    }

    /// Profile for `code` with the state variant for `state` applied.
    pub fn resolve(&self, code: DesignationCode, state: Option<&str>) -> Option<DesignationProfile> {
        self.get(code).map(|profile| profile.for_state(state))
    }

    pub fn iter(&self) -> impl Iterator<Item = &DesignationProfile> {
        self.profiles.values()
    }

    pub fn codes(&self) -> Vec<DesignationCode> {
        self.profiles.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Renewal rules for every supported designation.
    pub fn standard() -> Self {
        use DesignationCode as Code;

        const CALENDAR_YEAR: CycleAnchor = CycleAnchor::SharedEpoch { year: 2000 };
        const ODD_YEAR_BIENNIUM: CycleAnchor = CycleAnchor::SharedEpoch { year: 2001 };
        const EVEN_YEAR_BIENNIUM: CycleAnchor = CycleAnchor::SharedEpoch { year: 2000 };
        const EA_TRIENNIUM: CycleAnchor = CycleAnchor::SharedEpoch { year: 2001 };

        let ethics = |hours| SubRequirement::category_hours(CeCategory::Ethics, hours);
        let american_college = |code, name| {
            DesignationProfile::new(code, name, "The American College", 24, ODD_YEAR_BIENNIUM, 30.0)
                .with_description(&format!(
                    "{code} professionals must complete 30 hours of continuing education every 2 years as specified by The American College."
                ))
        };
        let iwi = |code, name| {
            DesignationProfile::new(code, name, "Investments & Wealth Institute", 24, ODD_YEAR_BIENNIUM, 40.0)
                .with_description(&format!(
                    "{code} professionals must complete 40 hours of continuing education every 2 years as specified by the Investments & Wealth Institute."
                ))
        };
        let cepi = |code, name| {
            DesignationProfile::new(code, name, "Certified Equity Professional Institute", 24, CycleAnchor::Holder, 30.0)
                .with_description(&format!(
                    "{name} ({code}) requires 30 hours of continuing education every two years."
                ))
                .with_note("$250 administrative fee, waived after 15 hours of volunteer work")
        };

        let profiles = vec![
            DesignationProfile::new(Code::Cfp, "Certified Financial Planner", "CFP Board", 24, CycleAnchor::BirthMonth, 30.0)
                .with_sub_requirement(ethics(2.0))
                .with_description("CFP professionals must complete 30 hours of CE every two years, including 2 hours of CFP Board-approved Ethics CE and 28 hours in the CFP Board's Principal Topics."),
            DesignationProfile::new(Code::Cpa, "Certified Public Accountant", "State Board of Accountancy", 12, CALENDAR_YEAR, 40.0)
                .with_description("CPAs must complete continuing professional education that varies by state. Most states require 40 hours of CPE per year.")
                .with_state_variant("CA", StateVariant {
                    cycle_months: Some(24),
                    total_hours: Some(80.0),
                    sub_requirements: Some(vec![ethics(4.0)]),
                    description: Some("California CPAs must complete 80 hours of CPE every two years, including 4 hours of ethics.".to_string()),
                })
                .with_state_variant("NY", StateVariant {
                    total_hours: Some(40.0),
                    description: Some("New York CPAs must complete 40 hours of CPE per calendar year.".to_string()),
                    ..StateVariant::default()
                }),
            DesignationProfile::new(Code::Ea, "Enrolled Agent", "Internal Revenue Service", 36, EA_TRIENNIUM, 72.0)
                .with_sub_requirement(ethics(2.0))
                .with_annual_minimum(16.0)
                .with_description("Enrolled Agents must complete 72 hours of CE every three years, with a minimum of 16 hours per year. At least 2 hours must be on ethics."),
            cepi(Code::Cep, "Certified Equity Professional"),
            cepi(Code::Eca, "Equity Compensation Associate"),
            DesignationProfile::new(Code::Cfa, "Chartered Financial Analyst", "CFA Institute", 12, CALENDAR_YEAR, 20.0)
                .with_description("CFA charterholders must complete 20 professional learning credits per calendar year through the CFA Institute."),
            american_college(Code::Clu, "Chartered Life Underwriter"),
            american_college(Code::Chfc, "Chartered Financial Consultant"),
            american_college(Code::Ricp, "Retirement Income Certified Professional"),
            iwi(Code::Cima, "Certified Investment Management Analyst"),
            iwi(Code::Cimc, "Certified Investment Management Consultant"),
            iwi(Code::Cpwa, "Certified Private Wealth Advisor"),
            DesignationProfile::new(Code::Crps, "Chartered Retirement Plans Specialist", "College for Financial Planning", 24, ODD_YEAR_BIENNIUM, 16.0)
                .with_description("CRPS professionals must complete 16 hours of continuing education every 2 years as specified by The College for Financial Planning."),
            DesignationProfile::new(Code::Cdfa, "Certified Divorce Financial Analyst", "Institute for Divorce Financial Analysts", 12, CALENDAR_YEAR, 15.0)
                .with_description("CDFA professionals must complete 15 hours of continuing education per year."),
            DesignationProfile::new(Code::Aif, "Accredited Investment Fiduciary", "Fi360", 12, CALENDAR_YEAR, 6.0)
                .with_description("AIF designees must complete 6 hours of continuing education per year as specified by Fi360."),
            DesignationProfile::new(Code::Iar, "Investment Adviser Representative", "NASAA", 12, CALENDAR_YEAR, 12.0)
                .with_sub_requirement(ethics(6.0))
                .with_description("Investment Adviser Representatives must complete 12 hours of continuing education per year, including 6 hours of ethics and professional responsibility."),
            DesignationProfile::new(Code::Cle, "Continuing Legal Education", "State Bar", 12, CycleAnchor::Holder, 15.0)
                .with_sub_requirement(ethics(1.0))
                .with_description("CLE requirements vary by jurisdiction. The default follows the ABA model rule of 15 hours per year including 1 hour of ethics.")
                .with_state_variant("CA", StateVariant {
                    cycle_months: Some(36),
                    total_hours: Some(25.0),
                    sub_requirements: Some(vec![ethics(4.0)]),
                    description: Some("California attorneys must complete 25 hours of MCLE every three years, including 4 hours of legal ethics.".to_string()),
                })
                .with_state_variant("NY", StateVariant {
                    cycle_months: Some(24),
                    total_hours: Some(24.0),
                    sub_requirements: Some(vec![ethics(4.0)]),
                    description: Some("New York attorneys must complete 24 hours of CLE every two years, including 4 hours of ethics and professionalism.".to_string()),
                }),
            DesignationProfile::new(Code::Napfa, "NAPFA Membership", "NAPFA", 24, EVEN_YEAR_BIENNIUM, 60.0)
                .with_sub_requirement(SubRequirement {
                    bucket: RequirementBucket::SponsorApproved,
                    minimum: Minimum::Hours { hours: 30.0 },
                })
                .with_sub_requirement(SubRequirement {
                    bucket: RequirementBucket::EthicsCourse,
                    minimum: Minimum::AnyCourse,
                })
                .with_proration(6)
                .with_description("NAPFA members must complete 60 hours of CE every two years, 30 of them NAPFA-approved, and at least one ethics course. Members joining mid-cycle have a reduced requirement."),
        ];

        Self {
            profiles: profiles
                .into_iter()
                .map(|profile| (profile.code, profile))
                .collect(),
        }
    }
}

impl Default for ProfileCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
