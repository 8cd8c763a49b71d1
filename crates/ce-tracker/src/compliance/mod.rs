//! Designation renewal rules and the compliance evaluator.
//!
//! [`evaluate`] is a pure function over a record set, a profile and two
//! dates. [`ComplianceEvaluator`] resolves a holder's designation against the
//! [`ProfileCatalog`] and derives the anchor date before delegating to it.

pub mod catalog;
pub mod domain;
pub(crate) mod evaluation;
pub mod profile;
pub mod report;
pub mod service;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogError, ProfileCatalog};
pub use domain::{
    CeCategory, ComplianceCycle, DesignationCode, UnknownDesignationCode, UserDesignation,
};
pub use evaluation::{
    evaluate, AnnualProgress, ComplianceReport, EvaluationError, ProrationApplied, RecordDefect,
    RequirementProgress,
};
pub use profile::{
    CycleAnchor, DesignationProfile, Minimum, Proration, ProfileDefect, RequirementBucket,
    StateVariant, SubRequirement,
};
pub use report::{AnnualView, CategoryHoursEntry, ComplianceSummaryView, RequirementView};
pub use service::{ComplianceError, ComplianceEvaluator, DashboardEntry};
