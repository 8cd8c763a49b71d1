//! CE record ownership, storage and interchange.
//!
//! Records are scoped per tenant through [`Actor::can_access`]; the
//! [`RecordService`] applies that filter and the closed-cycle lock before
//! anything reaches a [`RecordRepository`].

pub mod access;
pub mod analytics;
pub mod backup;
pub mod domain;
pub mod repository;
pub mod service;

#[cfg(test)]
mod tests;

pub use access::{Actor, Role};
pub use analytics::{summarize, CeAnalytics, ProviderHours};
pub use backup::{
    export, BackupDesignation, BackupDocument, BackupImporter, BackupRecord, BackupUser,
    ImportError, ImportOutcome,
};
pub use domain::{CeRecord, RecordDraft, RecordId, TenantId, UserId};
pub use repository::{InMemoryRecordRepository, RecordRepository, RepositoryError};
pub use service::{RecordService, RecordServiceError, RecordViolation};
