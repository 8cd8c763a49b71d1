use std::io::Read;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use super::access::{Actor, Role};
use super::backup::{BackupImporter, ImportError, ImportOutcome};
use super::domain::{CeRecord, RecordDraft, RecordId, UserId};
use super::repository::{RecordRepository, RepositoryError};
use crate::compliance::{
    CeCategory, ComplianceCycle, ComplianceEvaluator, DesignationCode, UserDesignation,
};

/// Service composing ownership scoping, draft validation and the cycle lock
/// around a record repository.
pub struct RecordService<R> {
    repository: Arc<R>,
    evaluator: Arc<ComplianceEvaluator>,
}

static RECORD_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_record_id() -> RecordId {
    RecordId(RECORD_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

impl<R> RecordService<R>
where
    R: RecordRepository + 'static,
{
    pub fn new(repository: Arc<R>, evaluator: Arc<ComplianceEvaluator>) -> Self {
        Self {
            repository,
            evaluator,
        }
    }

    /// Record a completed activity for the acting user.
    pub fn add(&self, actor: &Actor, draft: RecordDraft) -> Result<CeRecord, RecordServiceError> {
        let mut record = validate_draft(draft)?;
        record.id = next_record_id();
        record.owner = actor.user_id;
        record.tenant = actor.tenant_id;

        let title = record.title.clone();
        let stored = match self.repository.insert(record) {
            Err(RepositoryError::Duplicate) => return Err(RecordServiceError::Duplicate { title }),
            other => other?,
        };
        info!(record = stored.id.0, owner = stored.owner.0, "ce record added");
        Ok(stored)
    }

    /// Replace a record's fields while every cycle touching its old and new date is open.
    pub fn edit(
        &self,
        actor: &Actor,
        id: RecordId,
        draft: RecordDraft,
        holdings: &[UserDesignation],
        as_of: NaiveDate,
    ) -> Result<CeRecord, RecordServiceError> {
        let current = self.accessible(actor, id)?;
        let mut updated = validate_draft(draft)?;
        updated.id = current.id;
        updated.owner = current.owner;
        updated.tenant = current.tenant;

        self.ensure_open(&current, holdings, as_of)?;
        self.ensure_open(&updated, holdings, as_of)?;

        self.repository.update(updated.clone())?;
        info!(record = id.0, "ce record updated");
        Ok(updated)
    }

    pub fn delete(
        &self,
        actor: &Actor,
        id: RecordId,
        holdings: &[UserDesignation],
        as_of: NaiveDate,
    ) -> Result<CeRecord, RecordServiceError> {
        let current = self.accessible(actor, id)?;
        self.ensure_open(&current, holdings, as_of)?;

        let removed = self.repository.delete(id)?;
        info!(record = id.0, "ce record deleted");
        Ok(removed)
    }

    /// Records owned by `owner` that `actor` may see, newest first.
    pub fn list(
        &self,
        actor: &Actor,
        owner: UserId,
        category: Option<CeCategory>,
    ) -> Result<Vec<CeRecord>, RecordServiceError> {
        if actor.role == Role::Member && owner != actor.user_id {
            return Err(RecordServiceError::Forbidden);
        }

        let mut records: Vec<CeRecord> = self
            .repository
            .list_for_owner(owner)?
            .into_iter()
            .filter(|record| actor.can_access(record.owner, record.tenant))
            .filter(|record| category.map_or(true, |wanted| record.category == wanted))
            .collect();

        records.sort_by(|a, b| {
            b.completed_on
                .cmp(&a.completed_on)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(records)
    }

    /// Restore a JSON backup into the acting user's records.
    pub fn import_backup<Rd: Read>(
        &self,
        actor: &Actor,
        reader: Rd,
        today: NaiveDate,
    ) -> Result<ImportOutcome, RecordServiceError> {
        let existing = self.repository.list_for_owner(actor.user_id)?;
        let mut outcome = BackupImporter::new(actor.user_id, actor.tenant_id)
            .import(reader, today, &existing)?;

        for record in &mut outcome.records {
            record.id = next_record_id();
        }
        outcome.records = self.repository.insert_all(std::mem::take(&mut outcome.records))?;

        info!(
            owner = actor.user_id.0,
            imported = outcome.imported,
            skipped = outcome.skipped,
            "backup restored"
        );
        Ok(outcome)
    }

    fn accessible(&self, actor: &Actor, id: RecordId) -> Result<CeRecord, RecordServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        if !actor.can_access(record.owner, record.tenant) {
            warn!(record = id.0, actor = actor.user_id.0, "record access denied");
            return Err(RecordServiceError::Forbidden);
        }
        Ok(record)
    }

    /// Fail when any holding's cycle containing the record's date has closed.
    fn ensure_open(
        &self,
        record: &CeRecord,
        holdings: &[UserDesignation],
        as_of: NaiveDate,
    ) -> Result<(), RecordServiceError> {
        let Some(date) = record.completed_on else {
            return Ok(());
        };

        for holding in holdings {
            match self.evaluator.cycle_for(holding, date) {
                Ok(cycle) if cycle.is_closed(as_of) => {
                    return Err(RecordServiceError::CycleClosed {
                        designation: holding.code,
                        cycle,
                    });
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(designation = %holding.code, error = %err, "holding skipped for record lock");
                }
            }
        }
        Ok(())
    }
}

fn validate_draft(draft: RecordDraft) -> Result<CeRecord, RecordViolation> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(RecordViolation::MissingTitle);
    }

    if !draft.hours.is_finite() || draft.hours < 0.0 {
        return Err(RecordViolation::NegativeHours(draft.hours));
    }

    let completed_on = draft.completed_on.ok_or(RecordViolation::MissingDate)?;
    let category = CeCategory::classify(&draft.category, title);

    let mut record = CeRecord::new(title, category, draft.hours, completed_on);
    record.provider = draft.provider.trim().to_string();
    record.description = draft.description.trim().to_string();
    record.sponsor_approved = draft.sponsor_approved;
    record.ethics_course = draft.ethics_course;
    record.subject_area = draft.subject_area.trim().to_string();
    Ok(record)
}

/// Draft fields that cannot become a record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordViolation {
    #[error("title is required")]
    MissingTitle,
    #[error("hours must be a non-negative number (found {0})")]
    NegativeHours(f64),
    #[error("completion date is required")]
    MissingDate,
}

#[derive(Debug, thiserror::Error)]
pub enum RecordServiceError {
    #[error(transparent)]
    Validation(#[from] RecordViolation),
    #[error("record is outside the caller's access scope")]
    Forbidden,
    #[error("a record titled \"{title}\" with the same date and hours already exists")]
    Duplicate { title: String },
    #[error("the {designation} cycle ending {} has closed; its records can no longer change", last_day(.cycle))]
    CycleClosed {
        designation: DesignationCode,
        cycle: ComplianceCycle,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Import(#[from] ImportError),
}

fn last_day(cycle: &ComplianceCycle) -> NaiveDate {
    cycle.last_day()
}
