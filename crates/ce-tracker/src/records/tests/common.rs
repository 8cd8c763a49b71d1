use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;

use crate::compliance::ComplianceEvaluator;
use crate::records::{
    CeRecord, InMemoryRecordRepository, RecordDraft, RecordId, RecordRepository, RecordService,
    RepositoryError, TenantId, UserId,
};

pub(super) const OWNER: UserId = UserId(7);
pub(super) const OTHER_USER: UserId = UserId(8);
pub(super) const TENANT: TenantId = TenantId(1);
pub(super) const OTHER_TENANT: TenantId = TenantId(2);

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn draft(title: &str, hours: f64, on: NaiveDate) -> RecordDraft {
    RecordDraft {
        title: title.to_string(),
        provider: "Kitces".to_string(),
        category: "Financial Planning".to_string(),
        hours,
        completed_on: Some(on),
        ..RecordDraft::default()
    }
}

pub(super) fn build_service() -> (
    RecordService<InMemoryRecordRepository>,
    Arc<InMemoryRecordRepository>,
) {
    let repository = Arc::new(InMemoryRecordRepository::new());
    let service = RecordService::new(repository.clone(), Arc::new(ComplianceEvaluator::default()));
    (service, repository)
}

pub(super) struct UnavailableRepository;

impl RecordRepository for UnavailableRepository {
    fn insert(&self, _record: CeRecord) -> Result<CeRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: CeRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: RecordId) -> Result<Option<CeRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: RecordId) -> Result<CeRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_for_owner(&self, _owner: UserId) -> Result<Vec<CeRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Delegates to an in-memory store but fails the `fail_on`th insert.
pub(super) struct FlakyRepository {
    pub(super) inner: InMemoryRecordRepository,
    inserts: AtomicUsize,
    fail_on: usize,
}

impl FlakyRepository {
    pub(super) fn failing_on(fail_on: usize) -> Self {
        Self {
            inner: InMemoryRecordRepository::new(),
            inserts: AtomicUsize::new(0),
            fail_on,
        }
    }
}

impl RecordRepository for FlakyRepository {
    fn insert(&self, record: CeRecord) -> Result<CeRecord, RepositoryError> {
        if self.inserts.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_on {
            return Err(RepositoryError::Unavailable("write timed out".to_string()));
        }
        self.inner.insert(record)
    }

    fn update(&self, record: CeRecord) -> Result<(), RepositoryError> {
        self.inner.update(record)
    }

    fn fetch(&self, id: RecordId) -> Result<Option<CeRecord>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn delete(&self, id: RecordId) -> Result<CeRecord, RepositoryError> {
        self.inner.delete(id)
    }

    fn list_for_owner(&self, owner: UserId) -> Result<Vec<CeRecord>, RepositoryError> {
        self.inner.list_for_owner(owner)
    }
}
