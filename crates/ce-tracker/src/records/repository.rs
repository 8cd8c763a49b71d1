use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use tracing::warn;

use super::domain::{CeRecord, RecordId, UserId};

/// Storage abstraction so the record service can be exercised in isolation.
///
/// `insert` rejects a record that duplicates one already stored for the same
/// owner, so concurrent writers cannot both log the same course.
pub trait RecordRepository: Send + Sync {
    fn insert(&self, record: CeRecord) -> Result<CeRecord, RepositoryError>;
    fn update(&self, record: CeRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: RecordId) -> Result<Option<CeRecord>, RepositoryError>;
    fn delete(&self, id: RecordId) -> Result<CeRecord, RepositoryError>;
    fn list_for_owner(&self, owner: UserId) -> Result<Vec<CeRecord>, RepositoryError>;

    /// Store every record or none of them.
    ///
    /// The default inserts one at a time and deletes what it stored when an
    /// insert fails.
    fn insert_all(&self, records: Vec<CeRecord>) -> Result<Vec<CeRecord>, RepositoryError> {
        let mut stored: Vec<CeRecord> = Vec::with_capacity(records.len());
        for record in records {
            match self.insert(record) {
                Ok(record) => stored.push(record),
                Err(err) => {
                    for record in &stored {
                        if let Err(rollback) = self.delete(record.id) {
                            warn!(record = record.id.0, error = %rollback, "rollback of batch insert failed");
                        }
                    }
                    return Err(err);
                }
            }
        }
        Ok(stored)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("an identical record is already stored for this owner")]
    Duplicate,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Process-local repository keyed by record id.
#[derive(Debug, Default)]
pub struct InMemoryRecordRepository {
    records: Mutex<BTreeMap<RecordId, CeRecord>>,
}

impl InMemoryRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = CeRecord>,
    {
        Self {
            records: Mutex::new(records.into_iter().map(|record| (record.id, record)).collect()),
        }
    }

    fn check_insertable(
        records: &BTreeMap<RecordId, CeRecord>,
        record: &CeRecord,
    ) -> Result<(), RepositoryError> {
        if records.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        if records.values().any(|other| other.is_duplicate_of(record)) {
            return Err(RepositoryError::Duplicate);
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<RecordId, CeRecord>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("record store lock poisoned".to_string()))
    }
}

impl RecordRepository for InMemoryRecordRepository {
    fn insert(&self, record: CeRecord) -> Result<CeRecord, RepositoryError> {
        let mut guard = self.lock()?;
        Self::check_insertable(&guard, &record)?;
        guard.insert(record.id, record.clone());
        Ok(record)
    }

    fn insert_all(&self, records: Vec<CeRecord>) -> Result<Vec<CeRecord>, RepositoryError> {
        let mut guard = self.lock()?;
        let mut staged = BTreeMap::new();
        for record in &records {
            Self::check_insertable(&guard, record)?;
            Self::check_insertable(&staged, record)?;
            staged.insert(record.id, record.clone());
        }
        guard.append(&mut staged);
        Ok(records)
    }

    fn update(&self, record: CeRecord) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        match guard.get_mut(&record.id) {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: RecordId) -> Result<Option<CeRecord>, RepositoryError> {
        Ok(self.lock()?.get(&id).cloned())
    }

    fn delete(&self, id: RecordId) -> Result<CeRecord, RepositoryError> {
        self.lock()?.remove(&id).ok_or(RepositoryError::NotFound)
    }

    fn list_for_owner(&self, owner: UserId) -> Result<Vec<CeRecord>, RepositoryError> {
        Ok(self
            .lock()?
            .values()
            .filter(|record| record.owner == owner)
            .cloned()
            .collect())
    }
}
