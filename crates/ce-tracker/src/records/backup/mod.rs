mod parser;

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{CeRecord, TenantId, UserId};
use crate::compliance::{DesignationCode, UserDesignation};

const DISPLAYED_NOTES: usize = 10;

/// Portable copy of one user's CE history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupDocument {
    pub exported_at: DateTime<Utc>,
    pub user: BackupUser,
    #[serde(default)]
    pub designations: Vec<BackupDesignation>,
    pub ce_records: Vec<BackupRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackupUser {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub is_napfa_member: bool,
    #[serde(default)]
    pub napfa_join_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupDesignation {
    pub designation: String,
    #[serde(default)]
    pub acquired_on: Option<NaiveDate>,
    #[serde(default)]
    pub birth_month: Option<u32>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub credential_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub title: String,
    pub provider: String,
    pub hours: f64,
    pub date_completed: Option<NaiveDate>,
    pub category: String,
    pub description: String,
    pub is_napfa_approved: bool,
    pub is_ethics_course: bool,
    pub napfa_subject_area: String,
}

impl BackupDocument {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Build a backup document with records ordered newest first.
pub fn export(
    user: &BackupUser,
    designations: &[UserDesignation],
    records: &[CeRecord],
    exported_at: DateTime<Utc>,
) -> BackupDocument {
    let mut ordered: Vec<&CeRecord> = records.iter().collect();
    ordered.sort_by(|a, b| b.completed_on.cmp(&a.completed_on));

    BackupDocument {
        exported_at,
        user: user.clone(),
        designations: designations
            .iter()
            .map(|holding| BackupDesignation {
                designation: holding.code.to_string(),
                acquired_on: Some(holding.acquired_on),
                birth_month: holding.birth_month,
                state: holding.state.clone(),
                credential_number: holding.credential_number.clone(),
            })
            .collect(),
        ce_records: ordered
            .into_iter()
            .map(|record| BackupRecord {
                title: record.title.clone(),
                provider: record.provider.clone(),
                hours: record.hours,
                date_completed: record.completed_on,
                category: record.category.label().to_string(),
                description: record.description.clone(),
                is_napfa_approved: record.sponsor_approved,
                is_ethics_course: record.ethics_course,
                napfa_subject_area: record.subject_area.clone(),
            })
            .collect(),
    }
}

/// Result of restoring a backup; records are not yet persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    pub user: Option<BackupUser>,
    pub records: Vec<CeRecord>,
    pub designations: Vec<UserDesignation>,
    pub imported: usize,
    pub skipped: usize,
    pub notes: Vec<String>,
}

impl ImportOutcome {
    /// The first notes worth showing a user, and how many were left out.
    pub fn display_notes(&self) -> (&[String], usize) {
        let shown = self.notes.len().min(DISPLAYED_NOTES);
        (&self.notes[..shown], self.notes.len() - shown)
    }

    pub fn summary(&self) -> String {
        let mut message = format!(
            "Restored {} CE record{}.",
            self.imported,
            if self.imported == 1 { "" } else { "s" }
        );
        if self.skipped > 0 {
            message.push_str(&format!(" {} skipped (duplicates or errors).", self.skipped));
        }
        message
    }
}

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Json(serde_json::Error),
    MissingRecords,
    RecordsNotArray,
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read backup: {}", err),
            ImportError::Json(err) => write!(f, "backup is not valid JSON: {}", err),
            ImportError::MissingRecords => {
                write!(f, "invalid backup file: missing \"ce_records\" key")
            }
            ImportError::RecordsNotArray => {
                write!(f, "invalid backup file: \"ce_records\" must be an array")
            }
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Json(err) => Some(err),
            ImportError::MissingRecords | ImportError::RecordsNotArray => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Restores backup documents for one owner.
#[derive(Debug, Clone, Copy)]
pub struct BackupImporter {
    owner: UserId,
    tenant: TenantId,
}

impl BackupImporter {
    pub fn new(owner: UserId, tenant: TenantId) -> Self {
        Self { owner, tenant }
    }

    pub fn from_path<P: AsRef<Path>>(
        &self,
        path: P,
        today: NaiveDate,
        existing: &[CeRecord],
    ) -> Result<ImportOutcome, ImportError> {
        let file = std::fs::File::open(path)?;
        self.import(std::io::BufReader::new(file), today, existing)
    }

    /// Parse a backup, skipping malformed entries and duplicates of `existing`.
    pub fn import<R: Read>(
        &self,
        reader: R,
        today: NaiveDate,
        existing: &[CeRecord],
    ) -> Result<ImportOutcome, ImportError> {
        let document = parser::parse_document(reader)?;
        let mut notes = Vec::new();
        let mut records: Vec<CeRecord> = Vec::new();
        let mut skipped = 0;

        for (index, entry) in document.records.iter().enumerate() {
            let position = index + 1;
            let candidate = match parser::parse_record(entry, today) {
                Ok(parsed) => {
                    notes.extend(parsed.note.map(|note| format!("Record {position}: {note}")));
                    parsed.record.owned_by(self.owner, self.tenant)
                }
                Err(reason) => {
                    notes.push(format!("Record {position}: {reason}"));
                    skipped += 1;
                    continue;
                }
            };

            let duplicate = existing
                .iter()
                .chain(records.iter())
                .any(|other| candidate.is_duplicate_of(other));
            if duplicate {
                debug!(title = %candidate.title, "duplicate backup entry skipped");
                skipped += 1;
                continue;
            }

            records.push(candidate);
        }

        let designations = restore_designations(&document, today, &mut notes);

        Ok(ImportOutcome {
            user: document.user,
            imported: records.len(),
            records,
            designations,
            skipped,
            notes,
        })
    }
}

fn restore_designations(
    document: &parser::RawDocument,
    today: NaiveDate,
    notes: &mut Vec<String>,
) -> Vec<UserDesignation> {
    let mut holdings: Vec<UserDesignation> = Vec::new();

    for (index, entry) in document.designations.iter().enumerate() {
        match parser::parse_designation(entry, today) {
            Ok(parsed) => {
                notes.extend(
                    parsed
                        .note
                        .map(|note| format!("Designation {}: {note}", index + 1)),
                );
                if !holdings.iter().any(|held| held.code == parsed.holding.code) {
                    holdings.push(parsed.holding);
                }
            }
            Err(reason) => notes.push(format!("Designation {}: {reason}", index + 1)),
        }
    }

    let napfa_member = document
        .user
        .as_ref()
        .is_some_and(|user| user.is_napfa_member);
    if napfa_member && !holdings.iter().any(|held| held.code == DesignationCode::Napfa) {
        let joined = document
            .user
            .as_ref()
            .and_then(|user| user.napfa_join_date)
            .unwrap_or(today);
        holdings.push(UserDesignation::new(DesignationCode::Napfa, joined));
    }

    holdings
}
