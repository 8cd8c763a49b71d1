use ce_tracker::compliance::{CatalogError, ProfileCatalog};
use ce_tracker::config::EvaluationSettings;
use ce_tracker::records::{BackupImporter, ImportError, ImportOutcome, TenantId, UserId};
use chrono::{Local, NaiveDate};
use std::path::Path;

// Backups are restored for a single local user.
const LOCAL_OWNER: UserId = UserId(1);
const LOCAL_TENANT: TenantId = TenantId(1);

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Command-line date, then the configured evaluation date, then today.
pub(crate) fn resolve_as_of(flag: Option<NaiveDate>, settings: &EvaluationSettings) -> NaiveDate {
    flag.unwrap_or_else(|| settings.as_of_or(today()))
}

pub(crate) fn load_catalog(
    settings: &EvaluationSettings,
    override_path: Option<&Path>,
) -> Result<ProfileCatalog, CatalogError> {
    match override_path {
        Some(path) => ProfileCatalog::from_path(path),
        None => settings.catalog(),
    }
}

pub(crate) fn load_backup(path: &Path, today: NaiveDate) -> Result<ImportOutcome, ImportError> {
    BackupImporter::new(LOCAL_OWNER, LOCAL_TENANT).from_path(path, today, &[])
}
