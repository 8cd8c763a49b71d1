use std::io::Read;

use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value};

use super::{BackupUser, ImportError};
use crate::compliance::{CeCategory, DesignationCode, UserDesignation};
use crate::records::CeRecord;

/// Backup contents with each entry still unvalidated.
#[derive(Debug)]
pub(crate) struct RawDocument {
    pub(crate) user: Option<BackupUser>,
    pub(crate) designations: Vec<Value>,
    pub(crate) records: Vec<Value>,
}

#[derive(Debug)]
pub(crate) struct ParsedRecord {
    pub(crate) record: CeRecord,
    pub(crate) note: Option<String>,
}

#[derive(Debug)]
pub(crate) struct ParsedDesignation {
    pub(crate) holding: UserDesignation,
    pub(crate) note: Option<String>,
}

pub(crate) fn parse_document<R: Read>(reader: R) -> Result<RawDocument, ImportError> {
    let root: Value = serde_json::from_reader(reader)?;
    let Value::Object(mut root) = root else {
        return Err(ImportError::MissingRecords);
    };

    let records = match root.remove("ce_records") {
        Some(Value::Array(records)) => records,
        Some(_) => return Err(ImportError::RecordsNotArray),
        None => return Err(ImportError::MissingRecords),
    };

    let designations = match root.remove("designations") {
        Some(Value::Array(entries)) => entries,
        _ => Vec::new(),
    };

    let user = root
        .remove("user")
        .and_then(|user| serde_json::from_value::<BackupUser>(user).ok());

    Ok(RawDocument {
        user,
        designations,
        records,
    })
}

pub(crate) fn parse_record(entry: &Value, today: NaiveDate) -> Result<ParsedRecord, String> {
    let Value::Object(fields) = entry else {
        return Err("not a valid object".to_string());
    };

    let title = text(fields, "title");
    if title.is_empty() {
        return Err("missing title".to_string());
    }

    let hours = match fields.get("hours").and_then(number) {
        Some(hours) if hours > 0.0 => hours,
        Some(_) => return Err(format!("hours must be positive (\"{title}\")")),
        None => return Err(format!("invalid hours for \"{title}\"")),
    };

    let raw_date = text(fields, "date_completed");
    let (completed_on, note) = if raw_date.is_empty() {
        (today, Some(format!("missing date for \"{title}\", using today")))
    } else {
        match parse_date(&raw_date) {
            Some(date) => (date, None),
            None => (
                today,
                Some(format!("invalid date \"{raw_date}\" for \"{title}\", using today")),
            ),
        }
    };

    let category = CeCategory::classify(&text(fields, "category"), &title);

    let mut record = CeRecord::new(&title, category, hours, completed_on);
    record.provider = text(fields, "provider");
    record.description = text(fields, "description");
    record.sponsor_approved = truthy(fields.get("is_napfa_approved"));
    record.ethics_course = truthy(fields.get("is_ethics_course"));
    record.subject_area = text(fields, "napfa_subject_area");

    Ok(ParsedRecord { record, note })
}

pub(crate) fn parse_designation(
    entry: &Value,
    today: NaiveDate,
) -> Result<ParsedDesignation, String> {
    let Value::Object(fields) = entry else {
        return Err("not a valid object".to_string());
    };

    let code: DesignationCode = text(fields, "designation")
        .parse()
        .map_err(|err: crate::compliance::UnknownDesignationCode| err.to_string())?;

    let (acquired_on, note) = match parse_date(&text(fields, "acquired_on")) {
        Some(date) => (date, None),
        None => (
            today,
            Some(format!("no acquisition date for {code}, using today")),
        ),
    };

    let mut holding = UserDesignation::new(code, acquired_on);
    holding.birth_month = fields
        .get("birth_month")
        .and_then(Value::as_u64)
        .and_then(|month| u32::try_from(month).ok());
    holding.state = Some(text(fields, "state"))
        .filter(|state| !state.is_empty())
        .map(|state| state.to_ascii_uppercase());
    holding.credential_number =
        Some(text(fields, "credential_number")).filter(|number| !number.is_empty());

    Ok(ParsedDesignation { holding, note })
}

/// Field as trimmed text; numbers and booleans are rendered, anything else is empty.
fn text(fields: &Map<String, Value>, key: &str) -> String {
    match fields.get(key) {
        Some(Value::String(value)) => value.trim().to_string(),
        Some(Value::Number(value)) => value.to_string(),
        Some(Value::Bool(value)) => value.to_string(),
        _ => String::new(),
    }
}

/// Finite number from a JSON number or numeric string.
fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(fields)) => !fields.is_empty(),
        Some(Value::Null) | None => false,
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.date_naive())
}
