use chrono::{TimeZone, Utc};

use super::common::*;
use crate::compliance::{CeCategory, DesignationCode, UserDesignation};
use crate::records::{export, BackupImporter, BackupUser, CeRecord, ImportError};

fn importer() -> BackupImporter {
    BackupImporter::new(OWNER, TENANT)
}

#[test]
fn exported_backup_restores_into_an_empty_account() {
    let user = BackupUser {
        username: "jordan".to_string(),
        email: "jordan@example.com".to_string(),
        is_napfa_member: true,
        napfa_join_date: Some(date(2024, 7, 15)),
    };
    let holdings = vec![UserDesignation::new(DesignationCode::Cfp, date(2019, 4, 2)).with_birth_month(4)];
    let records = vec![
        CeRecord::new("Ethics", CeCategory::Ethics, 2.0, date(2024, 2, 1))
            .with_provider("CFP Board")
            .ethics_course(),
        CeRecord::new("Estate basics", CeCategory::EstatePlanning, 3.0, date(2024, 8, 1))
            .sponsor_approved(),
    ];
    let exported_at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).single().expect("timestamp");

    let document = export(&user, &holdings, &records, exported_at);
    assert_eq!(document.ce_records[0].title, "Estate basics");
    assert!(document.ce_records[1].is_ethics_course);

    let json = document.to_json_pretty().expect("serializes");
    let outcome = importer()
        .import(json.as_bytes(), date(2025, 1, 2), &[])
        .expect("import succeeds");

    assert_eq!(outcome.imported, 2);
    assert_eq!(outcome.skipped, 0);
    assert!(outcome.notes.is_empty());
    assert_eq!(outcome.user, Some(user));
    assert_eq!(outcome.records[0].category, CeCategory::EstatePlanning);
    assert!(outcome.records[0].sponsor_approved);
    assert_eq!(outcome.records[1].provider, "CFP Board");
    assert_eq!(outcome.designations.len(), 2);
    assert_eq!(outcome.designations[0].birth_month, Some(4));
    assert_eq!(outcome.designations[1].code, DesignationCode::Napfa);
    assert_eq!(outcome.designations[1].acquired_on, date(2024, 7, 15));
}

#[test]
fn malformed_entries_are_skipped_with_notes() {
    let backup = r#"{
        "ce_records": [
            42,
            { "title": "", "hours": 1 },
            { "title": "Negative", "hours": -2 },
            { "title": "Undated", "hours": 1 },
            { "title": "Repeat", "hours": 1, "date_completed": "2024-05-05" },
            { "title": "Repeat", "hours": 1, "date_completed": "2024-05-05" }
        ]
    }"#;

    let outcome = importer()
        .import(backup.as_bytes(), date(2025, 6, 1), &[])
        .expect("import succeeds");

    assert_eq!(outcome.imported, 2);
    assert_eq!(outcome.skipped, 4);
    assert_eq!(
        outcome.notes,
        vec![
            "Record 1: not a valid object".to_string(),
            "Record 2: missing title".to_string(),
            "Record 3: hours must be positive (\"Negative\")".to_string(),
            "Record 4: missing date for \"Undated\", using today".to_string(),
        ]
    );
    assert_eq!(outcome.records[0].completed_on, Some(date(2025, 6, 1)));
    assert_eq!(outcome.summary(), "Restored 2 CE records. 4 skipped (duplicates or errors).");
}

#[test]
fn duplicates_of_existing_records_are_skipped_silently() {
    let existing = vec![
        CeRecord::new("Kept", CeCategory::Tax, 2.0, date(2024, 1, 9)).owned_by(OWNER, TENANT),
    ];
    let backup = r#"{ "ce_records": [ { "title": "Kept", "hours": 2, "date_completed": "2024-01-09", "category": "Tax" } ] }"#;

    let outcome = importer()
        .import(backup.as_bytes(), date(2025, 1, 1), &existing)
        .expect("import succeeds");
    assert_eq!(outcome.imported, 0);
    assert_eq!(outcome.skipped, 1);
    assert!(outcome.notes.is_empty());
}

#[test]
fn display_notes_are_capped_at_ten() {
    let entries: Vec<String> = (0..13).map(|_| "null".to_string()).collect();
    let backup = format!("{{ \"ce_records\": [{}] }}", entries.join(","));

    let outcome = importer()
        .import(backup.as_bytes(), date(2025, 1, 1), &[])
        .expect("import succeeds");
    let (shown, hidden) = outcome.display_notes();
    assert_eq!(shown.len(), 10);
    assert_eq!(hidden, 3);
}

#[test]
fn documents_without_a_record_array_are_rejected() {
    match importer().import(r#"{ "user": {} }"#.as_bytes(), date(2025, 1, 1), &[]) {
        Err(ImportError::MissingRecords) => {}
        other => panic!("expected missing records, got {other:?}"),
    }

    match importer().import(r#"{ "ce_records": {} }"#.as_bytes(), date(2025, 1, 1), &[]) {
        Err(err @ ImportError::RecordsNotArray) => {
            assert_eq!(err.to_string(), "invalid backup file: \"ce_records\" must be an array");
            assert!(std::error::Error::source(&err).is_none());
        }
        other => panic!("expected records array error, got {other:?}"),
    }

    match importer().import("not json".as_bytes(), date(2025, 1, 1), &[]) {
        Err(err @ ImportError::Json(_)) => {
            assert!(err.to_string().starts_with("backup is not valid JSON: "));
            assert!(std::error::Error::source(&err).is_some());
        }
        other => panic!("expected json error, got {other:?}"),
    }
}

#[test]
fn from_path_propagates_io_errors() {
    match importer().from_path("./does-not-exist.json", date(2025, 1, 1), &[]) {
        Err(ImportError::Io(_)) => {}
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn ethics_course_flag_survives_export_and_import() {
    let user = BackupUser {
        username: "sam".to_string(),
        email: "sam@example.com".to_string(),
        is_napfa_member: false,
        napfa_join_date: None,
    };
    let records = vec![
        CeRecord::new("Tax practitioner conduct", CeCategory::Tax, 2.0, date(2024, 5, 1)).ethics_course(),
    ];
    let exported_at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).single().expect("timestamp");

    let json = export(&user, &[], &records, exported_at)
        .to_json_pretty()
        .expect("serializes");
    let outcome = importer()
        .import(json.as_bytes(), date(2025, 1, 2), &[])
        .expect("import succeeds");

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].category, CeCategory::Tax);
    assert!(outcome.records[0].ethics_course);
}
