use std::sync::Arc;

use super::common::*;
use crate::compliance::{CeCategory, ComplianceEvaluator, DesignationCode, UserDesignation};
use crate::records::{
    Actor, RecordDraft, RecordId, RecordRepository, RecordService, RecordServiceError,
    RecordViolation, RepositoryError,
};

fn calendar_year_holding() -> Vec<UserDesignation> {
    vec![UserDesignation::new(DesignationCode::Cdfa, date(2019, 3, 1))]
}

#[test]
fn add_assigns_owner_and_classifies_category() {
    let (service, repository) = build_service();
    let actor = Actor::member(OWNER, TENANT);

    let mut entry = draft("  Professional ethics update ", 2.0, date(2024, 5, 1));
    entry.category = "Regulatory".to_string();
    let stored = service.add(&actor, entry).expect("record stored");

    assert_eq!(stored.owner, OWNER);
    assert_eq!(stored.tenant, TENANT);
    assert_eq!(stored.title, "Professional ethics update");
    assert_eq!(stored.category, CeCategory::Ethics);
    assert!(stored.id.0 > 0);

    let fetched = repository
        .fetch(stored.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(fetched, stored);
}

#[test]
fn add_rejects_incomplete_drafts() {
    let (service, _) = build_service();
    let actor = Actor::member(OWNER, TENANT);

    match service.add(&actor, draft(" ", 1.0, date(2024, 5, 1))) {
        Err(RecordServiceError::Validation(RecordViolation::MissingTitle)) => {}
        other => panic!("expected missing title, got {other:?}"),
    }

    match service.add(&actor, draft("Refund", -1.0, date(2024, 5, 1))) {
        Err(RecordServiceError::Validation(RecordViolation::NegativeHours(hours))) => {
            assert_eq!(hours, -1.0);
        }
        other => panic!("expected negative hours, got {other:?}"),
    }

    let undated = RecordDraft {
        completed_on: None,
        ..draft("Undated", 1.0, date(2024, 5, 1))
    };
    match service.add(&actor, undated) {
        Err(RecordServiceError::Validation(RecordViolation::MissingDate)) => {}
        other => panic!("expected missing date, got {other:?}"),
    }
}

#[test]
fn add_accepts_attendance_logged_with_zero_hours() {
    let (service, _) = build_service();
    let stored = service
        .add(&Actor::member(OWNER, TENANT), draft("Sponsor breakfast", 0.0, date(2024, 5, 1)))
        .expect("zero-hour record stored");
    assert_eq!(stored.hours, 0.0);
}

#[test]
fn add_rejects_duplicates_for_the_same_owner() {
    let (service, _) = build_service();
    let owner = Actor::member(OWNER, TENANT);

    service
        .add(&owner, draft("Tax update", 4.0, date(2024, 5, 1)))
        .expect("first insert");
    match service.add(&owner, draft("Tax update", 4.0, date(2024, 5, 1))) {
        Err(RecordServiceError::Duplicate { title }) => assert_eq!(title, "Tax update"),
        other => panic!("expected duplicate, got {other:?}"),
    }

    let colleague = Actor::member(OTHER_USER, TENANT);
    service
        .add(&colleague, draft("Tax update", 4.0, date(2024, 5, 1)))
        .expect("other owners may log the same course");
}

#[test]
fn concurrent_adds_of_one_course_store_it_once() {
    let (service, repository) = build_service();
    let owner = Actor::member(OWNER, TENANT);

    let outcomes: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| service.add(&owner, draft("Estate planning", 3.0, date(2024, 6, 1))))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread finished"))
            .collect()
    });

    let stored = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(stored, 1);
    for outcome in &outcomes {
        match outcome {
            Ok(_) | Err(RecordServiceError::Duplicate { .. }) => {}
            other => panic!("expected duplicate, got {other:?}"),
        }
    }
    assert_eq!(repository.list_for_owner(OWNER).expect("list").len(), 1);
}

#[test]
fn edit_respects_ownership_scope() {
    let (service, _) = build_service();
    let owner = Actor::member(OWNER, TENANT);
    let stored = service
        .add(&owner, draft("Retirement", 3.0, date(2024, 5, 1)))
        .expect("record stored");

    let stranger = Actor::member(OTHER_USER, TENANT);
    match service.edit(&stranger, stored.id, draft("Mine now", 3.0, date(2024, 5, 1)), &[], date(2024, 6, 1)) {
        Err(RecordServiceError::Forbidden) => {}
        other => panic!("expected forbidden, got {other:?}"),
    }

    let outside_admin = Actor::org_admin(OTHER_USER, OTHER_TENANT);
    assert!(matches!(
        service.delete(&outside_admin, stored.id, &[], date(2024, 6, 1)),
        Err(RecordServiceError::Forbidden)
    ));

    let admin = Actor::org_admin(OTHER_USER, TENANT);
    let edited = service
        .edit(&admin, stored.id, draft("Retirement income", 3.5, date(2024, 5, 2)), &[], date(2024, 6, 1))
        .expect("admin edits in tenant");
    assert_eq!(edited.owner, OWNER);
    assert_eq!(edited.title, "Retirement income");
}

#[test]
fn records_in_closed_cycles_are_locked() {
    let (service, repository) = build_service();
    let owner = Actor::member(OWNER, TENANT);
    let holdings = calendar_year_holding();
    let old = service
        .add(&owner, draft("Last year", 5.0, date(2023, 5, 1)))
        .expect("record stored");

    match service.edit(&owner, old.id, draft("Renamed", 5.0, date(2023, 5, 1)), &holdings, date(2024, 2, 1)) {
        Err(RecordServiceError::CycleClosed { designation, cycle }) => {
            assert_eq!(designation, DesignationCode::Cdfa);
            assert_eq!(cycle.end, date(2024, 1, 1));
        }
        other => panic!("expected closed cycle, got {other:?}"),
    }

    match service.delete(&owner, old.id, &holdings, date(2024, 2, 1)) {
        Err(RecordServiceError::CycleClosed { .. }) => {}
        other => panic!("expected closed cycle, got {other:?}"),
    }
    assert!(repository.fetch(old.id).expect("fetch").is_some());

    let current = service
        .add(&owner, draft("This year", 5.0, date(2024, 1, 10)))
        .expect("record stored");
    match service.edit(&owner, current.id, draft("Backdated", 5.0, date(2023, 12, 1)), &holdings, date(2024, 2, 1)) {
        Err(RecordServiceError::CycleClosed { .. }) => {}
        other => panic!("expected closed cycle for the new date, got {other:?}"),
    }

    service
        .edit(&owner, current.id, draft("Still this year", 5.0, date(2024, 1, 20)), &holdings, date(2024, 2, 1))
        .expect("open cycle edits succeed");
    service
        .delete(&owner, old.id, &[], date(2024, 2, 1))
        .expect("without holdings nothing is locked");
}

#[test]
fn delete_reports_missing_records() {
    let (service, _) = build_service();
    let owner = Actor::member(OWNER, TENANT);

    match service.delete(&owner, RecordId(999_999), &[], date(2024, 2, 1)) {
        Err(RecordServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn list_returns_newest_first_and_filters_by_category() {
    let (service, _) = build_service();
    let owner = Actor::member(OWNER, TENANT);
    service
        .add(&owner, draft("Older", 1.0, date(2023, 1, 1)))
        .expect("stored");
    service
        .add(&owner, draft("Newest", 1.0, date(2024, 9, 1)))
        .expect("stored");
    let mut tax = draft("Middle", 2.0, date(2024, 2, 1));
    tax.category = "Taxation".to_string();
    service.add(&owner, tax).expect("stored");

    let titles: Vec<String> = service
        .list(&owner, OWNER, None)
        .expect("list")
        .into_iter()
        .map(|record| record.title)
        .collect();
    assert_eq!(titles, vec!["Newest", "Middle", "Older"]);

    let taxes = service
        .list(&owner, OWNER, Some(CeCategory::Tax))
        .expect("list");
    assert_eq!(taxes.len(), 1);
    assert_eq!(taxes[0].title, "Middle");

    match service.list(&Actor::member(OTHER_USER, TENANT), OWNER, None) {
        Err(RecordServiceError::Forbidden) => {}
        other => panic!("expected forbidden, got {other:?}"),
    }

    let outside_admin = Actor::org_admin(OTHER_USER, OTHER_TENANT);
    assert!(service
        .list(&outside_admin, OWNER, None)
        .expect("list")
        .is_empty());
}

#[test]
fn repository_failures_propagate() {
    let service = RecordService::new(
        Arc::new(UnavailableRepository),
        Arc::new(ComplianceEvaluator::default()),
    );
    match service.add(&Actor::member(OWNER, TENANT), draft("Offline", 1.0, date(2024, 1, 2))) {
        Err(RecordServiceError::Repository(RepositoryError::Unavailable(reason))) => {
            assert_eq!(reason, "database offline");
        }
        other => panic!("expected unavailable repository, got {other:?}"),
    }
}

#[test]
fn import_backup_stores_records_for_the_actor() {
    let (service, repository) = build_service();
    let owner = Actor::member(OWNER, TENANT);
    service
        .add(&owner, draft("Already here", 2.0, date(2024, 3, 1)))
        .expect("stored");

    let backup = r#"{
        "ce_records": [
            { "title": "Already here", "hours": 2.0, "date_completed": "2024-03-01" },
            { "title": "Fresh", "hours": "1.5", "date_completed": "2024-04-01", "provider": "NAPFA", "is_napfa_approved": true }
        ]
    }"#;

    let outcome = service
        .import_backup(&owner, backup.as_bytes(), date(2025, 1, 1))
        .expect("import succeeds");

    assert_eq!(outcome.imported, 1);
    assert_eq!(outcome.skipped, 1);
    assert_eq!(outcome.records[0].owner, OWNER);
    assert!(outcome.records[0].sponsor_approved);
    assert_eq!(repository.list_for_owner(OWNER).expect("list").len(), 2);
}

#[test]
fn failed_import_leaves_no_partial_records() {
    let repository = Arc::new(FlakyRepository::failing_on(2));
    let service = RecordService::new(repository.clone(), Arc::new(ComplianceEvaluator::default()));
    let owner = Actor::member(OWNER, TENANT);

    let backup = r#"{
        "ce_records": [
            { "title": "Retirement income", "hours": 2.0, "date_completed": "2024-02-01" },
            { "title": "Social security", "hours": 1.0, "date_completed": "2024-03-01" },
            { "title": "Medicare", "hours": 1.5, "date_completed": "2024-04-01" }
        ]
    }"#;

    match service.import_backup(&owner, backup.as_bytes(), date(2025, 1, 1)) {
        Err(RecordServiceError::Repository(RepositoryError::Unavailable(reason))) => {
            assert_eq!(reason, "write timed out");
        }
        other => panic!("expected unavailable repository, got {other:?}"),
    }
    assert!(repository.inner.list_for_owner(OWNER).expect("list").is_empty());
}
