use std::sync::Arc;
use std::thread;

use ce_tracker::compliance::{
    ComplianceEvaluator, DashboardEntry, DesignationCode, ProfileCatalog, RequirementBucket,
};
use ce_tracker::records::{BackupImporter, ImportOutcome, TenantId, UserId};
use chrono::NaiveDate;

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid as-of date")
}

fn sample_import() -> ImportOutcome {
    let data = include_bytes!("fixtures/sample_backup.json");
    BackupImporter::new(UserId(1), TenantId(1))
        .import(&data[..], as_of(), &[])
        .expect("sample backup imports")
}

fn report_for(entries: &[DashboardEntry], code: DesignationCode) -> &ce_tracker::compliance::ComplianceReport {
    entries
        .iter()
        .find(|entry| entry.designation() == code)
        .and_then(DashboardEntry::report)
        .expect("designation evaluated")
}

#[test]
fn sample_backup_imports_with_notes_for_bad_rows() {
    let outcome = sample_import();
    assert_eq!(outcome.imported, 9);
    assert_eq!(outcome.skipped, 2);
    assert_eq!(outcome.notes, vec!["Record 10: missing title".to_string()]);

    let codes: Vec<DesignationCode> = outcome.designations.iter().map(|held| held.code).collect();
    assert_eq!(
        codes,
        vec![
            DesignationCode::Cfp,
            DesignationCode::Cpa,
            DesignationCode::Ea,
            DesignationCode::Cle,
            DesignationCode::Napfa,
        ]
    );
}

#[test]
fn dashboard_evaluates_every_holding_independently() {
    let outcome = sample_import();
    let evaluator = ComplianceEvaluator::new(ProfileCatalog::standard());
    let entries = evaluator.dashboard(&outcome.records, &outcome.designations, as_of());
    assert_eq!(entries.len(), 5);

    let cfp = report_for(&entries, DesignationCode::Cfp);
    assert_eq!(cfp.cycle.start, NaiveDate::from_ymd_opt(2024, 9, 1).expect("date"));
    assert_eq!(cfp.total_earned, 37.5);
    assert_eq!(cfp.requirements[0].earned_hours, 3.0);
    assert!(cfp.compliant);

    let cpa = report_for(&entries, DesignationCode::Cpa);
    assert_eq!(cpa.total_required, 80.0);
    assert_eq!(cpa.total_earned, 40.5);
    assert!(!cpa.requirements[0].satisfied);
    assert!(!cpa.compliant);

    let ea = report_for(&entries, DesignationCode::Ea);
    assert_eq!(ea.total_earned, 29.5);
    assert_eq!(ea.annual_progress.len(), 1);
    assert!(ea.annual_progress[0].satisfied);
    assert!(!ea.compliant);

    let cle = report_for(&entries, DesignationCode::Cle);
    assert_eq!(cle.cycle.end, NaiveDate::from_ymd_opt(2025, 10, 4).expect("date"));
    assert_eq!(cle.total_earned, 52.0);
    assert_eq!(cle.total_required, 24.0);

    let napfa = report_for(&entries, DesignationCode::Napfa);
    assert_eq!(napfa.total_required, 45.0);
    let approved = napfa
        .requirements
        .iter()
        .find(|progress| progress.bucket == RequirementBucket::SponsorApproved)
        .expect("sponsor requirement");
    assert_eq!(approved.earned_hours, 15.0);
    assert!(!approved.satisfied);
    let ethics_course = napfa
        .requirements
        .iter()
        .find(|progress| progress.bucket == RequirementBucket::EthicsCourse)
        .expect("ethics course requirement");
    assert_eq!(ethics_course.courses, 1);
    assert!(ethics_course.satisfied);
    assert!(napfa.summary().prorated);
}

#[test]
fn shared_catalog_evaluates_consistently_across_threads() {
    let outcome = Arc::new(sample_import());
    let evaluator = Arc::new(ComplianceEvaluator::default());
    let expected = evaluator.dashboard(&outcome.records, &outcome.designations, as_of());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let outcome = Arc::clone(&outcome);
            let evaluator = Arc::clone(&evaluator);
            thread::spawn(move || evaluator.dashboard(&outcome.records, &outcome.designations, as_of()))
        })
        .collect();

    for handle in handles {
        let entries = handle.join().expect("thread completes");
        let reports: Vec<_> = entries.iter().filter_map(DashboardEntry::report).collect();
        let baseline: Vec<_> = expected.iter().filter_map(DashboardEntry::report).collect();
        assert_eq!(reports, baseline);
    }
}
