use chrono::NaiveDate;
use proptest::prelude::*;

use crate::compliance::{
    CeCategory, CycleAnchor, DesignationCode, DesignationProfile, ProfileCatalog, SubRequirement,
};
use crate::records::CeRecord;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn record(title: &str, category: CeCategory, hours: f64, on: NaiveDate) -> CeRecord {
    CeRecord::new(title, category, hours, on)
}

/// Holder-anchored profile with a flat total and no sub-requirements.
pub(super) fn holder_profile(cycle_months: i32, total_hours: f64) -> DesignationProfile {
    DesignationProfile::new(
        DesignationCode::Cep,
        "Certified Equity Professional",
        "CEPI",
        cycle_months,
        CycleAnchor::Holder,
        total_hours,
    )
}

pub(super) fn ethics_profile(total_hours: f64, ethics_hours: f64) -> DesignationProfile {
    holder_profile(24, total_hours)
        .with_sub_requirement(SubRequirement::category_hours(CeCategory::Ethics, ethics_hours))
}

pub(super) fn standard(code: DesignationCode) -> DesignationProfile {
    ProfileCatalog::standard()
        .get(code)
        .cloned()
        .expect("standard profile present")
}

/// The three records used by the biennial walkthrough.
pub(super) fn biennial_records() -> Vec<CeRecord> {
    vec![
        record("Retirement income update", CeCategory::Retirement, 10.0, date(2024, 6, 1)),
        record("Tax law changes", CeCategory::Tax, 15.0, date(2025, 1, 1)),
        record("Portfolio construction", CeCategory::Investments, 10.0, date(2026, 2, 1)),
    ]
}

/// Records spread over 2020-2026 with hours in tenths, so sums carry rounding error.
pub(super) fn record_strategy() -> impl Strategy<Value = CeRecord> {
    (
        0..CeCategory::ordered().len(),
        0u32..120,
        0i64..2_500,
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(category, tenths, offset, approved, ethics)| {
            let mut generated = record(
                "generated course",
                CeCategory::ordered()[category],
                f64::from(tenths) * 0.1,
                date(2020, 1, 1) + chrono::Duration::days(offset),
            );
            generated.sponsor_approved = approved;
            generated.ethics_course = ethics;
            generated
        })
}

pub(super) fn records_strategy(max_len: usize) -> impl Strategy<Value = Vec<CeRecord>> {
    proptest::collection::vec(record_strategy(), 0..max_len)
}
