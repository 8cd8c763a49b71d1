use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use super::domain::CeRecord;

const TRAILING_MONTHS: u32 = 12;
const TOP_PROVIDERS: usize = 10;
const UNKNOWN_PROVIDER: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderHours {
    pub provider: String,
    pub hours: f64,
}

/// Aggregate view of a user's CE history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CeAnalytics {
    pub total_hours: f64,
    pub total_records: usize,
    pub average_hours: f64,
    /// Keyed by category label.
    pub hours_by_category: BTreeMap<String, f64>,
    /// Trailing calendar months keyed `YYYY-MM`, zero-filled.
    pub monthly_hours: BTreeMap<String, f64>,
    pub yearly_hours: BTreeMap<i32, f64>,
    pub top_providers: Vec<ProviderHours>,
}

impl CeAnalytics {
    pub fn categories_count(&self) -> usize {
        self.hours_by_category.len()
    }
}

pub fn summarize(records: &[CeRecord], today: NaiveDate) -> CeAnalytics {
    let total_hours: f64 = records.iter().map(|record| record.hours).sum();
    let total_records = records.len();
    let average_hours = if total_records == 0 {
        0.0
    } else {
        total_hours / total_records as f64
    };

    let mut hours_by_category = BTreeMap::new();
    let mut yearly_hours = BTreeMap::new();
    let mut providers: BTreeMap<String, f64> = BTreeMap::new();
    let mut monthly_hours: BTreeMap<String, f64> = trailing_months(today)
        .into_iter()
        .map(|key| (key, 0.0))
        .collect();

    for record in records {
        *hours_by_category
            .entry(record.category.label().to_string())
            .or_insert(0.0) += record.hours;

        let provider = match record.provider.trim() {
            "" => UNKNOWN_PROVIDER,
            name => name,
        };
        *providers.entry(provider.to_string()).or_insert(0.0) += record.hours;

        if let Some(date) = record.completed_on {
            *yearly_hours.entry(date.year()).or_insert(0.0) += record.hours;
            if let Some(hours) = monthly_hours.get_mut(&month_key(date)) {
                *hours += record.hours;
            }
        }
    }

    let mut top_providers: Vec<ProviderHours> = providers
        .into_iter()
        .map(|(provider, hours)| ProviderHours { provider, hours })
        .collect();
    top_providers.sort_by(|a, b| {
        b.hours
            .total_cmp(&a.hours)
            .then_with(|| a.provider.cmp(&b.provider))
    });
    top_providers.truncate(TOP_PROVIDERS);

    CeAnalytics {
        total_hours,
        total_records,
        average_hours,
        hours_by_category,
        monthly_hours,
        yearly_hours,
        top_providers,
    }
}

fn trailing_months(today: NaiveDate) -> Vec<String> {
    let Some(current) = today.with_day(1) else {
        return Vec::new();
    };

    (0..TRAILING_MONTHS)
        .rev()
        .filter_map(|back| current.checked_sub_months(Months::new(back)))
        .map(month_key)
        .collect()
}

fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}
