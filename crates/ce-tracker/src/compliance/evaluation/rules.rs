use super::super::domain::{CeCategory, ComplianceCycle};
use super::super::profile::RequirementBucket;
use super::{EvaluationError, RecordDefect};
use crate::records::CeRecord;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

/// Hours earned inside one cycle window.
#[derive(Debug, Default)]
pub(crate) struct Tally {
    pub total: f64,
    pub records: usize,
    pub by_category: BTreeMap<CeCategory, f64>,
    pub courses_by_category: BTreeMap<CeCategory, usize>,
    pub sponsor_approved: f64,
    pub sponsor_approved_courses: usize,
    pub ethics_course_hours: f64,
    pub ethics_courses: usize,
    pub by_year: BTreeMap<i32, f64>,
}

impl Tally {
    pub fn hours_for(&self, bucket: RequirementBucket) -> f64 {
        match bucket {
            RequirementBucket::Category { category } => {
                self.by_category.get(&category).copied().unwrap_or(0.0)
            }
            RequirementBucket::SponsorApproved => self.sponsor_approved,
            RequirementBucket::EthicsCourse => self.ethics_course_hours,
        }
    }

    pub fn courses_for(&self, bucket: RequirementBucket) -> usize {
        match bucket {
            RequirementBucket::Category { category } => {
                self.courses_by_category.get(&category).copied().unwrap_or(0)
            }
            RequirementBucket::SponsorApproved => self.sponsor_approved_courses,
            RequirementBucket::EthicsCourse => self.ethics_courses,
        }
    }

    pub fn hours_in_year(&self, year: i32) -> f64 {
        self.by_year.get(&year).copied().unwrap_or(0.0)
    }
}

/// Reject the whole input if any record is malformed, pairing each record
/// with its completion date otherwise.
pub(crate) fn dated_records(
    records: &[CeRecord],
) -> Result<Vec<(NaiveDate, &CeRecord)>, EvaluationError> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            if !record.hours.is_finite() || record.hours < 0.0 {
                return Err(EvaluationError::InvalidRecord {
                    index,
                    title: record.title.clone(),
                    defect: RecordDefect::InvalidHours(record.hours),
                });
            }

            match record.completed_on {
                Some(date) => Ok((date, record)),
                None => Err(EvaluationError::InvalidRecord {
                    index,
                    title: record.title.clone(),
                    defect: RecordDefect::MissingDate,
                }),
            }
        })
        .collect()
}

pub(crate) fn tally(records: &[(NaiveDate, &CeRecord)], cycle: &ComplianceCycle) -> Tally {
    let mut tally = Tally::default();

    for (date, record) in records.iter().filter(|(date, _)| cycle.contains(*date)) {
        tally.total += record.hours;
        tally.records += 1;
        *tally.by_category.entry(record.category).or_insert(0.0) += record.hours;
        *tally.courses_by_category.entry(record.category).or_insert(0) += 1;
        *tally.by_year.entry(date.year()).or_insert(0.0) += record.hours;

        if record.sponsor_approved {
            tally.sponsor_approved += record.hours;
            tally.sponsor_approved_courses += 1;
        }
        if record.ethics_course {
            tally.ethics_course_hours += record.hours;
            tally.ethics_courses += 1;
        }
    }

    tally
}
