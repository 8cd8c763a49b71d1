use super::super::domain::ComplianceCycle;
use super::super::profile::CycleAnchor;
use chrono::{Datelike, Months, NaiveDate};

/// Cycle containing `as_of` for a profile anchored by `anchor`.
///
/// `None` only when the window falls outside the representable date range.
pub(crate) fn active_cycle(
    anchor: CycleAnchor,
    cycle_months: i32,
    anchor_date: NaiveDate,
    as_of: NaiveDate,
) -> Option<ComplianceCycle> {
    let origin = match anchor {
        CycleAnchor::Holder => anchor_date,
        CycleAnchor::BirthMonth => anchor_date.with_day(1)?,
        CycleAnchor::SharedEpoch { year } => NaiveDate::from_ymd_opt(year, 1, 1)?,
    };

    cycle_containing(origin, cycle_months, as_of)
}

/// Window `[origin + k*len, origin + (k+1)*len)` holding `date`.
///
/// Every boundary is computed from `origin` directly so month-end clamping
/// never accumulates across cycles.
pub(crate) fn cycle_containing(
    origin: NaiveDate,
    cycle_months: i32,
    date: NaiveDate,
) -> Option<ComplianceCycle> {
    let length = i64::from(cycle_months);
    if length <= 0 {
        return None;
    }

    let mut index = months_between(origin, date).div_euclid(length);
    loop {
        let start = shift_months(origin, index * length)?;
        if start > date {
            index -= 1;
            continue;
        }

        let end = shift_months(origin, (index + 1) * length)?;
        if end <= date {
            index += 1;
            continue;
        }

        return Some(ComplianceCycle { start, end });
    }
}

/// Whole calendar months from `from` to `to`, ignoring the day of month.
pub(crate) fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    let years = i64::from(to.year()) - i64::from(from.year());
    let months = i64::from(to.month()) - i64::from(from.month());
    years * 12 + months
}

/// Move `date` by `months`, clamping the day to the end of shorter months.
pub(crate) fn shift_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        date.checked_add_months(magnitude)
    } else {
        date.checked_sub_months(magnitude)
    }
}
