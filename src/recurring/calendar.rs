use chrono::{Datelike, Days, NaiveDate};

use crate::domain::Period;

/// Months elapsed since year 0, used to compare calendar positions.
pub fn month_index(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}

/// Moves `anchor` by `months`, clamping the day to the target month's last day.
///
/// Always applied to the series anchor, so a short month never shortens later steps.
pub fn shift_months(anchor: NaiveDate, months: i64) -> Option<NaiveDate> {
    let target = month_index(anchor).checked_add(months)?;
    let year = i32::try_from(target.div_euclid(12)).ok()?;
    let month = target.rem_euclid(12) as u32 + 1;
    let day = anchor.day().min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?
        .pred_opt()
        .map(|last| last.day())
}

/// Date of the `step`-th occurrence (zero based) of a series anchored at `anchor`.
pub fn nth_occurrence(anchor: NaiveDate, period: Period, step: u64) -> Option<NaiveDate> {
    if let Some(days) = period.linear_days() {
        let offset = step.checked_mul(days as u64)?;
        return anchor.checked_add_days(Days::new(offset));
    }
    if let Some(months) = period.calendar_months() {
        let offset = i64::try_from(step).ok()?.checked_mul(months as i64)?;
        return shift_months(anchor, offset);
    }
    (step == 0).then_some(anchor)
}

/// First step worth evaluating for occurrences on or after `effective`.
///
/// Linear periods land exactly on the first occurrence. Calendar periods skip
/// the whole periods between the anchor and `effective`, minus one, and leave
/// the rest to stepping.
pub fn first_step(anchor: NaiveDate, period: Period, effective: NaiveDate) -> u64 {
    if effective <= anchor {
        return 0;
    }
    if let Some(days) = period.linear_days() {
        let offset = (effective - anchor).num_days();
        return ((offset + days - 1) / days) as u64;
    }
    if let Some(months) = period.calendar_months() {
        let gap = month_index(effective) - month_index(anchor);
        let whole = gap / months as i64;
        return (whole - 1).max(0) as u64;
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn shift_clamps_to_month_end() {
        let anchor = date(2025, 1, 31);
        assert_eq!(shift_months(anchor, 1), Some(date(2025, 2, 28)));
        assert_eq!(shift_months(anchor, 2), Some(date(2025, 3, 31)));
        assert_eq!(shift_months(anchor, 3), Some(date(2025, 4, 30)));
        assert_eq!(shift_months(anchor, 13), Some(date(2026, 2, 28)));
        assert_eq!(shift_months(date(2024, 1, 31), 1), Some(date(2024, 2, 29)));
    }

    #[test]
    fn shift_handles_negative_offsets() {
        assert_eq!(shift_months(date(2025, 3, 31), -1), Some(date(2025, 2, 28)));
        assert_eq!(shift_months(date(2025, 1, 15), -13), Some(date(2023, 12, 15)));
    }

    #[test]
    fn days_in_month_matches_calendar() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2100, 2), Some(28));
        assert_eq!(days_in_month(2025, 12), Some(31));
        assert_eq!(days_in_month(2025, 4), Some(30));
    }

    #[test]
    fn leap_day_anchor_recovers_in_leap_years() {
        let anchor = date(2024, 2, 29);
        assert_eq!(nth_occurrence(anchor, Period::Yearly, 1), Some(date(2025, 2, 28)));
        assert_eq!(nth_occurrence(anchor, Period::Yearly, 4), Some(date(2028, 2, 29)));
    }

    #[test]
    fn first_step_never_overshoots() {
        let anchor = date(2000, 1, 31);
        let effective = date(2030, 6, 15);
        let step = first_step(anchor, Period::Monthly, effective);
        let landed = nth_occurrence(anchor, Period::Monthly, step).unwrap();
        assert!(landed < effective);
        let next = nth_occurrence(anchor, Period::Monthly, step + 2).unwrap();
        assert!(next >= effective);
    }

    #[test]
    fn linear_first_step_lands_on_first_occurrence() {
        let anchor = date(2025, 1, 1);
        assert_eq!(first_step(anchor, Period::Weekly, date(2025, 1, 9)), 2);
        assert_eq!(first_step(anchor, Period::Weekly, date(2025, 1, 8)), 1);
        assert_eq!(first_step(anchor, Period::Daily, date(2025, 1, 8)), 7);
    }
}
