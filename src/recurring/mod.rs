//! Occurrence counting for recurring templates.
//!
//! Daily and weekly series are counted arithmetically. Monthly and yearly
//! series step through the calendar from a fast-forwarded position, with every
//! date derived from the anchor so month-end anchors never drift.

pub mod calendar;

use chrono::NaiveDate;
use tracing::warn;

use crate::domain::{Period, Transaction};

pub use calendar::{nth_occurrence, shift_months};

/// Upper bound on calendar steps evaluated for a single query (100 years of months).
pub const MAX_CALENDAR_STEPS: u64 = 1200;

/// Number of occurrences of `template` inside `[window_start, window_end]`.
///
/// Records without a cadence count once when their own date is in the window.
/// A missing date yields zero.
pub fn occurrences(
    template: &Transaction,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> u32 {
    let Some(anchor) = template.date else {
        return 0;
    };
    match template.cadence() {
        Some(period) => count_series(anchor, period, window_start, window_end),
        None => u32::from(anchor >= window_start && anchor <= window_end),
    }
}

/// Counts occurrences of the series `(anchor, period)` inside the inclusive window.
pub fn count_series(
    anchor: NaiveDate,
    period: Period,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> u32 {
    if anchor > window_end {
        return 0;
    }
    let effective = anchor.max(window_start);
    if effective > window_end {
        return 0;
    }

    if let Some(days) = period.linear_days() {
        return count_linear(anchor, period, effective, window_end, days);
    }
    if period.calendar_months().is_some() {
        return count_calendar(anchor, period, effective, window_end);
    }
    u32::from(effective == anchor)
}

fn count_linear(
    anchor: NaiveDate,
    period: Period,
    effective: NaiveDate,
    end: NaiveDate,
    days: i64,
) -> u32 {
    let first = calendar::first_step(anchor, period, effective) as i64;
    let first_offset = first * days;
    let end_offset = (end - anchor).num_days();
    if first_offset > end_offset {
        return 0;
    }
    let count = (end_offset - first_offset) / days + 1;
    u32::try_from(count).unwrap_or(u32::MAX)
}

fn count_calendar(
    anchor: NaiveDate,
    period: Period,
    effective: NaiveDate,
    end: NaiveDate,
) -> u32 {
    let mut step = calendar::first_step(anchor, period, effective);
    let mut count = 0u32;
    for _ in 0..MAX_CALENDAR_STEPS {
        let Some(date) = nth_occurrence(anchor, period, step) else {
            return count;
        };
        if date > end {
            return count;
        }
        if date >= effective {
            count += 1;
        }
        step += 1;
    }
    if nth_occurrence(anchor, period, step).is_some_and(|date| date <= end) {
        warn!(
            %anchor,
            %period,
            %end,
            counted = count,
            "occurrence stepping hit the iteration cap; returning partial count"
        );
    }
    count
}

/// Concrete occurrence dates of `template` inside the window, oldest first.
///
/// Evaluates at most [`MAX_CALENDAR_STEPS`] candidate dates.
pub fn occurrence_dates(
    template: &Transaction,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Vec<NaiveDate> {
    let Some(anchor) = template.date else {
        return Vec::new();
    };
    let Some(period) = template.cadence() else {
        return if anchor >= window_start && anchor <= window_end {
            vec![anchor]
        } else {
            Vec::new()
        };
    };
    if anchor > window_end {
        return Vec::new();
    }
    let effective = anchor.max(window_start);
    let first = calendar::first_step(anchor, period, effective);
    (first..first + MAX_CALENDAR_STEPS)
        .map_while(|step| nth_occurrence(anchor, period, step))
        .take_while(|date| *date <= window_end)
        .filter(|date| *date >= effective)
        .collect()
}

/// First occurrence of `template` on or after `from`.
pub fn next_occurrence(template: &Transaction, from: NaiveDate) -> Option<NaiveDate> {
    let anchor = template.date?;
    let Some(period) = template.cadence() else {
        return (anchor >= from).then_some(anchor);
    };
    let effective = anchor.max(from);
    let first = calendar::first_step(anchor, period, effective);
    (first..first + 3)
        .map_while(|step| nth_occurrence(anchor, period, step))
        .find(|date| *date >= effective)
}
