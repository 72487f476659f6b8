use chrono::{Datelike, Months, NaiveDate};

use crate::errors::{ProjectionError, ProjectionResult};

/// Inclusive calendar window used by every aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> ProjectionResult<Self> {
        if end < start {
            return Err(ProjectionError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Whole calendar month containing `date`.
    pub fn month_of(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(date);
        Self { start, end }
    }

    /// Whole calendar year containing `date`.
    pub fn year_of(date: NaiveDate) -> Self {
        let start = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
        let end = NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date);
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Narrows the window to start no earlier than `from`; `None` when nothing remains.
    pub fn clip_start(&self, from: NaiveDate) -> Option<Self> {
        let start = self.start.max(from);
        if start > self.end {
            None
        } else {
            Some(Self {
                start,
                end: self.end,
            })
        }
    }
}
