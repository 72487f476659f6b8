use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::domain::{DateWindow, TransactionKind};
use crate::recurring::{occurrences, shift_months};

use super::{projection_window, realized_balance, AnalysisInput, FlowTotals, MAX_HORIZON_YEARS};

/// Income and expense for one calendar month of the trailing series.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct MonthlyFlow {
    pub year: i32,
    /// Calendar month, 1 through 12.
    pub month: u32,
    pub income: f64,
    pub expense: f64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "granularity", rename_all = "snake_case")]
pub enum ProjectionPeriod {
    Month { year: i32, month: u32 },
    Year { year: i32 },
}

/// One step of the forward projection with the balance carried to its end.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ProjectionPoint {
    pub period: ProjectionPeriod,
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

/// Flows inside a window. Standalone records count when dated inside
/// `standalone`, templates by their occurrences inside `templates`.
fn flow_in(
    input: &AnalysisInput<'_>,
    standalone: Option<DateWindow>,
    templates: Option<DateWindow>,
) -> FlowTotals {
    let mut totals = FlowTotals::default();
    for txn in input.transactions {
        let count = match txn.kind {
            TransactionKind::Standalone => match (standalone, txn.date) {
                (Some(window), Some(date)) => u32::from(window.contains(date)),
                _ => 0,
            },
            TransactionKind::Template => match templates {
                Some(window) => occurrences(txn, window.start, window.end),
                None => 0,
            },
        };
        if count > 0 {
            let amount = input.normalized_amount(txn) * f64::from(count);
            totals.record(txn.transaction_type, amount);
        }
    }
    totals
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Trailing monthly series ending with the month containing `now`, oldest first.
///
/// Always yields `trailing_months` entries, zero-valued when nothing happened.
pub fn trailing_cash_flow(input: &AnalysisInput<'_>) -> Vec<MonthlyFlow> {
    let current = first_of_month(input.now);
    (0..input.trailing_months)
        .rev()
        .filter_map(|back| shift_months(current, -i64::from(back)))
        .map(|month_start| {
            let window = DateWindow::month_of(month_start);
            let flow = flow_in(input, Some(window), Some(window));
            MonthlyFlow {
                year: month_start.year(),
                month: month_start.month(),
                income: flow.income,
                expense: flow.expense,
            }
        })
        .collect()
}

/// Upper bound on forward projection points, whatever the horizon.
pub const MAX_PROJECTION_PERIODS: u32 = MAX_HORIZON_YEARS * 12 + 1;

/// Cumulative balance path starting from the realized balance.
///
/// Horizons up to `monthly_granularity_max_years` produce one point per month,
/// longer ones one point per calendar year. The first period contains `now`, the
/// last one contains the end of [`projection_window`] and is clipped to it.
/// Standalone records dated on or before `now` are already part of the starting
/// balance, so only later ones are added; templates count from `now`.
pub fn forward_projection(input: &AnalysisInput<'_>) -> Vec<ProjectionPoint> {
    let mut balance = realized_balance(input);
    let horizon_end = projection_window(input).end;
    let periods = if input.horizon_years <= input.monthly_granularity_max_years {
        month_periods(input.now, horizon_end)
    } else {
        year_periods(input.now, horizon_end)
    };

    let after_now = input.now.succ_opt();
    periods
        .into_iter()
        .map(|(period, window)| {
            let window = DateWindow {
                end: window.end.min(horizon_end),
                ..window
            };
            let standalone = after_now.and_then(|day| window.clip_start(day));
            let templates = window.clip_start(input.now);
            let flow = flow_in(input, standalone, templates);
            balance += flow.net();
            ProjectionPoint {
                period,
                income: flow.income,
                expense: flow.expense,
                balance,
            }
        })
        .collect()
}

fn month_periods(now: NaiveDate, end: NaiveDate) -> Vec<(ProjectionPeriod, DateWindow)> {
    let first = first_of_month(now);
    (0..MAX_PROJECTION_PERIODS)
        .map_while(|step| shift_months(first, i64::from(step)))
        .take_while(|start| *start <= end)
        .map(|start| {
            let period = ProjectionPeriod::Month {
                year: start.year(),
                month: start.month(),
            };
            (period, DateWindow::month_of(start))
        })
        .collect()
}

fn year_periods(now: NaiveDate, end: NaiveDate) -> Vec<(ProjectionPeriod, DateWindow)> {
    (now.year()..=end.year())
        .take(MAX_PROJECTION_PERIODS as usize)
        .filter_map(|year| NaiveDate::from_ymd_opt(year, 1, 1))
        .map(|start| {
            let period = ProjectionPeriod::Year { year: start.year() };
            (period, DateWindow::year_of(start))
        })
        .collect()
}
