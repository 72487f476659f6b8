//! Aggregated views over a snapshot of transactions.
//!
//! Every view is a pure function of [`AnalysisInput`]; nothing is cached
//! between calls, so callers recompute whenever their snapshot changes.

pub mod series;
pub mod totals;

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::currency::{convert, CurrencyCode, CurrencyRateTable, MissingRatePolicy};
use crate::domain::{Transaction, TransactionType};
use crate::errors::{ProjectionError, ProjectionResult};

pub use series::{
    forward_projection, trailing_cash_flow, MonthlyFlow, ProjectionPeriod, ProjectionPoint,
    MAX_PROJECTION_PERIODS,
};
pub use totals::{category_totals, projected_volume, projection_window, realized_balance};

pub const DEFAULT_TRAILING_MONTHS: u32 = 6;
pub const DEFAULT_MONTHLY_GRANULARITY_MAX_YEARS: u32 = 3;
/// Longest horizon any view projects; larger inputs are clamped to it.
pub const MAX_HORIZON_YEARS: u32 = 100;

/// Immutable snapshot consumed by every view.
#[derive(Debug, Clone)]
pub struct AnalysisInput<'a> {
    pub transactions: &'a [Transaction],
    pub rates: &'a CurrencyRateTable,
    pub display_currency: CurrencyCode,
    pub now: NaiveDate,
    pub horizon_years: u32,
    pub trailing_months: u32,
    /// Longest horizon still projected month by month; longer ones go yearly.
    pub monthly_granularity_max_years: u32,
}

impl<'a> AnalysisInput<'a> {
    pub fn new(
        transactions: &'a [Transaction],
        rates: &'a CurrencyRateTable,
        display_currency: impl Into<CurrencyCode>,
        now: NaiveDate,
        horizon_years: u32,
    ) -> Self {
        Self {
            transactions,
            rates,
            display_currency: display_currency.into(),
            now,
            horizon_years,
            trailing_months: DEFAULT_TRAILING_MONTHS,
            monthly_granularity_max_years: DEFAULT_MONTHLY_GRANULARITY_MAX_YEARS,
        }
    }

    pub fn with_trailing_months(mut self, months: u32) -> Self {
        self.trailing_months = months;
        self
    }

    pub fn with_monthly_granularity_max_years(mut self, years: u32) -> Self {
        self.monthly_granularity_max_years = years;
        self
    }

    /// Magnitude of `txn` expressed in the display currency.
    pub(crate) fn normalized_amount(&self, txn: &Transaction) -> f64 {
        let display = self.display_currency.as_str();
        convert(txn.amount.abs(), txn.currency_or(display), display, self.rates)
    }
}

/// Income and expense magnitudes over some window.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct FlowTotals {
    pub income: f64,
    pub expense: f64,
}

impl FlowTotals {
    pub fn record(&mut self, transaction_type: TransactionType, amount: f64) {
        match transaction_type {
            TransactionType::Income => self.income += amount,
            TransactionType::Expense => self.expense += amount,
        }
    }

    pub fn net(&self) -> f64 {
        self.income - self.expense
    }
}

/// Every view in one structure, ready to hand to presentation code.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnalysisReport {
    pub display_currency: CurrencyCode,
    pub as_of: NaiveDate,
    pub horizon_years: u32,
    pub realized_balance: f64,
    pub projected: FlowTotals,
    pub category_totals: BTreeMap<String, f64>,
    pub trailing: Vec<MonthlyFlow>,
    pub projection: Vec<ProjectionPoint>,
    /// Currencies that had no rate and were treated as base units.
    pub unpriced_currencies: BTreeSet<CurrencyCode>,
}

pub fn analyze(input: &AnalysisInput<'_>) -> AnalysisReport {
    let report = AnalysisReport {
        display_currency: input.display_currency.clone(),
        as_of: input.now,
        horizon_years: input.horizon_years,
        realized_balance: realized_balance(input),
        projected: projected_volume(input),
        category_totals: category_totals(input),
        trailing: trailing_cash_flow(input),
        projection: forward_projection(input),
        unpriced_currencies: unpriced_currencies(input),
    };
    debug!(
        transactions = input.transactions.len(),
        projection_points = report.projection.len(),
        unpriced = report.unpriced_currencies.len(),
        "analysis complete"
    );
    report
}

/// Currencies referenced by the snapshot that the rate table cannot price.
///
/// Records already in the display currency never need a rate.
pub fn unpriced_currencies(input: &AnalysisInput<'_>) -> BTreeSet<CurrencyCode> {
    let display = input.display_currency.as_str();
    let mut missing = BTreeSet::new();
    let mut converts = false;
    for txn in input.transactions {
        let code = txn.currency_or(display);
        if input.display_currency.matches(code) {
            continue;
        }
        converts = true;
        if !input.rates.has_rate(code) {
            missing.insert(CurrencyCode::new(code));
        }
    }
    if converts && !input.rates.has_rate(display) {
        missing.insert(input.display_currency.clone());
    }
    missing
}

/// Fails when the rate table rejects missing rates and the snapshot needs one.
///
/// The views themselves always fall back to parity; callers that cannot accept
/// that call this first.
pub fn ensure_priced(input: &AnalysisInput<'_>) -> ProjectionResult<()> {
    match input.rates.policy() {
        MissingRatePolicy::AssumeParity => Ok(()),
        MissingRatePolicy::Reject => match unpriced_currencies(input).into_iter().next() {
            Some(code) => Err(ProjectionError::MissingRate(code.to_string())),
            None => Ok(()),
        },
    }
}
