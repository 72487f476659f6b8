use std::collections::BTreeMap;

use crate::domain::{DateWindow, TransactionKind, TransactionType};
use crate::recurring::{occurrences, shift_months};

use super::{AnalysisInput, FlowTotals, MAX_HORIZON_YEARS};

/// Signed sum of every standalone record dated on or before `now`.
pub fn realized_balance(input: &AnalysisInput<'_>) -> f64 {
    let mut balance = 0.0;
    for txn in input.transactions {
        match txn.kind {
            TransactionKind::Template => {}
            TransactionKind::Standalone => {
                if txn.date.is_some_and(|date| date <= input.now) {
                    let amount = input.normalized_amount(txn);
                    balance += match txn.transaction_type {
                        TransactionType::Income => amount,
                        TransactionType::Expense => -amount,
                    };
                }
            }
        }
    }
    balance
}

/// Window from `now` through `now + horizon_years`, inclusive.
///
/// The horizon is clamped to [`MAX_HORIZON_YEARS`].
pub fn projection_window(input: &AnalysisInput<'_>) -> DateWindow {
    let years = input.horizon_years.min(MAX_HORIZON_YEARS);
    let end = shift_months(input.now, i64::from(years) * 12).unwrap_or(input.now);
    DateWindow {
        start: input.now,
        end: end.max(input.now),
    }
}

/// Expected income and expense between `now` and the end of the horizon.
pub fn projected_volume(input: &AnalysisInput<'_>) -> FlowTotals {
    let window = projection_window(input);
    let mut totals = FlowTotals::default();
    for txn in input.transactions {
        let count = match txn.kind {
            TransactionKind::Standalone => {
                u32::from(txn.date.is_some_and(|date| window.contains(date)))
            }
            TransactionKind::Template => occurrences(txn, window.start, window.end),
        };
        if count > 0 {
            let amount = input.normalized_amount(txn) * f64::from(count);
            totals.record(txn.transaction_type, amount);
        }
    }
    totals
}

/// Expense magnitudes of standalone records grouped by raw category key.
pub fn category_totals(input: &AnalysisInput<'_>) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for txn in input.transactions {
        match (txn.kind, txn.transaction_type) {
            (TransactionKind::Template, _) | (_, TransactionType::Income) => {}
            (TransactionKind::Standalone, TransactionType::Expense) => {
                let amount = input.normalized_amount(txn);
                *totals.entry(txn.category.clone()).or_insert(0.0) += amount;
            }
        }
    }
    totals
}
