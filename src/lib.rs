#![doc(test(attr(deny(warnings))))]

//! Budget Projection turns a snapshot of one-off and recurring transactions
//! into realized balances, projected volumes, category breakdowns and
//! cash-flow series for budgeting front-ends.
//!
//! The engine is pure: every view is recomputed from its inputs and performs
//! no I/O.

pub mod analysis;
pub mod config;
pub mod currency;
pub mod domain;
pub mod errors;
pub mod records;
pub mod recurring;
pub mod utils;

pub use analysis::{analyze, AnalysisInput, AnalysisReport};
pub use currency::{convert, try_convert, CurrencyCode, CurrencyRateTable};
pub use domain::{Period, Transaction, TransactionKind, TransactionType};
pub use errors::{ProjectionError, ProjectionResult};
pub use recurring::occurrences;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Budget Projection tracing initialized.");
    });
}
