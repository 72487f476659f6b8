//! Currency codes, the base-pivot rate table, and amount conversion.

pub mod format;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{ProjectionError, ProjectionResult};

pub use format::{CurrencyDisplay, FormatOptions, FormatterCache, LocaleConfig, NegativeStyle};

/// ISO 4217 style currency code, stored upper-cased.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.trim())
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("USD")
    }
}

impl From<String> for CurrencyCode {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for CurrencyCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.0
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What strict conversion does when a currency has no rate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingRatePolicy {
    /// Treat the amount as already expressed in base units.
    #[default]
    AssumeParity,
    /// Fail with [`ProjectionError::MissingRate`].
    Reject,
}

/// Base currency plus "units of base per one unit of currency" for every other code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RateTableRecord")]
pub struct CurrencyRateTable {
    base: CurrencyCode,
    rates: BTreeMap<CurrencyCode, f64>,
    missing_rate_policy: MissingRatePolicy,
}

#[derive(Deserialize)]
struct RateTableRecord {
    base: String,
    #[serde(default)]
    rates: BTreeMap<String, f64>,
    #[serde(default)]
    missing_rate_policy: MissingRatePolicy,
}

impl TryFrom<RateTableRecord> for CurrencyRateTable {
    type Error = ProjectionError;

    fn try_from(record: RateTableRecord) -> Result<Self, Self::Error> {
        let mut table = CurrencyRateTable::new(record.base);
        table.missing_rate_policy = record.missing_rate_policy;
        for (code, rate) in record.rates {
            table.insert_rate(code, rate)?;
        }
        Ok(table)
    }
}

impl CurrencyRateTable {
    pub fn new(base: impl Into<CurrencyCode>) -> Self {
        Self {
            base: base.into(),
            rates: BTreeMap::new(),
            missing_rate_policy: MissingRatePolicy::default(),
        }
    }

    pub fn with_rate(
        mut self,
        code: impl Into<CurrencyCode>,
        rate: f64,
    ) -> ProjectionResult<Self> {
        self.insert_rate(code, rate)?;
        Ok(self)
    }

    pub fn with_policy(mut self, policy: MissingRatePolicy) -> Self {
        self.missing_rate_policy = policy;
        self
    }

    /// Records how many base units one unit of `code` is worth.
    ///
    /// Rates must be finite and positive. A rate for the base itself is ignored.
    pub fn insert_rate(
        &mut self,
        code: impl Into<CurrencyCode>,
        rate: f64,
    ) -> ProjectionResult<()> {
        let code = code.into();
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ProjectionError::InvalidRate {
                code: code.to_string(),
                rate,
            });
        }
        if code == self.base {
            return Ok(());
        }
        self.rates.insert(code, rate);
        Ok(())
    }

    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    pub fn policy(&self) -> MissingRatePolicy {
        self.missing_rate_policy
    }

    pub fn is_base(&self, code: &str) -> bool {
        self.base.matches(code)
    }

    /// Known rate for `code`; the base always resolves to 1.
    pub fn rate(&self, code: &str) -> Option<f64> {
        if self.is_base(code) {
            return Some(1.0);
        }
        self.rates.get(&CurrencyCode::new(code)).copied()
    }

    pub fn has_rate(&self, code: &str) -> bool {
        self.rate(code).is_some()
    }

    fn rate_or_parity(&self, code: &str) -> f64 {
        self.rate(code).unwrap_or_else(|| {
            debug!(currency = code, base = %self.base, "no rate; assuming parity with base");
            1.0
        })
    }

    fn resolve(&self, code: &str) -> ProjectionResult<f64> {
        match (self.rate(code), self.missing_rate_policy) {
            (Some(rate), _) => Ok(rate),
            (None, MissingRatePolicy::AssumeParity) => Ok(self.rate_or_parity(code)),
            (None, MissingRatePolicy::Reject) => {
                Err(ProjectionError::MissingRate(CurrencyCode::new(code).to_string()))
            }
        }
    }
}

impl Default for CurrencyRateTable {
    fn default() -> Self {
        Self::new(CurrencyCode::default())
    }
}

/// Converts `amount` from one currency to another through the table's base.
///
/// Unknown currencies are treated as already expressed in base units. Use
/// [`try_convert`] when that fallback is unacceptable.
pub fn convert(amount: f64, from: &str, to: &str, table: &CurrencyRateTable) -> f64 {
    if from.trim().eq_ignore_ascii_case(to.trim()) {
        return amount;
    }
    if amount == 0.0 {
        return 0.0;
    }
    let in_base = if table.is_base(from) {
        amount
    } else {
        amount * table.rate_or_parity(from)
    };
    if table.is_base(to) {
        in_base
    } else {
        in_base / table.rate_or_parity(to)
    }
}

/// Like [`convert`], but honours the table's [`MissingRatePolicy`].
pub fn try_convert(
    amount: f64,
    from: &str,
    to: &str,
    table: &CurrencyRateTable,
) -> ProjectionResult<f64> {
    if from.trim().eq_ignore_ascii_case(to.trim()) {
        return Ok(amount);
    }
    if amount == 0.0 {
        return Ok(0.0);
    }
    let from_rate = table.resolve(from)?;
    let to_rate = table.resolve(to)?;
    Ok(amount * from_rate / to_rate)
}
