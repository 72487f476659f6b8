use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Direction of a cash movement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

/// Cadence of a recurring series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum Period {
    #[default]
    OneTime,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Period {
    /// Fixed length in days for periods that never vary with the calendar.
    pub fn linear_days(self) -> Option<i64> {
        match self {
            Period::Daily => Some(1),
            Period::Weekly => Some(7),
            Period::OneTime | Period::Monthly | Period::Yearly => None,
        }
    }

    /// Length in calendar months for month-based periods.
    pub fn calendar_months(self) -> Option<u32> {
        match self {
            Period::Monthly => Some(1),
            Period::Yearly => Some(12),
            Period::OneTime | Period::Daily | Period::Weekly => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Period::OneTime => "One time",
            Period::Daily => "Daily",
            Period::Weekly => "Weekly",
            Period::Monthly => "Monthly",
            Period::Yearly => "Yearly",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Distinguishes concrete records from recurring definitions.
///
/// A `Template` is a virtual series and is never a realized cash event. Every
/// aggregation matches on this exhaustively so templates cannot leak into
/// realized figures.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    #[default]
    Standalone,
    Template,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub amount: f64,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Occurrence date for standalone records, anchor date for templates.
    /// `None` when the stored value could not be parsed.
    #[serde(default, deserialize_with = "lenient_date")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub recurring: bool,
    #[serde(default)]
    pub period: Period,
    #[serde(default)]
    pub kind: TransactionKind,
    /// Template a standalone record was materialized from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<Uuid>,
}

impl Transaction {
    pub fn one_off(
        transaction_type: TransactionType,
        amount: f64,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            transaction_type,
            category: category.into(),
            currency: None,
            date: Some(date),
            recurring: false,
            period: Period::OneTime,
            kind: TransactionKind::Standalone,
            template_id: None,
        }
    }

    pub fn template(
        transaction_type: TransactionType,
        amount: f64,
        category: impl Into<String>,
        anchor: NaiveDate,
        period: Period,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            transaction_type,
            category: category.into(),
            currency: None,
            date: Some(anchor),
            recurring: period != Period::OneTime,
            period,
            kind: TransactionKind::Template,
            template_id: None,
        }
    }

    pub fn with_currency(mut self, code: impl Into<String>) -> Self {
        self.currency = Some(code.into());
        self
    }

    /// Builds a standalone record for one occurrence of this template.
    ///
    /// Deciding whether an occurrence should be materialized belongs to the
    /// caller; this only shapes the record.
    pub fn instance_on(&self, date: NaiveDate) -> Transaction {
        let mut txn = self.clone();
        txn.id = Uuid::new_v4();
        txn.date = Some(date);
        txn.recurring = false;
        txn.period = Period::OneTime;
        txn.kind = TransactionKind::Standalone;
        txn.template_id = Some(self.id);
        txn
    }

    pub fn is_template(&self) -> bool {
        matches!(self.kind, TransactionKind::Template)
    }

    /// Recurring cadence, or `None` when the record describes a single date.
    pub fn cadence(&self) -> Option<Period> {
        if !self.recurring {
            return None;
        }
        match self.period {
            Period::OneTime => None,
            period => Some(period),
        }
    }

    /// Amount with the sign implied by the transaction type.
    pub fn signed_amount(&self) -> f64 {
        match self.transaction_type {
            TransactionType::Income => self.amount.abs(),
            TransactionType::Expense => -self.amount.abs(),
        }
    }

    /// Currency code of the record, falling back when absent or blank.
    pub fn currency_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.currency.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => code,
            _ => fallback,
        }
    }
}

/// Parses the date shapes persisted records are known to carry: plain
/// `YYYY-MM-DD`, RFC 3339 timestamps and naive `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(stamp.date_naive());
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|stamp| stamp.date())
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(raw) => parse_date(&raw),
        _ => None,
    })
}
