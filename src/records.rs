//! Boundary with the persistence layer, which hands over serialized records.

use serde::de::Error as _;
use serde_json::Value;
use tracing::warn;

use crate::domain::Transaction;
use crate::errors::ProjectionResult;

/// Decodes transaction records from a JSON array, or from a JSON object whose
/// values are records (the key-value layout used by stores keyed by id).
///
/// Records that do not decode are skipped and logged; the batch still loads.
pub fn decode_records(data: &str) -> ProjectionResult<Vec<Transaction>> {
    let document: Value = serde_json::from_str(data)?;
    let entries: Vec<Value> = match document {
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, value)| value).collect(),
        other => {
            return Err(serde_json::Error::custom(format!(
                "expected an array or object of records, found {}",
                kind_of(&other)
            ))
            .into())
        }
    };

    let mut transactions = Vec::with_capacity(entries.len());
    for (position, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<Transaction>(entry) {
            Ok(txn) => {
                if txn.date.is_none() {
                    warn!(id = %txn.id, "record has no usable date; it will not contribute");
                }
                transactions.push(txn);
            }
            Err(err) => warn!(position, error = %err, "skipping undecodable transaction record"),
        }
    }
    Ok(transactions)
}

pub fn encode_records(transactions: &[Transaction]) -> ProjectionResult<String> {
    Ok(serde_json::to_string_pretty(transactions)?)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Period, TransactionKind, TransactionType};
    use crate::errors::ProjectionError;
    use chrono::NaiveDate;

    #[test]
    fn skips_malformed_records() {
        let data = r#"[
            {"id": "6c1f4c1e-8d33-4d4c-9a53-3f0a1b9f6c11", "amount": 12.0, "type": "expense",
             "category": "food", "date": "2025-02-03"},
            {"id": "not-a-uuid", "amount": 1.0, "type": "expense"},
            {"id": "0e9d1c55-28c4-4f0e-9d7c-1c6f7a3b2d10", "amount": 900.0, "type": "income",
             "category": "salary", "date": "2025-01-31", "recurring": true,
             "period": "monthly", "kind": "template"}
        ]"#;
        let records = decode_records(data).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, TransactionKind::Standalone);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2025, 2, 3));
        assert_eq!(records[1].cadence(), Some(Period::Monthly));
        assert_eq!(records[1].transaction_type, TransactionType::Income);
    }

    #[test]
    fn accepts_keyed_object_layout() {
        let data = r#"{
            "a": {"id": "6c1f4c1e-8d33-4d4c-9a53-3f0a1b9f6c11", "amount": 3.0, "type": "income"}
        }"#;
        let records = decode_records(data).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, None);
    }

    #[test]
    fn rejects_scalar_documents() {
        let err = decode_records("42").expect_err("scalar");
        assert!(matches!(err, ProjectionError::Serde(_)));
        assert!(err.to_string().contains("a number"));
    }

    #[test]
    fn encoded_records_decode_back() {
        let txn = Transaction::template(
            TransactionType::Expense,
            20.0,
            "gym",
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            Period::Weekly,
        )
        .with_currency("EUR");
        let json = encode_records(std::slice::from_ref(&txn)).unwrap();
        assert_eq!(decode_records(&json).unwrap(), vec![txn]);
    }
}
