use chrono::NaiveDate;
use thiserror::Error;

/// Error type for the fallible edges of the projection engine.
///
/// Aggregations themselves never fail; these variants surface from input
/// construction, strict currency conversion, configuration and record decoding.
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Invalid window: {end} is before {start}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },
    #[error("No rate for currency {0}")]
    MissingRate(String),
    #[error("Invalid rate {rate} for currency {code}")]
    InvalidRate { code: String, rate: f64 },
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type ProjectionResult<T> = Result<T, ProjectionError>;
