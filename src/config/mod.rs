use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analysis::{
    AnalysisInput, DEFAULT_MONTHLY_GRANULARITY_MAX_YEARS, DEFAULT_TRAILING_MONTHS,
    MAX_HORIZON_YEARS,
};
use crate::currency::{CurrencyCode, CurrencyRateTable, MissingRatePolicy};
use crate::domain::Transaction;
use crate::errors::{ProjectionError, ProjectionResult};

const TMP_SUFFIX: &str = "tmp";

/// Caller-level knobs for an analysis run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub display_currency: CurrencyCode,
    pub horizon_years: u32,
    pub trailing_months: u32,
    pub monthly_granularity_max_years: u32,
    pub missing_rate_policy: MissingRatePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            display_currency: CurrencyCode::default(),
            horizon_years: 1,
            trailing_months: DEFAULT_TRAILING_MONTHS,
            monthly_granularity_max_years: DEFAULT_MONTHLY_GRANULARITY_MAX_YEARS,
            missing_rate_policy: MissingRatePolicy::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(data: &str) -> ProjectionResult<Self> {
        let config: EngineConfig = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a config file; a missing file yields the defaults.
    pub fn load(path: &Path) -> ProjectionResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Writes the config by staging to a sibling temp file and renaming it into place.
    pub fn save(&self, path: &Path) -> ProjectionResult<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        let tmp = tmp_path(path);
        let mut file = File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn validate(&self) -> ProjectionResult<()> {
        if self.display_currency.as_str().is_empty() {
            return Err(ProjectionError::Config(
                "display_currency must not be empty".into(),
            ));
        }
        if self.trailing_months == 0 {
            return Err(ProjectionError::Config(
                "trailing_months must be at least 1".into(),
            ));
        }
        if self.horizon_years > MAX_HORIZON_YEARS {
            return Err(ProjectionError::Config(format!(
                "horizon_years must be at most {}",
                MAX_HORIZON_YEARS
            )));
        }
        if self.monthly_granularity_max_years > MAX_HORIZON_YEARS {
            return Err(ProjectionError::Config(format!(
                "monthly_granularity_max_years must be at most {}",
                MAX_HORIZON_YEARS
            )));
        }
        Ok(())
    }

    /// Applies the configured missing-rate policy to a freshly loaded table.
    pub fn prepare_rates(&self, rates: CurrencyRateTable) -> CurrencyRateTable {
        rates.with_policy(self.missing_rate_policy)
    }

    pub fn input<'a>(
        &self,
        transactions: &'a [Transaction],
        rates: &'a CurrencyRateTable,
        now: NaiveDate,
    ) -> AnalysisInput<'a> {
        AnalysisInput::new(
            transactions,
            rates,
            self.display_currency.clone(),
            now,
            self.horizon_years,
        )
        .with_trailing_months(self.trailing_months)
        .with_monthly_granularity_max_years(self.monthly_granularity_max_years)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}
