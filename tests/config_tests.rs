use budget_projection::config::EngineConfig;
use budget_projection::currency::{CurrencyCode, CurrencyRateTable, MissingRatePolicy};
use budget_projection::{analyze, Period, Transaction, TransactionType};
use chrono::NaiveDate;
use tempfile::TempDir;

#[test]
fn test_missing_file_yields_defaults() {
    let dir = TempDir::new().expect("temp dir");
    let config = EngineConfig::load(&dir.path().join("absent.json")).expect("defaults");
    assert_eq!(config, EngineConfig::default());
}

#[test]
fn test_save_then_load_round_trip() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("nested").join("engine.json");
    let config = EngineConfig {
        display_currency: CurrencyCode::new("gbp"),
        horizon_years: 10,
        trailing_months: 3,
        monthly_granularity_max_years: 2,
        missing_rate_policy: MissingRatePolicy::Reject,
    };
    config.save(&path).expect("save config");
    assert!(!path.with_extension("json.tmp").exists());

    let loaded = EngineConfig::load(&path).expect("load config");
    assert_eq!(loaded, config);
}

#[test]
fn test_config_drives_analysis_shape() {
    let config = EngineConfig::from_json_str(
        r#"{"display_currency":"USD","horizon_years":2,"trailing_months":3,
            "monthly_granularity_max_years":1}"#,
    )
    .expect("valid config");
    let rates = config.prepare_rates(CurrencyRateTable::new("USD"));
    let now = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
    let txns = vec![Transaction::template(
        TransactionType::Income,
        100.0,
        "allowance",
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        Period::Monthly,
    )];
    let report = analyze(&config.input(&txns, &rates, now));
    assert_eq!(report.trailing.len(), 3);
    assert_eq!(report.projection.len(), 3);
    assert_eq!(report.projection[1].balance, 1900.0);
    // 2027 stops at 2027-05-10.
    assert_eq!(report.projection[2].balance, 2400.0);
}
