use budget_projection::analysis::{
    category_totals, forward_projection, projected_volume, realized_balance, trailing_cash_flow,
    ProjectionPeriod,
};
use budget_projection::records::decode_records;
use budget_projection::{
    analyze, AnalysisInput, CurrencyRateTable, Period, Transaction, TransactionType,
};
use chrono::NaiveDate;
use insta::assert_snapshot;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn household() -> Vec<Transaction> {
    let salary = Transaction::template(
        TransactionType::Income,
        3000.0,
        "salary",
        date(2024, 11, 28),
        Period::Monthly,
    );
    let rent = Transaction::template(
        TransactionType::Expense,
        1200.0,
        "rent",
        date(2024, 12, 1),
        Period::Monthly,
    );
    let streaming = Transaction::template(
        TransactionType::Expense,
        10.0,
        "subscriptions",
        date(2025, 2, 3),
        Period::Monthly,
    )
    .with_currency("EUR");
    vec![
        salary.instance_on(date(2025, 1, 28)),
        salary.instance_on(date(2025, 2, 28)),
        rent.instance_on(date(2025, 2, 1)),
        Transaction::one_off(TransactionType::Expense, 80.0, "groceries", date(2025, 2, 12)),
        Transaction::one_off(TransactionType::Expense, 45.5, "groceries", date(2025, 3, 2)),
        Transaction::one_off(TransactionType::Expense, 20.0, "dining", date(2025, 3, 20))
            .with_currency("EUR"),
        salary,
        rent,
        streaming,
    ]
}

fn rates() -> CurrencyRateTable {
    CurrencyRateTable::new("USD")
        .with_rate("EUR", 1.1)
        .expect("valid EUR rate")
}

#[test]
fn test_yearly_income_scenario() {
    let rates = CurrencyRateTable::new("USD");
    let txns = vec![Transaction::template(
        TransactionType::Income,
        120_000.0,
        "salary",
        date(2024, 1, 15),
        Period::Yearly,
    )
    .with_currency("USD")];
    let input = AnalysisInput::new(&txns, &rates, "USD", date(2025, 6, 1), 2);

    let projected = projected_volume(&input);
    assert_eq!(projected.income, 240_000.0);
    assert_eq!(projected.expense, 0.0);
    assert_eq!(realized_balance(&input), 0.0);
}

#[test]
fn test_empty_collection_is_zeroed_and_shaped() {
    let rates = rates();
    let input = AnalysisInput::new(&[], &rates, "USD", date(2025, 6, 1), 2);
    let report = analyze(&input);

    assert_eq!(report.realized_balance, 0.0);
    assert_eq!(report.projected.income, 0.0);
    assert_eq!(report.projected.expense, 0.0);
    assert!(report.category_totals.is_empty());
    assert_eq!(report.trailing.len(), 6);
    assert!(report
        .trailing
        .iter()
        .all(|month| month.income == 0.0 && month.expense == 0.0));
    // June 2025 through the month holding 2027-06-01.
    assert_eq!(report.projection.len(), 25);
    assert!(report.projection.iter().all(|point| point.balance == 0.0));
    assert!(report.unpriced_currencies.is_empty());
}

#[test]
fn test_templates_never_move_realized_balance() {
    let rates = rates();
    let base = vec![Transaction::one_off(
        TransactionType::Income,
        500.0,
        "gift",
        date(2025, 1, 1),
    )];
    let mut with_templates = base.clone();
    for amount in [1.0, 1e6, -42.0] {
        with_templates.push(Transaction::template(
            TransactionType::Expense,
            amount,
            "anything",
            date(2020, 1, 1),
            Period::Daily,
        ));
    }
    let now = date(2025, 6, 1);
    let before = realized_balance(&AnalysisInput::new(&base, &rates, "USD", now, 1));
    let after = realized_balance(&AnalysisInput::new(&with_templates, &rates, "USD", now, 1));
    assert_eq!(before, 500.0);
    assert_eq!(after, before);
}

#[test]
fn test_household_views() {
    let rates = rates();
    let txns = household();
    let input = AnalysisInput::new(&txns, &rates, "USD", date(2025, 3, 15), 1);

    let expected_realized = 3000.0 + 3000.0 - 1200.0 - 80.0 - 45.5;
    assert!((realized_balance(&input) - expected_realized).abs() < 1e-9);

    let categories = category_totals(&input);
    assert_eq!(categories.len(), 3);
    assert_eq!(categories["rent"], 1200.0);
    assert!((categories["groceries"] - 125.5).abs() < 1e-9);
    assert!((categories["dining"] - 22.0).abs() < 1e-9);

    let projected = projected_volume(&input);
    // 2025-03-15 ..= 2026-03-15: salary on the 28th and rent on the 1st occur 12 times,
    // streaming on the 3rd occurs 12 times, the dining record is dated inside the window.
    assert!((projected.income - 12.0 * 3000.0).abs() < 1e-9);
    let expense = 12.0 * 1200.0 + 12.0 * 11.0 + 22.0;
    assert!((projected.expense - expense).abs() < 1e-9);
}

#[test]
fn test_trailing_series_renders_stably() {
    let rates = rates();
    let txns = household();
    let input = AnalysisInput::new(&txns, &rates, "USD", date(2025, 3, 15), 1);
    let rendered = trailing_cash_flow(&input)
        .iter()
        .map(|month| {
            format!(
                "{}-{:02} income={:.2} expense={:.2}",
                month.year, month.month, month.income, month.expense
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    assert_snapshot!(rendered, @r"
    2024-10 income=0.00 expense=0.00
    2024-11 income=3000.00 expense=0.00
    2024-12 income=3000.00 expense=1200.00
    2025-01 income=6000.00 expense=1200.00
    2025-02 income=6000.00 expense=2491.00
    2025-03 income=3000.00 expense=1278.50
    ");
}

#[test]
fn test_forward_projection_starts_from_realized_balance() {
    let rates = rates();
    let txns = household();
    let input = AnalysisInput::new(&txns, &rates, "USD", date(2025, 3, 15), 1);
    let start = realized_balance(&input);
    let points = forward_projection(&input);
    assert_eq!(points.len(), 13);
    assert_eq!(points[0].period, ProjectionPeriod::Month { year: 2025, month: 3 });

    // March after the 15th: salary on the 28th, the EUR dining record on the 20th.
    assert_eq!(points[0].income, 3000.0);
    assert!((points[0].expense - 22.0).abs() < 1e-9);
    assert!((points[0].balance - (start + 3000.0 - 22.0)).abs() < 1e-9);

    let mut running = start;
    for point in &points {
        running += point.income - point.expense;
        assert!((point.balance - running).abs() < 1e-6);
    }
}

#[test]
fn test_forward_projection_covers_the_whole_horizon() {
    let rates = CurrencyRateTable::new("USD");
    let txns = vec![Transaction::template(
        TransactionType::Income,
        100.0,
        "stipend",
        date(2025, 1, 10),
        Period::Monthly,
    )];
    let cases = [(date(2025, 12, 20), 5, 6000.0), (date(2025, 6, 20), 1, 1200.0)];
    for (now, horizon, expected) in cases {
        let input = AnalysisInput::new(&txns, &rates, "USD", now, horizon);
        let points = forward_projection(&input);
        let income: f64 = points.iter().map(|point| point.income).sum();
        assert_eq!(income, expected, "now {now}, horizon {horizon}");
        assert_eq!(projected_volume(&input).income, expected);
    }
}

#[test]
fn test_forward_balance_ends_at_realized_plus_projected() {
    let rates = rates();
    let txns = household();
    for horizon in [1, 3, 4, 10] {
        let input = AnalysisInput::new(&txns, &rates, "USD", date(2025, 3, 15), horizon);
        let points = forward_projection(&input);
        let projected = projected_volume(&input);
        let expected = realized_balance(&input) + projected.net();
        let last = points[points.len() - 1].balance;
        assert!((last - expected).abs() < 1e-6, "horizon {horizon}: {last} != {expected}");
    }
}

#[test]
fn test_analysis_is_deterministic() {
    let rates = rates();
    let txns = household();
    let input = AnalysisInput::new(&txns, &rates, "USD", date(2025, 3, 15), 4);
    let first = analyze(&input);
    let second = analyze(&input);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(first.projection.len(), 5);
    assert_eq!(first.projection[0].period, ProjectionPeriod::Year { year: 2025 });
}

#[test]
fn test_unparseable_dates_contribute_nothing() {
    let data = r#"[
        {"id": "0b3f9d8e-1111-4a5b-8c9d-000000000001", "amount": 50.0, "type": "expense",
         "category": "misc", "date": "31/02/2025"},
        {"id": "0b3f9d8e-1111-4a5b-8c9d-000000000002", "amount": 5.0, "type": "expense",
         "category": "misc", "date": "garbage", "recurring": true, "period": "daily",
         "kind": "template"},
        {"id": "0b3f9d8e-1111-4a5b-8c9d-000000000003", "amount": 7.0, "type": "income",
         "category": "misc", "date": "2025-06-01"}
    ]"#;
    let txns = decode_records(data).unwrap();
    assert_eq!(txns.len(), 3);
    let rates = CurrencyRateTable::default();
    let input = AnalysisInput::new(&txns, &rates, "USD", date(2025, 6, 1), 1);
    let report = analyze(&input);
    assert_eq!(report.realized_balance, 7.0);
    assert_eq!(report.projected.expense, 0.0);
    assert_eq!(report.projected.income, 7.0);
    assert_eq!(report.category_totals["misc"], 50.0);
}

#[test]
fn test_report_serializes_for_presentation() {
    let rates = rates();
    let txns = household();
    let input = AnalysisInput::new(&txns, &rates, "eur", date(2025, 3, 15), 1);
    let value = serde_json::to_value(analyze(&input)).unwrap();
    assert_eq!(value["display_currency"], "EUR");
    assert_eq!(value["as_of"], "2025-03-15");
    assert_eq!(value["trailing"].as_array().unwrap().len(), 6);
    assert_eq!(value["projection"][0]["period"]["granularity"], "month");
    assert_eq!(value["projection"][0]["period"]["month"], 3);
}
