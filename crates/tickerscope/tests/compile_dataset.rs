//! End-to-end compilation over canned Alpha Vantage responses.

use chrono::{Duration, NaiveDate};
use serde_json::{Map, Value, json};
use std::collections::HashSet;
use std::sync::Arc;
use tickerscope::{
    CompilerConfig, DatasetCompiler, DisplayValue, ErrorKind, FixtureTransport, InMemoryWatchlist,
    NO_ANALYZABLE_DATA, Resource, Symbol, WatchlistStore, columns,
};

fn daily_series(rows: usize) -> Value {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let mut table = Map::new();
    for i in 0..rows {
        let date = start + Duration::days(i as i64);
        let close = 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.1;
        table.insert(
            date.format("%Y-%m-%d").to_string(),
            json!({
                "1. open": format!("{:.2}", close - 0.5),
                "2. high": format!("{:.2}", close + 1.0),
                "3. low": format!("{:.2}", close - 1.0),
                "4. close": format!("{close:.2}"),
                "5. volume": format!("{}", 1_000_000 + i * 1_000),
            }),
        );
    }
    json!({"Meta Data": {"2. Symbol": "IBM"}, "Time Series (Daily)": table})
}

fn overview() -> Value {
    json!({
        "Symbol": "IBM",
        "Name": "International Business Machines",
        "Sector": "TECHNOLOGY",
        "Industry": "COMPUTER & OFFICE EQUIPMENT",
        "MarketCapitalization": "170000000000",
        "SharesOutstanding": "920000000",
        "SharesFloat": "915000000",
        "PERatio": "22.5",
        "PEGRatio": "4.1",
        "ForwardPE": "19.8",
        "OperatingMarginTTM": "0.145",
        "PercentInsiders": "0.12",
        "PercentInstitutions": "62.5",
        "ShortPercentFloat": "0.021",
        "52WeekHigh": "199.18",
        "52WeekLow": "120.55",
        "RevenuePerShareTTM": "67.5"
    })
}

fn statement(items: Value) -> Value {
    let mut report = items.as_object().cloned().unwrap_or_default();
    report.insert("fiscalDateEnding".to_string(), json!("2023-12-31"));
    report.insert("reportedCurrency".to_string(), json!("USD"));
    json!({"symbol": "IBM", "annualReports": [report], "quarterlyReports": []})
}

fn full_transport() -> FixtureTransport {
    FixtureTransport::new()
        .with_response("TIME_SERIES_DAILY", daily_series(252))
        .with_response("OVERVIEW", overview())
        .with_response(
            "BALANCE_SHEET",
            statement(json!({
                "totalAssets": "135241000000",
                "totalLiabilities": "112628000000",
                "totalShareholderEquity": "22613000000",
                "totalCurrentAssets": "32908000000",
                "totalCurrentLiabilities": "34122000000",
                "longTermDebt": "50121000000",
                "intangibleAssets": "11036000000"
            })),
        )
        .with_response(
            "INCOME_STATEMENT",
            statement(json!({
                "totalRevenue": "61860000000",
                "grossProfit": "34300000000",
                "netIncome": "7502000000"
            })),
        )
        .with_response(
            "CASH_FLOW",
            statement(json!({"operatingCashflow": "13931000000", "capitalExpenditures": "1245000000"})),
        )
        .with_response(
            "EARNINGS",
            json!({
                "symbol": "IBM",
                "annualEarnings": [{"fiscalDateEnding": "2023-12-31", "reportedEPS": "9.61"}],
                "quarterlyEarnings": [{
                    "fiscalDateEnding": "2023-12-31", "reportedDate": "2024-01-24",
                    "reportedEPS": "3.87", "estimatedEPS": "3.78",
                    "surprise": "0.09", "surprisePercentage": "2.381"
                }]
            }),
        )
        .with_response(
            "INSIDER_TRANSACTIONS",
            json!({"data": [
                {"transaction_date": "2024-02-01", "executive": "DOE, JANE", "executive_title": "Director",
                 "acquisition_or_disposal": "A", "shares": "1200", "share_price": "185.5"},
                {"transaction_date": "2024-01-15", "executive": "ROE, RICH",
                 "acquisition_or_disposal": "D", "shares": "300", "share_price": "180.0"}
            ]}),
        )
        .with_response(
            "GLOBAL_QUOTE",
            json!({"Global Quote": {
                "01. symbol": "IBM", "02. open": "185.0", "03. high": "187.0", "04. low": "184.0",
                "05. price": "186.5", "06. volume": "4200000", "07. latest trading day": "2024-02-02",
                "08. previous close": "185.2", "09. change": "1.3", "10. change percent": "0.7019%"
            }}),
        )
}

fn config() -> CompilerConfig {
    CompilerConfig {
        advanced_indicators: false,
        ..CompilerConfig::default()
    }
}

#[tokio::test]
async fn test_compile_full_dataset() {
    let transport = Arc::new(full_transport());
    let compiler = DatasetCompiler::with_transport(transport.clone(), config());

    let compiled = compiler.compile(&Symbol::new("IBM")).await;

    assert!(compiled.is_ok(), "unexpected error: {:?}", compiled.error);
    assert!(compiled.warnings.is_empty(), "unexpected warnings: {:?}", compiled.warnings);

    let dataset = &compiled.dataset;
    let series = dataset.time_series.as_ref().unwrap();
    assert_eq!(series.len(), 252);
    assert!(series.last_value(columns::MA50).is_some());
    assert!(series.last_value(columns::MA200).is_some());
    assert!(series.last_value(columns::RSI).is_some());

    let metrics = dataset.calculated_metrics.as_ref().unwrap();
    let margin = metrics.profit_margin.unwrap();
    assert!((margin - 7_502.0 / 61_860.0 * 100.0).abs() < 1e-9);
    assert!(metrics.debt_to_equity.is_some());
    assert!(metrics.free_cash_flow.is_some());

    let overview = dataset.company_overview.as_ref().unwrap();
    match overview.get("MarketCapFormatted") {
        DisplayValue::Available(text) => assert!(text.ends_with('B'), "got {text}"),
        DisplayValue::NotAvailable => panic!("market cap not formatted"),
    }

    let supplementary = dataset.supplementary_data.as_ref().unwrap();
    assert_ne!(supplementary.average_volume, DisplayValue::NotAvailable);
    assert_ne!(supplementary.relative_volume, DisplayValue::NotAvailable);

    let insider = dataset.insider_summary.as_ref().unwrap();
    assert_eq!((insider.buys, insider.sells), (1, 1));
    assert!(dataset.statement_highlights.is_some());
    assert_eq!(dataset.earnings.as_ref().unwrap().quarterly.len(), 1);

    let frame = dataset.time_series_frame().unwrap().unwrap();
    assert_eq!(frame.height(), 252);

    let summary = compiled.summary();
    assert_eq!(summary.rows, 252);
    assert_eq!(summary.price, Some(186.5));
    assert!(summary.indicators.contains_key(columns::MA50));
    assert!(serde_json::to_string(&summary).is_ok());
}

fn indicator_table(function: &str, rows: usize, values: impl Fn(usize) -> Value) -> Value {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let table: Map<String, Value> = (0..rows)
        .map(|i| {
            let date = start + Duration::days(i as i64);
            (date.format("%Y-%m-%d").to_string(), values(i))
        })
        .collect();
    let mut body = Map::new();
    body.insert("Meta Data".to_string(), json!({"1: Symbol": "IBM"}));
    body.insert(format!("Technical Analysis: {function}"), Value::Object(table));
    Value::Object(body)
}

#[tokio::test]
async fn test_compile_with_default_config_merges_indicators() {
    // The last 100 bars have BBANDS and APO rows; STOCHRSI and STOCHF are unavailable.
    let bbands = indicator_table("BBANDS", 252, |i| {
        if i < 152 {
            json!({})
        } else {
            json!({"Real Upper Band": "130.0", "Real Middle Band": "125.0", "Real Lower Band": "120.0"})
        }
    });
    let apo = indicator_table("APO", 252, |i| json!({"APO": format!("{:.2}", i as f64 * 0.01)}));
    let transport = Arc::new(
        full_transport()
            .with_response("BBANDS", bbands)
            .with_response("APO", apo)
            .with_response("STOCHRSI", json!({"Information": "This is a premium endpoint."})),
    );
    let compiler = DatasetCompiler::with_transport(transport.clone(), CompilerConfig::default());

    let compiled = compiler.compile(&Symbol::new("IBM")).await;

    assert!(compiled.is_ok(), "unexpected error: {:?}", compiled.error);
    // Indicator failures are skipped inside the time series fetch.
    assert!(compiled.warnings.is_empty(), "unexpected warnings: {:?}", compiled.warnings);

    let requests = transport.requests();
    assert_eq!(requests.len(), 12);
    let indicator_requests: Vec<_> = requests
        .iter()
        .filter(|q| ["BBANDS", "STOCHRSI", "STOCHF", "APO"].contains(&q.function.as_str()))
        .collect();
    assert_eq!(indicator_requests.len(), 4);
    assert!(indicator_requests.iter().all(|q| q.get("interval") == Some("daily")));

    let series = compiled.dataset.time_series.as_ref().unwrap();
    assert_eq!(series.len(), 252);
    let upper = series.column(columns::BB_UPPER).unwrap();
    assert_eq!(upper[0], None);
    assert_eq!(upper[251], Some(130.0));
    assert_eq!(series.last_value(columns::APO), Some(2.51));
    assert!(series.column(columns::STOCH_RSI_FASTK).is_none());
    assert!(series.column(columns::STOCH_FASTK).is_none());

    let frame = compiled.dataset.time_series_frame().unwrap().unwrap();
    assert_eq!(frame.height(), 252);
    assert!(frame.column(columns::BB_LOWER).is_ok());
    assert!(frame.column(columns::APO).is_ok());
}

#[tokio::test]
async fn test_each_resource_requested_once() {
    let transport = Arc::new(full_transport());
    let compiler = DatasetCompiler::with_transport(transport.clone(), config());

    compiler.compile(&Symbol::new("IBM")).await;

    let requests = transport.requests();
    let functions: HashSet<&str> = requests.iter().map(|q| q.function.as_str()).collect();
    assert_eq!(requests.len(), 8);
    assert_eq!(functions.len(), 8);
}

#[tokio::test]
async fn test_time_series_failure_keeps_other_resources() {
    let transport = full_transport().with_failure("TIME_SERIES_DAILY", "connection reset");
    let compiler = DatasetCompiler::with_transport(Arc::new(transport), config());

    let compiled = compiler.compile(&Symbol::new("IBM")).await;

    assert_eq!(compiled.error.as_deref(), Some(NO_ANALYZABLE_DATA));
    assert_eq!(compiled.warnings.len(), 1);
    assert_eq!(compiled.warnings[0].resource, Resource::TimeSeries);
    assert_eq!(compiled.warnings[0].kind, ErrorKind::Transport);

    let dataset = &compiled.dataset;
    assert!(dataset.time_series.is_none());
    assert!(dataset.company_overview.is_some());
    assert!(dataset.calculated_metrics.is_some());
    assert_eq!(
        dataset.supplementary_data.as_ref().unwrap().relative_volume,
        DisplayValue::NotAvailable
    );
}

#[tokio::test]
async fn test_parallel_fetch_matches_sequential() {
    let sequential = DatasetCompiler::with_transport(Arc::new(full_transport()), config())
        .compile(&Symbol::new("IBM"))
        .await;

    let parallel_config = CompilerConfig {
        parallel_fetch: true,
        ..config()
    };
    let parallel = DatasetCompiler::with_transport(Arc::new(full_transport()), parallel_config)
        .compile(&Symbol::new("IBM"))
        .await;

    assert!(parallel.is_ok());
    assert_eq!(parallel.summary(), sequential.summary());
}

#[tokio::test]
async fn test_compile_watchlist() {
    let transport = full_transport()
        .with_response("OVERVIEW.MSFT", json!({"Information": "This is a premium endpoint."}));
    let compiler = DatasetCompiler::with_transport(Arc::new(transport), config());

    let watchlist = InMemoryWatchlist::new();
    watchlist.add(&Symbol::new("IBM"), None).await.unwrap();
    watchlist.add(&Symbol::new("MSFT"), Some("cloud")).await.unwrap();

    let compiled = compiler.compile_watchlist(&watchlist).await.unwrap();

    assert_eq!(compiled.len(), 2);
    assert_eq!(compiled[0].dataset.symbol, Symbol::new("IBM"));
    assert!(compiled[0].warnings.is_empty());
    assert_eq!(compiled[1].dataset.symbol, Symbol::new("MSFT"));
    assert_eq!(compiled[1].warnings[0].resource, Resource::CompanyOverview);
    assert_eq!(compiled[1].warnings[0].kind, ErrorKind::UpstreamAdvisory);
    // The compiler only reads the watchlist.
    assert_eq!(watchlist.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_fixture_dir_config() {
    let dir = std::env::temp_dir().join(format!("tickerscope-fixtures-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("TIME_SERIES_DAILY.json"), daily_series(30).to_string()).unwrap();
    std::fs::write(dir.join("OVERVIEW.json"), overview().to_string()).unwrap();

    let compiler = DatasetCompiler::from_config(CompilerConfig {
        fixture_dir: Some(dir.clone()),
        ..config()
    })
    .unwrap();
    let compiled = compiler.compile(&Symbol::new("IBM")).await;

    assert!(compiled.is_ok());
    assert_eq!(compiled.dataset.time_series.as_ref().unwrap().len(), 30);
    assert_eq!(compiled.warnings.len(), 6);
    std::fs::remove_dir_all(&dir).unwrap();
}
