#![allow(dead_code)]

use chartist_ta::{Bar, PriceSeries, Series};
use chrono::NaiveDate;
use serde::{Deserialize, de::DeserializeOwned};

/// Reference value; an empty field is an undefined value.
#[derive(Debug, Deserialize)]
pub struct RefValue {
    pub date: NaiveDate,
    pub expected: Option<f64>,
}

/// Reference Bollinger Bands row.
#[derive(Debug, Deserialize)]
pub struct RefBbValue {
    pub date: NaiveDate,
    pub upper: Option<f64>,
    pub middle: Option<f64>,
    pub lower: Option<f64>,
}

/// Reference directional indicators and ADX row.
#[derive(Debug, Deserialize)]
pub struct RefAdxValue {
    pub date: NaiveDate,
    pub plus_di: Option<f64>,
    pub minus_di: Option<f64>,
    pub adx: Option<f64>,
}

const OHLCV_PATH: &str = "tests/fixtures/data/daily-ohlcv.csv";

/// Routes `tracing` output through the test harness. Safe to call from
/// every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Load the daily reference bars.
pub fn load_bars() -> Vec<Bar> {
    load_records(OHLCV_PATH, "invalid OHLCV record")
}

/// Load the daily reference bars as a validated series.
pub fn load_series() -> PriceSeries {
    PriceSeries::new(load_bars()).expect("reference bars are ordered")
}

/// Load single-value reference data.
pub fn load_ref_values(path: &str) -> Vec<RefValue> {
    load_records(path, "invalid reference record")
}

/// Load Bollinger Bands reference data (upper, middle, lower).
pub fn load_bb_ref(path: &str) -> Vec<RefBbValue> {
    load_records(path, "invalid BB reference record")
}

/// Load ADX reference data (+DI, -DI, ADX).
pub fn load_adx_ref(path: &str) -> Vec<RefAdxValue> {
    load_records(path, "invalid ADX reference record")
}

/// Assert two series agree element-wise: both undefined, or both defined
/// within tolerance.
pub fn assert_series_near(actual: &Series, expected: &[Option<f64>], tolerance: f64, context: &str) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "{context}: length {} != {}",
        actual.len(),
        expected.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        match (a, e) {
            (None, None) => {}
            (Some(a), Some(e)) => assert_near(*a, *e, tolerance, &format!("{context} at bar {i}")),
            (a, e) => panic!("{context}: definedness mismatch at bar {i}: got {a:?}, expected {e:?}"),
        }
    }
}

/// Assert two f64 values are within tolerance.
pub fn assert_near(actual: f64, expected: f64, tolerance: f64, context: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "{context}: expected {expected:.10}, got {actual:.10}, diff {diff:.2e} > tolerance {tolerance:.2e}"
    );
}

fn load_records<T>(path: &str, message: &str) -> Vec<T>
where
    T: DeserializeOwned,
{
    let mut reader = csv::Reader::from_path(path).expect("fixture file not found");
    reader
        .deserialize()
        .map(|record| record.expect(message))
        .collect()
}
