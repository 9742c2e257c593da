mod fixtures;

use chartist_ta::{Sma, SmaConfig, compute_series};
use fixtures::{assert_near, assert_series_near, load_ref_values, load_series};

const REF_PATH: &str = "tests/fixtures/data/sma-20-close.csv";

/// SMA is pure arithmetic over a fixed window; no accumulated drift.
const TOLERANCE: f64 = 1e-8;

#[test]
fn sma_20_close_matches_reference() {
    let series = load_series();
    let reference = load_ref_values(REF_PATH);
    let expected: Vec<Option<f64>> = reference.iter().map(|r| r.expected).collect();

    let actual = chartist_ta::sma(series.close(), 20).unwrap();

    assert_series_near(&actual, &expected, TOLERANCE, "SMA(20)");
}

#[test]
fn sma_20_first_value_at_length_minus_one() {
    let series = load_series();
    let actual = chartist_ta::sma(series.close(), 20).unwrap();

    assert_eq!(actual.iter().position(Option::is_some), Some(19));
}

#[test]
fn sma_20_streaming_matches_reference() {
    let series = load_series();
    let reference = load_ref_values(REF_PATH);

    let mut sma = Sma::new(SmaConfig::close(20).unwrap());

    for (bar, reference) in series.bars().iter().zip(&reference) {
        assert_eq!(bar.date, reference.date);
        match (sma.compute(bar), reference.expected) {
            (None, None) => {}
            (Some(value), Some(expected)) => {
                assert_near(value, expected, TOLERANCE, &format!("SMA(20) on {}", bar.date));
            }
            (value, expected) => panic!("SMA(20) on {}: got {value:?}, expected {expected:?}", bar.date),
        }
    }
}

#[test]
fn sma_20_compute_series_matches_batch() {
    let series = load_series();

    let streamed = compute_series::<Sma, _>(SmaConfig::close(20).unwrap(), series.bars()).unwrap();
    let batch = chartist_ta::sma(series.close(), 20).unwrap();

    assert_eq!(streamed, batch);
}
