mod fixtures;

use chartist_ta::{Ema, EmaConfig, MovingAverage, compute_series};
use fixtures::{assert_series_near, load_ref_values, load_series};

const REF_PATH: &str = "tests/fixtures/data/ema-9-close.csv";

/// EMA has infinite memory, but the seed is the first close, so the
/// recurrence is identical from bar 0.
const TOLERANCE: f64 = 1e-8;

fn expected() -> Vec<Option<f64>> {
    load_ref_values(REF_PATH).iter().map(|r| r.expected).collect()
}

#[test]
fn ema_9_close_matches_reference() {
    let series = load_series();

    let actual = chartist_ta::ema(series.close(), 9).unwrap();

    assert_series_near(&actual, &expected(), TOLERANCE, "EMA(9)");
}

#[test]
fn ema_9_defined_from_first_bar() {
    let series = load_series();
    let actual = chartist_ta::ema(series.close(), 9).unwrap();

    assert_eq!(actual[0], series.close()[0]);
    assert!(actual.iter().all(Option::is_some));
}

#[test]
fn ema_9_streaming_matches_batch() {
    let series = load_series();

    let streamed = compute_series::<Ema, _>(EmaConfig::close(9).unwrap(), series.bars())
        .unwrap();
    let batch = MovingAverage::Exponential.apply(series.close(), 9).unwrap();

    assert_eq!(streamed, batch);
}

#[test]
fn ema_with_alpha_matches_length() {
    let series = load_series();

    let by_alpha = chartist_ta::ema_with_alpha(series.close(), 0.2).unwrap();

    assert_series_near(&by_alpha, &expected(), TOLERANCE, "EMA(α=0.2)");
}
