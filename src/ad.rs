use std::fmt::Display;

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, IntoSeries, Ohlcv, Price, Result, Series,
    series::{Columns, Feed, z_score},
};

/// Configuration for the Accumulation/Distribution line ([`Ad`]).
///
/// A/D has no parameters; the config exists so it composes with the other
/// indicators.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Default)]
pub struct AdConfig;

impl IndicatorConfig for AdConfig {
    type Builder = AdConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        AdConfigBuilder
    }

    #[inline]
    fn warm_up(&self) -> usize {
        0
    }

    #[inline]
    fn uses_volume(&self) -> bool {
        true
    }
}

impl Display for AdConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AdConfig")
    }
}

/// Builder for [`AdConfig`].
pub struct AdConfigBuilder;

impl IndicatorConfigBuilder<AdConfig> for AdConfigBuilder {
    fn build(self) -> Result<AdConfig> {
        Ok(AdConfig)
    }
}

/// Accumulation/Distribution line.
///
/// Cumulative sum of the money flow volume, starting with the first bar:
///
/// ```text
/// CMFV = ((close − low) − (high − close)) / (high − low) × volume
/// ```
///
/// A bar with `high == low` contributes nothing.
///
/// # Example
///
/// ```
/// use chartist_ta::{Ad, AdConfig};
/// # use chartist_ta::{Ohlcv, Price};
/// #
/// # struct Bar(f64, f64, f64, f64);
/// # impl Ohlcv for Bar {
/// #     fn open(&self) -> Price { self.2 }
/// #     fn high(&self) -> Price { self.0 }
/// #     fn low(&self) -> Price { self.1 }
/// #     fn close(&self) -> Price { self.2 }
/// #     fn volume(&self) -> Option<f64> { Some(self.3) }
/// # }
///
/// let mut ad = Ad::new(AdConfig);
/// // Close at the high: the whole volume accumulates.
/// assert_eq!(ad.compute(&Bar(12.0, 10.0, 12.0, 300.0)), Some(300.0));
/// // Close at the low: the whole volume distributes.
/// assert_eq!(ad.compute(&Bar(12.0, 10.0, 10.0, 100.0)), Some(200.0));
/// ```
#[derive(Clone, Debug)]
pub struct Ad {
    feed: Feed,
    current: Option<Price>,
}

impl Indicator for Ad {
    type Config = AdConfig;
    type Output = Price;

    fn new(_config: Self::Config) -> Self {
        Self {
            feed: Feed::default(),
            current: None,
        }
    }

    fn compute(&mut self, bar: &impl Ohlcv) -> Option<Price> {
        let input = bar.volume().filter(|v| v.is_finite());

        let Some(volume) = self.feed.admit(input) else {
            if self.feed.is_poisoned() {
                self.current = None;
            }
            return self.current;
        };

        let flow = money_flow_volume(bar.high(), bar.low(), bar.close(), volume);
        self.current = Some(self.current.unwrap_or(0.0) + flow);

        self.current
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

#[inline]
fn money_flow_volume(high: Price, low: Price, close: Price, volume: f64) -> f64 {
    let range = high - low;
    if range == 0.0 {
        return 0.0;
    }
    ((close - low) - (high - close)) / range * volume
}

impl Display for Ad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AD")
    }
}

/// Batch A/D output.
#[derive(Clone, Debug, PartialEq)]
pub struct AdSeries {
    /// Cumulative A/D line.
    pub line: Series,
    /// Whole-series Z-score of the line, sample deviation.
    pub zscore: Series,
}

/// Accumulation/Distribution from high, low, close and volume columns.
///
/// A single missing volume makes both outputs undefined everywhere.
///
/// # Errors
///
/// [`Error::EmptyInput`](crate::Error::EmptyInput) for empty input,
/// [`Error::ShapeMismatch`](crate::Error::ShapeMismatch) for columns of
/// different lengths.
///
/// # Example
///
/// ```
/// let out = chartist_ta::ad([10.0], [10.0], [10.0], [1000.0]).unwrap();
/// assert_eq!(out.line, vec![Some(0.0)]);
/// assert_eq!(out.zscore, vec![None]);
/// ```
pub fn ad(
    high: impl IntoSeries,
    low: impl IntoSeries,
    close: impl IntoSeries,
    volume: impl IntoSeries,
) -> Result<AdSeries> {
    let columns = Columns::new(
        high.into_series(),
        low.into_series(),
        close.into_series(),
        Some(volume.into_series()),
    )?;

    let line = columns.run::<Ad>(AdConfig);
    let zscore = z_score(&line);

    Ok(AdSeries { line, zscore })
}

/// Whole-series Z-score of `close × volume`, sample deviation.
///
/// # Errors
///
/// [`Error::EmptyInput`](crate::Error::EmptyInput) for empty input,
/// [`Error::ShapeMismatch`](crate::Error::ShapeMismatch) when the columns
/// differ in length.
///
/// # Example
///
/// ```
/// let z = chartist_ta::price_volume_zscore([1.0, 2.0, 3.0], [1.0, 1.0, 1.0]).unwrap();
/// assert_eq!(z, vec![Some(-1.0), Some(0.0), Some(1.0)]);
/// ```
pub fn price_volume_zscore(close: impl IntoSeries, volume: impl IntoSeries) -> Result<Series> {
    let columns = Columns::close_volume(close.into_series(), volume.into_series())?;

    let Some(bars) = columns.bars() else {
        tracing::debug!(
            len = columns.len(),
            "price/volume input has missing values; whole output is undefined"
        );
        return Ok(vec![None; columns.len()]);
    };

    let products: Series = bars
        .iter()
        .map(|bar| bar.volume().map(|volume| bar.close() * volume))
        .collect();

    Ok(z_score(&products))
}
