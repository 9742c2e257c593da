use std::fmt::Display;

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, IntoSeries, Ohlcv, Price, PriceSource,
    Result, Series,
    rma::{Rma, RmaConfig},
    series::{Feed, smooth},
    sma::validate_length,
};

/// Configuration for the Relative Strength Index ([`Rsi`]) indicator.
///
/// Defaults to 14 bars on closing price.
///
/// # Example
///
/// ```
/// use chartist_ta::{IndicatorConfig, RsiConfig};
///
/// let config = RsiConfig::default();
/// assert_eq!(config.length(), 14);
/// assert_eq!(config.warm_up(), 13);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct RsiConfig {
    length: usize,
    source: PriceSource,
}

impl IndicatorConfig for RsiConfig {
    type Builder = RsiConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        RsiConfigBuilder::new()
    }

    #[inline]
    fn warm_up(&self) -> usize {
        self.length - 1
    }

    #[inline]
    fn uses_volume(&self) -> bool {
        self.source == PriceSource::Volume
    }
}

impl RsiConfig {
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    #[inline]
    #[must_use]
    pub fn source(&self) -> PriceSource {
        self.source
    }

    /// RSI on closing price.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`](crate::Error::InvalidParameter)
    /// when `length` is zero.
    pub fn close(length: usize) -> Result<Self> {
        Self::builder().length(length).build()
    }
}

impl Default for RsiConfig {
    fn default() -> Self {
        Self {
            length: 14,
            source: PriceSource::Close,
        }
    }
}

impl Display for RsiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RsiConfig({}, {})", self.length, self.source)
    }
}

/// Builder for [`RsiConfig`].
///
/// Defaults: source = [`PriceSource::Close`].
/// Length must be set before calling [`build`](IndicatorConfigBuilder::build).
pub struct RsiConfigBuilder {
    length: Option<usize>,
    source: PriceSource,
}

impl RsiConfigBuilder {
    fn new() -> Self {
        Self {
            length: None,
            source: PriceSource::Close,
        }
    }

    #[inline]
    #[must_use]
    pub fn length(mut self, length: usize) -> Self {
        self.length.replace(length);
        self
    }

    #[inline]
    #[must_use]
    pub fn source(mut self, source: PriceSource) -> Self {
        self.source = source;
        self
    }
}

impl IndicatorConfigBuilder<RsiConfig> for RsiConfigBuilder {
    fn build(self) -> Result<RsiConfig> {
        Ok(RsiConfig {
            length: validate_length(self.length)?,
            source: self.source,
        })
    }
}

/// Relative Strength Index (RSI) with Wilder's smoothing.
///
/// Measures the speed and magnitude of recent price changes on a 0–100
/// scale. The first bar contributes a zero gain and a zero loss, so with
/// Wilder's seed the first value lands on index `length - 1`:
///
/// ```text
/// avg_gain = RMA(gain, length)
/// avg_loss = RMA(loss, length)
/// RSI      = 100 − 100 / (1 + avg_gain / avg_loss)
/// ```
///
/// A zero average loss gives 100, a zero average gain gives 0, and a flat
/// market (both zero) gives 50.
///
/// # Example
///
/// ```
/// use chartist_ta::{Rsi, RsiConfig};
/// # use chartist_ta::{Ohlcv, Price};
/// #
/// # struct Bar(f64);
/// # impl Ohlcv for Bar {
/// #     fn open(&self) -> Price { self.0 }
/// #     fn high(&self) -> Price { self.0 }
/// #     fn low(&self) -> Price { self.0 }
/// #     fn close(&self) -> Price { self.0 }
/// # }
///
/// let mut rsi = Rsi::new(RsiConfig::close(2).unwrap());
///
/// assert_eq!(rsi.compute(&Bar(10.0)), None);
/// // Only gains so far
/// assert_eq!(rsi.compute(&Bar(10.5)), Some(100.0));
/// ```
#[derive(Clone, Debug)]
pub struct Rsi {
    config: RsiConfig,
    avg_gain: Rma,
    avg_loss: Rma,
    feed: Feed,
    prev_price: Option<Price>,
    current: Option<Price>,
}

impl Indicator for Rsi {
    type Config = RsiConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            avg_gain: Rma::new(RmaConfig::validated(config.length)),
            avg_loss: Rma::new(RmaConfig::validated(config.length)),
            feed: Feed::default(),
            prev_price: None,
            current: None,
        }
    }

    #[inline]
    fn compute(&mut self, bar: &impl Ohlcv) -> Option<Price> {
        self.update(self.config.source.extract(bar))
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Rsi {
    /// Feeds one raw value.
    pub(crate) fn update(&mut self, value: Option<Price>) -> Option<Price> {
        let Some(price) = self.feed.admit(value) else {
            if self.feed.is_poisoned() {
                self.current = None;
            }
            return self.current;
        };

        let (gain, loss) = self
            .prev_price
            .map_or((0.0, 0.0), |prev| Self::gain_and_loss(prev, price));
        self.prev_price = Some(price);

        let avg_gain = self.avg_gain.update(Some(gain));
        let avg_loss = self.avg_loss.update(Some(loss));

        self.current = avg_gain
            .zip(avg_loss)
            .map(|(gain, loss)| Self::strength(gain, loss));

        self.current
    }

    #[inline]
    fn gain_and_loss(prev: Price, price: Price) -> (f64, f64) {
        let change = price - prev;
        (change.max(0.0), (-change).max(0.0))
    }

    fn strength(avg_gain: f64, avg_loss: f64) -> Price {
        match (avg_gain == 0.0, avg_loss == 0.0) {
            (true, true) => 50.0,
            (false, true) => 100.0,
            (true, false) => 0.0,
            (false, false) => (100.0 - 100.0 / (1.0 + avg_gain / avg_loss)).clamp(0.0, 100.0),
        }
    }
}

impl Display for Rsi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RSI({}, {})", self.config.length, self.config.source)
    }
}

/// Relative Strength Index of a numeric series.
///
/// # Errors
///
/// [`Error::InvalidParameter`](crate::Error::InvalidParameter) for a zero
/// length, [`Error::EmptyInput`](crate::Error::EmptyInput) for an empty
/// series.
pub fn rsi(values: impl IntoSeries, length: usize) -> Result<Series> {
    let mut rsi = Rsi::new(RsiConfig::close(length)?);
    smooth(values.into_series(), |v| rsi.update(v))
}
