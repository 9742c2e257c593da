use std::fmt::Display;

use crate::{
    Error, Indicator, IndicatorConfig, IndicatorConfigBuilder, IntoSeries, Ohlcv, Price,
    PriceSource, Result, Series,
    price_window::PriceWindow,
    series::{Feed, smooth},
};

/// Configuration for the Simple Moving Average ([`Sma`]) indicator.
///
/// # Example
///
/// ```rust
/// use chartist_ta::{IndicatorConfig, SmaConfig};
///
/// let config = SmaConfig::close(20).unwrap();
/// assert_eq!(config.length(), 20);
/// assert_eq!(config.warm_up(), 19);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct SmaConfig {
    length: usize,
    source: PriceSource,
}

impl IndicatorConfig for SmaConfig {
    type Builder = SmaConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        SmaConfigBuilder::new()
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

impl SmaConfig {
    /// Window length (number of bars).
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    /// Price source extracted from each bar.
    #[inline]
    #[must_use]
    pub fn source(&self) -> PriceSource {
        self.source
    }

    /// SMA on closing price.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] when `length` is zero.
    pub fn close(length: usize) -> Result<Self> {
        Self::builder().length(length).build()
    }

    /// Config for a length validated by an enclosing builder.
    pub(crate) fn validated(length: usize, source: PriceSource) -> Self {
        debug_assert!(length > 0);
        Self { length, source }
    }

    /// SMA on typical price: `(high + low + close) / 3`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] when `length` is zero.
    pub fn typical(length: usize) -> Result<Self> {
        Self::builder()
            .length(length)
            .source(PriceSource::Typical)
            .build()
    }
}

impl Display for SmaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SmaConfig({}, {})", self.length, self.source)
    }
}

/// Builder for [`SmaConfig`].
///
/// Defaults: source = [`PriceSource::Close`].
/// Length must be set before calling [`build`](IndicatorConfigBuilder::build).
pub struct SmaConfigBuilder {
    length: Option<usize>,
    source: PriceSource,
}

impl SmaConfigBuilder {
    fn new() -> Self {
        Self {
            length: None,
            source: PriceSource::Close,
        }
    }

    /// Sets the window length.
    #[inline]
    #[must_use]
    pub fn length(mut self, length: usize) -> Self {
        self.length.replace(length);
        self
    }

    /// Sets the price source.
    #[inline]
    #[must_use]
    pub fn source(mut self, source: PriceSource) -> Self {
        self.source = source;
        self
    }
}

impl IndicatorConfigBuilder<SmaConfig> for SmaConfigBuilder {
    fn build(self) -> Result<SmaConfig> {
        Ok(SmaConfig {
            length: validate_length(self.length)?,
            source: self.source,
        })
    }
}

/// Shared length validation for every windowed config.
pub(crate) fn validate_length(length: Option<usize>) -> Result<usize> {
    match length {
        None => Err(Error::invalid("length", "length is required")),
        Some(0) => Err(Error::invalid("length", "must be at least 1")),
        Some(length) => Ok(length),
    }
}

/// Simple Moving Average (SMA).
///
/// Computes the unweighted mean of the last *n* values, where *n* is the
/// configured window length. Returns `None` until the window is full, so the
/// first value lands on index `n - 1`.
///
/// Uses a running sum for O(1) updates per bar.
///
/// # Example
///
/// ```rust
/// use chartist_ta::{Sma, SmaConfig};
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
/// let mut sma = Sma::new(SmaConfig::close(3).unwrap());
///
/// assert_eq!(sma.compute(&Bar(10.0)), None);
/// assert_eq!(sma.compute(&Bar(20.0)), None);
/// assert_eq!(sma.compute(&Bar(30.0)), Some(20.0));
/// ```
#[derive(Clone, Debug)]
pub struct Sma {
    config: SmaConfig,
    window: PriceWindow,
    length_reciprocal: f64,
    feed: Feed,
    current: Option<Price>,
}

impl Indicator for Sma {
    type Config = SmaConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            window: PriceWindow::new(config.length),
            #[allow(clippy::cast_precision_loss)]
            length_reciprocal: 1.0 / config.length as f64,
            feed: Feed::default(),
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

impl Sma {
    /// Feeds one raw value.
    #[inline]
    pub(crate) fn update(&mut self, value: Option<Price>) -> Option<Price> {
        self.current = match self.feed.admit(value) {
            Some(value) => {
                self.window.push(value);
                self.window.sum().map(|sum| sum * self.length_reciprocal)
            }
            None => None,
        };

        self.current
    }
}

impl Display for Sma {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SMA({}, {})", self.config.length, self.config.source)
    }
}

/// Simple moving average of a numeric series.
///
/// # Errors
///
/// [`Error::InvalidParameter`] for a zero length, [`Error::EmptyInput`] for an
/// empty series.
///
/// # Example
///
/// ```
/// assert_eq!(
///     chartist_ta::sma([1.0, 2.0, 3.0, 4.0], 2).unwrap(),
///     vec![None, Some(1.5), Some(2.5), Some(3.5)],
/// );
/// ```
pub fn sma(values: impl IntoSeries, length: usize) -> Result<Series> {
    let mut sma = Sma::new(SmaConfig::close(length)?);
    smooth(values.into_series(), |v| sma.update(v))
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::test_util::{Bar, assert_approx, bar};

    fn sma_of(length: usize) -> Sma {
        Sma::new(SmaConfig::close(length).unwrap())
    }

    mod filling {
        use super::*;

        #[test]
        fn none_until_window_full() {
            let mut sma = sma_of(3);
            assert_eq!(sma.compute(&bar(10.0)), None);
            assert_eq!(sma.compute(&bar(20.0)), None);
        }

        #[test]
        fn first_value_at_length_minus_one() {
            let out = sma([10.0, 20.0, 30.0, 40.0], 3).unwrap();
            assert_eq!(out, vec![None, None, Some(20.0), Some(30.0)]);
        }

        #[test]
        fn shorter_than_window_is_all_undefined() {
            assert_eq!(sma([1.0, 2.0], 3).unwrap(), vec![None, None]);
        }
    }

    mod computation {
        use super::*;

        #[test]
        fn slides_over_values() {
            let mut sma = sma_of(2);
            sma.compute(&bar(1.0));
            sma.compute(&bar(2.0));
            assert_eq!(sma.compute(&bar(6.0)), Some(4.0));
        }

        #[test]
        fn fractional_mean() {
            let mut sma = sma_of(3);
            sma.compute(&bar(1.0));
            sma.compute(&bar(2.0));
            let v = sma.compute(&bar(2.0)).unwrap();
            assert_approx!(v, 5.0 / 3.0);
        }

        #[test]
        fn length_one_is_identity() {
            let out = sma([3.0, 7.0, 5.0], 1).unwrap();
            assert_eq!(out, vec![Some(3.0), Some(7.0), Some(5.0)]);
        }

        #[test]
        fn uses_configured_source() {
            let mut sma = Sma::new(SmaConfig::typical(1).unwrap());
            // (30 + 6 + 12) / 3 = 16
            assert_eq!(sma.compute(&Bar::new(0.0, 30.0, 6.0, 12.0)), Some(16.0));
        }
    }

    mod undefined_input {
        use super::*;

        #[test]
        fn leading_undefined_shifts_start() {
            let out = sma(vec![None, Some(2.0), Some(4.0)], 2).unwrap();
            assert_eq!(out, vec![None, None, Some(3.0)]);
        }

        #[test]
        fn interior_gap_poisons_whole_series() {
            let out = sma(vec![Some(1.0), Some(2.0), None, Some(4.0)], 2).unwrap();
            assert_eq!(out, vec![None; 4]);
        }

        #[test]
        fn streaming_poisons_after_gap() {
            let mut sma = sma_of(1);
            assert_eq!(sma.update(Some(1.0)), Some(1.0));
            assert_eq!(sma.update(None), None);
            assert_eq!(sma.update(Some(2.0)), None);
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn zero_length_is_invalid() {
            assert!(matches!(
                sma([1.0], 0),
                Err(Error::InvalidParameter { name: "length", .. })
            ));
        }

        #[test]
        fn empty_input() {
            let empty: [f64; 0] = [];
            assert_eq!(sma(empty, 3), Err(Error::EmptyInput));
        }

        #[test]
        fn missing_length_is_invalid() {
            assert!(matches!(
                SmaConfig::builder().build(),
                Err(Error::InvalidParameter {
                    reason: "length is required",
                    ..
                })
            ));
        }
    }

    mod config {
        use super::*;
        use std::collections::HashSet;

        #[test]
        fn default_source_is_close() {
            let config = SmaConfig::close(10).unwrap();
            assert_eq!(config.source(), PriceSource::Close);
        }

        #[test]
        fn eq_and_hash() {
            let a = SmaConfig::close(20).unwrap();
            let b = SmaConfig::close(20).unwrap();
            let c = SmaConfig::close(10).unwrap();

            let mut set = HashSet::new();
            set.insert(a);

            assert!(set.contains(&b));
            assert!(!set.contains(&c));
        }
    }

    mod display {
        use super::*;

        #[test]
        fn formats_correctly() {
            assert_eq!(sma_of(20).to_string(), "SMA(20, Close)");
        }

        #[test]
        fn config_formats_correctly() {
            let config = SmaConfig::typical(20).unwrap();
            assert_eq!(config.to_string(), "SmaConfig(20, Typical)");
        }
    }

    mod clone {
        use super::*;

        #[test]
        fn produces_independent_state() {
            let mut sma = sma_of(2);
            sma.compute(&bar(2.0));
            sma.compute(&bar(4.0));

            let mut cloned = sma.clone();
            assert_eq!(sma.compute(&bar(6.0)), Some(5.0));
            assert_eq!(cloned.value(), Some(3.0));
            assert_eq!(cloned.compute(&bar(10.0)), Some(7.0));
        }
    }
}
