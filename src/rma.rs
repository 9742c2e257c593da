use std::fmt::Display;

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, IntoSeries, Ohlcv, Price, PriceSource,
    Result, Series,
    series::{Feed, smooth},
    sma::validate_length,
};

/// Configuration for Wilder's running moving average ([`Rma`]).
///
/// Also known as SMMA. Used internally by RSI and ADX.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct RmaConfig {
    length: usize,
    source: PriceSource,
}

impl IndicatorConfig for RmaConfig {
    type Builder = RmaConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        RmaConfigBuilder::new()
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

impl RmaConfig {
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

    pub(crate) fn validated(length: usize) -> Self {
        debug_assert!(length > 0);
        Self {
            length,
            source: PriceSource::Close,
        }
    }

    /// RMA on closing price.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`](crate::Error::InvalidParameter)
    /// when `length` is zero.
    pub fn close(length: usize) -> Result<Self> {
        Self::builder().length(length).build()
    }
}

impl Display for RmaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RmaConfig({}, {})", self.length, self.source)
    }
}

/// Builder for [`RmaConfig`].
pub struct RmaConfigBuilder {
    length: Option<usize>,
    source: PriceSource,
}

impl RmaConfigBuilder {
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

impl IndicatorConfigBuilder<RmaConfig> for RmaConfigBuilder {
    fn build(self) -> Result<RmaConfig> {
        Ok(RmaConfig {
            length: validate_length(self.length)?,
            source: self.source,
        })
    }
}

/// Wilder's running moving average.
///
/// Seeded with the arithmetic mean of the first *n* values, which lands on
/// index `n - 1`. Each later value is:
///
/// ```text
/// RMA = ((n − 1) × prev_RMA + value) / n
/// ```
///
/// Equivalent to an EMA with `α = 1 / n` once seeded.
#[derive(Clone, Debug)]
pub struct Rma {
    config: RmaConfig,
    length_reciprocal: f64,
    retain: f64,
    seed_sum: Price,
    seen: usize,
    feed: Feed,
    current: Option<Price>,
}

impl Indicator for Rma {
    type Config = RmaConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let length = config.length as f64;
        Self {
            config,
            length_reciprocal: 1.0 / length,
            retain: (length - 1.0) / length,
            seed_sum: 0.0,
            seen: 0,
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

impl Rma {
    /// Feeds one raw value.
    #[inline]
    pub(crate) fn update(&mut self, value: Option<Price>) -> Option<Price> {
        let Some(value) = self.feed.admit(value) else {
            if self.feed.is_poisoned() {
                self.current = None;
            }
            return self.current;
        };

        self.current = match self.current {
            Some(previous) => Some(previous.mul_add(self.retain, value * self.length_reciprocal)),
            None => {
                self.seed_sum += value;
                self.seen += 1;
                (self.seen == self.config.length).then(|| self.seed_sum * self.length_reciprocal)
            }
        };

        self.current
    }
}

impl Display for Rma {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RMA({}, {})", self.config.length, self.config.source)
    }
}

/// Wilder's running moving average of a numeric series.
///
/// # Errors
///
/// [`Error::InvalidParameter`](crate::Error::InvalidParameter) for a zero
/// length, [`Error::EmptyInput`](crate::Error::EmptyInput) for an empty
/// series.
///
/// # Example
///
/// ```
/// let out = chartist_ta::rma([2.0, 4.0, 6.0, 10.0], 2).unwrap();
/// // seed (2 + 4) / 2 = 3, then (3 + 6) / 2 = 4.5, then (4.5 + 10) / 2 = 7.25
/// assert_eq!(out, vec![None, Some(3.0), Some(4.5), Some(7.25)]);
/// ```
pub fn rma(values: impl IntoSeries, length: usize) -> Result<Series> {
    let mut rma = Rma::new(RmaConfig::close(length)?);
    smooth(values.into_series(), |v| rma.update(v))
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::{Error, test_util::{assert_approx, bar}};

    fn rma_of(length: usize) -> Rma {
        Rma::new(RmaConfig::close(length).unwrap())
    }

    mod seeding {
        use super::*;

        #[test]
        fn seeded_with_mean_at_length_minus_one() {
            let mut rma = rma_of(3);
            assert_eq!(rma.compute(&bar(3.0)), None);
            assert_eq!(rma.compute(&bar(6.0)), None);
            assert_eq!(rma.compute(&bar(9.0)), Some(6.0));
        }

        #[test]
        fn shorter_than_length_is_all_undefined() {
            assert_eq!(rma([1.0, 2.0, 3.0], 4).unwrap(), vec![None; 3]);
        }

        #[test]
        fn leading_undefined_shifts_seed() {
            let out = rma(vec![None, Some(2.0), Some(4.0), Some(8.0)], 2).unwrap();
            assert_eq!(out, vec![None, None, Some(3.0), Some(5.5)]);
        }
    }

    mod computation {
        use super::*;

        #[test]
        fn wilder_recurrence() {
            let mut rma = rma_of(4);
            for v in [4.0, 4.0, 4.0, 4.0] {
                rma.compute(&bar(v));
            }
            // (3 * 4 + 8) / 4 = 5
            assert_eq!(rma.compute(&bar(8.0)), Some(5.0));
            // (3 * 5 + 1) / 4 = 4
            assert_eq!(rma.compute(&bar(1.0)), Some(4.0));
        }

        #[test]
        fn length_one_is_identity() {
            let out = rma([5.0, 1.0, 3.5], 1).unwrap();
            assert_eq!(out, vec![Some(5.0), Some(1.0), Some(3.5)]);
        }

        #[test]
        fn fractional_step() {
            let out = rma([1.0, 2.0, 3.0, 5.0], 3).unwrap();
            // seed 2, then (2 * 2 + 5) / 3 = 3
            assert_approx!(out[3].unwrap(), 3.0);
        }
    }

    mod undefined_input {
        use super::*;

        #[test]
        fn interior_gap_poisons_whole_series() {
            let out = rma(vec![Some(1.0), None, Some(1.0), Some(1.0)], 2).unwrap();
            assert_eq!(out, vec![None; 4]);
        }

        #[test]
        fn streaming_poisons_after_gap() {
            let mut rma = rma_of(1);
            assert_eq!(rma.update(Some(2.0)), Some(2.0));
            assert_eq!(rma.update(None), None);
            assert_eq!(rma.update(Some(2.0)), None);
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn zero_length_is_invalid() {
            assert!(matches!(
                rma([1.0, 2.0], 0),
                Err(Error::InvalidParameter { name: "length", .. })
            ));
        }

        #[test]
        fn empty_input() {
            assert_eq!(rma(Vec::<f64>::new(), 2), Err(Error::EmptyInput));
        }
    }

    mod display {
        use super::*;

        #[test]
        fn formats_correctly() {
            assert_eq!(rma_of(14).to_string(), "RMA(14, Close)");
        }
    }
}
