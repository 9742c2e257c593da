use std::fmt::Display;

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, IntoSeries, Ohlcv, Price, PriceSource,
    Result, Series,
    series::{Columns, Feed},
};

/// Configuration for On-Balance Volume ([`Obv`]).
///
/// Only the price source is configurable; volume always comes from
/// [`Ohlcv::volume`].
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Default)]
pub struct ObvConfig {
    source: PriceSource,
}

impl IndicatorConfig for ObvConfig {
    type Builder = ObvConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        ObvConfigBuilder {
            source: PriceSource::Close,
        }
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

impl ObvConfig {
    #[inline]
    #[must_use]
    pub fn source(&self) -> PriceSource {
        self.source
    }
}

impl Display for ObvConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObvConfig({})", self.source)
    }
}

/// Builder for [`ObvConfig`].
pub struct ObvConfigBuilder {
    source: PriceSource,
}

impl ObvConfigBuilder {
    #[inline]
    #[must_use]
    pub fn source(mut self, source: PriceSource) -> Self {
        self.source = source;
        self
    }
}

impl IndicatorConfigBuilder<ObvConfig> for ObvConfigBuilder {
    fn build(self) -> Result<ObvConfig> {
        Ok(ObvConfig {
            source: self.source,
        })
    }
}

/// On-Balance Volume (OBV).
///
/// Running total that adds the bar's volume on an up close, subtracts it on
/// a down close and leaves it unchanged on a flat close. Starts at 0.
///
/// # Example
///
/// ```
/// use chartist_ta::{Obv, ObvConfig};
/// # use chartist_ta::{Ohlcv, Price};
/// #
/// # struct Bar(f64, f64);
/// # impl Ohlcv for Bar {
/// #     fn open(&self) -> Price { self.0 }
/// #     fn high(&self) -> Price { self.0 }
/// #     fn low(&self) -> Price { self.0 }
/// #     fn close(&self) -> Price { self.0 }
/// #     fn volume(&self) -> Option<f64> { Some(self.1) }
/// # }
///
/// let mut obv = Obv::new(ObvConfig::default());
/// assert_eq!(obv.compute(&Bar(10.0, 500.0)), Some(0.0));
/// assert_eq!(obv.compute(&Bar(9.0, 200.0)), Some(-200.0));
/// ```
#[derive(Clone, Debug)]
pub struct Obv {
    config: ObvConfig,
    feed: Feed,
    prev_price: Option<Price>,
    current: Option<Price>,
}

impl Indicator for Obv {
    type Config = ObvConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            feed: Feed::default(),
            prev_price: None,
            current: None,
        }
    }

    fn compute(&mut self, bar: &impl Ohlcv) -> Option<Price> {
        let input = self
            .config
            .source
            .extract(bar)
            .zip(PriceSource::Volume.extract(bar));

        let Some((price, volume)) = self.feed.admit(input) else {
            if self.feed.is_poisoned() {
                self.current = None;
            }
            return self.current;
        };

        let total = self.current.unwrap_or(0.0);
        self.current = Some(match self.prev_price {
            Some(prev) if price > prev => total + volume,
            Some(prev) if price < prev => total - volume,
            _ => total,
        });
        self.prev_price = Some(price);

        self.current
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Display for Obv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OBV({})", self.config.source)
    }
}

/// On-Balance Volume from close and volume columns.
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
/// let out = chartist_ta::obv([10.0, 11.0, 11.0, 10.5], [100_u64, 40, 70, 30]).unwrap();
/// assert_eq!(out, vec![Some(0.0), Some(40.0), Some(40.0), Some(10.0)]);
/// ```
pub fn obv(close: impl IntoSeries, volume: impl IntoSeries) -> Result<Series> {
    let columns = Columns::close_volume(close.into_series(), volume.into_series())?;
    Ok(columns.run::<Obv>(ObvConfig::default()))
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::{
        Error, compute_series,
        test_util::{Bar, bar, hlcv},
    };

    fn close_volume(close: f64, volume: f64) -> Bar {
        hlcv(close, close, close, volume)
    }

    mod computation {
        use super::*;

        #[test]
        fn starts_at_zero() {
            let mut obv = Obv::new(ObvConfig::default());
            assert_eq!(obv.compute(&close_volume(10.0, 999.0)), Some(0.0));
        }

        #[test]
        fn follows_close_direction() {
            let out = obv([10.0, 12.0, 11.0, 11.0, 13.0], [5.0, 10.0, 4.0, 7.0, 2.0]).unwrap();
            assert_eq!(
                out,
                vec![Some(0.0), Some(10.0), Some(6.0), Some(6.0), Some(8.0)]
            );
        }

        #[test]
        fn monotone_rising_closes_never_decrease() {
            let out = obv([1.0, 2.0, 3.0, 4.0, 5.0], [3.0, 1.0, 4.0, 1.0, 5.0]).unwrap();
            let values: Vec<f64> = out.into_iter().flatten().collect();
            assert!(values.windows(2).all(|w| w[1] >= w[0]));
        }

        #[test]
        fn falling_closes_never_increase() {
            let out = obv([5.0, 4.0, 3.0, 2.0, 1.0], [3.0, 1.0, 4.0, 1.0, 5.0]).unwrap();
            assert_eq!(
                out,
                vec![Some(0.0), Some(-1.0), Some(-5.0), Some(-6.0), Some(-11.0)]
            );
        }

        #[test]
        fn flat_series_is_zero() {
            let out = obv([5.0; 6], [100.0; 6]).unwrap();
            assert_eq!(out, vec![Some(0.0); 6]);
        }
    }

    mod missing_volume {
        use super::*;

        #[test]
        fn any_missing_volume_is_all_undefined() {
            let out = obv([1.0, 2.0, 3.0], vec![Some(1.0), None, Some(1.0)]).unwrap();
            assert_eq!(out, vec![None; 3]);
        }

        #[test]
        fn bars_without_volume_are_all_undefined() {
            let bars = [bar(1.0), bar(2.0)];
            let out = compute_series::<Obv, _>(ObvConfig::default(), &bars).unwrap();
            assert_eq!(out, vec![None, None]);
        }

        #[test]
        fn streaming_poisons_on_missing_volume() {
            let mut obv = Obv::new(ObvConfig::default());
            obv.compute(&close_volume(1.0, 10.0));
            assert_eq!(obv.compute(&bar(2.0)), None);
            assert_eq!(obv.compute(&close_volume(3.0, 10.0)), None);
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn shape_mismatch() {
            assert!(matches!(
                obv([1.0, 2.0], [1.0]),
                Err(Error::ShapeMismatch {
                    series: "volume",
                    expected: 2,
                    actual: 1
                })
            ));
        }

        #[test]
        fn empty_input() {
            assert_eq!(
                obv(Vec::<f64>::new(), Vec::<f64>::new()),
                Err(Error::EmptyInput)
            );
        }
    }

    #[test]
    fn display() {
        assert_eq!(Obv::new(ObvConfig::default()).to_string(), "OBV(Close)");
    }
}
