use std::fmt::Display;

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, IntoSeries, Ohlcv, Price, Result, Series,
    price_source::typical_price,
    price_window::PriceWindow,
    series::{Columns, Feed},
    sma::validate_length,
};

/// Configuration for the Money Flow Index ([`Mfi`]).
///
/// Defaults to 14 bars. Always uses typical price and volume.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct MfiConfig {
    length: usize,
}

impl IndicatorConfig for MfiConfig {
    type Builder = MfiConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        MfiConfigBuilder { length: None }
    }

    /// One flow per bar after the first, so `length` bars are undefined.
    #[inline]
    fn warm_up(&self) -> usize {
        self.length
    }

    #[inline]
    fn uses_volume(&self) -> bool {
        true
    }
}

impl MfiConfig {
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`](crate::Error::InvalidParameter)
    /// when `length` is zero.
    pub fn with_length(length: usize) -> Result<Self> {
        Self::builder().length(length).build()
    }
}

impl Default for MfiConfig {
    fn default() -> Self {
        Self { length: 14 }
    }
}

impl Display for MfiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MfiConfig({})", self.length)
    }
}

/// Builder for [`MfiConfig`].
pub struct MfiConfigBuilder {
    length: Option<usize>,
}

impl MfiConfigBuilder {
    #[inline]
    #[must_use]
    pub fn length(mut self, length: usize) -> Self {
        self.length.replace(length);
        self
    }
}

impl IndicatorConfigBuilder<MfiConfig> for MfiConfigBuilder {
    fn build(self) -> Result<MfiConfig> {
        Ok(MfiConfig {
            length: validate_length(self.length)?,
        })
    }
}

/// Money Flow Index (MFI).
///
/// A volume-weighted RSI over typical price. Each bar after the first
/// produces a raw money flow `typical × volume`, counted as positive when
/// the typical price rose, negative when it fell, and neither when it was
/// unchanged:
///
/// ```text
/// MFI = 100 × Σ positive / (Σ positive + Σ negative)
/// ```
///
/// over the trailing `length` flows. A window with no flow at all is
/// undefined.
#[derive(Clone, Debug)]
pub struct Mfi {
    config: MfiConfig,
    positive: PriceWindow,
    negative: PriceWindow,
    feed: Feed,
    prev_typical: Option<Price>,
    current: Option<Price>,
}

impl Indicator for Mfi {
    type Config = MfiConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            positive: PriceWindow::new(config.length),
            negative: PriceWindow::new(config.length),
            feed: Feed::default(),
            prev_typical: None,
            current: None,
        }
    }

    fn compute(&mut self, bar: &impl Ohlcv) -> Option<Price> {
        let typical = typical_price(bar);
        let input = typical
            .is_finite()
            .then_some(typical)
            .zip(bar.volume().filter(|v| v.is_finite()));

        let Some((typical, volume)) = self.feed.admit(input) else {
            if self.feed.is_poisoned() {
                self.current = None;
            }
            return self.current;
        };

        if let Some(prev) = self.prev_typical {
            let flow = typical * volume;
            let (positive, negative) = match typical.partial_cmp(&prev) {
                Some(std::cmp::Ordering::Greater) => (flow, 0.0),
                Some(std::cmp::Ordering::Less) => (0.0, flow),
                _ => (0.0, 0.0),
            };
            self.positive.push(positive);
            self.negative.push(negative);
        }
        self.prev_typical = Some(typical);

        self.current = self
            .positive
            .exact_sum()
            .zip(self.negative.exact_sum())
            .and_then(|(positive, negative)| {
                let total = positive + negative;
                (total != 0.0).then(|| 100.0 * positive / total)
            });

        self.current
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Display for Mfi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MFI({})", self.config.length)
    }
}

/// Money Flow Index from high, low, close and volume columns.
///
/// # Errors
///
/// [`Error::InvalidParameter`](crate::Error::InvalidParameter) for a zero
/// length, [`Error::EmptyInput`](crate::Error::EmptyInput) for empty input,
/// [`Error::ShapeMismatch`](crate::Error::ShapeMismatch) for columns of
/// different lengths.
pub fn mfi(
    high: impl IntoSeries,
    low: impl IntoSeries,
    close: impl IntoSeries,
    volume: impl IntoSeries,
    length: usize,
) -> Result<Series> {
    let config = MfiConfig::with_length(length)?;
    let columns = Columns::new(
        high.into_series(),
        low.into_series(),
        close.into_series(),
        Some(volume.into_series()),
    )?;

    Ok(columns.run::<Mfi>(config))
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::{
        Error,
        test_util::{assert_approx, bar, hlcv},
    };

    fn mfi_of(length: usize) -> Mfi {
        Mfi::new(MfiConfig::with_length(length).unwrap())
    }

    mod warm_up {
        use super::*;

        #[test]
        fn undefined_for_first_length_bars() {
            let out = mfi(
                [3.0, 4.0, 5.0, 6.0],
                [1.0, 2.0, 3.0, 4.0],
                [2.0, 3.0, 4.0, 5.0],
                [10.0; 4],
                3,
            )
            .unwrap();
            assert_eq!(out[..3], [None, None, None]);
            assert_eq!(out[3], Some(100.0));
        }
    }

    mod computation {
        use super::*;

        #[test]
        fn splits_positive_and_negative_flow() {
            let mut mfi = mfi_of(2);
            // typical prices 10, 12, 9
            mfi.compute(&hlcv(10.0, 10.0, 10.0, 1.0));
            mfi.compute(&hlcv(12.0, 12.0, 12.0, 2.0));
            let value = mfi.compute(&hlcv(9.0, 9.0, 9.0, 4.0)).unwrap();
            // positive 24, negative 36
            assert_approx!(value, 40.0);
        }

        #[test]
        fn window_slides() {
            let mut mfi = mfi_of(1);
            mfi.compute(&hlcv(10.0, 10.0, 10.0, 1.0));
            assert_eq!(mfi.compute(&hlcv(11.0, 11.0, 11.0, 1.0)), Some(100.0));
            assert_eq!(mfi.compute(&hlcv(10.0, 10.0, 10.0, 1.0)), Some(0.0));
        }

        #[test]
        fn unchanged_typical_price_is_undefined() {
            let mut mfi = mfi_of(1);
            mfi.compute(&hlcv(10.0, 10.0, 10.0, 1.0));
            assert_eq!(mfi.compute(&hlcv(10.0, 10.0, 10.0, 1.0)), None);
        }

        #[test]
        fn zero_volume_window_is_undefined() {
            let mut mfi = mfi_of(1);
            mfi.compute(&hlcv(10.0, 10.0, 10.0, 0.0));
            assert_eq!(mfi.compute(&hlcv(11.0, 11.0, 11.0, 0.0)), None);
        }
    }

    mod missing_volume {
        use super::*;

        #[test]
        fn missing_volume_is_all_undefined() {
            let out = mfi(
                [1.0, 2.0, 3.0],
                [1.0, 2.0, 3.0],
                [1.0, 2.0, 3.0],
                vec![Some(5.0), Some(5.0), None],
                1,
            )
            .unwrap();
            assert_eq!(out, vec![None; 3]);
        }

        #[test]
        fn streaming_poisons() {
            let mut mfi = mfi_of(1);
            mfi.compute(&hlcv(10.0, 10.0, 10.0, 1.0));
            assert_eq!(mfi.compute(&bar(11.0)), None);
            assert_eq!(mfi.compute(&hlcv(12.0, 12.0, 12.0, 1.0)), None);
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn zero_length() {
            assert!(matches!(
                mfi([1.0], [1.0], [1.0], [1.0], 0),
                Err(Error::InvalidParameter { name: "length", .. })
            ));
        }

        #[test]
        fn mismatched_high() {
            assert!(matches!(
                mfi([1.0, 2.0], [1.0], [1.0], [1.0], 1),
                Err(Error::ShapeMismatch { series: "high", .. })
            ));
        }
    }

    #[test]
    fn display() {
        assert_eq!(Mfi::new(MfiConfig::default()).to_string(), "MFI(14)");
    }
}
