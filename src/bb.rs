use std::{
    fmt::Display,
    hash::{Hash, Hasher},
};

use crate::{
    Error, Indicator, IndicatorConfig, IndicatorConfigBuilder, IntoSeries, Ohlcv, Price,
    PriceSource, Result, Series,
    price_window::{PriceWindow, PriceWindowWithSumOfSquares},
    series::{Columns, Feed, project, smooth},
    sma::{Sma, SmaConfig, validate_length},
};

/// Standard deviation multiplier for Bollinger Bands.
///
/// Wraps a finite, positive `f64`. Defaults to `2.0` (the standard Bollinger
/// Bands setting).
///
/// Implements `Eq` and `Hash` via bit-level comparison, which is safe because
/// NaN is rejected at construction.
#[derive(Clone, Copy, Debug)]
pub struct StdDev(f64);

impl StdDev {
    /// Creates a new standard deviation multiplier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `value` is zero, negative,
    /// infinite or NaN.
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(Error::invalid("std_dev", "must be finite and positive"))
        }
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for StdDev {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for StdDev {}

impl Hash for StdDev {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl Default for StdDev {
    fn default() -> Self {
        Self(2.0)
    }
}

/// Configuration for the Bollinger Bands ([`Bb`]) indicator.
///
/// # Example
///
/// ```
/// use chartist_ta::{BbConfig, IndicatorConfig, PriceSource};
///
/// // Default: length 20, typical price, 2.0 std devs
/// let config = BbConfig::default();
///
/// assert_eq!(config.length(), 20);
/// assert_eq!(config.source(), PriceSource::Typical);
/// assert_eq!(config.warm_up(), 20);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct BbConfig {
    length: usize,
    source: PriceSource,
    std_dev: StdDev,
}

impl IndicatorConfig for BbConfig {
    type Builder = BbConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        BbConfigBuilder::new()
    }

    /// The bands need a full window of preceding values.
    #[inline]
    fn warm_up(&self) -> usize {
        self.length
    }

    #[inline]
    fn uses_volume(&self) -> bool {
        self.source == PriceSource::Volume
    }
}

impl BbConfig {
    /// Window length (number of bars).
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

    /// Standard deviation multiplier for the upper and lower bands.
    #[inline]
    #[must_use]
    pub fn std_dev(&self) -> StdDev {
        self.std_dev
    }

    /// BB with custom length on typical price, 2σ.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] when `length` is zero.
    pub fn typical(length: usize) -> Result<Self> {
        Self::builder().length(length).build()
    }
}

impl Default for BbConfig {
    fn default() -> Self {
        Self {
            length: 20,
            source: PriceSource::Typical,
            std_dev: StdDev::default(),
        }
    }
}

impl Display for BbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BbConfig({}, {}, {})",
            self.length,
            self.source,
            self.std_dev.value()
        )
    }
}

/// Builder for [`BbConfig`].
///
/// Defaults: source = [`PriceSource::Typical`],
/// `std_dev` = `2.0`.
/// Length must be set before calling
/// [`build`](IndicatorConfigBuilder::build).
pub struct BbConfigBuilder {
    length: Option<usize>,
    source: PriceSource,
    std_dev: StdDev,
}

impl BbConfigBuilder {
    fn new() -> Self {
        Self {
            length: None,
            source: PriceSource::Typical,
            std_dev: StdDev::default(),
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

    #[inline]
    #[must_use]
    pub fn std_dev(mut self, std_dev: StdDev) -> Self {
        self.std_dev = std_dev;
        self
    }
}

impl IndicatorConfigBuilder<BbConfig> for BbConfigBuilder {
    fn build(self) -> Result<BbConfig> {
        Ok(BbConfig {
            length: validate_length(self.length)?,
            source: self.source,
            std_dev: self.std_dev,
        })
    }
}

/// Bollinger Bands output: middle band and, once defined, the outer bands.
///
/// ```text
/// upper  = SMA + k × σ
/// middle = SMA
/// lower  = SMA − k × σ
/// ```
///
/// `σ` is the population standard deviation of the `length` values before
/// the current bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BbValue {
    middle: Price,
    bands: Option<(Price, Price)>,
}

impl BbValue {
    /// Upper band: `SMA + k × σ`.
    #[inline]
    #[must_use]
    pub fn upper(&self) -> Option<Price> {
        self.bands.map(|(upper, _)| upper)
    }

    /// Middle band: SMA of the window.
    #[inline]
    #[must_use]
    pub fn middle(&self) -> Price {
        self.middle
    }

    /// Lower band: `SMA − k × σ`.
    #[inline]
    #[must_use]
    pub fn lower(&self) -> Option<Price> {
        self.bands.map(|(_, lower)| lower)
    }

    /// Band width: `upper − lower`.
    ///
    /// Narrow width indicates consolidation (Bollinger squeeze); wide width
    /// indicates high volatility.
    #[inline]
    #[must_use]
    pub fn width(&self) -> Option<f64> {
        self.bands.map(|(upper, lower)| upper - lower)
    }
}

impl Display for BbValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.bands {
            Some((upper, lower)) => {
                write!(f, "BB(u: {upper}, m: {}, l: {lower})", self.middle)
            }
            None => write!(f, "BB(u: -, m: {}, l: -)", self.middle),
        }
    }
}

/// Bollinger Bands (BB).
///
/// A volatility indicator consisting of three bands: a simple moving average
/// (middle) with upper and lower bands offset by a configurable number of
/// standard deviations.
///
/// The middle band is the shared [`Sma`], so it is bit-identical to a plain
/// SMA of the same source. The deviation is taken over the preceding window,
/// so the current bar never widens its own bands: the middle band is defined
/// from bar `length − 1` and the outer bands from bar `length`.
///
/// Uses a running sum and sum of squares for O(1) updates per bar.
///
/// # Example
///
/// ```
/// use chartist_ta::{Bb, BbConfig};
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
/// let mut bb = Bb::new(BbConfig::typical(2).unwrap());
///
/// assert_eq!(bb.compute(&Bar(3.0)), None);
/// assert_eq!(bb.compute(&Bar(5.0)).unwrap().upper(), None);
///
/// // Preceding window [3, 5]: σ = 1, middle = SMA[5, 7] = 6
/// let value = bb.compute(&Bar(7.0)).unwrap();
/// assert_eq!(value.upper(), Some(8.0));
/// assert_eq!(value.lower(), Some(4.0));
/// ```
#[derive(Clone, Debug)]
pub struct Bb {
    config: BbConfig,
    std_dev_multiplier: f64,
    middle: Sma,
    preceding: PriceWindowWithSumOfSquares,
    feed: Feed,
    current: Option<BbValue>,
}

impl Indicator for Bb {
    type Config = BbConfig;
    type Output = BbValue;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            std_dev_multiplier: config.std_dev.0,
            middle: Sma::new(SmaConfig::validated(config.length, config.source)),
            preceding: PriceWindow::with_sum_of_squares(config.length),
            feed: Feed::default(),
            current: None,
        }
    }

    #[inline]
    fn compute(&mut self, bar: &impl Ohlcv) -> Option<Self::Output> {
        self.update(self.config.source.extract(bar))
    }

    #[inline]
    fn value(&self) -> Option<Self::Output> {
        self.current
    }
}

impl Bb {
    /// Feeds one raw value.
    pub(crate) fn update(&mut self, value: Option<Price>) -> Option<BbValue> {
        let Some(value) = self.feed.admit(value) else {
            if self.feed.is_poisoned() {
                self.current = None;
            }
            return self.current;
        };

        let spread = self
            .preceding
            .mean_and_std_dev()
            .map(|(_, std_dev)| std_dev * self.std_dev_multiplier);
        self.preceding.push(value);

        self.current = self.middle.update(Some(value)).map(|middle| BbValue {
            middle,
            bands: spread.map(|spread| (middle + spread, middle - spread)),
        });

        self.current
    }
}

impl Display for Bb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BB({}, {}, {})",
            self.config.length, self.config.source, self.std_dev_multiplier,
        )
    }
}

/// Batch Bollinger Bands output.
#[derive(Clone, Debug, PartialEq)]
pub struct BollingerSeries {
    pub upper: Series,
    pub middle: Series,
    pub lower: Series,
}

impl BollingerSeries {
    fn from_values(values: &[Option<BbValue>]) -> Self {
        Self {
            upper: project(values, BbValue::upper),
            middle: project(values, |v| Some(v.middle)),
            lower: project(values, BbValue::lower),
        }
    }
}

/// Bollinger Bands on the typical price of high, low and close columns.
///
/// # Errors
///
/// [`Error::InvalidParameter`] for a zero length or a multiplier that is not
/// finite and positive, [`Error::EmptyInput`] for empty input,
/// [`Error::ShapeMismatch`] for columns of different lengths.
pub fn bollinger(
    high: impl IntoSeries,
    low: impl IntoSeries,
    close: impl IntoSeries,
    length: usize,
    multiplier: f64,
) -> Result<BollingerSeries> {
    let config = BbConfig::builder()
        .length(length)
        .std_dev(StdDev::new(multiplier)?)
        .build()?;
    let columns = Columns::new(
        high.into_series(),
        low.into_series(),
        close.into_series(),
        None,
    )?;

    Ok(BollingerSeries::from_values(&columns.run::<Bb>(config)))
}

/// Bollinger Bands on an arbitrary numeric series.
///
/// # Errors
///
/// Same as [`bollinger`], without the shape check.
///
/// # Example
///
/// ```
/// let out = chartist_ta::bollinger_series([3.0, 5.0, 7.0], 2, 2.0).unwrap();
/// assert_eq!(out.middle, vec![None, Some(4.0), Some(6.0)]);
/// assert_eq!(out.upper, vec![None, None, Some(8.0)]);
/// ```
pub fn bollinger_series(
    values: impl IntoSeries,
    length: usize,
    multiplier: f64,
) -> Result<BollingerSeries> {
    let config = BbConfig::builder()
        .length(length)
        .source(PriceSource::Close)
        .std_dev(StdDev::new(multiplier)?)
        .build()?;

    let mut bb = Bb::new(config);
    let values = smooth(values.into_series(), |v| bb.update(v))?;

    Ok(BollingerSeries::from_values(&values))
}
