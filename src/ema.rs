use std::{
    fmt::Display,
    hash::{Hash, Hasher},
};

use crate::{
    Error, Indicator, IndicatorConfig, IndicatorConfigBuilder, IntoSeries, Ohlcv, Price,
    PriceSource, Result, Series,
    series::{Feed, smooth},
    sma::validate_length,
};

/// EMA smoothing constant.
///
/// Wraps a finite `f64` in `(0, 1]`. Implements `Eq` and `Hash` via bit-level
/// comparison, which is safe because NaN is rejected at construction.
#[derive(Clone, Copy, Debug)]
pub struct Alpha(f64);

impl Alpha {
    /// Creates a smoothing constant.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] unless `0 < value <= 1`.
    pub fn new(value: f64) -> Result<Self> {
        if value > 0.0 && value <= 1.0 {
            Ok(Self(value))
        } else {
            Err(Error::invalid("alpha", "must be in (0, 1]"))
        }
    }

    /// Standard EMA constant for a period: `2 / (length + 1)`.
    #[allow(clippy::cast_precision_loss)]
    fn for_length(length: usize) -> Self {
        Self(2.0 / (length + 1) as f64)
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for Alpha {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Alpha {}

impl Hash for Alpha {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// Configuration for the Exponential Moving Average ([`Ema`]) indicator.
///
/// The smoothing constant defaults to `2 / (length + 1)`. An explicit
/// [`Alpha`] overrides it; in that case the length is optional.
///
/// # Example
///
/// ```
/// use chartist_ta::{EmaConfig, IndicatorConfig, IndicatorConfigBuilder};
///
/// let config = EmaConfig::builder().length(3).build().unwrap();
///
/// assert_eq!(config.length(), Some(3));
/// assert_eq!(config.alpha().value(), 0.5);
/// assert_eq!(config.warm_up(), 0);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct EmaConfig {
    length: Option<usize>,
    alpha: Alpha,
    source: PriceSource,
}

impl IndicatorConfig for EmaConfig {
    type Builder = EmaConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        EmaConfigBuilder::new()
    }

    /// The EMA is seeded with the first value, so nothing is undefined.
    #[inline]
    fn warm_up(&self) -> usize {
        0
    }

    #[inline]
    fn uses_volume(&self) -> bool {
        self.source == PriceSource::Volume
    }
}

impl EmaConfig {
    /// Period the config was built from, if any.
    #[inline]
    #[must_use]
    pub fn length(&self) -> Option<usize> {
        self.length
    }

    /// Resolved smoothing constant.
    #[inline]
    #[must_use]
    pub fn alpha(&self) -> Alpha {
        self.alpha
    }

    /// Price source extracted from each bar.
    #[inline]
    #[must_use]
    pub fn source(&self) -> PriceSource {
        self.source
    }

    /// EMA on closing price.
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
        Self {
            length: Some(length),
            alpha: Alpha::for_length(length),
            source,
        }
    }

    /// EMA on traded volume.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] when `length` is zero.
    pub fn volume(length: usize) -> Result<Self> {
        Self::builder()
            .length(length)
            .source(PriceSource::Volume)
            .build()
    }
}

impl Display for EmaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.length {
            Some(length) => write!(f, "EmaConfig({length}, {})", self.source),
            None => write!(f, "EmaConfig(α={}, {})", self.alpha.0, self.source),
        }
    }
}

/// Builder for [`EmaConfig`].
///
/// Defaults: source = [`PriceSource::Close`].
/// Either a length or an explicit alpha must be set before calling
/// [`build`](IndicatorConfigBuilder::build).
pub struct EmaConfigBuilder {
    length: Option<usize>,
    alpha: Option<Alpha>,
    source: PriceSource,
}

impl EmaConfigBuilder {
    fn new() -> Self {
        Self {
            length: None,
            alpha: None,
            source: PriceSource::Close,
        }
    }

    /// Sets the period; alpha becomes `2 / (length + 1)` unless overridden.
    #[inline]
    #[must_use]
    pub fn length(mut self, length: usize) -> Self {
        self.length.replace(length);
        self
    }

    /// Overrides the smoothing constant.
    #[inline]
    #[must_use]
    pub fn alpha(mut self, alpha: Alpha) -> Self {
        self.alpha.replace(alpha);
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

impl IndicatorConfigBuilder<EmaConfig> for EmaConfigBuilder {
    fn build(self) -> Result<EmaConfig> {
        let (length, alpha) = match (self.length, self.alpha) {
            (None, Some(alpha)) => (None, alpha),
            (length, alpha) => {
                let length = validate_length(length)?;
                (Some(length), alpha.unwrap_or(Alpha::for_length(length)))
            }
        };

        Ok(EmaConfig {
            length,
            alpha,
            source: self.source,
        })
    }
}

/// Exponential Moving Average (EMA).
///
/// A weighted moving average that gives more weight to recent values. The
/// first defined value seeds the average, so output is defined from that
/// index onward. Each later value is:
///
/// ```text
/// EMA = α × value + (1 − α) × prev_EMA
/// ```
///
/// With `α = 1` the EMA is the identity.
///
/// # Example
///
/// ```
/// use chartist_ta::{Ema, EmaConfig};
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
/// let mut ema = Ema::new(EmaConfig::close(3).unwrap());
///
/// // Seed: the first value
/// assert_eq!(ema.compute(&Bar(4.0)), Some(4.0));
///
/// // EMA(3) α = 0.5: 8 × 0.5 + 4 × 0.5 = 6.0
/// assert_eq!(ema.compute(&Bar(8.0)), Some(6.0));
/// ```
#[derive(Clone, Debug)]
pub struct Ema {
    config: EmaConfig,
    alpha: f64,
    retain: f64,
    feed: Feed,
    current: Option<Price>,
}

impl Indicator for Ema {
    type Config = EmaConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            alpha: config.alpha.0,
            retain: 1.0 - config.alpha.0,
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

impl Ema {
    /// Feeds one raw value.
    #[inline]
    #[allow(clippy::float_cmp)]
    pub(crate) fn update(&mut self, value: Option<Price>) -> Option<Price> {
        self.current = match self.feed.admit(value) {
            Some(value) => Some(match self.current {
                // Steady input must not drift.
                Some(previous) if previous == value => previous,
                Some(previous) => self.alpha * value + self.retain * previous,
                None => value,
            }),
            None if self.feed.is_poisoned() => None,
            None => self.current,
        };

        self.current
    }
}

impl Display for Ema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.config.length {
            Some(length) => write!(f, "EMA({length}, {})", self.config.source),
            None => write!(f, "EMA(α={}, {})", self.alpha, self.config.source),
        }
    }
}

/// Exponential moving average of a numeric series with `α = 2 / (length + 1)`.
///
/// # Errors
///
/// [`Error::InvalidParameter`] for a zero length, [`Error::EmptyInput`] for an
/// empty series.
///
/// # Example
///
/// ```
/// let out = chartist_ta::ema([10.0, 11.0, 12.0], 2).unwrap();
/// assert_eq!(out[0], Some(10.0));
/// assert!((out[2].unwrap() - 11.5556).abs() < 1e-4);
/// ```
pub fn ema(values: impl IntoSeries, length: usize) -> Result<Series> {
    run(values, EmaConfig::close(length)?)
}

/// Exponential moving average of a numeric series with an explicit smoothing
/// constant.
///
/// # Errors
///
/// [`Error::InvalidParameter`] unless `0 < alpha <= 1`, [`Error::EmptyInput`]
/// for an empty series.
pub fn ema_with_alpha(values: impl IntoSeries, alpha: f64) -> Result<Series> {
    run(values, EmaConfig::builder().alpha(Alpha::new(alpha)?).build()?)
}

fn run(values: impl IntoSeries, config: EmaConfig) -> Result<Series> {
    let mut ema = Ema::new(config);
    smooth(values.into_series(), |v| ema.update(v))
}
