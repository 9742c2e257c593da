use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{
    Error, Indicator, IndicatorConfig, IndicatorConfigBuilder, IntoSeries, Ohlcv, Price,
    PriceSource, Result, Series,
    ema::{Ema, EmaConfig},
    series::{Feed, project, smooth},
    sma::validate_length,
};

/// How the fast/slow EMA spread is expressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacdMode {
    /// Absolute spread: `EMA(fast) − EMA(slow)`.
    #[default]
    Macd,
    /// Percentage Price Oscillator: `100 × (EMA(fast) − EMA(slow)) / EMA(slow)`.
    Ppo,
}

/// Configuration for the [`Macd`] indicator.
///
/// Defaults: 12/26/9 on closing price in [`MacdMode::Macd`].
///
/// # Example
///
/// ```
/// use chartist_ta::{IndicatorConfig, IndicatorConfigBuilder, MacdConfig, MacdMode};
///
/// let config = MacdConfig::builder().mode(MacdMode::Ppo).build().unwrap();
/// assert_eq!(config.fast(), 12);
/// assert_eq!(config.slow(), 26);
/// assert_eq!(config.signal(), 9);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct MacdConfig {
    fast: usize,
    slow: usize,
    signal: usize,
    mode: MacdMode,
    source: PriceSource,
}

impl IndicatorConfig for MacdConfig {
    type Builder = MacdConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        MacdConfigBuilder::new()
    }

    /// Every EMA is seeded with its first input, so output starts at once.
    #[inline]
    fn warm_up(&self) -> usize {
        0
    }

    #[inline]
    fn uses_volume(&self) -> bool {
        self.source == PriceSource::Volume
    }
}

impl MacdConfig {
    #[inline]
    #[must_use]
    pub fn fast(&self) -> usize {
        self.fast
    }

    #[inline]
    #[must_use]
    pub fn slow(&self) -> usize {
        self.slow
    }

    #[inline]
    #[must_use]
    pub fn signal(&self) -> usize {
        self.signal
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> MacdMode {
        self.mode
    }

    #[inline]
    #[must_use]
    pub fn source(&self) -> PriceSource {
        self.source
    }
}

impl Default for MacdConfig {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
            mode: MacdMode::Macd,
            source: PriceSource::Close,
        }
    }
}

impl Display for MacdConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MacdConfig({}, {}, {}, {:?}, {})",
            self.fast, self.slow, self.signal, self.mode, self.source
        )
    }
}

/// Builder for [`MacdConfig`].
///
/// Every field starts at its default; unset lengths stay 12/26/9.
pub struct MacdConfigBuilder {
    fast: Option<usize>,
    slow: Option<usize>,
    signal: Option<usize>,
    mode: MacdMode,
    source: PriceSource,
}

impl MacdConfigBuilder {
    fn new() -> Self {
        let defaults = MacdConfig::default();
        Self {
            fast: Some(defaults.fast),
            slow: Some(defaults.slow),
            signal: Some(defaults.signal),
            mode: defaults.mode,
            source: defaults.source,
        }
    }

    #[inline]
    #[must_use]
    pub fn fast(mut self, length: usize) -> Self {
        self.fast.replace(length);
        self
    }

    #[inline]
    #[must_use]
    pub fn slow(mut self, length: usize) -> Self {
        self.slow.replace(length);
        self
    }

    #[inline]
    #[must_use]
    pub fn signal(mut self, length: usize) -> Self {
        self.signal.replace(length);
        self
    }

    #[inline]
    #[must_use]
    pub fn mode(mut self, mode: MacdMode) -> Self {
        self.mode = mode;
        self
    }

    #[inline]
    #[must_use]
    pub fn source(mut self, source: PriceSource) -> Self {
        self.source = source;
        self
    }
}

impl IndicatorConfigBuilder<MacdConfig> for MacdConfigBuilder {
    fn build(self) -> Result<MacdConfig> {
        let length = |value, name| {
            validate_length(value).map_err(|_| Error::invalid(name, "must be at least 1"))
        };

        Ok(MacdConfig {
            fast: length(self.fast, "fast")?,
            slow: length(self.slow, "slow")?,
            signal: length(self.signal, "signal")?,
            mode: self.mode,
            source: self.source,
        })
    }
}

/// MACD (or PPO) line with its signal and histogram.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MacdValue {
    /// Fast/slow spread.
    pub line: Price,
    /// EMA of the line.
    pub signal: Price,
    /// `line − signal`.
    pub histogram: Price,
}

impl Display for MacdValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MacdValue({}, {}, {})",
            self.line, self.signal, self.histogram
        )
    }
}

/// Moving Average Convergence Divergence, or its percentage form (PPO).
///
/// ```text
/// line      = EMA(fast) − EMA(slow)                   (MACD)
///           = 100 × (EMA(fast) − EMA(slow)) / EMA(slow) (PPO)
/// signal    = EMA(line, signal)
/// histogram = line − signal
/// ```
///
/// In PPO mode a zero slow EMA leaves the bar undefined and the signal EMA
/// skips it.
///
/// # Example
///
/// ```
/// use chartist_ta::{Macd, MacdConfig};
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
/// let mut macd = Macd::new(MacdConfig::default());
/// let first = macd.compute(&Bar(100.0)).unwrap();
/// assert_eq!(first.line, 0.0);
/// assert_eq!(first.histogram, 0.0);
/// ```
#[derive(Clone, Debug)]
pub struct Macd {
    config: MacdConfig,
    fast: Ema,
    slow: Ema,
    signal: Ema,
    feed: Feed,
    current: Option<MacdValue>,
}

impl Indicator for Macd {
    type Config = MacdConfig;
    type Output = MacdValue;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            fast: Ema::new(EmaConfig::validated(config.fast, PriceSource::Close)),
            slow: Ema::new(EmaConfig::validated(config.slow, PriceSource::Close)),
            signal: Ema::new(EmaConfig::validated(config.signal, PriceSource::Close)),
            feed: Feed::default(),
            current: None,
        }
    }

    #[inline]
    fn compute(&mut self, bar: &impl Ohlcv) -> Option<MacdValue> {
        self.update(self.config.source.extract(bar))
    }

    #[inline]
    fn value(&self) -> Option<MacdValue> {
        self.current
    }
}

impl Macd {
    /// Feeds one raw value.
    pub(crate) fn update(&mut self, value: Option<Price>) -> Option<MacdValue> {
        let Some(value) = self.feed.admit(value) else {
            if self.feed.is_poisoned() {
                self.current = None;
            }
            return self.current;
        };

        let fast = self.fast.update(Some(value));
        let slow = self.slow.update(Some(value));

        self.current = fast
            .zip(slow)
            .and_then(|(fast, slow)| self.spread(fast, slow))
            .and_then(|line| {
                let signal = self.signal.update(Some(line))?;
                Some(MacdValue {
                    line,
                    signal,
                    histogram: line - signal,
                })
            });

        self.current
    }

    #[inline]
    fn spread(&self, fast: Price, slow: Price) -> Option<Price> {
        match self.config.mode {
            MacdMode::Macd => Some(fast - slow),
            MacdMode::Ppo if slow == 0.0 => None,
            MacdMode::Ppo => Some(100.0 * (fast - slow) / slow),
        }
    }
}

impl Display for Macd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self.config.mode {
            MacdMode::Macd => "MACD",
            MacdMode::Ppo => "PPO",
        };
        write!(
            f,
            "{name}({}, {}, {}, {})",
            self.config.fast, self.config.slow, self.config.signal, self.config.source
        )
    }
}

/// Batch MACD/PPO output, one series per line.
#[derive(Clone, Debug, PartialEq)]
pub struct MacdSeries {
    pub line: Series,
    pub signal: Series,
    pub histogram: Series,
}

impl MacdSeries {
    fn from_values(values: &[Option<MacdValue>]) -> Self {
        Self {
            line: project(values, |v| Some(v.line)),
            signal: project(values, |v| Some(v.signal)),
            histogram: project(values, |v| Some(v.histogram)),
        }
    }
}

/// MACD of a numeric series.
///
/// # Errors
///
/// [`Error::InvalidParameter`] for a zero length, [`Error::EmptyInput`] for an
/// empty series.
///
/// # Example
///
/// ```
/// let out = chartist_ta::macd([5.0; 4], 12, 26, 9).unwrap();
/// assert_eq!(out.histogram, vec![Some(0.0); 4]);
/// ```
pub fn macd(values: impl IntoSeries, fast: usize, slow: usize, signal: usize) -> Result<MacdSeries> {
    run(values, fast, slow, signal, MacdMode::Macd)
}

/// Percentage Price Oscillator of a numeric series.
///
/// # Errors
///
/// Same as [`macd`].
pub fn ppo(values: impl IntoSeries, fast: usize, slow: usize, signal: usize) -> Result<MacdSeries> {
    run(values, fast, slow, signal, MacdMode::Ppo)
}

fn run(
    values: impl IntoSeries,
    fast: usize,
    slow: usize,
    signal: usize,
    mode: MacdMode,
) -> Result<MacdSeries> {
    let config = MacdConfig::builder()
        .fast(fast)
        .slow(slow)
        .signal(signal)
        .mode(mode)
        .build()?;

    let mut macd = Macd::new(config);
    let values = smooth(values.into_series(), |v| macd.update(v))?;

    Ok(MacdSeries::from_values(&values))
}
