use std::fmt::Display;

use crate::{
    Error, Indicator, IndicatorConfig, IndicatorConfigBuilder, IntoSeries, Ohlcv, Price, Result,
    Series,
    rma::{Rma, RmaConfig},
    series::{Columns, Feed, ensure_len, project},
    sma::validate_length,
    spline::{SplineSmoothing, smooth_tail},
    trend::{TrendLabel, classify},
};

/// Configuration for the Average Directional Index ([`Adx`]).
///
/// Defaults: DI length 14, ADX length 14, spline smoothing 0.9.
///
/// # Example
///
/// ```
/// use chartist_ta::{AdxConfig, IndicatorConfig, IndicatorConfigBuilder};
///
/// let config = AdxConfig::builder().di_length(7).build().unwrap();
/// assert_eq!(config.di_length(), 7);
/// assert_eq!(config.adx_length(), 14);
/// // First ADX value: DI from bar 7, then 14 DX values
/// assert_eq!(config.warm_up(), 20);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct AdxConfig {
    di_length: usize,
    adx_length: usize,
    smoothing: SplineSmoothing,
}

impl IndicatorConfig for AdxConfig {
    type Builder = AdxConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        AdxConfigBuilder::new()
    }

    #[inline]
    fn warm_up(&self) -> usize {
        self.di_length + self.adx_length - 1
    }
}

impl AdxConfig {
    /// Wilder smoothing length of directional movement and true range.
    #[inline]
    #[must_use]
    pub fn di_length(&self) -> usize {
        self.di_length
    }

    /// Wilder smoothing length of DX.
    #[inline]
    #[must_use]
    pub fn adx_length(&self) -> usize {
        self.adx_length
    }

    /// Spline smoothing used by the trend classifier.
    #[inline]
    #[must_use]
    pub fn smoothing(&self) -> SplineSmoothing {
        self.smoothing
    }
}

impl Default for AdxConfig {
    fn default() -> Self {
        Self {
            di_length: 14,
            adx_length: 14,
            smoothing: SplineSmoothing::default(),
        }
    }
}

impl Display for AdxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "AdxConfig({}, {}, {})",
            self.di_length,
            self.adx_length,
            self.smoothing.value()
        )
    }
}

/// Builder for [`AdxConfig`].
pub struct AdxConfigBuilder {
    di_length: Option<usize>,
    adx_length: Option<usize>,
    smoothing: SplineSmoothing,
}

impl AdxConfigBuilder {
    fn new() -> Self {
        let defaults = AdxConfig::default();
        Self {
            di_length: Some(defaults.di_length),
            adx_length: Some(defaults.adx_length),
            smoothing: defaults.smoothing,
        }
    }

    #[inline]
    #[must_use]
    pub fn di_length(mut self, length: usize) -> Self {
        self.di_length.replace(length);
        self
    }

    #[inline]
    #[must_use]
    pub fn adx_length(mut self, length: usize) -> Self {
        self.adx_length.replace(length);
        self
    }

    #[inline]
    #[must_use]
    pub fn smoothing(mut self, smoothing: SplineSmoothing) -> Self {
        self.smoothing = smoothing;
        self
    }
}

impl IndicatorConfigBuilder<AdxConfig> for AdxConfigBuilder {
    fn build(self) -> Result<AdxConfig> {
        let length = |value, name| {
            validate_length(value).map_err(|_| Error::invalid(name, "must be at least 1"))
        };

        Ok(AdxConfig {
            di_length: length(self.di_length, "di_length")?,
            adx_length: length(self.adx_length, "adx_length")?,
            smoothing: self.smoothing,
        })
    }
}

/// Directional movement state of one bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdxValue {
    /// Positive directional movement.
    pub plus_dm: Price,
    /// Negative directional movement.
    pub minus_dm: Price,
    /// True range.
    pub true_range: Price,
    /// Undefined during warm-up and where the smoothed range is zero.
    pub plus_di: Option<Price>,
    pub minus_di: Option<Price>,
    /// Undefined until the DI smoothing is seeded.
    pub dx: Option<Price>,
    /// Undefined until the DX smoothing is seeded.
    pub adx: Option<Price>,
}

impl Display for AdxValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let show = |v: Option<Price>| v.map_or_else(|| "-".to_owned(), |v| v.to_string());
        write!(
            f,
            "AdxValue(+DI: {}, -DI: {}, ADX: {})",
            show(self.plus_di),
            show(self.minus_di),
            show(self.adx)
        )
    }
}

/// Average Directional Index (ADX) with its directional indicators.
///
/// Per bar after the first:
///
/// ```text
/// up   = high − prev_high        down = prev_low − low
/// +DM  = up   if up > down and up > 0, else 0
/// −DM  = down if down > up and down > 0, else 0
/// TR   = max(high − low, high − prev_close, low − prev_close)
/// ±DI  = 100 × RMA(±DM) / RMA(TR)
/// DX   = 100 × |+DI − −DI| / (+DI + −DI)
/// ADX  = RMA(DX)
/// ```
///
/// A zero smoothed range leaves both DIs undefined and DX at 0; so does a
/// zero DI sum. The bar-by-bar indicator stops at the raw ADX; the spline
/// smoothing and trend labels need the whole series and live in [`adx`].
///
/// # Example
///
/// ```
/// use chartist_ta::{Adx, AdxConfig, IndicatorConfig, IndicatorConfigBuilder};
/// # use chartist_ta::{Ohlcv, Price};
/// #
/// # struct Bar(f64, f64, f64);
/// # impl Ohlcv for Bar {
/// #     fn open(&self) -> Price { self.2 }
/// #     fn high(&self) -> Price { self.0 }
/// #     fn low(&self) -> Price { self.1 }
/// #     fn close(&self) -> Price { self.2 }
/// # }
///
/// let config = AdxConfig::builder().di_length(1).adx_length(1).build().unwrap();
/// let mut adx = Adx::new(config);
///
/// assert_eq!(adx.compute(&Bar(10.0, 8.0, 9.0)), None);
///
/// // Only upward movement: +DI carries the whole range, DX = 100
/// let value = adx.compute(&Bar(12.0, 9.0, 11.0)).unwrap();
/// assert_eq!(value.plus_dm, 2.0);
/// assert_eq!(value.minus_dm, 0.0);
/// assert_eq!(value.adx, Some(100.0));
/// ```
#[derive(Clone, Debug)]
pub struct Adx {
    config: AdxConfig,
    plus_dm: Rma,
    minus_dm: Rma,
    true_range: Rma,
    dx: Rma,
    feed: Feed,
    prev: Option<(Price, Price, Price)>,
    current: Option<AdxValue>,
}

impl Indicator for Adx {
    type Config = AdxConfig;
    type Output = AdxValue;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            plus_dm: Rma::new(RmaConfig::validated(config.di_length)),
            minus_dm: Rma::new(RmaConfig::validated(config.di_length)),
            true_range: Rma::new(RmaConfig::validated(config.di_length)),
            dx: Rma::new(RmaConfig::validated(config.adx_length)),
            feed: Feed::default(),
            prev: None,
            current: None,
        }
    }

    fn compute(&mut self, bar: &impl Ohlcv) -> Option<AdxValue> {
        let (high, low, close) = (bar.high(), bar.low(), bar.close());
        let input = [high, low, close]
            .iter()
            .all(|v| v.is_finite())
            .then_some((high, low, close));

        let Some((high, low, close)) = self.feed.admit(input) else {
            if self.feed.is_poisoned() {
                self.current = None;
            }
            return self.current;
        };

        let Some((prev_high, prev_low, prev_close)) = self.prev.replace((high, low, close)) else {
            return None;
        };

        let (plus_dm, minus_dm) = directional_movement(high - prev_high, prev_low - low);
        let true_range = (high - low).max(high - prev_close).max(low - prev_close);

        let smoothed = (
            self.plus_dm.update(Some(plus_dm)),
            self.minus_dm.update(Some(minus_dm)),
            self.true_range.update(Some(true_range)),
        );

        let (plus_di, minus_di, dx) = match smoothed {
            (Some(plus), Some(minus), Some(range)) if range != 0.0 => {
                let (plus_di, minus_di) = (100.0 * plus / range, 100.0 * minus / range);
                let sum = plus_di + minus_di;
                let dx = if sum == 0.0 {
                    0.0
                } else {
                    100.0 * ((plus_di - minus_di).abs() / sum)
                };
                (Some(plus_di), Some(minus_di), Some(dx))
            }
            (Some(_), Some(_), Some(_)) => (None, None, Some(0.0)),
            _ => (None, None, None),
        };

        let adx = match dx {
            Some(dx) => self.dx.update(Some(dx)),
            None => None,
        };

        self.current = Some(AdxValue {
            plus_dm,
            minus_dm,
            true_range,
            plus_di,
            minus_di,
            dx,
            adx,
        });

        self.current
    }

    #[inline]
    fn value(&self) -> Option<AdxValue> {
        self.current
    }
}

/// `(+DM, −DM)` from the up and down moves. Ties give zero for both.
#[inline]
fn directional_movement(up: Price, down: Price) -> (Price, Price) {
    let plus = if up > down && up > 0.0 { up } else { 0.0 };
    let minus = if down > up && down > 0.0 { down } else { 0.0 };
    (plus, minus)
}

impl Display for Adx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ADX({}, {})",
            self.config.di_length, self.config.adx_length
        )
    }
}

/// Batch ADX output with the spline-smoothed curve and trend labels.
#[derive(Clone, Debug, PartialEq)]
pub struct AdxSeries {
    pub plus_dm: Series,
    pub minus_dm: Series,
    pub true_range: Series,
    pub plus_di: Series,
    pub minus_di: Series,
    pub dx: Series,
    pub adx: Series,
    /// Cubic smoothing spline of `adx`, or `adx` itself when the fit is not
    /// possible.
    pub spline: Series,
    pub trend: Vec<Option<TrendLabel>>,
}

impl AdxSeries {
    /// One undefined element in every output.
    fn placeholder() -> Self {
        Self {
            plus_dm: vec![None],
            minus_dm: vec![None],
            true_range: vec![None],
            plus_di: vec![None],
            minus_di: vec![None],
            dx: vec![None],
            adx: vec![None],
            spline: vec![None],
            trend: vec![None],
        }
    }

    /// Length of every output series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adx.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adx.is_empty()
    }
}

/// ADX, directional indicators and trend labels from high, low and close
/// columns.
///
/// Series of at most one bar yield a single undefined element in every
/// output.
///
/// # Errors
///
/// [`Error::ShapeMismatch`] when high or low differ in length from close.
///
/// # Example
///
/// ```
/// use chartist_ta::AdxConfig;
///
/// let out = chartist_ta::adx([10.0], [9.0], [9.5], AdxConfig::default()).unwrap();
/// assert_eq!(out.adx, vec![None]);
/// assert_eq!(out.trend, vec![None]);
/// ```
pub fn adx(
    high: impl IntoSeries,
    low: impl IntoSeries,
    close: impl IntoSeries,
    config: AdxConfig,
) -> Result<AdxSeries> {
    let (high, low, close) = (high.into_series(), low.into_series(), close.into_series());
    ensure_len("high", close.len(), high.len())?;
    ensure_len("low", close.len(), low.len())?;

    if close.len() <= 1 {
        return Ok(AdxSeries::placeholder());
    }

    let values = Columns::new(high, low, close, None)?.run::<Adx>(config);

    let adx = project(&values, |v| v.adx);
    let plus_di = project(&values, |v| v.plus_di);
    let minus_di = project(&values, |v| v.minus_di);

    let spline = match smooth_tail(&adx, config.smoothing) {
        Ok(spline) => spline,
        Err(err) => {
            tracing::warn!(%err, "spline fit unavailable; classifying raw ADX");
            adx.clone()
        }
    };
    let trend = classify(&spline, &plus_di, &minus_di);

    Ok(AdxSeries {
        plus_dm: project(&values, |v| Some(v.plus_dm)),
        minus_dm: project(&values, |v| Some(v.minus_dm)),
        true_range: project(&values, |v| Some(v.true_range)),
        dx: project(&values, |v| v.dx),
        plus_di,
        minus_di,
        adx,
        spline,
        trend,
    })
}
