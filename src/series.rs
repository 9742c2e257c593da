//! Batch series representation and the input adapter shared by every batch
//! entry point.

use crate::{Error, Indicator, IndicatorConfig, Ohlcv, Price, PriceSource, Result};

/// An indicator output (or normalised input) series.
///
/// Aligned index-for-index with the bars it was computed from. `None` is the
/// single undefined marker: it never stands for zero.
pub type Series = Vec<Option<Price>>;

/// A scalar that can appear in an input series.
///
/// Non-finite floats and `None` both normalise to undefined.
pub trait Sample: Copy {
    /// The value as `f64`, or `None` when undefined.
    fn sample(self) -> Option<f64>;
}

impl Sample for f64 {
    #[inline]
    fn sample(self) -> Option<f64> {
        self.is_finite().then_some(self)
    }
}

impl Sample for f32 {
    #[inline]
    fn sample(self) -> Option<f64> {
        f64::from(self).sample()
    }
}

impl Sample for u32 {
    #[inline]
    fn sample(self) -> Option<f64> {
        Some(f64::from(self))
    }
}

impl Sample for u64 {
    #[inline]
    #[allow(clippy::cast_precision_loss)]
    fn sample(self) -> Option<f64> {
        Some(self as f64)
    }
}

impl<T: Sample> Sample for Option<T> {
    #[inline]
    fn sample(self) -> Option<f64> {
        self.and_then(Sample::sample)
    }
}

/// Converts any ordered numeric container into a dense [`Series`] once, at
/// the boundary, so indicator bodies never branch on container types.
///
/// Implemented for slices, arrays and vectors (owned or borrowed) of `f64`,
/// `f32`, `u32`, `u64` and `Option`s of those.
///
/// ```
/// use chartist_ta::IntoSeries;
///
/// assert_eq!([1.0, f64::NAN].into_series(), vec![Some(1.0), None]);
/// assert_eq!(vec![Some(5_u64), None].into_series(), vec![Some(5.0), None]);
/// ```
pub trait IntoSeries {
    /// Normalises the values into a [`Series`] of the same length.
    fn into_series(self) -> Series;
}

impl<T: Sample> IntoSeries for &[T] {
    fn into_series(self) -> Series {
        self.iter().map(|v| v.sample()).collect()
    }
}

impl<T: Sample> IntoSeries for &Vec<T> {
    fn into_series(self) -> Series {
        self.as_slice().into_series()
    }
}

impl<T: Sample> IntoSeries for Vec<T> {
    fn into_series(self) -> Series {
        self.as_slice().into_series()
    }
}

impl<T: Sample, const N: usize> IntoSeries for [T; N] {
    fn into_series(self) -> Series {
        self.as_slice().into_series()
    }
}

impl<T: Sample, const N: usize> IntoSeries for &[T; N] {
    fn into_series(self) -> Series {
        self.as_slice().into_series()
    }
}

/// Runs a streaming indicator over a slice of bars.
///
/// A non-finite price anywhere, or a missing volume for an indicator that
/// reads volume, makes the whole output undefined.
///
/// # Errors
///
/// Returns [`Error::EmptyInput`] when `bars` is empty.
///
/// # Example
///
/// ```
/// use chartist_ta::{Obv, ObvConfig, compute_series};
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
/// let bars = [Bar(10.0, 100.0), Bar(11.0, 50.0)];
/// let obv = compute_series::<Obv, _>(ObvConfig::default(), &bars).unwrap();
/// assert_eq!(obv, vec![Some(0.0), Some(50.0)]);
/// ```
pub fn compute_series<I, B>(config: I::Config, bars: &[B]) -> Result<Vec<Option<I::Output>>>
where
    I: Indicator,
    B: Ohlcv,
{
    if bars.is_empty() {
        return Err(Error::EmptyInput);
    }

    let uses_volume = config.uses_volume();
    let unusable = bars.iter().any(|bar| {
        [bar.open(), bar.high(), bar.low(), bar.close()]
            .iter()
            .any(|p| !p.is_finite())
            || (uses_volume && PriceSource::Volume.extract(bar).is_none())
    });

    if unusable {
        tracing::debug!(
            bars = bars.len(),
            "input has missing values; whole output is undefined"
        );
        return Ok(vec![None; bars.len()]);
    }

    let mut indicator = I::new(config);
    Ok(bars.iter().map(|bar| indicator.compute(bar)).collect())
}

/// Undefined-input policy of a single value stream.
///
/// Leading undefined values are upstream warm-up and are skipped. An
/// undefined value after the first defined one poisons the stream for good.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum Feed {
    #[default]
    Warming,
    Running,
    Poisoned,
}

impl Feed {
    /// Returns the value to fold into the indicator state, or `None` when the
    /// input must be skipped.
    #[inline]
    pub(crate) fn admit<T>(&mut self, value: Option<T>) -> Option<T> {
        match (*self, value) {
            (Self::Poisoned, _) | (Self::Warming, None) => None,
            (_, Some(value)) => {
                *self = Self::Running;
                Some(value)
            }
            (Self::Running, None) => {
                *self = Self::Poisoned;
                None
            }
        }
    }

    #[inline]
    pub(crate) fn is_poisoned(self) -> bool {
        self == Self::Poisoned
    }
}

/// Applies a value-level smoother across a whole series.
///
/// An interior gap makes the whole output undefined.
pub(crate) fn smooth<T, F>(series: Series, mut step: F) -> Result<Vec<Option<T>>>
where
    T: Clone,
    F: FnMut(Option<Price>) -> Option<T>,
{
    if series.is_empty() {
        return Err(Error::EmptyInput);
    }

    if has_interior_gap(&series) {
        tracing::debug!(
            len = series.len(),
            "series has an interior gap; whole output is undefined"
        );
        return Ok(vec![None; series.len()]);
    }

    Ok(series.into_iter().map(&mut step).collect())
}

/// A row assembled from separately supplied columns.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ColumnBar {
    high: Price,
    low: Price,
    close: Price,
    volume: Option<f64>,
}

impl Ohlcv for ColumnBar {
    fn open(&self) -> Price {
        self.close
    }

    fn high(&self) -> Price {
        self.high
    }

    fn low(&self) -> Price {
        self.low
    }

    fn close(&self) -> Price {
        self.close
    }

    fn volume(&self) -> Option<f64> {
        self.volume
    }
}

/// Aligned high/low/close/volume columns, validated for shape.
pub(crate) struct Columns {
    high: Series,
    low: Series,
    close: Series,
    volume: Option<Series>,
}

impl Columns {
    /// Close-only columns; high and low mirror close.
    pub(crate) fn close(close: Series) -> Result<Self> {
        Self::new(close.clone(), close.clone(), close, None)
    }

    /// Close and volume columns; high and low mirror close.
    pub(crate) fn close_volume(close: Series, volume: Series) -> Result<Self> {
        Self::new(close.clone(), close.clone(), close, Some(volume))
    }

    pub(crate) fn new(
        high: Series,
        low: Series,
        close: Series,
        volume: Option<Series>,
    ) -> Result<Self> {
        if close.is_empty() {
            return Err(Error::EmptyInput);
        }
        ensure_len("high", close.len(), high.len())?;
        ensure_len("low", close.len(), low.len())?;
        if let Some(volume) = &volume {
            ensure_len("volume", close.len(), volume.len())?;
        }

        Ok(Self {
            high,
            low,
            close,
            volume,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.close.len()
    }

    /// Rows, or `None` when any supplied value is undefined.
    pub(crate) fn bars(&self) -> Option<Vec<ColumnBar>> {
        let volume = |i: usize| match &self.volume {
            Some(volume) => volume[i].map(Some),
            None => Some(None),
        };

        (0..self.len())
            .map(|i| {
                Some(ColumnBar {
                    high: self.high[i]?,
                    low: self.low[i]?,
                    close: self.close[i]?,
                    volume: volume(i)?,
                })
            })
            .collect()
    }

    /// Runs a streaming indicator over every row, or returns an all-undefined
    /// series when a row is incomplete.
    pub(crate) fn run<I: Indicator>(&self, config: I::Config) -> Vec<Option<I::Output>> {
        let Some(bars) = self.bars() else {
            tracing::debug!(
                len = self.len(),
                "column input has missing values; whole output is undefined"
            );
            return vec![None; self.len()];
        };

        let mut indicator = I::new(config);
        bars.iter().map(|bar| indicator.compute(bar)).collect()
    }
}

pub(crate) fn ensure_len(series: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::ShapeMismatch {
            series,
            expected,
            actual,
        })
    }
}

/// Index of the first defined value.
pub(crate) fn first_defined(series: &[Option<Price>]) -> Option<usize> {
    series.iter().position(Option::is_some)
}

/// Whether an undefined value follows a defined one.
pub(crate) fn has_interior_gap(series: &[Option<Price>]) -> bool {
    first_defined(series).is_some_and(|start| series[start..].iter().any(Option::is_none))
}

/// Projects one field out of a series of composite outputs.
pub(crate) fn project<T, F>(values: &[Option<T>], field: F) -> Series
where
    F: Fn(&T) -> Option<Price>,
{
    values.iter().map(|v| v.as_ref().and_then(&field)).collect()
}

/// Whole-series Z-score `(x - mean) / stddev` with the sample deviation.
///
/// Undefined everywhere when the series has a gap, fewer than two defined
/// points, or zero deviation.
pub(crate) fn z_score(series: &[Option<Price>]) -> Series {
    let defined: Vec<f64> = series.iter().flatten().copied().collect();
    if defined.len() < 2 || defined.len() != series.len() {
        return vec![None; series.len()];
    }

    #[allow(clippy::cast_precision_loss)]
    let n = defined.len() as f64;
    let mean = defined.iter().sum::<f64>() / n;
    let variance = defined.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (n - 1.0);
    let std_dev = variance.sqrt();

    if std_dev == 0.0 || !std_dev.is_finite() {
        return vec![None; series.len()];
    }

    defined
        .iter()
        .map(|x| Some((x - mean) / std_dev))
        .collect()
}
