//! Cubic smoothing spline over the defined tail of a series.

use std::hash::{Hash, Hasher};

use csaps::CubicSmoothingSpline;

use crate::{Error, Price, Result, Series, series::first_defined};

/// Smoothing parameter of the cubic spline.
///
/// `0.0` fits a straight line, `1.0` interpolates every point. Defaults to
/// `0.9`.
///
/// Implements `Eq` and `Hash` via bit-level comparison, which is safe because
/// NaN is rejected at construction.
#[derive(Clone, Copy, Debug)]
pub struct SplineSmoothing(f64);

impl SplineSmoothing {
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] unless `0 <= value <= 1`.
    pub fn new(value: f64) -> Result<Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::invalid("smoothing", "must be in [0, 1]"))
        }
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for SplineSmoothing {
    fn default() -> Self {
        Self(0.9)
    }
}

impl PartialEq for SplineSmoothing {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for SplineSmoothing {}

impl Hash for SplineSmoothing {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// Fits a smoothing spline to the defined tail of `series`, with the bar
/// index as abscissa, and evaluates it at the same points.
///
/// Leading undefined values stay undefined.
///
/// # Errors
///
/// [`Error::SplineFit`] when the tail has a gap, has fewer than two points, or
/// the fit itself fails.
pub(crate) fn smooth_tail(series: &[Option<Price>], smoothing: SplineSmoothing) -> Result<Series> {
    let Some(start) = first_defined(series) else {
        return Err(Error::SplineFit("no defined values".into()));
    };

    let y: Vec<f64> = series[start..].iter().map_while(|v| *v).collect();
    if y.len() != series.len() - start {
        return Err(Error::SplineFit("undefined value inside the fitted range".into()));
    }
    if y.len() < 2 {
        return Err(Error::SplineFit("at least two points are required".into()));
    }

    #[allow(clippy::cast_precision_loss)]
    let x: Vec<f64> = (start..series.len()).map(|i| i as f64).collect();

    let fitted = CubicSmoothingSpline::new(&x, &y)
        .with_smooth(smoothing.0)
        .make()
        .and_then(|spline| spline.evaluate(&x))
        .map_err(|err| Error::SplineFit(err.to_string()))?;

    let mut out = vec![None; start];
    out.extend(fitted.iter().map(|v| v.is_finite().then_some(*v)));

    Ok(out)
}
