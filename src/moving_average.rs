use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{IntoSeries, Result, Series, ema, rma, sma};

/// Moving-average family selector.
///
/// ```
/// use chartist_ta::MovingAverage;
///
/// let out = MovingAverage::Wilder.apply([2.0, 4.0, 6.0], 2).unwrap();
/// assert_eq!(out, vec![None, Some(3.0), Some(4.5)]);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovingAverage {
    /// Unweighted trailing mean.
    Simple,
    /// Exponential, `α = 2 / (length + 1)`, seeded with the first value.
    #[default]
    Exponential,
    /// Wilder's running average, seeded with the mean of the first window.
    Wilder,
}

impl MovingAverage {
    /// Applies the selected average to a numeric series.
    ///
    /// # Errors
    ///
    /// Same as [`sma`], [`ema`] and [`rma`].
    pub fn apply(self, values: impl IntoSeries, length: usize) -> Result<Series> {
        match self {
            Self::Simple => sma(values, length),
            Self::Exponential => ema(values, length),
            Self::Wilder => rma(values, length),
        }
    }

    /// Short label used in column names.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Simple => "SMA",
            Self::Exponential => "EMA",
            Self::Wilder => "RMA",
        }
    }
}

impl Display for MovingAverage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
