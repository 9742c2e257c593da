use crate::{Ohlcv, Result};

use std::{
    fmt::{Debug, Display},
    hash::Hash,
};

/// Configuration for a technical [`Indicator`].
///
/// Every indicator has a corresponding config type that holds its parameters
/// (lengths, price source, multipliers). Configs are value types: cheap to
/// copy, compare, and hash. They are validated once, when the builder runs.
pub trait IndicatorConfig: Sized + Copy + PartialEq + Eq + Hash + Display + Debug {
    /// Builder type for constructing this config.
    type Builder: IndicatorConfigBuilder<Self>;

    /// Returns a new builder with default values.
    fn builder() -> Self::Builder;

    /// Number of leading bars for which the primary output is undefined.
    fn warm_up(&self) -> usize;

    /// Whether an indicator built from this config reads [`Ohlcv::volume`].
    /// Batch callers treat a single missing volume as making the whole
    /// series unusable.
    fn uses_volume(&self) -> bool {
        false
    }
}

/// Builder for an [`IndicatorConfig`].
pub trait IndicatorConfigBuilder<Config>
where
    Config: IndicatorConfig,
{
    /// Validates the collected parameters and builds the config.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`](crate::Error::InvalidParameter)
    /// when a required field is missing or a value is out of its domain.
    fn build(self) -> Result<Config>;
}

/// A streaming technical indicator.
///
/// Indicators maintain internal state and update incrementally on each call to
/// [`compute`](Indicator::compute), one call per bar in chronological order.
/// Output is `None` while the value is undefined: during warm-up, at an index
/// where a denominator is zero, or after a bar with missing inputs.
///
/// # Example
///
/// ```
/// use chartist_ta::{Sma, SmaConfig, Indicator, IndicatorConfig};
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
/// let mut sma = Sma::new(SmaConfig::close(3).unwrap());
///
/// assert_eq!(sma.compute(&Bar(10.0)), None);
/// assert_eq!(sma.compute(&Bar(20.0)), None);
/// assert_eq!(sma.compute(&Bar(30.0)), Some(20.0));
/// ```
pub trait Indicator: Sized + Clone + Display + Debug {
    /// Configuration type for this indicator.
    type Config: IndicatorConfig;

    /// Computed output type. `f64` for simple indicators,
    /// a struct for composite ones (e.g. Bollinger Bands).
    type Output: Clone + Send + Sync + Display + Debug;

    /// Creates a new indicator from the given config.
    fn new(config: Self::Config) -> Self;

    /// Feeds the next bar and returns the updated value,
    /// or `None` if undefined at this bar.
    fn compute(&mut self, bar: &impl Ohlcv) -> Option<Self::Output>;

    /// Returns the last computed value without advancing state.
    ///
    /// This is a cached field read, O(1) with no computation.
    fn value(&self) -> Option<Self::Output>;
}
