use crate::{Ohlcv, Price};

use std::fmt::{Debug, Display};

/// Value extracted from an [`Ohlcv`] bar before feeding into an indicator.
///
/// Each moving-average style indicator is configured with a `PriceSource`
/// that determines which value (or derived value) to compute on.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Default, Debug)]
pub enum PriceSource {
    /// Opening price.
    Open,
    /// Highest price.
    High,
    /// Lowest price.
    Low,
    /// Closing price.
    #[default]
    Close,
    /// Median price: `(high + low) / 2`.
    Median,
    /// Typical price: `(high + low + close) / 3`.
    Typical,
    /// Average price: `(open + high + low + close) / 4`.
    Average,
    /// Traded volume. Undefined when the bar carries no volume.
    Volume,
}

impl Display for PriceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl PriceSource {
    /// Extracts the configured value, or `None` when it is missing or not
    /// finite.
    #[inline]
    pub(crate) fn extract(self, ohlcv: &impl Ohlcv) -> Option<Price> {
        let value = match self {
            Self::Open => ohlcv.open(),
            Self::High => ohlcv.high(),
            Self::Low => ohlcv.low(),
            Self::Close => ohlcv.close(),
            Self::Median => f64::midpoint(ohlcv.high(), ohlcv.low()),
            Self::Typical => typical_price(ohlcv),
            Self::Average => (ohlcv.open() + ohlcv.high() + ohlcv.low() + ohlcv.close()) / 4.0,
            Self::Volume => ohlcv.volume()?,
        };

        value.is_finite().then_some(value)
    }
}

/// Typical price `(high + low + close) / 3`, shared with MFI.
#[inline]
pub(crate) fn typical_price(ohlcv: &impl Ohlcv) -> Price {
    (ohlcv.high() + ohlcv.low() + ohlcv.close()) / 3.0
}
