use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A price value.
///
/// Semantic alias for [`f64`]. Documents intent in function signatures
/// without introducing newtype construction overhead.
pub type Price = f64;

/// OHLCV bar data used as input to all streaming indicators.
///
/// Implement this on your own bar type to avoid conversion. Indicators accept
/// `&impl Ohlcv` and extract the configured [`PriceSource`](crate::PriceSource)
/// internally.
///
/// Bars must be fed in chronological order, one call per bar.
///
/// # Example
///
/// ```
/// use chartist_ta::{Ohlcv, Price};
///
/// struct MyBar {
///     o: f64, h: f64, l: f64, c: f64,
///     v: u64,
/// }
///
/// impl Ohlcv for MyBar {
///     fn open(&self) -> Price { self.o }
///     fn high(&self) -> Price { self.h }
///     fn low(&self) -> Price { self.l }
///     fn close(&self) -> Price { self.c }
///     #[allow(clippy::cast_precision_loss)]
///     fn volume(&self) -> Option<f64> { Some(self.v as f64) }
/// }
/// ```
pub trait Ohlcv {
    /// Opening price of the bar.
    fn open(&self) -> Price;

    /// Highest price during the bar.
    fn high(&self) -> Price;

    /// Lowest price during the bar.
    fn low(&self) -> Price;

    /// Closing price of the bar.
    fn close(&self) -> Price;

    /// Traded volume. Defaults to `None`.
    ///
    /// Volume is legitimately absent for some instruments (indices).
    /// Volume-dependent indicators (OBV, MFI, A/D, PVI/NVI) report undefined
    /// values once a bar without volume is seen.
    fn volume(&self) -> Option<f64> {
        None
    }
}

/// One daily bar of the price/volume series.
///
/// Deserialises from records with `date,open,high,low,close,volume` columns;
/// an empty volume field maps to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: Option<u64>,
}

impl Bar {
    #[must_use]
    pub fn new(
        date: NaiveDate,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Option<u64>,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl Ohlcv for Bar {
    fn open(&self) -> Price {
        self.open
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

    #[allow(clippy::cast_precision_loss)]
    fn volume(&self) -> Option<f64> {
        self.volume.map(|v| v as f64)
    }
}
