use chrono::NaiveDate;

use crate::{Bar, Error, Ohlcv, Result, Series};

/// Daily bars of one instrument, validated for order.
///
/// Never empty; dates strictly increase from one bar to the next.
///
/// # Example
///
/// ```
/// use chartist_ta::{Bar, PriceSeries};
/// use chrono::NaiveDate;
///
/// let day = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
/// let series = PriceSeries::new(vec![
///     Bar::new(day(1), 10.0, 11.0, 9.0, 10.5, Some(1200)),
///     Bar::new(day(4), 10.5, 12.0, 10.0, 11.5, None),
/// ])
/// .unwrap();
///
/// assert_eq!(series.len(), 2);
/// assert_eq!(series.close(), vec![Some(10.5), Some(11.5)]);
/// assert_eq!(series.volume(), vec![Some(1200.0), None]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PriceSeries {
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// # Errors
    ///
    /// [`Error::EmptyInput`] when `bars` is empty, [`Error::UnorderedDates`]
    /// at the first bar whose date does not follow its predecessor.
    pub fn new(bars: Vec<Bar>) -> Result<Self> {
        if bars.is_empty() {
            return Err(Error::EmptyInput);
        }

        if let Some(pos) = bars.windows(2).position(|w| w[1].date <= w[0].date) {
            return Err(Error::UnorderedDates { index: pos + 1 });
        }

        Ok(Self { bars })
    }

    #[must_use]
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    #[must_use]
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|bar| bar.date).collect()
    }

    #[must_use]
    pub fn open(&self) -> Series {
        self.column(Ohlcv::open)
    }

    #[must_use]
    pub fn high(&self) -> Series {
        self.column(Ohlcv::high)
    }

    #[must_use]
    pub fn low(&self) -> Series {
        self.column(Ohlcv::low)
    }

    #[must_use]
    pub fn close(&self) -> Series {
        self.column(Ohlcv::close)
    }

    /// Traded volume; `None` where the bar has none.
    #[must_use]
    pub fn volume(&self) -> Series {
        self.bars.iter().map(Ohlcv::volume).collect()
    }

    fn column(&self, price: fn(&Bar) -> f64) -> Series {
        self.bars
            .iter()
            .map(|bar| {
                let value = price(bar);
                value.is_finite().then_some(value)
            })
            .collect()
    }
}

impl TryFrom<Vec<Bar>> for PriceSeries {
    type Error = Error;

    fn try_from(bars: Vec<Bar>) -> Result<Self> {
        Self::new(bars)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn close_on(d: u32, close: f64) -> Bar {
        Bar::new(day(d), close, close, close, close, Some(100))
    }

    mod validation {
        use super::*;

        #[test]
        fn empty_is_rejected() {
            assert_eq!(PriceSeries::new(Vec::new()), Err(Error::EmptyInput));
        }

        #[test]
        fn single_bar_is_accepted() {
            let series = PriceSeries::new(vec![close_on(1, 5.0)]).unwrap();
            assert_eq!(series.len(), 1);
            assert!(!series.is_empty());
        }

        #[test]
        fn duplicate_date_is_rejected() {
            let bars = vec![close_on(1, 1.0), close_on(2, 2.0), close_on(2, 3.0)];
            assert_eq!(
                PriceSeries::new(bars),
                Err(Error::UnorderedDates { index: 2 })
            );
        }

        #[test]
        fn backwards_date_is_rejected() {
            let bars = vec![close_on(3, 1.0), close_on(2, 2.0)];
            assert_eq!(
                PriceSeries::try_from(bars),
                Err(Error::UnorderedDates { index: 1 })
            );
        }
    }

    mod columns {
        use super::*;

        #[test]
        fn accessors_align_with_bars() {
            let series = PriceSeries::new(vec![
                Bar::new(day(1), 1.0, 2.0, 0.5, 1.5, Some(10)),
                Bar::new(day(2), 1.5, 3.0, 1.0, 2.5, None),
            ])
            .unwrap();

            assert_eq!(series.dates(), vec![day(1), day(2)]);
            assert_eq!(series.open(), vec![Some(1.0), Some(1.5)]);
            assert_eq!(series.high(), vec![Some(2.0), Some(3.0)]);
            assert_eq!(series.low(), vec![Some(0.5), Some(1.0)]);
            assert_eq!(series.close(), vec![Some(1.5), Some(2.5)]);
            assert_eq!(series.volume(), vec![Some(10.0), None]);
        }

        #[test]
        fn non_finite_price_is_undefined() {
            let series = PriceSeries::new(vec![close_on(1, f64::NAN), close_on(2, 4.0)]).unwrap();
            assert_eq!(series.close(), vec![None, Some(4.0)]);
        }
    }
}
