use crate::Price;
use std::collections::VecDeque;

/// Fixed-size trailing window over a value stream with running aggregates.
#[derive(Clone, Debug)]
pub(crate) struct PriceWindow<const SUM_OF_SQUARES: bool = false> {
    size: usize,
    window: VecDeque<Price>,
    /// Running sum; drifts by rounding, see [`PriceWindow::exact_sum`].
    sum: Price,
    sum_of_squares: f64,
}

pub(crate) type PriceWindowWithSumOfSquares = PriceWindow<true>;

impl PriceWindow {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            sum: 0.0,
            sum_of_squares: 0.0,
            window: VecDeque::with_capacity(size),
        }
    }
}

impl PriceWindow<true> {
    pub fn with_sum_of_squares(size: usize) -> Self {
        Self {
            size,
            sum: 0.0,
            sum_of_squares: 0.0,
            window: VecDeque::with_capacity(size),
        }
    }
}

impl<const SUM_OF_SQUARES: bool> PriceWindow<SUM_OF_SQUARES> {
    /// Appends a value, evicting the oldest once the window is full.
    #[inline]
    pub fn push(&mut self, price: Price) {
        if self.is_ready()
            && let Some(old_price) = self.window.pop_front()
        {
            self.sum -= old_price;
            if SUM_OF_SQUARES {
                self.sum_of_squares -= old_price * old_price;
            }
        }

        self.window.push_back(price);
        self.sum += price;
        if SUM_OF_SQUARES {
            self.sum_of_squares += price * price;
        }
    }

    #[inline]
    pub fn sum(&self) -> Option<Price> {
        self.is_ready().then_some(self.sum)
    }

    /// Sum recomputed from the window contents, free of running drift.
    /// A window of exact zeros sums to exactly zero.
    #[inline]
    pub fn exact_sum(&self) -> Option<Price> {
        self.is_ready().then(|| self.window.iter().sum())
    }

    #[inline]
    pub fn sum_of_squares(&self) -> Option<Price> {
        debug_assert!(SUM_OF_SQUARES, "sum_of_squares requires PriceWindow<true>");
        self.is_ready().then_some(self.sum_of_squares)
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.window.len() == self.size
    }
}

impl PriceWindow<true> {
    /// Mean and population standard deviation of a full window.
    #[inline]
    pub fn mean_and_std_dev(&self) -> Option<(Price, f64)> {
        let (sum, sum_of_squares) = (self.sum()?, self.sum_of_squares()?);

        #[allow(clippy::cast_precision_loss)]
        let length_reciprocal = 1.0 / self.size as f64;
        let mean = sum * length_reciprocal;

        // Variance = E[X^2] - (E[X])^2 = (sum_of_squares / n) - mean^2
        let variance = sum_of_squares.mul_add(length_reciprocal, -(mean * mean));

        Some((mean, variance.max(0.0).sqrt()))
    }
}
