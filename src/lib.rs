//! Technical analysis indicators over daily OHLCV series.
//!
//! Every indicator comes in two shapes:
//!
//! - a batch function ([`ema`], [`rsi`], [`adx`], ...) taking whole columns
//!   through [`IntoSeries`] and returning aligned [`Series`] where `None`
//!   marks an undefined value;
//! - a streaming state machine ([`Ema`], [`Rsi`], [`Adx`], ...) fed one
//!   [`Ohlcv`] bar at a time.
//!
//! Each streaming type exposes [`new`](Sma::new), [`compute`](Sma::compute),
//! and [`value`](Sma::value) as inherent methods, so no trait import is
//! needed. Import [`Indicator`] only for generic code.
//!
//! [`Report`] bundles the configured indicators into named columns for one
//! [`PriceSeries`]; [`compute_reports`] does the same for many tickers in
//! parallel.

mod ad;
mod adx;
mod bb;
mod ema;
mod error;
mod indicator;
mod macd;
mod mfi;
mod moving_average;
mod obv;
mod ohlcv;
mod price_series;
mod price_source;
mod price_window;
mod report;
mod rma;
mod rsi;
mod series;
mod sma;
mod spline;
mod trend;
mod volume_index;

pub use crate::error::{Error, Result};
pub use crate::indicator::{Indicator, IndicatorConfig, IndicatorConfigBuilder};
pub use crate::ohlcv::{Bar, Ohlcv, Price};
pub use crate::price_series::PriceSeries;
pub use crate::price_source::PriceSource;
pub use crate::series::{IntoSeries, Sample, Series, compute_series};

pub use crate::ad::{Ad, AdConfig, AdConfigBuilder, AdSeries, ad, price_volume_zscore};
pub use crate::adx::{Adx, AdxConfig, AdxConfigBuilder, AdxSeries, AdxValue, adx};
pub use crate::bb::{
    Bb, BbConfig, BbConfigBuilder, BbValue, BollingerSeries, StdDev, bollinger, bollinger_series,
};
pub use crate::ema::{Alpha, Ema, EmaConfig, EmaConfigBuilder, ema, ema_with_alpha};
pub use crate::macd::{
    Macd, MacdConfig, MacdConfigBuilder, MacdMode, MacdSeries, MacdValue, macd, ppo,
};
pub use crate::mfi::{Mfi, MfiConfig, MfiConfigBuilder, mfi};
pub use crate::moving_average::MovingAverage;
pub use crate::obv::{Obv, ObvConfig, ObvConfigBuilder, obv};
pub use crate::report::{
    AdxParams, AverageSpec, BollingerParams, Column, MacdParams, Report, ReportConfig,
    VolumeIndexParams, compute_reports,
};
pub use crate::rma::{Rma, RmaConfig, RmaConfigBuilder, rma};
pub use crate::rsi::{Rsi, RsiConfig, RsiConfigBuilder, rsi};
pub use crate::sma::{Sma, SmaConfig, SmaConfigBuilder, sma};
pub use crate::spline::SplineSmoothing;
pub use crate::trend::{Direction, Slope, Strength, TrendLabel};
pub use crate::volume_index::{
    SeedBase, VolumeIndex, VolumeIndexConfig, VolumeIndexConfigBuilder, VolumeIndexPolicy,
    VolumeIndexSeries, VolumeIndexValue, volume_index,
};

macro_rules! impl_indicator_methods {
    ($type:ty, $config:ty, $output:ty) => {
        impl $type {
            /// See [`Indicator::new`].
            #[must_use]
            pub fn new(config: $config) -> Self {
                <Self as Indicator>::new(config)
            }

            /// See [`Indicator::compute`].
            #[inline]
            pub fn compute(&mut self, bar: &impl Ohlcv) -> Option<$output> {
                <Self as Indicator>::compute(self, bar)
            }

            /// See [`Indicator::value`].
            #[must_use]
            #[inline]
            pub fn value(&self) -> Option<$output> {
                <Self as Indicator>::value(self)
            }
        }
    };
}

impl_indicator_methods!(Sma, SmaConfig, Price);
impl_indicator_methods!(Ema, EmaConfig, Price);
impl_indicator_methods!(Rma, RmaConfig, Price);
impl_indicator_methods!(Rsi, RsiConfig, Price);
impl_indicator_methods!(Macd, MacdConfig, MacdValue);
impl_indicator_methods!(Obv, ObvConfig, Price);
impl_indicator_methods!(Mfi, MfiConfig, Price);
impl_indicator_methods!(Ad, AdConfig, Price);
impl_indicator_methods!(VolumeIndex, VolumeIndexConfig, VolumeIndexValue);
impl_indicator_methods!(Bb, BbConfig, BbValue);
impl_indicator_methods!(Adx, AdxConfig, AdxValue);

#[cfg(test)]
mod test_util;
