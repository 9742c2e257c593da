//! Named indicator columns for one or many instruments.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    AdxConfig, IndicatorConfig, IndicatorConfigBuilder, MovingAverage, PriceSeries, Result,
    SeedBase, Series, SplineSmoothing, VolumeIndexConfig, VolumeIndexPolicy, ad, adx, bollinger,
    macd, mfi, obv, ppo, price_volume_zscore, rsi, volume_index,
};

/// One moving average of the close.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AverageSpec {
    #[serde(default)]
    pub kind: MovingAverage,
    pub length: usize,
}

impl AverageSpec {
    #[must_use]
    pub fn new(kind: MovingAverage, length: usize) -> Self {
        Self { kind, length }
    }

    /// Column name, e.g. `Close_EMA9`.
    #[must_use]
    pub fn column(&self) -> String {
        format!("Close_{}{}", self.kind.label(), self.length)
    }
}

/// Lengths of a MACD or PPO.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BollingerParams {
    pub length: usize,
    pub multiplier: f64,
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self {
            length: 20,
            multiplier: 2.0,
        }
    }
}

/// PVI/NVI parameters. `base` follows the policy when absent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeIndexParams {
    pub policy: VolumeIndexPolicy,
    pub base: Option<f64>,
    pub reference: usize,
    pub short: usize,
    pub long: usize,
}

impl Default for VolumeIndexParams {
    fn default() -> Self {
        let defaults = VolumeIndexConfig::default();
        Self {
            policy: defaults.policy(),
            base: None,
            reference: defaults.reference(),
            short: defaults.short(),
            long: defaults.long(),
        }
    }
}

impl VolumeIndexParams {
    fn config(&self) -> Result<VolumeIndexConfig> {
        let mut builder = VolumeIndexConfig::builder()
            .policy(self.policy)
            .reference(self.reference)
            .short(self.short)
            .long(self.long);
        if let Some(base) = self.base {
            builder = builder.base(SeedBase::new(base)?);
        }
        builder.build()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdxParams {
    pub di_length: usize,
    pub adx_length: usize,
    pub smoothing: f64,
}

impl Default for AdxParams {
    fn default() -> Self {
        let defaults = AdxConfig::default();
        Self {
            di_length: defaults.di_length(),
            adx_length: defaults.adx_length(),
            smoothing: defaults.smoothing().value(),
        }
    }
}

impl AdxParams {
    fn config(&self) -> Result<AdxConfig> {
        AdxConfig::builder()
            .di_length(self.di_length)
            .adx_length(self.adx_length)
            .smoothing(SplineSmoothing::new(self.smoothing)?)
            .build()
    }
}

/// Selects the indicators a [`Report`] computes.
///
/// Every field is optional when deserialising; missing fields take the
/// defaults below. `None` or `false` leaves the indicator out.
///
/// # Example
///
/// ```
/// use chartist_ta::ReportConfig;
///
/// let config: ReportConfig = serde_json::from_str(r#"{
///     "averages": [{ "kind": "simple", "length": 5 }],
///     "rsi": 7,
///     "adx": null
/// }"#).unwrap();
///
/// assert_eq!(config.rsi, Some(7));
/// assert_eq!(config.adx, None);
/// assert_eq!(config.mfi, Some(14));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Moving averages of the close. Defaults to EMA 9 and SMA 20.
    pub averages: Vec<AverageSpec>,
    /// RSI length, default 14.
    pub rsi: Option<usize>,
    pub macd: Option<MacdParams>,
    pub ppo: Option<MacdParams>,
    pub obv: bool,
    /// Z-score of close × volume.
    pub price_volume_zscore: bool,
    /// A/D line and its Z-score.
    pub ad: bool,
    pub volume_index: Option<VolumeIndexParams>,
    pub bollinger: Option<BollingerParams>,
    /// MFI length, default 14.
    pub mfi: Option<usize>,
    pub adx: Option<AdxParams>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            averages: vec![
                AverageSpec::new(MovingAverage::Exponential, 9),
                AverageSpec::new(MovingAverage::Simple, 20),
            ],
            rsi: Some(14),
            macd: Some(MacdParams::default()),
            ppo: Some(MacdParams::default()),
            obv: true,
            price_volume_zscore: true,
            ad: true,
            volume_index: Some(VolumeIndexParams::default()),
            bollinger: Some(BollingerParams::default()),
            mfi: Some(14),
            adx: Some(AdxParams::default()),
        }
    }
}

/// One named report column.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Column {
    Values(Series),
    Labels(Vec<Option<String>>),
}

impl Column {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Values(values) => values.len(),
            Self::Labels(labels) => labels.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn as_values(&self) -> Option<&Series> {
        match self {
            Self::Values(values) => Some(values),
            Self::Labels(_) => None,
        }
    }

    #[must_use]
    pub fn as_labels(&self) -> Option<&[Option<String>]> {
        match self {
            Self::Labels(labels) => Some(labels),
            Self::Values(_) => None,
        }
    }
}

/// Indicator columns aligned with the bars of one [`PriceSeries`].
///
/// Columns keep the order in which they were computed.
///
/// # Example
///
/// ```
/// use chartist_ta::{Bar, PriceSeries, Report, ReportConfig};
/// use chrono::NaiveDate;
///
/// let bars = (1..=5)
///     .map(|d| {
///         let day = NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
///         let close = f64::from(d) + 10.0;
///         Bar::new(day, close, close + 1.0, close - 1.0, close, Some(1000))
///     })
///     .collect();
/// let series = PriceSeries::new(bars).unwrap();
///
/// let report = Report::compute(&series, &ReportConfig::default()).unwrap();
/// assert_eq!(report.len(), 5);
/// assert_eq!(report.values("OBV").unwrap()[4], Some(4000.0));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    len: usize,
    columns: Vec<(String, Column)>,
}

impl Report {
    /// Computes every indicator selected by `config`.
    ///
    /// Missing volume never fails a report: volume-based columns are then
    /// undefined throughout.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`](crate::Error::InvalidParameter) for any
    /// invalid parameter in `config`.
    pub fn compute(series: &PriceSeries, config: &ReportConfig) -> Result<Self> {
        let mut report = Self {
            len: series.len(),
            columns: Vec::new(),
        };

        let high = series.high();
        let low = series.low();
        let close = series.close();
        let volume = series.volume();

        for average in &config.averages {
            report.insert(average.column(), average.kind.apply(&close, average.length)?);
        }

        if let Some(length) = config.rsi {
            report.insert(format!("RSI_{length}"), rsi(&close, length)?);
        }

        if let Some(params) = config.macd {
            let out = macd(&close, params.fast, params.slow, params.signal)?;
            report.insert("MACD", out.line);
            report.insert("MACD_signal", out.signal);
            report.insert("MACD_hist", out.histogram);
        }

        if let Some(params) = config.ppo {
            let out = ppo(&close, params.fast, params.slow, params.signal)?;
            report.insert("PPO", out.line);
            report.insert("PPO_signal", out.signal);
            report.insert("PPO_hist", out.histogram);
        }

        if config.obv {
            report.insert("OBV", obv(&close, &volume)?);
        }

        if config.price_volume_zscore {
            report.insert("PV_zscore", price_volume_zscore(&close, &volume)?);
        }

        if config.ad {
            let out = ad(&high, &low, &close, &volume)?;
            report.insert("AD", out.line);
            report.insert("AD_zscore", out.zscore);
        }

        if let Some(params) = config.volume_index {
            let out = volume_index(&close, &volume, params.config()?)?;
            report.insert("PVI", out.pvi);
            report.insert("NVI", out.nvi);
            report.insert(format!("PVI_EMA{}", params.short), out.pvi_short);
            report.insert(format!("PVI_EMA{}", params.long), out.pvi_long);
            report.insert(format!("NVI_EMA{}", params.short), out.nvi_short);
            report.insert(format!("NVI_EMA{}", params.long), out.nvi_long);
        }

        if let Some(params) = config.bollinger {
            let out = bollinger(&high, &low, &close, params.length, params.multiplier)?;
            report.insert("BB_upper", out.upper);
            report.insert("BB_middle", out.middle);
            report.insert("BB_lower", out.lower);
        }

        if let Some(length) = config.mfi {
            report.insert(format!("MFI_{length}"), mfi(&high, &low, &close, &volume, length)?);
        }

        if let Some(params) = config.adx {
            let out = adx(&high, &low, &close, params.config()?)?;
            let codes = out.trend.iter().map(|l| l.map(|l| l.code())).collect();
            let phrases = out.trend.iter().map(|l| l.map(|l| l.phrase())).collect();
            report.insert("ADX", out.adx);
            report.insert("+DI", out.plus_di);
            report.insert("-DI", out.minus_di);
            report.insert("ADX_spline", out.spline);
            report.insert("ADX_trend", Column::Labels(codes));
            report.insert("ADX_trend_label", Column::Labels(phrases));
        }

        tracing::debug!(
            bars = report.len,
            columns = report.columns.len(),
            "report computed"
        );

        Ok(report)
    }

    /// Adds a column, replacing any column of the same name in place.
    fn insert(&mut self, name: impl Into<String>, column: impl Into<Column>) {
        let (name, column) = (name.into(), column.into());
        debug_assert_eq!(column.len(), self.len, "column `{name}` is misaligned");

        match self.columns.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = column,
            None => self.columns.push((name, column)),
        }
    }

    /// Number of bars every column is aligned with.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(name, column)| (name.as_str(), column))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find_map(|(existing, column)| (existing == name).then_some(column))
    }

    /// Numeric column by name.
    #[must_use]
    pub fn values(&self, name: &str) -> Option<&Series> {
        self.get(name).and_then(Column::as_values)
    }

    /// Label column by name.
    #[must_use]
    pub fn labels(&self, name: &str) -> Option<&[Option<String>]> {
        self.get(name).and_then(Column::as_labels)
    }
}

impl From<Series> for Column {
    fn from(values: Series) -> Self {
        Self::Values(values)
    }
}

/// Computes a [`Report`] for every ticker in parallel.
///
/// Results come back in input order.
///
/// # Errors
///
/// The first [`Error::InvalidParameter`](crate::Error::InvalidParameter)
/// raised by `config`.
///
/// # Example
///
/// ```
/// use chartist_ta::{Bar, PriceSeries, ReportConfig, compute_reports};
/// use chrono::NaiveDate;
///
/// let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
/// let single = |close| PriceSeries::new(vec![Bar::new(day, close, close, close, close, None)]).unwrap();
/// let universe = vec![("AAA".to_owned(), single(10.0)), ("BBB".to_owned(), single(20.0))];
///
/// let reports = compute_reports(&universe, &ReportConfig::default()).unwrap();
/// assert_eq!(reports[0].0, "AAA");
/// assert_eq!(reports[1].1.values("Close_EMA9").unwrap(), &vec![Some(20.0)]);
/// ```
pub fn compute_reports(
    universe: &[(String, PriceSeries)],
    config: &ReportConfig,
) -> Result<Vec<(String, Report)>> {
    tracing::debug!(tickers = universe.len(), "computing reports");

    universe
        .par_iter()
        .map(|(ticker, series)| Ok((ticker.clone(), Report::compute(series, config)?)))
        .collect::<Result<Vec<_>>>()
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::{Bar, Error};
    use chrono::NaiveDate;

    fn series(closes: &[f64], volume: Option<u64>) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = closes
            .iter()
            .zip(start.iter_days())
            .map(|(&close, date)| Bar::new(date, close, close + 1.0, close - 1.0, close, volume))
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    fn rising(n: u32) -> PriceSeries {
        let closes: Vec<f64> = (0..n).map(|i| 50.0 + f64::from(i)).collect();
        series(&closes, Some(1_000))
    }

    mod config {
        use super::*;

        #[test]
        fn empty_json_is_default() {
            let config: ReportConfig = serde_json::from_str("{}").unwrap();
            assert_eq!(config, ReportConfig::default());
        }

        #[test]
        fn nested_defaults_fill_missing_fields() {
            let config: ReportConfig =
                serde_json::from_str(r#"{"macd": {"fast": 5}, "bollinger": {}}"#).unwrap();
            assert_eq!(
                config.macd,
                Some(MacdParams {
                    fast: 5,
                    slow: 26,
                    signal: 9
                })
            );
            assert_eq!(config.bollinger, Some(BollingerParams::default()));
        }

        #[test]
        fn average_kind_defaults_to_exponential() {
            let average: AverageSpec = serde_json::from_str(r#"{"length": 3}"#).unwrap();
            assert_eq!(average.kind, MovingAverage::Exponential);
            assert_eq!(average.column(), "Close_EMA3");
        }

        #[test]
        fn volume_index_policy_parses() {
            let params: VolumeIndexParams =
                serde_json::from_str(r#"{"policy": "volume_indicator_variant"}"#).unwrap();
            let config = params.config().unwrap();
            assert_eq!(config.policy(), VolumeIndexPolicy::VolumeIndicatorVariant);
            assert_eq!(config.base().value(), 1000.0);
        }
    }

    mod columns {
        use super::*;

        #[test]
        fn default_report_names() {
            let report = Report::compute(&rising(30), &ReportConfig::default()).unwrap();
            let names: Vec<&str> = report.names().collect();
            assert_eq!(
                names,
                [
                    "Close_EMA9",
                    "Close_SMA20",
                    "RSI_14",
                    "MACD",
                    "MACD_signal",
                    "MACD_hist",
                    "PPO",
                    "PPO_signal",
                    "PPO_hist",
                    "OBV",
                    "PV_zscore",
                    "AD",
                    "AD_zscore",
                    "PVI",
                    "NVI",
                    "PVI_EMA9",
                    "PVI_EMA255",
                    "NVI_EMA9",
                    "NVI_EMA255",
                    "BB_upper",
                    "BB_middle",
                    "BB_lower",
                    "MFI_14",
                    "ADX",
                    "+DI",
                    "-DI",
                    "ADX_spline",
                    "ADX_trend",
                    "ADX_trend_label",
                ]
            );
        }

        #[test]
        fn every_column_is_aligned() {
            let report = Report::compute(&rising(30), &ReportConfig::default()).unwrap();
            assert!(report.columns().all(|(_, column)| column.len() == 30));
        }

        #[test]
        fn trend_columns_are_labels() {
            let report = Report::compute(&rising(30), &ReportConfig::default()).unwrap();
            assert!(report.values("ADX_trend").is_none());

            let codes = report.labels("ADX_trend").unwrap();
            let phrases = report.labels("ADX_trend_label").unwrap();
            let last = codes.len() - 1;
            assert!(codes[last].as_deref().unwrap().ends_with('U'));
            assert!(phrases[last].as_deref().unwrap().ends_with("uptrend"));
        }

        #[test]
        fn selected_columns_only() {
            let config = ReportConfig {
                averages: vec![AverageSpec::new(MovingAverage::Wilder, 3)],
                rsi: None,
                macd: None,
                ppo: None,
                obv: false,
                price_volume_zscore: false,
                ad: false,
                volume_index: None,
                bollinger: None,
                mfi: None,
                adx: None,
            };
            let report = Report::compute(&series(&[2.0, 4.0, 6.0], None), &config).unwrap();
            assert_eq!(report.names().collect::<Vec<_>>(), ["Close_RMA3"]);
            assert_eq!(report.values("Close_RMA3").unwrap(), &vec![None, None, Some(4.0)]);
        }

        #[test]
        fn coinciding_overlay_lengths_share_a_column() {
            let config = ReportConfig {
                volume_index: Some(VolumeIndexParams {
                    short: 5,
                    long: 5,
                    ..VolumeIndexParams::default()
                }),
                ..ReportConfig::default()
            };
            let report = Report::compute(&rising(10), &config).unwrap();
            assert_eq!(report.names().filter(|n| *n == "PVI_EMA5").count(), 1);
        }
    }

    mod volume {
        use super::*;

        #[test]
        fn missing_volume_leaves_volume_columns_undefined() {
            let report = Report::compute(&series(&[10.0, 11.0, 12.0], None), &ReportConfig::default())
                .unwrap();
            for name in ["OBV", "PV_zscore", "AD", "PVI", "NVI", "MFI_14"] {
                assert_eq!(report.values(name).unwrap(), &vec![None; 3], "{name}");
            }
            assert_eq!(
                report.values("Close_EMA9").unwrap()[0],
                Some(10.0),
                "price columns are unaffected"
            );
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn invalid_length_fails_the_report() {
            let config = ReportConfig {
                rsi: Some(0),
                ..ReportConfig::default()
            };
            assert!(matches!(
                Report::compute(&rising(5), &config),
                Err(Error::InvalidParameter { .. })
            ));
        }

        #[test]
        fn invalid_smoothing_fails_the_report() {
            let config = ReportConfig {
                adx: Some(AdxParams {
                    smoothing: 2.0,
                    ..AdxParams::default()
                }),
                ..ReportConfig::default()
            };
            assert!(matches!(
                Report::compute(&rising(5), &config),
                Err(Error::InvalidParameter {
                    name: "smoothing",
                    ..
                })
            ));
        }
    }

    mod universe {
        use super::*;

        #[test]
        fn keeps_input_order() {
            let universe: Vec<(String, PriceSeries)> = (0..16)
                .map(|i| (format!("T{i:02}"), rising(5 + i)))
                .collect();

            let reports = compute_reports(&universe, &ReportConfig::default()).unwrap();

            assert_eq!(reports.len(), 16);
            for (i, (ticker, report)) in reports.iter().enumerate() {
                assert_eq!(ticker, &universe[i].0);
                assert_eq!(report.len(), universe[i].1.len());
            }
        }

        #[test]
        fn empty_universe() {
            assert!(compute_reports(&[], &ReportConfig::default()).unwrap().is_empty());
        }

        #[test]
        fn matches_single_computation() {
            let universe = vec![("A".to_owned(), rising(12))];
            let config = ReportConfig::default();
            let reports = compute_reports(&universe, &config).unwrap();
            assert_eq!(reports[0].1, Report::compute(&universe[0].1, &config).unwrap());
        }
    }
}
