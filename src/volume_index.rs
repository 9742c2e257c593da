use std::{
    fmt::Display,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Indicator, IndicatorConfig, IndicatorConfigBuilder, IntoSeries, Ohlcv, Price,
    PriceSource, Result, Series,
    ema::{Ema, EmaConfig},
    series::{Columns, Feed, project},
    sma::validate_length,
};

/// How today's volume is judged "up" or "down".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeIndexPolicy {
    /// Seed base `1.0`; reference volume is the EMA of volume as of the
    /// previous bar.
    #[default]
    IndexVariant,
    /// Seed base `1000.0`; reference volume is the previous bar's volume.
    VolumeIndicatorVariant,
}

impl VolumeIndexPolicy {
    /// Index level the lines start at (and are rescaled to).
    #[must_use]
    pub fn default_base(self) -> SeedBase {
        match self {
            Self::IndexVariant => SeedBase(1.0),
            Self::VolumeIndicatorVariant => SeedBase(1000.0),
        }
    }
}

/// Starting level of the PVI/NVI lines.
///
/// Wraps a finite, positive `f64`. Implements `Eq` and `Hash` via bit-level
/// comparison, which is safe because NaN is rejected at construction.
#[derive(Clone, Copy, Debug)]
pub struct SeedBase(f64);

impl SeedBase {
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] unless `value` is finite and
    /// positive.
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(Error::invalid("base", "must be finite and positive"))
        }
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for SeedBase {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for SeedBase {}

impl Hash for SeedBase {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// Configuration for the Positive/Negative Volume Index ([`VolumeIndex`]).
///
/// Defaults: [`VolumeIndexPolicy::IndexVariant`], reference EMA of 9 bars,
/// overlays of 9 and 255 bars.
///
/// # Example
///
/// ```
/// use chartist_ta::{
///     IndicatorConfig, IndicatorConfigBuilder, VolumeIndexConfig, VolumeIndexPolicy,
/// };
///
/// let config = VolumeIndexConfig::builder()
///     .policy(VolumeIndexPolicy::VolumeIndicatorVariant)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.base().value(), 1000.0);
/// assert_eq!(config.long(), 255);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct VolumeIndexConfig {
    policy: VolumeIndexPolicy,
    base: SeedBase,
    reference: usize,
    short: usize,
    long: usize,
}

impl IndicatorConfig for VolumeIndexConfig {
    type Builder = VolumeIndexConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        VolumeIndexConfigBuilder::new()
    }

    #[inline]
    fn warm_up(&self) -> usize {
        0
    }

    #[inline]
    fn uses_volume(&self) -> bool {
        true
    }
}

impl VolumeIndexConfig {
    #[inline]
    #[must_use]
    pub fn policy(&self) -> VolumeIndexPolicy {
        self.policy
    }

    #[inline]
    #[must_use]
    pub fn base(&self) -> SeedBase {
        self.base
    }

    /// Length of the volume EMA used by [`VolumeIndexPolicy::IndexVariant`].
    #[inline]
    #[must_use]
    pub fn reference(&self) -> usize {
        self.reference
    }

    /// Length of the short EMA overlay.
    #[inline]
    #[must_use]
    pub fn short(&self) -> usize {
        self.short
    }

    /// Length of the long EMA overlay.
    #[inline]
    #[must_use]
    pub fn long(&self) -> usize {
        self.long
    }

    /// Default lengths with the given policy and its default base.
    #[must_use]
    pub fn with_policy(policy: VolumeIndexPolicy) -> Self {
        Self {
            policy,
            base: policy.default_base(),
            ..Self::default()
        }
    }
}

impl Default for VolumeIndexConfig {
    fn default() -> Self {
        let policy = VolumeIndexPolicy::default();
        Self {
            policy,
            base: policy.default_base(),
            reference: 9,
            short: 9,
            long: 255,
        }
    }
}

impl Display for VolumeIndexConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "VolumeIndexConfig({:?}, {}, {}, {}, {})",
            self.policy, self.base.0, self.reference, self.short, self.long
        )
    }
}

/// Builder for [`VolumeIndexConfig`].
///
/// The base follows the policy unless set explicitly.
pub struct VolumeIndexConfigBuilder {
    policy: VolumeIndexPolicy,
    base: Option<SeedBase>,
    reference: Option<usize>,
    short: Option<usize>,
    long: Option<usize>,
}

impl VolumeIndexConfigBuilder {
    fn new() -> Self {
        let defaults = VolumeIndexConfig::default();
        Self {
            policy: defaults.policy,
            base: None,
            reference: Some(defaults.reference),
            short: Some(defaults.short),
            long: Some(defaults.long),
        }
    }

    #[inline]
    #[must_use]
    pub fn policy(mut self, policy: VolumeIndexPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[inline]
    #[must_use]
    pub fn base(mut self, base: SeedBase) -> Self {
        self.base.replace(base);
        self
    }

    #[inline]
    #[must_use]
    pub fn reference(mut self, length: usize) -> Self {
        self.reference.replace(length);
        self
    }

    #[inline]
    #[must_use]
    pub fn short(mut self, length: usize) -> Self {
        self.short.replace(length);
        self
    }

    #[inline]
    #[must_use]
    pub fn long(mut self, length: usize) -> Self {
        self.long.replace(length);
        self
    }
}

impl IndicatorConfigBuilder<VolumeIndexConfig> for VolumeIndexConfigBuilder {
    fn build(self) -> Result<VolumeIndexConfig> {
        let length = |value, name| {
            validate_length(value).map_err(|_| Error::invalid(name, "must be at least 1"))
        };

        Ok(VolumeIndexConfig {
            policy: self.policy,
            base: self.base.unwrap_or(self.policy.default_base()),
            reference: length(self.reference, "reference")?,
            short: length(self.short, "short")?,
            long: length(self.long, "long")?,
        })
    }
}

/// PVI and NVI levels with their EMA overlays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolumeIndexValue {
    pub pvi: Price,
    pub nvi: Price,
    pub pvi_short: Price,
    pub pvi_long: Price,
    pub nvi_short: Price,
    pub nvi_long: Price,
}

impl Display for VolumeIndexValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VolumeIndexValue(pvi={}, nvi={})", self.pvi, self.nvi)
    }
}

/// One index line: raw level, running maximum and EMA overlays.
#[derive(Clone, Debug)]
struct Line {
    level: f64,
    peak: f64,
    short: Ema,
    long: Ema,
}

impl Line {
    fn new(config: &VolumeIndexConfig) -> Self {
        Self {
            level: config.base.0,
            peak: config.base.0,
            short: Ema::new(EmaConfig::validated(config.short, PriceSource::Close)),
            long: Ema::new(EmaConfig::validated(config.long, PriceSource::Close)),
        }
    }

    /// Applies the day's change (or not) and returns `(scaled, short, long)`.
    fn advance(&mut self, change: Option<f64>, base: f64) -> (Price, Price, Price) {
        if let Some(change) = change {
            self.level *= 1.0 + change;
        }
        self.peak = self.peak.max(self.level);

        let scaled = self.level / self.peak * base;
        let short = self.short.update(Some(scaled)).unwrap_or(scaled);
        let long = self.long.update(Some(scaled)).unwrap_or(scaled);

        (scaled, short, long)
    }
}

/// Positive and Negative Volume Index.
///
/// On each bar after the first, if volume exceeds the reference volume the
/// PVI compounds the day's relative close change and the NVI stays flat;
/// otherwise the NVI compounds it and the PVI stays flat:
///
/// ```text
/// PVI = prev_PVI × (1 + (close − prev_close) / prev_close)
/// ```
///
/// Each line is then divided by its running maximum and multiplied by the
/// seed base, so a new high always reads as the base. Both lines carry a
/// short and a long EMA overlay.
///
/// The reference volume depends on [`VolumeIndexPolicy`].
///
/// # Example
///
/// ```
/// use chartist_ta::{VolumeIndex, VolumeIndexConfig, VolumeIndexPolicy};
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
/// let config = VolumeIndexConfig::with_policy(VolumeIndexPolicy::VolumeIndicatorVariant);
/// let mut index = VolumeIndex::new(config);
///
/// assert_eq!(index.compute(&Bar(10.0, 100.0)).unwrap().pvi, 1000.0);
/// // Volume falls: NVI compounds the 10% drop
/// let value = index.compute(&Bar(9.0, 50.0)).unwrap();
/// assert_eq!(value.pvi, 1000.0);
/// assert!((value.nvi - 900.0).abs() < 1e-9);
/// ```
#[derive(Clone, Debug)]
pub struct VolumeIndex {
    config: VolumeIndexConfig,
    pvi: Line,
    nvi: Line,
    volume_ema: Ema,
    feed: Feed,
    prev: Option<(Price, f64)>,
    current: Option<VolumeIndexValue>,
}

impl Indicator for VolumeIndex {
    type Config = VolumeIndexConfig;
    type Output = VolumeIndexValue;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            pvi: Line::new(&config),
            nvi: Line::new(&config),
            volume_ema: Ema::new(EmaConfig::validated(config.reference, PriceSource::Volume)),
            feed: Feed::default(),
            prev: None,
            current: None,
        }
    }

    fn compute(&mut self, bar: &impl Ohlcv) -> Option<VolumeIndexValue> {
        let input = PriceSource::Close
            .extract(bar)
            .zip(PriceSource::Volume.extract(bar));

        let Some((close, volume)) = self.feed.admit(input) else {
            if self.feed.is_poisoned() {
                self.current = None;
            }
            return self.current;
        };

        let (pvi_change, nvi_change) = match self.prev {
            Some((prev_close, prev_volume)) => {
                let reference = match self.config.policy {
                    VolumeIndexPolicy::IndexVariant => {
                        self.volume_ema.value().unwrap_or(prev_volume)
                    }
                    VolumeIndexPolicy::VolumeIndicatorVariant => prev_volume,
                };
                let change = (prev_close != 0.0).then(|| (close - prev_close) / prev_close);

                if volume > reference {
                    (change, None)
                } else {
                    (None, change)
                }
            }
            None => (None, None),
        };

        self.volume_ema.update(Some(volume));
        self.prev = Some((close, volume));

        let base = self.config.base.0;
        let (pvi, pvi_short, pvi_long) = self.pvi.advance(pvi_change, base);
        let (nvi, nvi_short, nvi_long) = self.nvi.advance(nvi_change, base);

        self.current = Some(VolumeIndexValue {
            pvi,
            nvi,
            pvi_short,
            pvi_long,
            nvi_short,
            nvi_long,
        });

        self.current
    }

    #[inline]
    fn value(&self) -> Option<VolumeIndexValue> {
        self.current
    }
}

impl Display for VolumeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PVI/NVI({:?}, {}, {})",
            self.config.policy, self.config.short, self.config.long
        )
    }
}

/// Batch PVI/NVI output.
#[derive(Clone, Debug, PartialEq)]
pub struct VolumeIndexSeries {
    pub pvi: Series,
    pub nvi: Series,
    pub pvi_short: Series,
    pub pvi_long: Series,
    pub nvi_short: Series,
    pub nvi_long: Series,
}

/// PVI/NVI from close and volume columns.
///
/// A single missing volume makes every output undefined.
///
/// # Errors
///
/// [`Error::EmptyInput`] for empty input, [`Error::ShapeMismatch`] when the
/// columns differ in length.
pub fn volume_index(
    close: impl IntoSeries,
    volume: impl IntoSeries,
    config: VolumeIndexConfig,
) -> Result<VolumeIndexSeries> {
    let columns = Columns::close_volume(close.into_series(), volume.into_series())?;
    let values = columns.run::<VolumeIndex>(config);

    Ok(VolumeIndexSeries {
        pvi: project(&values, |v| Some(v.pvi)),
        nvi: project(&values, |v| Some(v.nvi)),
        pvi_short: project(&values, |v| Some(v.pvi_short)),
        pvi_long: project(&values, |v| Some(v.pvi_long)),
        nvi_short: project(&values, |v| Some(v.nvi_short)),
        nvi_long: project(&values, |v| Some(v.nvi_long)),
    })
}
