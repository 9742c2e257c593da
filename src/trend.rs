//! Qualitative trend labels derived from the smoothed ADX curve.

use std::fmt::Display;

use serde::Serialize;

use crate::Price;

/// Change of trend strength against the previous bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Slope {
    Continued,
    Unchanged,
    Faded,
}

impl Slope {
    /// Compares the smoothed ADX with its previous value.
    #[allow(clippy::float_cmp)]
    #[must_use]
    pub fn between(previous: Price, current: Price) -> Self {
        if current > previous {
            Self::Continued
        } else if current == previous {
            Self::Unchanged
        } else {
            Self::Faded
        }
    }

    fn word(self) -> &'static str {
        match self {
            Self::Continued => "continued",
            Self::Unchanged => "unchanged",
            Self::Faded => "faded",
        }
    }

    fn code(self) -> char {
        match self {
            Self::Continued => 'C',
            Self::Unchanged => 'U',
            Self::Faded => 'F',
        }
    }
}

/// Trend strength band of the smoothed ADX.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    /// Below 20.
    Weak,
    /// 20 to 40 inclusive.
    Moderate,
    /// Above 40.
    Strong,
}

impl Strength {
    #[must_use]
    pub fn of(adx: Price) -> Self {
        if adx < 20.0 {
            Self::Weak
        } else if adx <= 40.0 {
            Self::Moderate
        } else {
            Self::Strong
        }
    }

    fn word(self) -> &'static str {
        match self {
            Self::Weak => "weak",
            Self::Moderate => "moderate",
            Self::Strong => "strong",
        }
    }

    fn code(self) -> char {
        match self {
            Self::Weak => 'W',
            Self::Moderate => 'M',
            Self::Strong => 'S',
        }
    }
}

/// Which directional indicator dominates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    Uptrend,
    Downtrend,
    NoTrend,
}

impl Direction {
    /// `+DI` above `-DI` is an uptrend, below is a downtrend. Equal or
    /// undefined values carry no trend.
    #[must_use]
    pub fn of(plus_di: Option<Price>, minus_di: Option<Price>) -> Self {
        match plus_di.zip(minus_di) {
            Some((plus, minus)) if plus > minus => Self::Uptrend,
            Some((plus, minus)) if plus < minus => Self::Downtrend,
            _ => Self::NoTrend,
        }
    }

    fn word(self) -> &'static str {
        match self {
            Self::Uptrend => "uptrend",
            Self::Downtrend => "downtrend",
            Self::NoTrend => "no-trend",
        }
    }

    fn code(self) -> char {
        match self {
            Self::Uptrend => 'U',
            Self::Downtrend => 'D',
            Self::NoTrend => 'N',
        }
    }
}

/// Per-bar trend classification.
///
/// ```
/// use chartist_ta::{Direction, Slope, Strength, TrendLabel};
///
/// let label = TrendLabel {
///     slope: Some(Slope::Continued),
///     strength: Strength::Strong,
///     direction: Direction::Uptrend,
/// };
/// assert_eq!(label.phrase(), "continued strong uptrend");
/// assert_eq!(label.code(), "CSU");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TrendLabel {
    /// Undefined on the first classified bar.
    pub slope: Option<Slope>,
    pub strength: Strength,
    pub direction: Direction,
}

impl TrendLabel {
    /// Human-readable phrase, e.g. `"faded weak downtrend"`. The slope word
    /// is omitted where the slope is undefined.
    #[must_use]
    pub fn phrase(&self) -> String {
        let words = [
            self.slope.map(Slope::word),
            Some(self.strength.word()),
            Some(self.direction.word()),
        ];
        words.into_iter().flatten().collect::<Vec<_>>().join(" ")
    }

    /// Fixed-width three-character code: slope (`C`/`U`/`F`, `-` when
    /// undefined), strength (`W`/`M`/`S`), direction (`U`/`D`/`N`).
    #[must_use]
    pub fn code(&self) -> String {
        [
            self.slope.map_or('-', Slope::code),
            self.strength.code(),
            self.direction.code(),
        ]
        .iter()
        .collect()
    }
}

impl Display for TrendLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.phrase())
    }
}

/// Labels every bar where the smoothed curve is defined.
pub(crate) fn classify(
    curve: &[Option<Price>],
    plus_di: &[Option<Price>],
    minus_di: &[Option<Price>],
) -> Vec<Option<TrendLabel>> {
    let mut previous = None;

    curve
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let value = (*value)?;
            let slope = previous.map(|prev| Slope::between(prev, value));
            previous = Some(value);

            Some(TrendLabel {
                slope,
                strength: Strength::of(value),
                direction: Direction::of(plus_di[i], minus_di[i]),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    mod strength {
        use super::*;

        #[test]
        fn band_edges() {
            assert_eq!(Strength::of(19.999), Strength::Weak);
            assert_eq!(Strength::of(20.0), Strength::Moderate);
            assert_eq!(Strength::of(40.0), Strength::Moderate);
            assert_eq!(Strength::of(40.001), Strength::Strong);
        }
    }

    mod slope {
        use super::*;

        #[test]
        fn compares_with_previous() {
            assert_eq!(Slope::between(10.0, 11.0), Slope::Continued);
            assert_eq!(Slope::between(10.0, 10.0), Slope::Unchanged);
            assert_eq!(Slope::between(10.0, 9.0), Slope::Faded);
        }
    }

    mod direction {
        use super::*;

        #[test]
        fn dominant_indicator_wins() {
            assert_eq!(Direction::of(Some(30.0), Some(10.0)), Direction::Uptrend);
            assert_eq!(Direction::of(Some(10.0), Some(30.0)), Direction::Downtrend);
        }

        #[test]
        fn equal_or_undefined_is_no_trend() {
            assert_eq!(Direction::of(Some(15.0), Some(15.0)), Direction::NoTrend);
            assert_eq!(Direction::of(None, Some(15.0)), Direction::NoTrend);
            assert_eq!(Direction::of(None, None), Direction::NoTrend);
        }
    }

    mod label {
        use super::*;

        #[test]
        fn phrase_without_slope() {
            let label = TrendLabel {
                slope: None,
                strength: Strength::Weak,
                direction: Direction::NoTrend,
            };
            assert_eq!(label.phrase(), "weak no-trend");
            assert_eq!(label.code(), "-WN");
            assert_eq!(label.to_string(), "weak no-trend");
        }

        #[test]
        fn code_is_three_characters() {
            let label = TrendLabel {
                slope: Some(Slope::Faded),
                strength: Strength::Moderate,
                direction: Direction::Downtrend,
            };
            assert_eq!(label.code(), "FMD");
            assert_eq!(label.phrase(), "faded moderate downtrend");
        }

        #[test]
        fn serializes_lowercase() {
            let label = TrendLabel {
                slope: Some(Slope::Unchanged),
                strength: Strength::Strong,
                direction: Direction::NoTrend,
            };
            assert_eq!(
                serde_json::to_string(&label).unwrap(),
                r#"{"slope":"unchanged","strength":"strong","direction":"no-trend"}"#
            );
        }
    }

    mod classify {
        use super::*;

        #[test]
        fn first_classified_bar_has_no_slope() {
            let curve = [None, Some(25.0), Some(26.0), Some(26.0), Some(19.0)];
            let plus = [None, Some(30.0), Some(30.0), Some(10.0), Some(20.0)];
            let minus = [None, Some(10.0), Some(10.0), Some(30.0), Some(20.0)];

            let labels = classify(&curve, &plus, &minus);

            assert_eq!(labels[0], None);
            let codes: Vec<String> = labels[1..].iter().map(|l| l.unwrap().code()).collect();
            assert_eq!(codes, ["-MU", "CMU", "UMD", "FWN"]);
        }
    }
}
