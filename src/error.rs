use thiserror::Error;

/// Errors returned by config construction and batch indicator calls.
///
/// Per-element failures (insufficient history, zero denominators, missing
/// volume) are never errors: they surface as `None` in the output series.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A parameter is out of its valid domain.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name, as spelled on the config builder.
        name: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },

    /// The input series has no elements.
    #[error("empty input: no data provided")]
    EmptyInput,

    /// Two series that must be aligned index-for-index differ in length.
    #[error("shape mismatch: `{series}` has {actual} elements, expected {expected}")]
    ShapeMismatch {
        /// Name of the offending series.
        series: &'static str,
        /// Length of the reference series.
        expected: usize,
        /// Length of the offending series.
        actual: usize,
    },

    /// Bar dates are not strictly increasing.
    #[error("bar dates must be strictly increasing: violation at index {index}")]
    UnorderedDates {
        /// Index of the first bar whose date is not after its predecessor.
        index: usize,
    },

    /// The smoothing spline could not be fitted.
    #[error("spline fit failed: {0}")]
    SplineFit(String),
}

impl Error {
    pub(crate) fn invalid(name: &'static str, reason: &'static str) -> Self {
        Self::InvalidParameter { name, reason }
    }
}

/// Convenience alias for results carrying the crate [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_parameter_message() {
        let err = Error::invalid("length", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "invalid parameter `length`: must be at least 1"
        );
    }

    #[test]
    fn empty_input_message() {
        assert_eq!(Error::EmptyInput.to_string(), "empty input: no data provided");
    }

    #[test]
    fn shape_mismatch_message() {
        let err = Error::ShapeMismatch {
            series: "low",
            expected: 10,
            actual: 9,
        };
        assert_eq!(
            err.to_string(),
            "shape mismatch: `low` has 9 elements, expected 10"
        );
    }

    #[test]
    fn unordered_dates_message() {
        let err = Error::UnorderedDates { index: 3 };
        assert_eq!(
            err.to_string(),
            "bar dates must be strictly increasing: violation at index 3"
        );
    }

    #[test]
    fn errors_compare_by_value() {
        assert_eq!(Error::EmptyInput, Error::EmptyInput);
        assert_ne!(
            Error::invalid("length", "must be at least 1"),
            Error::invalid("alpha", "must be in (0, 1]"),
        );
    }
}
