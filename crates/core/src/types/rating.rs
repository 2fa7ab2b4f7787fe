//! Rating value type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a rating value is outside the allowed range.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("rating must be an integer between {min} and {max}, got {got}", min = RatingValue::MIN, max = RatingValue::MAX)]
pub struct RatingValueError {
    /// The rejected input value.
    pub got: i64,
}

/// A star rating, always in the range 1..=5.
///
/// Construct via [`RatingValue::new`]; the invariant holds for every value of
/// this type, so aggregation code never re-checks the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlite", sqlx(transparent))]
#[serde(transparent)]
pub struct RatingValue(i64);

impl RatingValue {
    /// Lowest allowed rating.
    pub const MIN: i64 = 1;
    /// Highest allowed rating.
    pub const MAX: i64 = 5;

    /// Create a rating value, rejecting anything outside 1..=5.
    ///
    /// # Errors
    ///
    /// Returns [`RatingValueError`] when `value` is out of range.
    pub const fn new(value: i64) -> Result<Self, RatingValueError> {
        if value >= Self::MIN && value <= Self::MAX {
            Ok(Self(value))
        } else {
            Err(RatingValueError { got: value })
        }
    }

    /// Get the underlying integer value.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RatingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for RatingValue {
    type Error = RatingValueError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RatingValue> for i64 {
    fn from(value: RatingValue) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_full_range() {
        for v in 1..=5 {
            assert_eq!(RatingValue::new(v).expect("in range").as_i64(), v);
        }
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert_eq!(RatingValue::new(0), Err(RatingValueError { got: 0 }));
        assert_eq!(RatingValue::new(6), Err(RatingValueError { got: 6 }));
        assert_eq!(RatingValue::new(-3), Err(RatingValueError { got: -3 }));
    }

    #[test]
    fn test_serde_transparent() {
        let v = RatingValue::new(4).expect("in range");
        assert_eq!(serde_json::to_string(&v).expect("serialize"), "4");
    }
}
