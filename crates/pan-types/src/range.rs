//! Range constraints attached to type definitions (`long(0..10)`, `string(..64)`).

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("invalid range '{0}'")]
    Invalid(String),

    #[error("range minimum {min} is greater than maximum {max}")]
    Inverted { min: i64, max: i64 },
}

/// An inclusive range with optional bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl Range {
    pub fn new(min: Option<i64>, max: Option<i64>) -> Result<Self, RangeError> {
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(RangeError::Inverted { min, max });
            }
        }
        Ok(Self { min, max })
    }

    /// `min..max`, both inclusive.
    pub fn between(min: i64, max: i64) -> Result<Self, RangeError> {
        Self::new(Some(min), Some(max))
    }

    pub fn at_least(min: i64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn at_most(max: i64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    /// Parse `a..b`, `a..`, `..b` or a single exact value `a`.
    pub fn parse(text: &str) -> Result<Self, RangeError> {
        let invalid = || RangeError::Invalid(text.to_string());
        let bound = |s: &str| -> Result<Option<i64>, RangeError> {
            let s = s.trim();
            if s.is_empty() {
                Ok(None)
            } else {
                s.parse::<i64>().map(Some).map_err(|_| invalid())
            }
        };

        match text.split_once("..") {
            Some((lo, hi)) => {
                let range = Self::new(bound(lo)?, bound(hi)?)?;
                if range.min.is_none() && range.max.is_none() {
                    return Err(invalid());
                }
                Ok(range)
            }
            None => {
                let exact = bound(text)?.ok_or_else(invalid)?;
                Self::between(exact, exact)
            }
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }

    pub fn contains_double(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min as f64)
            && self.max.map_or(true, |max| value <= max as f64)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (Some(min), Some(max)) if min == max => write!(f, "{min}"),
            (Some(min), Some(max)) => write!(f, "{min}..{max}"),
            (Some(min), None) => write!(f, "{min}.."),
            (None, Some(max)) => write!(f, "..{max}"),
            (None, None) => write!(f, ".."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_forms() {
        assert_eq!(Range::parse("0..10").unwrap(), Range::between(0, 10).unwrap());
        assert_eq!(Range::parse("5..").unwrap(), Range::at_least(5));
        assert_eq!(Range::parse("..3").unwrap(), Range::at_most(3));
        assert_eq!(Range::parse("4").unwrap(), Range::between(4, 4).unwrap());
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(Range::parse(".."), Err(RangeError::Invalid(_))));
        assert!(matches!(Range::parse("x..2"), Err(RangeError::Invalid(_))));
        assert_eq!(
            Range::parse("10..1"),
            Err(RangeError::Inverted { min: 10, max: 1 })
        );
    }

    #[test]
    fn containment() {
        let r = Range::between(6, 10).unwrap();
        assert!(!r.contains(5));
        assert!(r.contains(6));
        assert!(r.contains(10));
        assert!(!r.contains_double(10.5));
        assert!(Range::at_least(0).contains(i64::MAX));
    }

    #[test]
    fn display_round_trips() {
        for text in ["0..10", "5..", "..3", "4"] {
            assert_eq!(Range::parse(text).unwrap().to_string(), text);
        }
    }
}
