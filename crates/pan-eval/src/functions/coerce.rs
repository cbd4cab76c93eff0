//! Argument access and numeric coercions shared by the built-ins.

use super::BuiltIn;
use crate::element::{Element, HashResource, ListResource};
use crate::error::EvalResult;
use pan_types::{ErrorCode, PanError};

/// Evaluated arguments of one built-in call.
pub(crate) struct Args<'a> {
    function: BuiltIn,
    values: &'a [Element],
}

impl<'a> Args<'a> {
    pub fn new(function: BuiltIn, values: &'a [Element]) -> Self {
        Self { function, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, index: usize) -> EvalResult<&'a Element> {
        self.values.get(index).ok_or_else(|| {
            PanError::internal(format!(
                "{}() called without argument {}",
                self.function.name(),
                index + 1
            ))
        })
    }

    pub fn all(&self) -> &'a [Element] {
        self.values
    }

    /// Error naming the offending argument (1-based in the message).
    pub fn mismatch(&self, index: usize, expected: &str) -> PanError {
        let found = self
            .values
            .get(index)
            .map_or("nothing", Element::type_name);
        PanError::new(
            ErrorCode::ARGUMENT_TYPE_MISMATCH,
            format!(
                "{}(): argument {} must be {expected}, found {found}",
                self.function.name(),
                index + 1
            ),
        )
    }

    /// Error for a well-typed but unusable argument value.
    pub fn invalid(&self, message: impl std::fmt::Display) -> PanError {
        PanError::new(
            ErrorCode::ARGUMENT_TYPE_MISMATCH,
            format!("{}(): {message}", self.function.name()),
        )
    }

    pub fn string(&self, index: usize) -> EvalResult<&'a str> {
        self.get(index)?
            .as_str()
            .ok_or_else(|| self.mismatch(index, "a string"))
    }

    pub fn long(&self, index: usize) -> EvalResult<i64> {
        self.get(index)?
            .as_long()
            .ok_or_else(|| self.mismatch(index, "a long"))
    }

    pub fn list(&self, index: usize) -> EvalResult<&'a ListResource> {
        self.get(index)?
            .as_list()
            .ok_or_else(|| self.mismatch(index, "a list"))
    }

    pub fn hash(&self, index: usize) -> EvalResult<&'a HashResource> {
        self.get(index)?
            .as_hash()
            .ok_or_else(|| self.mismatch(index, "a dict"))
    }
}

/// Round half up, saturating at the `i64` bounds (NaN becomes 0).
pub fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

/// Decode an integer literal: optional sign, then `0x`/`0X`/`#` for hex,
/// a leading `0` for octal, decimal otherwise.
pub fn decode_long(text: &str) -> Option<i64> {
    let (negative, rest) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let (radix, digits) = if let Some(hex) = rest
        .strip_prefix("0x")
        .or_else(|| rest.strip_prefix("0X"))
        .or_else(|| rest.strip_prefix('#'))
    {
        (16, hex)
    } else if rest.len() > 1 && rest.starts_with('0') {
        (8, &rest[1..])
    } else {
        (10, rest)
    };

    parse_radix(digits, radix, negative)
}

/// Parse unsigned `digits` in `radix`, applying the sign without overflowing on `i64::MIN`.
pub fn parse_radix(digits: &str, radix: u32, negative: bool) -> Option<i64> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let signed = if negative {
        format!("-{digits}")
    } else {
        digits.to_string()
    };
    i64::from_str_radix(&signed, radix).ok()
}

pub fn invalid_numeric(text: &str, target: &str) -> PanError {
    PanError::new(
        ErrorCode::INVALID_NUMERIC_LITERAL,
        format!("'{text}' is not a valid {target} literal"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_forms() {
        assert_eq!(decode_long("42"), Some(42));
        assert_eq!(decode_long("-42"), Some(-42));
        assert_eq!(decode_long("+7"), Some(7));
        assert_eq!(decode_long("0x1F"), Some(31));
        assert_eq!(decode_long("#ff"), Some(255));
        assert_eq!(decode_long("010"), Some(8));
        assert_eq!(decode_long("0"), Some(0));
        assert_eq!(decode_long("-9223372036854775808"), Some(i64::MIN));
    }

    #[test]
    fn decode_rejects() {
        for text in ["", "-", "0x", "08", "1.5", "abc", "--1", "0x-1", " 1"] {
            assert_eq!(decode_long(text), None, "{text}");
        }
        assert_eq!(decode_long("9223372036854775808"), None);
    }

    #[test]
    fn rounding() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(2.49), 2);
        assert_eq!(round_half_up(f64::NAN), 0);
    }
}
