//! Error types for the DML engine.
//!
//! Low-level element operations fail with [`ElementError`], which knows
//! nothing about source locations. Operators convert these into
//! [`PanError`] and attach the variable reference and source range as
//! the error unwinds.

use pan_types::{format_reference, ErrorCode, PanError, Range, Term, TermError};
use thiserror::Error;

/// Failures raised by the element model itself.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ElementError {
    /// Dereference of a scalar, `undef` or `null`.
    #[error("cannot dereference a {0} value")]
    IllegalDereference(&'static str),

    #[error("cannot use key '{0}' to dereference a list")]
    KeyOnList(String),

    #[error("cannot use index {0} to dereference a dict")]
    IndexOnHash(u64),

    /// A path that must exist does not.
    #[error("element '{0}' is not defined")]
    Undefined(Term),

    #[error("cannot add a child to a {0} value")]
    CannotAddChild(&'static str),

    #[error("index {index} is too far past the end of a list of length {len}")]
    IndexTooFar { index: u64, len: usize },

    #[error("expected a list but found {0}")]
    NotAList(&'static str),

    #[error("cannot replace {old} with {new}")]
    InvalidReplacement {
        old: &'static str,
        new: &'static str,
    },

    #[error("{value} is outside range {range}")]
    RangeMismatch { value: String, range: Range },

    #[error("range check is not valid for {0} values")]
    InvalidRangeCheck(&'static str),

    #[error("path has no terms")]
    EmptyPath,

    #[error(transparent)]
    Term(#[from] TermError),
}

impl ElementError {
    /// Message-catalog key for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::IllegalDereference(_) | Self::NotAList(_) => ErrorCode::ILLEGAL_DEREFERENCE,
            Self::KeyOnList(_) | Self::IndexOnHash(_) | Self::Term(_) => ErrorCode::INVALID_TERM,
            Self::Undefined(_) => ErrorCode::UNDEFINED_VARIABLE,
            Self::CannotAddChild(_) => ErrorCode::CANNOT_ADD_CHILD,
            Self::IndexTooFar { .. } => ErrorCode::INDEX_TOO_FAR,
            Self::InvalidReplacement { .. } => ErrorCode::INVALID_REPLACEMENT,
            Self::RangeMismatch { .. } | Self::InvalidRangeCheck(_) => ErrorCode::RANGE_MISMATCH,
            Self::EmptyPath => ErrorCode::INTERNAL,
        }
    }

    /// Convert into a [`PanError`] whose message names the reference being
    /// resolved, e.g. `x[0]['a']: cannot dereference a string value`.
    pub fn for_reference(self, identifier: &str, terms: &[Term]) -> PanError {
        let code = self.code();
        PanError::new(code, format!("{}: {self}", format_reference(identifier, terms)))
    }
}

impl From<ElementError> for PanError {
    fn from(err: ElementError) -> Self {
        PanError::new(err.code(), err.to_string())
    }
}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, PanError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pan_types::ErrorCategory;

    #[test]
    fn codes_follow_taxonomy() {
        let deref: PanError = ElementError::IllegalDereference("string").into();
        assert_eq!(deref.category, ErrorCategory::Evaluation);
        let range: PanError = ElementError::InvalidRangeCheck("boolean").into();
        assert_eq!(range.category, ErrorCategory::Validation);
        let empty: PanError = ElementError::EmptyPath.into();
        assert!(empty.is_internal());
    }

    #[test]
    fn reference_prefix() {
        let err = ElementError::KeyOnList("a".into())
            .for_reference("x", &[Term::Index(0), Term::Key("a".into())]);
        assert_eq!(err.code, ErrorCode::INVALID_TERM);
        assert_eq!(
            err.message,
            "x[0]['a']: cannot use key 'a' to dereference a list"
        );
    }
}
