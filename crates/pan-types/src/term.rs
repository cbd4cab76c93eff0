//! Path-addressing atoms.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Reasons a value cannot be turned into a [`Term`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TermError {
    #[error("list index cannot be negative: {0}")]
    NegativeIndex(i64),

    #[error("invalid key '{0}': keys must be non-empty and cannot contain '/'")]
    InvalidKey(String),
}

/// One segment of a path into the resource tree.
///
/// Index terms address lists, key terms address hashes; mixing the two
/// up is a dereference error reported by the element model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Term {
    Index(u64),
    Key(String),
}

impl Term {
    /// Create a key term, checking that the key is usable in a path.
    pub fn key(key: impl Into<String>) -> Result<Self, TermError> {
        let key = key.into();
        if key.is_empty() || key.contains('/') {
            return Err(TermError::InvalidKey(key));
        }
        Ok(Term::Key(key))
    }

    pub fn index(index: u64) -> Self {
        Term::Index(index)
    }

    /// Create an index term from a signed value coming out of the DML.
    pub fn from_long(value: i64) -> Result<Self, TermError> {
        u64::try_from(value)
            .map(Term::Index)
            .map_err(|_| TermError::NegativeIndex(value))
    }

    /// Parse a single path segment. Segments made only of decimal digits
    /// become indices, everything else a key.
    pub fn parse(segment: &str) -> Result<Self, TermError> {
        if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = segment.parse::<u64>() {
                return Ok(Term::Index(index));
            }
        }
        Term::key(segment)
    }

    pub fn is_key(&self) -> bool {
        matches!(self, Term::Key(_))
    }

    pub fn is_index(&self) -> bool {
        matches!(self, Term::Index(_))
    }

    pub fn as_index(&self) -> Option<u64> {
        match self {
            Term::Index(i) => Some(*i),
            Term::Key(_) => None,
        }
    }

    pub fn as_key(&self) -> Option<&str> {
        match self {
            Term::Key(k) => Some(k),
            Term::Index(_) => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Index(i) => write!(f, "{i}"),
            Term::Key(k) => f.write_str(k),
        }
    }
}

/// Render a variable reference such as `x[0][alpha]` for error messages.
pub fn format_reference(identifier: &str, terms: &[Term]) -> String {
    let mut out = identifier.to_string();
    for term in terms {
        match term {
            Term::Index(i) => out.push_str(&format!("[{i}]")),
            Term::Key(k) => out.push_str(&format!("['{k}']")),
        }
    }
    out
}
