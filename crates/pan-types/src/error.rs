use crate::SourceRange;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// Construction-time shape/arity violations. Fatal to the template.
    Syntax,
    /// Runtime failures while building one object.
    Evaluation,
    /// Constraint or default failures during the validate phase.
    Validation,
    /// Broken invariants inside the compiler itself. Never recoverable.
    Internal,
}

/// Message-catalog key (E100–E999).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Syntax errors (E100–E199) ──
    pub const INVALID_ARGUMENT_COUNT: Self = Self(100);
    pub const INVALID_ARGUMENT: Self = Self(101);
    pub const UNKNOWN_FUNCTION: Self = Self(102);
    pub const INVALID_PATH: Self = Self(103);

    // ── Evaluation errors (E200–E299) ──
    pub const UNDEFINED_VARIABLE: Self = Self(200);
    pub const ARGUMENT_TYPE_MISMATCH: Self = Self(201);
    pub const INVALID_NUMERIC_LITERAL: Self = Self(202);
    pub const ILLEGAL_DEREFERENCE: Self = Self(203);
    pub const INVALID_TERM: Self = Self(204);
    pub const CANNOT_ADD_CHILD: Self = Self(205);
    pub const INVALID_REPLACEMENT: Self = Self(206);
    pub const GLOBAL_VARIABLE_CONFLICT: Self = Self(207);
    pub const COMPILE_TIME_RESTRICTION: Self = Self(208);
    pub const SELF_IS_FINAL: Self = Self(209);
    pub const USER_ERROR: Self = Self(210);
    pub const ARITHMETIC: Self = Self(211);
    pub const INVALID_REGEX: Self = Self(212);
    pub const ITERATION_LIMIT: Self = Self(213);
    pub const DUPLICATE_TYPE_DEFINITION: Self = Self(214);
    pub const UNKNOWN_TYPE: Self = Self(215);
    pub const FINAL_VARIABLE: Self = Self(216);
    pub const EXTERNAL_REFERENCE: Self = Self(217);
    pub const INDEX_TOO_FAR: Self = Self(218);

    // ── Validation errors (E300–E399) ──
    pub const VALIDATION_FAILED: Self = Self(300);
    pub const TYPE_MISMATCH: Self = Self(301);
    pub const RANGE_MISMATCH: Self = Self(302);
    pub const INVALID_CHOICE: Self = Self(303);
    pub const MISSING_REQUIRED_FIELD: Self = Self(304);
    pub const UNEXPECTED_FIELD: Self = Self(305);
    pub const UNDEFINED_ELEMENT: Self = Self(306);

    // ── Internal errors (E900–E999) ──
    pub const INTERNAL: Self = Self(900);
    pub const MISSING_SELF: Self = Self(901);

    /// Get the category for this error code.
    pub fn category(self) -> ErrorCategory {
        match self.0 {
            100..=199 => ErrorCategory::Syntax,
            200..=299 => ErrorCategory::Evaluation,
            300..=399 => ErrorCategory::Validation,
            _ => ErrorCategory::Internal,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// A structured pan compiler error.
///
/// Context is filled in as the error unwinds: the innermost operator that
/// knows a source range sets it, the object build sets the object name,
/// the validate phase sets the bound path. Each field is set at most once,
/// so errors only gain precision on the way out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanError {
    /// Message-catalog key.
    pub code: ErrorCode,
    /// Error category (derived from code).
    pub category: ErrorCategory,
    /// Human-readable error message.
    pub message: String,
    /// Source location of the failing operation, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<SourceRange>,
    /// Name of the object being compiled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    /// Profile path being validated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl PanError {
    /// Create a new error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            category: code.category(),
            message: message.into(),
            range: None,
            object: None,
            path: None,
        }
    }

    /// Shorthand for an internal error; these indicate a bug in the core.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::INTERNAL, message)
    }

    /// Attach a source range unless a more precise one is already present.
    pub fn at(mut self, range: SourceRange) -> Self {
        if self.range.is_none() {
            self.range = Some(range);
        }
        self
    }

    /// Attach an optional source range.
    pub fn at_opt(self, range: Option<SourceRange>) -> Self {
        match range {
            Some(range) => self.at(range),
            None => self,
        }
    }

    /// Attach the object name unless already present.
    pub fn in_object(mut self, object: impl Into<String>) -> Self {
        if self.object.is_none() {
            self.object = Some(object.into());
        }
        self
    }

    /// Attach the profile path unless already present.
    pub fn at_path(mut self, path: impl Into<String>) -> Self {
        if self.path.is_none() {
            self.path = Some(path.into());
        }
        self
    }

    pub fn is_internal(&self) -> bool {
        self.category == ErrorCategory::Internal
    }
}

impl fmt::Display for PanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(object) = &self.object {
            write!(f, "{object}: ")?;
        }
        if let Some(range) = &self.range {
            write!(f, "{range}: ")?;
        }
        write!(f, "{} [{}] ", self.code, self.category)?;
        if let Some(path) = &self.path {
            write!(f, "{path}: ")?;
        }
        f.write_str(&self.message)
    }
}

impl std::error::Error for PanError {}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax"),
            Self::Evaluation => write!(f, "evaluation"),
            Self::Validation => write!(f, "validation"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

/// The structured JSON output for a multi-object compilation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompileErrors {
    pub errors: Vec<PanError>,
    pub total_errors: usize,
}

impl CompileErrors {
    /// Create an empty result (no errors).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    pub fn push_error(&mut self, error: PanError) {
        self.errors.push(error);
        self.total_errors += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_category() {
        assert_eq!(
            ErrorCode::INVALID_ARGUMENT_COUNT.category(),
            ErrorCategory::Syntax
        );
        assert_eq!(
            ErrorCode::UNDEFINED_VARIABLE.category(),
            ErrorCategory::Evaluation
        );
        assert_eq!(
            ErrorCode::RANGE_MISMATCH.category(),
            ErrorCategory::Validation
        );
        assert_eq!(ErrorCode::MISSING_SELF.category(), ErrorCategory::Internal);
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(format!("{}", ErrorCode::INVALID_REPLACEMENT), "E206");
        assert_eq!(format!("{}", ErrorCode::INVALID_ARGUMENT_COUNT), "E100");
    }

    #[test]
    fn test_context_is_set_once() {
        let err = PanError::new(ErrorCode::UNDEFINED_VARIABLE, "undefined variable 'x'")
            .at(SourceRange::new(3, 1, 3, 4))
            .at(SourceRange::new(1, 1, 9, 1))
            .in_object("node01")
            .in_object("node02");
        assert_eq!(err.range, Some(SourceRange::new(3, 1, 3, 4)));
        assert_eq!(err.object.as_deref(), Some("node01"));
        assert_eq!(err.category, ErrorCategory::Evaluation);
    }

    #[test]
    fn test_error_display() {
        let err = PanError::new(ErrorCode::RANGE_MISMATCH, "5 is outside range 6..10")
            .at_path("/alpha")
            .in_object("node01");
        assert_eq!(
            err.to_string(),
            "node01: E302 [validation] /alpha: 5 is outside range 6..10"
        );
    }

    #[test]
    fn test_error_json_serialization() {
        let err = PanError::new(ErrorCode::USER_ERROR, "stop")
            .at(SourceRange::new(12, 5, 12, 22))
            .in_object("node01");

        let json = serde_json::to_string_pretty(&err).unwrap();
        assert!(json.contains("\"code\""));
        assert!(json.contains("\"message\""));
        assert!(json.contains("\"object\""));
        assert!(!json.contains("\"path\""));
        assert!(json.contains("\"line\""));

        let deserialized: PanError = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, err);
    }

    #[test]
    fn test_compile_errors_counts() {
        let mut errs = CompileErrors::empty();
        assert!(!errs.has_errors());
        errs.push_error(PanError::new(ErrorCode::USER_ERROR, "a").in_object("node01"));
        errs.push_error(PanError::new(ErrorCode::ARITHMETIC, "b").in_object("node02"));
        assert!(errs.has_errors());
        assert_eq!(errs.total_errors, 2);

        let json = serde_json::to_string(&errs).unwrap();
        assert!(json.contains("\"total_errors\":2"));
        assert!(json.contains("\"object\":\"node02\""));
    }
}
