//! Shared types for the pan compiler core.
//!
//! This crate defines source ranges, path-addressing terms, validation
//! ranges, and the structured error catalog used by every later stage
//! (evaluation, type checking, build/validate orchestration).

mod error;
mod path;
mod range;
mod span;
mod term;

pub use error::{CompileErrors, ErrorCategory, ErrorCode, PanError};
pub use path::{Path, PathError, PathKind};
pub use range::{Range, RangeError};
pub use span::SourceRange;
pub use term::{format_reference, Term, TermError};
