//! Driver-level errors.
//!
//! Failures of a single object are ordinary [`PanError`]s collected in a
//! [`CompileErrors`]; the variants here stop the whole run.

use pan_types::{CompileErrors, PanError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("invalid compiler options: {0}")]
    Options(#[from] serde_json::Error),

    /// A pattern in the evaluation options did not compile.
    #[error("invalid evaluation options: {0}")]
    Eval(PanError),

    #[error("cannot start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// At least one object hit a compiler bug.
    #[error("internal compiler error in {} object(s)", .0.total_errors)]
    Internal(CompileErrors),
}

pub type CompilerResult<T> = Result<T, CompilerError>;
