//! Compiler configuration.

use crate::error::CompilerResult;
use pan_eval::EvalOptions;
use serde::Deserialize;

/// Options for a [`Compiler`](crate::Compiler) run.
///
/// ```json
/// { "eval": { "max_iterations": 5000, "debug_include": "^web" }, "threads": 4 }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    pub eval: EvalOptions,
    /// Worker threads for [`compile_all`](crate::Compiler::compile_all);
    /// 0 uses the rayon default.
    pub threads: usize,
}

impl CompilerOptions {
    pub fn from_json(text: &str) -> CompilerResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
