//! Evaluation limits and `debug()` filtering.

use crate::error::EvalResult;
use pan_types::{ErrorCode, PanError};
use regex::Regex;
use serde::Deserialize;

/// Default bound on `while` loop iterations.
pub const DEFAULT_MAX_ITERATIONS: u64 = 10_000;

/// User-facing evaluation options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EvalOptions {
    /// Maximum number of iterations of a single `while` loop.
    pub max_iterations: u64,
    /// Objects whose name matches this pattern have `debug()` output enabled.
    pub debug_include: Option<String>,
    /// Objects whose name matches this pattern never emit `debug()` output.
    pub debug_exclude: Option<String>,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            debug_include: None,
            debug_exclude: None,
        }
    }
}

impl EvalOptions {
    /// Compile the patterns once so the result can be shared by every object build.
    pub fn compile(&self) -> EvalResult<EvalConfig> {
        Ok(EvalConfig {
            max_iterations: self.max_iterations,
            debug: DebugFilter::new(self.debug_include.as_deref(), self.debug_exclude.as_deref())?,
        })
    }
}

/// Compiled form of [`EvalOptions`].
#[derive(Debug, Clone)]
pub struct EvalConfig {
    pub max_iterations: u64,
    pub debug: DebugFilter,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            debug: DebugFilter::default(),
        }
    }
}

/// Decides which objects may emit `debug()` messages.
///
/// Debugging is off unless an include pattern matches; exclude wins over include.
#[derive(Debug, Clone, Default)]
pub struct DebugFilter {
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl DebugFilter {
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> EvalResult<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| {
                PanError::new(
                    ErrorCode::INVALID_REGEX,
                    format!("invalid debug pattern '{pattern}': {e}"),
                )
            })
        };
        Ok(Self {
            include: include.map(compile).transpose()?,
            exclude: exclude.map(compile).transpose()?,
        })
    }

    pub fn accepts(&self, object: &str) -> bool {
        let included = self.include.as_ref().is_some_and(|re| re.is_match(object));
        let excluded = self.exclude.as_ref().is_some_and(|re| re.is_match(object));
        included && !excluded
    }
}
