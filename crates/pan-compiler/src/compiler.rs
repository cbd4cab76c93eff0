//! The multi-object driver.

use crate::build::build;
use crate::error::{CompilerError, CompilerResult};
use crate::options::CompilerOptions;
use crate::profile::Profile;
use crate::template::ObjectTemplate;
use crate::validate::validate;
use pan_eval::{EvalConfig, EvalResult};
use pan_types::{CompileErrors, PanError};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{info, info_span, warn};

/// Outcome of compiling a set of objects. Objects fail independently.
#[derive(Debug, Default)]
pub struct CompileReport {
    pub profiles: Vec<Profile>,
    pub errors: CompileErrors,
}

impl CompileReport {
    pub fn profile(&self, object: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.object == object)
    }

    pub fn is_success(&self) -> bool {
        !self.errors.has_errors()
    }
}

#[derive(Debug, Clone)]
pub struct Compiler {
    config: Arc<EvalConfig>,
    threads: usize,
}

impl Compiler {
    pub fn new(options: &CompilerOptions) -> CompilerResult<Self> {
        let config = options.eval.compile().map_err(CompilerError::Eval)?;
        Ok(Self {
            config: Arc::new(config),
            threads: options.threads,
        })
    }

    /// Build and validate one object.
    pub fn compile(&self, template: &ObjectTemplate) -> EvalResult<Profile> {
        let span = info_span!("object", name = template.name());
        let _guard = span.enter();

        let built = build(template, Arc::clone(&self.config))?;
        let profile = validate(built)?;
        info!("profile complete");
        Ok(profile)
    }

    /// Compile every template on a worker pool.
    ///
    /// Ordinary failures are reported per object in the returned report.
    /// Internal errors fail the whole run once every object has finished.
    pub fn compile_all(&self, templates: &[ObjectTemplate]) -> CompilerResult<CompileReport> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()?;

        let results: Vec<EvalResult<Profile>> =
            pool.install(|| templates.par_iter().map(|t| self.compile(t)).collect());

        let mut report = CompileReport::default();
        let mut internal = CompileErrors::empty();
        for (template, result) in templates.iter().zip(results) {
            match result {
                Ok(profile) => report.profiles.push(profile),
                Err(err) => {
                    let err = err.in_object(template.name());
                    warn!(object = template.name(), code = %err.code, "{}", err.message);
                    if err.is_internal() {
                        internal.push_error(err);
                    } else {
                        report.errors.push_error(err);
                    }
                }
            }
        }

        if internal.has_errors() {
            return Err(CompilerError::Internal(internal));
        }
        Ok(report)
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self {
            config: Arc::new(EvalConfig::default()),
            threads: 0,
        }
    }
}

/// Convenience wrapper: compile one object with default options.
pub fn compile_object(template: &ObjectTemplate) -> Result<Profile, PanError> {
    Compiler::default().compile(template)
}
