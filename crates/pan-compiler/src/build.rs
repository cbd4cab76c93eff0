//! Phase 1: evaluate an object's statements into a configuration tree.

use crate::template::ObjectTemplate;
use pan_eval::{Context, ContextMode, Element, EvalConfig, EvalResult};
use std::sync::Arc;
use tracing::debug;

/// The tree built for one object, with the context that built it.
///
/// The context still holds the type registrations and bindings the
/// validate phase needs.
#[derive(Debug)]
pub struct BuildResult {
    pub root: Element,
    pub context: Context,
}

impl BuildResult {
    pub fn object_name(&self) -> &str {
        self.context.object_name()
    }
}

/// Run every statement of `template` against a fresh context.
///
/// The first error aborts the object; no partial tree is returned.
pub fn build(template: &ObjectTemplate, config: Arc<EvalConfig>) -> EvalResult<BuildResult> {
    let mut context = Context::new(ContextMode::Build, template.name(), config);
    for (index, statement) in template.statements().enumerate() {
        debug!(index, range = %statement.range, "statement");
        statement
            .execute(&mut context)
            .map_err(|e| e.in_object(template.name()))?;
    }
    let root = context.take_root();
    Ok(BuildResult { root, context })
}
