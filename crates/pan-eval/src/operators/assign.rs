//! Assignment to SELF and to local variables.

use super::variable::SELF;
use crate::context::Context;
use crate::element::Element;
use crate::error::EvalResult;
use crate::operation::{evaluate_terms, Operation};
use pan_types::{ErrorCode, PanError, Term};

#[derive(Debug, Clone)]
pub enum AssignTarget {
    /// `SELF = v` or `SELF[t...] = v`.
    SetSelf { terms: Vec<Operation> },
    /// `x = v` or `x[t...] = v` on a local variable.
    SetValue { name: String, terms: Vec<Operation> },
}

#[derive(Debug, Clone)]
pub struct Assign {
    pub target: AssignTarget,
    pub value: Box<Operation>,
}

impl Assign {
    /// Evaluate the value and store it. Returns the assigned value, duplicated
    /// when it was attached below an existing resource.
    pub fn execute(&self, ctx: &mut Context) -> EvalResult<Element> {
        let value = self.value.execute(ctx)?;
        match &self.target {
            AssignTarget::SetSelf { terms } => set_self(ctx, terms, value),
            AssignTarget::SetValue { name, terms } => set_value(ctx, name, terms, value),
        }
    }
}

fn set_self(ctx: &mut Context, term_ops: &[Operation], value: Element) -> EvalResult<Element> {
    if ctx.is_compile_time() {
        return Err(PanError::new(
            ErrorCode::COMPILE_TIME_RESTRICTION,
            "SELF cannot be modified in a compile-time context",
        ));
    }
    let terms = evaluate_terms(ctx, term_ops)?;
    let current = ctx.self_mut()?;

    if terms.is_empty() {
        *current = value.clone();
        return Ok(value);
    }

    let result = value.duplicate();
    attach(current, SELF, &terms, value)?;
    Ok(result)
}

fn set_value(
    ctx: &mut Context,
    name: &str,
    term_ops: &[Operation],
    value: Element,
) -> EvalResult<Element> {
    if ctx.local(name).is_none() && ctx.has_global(name) {
        return Err(PanError::new(
            ErrorCode::GLOBAL_VARIABLE_CONFLICT,
            format!("cannot modify global variable '{name}' from DML"),
        ));
    }
    let terms = evaluate_terms(ctx, term_ops)?;

    if terms.is_empty() {
        ctx.set_local(name, value.clone());
        return Ok(value);
    }

    if ctx.local(name).is_none() {
        ctx.set_local(name, Element::Undef);
    }
    let result = value.duplicate();
    let local = ctx
        .local_mut(name)
        .ok_or_else(|| PanError::internal(format!("local variable '{name}' vanished")))?;
    attach(local, name, &terms, value)?;
    Ok(result)
}

/// Insert `value` below `target`, turning an empty target into the right container.
fn attach(target: &mut Element, name: &str, terms: &[Term], value: Element) -> EvalResult<()> {
    if matches!(target, Element::Undef | Element::Null) {
        *target = Element::container_for(terms.first());
    }
    target.make_writable();
    target
        .insert(terms, 0, value)
        .map_err(|e| e.for_reference(name, terms))
}
