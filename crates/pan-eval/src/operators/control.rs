//! Conditionals, loops and DML blocks.

use crate::context::Context;
use crate::element::Element;
use crate::error::EvalResult;
use crate::operation::Operation;
use pan_types::{ErrorCode, PanError};

fn condition_value(ctx: &mut Context, condition: &Operation) -> EvalResult<bool> {
    let value = condition.execute(ctx)?;
    value.as_bool().ok_or_else(|| {
        PanError::new(
            ErrorCode::ARGUMENT_TYPE_MISMATCH,
            format!("condition must be a boolean, found {}", value.type_name()),
        )
        .at(condition.range)
    })
}

pub fn eval_if(
    ctx: &mut Context,
    condition: &Operation,
    then_branch: &Operation,
    else_branch: Option<&Operation>,
) -> EvalResult<Element> {
    if condition_value(ctx, condition)? {
        then_branch.execute(ctx)
    } else {
        match else_branch {
            Some(op) => op.execute(ctx),
            None => Ok(Element::Undef),
        }
    }
}

pub fn eval_while(ctx: &mut Context, condition: &Operation, body: &Operation) -> EvalResult<Element> {
    let limit = ctx.config().max_iterations;
    let mut result = Element::Undef;
    let mut iterations: u64 = 0;
    while condition_value(ctx, condition)? {
        iterations += 1;
        if iterations > limit {
            return Err(PanError::new(
                ErrorCode::ITERATION_LIMIT,
                format!("loop exceeded the limit of {limit} iterations"),
            ));
        }
        result = body.execute(ctx)?;
    }
    Ok(result)
}

/// Iterate a snapshot of a resource, binding key and value as locals.
pub fn eval_foreach(
    ctx: &mut Context,
    key: &str,
    value: &str,
    resource: &Operation,
    body: &Operation,
) -> EvalResult<Element> {
    let target = resource.execute(ctx)?;
    let entries: Vec<(Element, Element)> = match &target {
        Element::List(list) => list
            .iter()
            .enumerate()
            .map(|(i, child)| (Element::Long(i as i64), child.clone()))
            .collect(),
        Element::Hash(hash) => hash
            .iter()
            .map(|(k, child)| (Element::from(k.as_str()), child.clone()))
            .collect(),
        other => {
            return Err(PanError::new(
                ErrorCode::ARGUMENT_TYPE_MISMATCH,
                format!("foreach requires a list or dict, found {}", other.type_name()),
            )
            .at(resource.range))
        }
    };

    for name in [key, value] {
        if ctx.local(name).is_none() && ctx.has_global(name) {
            return Err(PanError::new(
                ErrorCode::GLOBAL_VARIABLE_CONFLICT,
                format!("foreach variable '{name}' would shadow a global variable"),
            ));
        }
    }

    let protect = target.is_protected();
    let mut result = Element::Undef;
    for (k, v) in entries {
        ctx.set_local(key, k);
        ctx.set_local(value, if protect { v.protect() } else { v });
        result = body.execute(ctx)?;
    }
    Ok(result)
}

/// Run operations in order, yielding the last value.
pub fn eval_block(ctx: &mut Context, ops: &[Operation]) -> EvalResult<Element> {
    let mut result = Element::Undef;
    for op in ops {
        result = op.execute(ctx)?;
    }
    Ok(result)
}
