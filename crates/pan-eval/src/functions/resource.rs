//! Resource constructors and list mutation.

use super::coerce::Args;
use super::BuiltIn;
use crate::context::Context;
use crate::element::{Element, HashResource, ListResource};
use crate::error::EvalResult;
use crate::operation::{OpKind, Operation};
use pan_types::{ErrorCode, PanError, Term};

pub(super) fn list(args: &Args<'_>) -> Element {
    Element::List(args.all().iter().cloned().collect())
}

/// `dict(k1, v1, k2, v2, ...)`. Keys must be valid, distinct path terms.
pub(super) fn dict(args: &Args<'_>) -> EvalResult<Element> {
    let mut hash = HashResource::new();
    for i in (0..args.len()).step_by(2) {
        let key = args.string(i)?;
        Term::key(key).map_err(|e| args.invalid(e))?;
        if hash.contains_key(key) {
            return Err(args.invalid(format!("duplicate key '{key}'")));
        }
        let value = args.get(i + 1)?;
        if !value.is_null() {
            hash.insert(key, value.clone());
        }
    }
    Ok(Element::Hash(hash))
}

/// `append(v)` / `prepend(v)` act on SELF; `append(target, v)` acts on a
/// variable in place, or on a copy of any other list value.
pub(super) fn append(
    ctx: &mut Context,
    function: BuiltIn,
    ops: &[Operation],
    front: bool,
) -> EvalResult<Element> {
    let add = |list: &mut ListResource, value: Element| {
        if front {
            list.prepend(value);
        } else {
            list.push(value);
        }
    };

    match ops {
        [value_op] => {
            let value = value_op.execute(ctx)?;
            let current = ctx.self_mut()?;
            if matches!(current, Element::Undef | Element::Null) {
                *current = Element::List(ListResource::new());
            }
            current.make_writable();
            match current {
                Element::List(list) => {
                    add(list, value);
                    Ok(Element::List(list.clone()))
                }
                other => Err(PanError::new(
                    ErrorCode::ARGUMENT_TYPE_MISMATCH,
                    format!("{}(): SELF must be a list, found {}", function.name(), other.type_name()),
                )),
            }
        }
        [target_op, value_op] => {
            let value = value_op.execute(ctx)?;
            if let OpKind::ListVariable(variable) = &target_op.kind {
                return variable
                    .with_list_mut(ctx, |list| {
                        add(list, value);
                        Element::List(list.clone())
                    })
                    .map_err(|e| e.at(target_op.range));
            }
            let target = target_op.execute(ctx)?;
            match target {
                Element::List(list) => {
                    let mut list = list.writable_copy();
                    add(&mut list, value);
                    Ok(Element::List(list))
                }
                other => Err(PanError::new(
                    ErrorCode::ARGUMENT_TYPE_MISMATCH,
                    format!("{}(): argument 1 must be a list, found {}", function.name(), other.type_name()),
                )),
            }
        }
        _ => Err(PanError::internal(format!(
            "{}() called with {} arguments",
            function.name(),
            ops.len()
        ))),
    }
}

/// Concatenate lists, or union dicts whose keys do not overlap.
pub(super) fn merge(args: &Args<'_>) -> EvalResult<Element> {
    match args.get(0)? {
        Element::List(_) => {
            let mut result = ListResource::new();
            for i in 0..args.len() {
                result.extend(args.list(i)?.iter().cloned());
            }
            Ok(Element::List(result))
        }
        Element::Hash(_) => {
            let mut result = HashResource::new();
            for i in 0..args.len() {
                for (key, value) in args.hash(i)? {
                    if result.contains_key(key) {
                        return Err(args.invalid(format!("duplicate key '{key}'")));
                    }
                    result.insert(key.clone(), value.clone());
                }
            }
            Ok(Element::Hash(result))
        }
        _ => Err(args.mismatch(0, "a list or dict")),
    }
}

/// Resolve a possibly negative `start` and `length` against `len`.
pub(super) fn span(len: usize, start: i64, length: Option<i64>) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { len + start } else { start };
    if !(0..=len).contains(&start) {
        return None;
    }
    let end = match length {
        None => len,
        Some(n) if n < 0 => len + n,
        Some(n) => start.checked_add(n)?,
    };
    if end < start || end > len {
        return None;
    }
    Some((start as usize, end as usize))
}

/// `splice(list, start, length[, list])` or the string equivalent.
pub(super) fn splice(args: &Args<'_>) -> EvalResult<Element> {
    let start = args.long(1)?;
    let length = args.long(2)?;
    if length < 0 {
        return Err(args.invalid("length must not be negative"));
    }

    match args.get(0)? {
        Element::List(list) => {
            let (from, to) = span(list.len(), start, Some(length))
                .ok_or_else(|| args.invalid("start or length out of range"))?;
            let replacement = if args.len() == 4 {
                args.list(3)?.iter().cloned().collect()
            } else {
                Vec::new()
            };
            let mut result = list.writable_copy();
            result.splice(from, to - from, replacement);
            Ok(Element::List(result))
        }
        Element::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            let (from, to) = span(chars.len(), start, Some(length))
                .ok_or_else(|| args.invalid("start or length out of range"))?;
            let replacement = if args.len() == 4 { args.string(3)? } else { "" };
            let mut result: String = chars[..from].iter().collect();
            result.push_str(replacement);
            result.extend(&chars[to..]);
            Ok(Element::String(result))
        }
        _ => Err(args.mismatch(0, "a list or string")),
    }
}

pub(super) fn length(args: &Args<'_>) -> EvalResult<Element> {
    let n = match args.get(0)? {
        Element::String(s) => s.chars().count(),
        Element::List(list) => list.len(),
        Element::Hash(hash) => hash.len(),
        _ => return Err(args.mismatch(0, "a string, list or dict")),
    };
    Ok(Element::Long(n as i64))
}
