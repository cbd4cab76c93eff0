use super::BuiltIn;
use crate::context::Context;
use crate::element::Element;
use crate::error::EvalResult;
use crate::operation::{OpKind, Operation};
use pan_types::{ErrorCode, PanError, Path};

/// `exists(variable)` or `exists("/path/in/tree")`.
pub(super) fn exists(ctx: &mut Context, ops: &[Operation]) -> EvalResult<Element> {
    let [op] = ops else {
        return Err(PanError::internal("exists() called without its argument"));
    };
    let value = op.execute(ctx)?;
    if matches!(op.kind, OpKind::Variable(_)) {
        return Ok(Element::Boolean(!value.is_undef()));
    }

    let text = value.as_str().ok_or_else(|| {
        PanError::new(
            ErrorCode::ARGUMENT_TYPE_MISMATCH,
            format!(
                "exists(): argument must be a variable or a path string, found {}",
                value.type_name()
            ),
        )
    })?;
    if ctx.is_compile_time() {
        return Err(PanError::new(
            ErrorCode::COMPILE_TIME_RESTRICTION,
            "exists() cannot inspect the configuration tree in a compile-time context",
        ));
    }
    let path = Path::parse(text).map_err(|e| PanError::new(ErrorCode::INVALID_TERM, e.to_string()))?;
    let found = ctx.get_element(&path)?;
    Ok(Element::Boolean(found.is_some_and(|e| !e.is_undef())))
}

pub(super) fn is_type(function: BuiltIn, value: &Element) -> EvalResult<Element> {
    let result = match function {
        BuiltIn::IsBoolean => matches!(value, Element::Boolean(_)),
        BuiltIn::IsLong => matches!(value, Element::Long(_)),
        BuiltIn::IsDouble => matches!(value, Element::Double(_)),
        BuiltIn::IsNumber => value.is_number(),
        BuiltIn::IsString => matches!(value, Element::String(_)),
        BuiltIn::IsList => matches!(value, Element::List(_)),
        BuiltIn::IsDict => matches!(value, Element::Hash(_)),
        BuiltIn::IsResource => value.is_resource(),
        BuiltIn::IsProperty => value.is_property(),
        other => {
            return Err(PanError::internal(format!(
                "{}() is not a type check",
                other.name()
            )))
        }
    };
    Ok(Element::Boolean(result))
}
