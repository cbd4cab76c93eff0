use crate::context::Context;
use crate::element::Element;
use crate::error::EvalResult;
use crate::operation::{OpKind, Operation};
use crate::operators::Variable;
use pan_types::{ErrorCode, ErrorCategory, PanError, Path};

/// `is_valid(type, value)`: whether `value` satisfies the named type.
///
/// The first operand is the bare type name. Only validation failures turn
/// into `false`; anything else is an evaluation error.
pub(super) fn is_valid(ctx: &mut Context, ops: &[Operation]) -> EvalResult<Element> {
    let [type_op, value_op] = ops else {
        return Err(PanError::internal("is_valid() called with the wrong number of arguments"));
    };

    if ctx.is_compile_time() {
        return Err(PanError::new(
            ErrorCode::COMPILE_TIME_RESTRICTION,
            "is_valid() cannot be used in a compile-time context",
        ));
    }

    let type_name = match &type_op.kind {
        OpKind::Variable(Variable::Simple { name, .. }) => name.clone(),
        _ => {
            return Err(PanError::new(
                ErrorCode::ARGUMENT_TYPE_MISMATCH,
                "is_valid(): first argument must be a simple type name",
            )
            .at(type_op.range))
        }
    };
    let full_type = ctx.full_type(&type_name).map_err(|e| e.at(type_op.range))?;
    let value = value_op.execute(ctx)?;

    match full_type.validate(ctx, &Path::root(), &value) {
        Ok(()) => Ok(Element::Boolean(true)),
        Err(e) if e.category == ErrorCategory::Validation => Ok(Element::Boolean(false)),
        Err(e) => Err(e),
    }
}
