use super::coerce::Args;
use super::format::format;
use crate::context::Context;
use crate::element::Element;
use crate::error::EvalResult;
use pan_types::{ErrorCode, PanError};
use tracing::debug;

/// A single string argument is used verbatim; more arguments are formatted.
fn message(args: &Args<'_>) -> EvalResult<String> {
    if args.len() == 1 {
        Ok(args.string(0)?.to_string())
    } else {
        format(args, 0)
    }
}

/// `error(message, ...)`: abort the current object.
pub(super) fn error(ctx: &Context, args: &Args<'_>) -> EvalResult<Element> {
    let text = message(args)?;
    let err = PanError::new(ErrorCode::USER_ERROR, text);
    if ctx.is_compile_time() {
        Err(err)
    } else {
        Err(err.in_object(ctx.object_name()))
    }
}

/// `debug(message, ...)`: log the message when the object passes the debug
/// filters. Returns the message.
pub(super) fn debug(ctx: &Context, args: &Args<'_>) -> EvalResult<Element> {
    let text = message(args)?;
    if ctx.config().debug.accepts(ctx.object_name()) {
        debug!(target: "pan::debug", object = ctx.object_name(), "{text}");
    }
    Ok(Element::String(text))
}
