//! Phase 2: fill defaults and check every bound path.

use crate::build::BuildResult;
use crate::profile::Profile;
use pan_eval::{Context, Element, EvalResult};
use pan_types::{ErrorCode, PanError, Path};
use tracing::debug;

/// Validate a built tree.
///
/// Defaults are filled for every binding, in declaration order, before any
/// value is validated. SELF is final throughout, so validation expressions
/// cannot modify the tree. Bound paths with no value after default filling are skipped. Any
/// `undef` left in the tree afterwards is an error.
pub fn validate(build: BuildResult) -> EvalResult<Profile> {
    let BuildResult { root, mut context } = build;
    let object = context.object_name().to_string();

    context.set_root(root);
    let previous = context.swap_self(Element::Undef, true);
    let result = check_bindings(&mut context);
    context.restore_self(previous);
    result.map_err(|e| e.in_object(object.as_str()))?;

    let root = context.take_root();
    if let Some(terms) = root.find_undefined() {
        let path = Path::absolute(terms).to_string();
        return Err(PanError::new(
            ErrorCode::UNDEFINED_ELEMENT,
            format!("element at {path} is undefined"),
        )
        .at_path(path)
        .in_object(object));
    }

    Ok(Profile { object, root })
}

fn check_bindings(ctx: &mut Context) -> EvalResult<()> {
    let bindings = ctx.bindings().to_vec();

    // all defaults first; constraints may read paths bound by other types
    for binding in &bindings {
        let path = &binding.path;
        let in_path = |e: PanError| e.at_path(path.to_string());

        let current = ctx.get_element(path).map_err(in_path)?;
        let filled = binding
            .full_type
            .set_defaults(ctx, path, current.as_ref())
            .map_err(in_path)?;
        if let Some(value) = filled {
            debug!(path = %path, "default applied");
            ctx.put_element(path, value).map_err(in_path)?;
        }
    }

    for binding in &bindings {
        let path = &binding.path;
        let in_path = |e: PanError| e.at_path(path.to_string());

        let value = match ctx.get_element(path).map_err(in_path)? {
            Some(value) if !value.is_undef() => value,
            _ => continue,
        };
        binding
            .full_type
            .validate(ctx, path, &value)
            .map_err(in_path)?;
    }
    Ok(())
}
