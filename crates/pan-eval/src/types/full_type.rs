use super::base_type::BaseType;
use crate::context::Context;
use crate::element::Element;
use crate::error::EvalResult;
use crate::operation::Operation;
use pan_types::{ErrorCode, PanError, Path, SourceRange};
use std::fmt;

/// Default value attached to a type.
#[derive(Debug, Clone)]
pub enum DefaultValue {
    /// Literal default, stored protected so every use shares it.
    Constant(Element),
    /// Expression evaluated each time a default is needed.
    Computed(Operation),
}

/// A type definition: base structure plus an optional default and an
/// optional validation expression (`with ...`).
#[derive(Debug, Clone)]
pub struct FullType {
    source: Option<String>,
    range: Option<SourceRange>,
    base: BaseType,
    default: Option<DefaultValue>,
    with: Option<Operation>,
}

impl FullType {
    pub fn new(base: BaseType) -> Self {
        Self {
            source: None,
            range: None,
            base,
            default: None,
            with: None,
        }
    }

    pub fn with_default(mut self, default: Operation) -> Self {
        self.default = Some(match default.as_literal() {
            Some(value) => DefaultValue::Constant(value.protect()),
            None => DefaultValue::Computed(default),
        });
        self
    }

    /// Attach a validation expression. It runs with SELF set to the value
    /// being checked and must return `true`.
    pub fn with_validation(mut self, with: Operation) -> Self {
        self.with = Some(with);
        self
    }

    pub fn defined_at(mut self, source: impl Into<String>, range: SourceRange) -> Self {
        self.source = Some(source.into());
        self.range = Some(range);
        self
    }

    pub fn base(&self) -> &BaseType {
        &self.base
    }

    pub fn default_value(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn source_range(&self) -> Option<SourceRange> {
        self.range
    }

    pub fn validate(&self, ctx: &mut Context, path: &Path, element: &Element) -> EvalResult<()> {
        self.base.validate(ctx, path, element)?;

        let Some(with) = &self.with else {
            return Ok(());
        };
        let result = with_self(ctx, element.protect(), true, |ctx| with.execute(ctx))?;
        match result {
            Element::Boolean(true) => Ok(()),
            Element::Boolean(false) => Err(PanError::new(
                ErrorCode::VALIDATION_FAILED,
                format!("{element} fails validation for type {}", self.base),
            )
            .at_path(path.to_string())
            .at_opt(self.range)),
            other => Err(PanError::new(
                ErrorCode::VALIDATION_FAILED,
                format!(
                    "validation expression returned {} instead of a boolean",
                    other.type_name()
                ),
            )
            .at_path(path.to_string())
            .at_opt(self.range)),
        }
    }

    /// Compute the value that should replace `element` at `path`, if any.
    ///
    /// A missing or undefined value takes this type's default, or the
    /// default of the aliased type when this one has none. Existing
    /// containers have defaults filled into their members.
    pub fn set_defaults(
        &self,
        ctx: &mut Context,
        path: &Path,
        element: Option<&Element>,
    ) -> EvalResult<Option<Element>> {
        match element {
            Some(value) if !value.is_undef() => self.base.set_defaults(ctx, path, value),
            _ => {
                let Some(default) = self.evaluate_default(ctx)? else {
                    return self.base.inherited_default(ctx, path);
                };
                match self.base.set_defaults(ctx, path, &default)? {
                    Some(filled) => Ok(Some(filled)),
                    None => Ok(Some(default)),
                }
            }
        }
    }

    fn evaluate_default(&self, ctx: &mut Context) -> EvalResult<Option<Element>> {
        let value = match &self.default {
            None => return Ok(None),
            Some(DefaultValue::Constant(value)) => value.clone(),
            Some(DefaultValue::Computed(op)) => {
                with_self(ctx, Element::Undef, false, |ctx| op.execute(ctx))?
            }
        };
        if value.is_undef() || value.is_null() {
            Ok(None)
        } else {
            Ok(Some(value))
        }
    }
}

/// Run `f` in a fresh local scope with SELF temporarily replaced.
fn with_self<T>(
    ctx: &mut Context,
    value: Element,
    is_final: bool,
    f: impl FnOnce(&mut Context) -> EvalResult<T>,
) -> EvalResult<T> {
    let previous = ctx.swap_self(value, is_final);
    ctx.push_scope();
    let result = f(ctx);
    ctx.pop_scope();
    ctx.restore_self(previous);
    result
}

impl From<BaseType> for FullType {
    fn from(base: BaseType) -> Self {
        FullType::new(base)
    }
}

impl fmt::Display for FullType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)
    }
}
