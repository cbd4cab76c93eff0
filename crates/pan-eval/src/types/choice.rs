use crate::context::Context;
use crate::element::Element;
use crate::error::EvalResult;
use pan_types::{ErrorCode, PanError, Path};
use std::fmt;

/// A string restricted to a fixed set of values.
///
/// Validation defers to the registered `string` type first. A choice never
/// supplies a default; the full type wrapping it may.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceType {
    choices: Vec<String>,
}

impl ChoiceType {
    pub fn new<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            choices: choices.into_iter().map(Into::into).collect(),
        }
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    pub fn validate(&self, ctx: &mut Context, path: &Path, element: &Element) -> EvalResult<()> {
        ctx.full_type("string")?.validate(ctx, path, element)?;

        let found = element
            .as_str()
            .is_some_and(|value| self.choices.iter().any(|choice| choice == value));
        if found {
            Ok(())
        } else {
            Err(PanError::new(
                ErrorCode::INVALID_CHOICE,
                format!("'{element}' is not one of {self}"),
            )
            .at_path(path.to_string()))
        }
    }
}

impl fmt::Display for ChoiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "choice({})", self.choices.join(", "))
    }
}
