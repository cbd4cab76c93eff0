//! Structural part of a type: what shape a value must have.

use super::choice::ChoiceType;
use super::full_type::FullType;
use super::type_map::TypeMap;
use crate::context::Context;
use crate::element::Element;
use crate::error::EvalResult;
use pan_types::{ErrorCode, PanError, Path, Range, Term};
use std::fmt;

/// The built-in leaf types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Element,
    Property,
    Boolean,
    Long,
    Double,
    Number,
    String,
    Resource,
    List,
    Dict,
}

impl Primitive {
    pub const ALL: [Primitive; 10] = [
        Primitive::Element,
        Primitive::Property,
        Primitive::Boolean,
        Primitive::Long,
        Primitive::Double,
        Primitive::Number,
        Primitive::String,
        Primitive::Resource,
        Primitive::List,
        Primitive::Dict,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Element => "element",
            Primitive::Property => "property",
            Primitive::Boolean => "boolean",
            Primitive::Long => "long",
            Primitive::Double => "double",
            Primitive::Number => "number",
            Primitive::String => "string",
            Primitive::Resource => "resource",
            Primitive::List => "list",
            Primitive::Dict => "dict",
        }
    }

    pub fn matches(self, element: &Element) -> bool {
        match self {
            Primitive::Element => !matches!(element, Element::Undef | Element::Null),
            Primitive::Property => element.is_property(),
            Primitive::Boolean => matches!(element, Element::Boolean(_)),
            Primitive::Long => matches!(element, Element::Long(_)),
            Primitive::Double => matches!(element, Element::Double(_)),
            Primitive::Number => element.is_number(),
            Primitive::String => matches!(element, Element::String(_)),
            Primitive::Resource => element.is_resource(),
            Primitive::List => matches!(element, Element::List(_)),
            Primitive::Dict => matches!(element, Element::Hash(_)),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
pub struct RecordField {
    pub name: String,
    pub required: bool,
    pub field_type: FullType,
}

impl RecordField {
    pub fn required(name: impl Into<String>, field_type: FullType) -> Self {
        Self {
            name: name.into(),
            required: true,
            field_type,
        }
    }

    pub fn optional(name: impl Into<String>, field_type: FullType) -> Self {
        Self {
            name: name.into(),
            required: false,
            field_type,
        }
    }
}

#[derive(Debug, Clone)]
pub enum BaseType {
    Primitive {
        primitive: Primitive,
        range: Option<Range>,
    },
    /// Reference to a named type, resolved when used.
    Alias {
        name: String,
        range: Option<Range>,
    },
    ListOf {
        member: Box<FullType>,
        range: Option<Range>,
    },
    Record {
        fields: Vec<RecordField>,
        extensible: bool,
        range: Option<Range>,
    },
    Choice(ChoiceType),
}

fn type_mismatch(path: &Path, expected: impl fmt::Display, found: &Element) -> PanError {
    PanError::new(
        ErrorCode::TYPE_MISMATCH,
        format!("expected {expected} but found {}", found.type_name()),
    )
    .at_path(path.to_string())
}

fn check_range(path: &Path, range: Option<&Range>, element: &Element) -> EvalResult<()> {
    match range {
        Some(range) => element
            .check_range(range)
            .map_err(|e| PanError::from(e).at_path(path.to_string())),
        None => Ok(()),
    }
}

impl BaseType {
    pub fn primitive(primitive: Primitive) -> Self {
        BaseType::Primitive {
            primitive,
            range: None,
        }
    }

    pub fn alias(name: impl Into<String>) -> Self {
        BaseType::Alias {
            name: name.into(),
            range: None,
        }
    }

    pub fn list_of(member: FullType) -> Self {
        BaseType::ListOf {
            member: Box::new(member),
            range: None,
        }
    }

    pub fn record(fields: Vec<RecordField>, extensible: bool) -> Self {
        BaseType::Record {
            fields,
            extensible,
            range: None,
        }
    }

    /// Attach a range constraint. Choice types carry none.
    pub fn with_range(mut self, new_range: Range) -> Self {
        match &mut self {
            BaseType::Primitive { range, .. }
            | BaseType::Alias { range, .. }
            | BaseType::ListOf { range, .. }
            | BaseType::Record { range, .. } => *range = Some(new_range),
            BaseType::Choice(_) => {}
        }
        self
    }

    /// Every alias reachable from this type must name a registered type.
    pub fn check_subtypes(&self, types: &TypeMap) -> EvalResult<()> {
        match self {
            BaseType::Alias { name, .. } if !types.contains(name) => Err(PanError::new(
                ErrorCode::UNKNOWN_TYPE,
                format!("type '{name}' is not defined"),
            )),
            BaseType::ListOf { member, .. } => member.base().check_subtypes(types),
            BaseType::Record { fields, .. } => fields
                .iter()
                .try_for_each(|field| field.field_type.base().check_subtypes(types)),
            _ => Ok(()),
        }
    }

    pub fn validate(&self, ctx: &mut Context, path: &Path, element: &Element) -> EvalResult<()> {
        match self {
            BaseType::Primitive { primitive, range } => {
                if !primitive.matches(element) {
                    return Err(type_mismatch(path, primitive, element));
                }
                check_range(path, range.as_ref(), element)
            }
            BaseType::Alias { name, range } => {
                ctx.full_type(name)?.validate(ctx, path, element)?;
                check_range(path, range.as_ref(), element)
            }
            BaseType::ListOf { member, range } => {
                let list = element
                    .as_list()
                    .ok_or_else(|| type_mismatch(path, "list", element))?;
                check_range(path, range.as_ref(), element)?;
                for (i, child) in list.iter().enumerate() {
                    member.validate(ctx, &path.child(Term::Index(i as u64)), child)?;
                }
                Ok(())
            }
            BaseType::Record {
                fields,
                extensible,
                range,
            } => {
                let hash = element
                    .as_hash()
                    .ok_or_else(|| type_mismatch(path, "dict", element))?;
                check_range(path, range.as_ref(), element)?;
                for field in fields {
                    let child_path = path.child(Term::Key(field.name.clone()));
                    match hash.get(&field.name) {
                        Some(child) => field.field_type.validate(ctx, &child_path, child)?,
                        None if field.required => {
                            return Err(PanError::new(
                                ErrorCode::MISSING_REQUIRED_FIELD,
                                format!("required field '{}' is missing", field.name),
                            )
                            .at_path(path.to_string()))
                        }
                        None => {}
                    }
                }
                if !extensible {
                    if let Some(extra) = hash
                        .keys()
                        .find(|key| !fields.iter().any(|field| &field.name == *key))
                    {
                        return Err(PanError::new(
                            ErrorCode::UNEXPECTED_FIELD,
                            format!("field '{extra}' is not allowed"),
                        )
                        .at_path(path.to_string()));
                    }
                }
                Ok(())
            }
            BaseType::Choice(choice) => choice.validate(ctx, path, element),
        }
    }

    /// Fill defaults inside an existing value. Returns the replacement, if any.
    pub fn set_defaults(
        &self,
        ctx: &mut Context,
        path: &Path,
        element: &Element,
    ) -> EvalResult<Option<Element>> {
        match self {
            BaseType::Alias { name, .. } => {
                ctx.full_type(name)?.set_defaults(ctx, path, Some(element))
            }
            BaseType::ListOf { member, .. } => {
                let Some(list) = element.as_list() else {
                    return Ok(None);
                };
                let mut updated = None;
                for (i, child) in list.iter().enumerate() {
                    let child_path = path.child(Term::Index(i as u64));
                    if let Some(value) = member.set_defaults(ctx, &child_path, Some(child))? {
                        updated
                            .get_or_insert_with(|| list.writable_copy())
                            .set(i, value)?;
                    }
                }
                Ok(updated.map(Element::List))
            }
            BaseType::Record { fields, .. } => {
                let Some(hash) = element.as_hash() else {
                    return Ok(None);
                };
                let mut updated = None;
                for field in fields {
                    let child_path = path.child(Term::Key(field.name.clone()));
                    let child = hash.get(&field.name);
                    if let Some(value) = field.field_type.set_defaults(ctx, &child_path, child)? {
                        updated
                            .get_or_insert_with(|| hash.writable_copy())
                            .insert(field.name.clone(), value);
                    }
                }
                Ok(updated.map(Element::Hash))
            }
            BaseType::Primitive { .. } | BaseType::Choice(_) => Ok(None),
        }
    }

    /// Default supplied by a missing value's aliased type, if any.
    pub fn inherited_default(&self, ctx: &mut Context, path: &Path) -> EvalResult<Option<Element>> {
        match self {
            BaseType::Alias { name, .. } => ctx.full_type(name)?.set_defaults(ctx, path, None),
            _ => Ok(None),
        }
    }
}

fn write_range(f: &mut fmt::Formatter<'_>, range: Option<&Range>) -> fmt::Result {
    match range {
        Some(range) => write!(f, "({range})"),
        None => Ok(()),
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseType::Primitive { primitive, range } => {
                write!(f, "{primitive}")?;
                write_range(f, range.as_ref())
            }
            BaseType::Alias { name, range } => {
                f.write_str(name)?;
                write_range(f, range.as_ref())
            }
            BaseType::ListOf { member, range } => {
                write!(f, "{}[]", member.base())?;
                write_range(f, range.as_ref())
            }
            BaseType::Record {
                fields,
                extensible,
                range,
            } => {
                f.write_str(if *extensible { "extensible {" } else { "{" })?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    let marker = if field.required { "" } else { "?" };
                    write!(f, "{}{marker}: {}", field.name, field.field_type.base())?;
                }
                f.write_str("}")?;
                write_range(f, range.as_ref())
            }
            BaseType::Choice(choice) => write!(f, "{choice}"),
        }
    }
}
