//! Variable references.
//!
//! A reference is a base identifier (SELF or a variable name) plus zero or
//! more term expressions. Read references resolve locals first, then
//! globals (returned protected), and SELF by name. List references resolve
//! only locals, since the list they produce is about to be modified.

use crate::context::Context;
use crate::element::{Element, ListResource};
use crate::error::EvalResult;
use crate::operation::{evaluate_terms, Operation};
use pan_types::{ErrorCode, PanError, Term};

pub const SELF: &str = "SELF";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    SelfRef,
    Named(String),
}

impl Identifier {
    pub fn from_name(name: &str) -> Self {
        if name == SELF {
            Identifier::SelfRef
        } else {
            Identifier::Named(name.to_string())
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Identifier::SelfRef => SELF,
            Identifier::Named(name) => name,
        }
    }
}

fn undefined(name: &str) -> PanError {
    PanError::new(
        ErrorCode::UNDEFINED_VARIABLE,
        format!("variable '{name}' is not defined"),
    )
}

// ══════════════════════════════════════════════════════════════════════════════
// Read references
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub enum Variable {
    Simple {
        name: String,
        lookup_only: bool,
    },
    Nested {
        name: String,
        terms: Vec<Operation>,
        lookup_only: bool,
    },
    SelfSimple,
    SelfNested {
        terms: Vec<Operation>,
        lookup_only: bool,
    },
}

impl Variable {
    pub fn new(identifier: Identifier, terms: Vec<Operation>, lookup_only: bool) -> Self {
        match (identifier, terms.is_empty()) {
            (Identifier::SelfRef, true) => Variable::SelfSimple,
            (Identifier::SelfRef, false) => Variable::SelfNested { terms, lookup_only },
            (Identifier::Named(name), true) => Variable::Simple { name, lookup_only },
            (Identifier::Named(name), false) => Variable::Nested {
                name,
                terms,
                lookup_only,
            },
        }
    }

    pub fn identifier(&self) -> Identifier {
        match self {
            Variable::Simple { name, .. } | Variable::Nested { name, .. } => {
                Identifier::Named(name.clone())
            }
            Variable::SelfSimple | Variable::SelfNested { .. } => Identifier::SelfRef,
        }
    }

    pub fn terms(&self) -> &[Operation] {
        match self {
            Variable::Nested { terms, .. } | Variable::SelfNested { terms, .. } => terms,
            _ => &[],
        }
    }

    /// The same reference, but tolerant of missing values.
    pub fn into_lookup(self) -> Self {
        let identifier = self.identifier();
        let terms = match self {
            Variable::Nested { terms, .. } | Variable::SelfNested { terms, .. } => terms,
            _ => Vec::new(),
        };
        Variable::new(identifier, terms, true)
    }

    pub fn execute(&self, ctx: &mut Context) -> EvalResult<Element> {
        match self {
            Variable::Simple { name, lookup_only } => {
                match resolve(ctx, name) {
                    Some(value) => Ok(value),
                    None if *lookup_only => Ok(Element::Undef),
                    None => Err(undefined(name)),
                }
            }
            Variable::Nested {
                name,
                terms,
                lookup_only,
            } => {
                let terms = evaluate_terms(ctx, terms)?;
                let base = match resolve(ctx, name) {
                    Some(value) => value,
                    None if *lookup_only => return Ok(Element::Undef),
                    None => return Err(undefined(name)),
                };
                dereference(&base, name, &terms, *lookup_only)
            }
            Variable::SelfSimple => ctx.get_self().cloned(),
            Variable::SelfNested { terms, lookup_only } => {
                let terms = evaluate_terms(ctx, terms)?;
                let base = ctx.get_self()?;
                dereference(base, SELF, &terms, *lookup_only)
            }
        }
    }
}

/// Local, then global. Globals are handed out protected.
fn resolve(ctx: &Context, name: &str) -> Option<Element> {
    ctx.local(name)
        .cloned()
        .or_else(|| ctx.global(name).map(|global| global.value.protect()))
}

fn dereference(base: &Element, name: &str, terms: &[Term], lookup_only: bool) -> EvalResult<Element> {
    base.dereference(terms, 0, false, lookup_only)
        .map(Option::unwrap_or_default)
        .map_err(|e| e.for_reference(name, terms))
}

// ══════════════════════════════════════════════════════════════════════════════
// List references
// ══════════════════════════════════════════════════════════════════════════════

/// A reference that yields a writable list, creating it if necessary.
#[derive(Debug, Clone)]
pub struct ListVariable {
    identifier: Identifier,
    terms: Vec<Operation>,
}

impl ListVariable {
    pub fn new(identifier: Identifier, terms: Vec<Operation>) -> Self {
        Self { identifier, terms }
    }

    pub fn from_variable(variable: &Variable) -> Self {
        Self::new(variable.identifier(), variable.terms().to_vec())
    }

    /// Resolve (creating as needed) and return a copy of the list.
    pub fn execute(&self, ctx: &mut Context) -> EvalResult<Element> {
        self.with_list_mut(ctx, |list| Element::List(list.clone()))
    }

    /// Run `f` on the referenced list in place.
    pub fn with_list_mut<T>(
        &self,
        ctx: &mut Context,
        f: impl FnOnce(&mut ListResource) -> T,
    ) -> EvalResult<T> {
        let terms = evaluate_terms(ctx, &self.terms)?;
        let name = self.identifier.name();
        let base = match &self.identifier {
            Identifier::SelfRef => {
                let current = ctx.self_mut()?;
                if matches!(current, Element::Undef | Element::Null) {
                    *current = Element::container_for(terms.first());
                }
                current
            }
            Identifier::Named(name) => local_list_base(ctx, name)?,
        };
        base.make_writable();
        let list = base
            .dereference_as_list(&terms, 0)
            .map_err(|e| e.for_reference(name, &terms))?;
        Ok(f(list))
    }
}

fn local_list_base<'a>(ctx: &'a mut Context, name: &str) -> EvalResult<&'a mut Element> {
    if ctx.local(name).is_none() {
        if ctx.is_compile_time() {
            return Err(PanError::new(
                ErrorCode::COMPILE_TIME_RESTRICTION,
                format!("cannot create local variable '{name}' in a compile-time context"),
            ));
        }
        if ctx.has_global(name) {
            return Err(PanError::new(
                ErrorCode::GLOBAL_VARIABLE_CONFLICT,
                format!("cannot modify global variable '{name}' from DML"),
            ));
        }
        ctx.set_local(name, Element::List(ListResource::new()));
    }

    let local = ctx.local_mut(name).ok_or_else(|| {
        PanError::internal(format!("local variable '{name}' vanished after creation"))
    })?;
    if matches!(local, Element::Undef | Element::Null) {
        *local = Element::List(ListResource::new());
    }
    Ok(local)
}
