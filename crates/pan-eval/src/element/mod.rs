//! The pan value model.
//!
//! An [`Element`] is either a scalar (`undef`, `null`, boolean, long,
//! double, string) or a container resource ([`ListResource`],
//! [`HashResource`]). Containers are reference-counted and carry a
//! protection flag; a protected container is a read-only view that is
//! transparently duplicated the first time anyone writes through it.

mod resource;
mod serialize;

pub use resource::{HashResource, ListResource};

use crate::error::ElementError;
use pan_types::{Range, Term};
use std::fmt;

#[derive(Debug, Clone, Default)]
pub enum Element {
    /// A slot that exists but has no value yet.
    #[default]
    Undef,
    /// Deletes the slot it is written to.
    Null,
    Boolean(bool),
    Long(i64),
    Double(f64),
    String(String),
    List(ListResource),
    Hash(HashResource),
}

impl Element {
    // ── Classification ───────────────────────────────────────────────────

    /// Lower-case type name used in messages and by `is_*` built-ins.
    pub fn type_name(&self) -> &'static str {
        match self {
            Element::Undef => "undef",
            Element::Null => "null",
            Element::Boolean(_) => "boolean",
            Element::Long(_) => "long",
            Element::Double(_) => "double",
            Element::String(_) => "string",
            Element::List(_) => "list",
            Element::Hash(_) => "dict",
        }
    }

    pub fn is_undef(&self) -> bool {
        matches!(self, Element::Undef)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Element::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Element::Long(_) | Element::Double(_))
    }

    pub fn is_property(&self) -> bool {
        matches!(
            self,
            Element::Boolean(_) | Element::Long(_) | Element::Double(_) | Element::String(_)
        )
    }

    pub fn is_resource(&self) -> bool {
        matches!(self, Element::List(_) | Element::Hash(_))
    }

    pub fn is_protected(&self) -> bool {
        match self {
            Element::List(l) => l.is_protected(),
            Element::Hash(h) => h.is_protected(),
            _ => false,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Element::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Element::Long(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric value of a long or double.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Element::Long(n) => Some(*n as f64),
            Element::Double(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Element::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListResource> {
        match self {
            Element::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_hash(&self) -> Option<&HashResource> {
        match self {
            Element::Hash(h) => Some(h),
            _ => None,
        }
    }

    // ── Sharing ──────────────────────────────────────────────────────────

    /// A read-only view of this value. Scalars are returned as-is.
    pub fn protect(&self) -> Element {
        match self {
            Element::List(l) => Element::List(l.protect()),
            Element::Hash(h) => Element::Hash(h.protect()),
            other => other.clone(),
        }
    }

    /// Deep copy sharing no storage with `self`.
    pub fn duplicate(&self) -> Element {
        match self {
            Element::List(l) => Element::List(l.duplicate()),
            Element::Hash(h) => Element::Hash(h.duplicate()),
            other => other.clone(),
        }
    }

    /// `self` when it may be written to, otherwise a duplicate.
    pub fn writable_copy(&self) -> Element {
        if self.is_protected() {
            self.duplicate()
        } else {
            self.clone()
        }
    }

    pub fn make_writable(&mut self) {
        if self.is_protected() {
            *self = self.duplicate();
        }
    }

    /// An empty container matching the term that will address into it.
    pub(crate) fn container_for(next: Option<&Term>) -> Element {
        match next {
            Some(Term::Key(_)) => Element::Hash(HashResource::new()),
            _ => Element::List(ListResource::new()),
        }
    }

    // ── Validation helpers ───────────────────────────────────────────────

    /// Check that `replacement` may overwrite `self` in the configuration tree.
    ///
    /// `undef` and `null` replace or are replaced by anything; otherwise both
    /// values must have the same type.
    pub fn check_valid_replacement(&self, replacement: &Element) -> Result<(), ElementError> {
        let open = |e: &Element| matches!(e, Element::Undef | Element::Null);
        if open(self)
            || open(replacement)
            || std::mem::discriminant(self) == std::mem::discriminant(replacement)
        {
            Ok(())
        } else {
            Err(ElementError::InvalidReplacement {
                old: self.type_name(),
                new: replacement.type_name(),
            })
        }
    }

    /// Check this value against a range: numbers by value, strings by
    /// character count, containers by size.
    pub fn check_range(&self, range: &Range) -> Result<(), ElementError> {
        let ok = match self {
            Element::Long(n) => range.contains(*n),
            Element::Double(x) => range.contains_double(*x),
            Element::String(s) => range.contains(s.chars().count() as i64),
            Element::List(l) => range.contains(l.len() as i64),
            Element::Hash(h) => range.contains(h.len() as i64),
            other => return Err(ElementError::InvalidRangeCheck(other.type_name())),
        };
        if ok {
            Ok(())
        } else {
            Err(ElementError::RangeMismatch {
                value: self.to_string(),
                range: *range,
            })
        }
    }

    // ── Path access ──────────────────────────────────────────────────────

    /// Resolve `terms[index..]` below this value.
    ///
    /// Children of a protected container come back protected, as does
    /// everything when `protect` is set. With `lookup_only` a missing child
    /// (or a scalar in the middle of the path) yields `None` instead of an
    /// error; a key used on a list or an index used on a dict is always an
    /// error.
    pub fn dereference(
        &self,
        terms: &[Term],
        index: usize,
        protect: bool,
        lookup_only: bool,
    ) -> Result<Option<Element>, ElementError> {
        if index >= terms.len() {
            return Ok(Some(if protect { self.protect() } else { self.clone() }));
        }
        match self {
            Element::List(l) => l.rget(terms, index, protect, lookup_only),
            Element::Hash(h) => h.rget(terms, index, protect, lookup_only),
            _ if lookup_only => Ok(None),
            other => Err(ElementError::IllegalDereference(other.type_name())),
        }
    }

    /// Writable list at `terms[index..]`, creating it and any missing parents.
    ///
    /// Missing or `undef`/`null` intermediates become a list when the next
    /// term is an index and a dict when it is a key.
    pub fn dereference_as_list(
        &mut self,
        terms: &[Term],
        index: usize,
    ) -> Result<&mut ListResource, ElementError> {
        let at_end = index >= terms.len();
        match self {
            Element::List(l) => l.rget_list(terms, index),
            Element::Hash(_) if at_end => Err(ElementError::NotAList("dict")),
            Element::Hash(h) => h.rget_list(terms, index),
            other if at_end => Err(ElementError::NotAList(other.type_name())),
            other => Err(ElementError::IllegalDereference(other.type_name())),
        }
    }

    /// Write `value` at `terms[index..]` below this container.
    ///
    /// Intermediate containers are created on demand. Writing `null`
    /// removes the addressed child.
    pub fn insert(
        &mut self,
        terms: &[Term],
        index: usize,
        value: Element,
    ) -> Result<(), ElementError> {
        if index >= terms.len() {
            return Err(ElementError::EmptyPath);
        }
        match self {
            Element::List(l) => l.rput(terms, index, value),
            Element::Hash(h) => h.rput(terms, index, value),
            other => Err(ElementError::CannotAddChild(other.type_name())),
        }
    }

    /// Path of the first `undef` found in a depth-first walk, if any.
    pub fn find_undefined(&self) -> Option<Vec<Term>> {
        match self {
            Element::Undef => Some(Vec::new()),
            Element::List(l) => l.iter().enumerate().find_map(|(i, child)| {
                child.find_undefined().map(|mut rest| {
                    rest.insert(0, Term::Index(i as u64));
                    rest
                })
            }),
            Element::Hash(h) => h.iter().find_map(|(k, child)| {
                child.find_undefined().map(|mut rest| {
                    rest.insert(0, Term::Key(k.clone()));
                    rest
                })
            }),
            _ => None,
        }
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Element::Undef, Element::Undef) | (Element::Null, Element::Null) => true,
            (Element::Boolean(a), Element::Boolean(b)) => a == b,
            (Element::Long(a), Element::Long(b)) => a == b,
            (Element::Double(a), Element::Double(b)) => a == b,
            (Element::String(a), Element::String(b)) => a == b,
            (Element::List(a), Element::List(b)) => a == b,
            (Element::Hash(a), Element::Hash(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Undef => f.write_str("undef"),
            Element::Null => f.write_str("null"),
            Element::Boolean(b) => write!(f, "{b}"),
            Element::Long(n) => write!(f, "{n}"),
            Element::Double(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e15 => {
                write!(f, "{x:.1}")
            }
            Element::Double(x) => write!(f, "{x}"),
            Element::String(s) => f.write_str(s),
            Element::List(l) => {
                f.write_str("[")?;
                for (i, child) in l.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str("]")
            }
            Element::Hash(h) => {
                f.write_str("{")?;
                for (i, (k, child)) in h.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {child}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for Element {
    fn from(b: bool) -> Self {
        Element::Boolean(b)
    }
}

impl From<i64> for Element {
    fn from(n: i64) -> Self {
        Element::Long(n)
    }
}

impl From<f64> for Element {
    fn from(x: f64) -> Self {
        Element::Double(x)
    }
}

impl From<&str> for Element {
    fn from(s: &str) -> Self {
        Element::String(s.to_string())
    }
}

impl From<String> for Element {
    fn from(s: String) -> Self {
        Element::String(s)
    }
}

impl From<ListResource> for Element {
    fn from(l: ListResource) -> Self {
        Element::List(l)
    }
}

impl From<HashResource> for Element {
    fn from(h: HashResource) -> Self {
        Element::Hash(h)
    }
}
