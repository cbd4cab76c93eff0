//! Container elements: lists and dicts.
//!
//! Children live behind an `Arc`, so cloning a resource is cheap and clones
//! share storage. A protected resource must never be written through: every
//! mutating method first replaces a protected resource with a full
//! [`duplicate`](ListResource::duplicate), and unprotected shared storage is
//! split with `Arc::make_mut`.

use super::Element;
use crate::error::ElementError;
use indexmap::IndexMap;
use pan_types::Term;
use std::sync::Arc;

// ══════════════════════════════════════════════════════════════════════════════
// ListResource
// ══════════════════════════════════════════════════════════════════════════════

/// Most `undef` children a single write past the end of a list may create.
pub const MAX_LIST_PADDING: usize = 1 << 20;

/// An ordered list addressed by a dense `0..n-1` index space.
#[derive(Debug, Clone, Default)]
pub struct ListResource {
    items: Arc<Vec<Element>>,
    protected: bool,
}

impl ListResource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(items: Vec<Element>) -> Self {
        Self {
            items: Arc::new(items),
            protected: false,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Element> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Element] {
        &self.items
    }

    pub fn is_protected(&self) -> bool {
        self.protected
    }

    /// A protected handle sharing this list's storage.
    pub fn protect(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            protected: true,
        }
    }

    /// Deep copy: no storage is shared with `self` at any depth.
    pub fn duplicate(&self) -> Self {
        Self::from_vec(self.items.iter().map(Element::duplicate).collect())
    }

    pub fn writable_copy(&self) -> Self {
        if self.protected {
            self.duplicate()
        } else {
            self.clone()
        }
    }

    /// True when both handles point at the same storage.
    pub fn shares_storage(&self, other: &ListResource) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }

    fn items_mut(&mut self) -> &mut Vec<Element> {
        if self.protected {
            *self = self.duplicate();
        }
        Arc::make_mut(&mut self.items)
    }

    pub fn push(&mut self, value: Element) {
        self.items_mut().push(value);
    }

    pub fn prepend(&mut self, value: Element) {
        self.items_mut().insert(0, value);
    }

    pub fn extend(&mut self, values: impl IntoIterator<Item = Element>) {
        self.items_mut().extend(values);
    }

    /// Store `value` at `index`, padding any gap with `undef`.
    pub fn set(&mut self, index: usize, value: Element) -> Result<(), ElementError> {
        self.check_padding(index)?;
        let items = self.items_mut();
        if index >= items.len() {
            items.resize(index, Element::Undef);
            items.push(value);
        } else {
            items[index] = value;
        }
        Ok(())
    }

    fn check_padding(&self, index: usize) -> Result<(), ElementError> {
        if index.saturating_sub(self.items.len()) > MAX_LIST_PADDING {
            return Err(ElementError::IndexTooFar {
                index: index as u64,
                len: self.items.len(),
            });
        }
        Ok(())
    }

    /// Writable child at `index`, padding with `undef` up to it.
    fn slot_mut(&mut self, index: usize) -> Result<&mut Element, ElementError> {
        self.check_padding(index)?;
        let items = self.items_mut();
        if index >= items.len() {
            items.resize(index + 1, Element::Undef);
        }
        Ok(&mut items[index])
    }

    pub fn remove(&mut self, index: usize) -> Option<Element> {
        if index < self.items.len() {
            Some(self.items_mut().remove(index))
        } else {
            None
        }
    }

    /// Remove `count` children starting at `start` and insert `replacement` in their place.
    pub fn splice(&mut self, start: usize, count: usize, replacement: Vec<Element>) {
        let items = self.items_mut();
        let start = start.min(items.len());
        let end = start.saturating_add(count).min(items.len());
        items.splice(start..end, replacement);
    }

    // ── Recursive access ─────────────────────────────────────────────────

    fn index_of(term: &Term) -> Result<usize, ElementError> {
        match term {
            Term::Index(i) => usize::try_from(*i).map_err(|_| ElementError::IndexTooFar {
                index: *i,
                len: 0,
            }),
            Term::Key(k) => Err(ElementError::KeyOnList(k.clone())),
        }
    }

    pub(crate) fn rget(
        &self,
        terms: &[Term],
        index: usize,
        protect: bool,
        lookup_only: bool,
    ) -> Result<Option<Element>, ElementError> {
        let i = Self::index_of(&terms[index])?;
        match self.items.get(i) {
            Some(child) => child.dereference(terms, index + 1, protect || self.protected, lookup_only),
            None if lookup_only => Ok(None),
            None => Err(ElementError::Undefined(terms[index].clone())),
        }
    }

    pub(crate) fn rget_list(
        &mut self,
        terms: &[Term],
        index: usize,
    ) -> Result<&mut ListResource, ElementError> {
        if index >= terms.len() {
            if self.protected {
                *self = self.duplicate();
            }
            return Ok(self);
        }
        let i = Self::index_of(&terms[index])?;
        let child = self.slot_mut(i)?;
        if matches!(child, Element::Undef | Element::Null) {
            *child = Element::container_for(terms.get(index + 1));
        }
        child.dereference_as_list(terms, index + 1)
    }

    pub(crate) fn rput(
        &mut self,
        terms: &[Term],
        index: usize,
        value: Element,
    ) -> Result<(), ElementError> {
        let i = Self::index_of(&terms[index])?;
        if index + 1 == terms.len() {
            if value.is_null() {
                self.remove(i);
            } else {
                self.set(i, value)?;
            }
            return Ok(());
        }
        let child = self.slot_mut(i)?;
        if matches!(child, Element::Undef | Element::Null) {
            *child = Element::container_for(terms.get(index + 1));
        }
        child.insert(terms, index + 1, value)
    }
}

impl PartialEq for ListResource {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl FromIterator<Element> for ListResource {
    fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ListResource {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// HashResource
// ══════════════════════════════════════════════════════════════════════════════

/// A dict keyed by strings. Iteration follows insertion order, equality does not.
#[derive(Debug, Clone, Default)]
pub struct HashResource {
    entries: Arc<IndexMap<String, Element>>,
    protected: bool,
}

impl HashResource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(entries: IndexMap<String, Element>) -> Self {
        Self {
            entries: Arc::new(entries),
            protected: false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Element> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Element> {
        self.entries.iter()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Element> {
        self.entries.keys()
    }

    pub fn is_protected(&self) -> bool {
        self.protected
    }

    pub fn protect(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            protected: true,
        }
    }

    pub fn duplicate(&self) -> Self {
        Self::from_map(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), v.duplicate()))
                .collect(),
        )
    }

    pub fn writable_copy(&self) -> Self {
        if self.protected {
            self.duplicate()
        } else {
            self.clone()
        }
    }

    pub fn shares_storage(&self, other: &HashResource) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }

    fn entries_mut(&mut self) -> &mut IndexMap<String, Element> {
        if self.protected {
            *self = self.duplicate();
        }
        Arc::make_mut(&mut self.entries)
    }

    /// Insert or replace a child. Existing keys keep their position.
    pub fn insert(&mut self, key: impl Into<String>, value: Element) {
        self.entries_mut().insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Element> {
        if self.entries.contains_key(key) {
            self.entries_mut().shift_remove(key)
        } else {
            None
        }
    }

    // ── Recursive access ─────────────────────────────────────────────────

    fn key_of(term: &Term) -> Result<&str, ElementError> {
        match term {
            Term::Key(k) => Ok(k),
            Term::Index(i) => Err(ElementError::IndexOnHash(*i)),
        }
    }

    pub(crate) fn rget(
        &self,
        terms: &[Term],
        index: usize,
        protect: bool,
        lookup_only: bool,
    ) -> Result<Option<Element>, ElementError> {
        let key = Self::key_of(&terms[index])?;
        match self.entries.get(key) {
            Some(child) => child.dereference(terms, index + 1, protect || self.protected, lookup_only),
            None if lookup_only => Ok(None),
            None => Err(ElementError::Undefined(terms[index].clone())),
        }
    }

    pub(crate) fn rget_list(
        &mut self,
        terms: &[Term],
        index: usize,
    ) -> Result<&mut ListResource, ElementError> {
        let key = Self::key_of(&terms[index])?.to_string();
        let child = self
            .entries_mut()
            .entry(key)
            .or_insert(Element::Undef);
        if matches!(child, Element::Undef | Element::Null) {
            *child = Element::container_for(terms.get(index + 1));
        }
        child.dereference_as_list(terms, index + 1)
    }

    pub(crate) fn rput(
        &mut self,
        terms: &[Term],
        index: usize,
        value: Element,
    ) -> Result<(), ElementError> {
        let key = Self::key_of(&terms[index])?.to_string();
        if index + 1 == terms.len() {
            if value.is_null() {
                self.remove(&key);
            } else {
                self.insert(key, value);
            }
            return Ok(());
        }
        let child = self
            .entries_mut()
            .entry(key)
            .or_insert(Element::Undef);
        if matches!(child, Element::Undef | Element::Null) {
            *child = Element::container_for(terms.get(index + 1));
        }
        child.insert(terms, index + 1, value)
    }
}

impl PartialEq for HashResource {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl FromIterator<(String, Element)> for HashResource {
    fn from_iter<I: IntoIterator<Item = (String, Element)>>(iter: I) -> Self {
        Self::from_map(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a HashResource {
    type Item = (&'a String, &'a Element);
    type IntoIter = indexmap::map::Iter<'a, String, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protected_list_is_copied_before_mutation() {
        let original = ListResource::from_vec(vec![Element::Long(1)]);
        let mut shared = original.protect();
        assert!(shared.shares_storage(&original));

        shared.push(Element::Long(2));
        assert!(!shared.is_protected());
        assert!(!shared.shares_storage(&original));
        assert_eq!(original.len(), 1);
        assert_eq!(shared.len(), 2);
    }

    #[test]
    fn set_pads_with_undef() {
        let mut list = ListResource::new();
        list.set(2, Element::Long(7)).unwrap();
        assert_eq!(
            list.as_slice(),
            &[Element::Undef, Element::Undef, Element::Long(7)]
        );
    }

    #[test]
    fn far_index_is_rejected_without_allocating() {
        let mut list = ListResource::from_vec(vec![Element::Long(1)]);
        let err = list
            .set(MAX_LIST_PADDING + 2, Element::Long(2))
            .unwrap_err();
        assert_eq!(
            err,
            ElementError::IndexTooFar {
                index: (MAX_LIST_PADDING + 2) as u64,
                len: 1
            }
        );
        assert_eq!(list.len(), 1);

        let terms = [Term::Index(u64::MAX)];
        assert!(list.rput(&terms, 0, Element::Long(3)).is_err());
        assert!(list.rget_list(&[Term::Index(u64::MAX), Term::Index(0)], 0).is_err());
        assert_eq!(list.rget(&terms, 0, false, true), Ok(None));
    }

    #[test]
    fn hash_equality_ignores_order() {
        let a: HashResource = [
            ("x".to_string(), Element::Long(1)),
            ("y".to_string(), Element::Long(2)),
        ]
        .into_iter()
        .collect();
        let b: HashResource = [
            ("y".to_string(), Element::Long(2)),
            ("x".to_string(), Element::Long(1)),
        ]
        .into_iter()
        .collect();
        assert_eq!(a, b);
        assert_eq!(a.keys().next().map(String::as_str), Some("x"));
    }

    #[test]
    fn splice_clamps_bounds() {
        let mut list: ListResource = (0..5).map(Element::Long).collect();
        list.splice(3, 10, vec![Element::from("a")]);
        assert_eq!(list.len(), 4);
        assert_eq!(list.get(3), Some(&Element::from("a")));
    }
}
