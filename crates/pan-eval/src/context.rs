//! Execution context for one object build.
//!
//! Holds the three variable tiers (local scopes, globals, SELF), the
//! configuration tree under construction, the type registry and the
//! path/type bindings collected for the validate phase.

use crate::element::{Element, HashResource, ListResource};
use crate::error::EvalResult;
use crate::options::EvalConfig;
use crate::types::{FullType, TypeMap};
use pan_types::{ErrorCode, PanError, Path, PathKind, Term};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Whether the context belongs to a real object build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextMode {
    /// Used for constant folding; SELF and the tree are unavailable.
    CompileTime,
    Build,
}

#[derive(Debug, Clone)]
pub struct GlobalVariable {
    pub value: Element,
    pub is_final: bool,
}

/// The value currently visible as SELF.
///
/// A root holder stores nothing itself: SELF is the configuration tree, so
/// path lookups and SELF writes see the same value.
#[derive(Debug, Clone)]
pub struct SelfHolder {
    value: Element,
    is_final: bool,
    is_root: bool,
}

/// A path whose value must satisfy a type in the validate phase.
#[derive(Debug, Clone)]
pub struct Binding {
    pub path: Path,
    pub full_type: Arc<FullType>,
}

#[derive(Debug)]
pub struct Context {
    mode: ContextMode,
    object: String,
    scopes: Vec<BTreeMap<String, Element>>,
    globals: BTreeMap<String, GlobalVariable>,
    self_holder: Option<SelfHolder>,
    root: Element,
    types: TypeMap,
    bindings: Vec<Binding>,
    prefix: Path,
    config: Arc<EvalConfig>,
}

impl Context {
    pub fn new(mode: ContextMode, object: impl Into<String>, config: Arc<EvalConfig>) -> Self {
        Self {
            mode,
            object: object.into(),
            scopes: vec![BTreeMap::new()],
            globals: BTreeMap::new(),
            self_holder: None,
            root: Element::Undef,
            types: TypeMap::new(),
            bindings: Vec::new(),
            prefix: Path::root(),
            config,
        }
    }

    /// A throwaway context for folding constant expressions.
    pub fn compile_time() -> Self {
        Self::new(ContextMode::CompileTime, "", Arc::new(EvalConfig::default()))
    }

    /// A build context with default options.
    pub fn for_object(object: impl Into<String>) -> Self {
        Self::new(ContextMode::Build, object, Arc::new(EvalConfig::default()))
    }

    pub fn mode(&self) -> ContextMode {
        self.mode
    }

    pub fn is_compile_time(&self) -> bool {
        self.mode == ContextMode::CompileTime
    }

    pub fn object_name(&self) -> &str {
        &self.object
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    // ══════════════════════════════════════════════════════════════════════
    // Local variables
    // ══════════════════════════════════════════════════════════════════════

    /// Start a fresh local frame; each DML block sees only its own locals.
    pub fn push_scope(&mut self) {
        self.scopes.push(BTreeMap::new());
    }

    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn local(&self, name: &str) -> Option<&Element> {
        self.scopes.last().and_then(|scope| scope.get(name))
    }

    pub fn local_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.scopes.last_mut().and_then(|scope| scope.get_mut(name))
    }

    pub fn set_local(&mut self, name: &str, value: Element) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), value);
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Global variables
    // ══════════════════════════════════════════════════════════════════════

    pub fn global(&self, name: &str) -> Option<&GlobalVariable> {
        self.globals.get(name)
    }

    pub fn has_global(&self, name: &str) -> bool {
        self.globals.contains_key(name)
    }

    /// Define or replace a global. Final globals cannot be replaced.
    pub fn set_global(&mut self, name: &str, value: Element, is_final: bool) -> EvalResult<()> {
        if let Some(existing) = self.globals.get(name) {
            if existing.is_final {
                return Err(PanError::new(
                    ErrorCode::FINAL_VARIABLE,
                    format!("cannot modify final variable '{name}'"),
                ));
            }
            existing.value.check_valid_replacement(&value).map_err(|e| e.for_reference(name, &[]))?;
        }
        self.globals.insert(name.to_string(), GlobalVariable { value, is_final });
        Ok(())
    }

    // ══════════════════════════════════════════════════════════════════════
    // SELF
    // ══════════════════════════════════════════════════════════════════════

    /// Install a new SELF, returning the holder it replaces.
    pub fn swap_self(&mut self, value: Element, is_final: bool) -> Option<SelfHolder> {
        self.self_holder.replace(SelfHolder {
            value,
            is_final,
            is_root: false,
        })
    }

    /// Make SELF the configuration tree itself, returning the holder it replaces.
    pub fn swap_self_to_root(&mut self) -> Option<SelfHolder> {
        self.self_holder.replace(SelfHolder {
            value: Element::Undef,
            is_final: false,
            is_root: true,
        })
    }

    /// Reinstall a holder returned by [`swap_self`](Self::swap_self) and
    /// return the value SELF had before the restore.
    pub fn restore_self(&mut self, previous: Option<SelfHolder>) -> Option<Element> {
        let current = std::mem::replace(&mut self.self_holder, previous)?;
        Some(if current.is_root {
            self.root.clone()
        } else {
            current.value
        })
    }

    pub fn is_self_final(&self) -> bool {
        self.self_holder.as_ref().is_some_and(|holder| holder.is_final)
    }

    fn check_self_available(&self) -> EvalResult<()> {
        if self.is_compile_time() {
            return Err(PanError::new(
                ErrorCode::COMPILE_TIME_RESTRICTION,
                "SELF cannot be referenced in a compile-time context",
            ));
        }
        if self.self_holder.is_none() {
            return Err(PanError::new(
                ErrorCode::MISSING_SELF,
                "no SELF value is installed",
            ));
        }
        Ok(())
    }

    pub fn get_self(&self) -> EvalResult<&Element> {
        self.check_self_available()?;
        self.self_holder
            .as_ref()
            .map(|holder| if holder.is_root { &self.root } else { &holder.value })
            .ok_or_else(|| PanError::new(ErrorCode::MISSING_SELF, "no SELF value is installed"))
    }

    /// Writable access to SELF; fails while SELF is final.
    pub fn self_mut(&mut self) -> EvalResult<&mut Element> {
        self.check_self_available()?;
        match self.self_holder.as_mut() {
            Some(holder) if holder.is_final => Err(PanError::new(
                ErrorCode::SELF_IS_FINAL,
                "cannot modify SELF from a validation function",
            )),
            Some(holder) if holder.is_root => Ok(&mut self.root),
            Some(holder) => Ok(&mut holder.value),
            None => Err(PanError::new(ErrorCode::MISSING_SELF, "no SELF value is installed")),
        }
    }

    /// Replace SELF outright.
    pub fn reset_self(&mut self, value: Element) -> EvalResult<()> {
        *self.self_mut()? = value;
        Ok(())
    }

    // ══════════════════════════════════════════════════════════════════════
    // Configuration tree
    // ══════════════════════════════════════════════════════════════════════

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn take_root(&mut self) -> Element {
        std::mem::take(&mut self.root)
    }

    pub fn set_root(&mut self, root: Element) {
        self.root = root;
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    pub fn set_prefix(&mut self, prefix: Path) -> EvalResult<()> {
        if !prefix.is_absolute() {
            return Err(PanError::new(
                ErrorCode::INVALID_PATH,
                format!("prefix '{prefix}' must be an absolute path"),
            ));
        }
        self.prefix = prefix;
        Ok(())
    }

    /// Resolve a path to the terms addressing it in this object's tree.
    pub fn resolve_path(&self, path: &Path) -> EvalResult<Vec<Term>> {
        let resolved = path.resolve(&self.prefix);
        match resolved.kind() {
            PathKind::External(object) => Err(PanError::new(
                ErrorCode::EXTERNAL_REFERENCE,
                format!("reference to object '{object}' cannot be resolved while building '{}'", self.object),
            )),
            _ => Ok(resolved.terms().to_vec()),
        }
    }

    /// Current value at `path`, or `None` when nothing is there.
    pub fn get_element(&self, path: &Path) -> EvalResult<Option<Element>> {
        let terms = self.resolve_path(path)?;
        self.root
            .dereference(&terms, 0, false, true)
            .map_err(|e| e.for_reference(&path.to_string(), &[]))
    }

    /// Store `value` at `path`, creating parents as needed.
    ///
    /// The new value must be a valid replacement for the current one.
    pub fn put_element(&mut self, path: &Path, value: Element) -> EvalResult<()> {
        let terms = self.resolve_path(path)?;
        let name = path.to_string();
        if let Some(existing) = self
            .root
            .dereference(&terms, 0, false, true)
            .map_err(|e| e.for_reference(&name, &[]))?
        {
            existing
                .check_valid_replacement(&value)
                .map_err(|e| e.for_reference(&name, &[]))?;
        }

        match terms.first() {
            None => self.root = value,
            Some(first) => {
                if matches!(self.root, Element::Undef | Element::Null) {
                    self.root = match first {
                        Term::Key(_) => Element::Hash(HashResource::new()),
                        Term::Index(_) => Element::List(ListResource::new()),
                    };
                }
                self.root.make_writable();
                self.root
                    .insert(&terms, 0, value)
                    .map_err(|e| e.for_reference(&name, &[]))?;
            }
        }
        Ok(())
    }

    // ══════════════════════════════════════════════════════════════════════
    // Types and bindings
    // ══════════════════════════════════════════════════════════════════════

    pub fn types(&self) -> &TypeMap {
        &self.types
    }

    pub fn register_type(
        &mut self,
        name: &str,
        full_type: impl Into<Arc<FullType>>,
    ) -> EvalResult<()> {
        self.types.register(name, full_type)
    }

    pub fn full_type(&self, name: &str) -> EvalResult<Arc<FullType>> {
        self.types.get(name).ok_or_else(|| {
            PanError::new(ErrorCode::UNKNOWN_TYPE, format!("type '{name}' is not defined"))
        })
    }

    /// Record that the value at `path` must satisfy `full_type`.
    pub fn bind(&mut self, path: &Path, full_type: Arc<FullType>) -> EvalResult<()> {
        let terms = self.resolve_path(path)?;
        self.bindings.push(Binding {
            path: Path::absolute(terms),
            full_type,
        });
        Ok(())
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locals_are_frame_scoped() {
        let mut ctx = Context::compile_time();
        ctx.set_local("x", Element::Long(1));
        ctx.push_scope();
        assert!(ctx.local("x").is_none());
        ctx.set_local("x", Element::Long(2));
        ctx.pop_scope();
        assert_eq!(ctx.local("x"), Some(&Element::Long(1)));
    }

    #[test]
    fn final_globals() {
        let mut ctx = Context::for_object("node01");
        ctx.set_global("g", Element::Long(1), true).unwrap();
        let err = ctx.set_global("g", Element::Long(2), false).unwrap_err();
        assert_eq!(err.code, ErrorCode::FINAL_VARIABLE);
    }

    #[test]
    fn self_restrictions() {
        let ctx = Context::compile_time();
        assert_eq!(
            ctx.get_self().unwrap_err().code,
            ErrorCode::COMPILE_TIME_RESTRICTION
        );

        let mut ctx = Context::for_object("node01");
        assert!(ctx.get_self().unwrap_err().is_internal());

        let previous = ctx.swap_self(Element::Long(1), true);
        assert_eq!(ctx.self_mut().unwrap_err().code, ErrorCode::SELF_IS_FINAL);
        assert_eq!(ctx.restore_self(previous), Some(Element::Long(1)));
    }

    #[test]
    fn root_self_writes_through_to_the_tree() {
        let mut ctx = Context::for_object("node01");
        let a = Path::parse("/a").unwrap();
        ctx.put_element(&a, Element::Long(1)).unwrap();

        let previous = ctx.swap_self_to_root();
        assert!(ctx.get_self().unwrap().as_hash().is_some_and(|h| h.contains_key("a")));
        ctx.self_mut()
            .unwrap()
            .insert(&[Term::Key("b".into())], 0, Element::Long(2))
            .unwrap();
        assert_eq!(
            ctx.get_element(&Path::parse("/b").unwrap()).unwrap(),
            Some(Element::Long(2))
        );
        ctx.restore_self(previous);
        assert_eq!(ctx.get_element(&a).unwrap(), Some(Element::Long(1)));
    }

    #[test]
    fn put_element_creates_root_and_checks_replacement() {
        let mut ctx = Context::for_object("node01");
        let path = Path::parse("/a/0").unwrap();
        ctx.put_element(&path, Element::Long(3)).unwrap();
        assert_eq!(ctx.get_element(&path).unwrap(), Some(Element::Long(3)));

        let err = ctx.put_element(&path, Element::from("x")).unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_REPLACEMENT);
    }

    #[test]
    fn relative_paths_use_prefix() {
        let mut ctx = Context::for_object("node01");
        ctx.set_prefix(Path::parse("/system").unwrap()).unwrap();
        ctx.put_element(&Path::parse("name").unwrap(), Element::from("n"))
            .unwrap();
        assert_eq!(
            ctx.get_element(&Path::parse("/system/name").unwrap()).unwrap(),
            Some(Element::from("n"))
        );
    }

    #[test]
    fn external_paths_are_rejected() {
        let ctx = Context::for_object("node01");
        let err = ctx
            .get_element(&Path::parse("other:/a").unwrap())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::EXTERNAL_REFERENCE);
    }
}
