use super::base_type::{BaseType, Primitive};
use super::full_type::FullType;
use crate::error::EvalResult;
use pan_types::{ErrorCode, PanError};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Named types visible to one object.
///
/// Starts with the built-in primitives (`nlist` is kept as an alias name
/// for `dict`). A name can be registered once.
#[derive(Debug, Clone)]
pub struct TypeMap {
    types: BTreeMap<String, Arc<FullType>>,
}

impl TypeMap {
    pub fn new() -> Self {
        let mut types = BTreeMap::new();
        for primitive in Primitive::ALL {
            types.insert(
                primitive.name().to_string(),
                Arc::new(FullType::new(BaseType::primitive(primitive))),
            );
        }
        types.insert(
            "nlist".to_string(),
            Arc::new(FullType::new(BaseType::primitive(Primitive::Dict))),
        );
        Self { types }
    }

    pub fn get(&self, name: &str) -> Option<Arc<FullType>> {
        self.types.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Register `name`. Fails if the name is taken or if the type refers to
    /// a type that is not registered yet.
    pub fn register(&mut self, name: &str, full_type: impl Into<Arc<FullType>>) -> EvalResult<()> {
        let full_type = full_type.into();
        if let Some(existing) = self.types.get(name) {
            let location = match (existing.source(), existing.source_range()) {
                (Some(source), Some(range)) => format!(" (already defined in {source} at {range})"),
                (Some(source), None) => format!(" (already defined in {source})"),
                _ => String::new(),
            };
            return Err(PanError::new(
                ErrorCode::DUPLICATE_TYPE_DEFINITION,
                format!("type '{name}' is already defined{location}"),
            )
            .at_opt(full_type.source_range()));
        }
        full_type
            .base()
            .check_subtypes(self)
            .map_err(|e| e.at_opt(full_type.source_range()))?;

        debug!(name, base = %full_type.base(), "registered type");
        self.types.insert(name.to_string(), full_type);
        Ok(())
    }
}

impl Default for TypeMap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pan_types::ErrorCategory;

    #[test]
    fn builtins_are_preregistered() {
        let types = TypeMap::new();
        for name in [
            "element", "property", "boolean", "long", "double", "number", "string", "resource",
            "list", "nlist", "dict",
        ] {
            assert!(types.contains(name), "{name}");
        }
        assert!(!types.contains("port"));
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut types = TypeMap::new();
        types
            .register("port", FullType::new(BaseType::primitive(Primitive::Long)))
            .unwrap();
        let err = types
            .register("port", FullType::new(BaseType::primitive(Primitive::Long)))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DUPLICATE_TYPE_DEFINITION);

        let err = types
            .register("long", FullType::new(BaseType::primitive(Primitive::Long)))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DUPLICATE_TYPE_DEFINITION);
    }

    #[test]
    fn unknown_alias_fails_at_registration() {
        let mut types = TypeMap::new();
        let err = types
            .register("hosts", FullType::new(BaseType::list_of(BaseType::alias("host").into())))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UNKNOWN_TYPE);
        assert_eq!(err.category, ErrorCategory::Evaluation);
        assert!(!types.contains("hosts"));

        types
            .register("host", FullType::from(BaseType::primitive(Primitive::String)))
            .unwrap();
        types
            .register("hosts", FullType::new(BaseType::list_of(BaseType::alias("host").into())))
            .unwrap();
    }
}
