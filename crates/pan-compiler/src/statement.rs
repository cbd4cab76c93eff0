//! Top-level template statements.
//!
//! Statements are what an object template is made of once parsed. Each
//! one runs against the object's [`Context`] during the build phase.

use pan_eval::{BaseType, Context, Element, EvalResult, FullType, Operation};
use pan_types::{ErrorCode, PanError, Path, SourceRange};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub enum StatementKind {
    /// `path = value` or `path ?= value`. The value expression sees the
    /// current value at `path` as SELF.
    Assign {
        path: Path,
        value: Operation,
        conditional: bool,
    },
    /// `variable name = value`, optionally `final` or conditional (`?=`).
    Variable {
        name: String,
        value: Operation,
        conditional: bool,
        is_final: bool,
    },
    /// `type name = ...`
    Type {
        name: String,
        full_type: Arc<FullType>,
    },
    /// `bind path = ...`
    Bind {
        path: Path,
        full_type: Arc<FullType>,
    },
    /// `prefix path`
    Prefix(Path),
    /// Bare DML run with SELF set to the whole tree.
    Dml(Operation),
}

/// A statement together with where it came from.
#[derive(Debug, Clone)]
pub struct Statement {
    pub kind: StatementKind,
    pub range: SourceRange,
}

impl Statement {
    pub fn assign(path: Path, value: Operation, range: SourceRange) -> Self {
        Self {
            kind: StatementKind::Assign {
                path,
                value,
                conditional: false,
            },
            range,
        }
    }

    pub fn assign_default(path: Path, value: Operation, range: SourceRange) -> Self {
        Self {
            kind: StatementKind::Assign {
                path,
                value,
                conditional: true,
            },
            range,
        }
    }

    pub fn variable(name: &str, value: Operation, is_final: bool, range: SourceRange) -> Self {
        Self {
            kind: StatementKind::Variable {
                name: name.to_string(),
                value,
                conditional: false,
                is_final,
            },
            range,
        }
    }

    pub fn variable_default(name: &str, value: Operation, range: SourceRange) -> Self {
        Self {
            kind: StatementKind::Variable {
                name: name.to_string(),
                value,
                conditional: true,
                is_final: false,
            },
            range,
        }
    }

    pub fn type_def(name: &str, full_type: impl Into<Arc<FullType>>, range: SourceRange) -> Self {
        Self {
            kind: StatementKind::Type {
                name: name.to_string(),
                full_type: full_type.into(),
            },
            range,
        }
    }

    /// Bind a path to a type. Only absolute paths can be bound.
    pub fn bind(
        path: Path,
        full_type: impl Into<Arc<FullType>>,
        range: SourceRange,
    ) -> EvalResult<Self> {
        if !path.is_absolute() {
            return Err(PanError::new(
                ErrorCode::INVALID_PATH,
                format!("bind requires an absolute path, found '{path}'"),
            )
            .at(range));
        }
        Ok(Self {
            kind: StatementKind::Bind {
                path,
                full_type: full_type.into(),
            },
            range,
        })
    }

    /// Bind a path to a named type.
    pub fn bind_name(path: Path, type_name: &str, range: SourceRange) -> EvalResult<Self> {
        Self::bind(path, FullType::new(BaseType::alias(type_name)), range)
    }

    pub fn prefix(path: Path, range: SourceRange) -> Self {
        Self {
            kind: StatementKind::Prefix(path),
            range,
        }
    }

    pub fn dml(op: Operation) -> Self {
        let range = op.range;
        Self {
            kind: StatementKind::Dml(op),
            range,
        }
    }

    pub fn execute(&self, ctx: &mut Context) -> EvalResult<()> {
        self.run(ctx).map_err(|e| e.at(self.range))
    }

    fn run(&self, ctx: &mut Context) -> EvalResult<()> {
        match &self.kind {
            StatementKind::Assign {
                path,
                value,
                conditional,
            } => {
                let current = ctx.get_element(path)?;
                let absent = current.as_ref().map_or(true, Element::is_undef);
                if *conditional && !absent {
                    return Ok(());
                }
                debug!(path = %path, "assign");
                let result = with_self(ctx, current.unwrap_or_default(), |ctx| value.execute(ctx))?;
                ctx.put_element(path, result)
            }
            StatementKind::Variable {
                name,
                value,
                conditional,
                is_final,
            } => {
                let current = ctx.global(name).map(|global| global.value.clone());
                if *conditional && current.as_ref().is_some_and(|v| !v.is_undef()) {
                    return Ok(());
                }
                debug!(name, "variable");
                let result = with_self(ctx, current.unwrap_or_default(), |ctx| value.execute(ctx))?;
                ctx.set_global(name, result, *is_final)
            }
            StatementKind::Type { name, full_type } => {
                ctx.register_type(name, Arc::clone(full_type))
            }
            StatementKind::Bind { path, full_type } => {
                full_type.base().check_subtypes(ctx.types())?;
                debug!(path = %path, full_type = %full_type, "bind");
                ctx.bind(path, Arc::clone(full_type))
            }
            StatementKind::Prefix(path) => ctx.set_prefix(path.clone()),
            StatementKind::Dml(op) => {
                let previous = ctx.swap_self_to_root();
                ctx.push_scope();
                let result = op.execute(ctx);
                ctx.pop_scope();
                ctx.restore_self(previous);
                result.map(drop)
            }
        }
    }
}

/// Evaluate `f` in a fresh local scope with SELF set to `value`.
fn with_self(
    ctx: &mut Context,
    value: Element,
    f: impl FnOnce(&mut Context) -> EvalResult<Element>,
) -> EvalResult<Element> {
    let previous = ctx.swap_self(value, false);
    ctx.push_scope();
    let result = f(ctx);
    ctx.pop_scope();
    ctx.restore_self(previous);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pan_eval::Primitive;

    fn r() -> SourceRange {
        SourceRange::point(1, 1)
    }

    fn path(text: &str) -> Path {
        Path::parse(text).unwrap()
    }

    fn lit(value: impl Into<Element>) -> Operation {
        Operation::literal(value, r())
    }

    fn context() -> Context {
        Context::for_object("node")
    }

    #[test]
    fn assign_sees_current_value_as_self() {
        let mut ctx = context();
        Statement::assign(path("/a"), lit(1i64), r()).execute(&mut ctx).unwrap();
        let increment = Operation::binary(
            pan_eval::BinaryOp::Add,
            Operation::variable("SELF", vec![], r()),
            lit(1i64),
            r(),
        );
        Statement::assign(path("/a"), increment, r()).execute(&mut ctx).unwrap();
        assert_eq!(ctx.get_element(&path("/a")).unwrap(), Some(Element::Long(2)));
    }

    #[test]
    fn conditional_assign_keeps_existing_value() {
        let mut ctx = context();
        Statement::assign_default(path("/a"), lit("x"), r()).execute(&mut ctx).unwrap();
        Statement::assign_default(path("/a"), lit("y"), r()).execute(&mut ctx).unwrap();
        assert_eq!(ctx.get_element(&path("/a")).unwrap(), Some(Element::from("x")));
    }

    #[test]
    fn replacement_type_is_checked() {
        let mut ctx = context();
        Statement::assign(path("/a"), lit(1i64), r()).execute(&mut ctx).unwrap();
        let err = Statement::assign(path("/a"), lit("text"), r())
            .execute(&mut ctx)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_REPLACEMENT);
        assert_eq!(err.range, Some(r()));
    }

    #[test]
    fn prefix_resolves_relative_paths() {
        let mut ctx = context();
        Statement::prefix(path("/system/network"), r()).execute(&mut ctx).unwrap();
        Statement::assign(path("hostname"), lit("h1"), r()).execute(&mut ctx).unwrap();
        assert_eq!(
            ctx.get_element(&path("/system/network/hostname")).unwrap(),
            Some(Element::from("h1"))
        );
    }

    #[test]
    fn final_variables() {
        let mut ctx = context();
        Statement::variable("v", lit(1i64), true, r()).execute(&mut ctx).unwrap();
        let err = Statement::variable("v", lit(2i64), false, r())
            .execute(&mut ctx)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::FINAL_VARIABLE);

        Statement::variable_default("w", lit(1i64), r()).execute(&mut ctx).unwrap();
        Statement::variable_default("w", lit(2i64), r()).execute(&mut ctx).unwrap();
        assert_eq!(ctx.global("w").map(|g| g.value.clone()), Some(Element::Long(1)));
    }

    #[test]
    fn bind_requires_absolute_path_and_known_type() {
        let err = Statement::bind_name(path("a/b"), "long", r()).unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PATH);

        let mut ctx = context();
        let err = Statement::bind_name(path("/a"), "missing", r())
            .unwrap()
            .execute(&mut ctx)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UNKNOWN_TYPE);

        Statement::type_def("port", FullType::new(BaseType::primitive(Primitive::Long)), r())
            .execute(&mut ctx)
            .unwrap();
        Statement::bind_name(path("/a"), "port", r())
            .unwrap()
            .execute(&mut ctx)
            .unwrap();
        assert_eq!(ctx.bindings().len(), 1);
    }

    #[test]
    fn dml_replaces_the_tree() {
        let mut ctx = context();
        let op = Operation::assign("SELF", vec![], Operation::function("nlist", vec![], r()).unwrap(), r());
        Statement::dml(op).execute(&mut ctx).unwrap();
        assert!(ctx.root().as_hash().is_some_and(|h| h.is_empty()));
    }

    #[test]
    fn dml_can_read_the_tree_by_path() {
        let mut ctx = context();
        Statement::assign(path("/a"), lit(1i64), r()).execute(&mut ctx).unwrap();

        let exists = |p: &str| Operation::function("exists", vec![lit(p)], r()).unwrap();
        let op = Operation::block(
            vec![
                Operation::assign("SELF", vec![lit("b")], lit(2i64), r()),
                Operation::if_else(
                    Operation::binary(pan_eval::BinaryOp::And, exists("/a"), exists("/b"), r()),
                    lit(true),
                    Some(Operation::function("error", vec![lit("tree not visible")], r()).unwrap()),
                    r(),
                ),
            ],
            r(),
        );
        Statement::dml(op).execute(&mut ctx).unwrap();
        assert_eq!(ctx.get_element(&path("/b")).unwrap(), Some(Element::Long(2)));
        assert_eq!(ctx.get_element(&path("/a")).unwrap(), Some(Element::Long(1)));
    }
}
