//! The DML operation graph.
//!
//! An [`Operation`] is an already-parsed expression node with the source
//! range it came from. Constructors validate arity and shape and fold
//! constant sub-trees; [`Operation::execute`] evaluates a node against a
//! [`Context`].

use crate::context::Context;
use crate::element::Element;
use crate::error::EvalResult;
use crate::functions::BuiltIn;
use crate::operators::{
    arithmetic, control, Assign, AssignTarget, BinaryOp, Identifier, ListVariable, UnaryOp,
    Variable,
};
use pan_types::{ErrorCode, PanError, SourceRange, Term};

/// A DML expression node.
#[derive(Debug, Clone)]
pub struct Operation {
    pub kind: OpKind,
    pub range: SourceRange,
}

#[derive(Debug, Clone)]
pub enum OpKind {
    Literal(Element),
    Variable(Variable),
    ListVariable(ListVariable),
    Assign(Assign),
    Unary {
        op: UnaryOp,
        operand: Box<Operation>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Operation>,
        right: Box<Operation>,
    },
    If {
        condition: Box<Operation>,
        then_branch: Box<Operation>,
        else_branch: Option<Box<Operation>>,
    },
    While {
        condition: Box<Operation>,
        body: Box<Operation>,
    },
    Foreach {
        key: String,
        value: String,
        resource: Box<Operation>,
        body: Box<Operation>,
    },
    Block(Vec<Operation>),
    Function {
        function: BuiltIn,
        args: Vec<Operation>,
    },
}

impl Operation {
    fn new(kind: OpKind, range: SourceRange) -> Self {
        Self { kind, range }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Constructors
    // ══════════════════════════════════════════════════════════════════════

    pub fn literal(value: impl Into<Element>, range: SourceRange) -> Self {
        Self::new(OpKind::Literal(value.into()), range)
    }

    /// Read a variable, failing if it is undefined.
    pub fn variable(name: &str, terms: Vec<Operation>, range: SourceRange) -> Self {
        Self::new(
            OpKind::Variable(Variable::new(Identifier::from_name(name), terms, false)),
            range,
        )
    }

    /// Read a variable, yielding `undef` if it or any child is missing.
    pub fn lookup(name: &str, terms: Vec<Operation>, range: SourceRange) -> Self {
        Self::new(
            OpKind::Variable(Variable::new(Identifier::from_name(name), terms, true)),
            range,
        )
    }

    /// A writable list reference used by list-mutating built-ins.
    pub fn list_variable(name: &str, terms: Vec<Operation>, range: SourceRange) -> Self {
        Self::new(
            OpKind::ListVariable(ListVariable::new(Identifier::from_name(name), terms)),
            range,
        )
    }

    /// `name[terms...] = value`; `SELF` targets the current configuration node.
    pub fn assign(
        name: &str,
        terms: Vec<Operation>,
        value: Operation,
        range: SourceRange,
    ) -> Self {
        let target = match Identifier::from_name(name) {
            Identifier::SelfRef => AssignTarget::SetSelf { terms },
            Identifier::Named(name) => AssignTarget::SetValue { name, terms },
        };
        Self::new(
            OpKind::Assign(Assign {
                target,
                value: Box::new(value),
            }),
            range,
        )
    }

    pub fn unary(op: UnaryOp, operand: Operation, range: SourceRange) -> EvalResult<Self> {
        if let OpKind::Literal(value) = &operand.kind {
            return arithmetic::eval_unary(op, value)
                .map(|folded| Self::literal(folded, range))
                .map_err(|e| {
                    PanError::new(ErrorCode::INVALID_ARGUMENT, e.message).at(range)
                });
        }
        Ok(Self::new(
            OpKind::Unary {
                op,
                operand: Box::new(operand),
            },
            range,
        ))
    }

    pub fn binary(op: BinaryOp, left: Operation, right: Operation, range: SourceRange) -> Self {
        Self::new(
            OpKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            range,
        )
        .fold()
    }

    pub fn if_else(
        condition: Operation,
        then_branch: Operation,
        else_branch: Option<Operation>,
        range: SourceRange,
    ) -> Self {
        Self::new(
            OpKind::If {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: else_branch.map(Box::new),
            },
            range,
        )
    }

    pub fn while_loop(condition: Operation, body: Operation, range: SourceRange) -> Self {
        Self::new(
            OpKind::While {
                condition: Box::new(condition),
                body: Box::new(body),
            },
            range,
        )
    }

    pub fn foreach(
        key: &str,
        value: &str,
        resource: Operation,
        body: Operation,
        range: SourceRange,
    ) -> Self {
        Self::new(
            OpKind::Foreach {
                key: key.to_string(),
                value: value.to_string(),
                resource: Box::new(resource),
                body: Box::new(body),
            },
            range,
        )
    }

    pub fn block(ops: Vec<Operation>, range: SourceRange) -> Self {
        Self::new(OpKind::Block(ops), range)
    }

    /// A built-in call. Unknown names and malformed argument lists are
    /// syntax errors; pure calls with literal arguments are folded.
    pub fn function(name: &str, args: Vec<Operation>, range: SourceRange) -> EvalResult<Self> {
        let function = BuiltIn::from_name(name).ok_or_else(|| {
            PanError::new(
                ErrorCode::UNKNOWN_FUNCTION,
                format!("unknown function '{name}'"),
            )
            .at(range)
        })?;
        let args = function.check_args(args).map_err(|e| e.at(range))?;

        if function == BuiltIn::Traceback {
            return Ok(Self::literal(Element::Undef, range));
        }

        Ok(Self::new(OpKind::Function { function, args }, range).fold())
    }

    // ══════════════════════════════════════════════════════════════════════
    // Constant folding
    // ══════════════════════════════════════════════════════════════════════

    pub fn is_literal(&self) -> bool {
        matches!(self.kind, OpKind::Literal(_))
    }

    pub fn as_literal(&self) -> Option<&Element> {
        match &self.kind {
            OpKind::Literal(value) => Some(value),
            _ => None,
        }
    }

    /// Replace a node whose operands are all literals by its value.
    /// A node that fails to evaluate is kept so the error surfaces at run time.
    fn fold(self) -> Self {
        let foldable = match &self.kind {
            OpKind::Binary { left, right, .. } => left.is_literal() && right.is_literal(),
            OpKind::Function { function, args } => {
                function.is_foldable() && args.iter().all(Operation::is_literal)
            }
            _ => false,
        };
        if !foldable {
            return self;
        }
        let mut ctx = Context::compile_time();
        match self.execute(&mut ctx) {
            Ok(value) => Self::literal(value, self.range),
            Err(_) => self,
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Execution
    // ══════════════════════════════════════════════════════════════════════

    pub fn execute(&self, ctx: &mut Context) -> EvalResult<Element> {
        let result = match &self.kind {
            OpKind::Literal(value) => Ok(value.clone()),
            OpKind::Variable(variable) => variable.execute(ctx),
            OpKind::ListVariable(variable) => variable.execute(ctx),
            OpKind::Assign(assign) => assign.execute(ctx),
            OpKind::Unary { op, operand } => {
                let value = operand.execute(ctx)?;
                arithmetic::eval_unary(*op, &value)
            }
            OpKind::Binary { op, left, right } => arithmetic::eval_binary(ctx, *op, left, right),
            OpKind::If {
                condition,
                then_branch,
                else_branch,
            } => control::eval_if(ctx, condition, then_branch, else_branch.as_deref()),
            OpKind::While { condition, body } => control::eval_while(ctx, condition, body),
            OpKind::Foreach {
                key,
                value,
                resource,
                body,
            } => control::eval_foreach(ctx, key, value, resource, body),
            OpKind::Block(ops) => control::eval_block(ctx, ops),
            OpKind::Function { function, args } => function.call(ctx, args),
        };
        result.map_err(|e| e.at(self.range))
    }
}

/// Evaluate term-producing operations into path terms.
///
/// Longs become indexes, strings become keys (or indexes when they are all
/// digits); any other value is an invalid term.
pub(crate) fn evaluate_terms(ctx: &mut Context, ops: &[Operation]) -> EvalResult<Vec<Term>> {
    ops.iter()
        .map(|op| {
            let value = op.execute(ctx)?;
            let term = match &value {
                Element::Long(n) => Term::from_long(*n),
                Element::String(s) => Term::parse(s),
                other => {
                    return Err(PanError::new(
                        ErrorCode::INVALID_TERM,
                        format!("a {} value cannot be used as a path term", other.type_name()),
                    )
                    .at(op.range))
                }
            };
            term.map_err(|e| PanError::new(ErrorCode::INVALID_TERM, e.to_string()).at(op.range))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r() -> SourceRange {
        SourceRange::point(1, 1)
    }

    #[test]
    fn unary_minus_folds_literals() {
        let op = Operation::unary(UnaryOp::Neg, Operation::literal(3_i64, r()), r()).unwrap();
        assert_eq!(op.as_literal(), Some(&Element::Long(-3)));

        let err = Operation::unary(UnaryOp::Neg, Operation::literal("x", r()), r()).unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_ARGUMENT);
    }

    #[test]
    fn binary_folds_and_keeps_failures() {
        let sum = Operation::binary(
            BinaryOp::Add,
            Operation::literal(2_i64, r()),
            Operation::literal(3_i64, r()),
            r(),
        );
        assert_eq!(sum.as_literal(), Some(&Element::Long(5)));

        let div = Operation::binary(
            BinaryOp::Div,
            Operation::literal(1_i64, r()),
            Operation::literal(0_i64, r()),
            r(),
        );
        assert!(!div.is_literal());
        let err = div.execute(&mut Context::for_object("node01")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ARITHMETIC);
    }

    #[test]
    fn traceback_is_suppressed() {
        let op = Operation::function("traceback", vec![Operation::literal("here", r())], r()).unwrap();
        assert_eq!(op.as_literal(), Some(&Element::Undef));
    }

    #[test]
    fn unknown_function() {
        let err = Operation::function("frobnicate", vec![], r()).unwrap_err();
        assert_eq!(err.code, ErrorCode::UNKNOWN_FUNCTION);
        assert_eq!(err.range, Some(r()));
    }

    #[test]
    fn invalid_terms() {
        let mut ctx = Context::compile_time();
        let err = evaluate_terms(&mut ctx, &[Operation::literal(-1_i64, r())]).unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_TERM);
        let terms = evaluate_terms(
            &mut ctx,
            &[Operation::literal("7", r()), Operation::literal("a", r())],
        )
        .unwrap();
        assert_eq!(terms, vec![Term::Index(7), Term::Key("a".into())]);
    }
}
