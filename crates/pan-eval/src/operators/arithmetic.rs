//! Unary, arithmetic, comparison and logical operators.

use crate::context::Context;
use crate::element::Element;
use crate::error::EvalResult;
use crate::operation::Operation;
use pan_types::{ErrorCode, PanError};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        })
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        })
    }
}

fn mismatch(op: impl fmt::Display, operands: &[&Element]) -> PanError {
    let types: Vec<&str> = operands.iter().map(|e| e.type_name()).collect();
    PanError::new(
        ErrorCode::ARGUMENT_TYPE_MISMATCH,
        format!("invalid operand types for '{op}': {}", types.join(", ")),
    )
}

fn arithmetic(message: &str) -> PanError {
    PanError::new(ErrorCode::ARITHMETIC, message)
}

pub fn eval_unary(op: UnaryOp, value: &Element) -> EvalResult<Element> {
    match (op, value) {
        (UnaryOp::Neg, Element::Long(n)) => n
            .checked_neg()
            .map(Element::Long)
            .ok_or_else(|| arithmetic("long overflow in negation")),
        (UnaryOp::Neg, Element::Double(x)) => Ok(Element::Double(-x)),
        (UnaryOp::Not, Element::Boolean(b)) => Ok(Element::Boolean(!b)),
        (op, value) => Err(mismatch(op, &[value])),
    }
}

/// Evaluate a binary operator; `&&` and `||` short-circuit.
pub fn eval_binary(
    ctx: &mut Context,
    op: BinaryOp,
    left: &Operation,
    right: &Operation,
) -> EvalResult<Element> {
    let lhs = left.execute(ctx)?;

    if matches!(op, BinaryOp::And | BinaryOp::Or) {
        let a = lhs.as_bool().ok_or_else(|| mismatch(op, &[&lhs]))?;
        if (op == BinaryOp::And && !a) || (op == BinaryOp::Or && a) {
            return Ok(Element::Boolean(a));
        }
        let rhs = right.execute(ctx)?;
        return rhs
            .as_bool()
            .map(Element::Boolean)
            .ok_or_else(|| mismatch(op, &[&lhs, &rhs]));
    }

    let rhs = right.execute(ctx)?;
    apply(op, &lhs, &rhs)
}

fn apply(op: BinaryOp, lhs: &Element, rhs: &Element) -> EvalResult<Element> {
    use Element::{Double, Long};

    match op {
        BinaryOp::Add => match (lhs, rhs) {
            (Long(a), Long(b)) => a
                .checked_add(*b)
                .map(Long)
                .ok_or_else(|| arithmetic("long overflow in addition")),
            (Element::String(a), Element::String(b)) => Ok(Element::String(format!("{a}{b}"))),
            _ => doubles(op, lhs, rhs).map(|(a, b)| Double(a + b)),
        },
        BinaryOp::Sub => match (lhs, rhs) {
            (Long(a), Long(b)) => a
                .checked_sub(*b)
                .map(Long)
                .ok_or_else(|| arithmetic("long overflow in subtraction")),
            _ => doubles(op, lhs, rhs).map(|(a, b)| Double(a - b)),
        },
        BinaryOp::Mul => match (lhs, rhs) {
            (Long(a), Long(b)) => a
                .checked_mul(*b)
                .map(Long)
                .ok_or_else(|| arithmetic("long overflow in multiplication")),
            _ => doubles(op, lhs, rhs).map(|(a, b)| Double(a * b)),
        },
        BinaryOp::Div => match (lhs, rhs) {
            (Long(_), Long(0)) => Err(arithmetic("division by zero")),
            (Long(a), Long(b)) => a
                .checked_div(*b)
                .map(Long)
                .ok_or_else(|| arithmetic("long overflow in division")),
            _ => {
                let (a, b) = doubles(op, lhs, rhs)?;
                if b == 0.0 {
                    Err(arithmetic("division by zero"))
                } else {
                    Ok(Double(a / b))
                }
            }
        },
        BinaryOp::Mod => match (lhs, rhs) {
            (Long(_), Long(0)) => Err(arithmetic("division by zero")),
            (Long(a), Long(b)) => Ok(Long(a.wrapping_rem(*b))),
            _ => Err(mismatch(op, &[lhs, rhs])),
        },
        BinaryOp::Eq | BinaryOp::Ne => {
            let equal = match (lhs, rhs) {
                (Element::Boolean(a), Element::Boolean(b)) => a == b,
                _ => compare(op, lhs, rhs)? == Ordering::Equal,
            };
            Ok(Element::Boolean(equal == (op == BinaryOp::Eq)))
        }
        BinaryOp::Lt => compare(op, lhs, rhs).map(|o| Element::Boolean(o.is_lt())),
        BinaryOp::Le => compare(op, lhs, rhs).map(|o| Element::Boolean(o.is_le())),
        BinaryOp::Gt => compare(op, lhs, rhs).map(|o| Element::Boolean(o.is_gt())),
        BinaryOp::Ge => compare(op, lhs, rhs).map(|o| Element::Boolean(o.is_ge())),
        BinaryOp::And | BinaryOp::Or => match (lhs, rhs) {
            (Element::Boolean(a), Element::Boolean(b)) => Ok(Element::Boolean(
                if op == BinaryOp::And { *a && *b } else { *a || *b },
            )),
            _ => Err(mismatch(op, &[lhs, rhs])),
        },
    }
}

fn doubles(op: BinaryOp, lhs: &Element, rhs: &Element) -> EvalResult<(f64, f64)> {
    match (lhs.as_number(), rhs.as_number()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(mismatch(op, &[lhs, rhs])),
    }
}

/// Numbers compare numerically, strings lexicographically.
fn compare(op: BinaryOp, lhs: &Element, rhs: &Element) -> EvalResult<Ordering> {
    match (lhs, rhs) {
        (Element::Long(a), Element::Long(b)) => Ok(a.cmp(b)),
        (Element::String(a), Element::String(b)) => Ok(a.cmp(b)),
        _ => {
            let (a, b) = doubles(op, lhs, rhs)?;
            a.partial_cmp(&b)
                .ok_or_else(|| arithmetic("comparison with NaN"))
        }
    }
}
