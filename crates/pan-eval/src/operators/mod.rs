//! Non-function operators: variable access, assignment, arithmetic and control flow.

pub mod arithmetic;
mod assign;
pub mod control;
mod variable;

pub use arithmetic::{BinaryOp, UnaryOp};
pub use assign::{Assign, AssignTarget};
pub use variable::{Identifier, ListVariable, Variable};
