//! pan DML engine.
//!
//! Executes compiled DML operation trees against a per-object
//! [`Context`], producing [`Element`] values. The crate holds three parts
//! that only make sense together:
//!
//! - the element model ([`Element`], [`ListResource`], [`HashResource`])
//!   with copy-on-write protection of shared containers,
//! - the operation graph and built-in functions ([`Operation`], [`BuiltIn`]),
//! - the type layer ([`FullType`], [`TypeMap`]) used to fill defaults and
//!   validate finished trees.

pub mod context;
pub mod element;
pub mod error;
pub mod functions;
pub mod operation;
pub mod operators;
pub mod options;
pub mod types;

pub use context::{Binding, Context, ContextMode, GlobalVariable, SelfHolder};
pub use element::{Element, HashResource, ListResource};
pub use error::{ElementError, EvalResult};
pub use functions::BuiltIn;
pub use operation::{OpKind, Operation};
pub use operators::{BinaryOp, UnaryOp};
pub use options::{DebugFilter, EvalConfig, EvalOptions, DEFAULT_MAX_ITERATIONS};
pub use types::{BaseType, ChoiceType, DefaultValue, FullType, Primitive, RecordField, TypeMap};
