//! pan compiler: turns object templates into validated profiles.
//!
//! ```text
//! ObjectTemplate → build (statements → tree) → validate (defaults, types) → Profile
//! ```
//!
//! Each object is compiled against its own [`pan_eval::Context`];
//! [`Compiler::compile_all`] runs independent objects in parallel.

pub mod build;
pub mod compiler;
pub mod error;
pub mod options;
pub mod profile;
pub mod statement;
pub mod template;
pub mod validate;

pub use build::{build, BuildResult};
pub use compiler::{compile_object, CompileReport, Compiler};
pub use error::{CompilerError, CompilerResult};
pub use options::CompilerOptions;
pub use profile::Profile;
pub use statement::{Statement, StatementKind};
pub use template::ObjectTemplate;
pub use validate::validate;
