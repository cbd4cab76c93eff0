//! The fixed set of built-in functions.
//!
//! Each call is checked for arity and argument shape when it is
//! constructed. At run time operands are evaluated left to right and the
//! function body works on the resulting values; a few built-ins
//! (`append`, `prepend`, `exists`, `is_valid`) need the unevaluated
//! operands because they act on a variable rather than its value.

mod coerce;
mod convert;
mod diagnostics;
mod encoding;
mod format;
mod inspect;
mod resource;
mod string;
mod types;

pub use coerce::{decode_long, round_half_up};

use crate::context::Context;
use crate::element::Element;
use crate::error::EvalResult;
use crate::operation::{OpKind, Operation};
use crate::operators::ListVariable;
use coerce::Args;
use pan_types::{ErrorCode, PanError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltIn {
    // constructors
    List,
    Dict,
    // list mutation
    Append,
    Prepend,
    Merge,
    Splice,
    // inspection
    Length,
    Exists,
    IsDefined,
    IsNull,
    IsBoolean,
    IsLong,
    IsDouble,
    IsNumber,
    IsString,
    IsList,
    IsDict,
    IsResource,
    IsProperty,
    IsValid,
    // conversion
    ToLong,
    ToDouble,
    ToBoolean,
    ToString,
    // strings
    ToUppercase,
    ToLowercase,
    Substr,
    Index,
    Replace,
    Match,
    Matches,
    Split,
    Join,
    Format,
    // encoding
    Base64Encode,
    Base64Decode,
    Digest,
    // diagnostics
    Error,
    Debug,
    Traceback,
}

/// Accepted argument counts.
#[derive(Debug, Clone, Copy)]
enum Arity {
    Exactly(usize),
    Between(usize, usize),
    AtLeast(usize),
    Even,
}

impl Arity {
    fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Exactly(k) => n == k,
            Arity::Between(lo, hi) => (lo..=hi).contains(&n),
            Arity::AtLeast(lo) => n >= lo,
            Arity::Even => n % 2 == 0,
        }
    }

    fn describe(self) -> String {
        match self {
            Arity::Exactly(1) => "exactly 1 argument".to_string(),
            Arity::Exactly(k) => format!("exactly {k} arguments"),
            Arity::Between(lo, hi) => format!("{lo} to {hi} arguments"),
            Arity::AtLeast(1) => "at least 1 argument".to_string(),
            Arity::AtLeast(lo) => format!("at least {lo} arguments"),
            Arity::Even => "an even number of arguments".to_string(),
        }
    }
}

impl BuiltIn {
    pub fn from_name(name: &str) -> Option<Self> {
        use BuiltIn::*;
        let function = match name {
            "list" => List,
            "nlist" | "dict" => Dict,
            "append" => Append,
            "prepend" => Prepend,
            "merge" => Merge,
            "splice" => Splice,
            "length" => Length,
            "exists" => Exists,
            "is_defined" => IsDefined,
            "is_null" => IsNull,
            "is_boolean" => IsBoolean,
            "is_long" => IsLong,
            "is_double" => IsDouble,
            "is_number" => IsNumber,
            "is_string" => IsString,
            "is_list" => IsList,
            "is_nlist" | "is_dict" => IsDict,
            "is_resource" => IsResource,
            "is_property" => IsProperty,
            "is_valid" => IsValid,
            "to_long" => ToLong,
            "to_double" => ToDouble,
            "to_boolean" => ToBoolean,
            "to_string" => ToString,
            "to_uppercase" => ToUppercase,
            "to_lowercase" => ToLowercase,
            "substr" => Substr,
            "index" => Index,
            "replace" => Replace,
            "match" => Match,
            "matches" => Matches,
            "split" => Split,
            "join" => Join,
            "format" => Format,
            "base64_encode" => Base64Encode,
            "base64_decode" => Base64Decode,
            "digest" => Digest,
            "error" => Error,
            "debug" => Debug,
            "traceback" => Traceback,
            _ => return None,
        };
        Some(function)
    }

    pub fn name(self) -> &'static str {
        use BuiltIn::*;
        match self {
            List => "list",
            Dict => "dict",
            Append => "append",
            Prepend => "prepend",
            Merge => "merge",
            Splice => "splice",
            Length => "length",
            Exists => "exists",
            IsDefined => "is_defined",
            IsNull => "is_null",
            IsBoolean => "is_boolean",
            IsLong => "is_long",
            IsDouble => "is_double",
            IsNumber => "is_number",
            IsString => "is_string",
            IsList => "is_list",
            IsDict => "is_dict",
            IsResource => "is_resource",
            IsProperty => "is_property",
            IsValid => "is_valid",
            ToLong => "to_long",
            ToDouble => "to_double",
            ToBoolean => "to_boolean",
            ToString => "to_string",
            ToUppercase => "to_uppercase",
            ToLowercase => "to_lowercase",
            Substr => "substr",
            Index => "index",
            Replace => "replace",
            Match => "match",
            Matches => "matches",
            Split => "split",
            Join => "join",
            Format => "format",
            Base64Encode => "base64_encode",
            Base64Decode => "base64_decode",
            Digest => "digest",
            Error => "error",
            Debug => "debug",
            Traceback => "traceback",
        }
    }

    fn arity(self) -> Arity {
        use BuiltIn::*;
        match self {
            List => Arity::AtLeast(0),
            Dict => Arity::Even,
            Append | Prepend => Arity::Between(1, 2),
            Merge => Arity::AtLeast(1),
            Splice => Arity::Between(3, 4),
            Length | Exists | IsDefined | IsNull | IsBoolean | IsLong | IsDouble | IsNumber
            | IsString | IsList | IsDict | IsResource | IsProperty => Arity::Exactly(1),
            IsValid => Arity::Exactly(2),
            ToLong => Arity::Between(1, 2),
            ToDouble | ToBoolean | ToString | ToUppercase | ToLowercase => Arity::Exactly(1),
            Substr => Arity::Between(2, 3),
            Index => Arity::Between(2, 3),
            Replace => Arity::Exactly(3),
            Match | Matches => Arity::Exactly(2),
            Split => Arity::Between(2, 3),
            Join => Arity::AtLeast(1),
            Format => Arity::AtLeast(1),
            Base64Encode | Base64Decode => Arity::Exactly(1),
            Digest => Arity::Exactly(2),
            Error | Debug => Arity::AtLeast(1),
            Traceback => Arity::Exactly(1),
        }
    }

    /// Whether a call with literal arguments may be evaluated at construction.
    pub fn is_foldable(self) -> bool {
        use BuiltIn::*;
        !matches!(
            self,
            Append | Prepend | Exists | IsValid | Error | Debug | Traceback
        )
    }

    fn syntax_error(self, message: impl std::fmt::Display) -> PanError {
        PanError::new(
            ErrorCode::INVALID_ARGUMENT,
            format!("{}(): {message}", self.name()),
        )
    }

    /// Check arity and operand shape, rewriting operands where the call
    /// acts on a variable rather than on its value.
    pub fn check_args(self, mut args: Vec<Operation>) -> EvalResult<Vec<Operation>> {
        use BuiltIn::*;

        let arity = self.arity();
        if !arity.accepts(args.len()) {
            return Err(PanError::new(
                ErrorCode::INVALID_ARGUMENT_COUNT,
                format!(
                    "{}() requires {}, got {}",
                    self.name(),
                    arity.describe(),
                    args.len()
                ),
            ));
        }

        match self {
            Append | Prepend if args.len() == 2 => {
                if let OpKind::Variable(variable) = &args[0].kind {
                    let range = args[0].range;
                    args[0] = Operation {
                        kind: OpKind::ListVariable(ListVariable::from_variable(variable)),
                        range,
                    };
                }
            }
            Exists | IsDefined | IsNull => {
                if let OpKind::Variable(variable) = &args[0].kind {
                    args[0].kind = OpKind::Variable(variable.clone().into_lookup());
                }
            }
            IsValid => {
                if !matches!(args[0].kind, OpKind::Variable(_)) {
                    return Err(self.syntax_error("first argument must be a type name"));
                }
            }
            Debug | Traceback | Error | Format => {
                if let Some(first) = args[0].as_literal() {
                    if first.as_str().is_none() {
                        return Err(self.syntax_error("first argument must be a string"));
                    }
                }
            }
            _ => {}
        }
        Ok(args)
    }

    /// Evaluate the call.
    pub fn call(self, ctx: &mut Context, ops: &[Operation]) -> EvalResult<Element> {
        use BuiltIn::*;

        match self {
            Append => return resource::append(ctx, self, ops, false),
            Prepend => return resource::append(ctx, self, ops, true),
            Exists => return inspect::exists(ctx, ops),
            IsValid => return types::is_valid(ctx, ops),
            Traceback => return Ok(Element::Undef),
            _ => {}
        }

        let values = ops
            .iter()
            .map(|op| op.execute(ctx))
            .collect::<EvalResult<Vec<_>>>()?;
        let args = Args::new(self, &values);

        match self {
            List => Ok(resource::list(&args)),
            Dict => resource::dict(&args),
            Merge => resource::merge(&args),
            Splice => resource::splice(&args),
            Length => resource::length(&args),

            IsDefined => Ok(Element::Boolean(!matches!(
                args.get(0)?,
                Element::Undef | Element::Null
            ))),
            IsNull => Ok(Element::Boolean(args.get(0)?.is_null())),
            IsBoolean | IsLong | IsDouble | IsNumber | IsString | IsList | IsDict
            | IsResource | IsProperty => inspect::is_type(self, args.get(0)?),

            ToLong => convert::to_long(&args),
            ToDouble => convert::to_double(&args),
            ToBoolean => convert::to_boolean(&args),
            ToString => Ok(Element::String(format!("{}", args.get(0)?))),

            ToUppercase => string::to_uppercase(&args),
            ToLowercase => string::to_lowercase(&args),
            Substr => string::substr(&args),
            Index => string::index(&args),
            Replace => string::replace(&args),
            Match => string::match_regex(&args),
            Matches => string::matches(&args),
            Split => string::split(&args),
            Join => string::join(&args),
            Format => format::format(&args, 0).map(Element::String),

            Base64Encode => encoding::base64_encode(&args),
            Base64Decode => encoding::base64_decode(&args),
            Digest => encoding::digest(&args),

            Error => diagnostics::error(ctx, &args),
            Debug => diagnostics::debug(ctx, &args),

            Append | Prepend | Exists | IsValid | Traceback => Err(PanError::internal(format!(
                "{}() reached the value dispatcher",
                self.name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for name in ["list", "dict", "append", "is_valid", "to_long", "split", "digest"] {
            assert_eq!(BuiltIn::from_name(name).map(BuiltIn::name), Some(name));
        }
        assert_eq!(BuiltIn::from_name("nlist"), Some(BuiltIn::Dict));
        assert_eq!(BuiltIn::from_name("is_nlist"), Some(BuiltIn::IsDict));
        assert_eq!(BuiltIn::from_name("nope"), None);
    }

    #[test]
    fn arity_descriptions() {
        assert!(Arity::Even.accepts(0));
        assert!(!Arity::Even.accepts(3));
        assert_eq!(Arity::Between(2, 3).describe(), "2 to 3 arguments");
    }
}
