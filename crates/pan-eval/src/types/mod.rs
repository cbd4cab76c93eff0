//! The type layer.
//!
//! A [`FullType`] pairs a structural [`BaseType`] with an optional default
//! and an optional validation expression. Named types live in a
//! [`TypeMap`]; validation walks a value against a type, and
//! [`FullType::set_defaults`] fills missing values before validation runs.

mod base_type;
mod choice;
mod full_type;
mod type_map;

pub use base_type::{BaseType, Primitive, RecordField};
pub use choice::ChoiceType;
pub use full_type::{DefaultValue, FullType};
pub use type_map::TypeMap;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::element::{Element, HashResource};
    use crate::operation::Operation;
    use crate::operators::BinaryOp;
    use pan_types::{ErrorCategory, ErrorCode, Path, Range, SourceRange, Term};

    fn r() -> SourceRange {
        SourceRange::point(1, 1)
    }

    fn long_type(min: i64, max: i64) -> FullType {
        FullType::new(
            BaseType::primitive(Primitive::Long).with_range(Range::between(min, max).unwrap()),
        )
    }

    #[test]
    fn choice_default_then_validate() {
        let mut ctx = Context::for_object("node");
        let choice = FullType::new(BaseType::Choice(ChoiceType::new(["a", "b"])))
            .with_default(Operation::literal("a", r()));
        let path = Path::root().child(Term::Key("mode".into()));

        let filled = choice.set_defaults(&mut ctx, &path, Some(&Element::Undef)).unwrap();
        let value = filled.unwrap();
        assert_eq!(value, Element::from("a"));
        choice.validate(&mut ctx, &path, &value).unwrap();

        let err = choice.validate(&mut ctx, &path, &Element::from("c")).unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_CHOICE);
        assert_eq!(err.path.as_deref(), Some("/mode"));
    }

    #[test]
    fn choice_requires_a_string() {
        let mut ctx = Context::for_object("node");
        let choice = FullType::new(BaseType::Choice(ChoiceType::new(["1"])));
        let err = choice.validate(&mut ctx, &Path::root(), &Element::Long(1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::TYPE_MISMATCH);
    }

    #[test]
    fn range_on_long() {
        let mut ctx = Context::for_object("node");
        let path = Path::root().child(Term::Key("alpha".into()));
        long_type(0, 10).validate(&mut ctx, &path, &Element::Long(5)).unwrap();
        let err = long_type(6, 10)
            .validate(&mut ctx, &path, &Element::Long(5))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RANGE_MISMATCH);
        assert_eq!(err.category, ErrorCategory::Validation);
        assert_eq!(err.path.as_deref(), Some("/alpha"));
    }

    #[test]
    fn record_fields() {
        let mut ctx = Context::for_object("node");
        let record = FullType::new(BaseType::record(
            vec![
                RecordField::required("name", BaseType::primitive(Primitive::String).into()),
                RecordField::optional(
                    "port",
                    FullType::new(BaseType::primitive(Primitive::Long))
                        .with_default(Operation::literal(22i64, r())),
                ),
            ],
            false,
        ));

        let mut hash = HashResource::new();
        hash.insert("name", Element::from("ssh"));
        let value = Element::Hash(hash);

        let filled = record
            .set_defaults(&mut ctx, &Path::root(), Some(&value))
            .unwrap()
            .unwrap();
        assert_eq!(filled.as_hash().unwrap().get("port"), Some(&Element::Long(22)));
        record.validate(&mut ctx, &Path::root(), &filled).unwrap();

        let err = record
            .validate(&mut ctx, &Path::root(), &Element::Hash(HashResource::new()))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MISSING_REQUIRED_FIELD);

        let mut extra = filled.as_hash().unwrap().writable_copy();
        extra.insert("colour", Element::from("red"));
        let err = record
            .validate(&mut ctx, &Path::root(), &Element::Hash(extra))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UNEXPECTED_FIELD);
    }

    #[test]
    fn nested_paths_in_errors() {
        let mut ctx = Context::for_object("node");
        let list = FullType::new(BaseType::list_of(long_type(0, 3)));
        let value = Element::List([Element::Long(1), Element::Long(9)].into_iter().collect());
        let path = Path::root().child(Term::Key("ports".into()));
        let err = list.validate(&mut ctx, &path, &value).unwrap_err();
        assert_eq!(err.path.as_deref(), Some("/ports/1"));
    }

    #[test]
    fn validation_expression_sees_self() {
        let mut ctx = Context::for_object("node");
        let check = Operation::binary(
            BinaryOp::Gt,
            Operation::variable("SELF", vec![], r()),
            Operation::literal(2i64, r()),
            r(),
        );
        let ty = FullType::new(BaseType::primitive(Primitive::Long)).with_validation(check);
        ty.validate(&mut ctx, &Path::root(), &Element::Long(3)).unwrap();
        let err = ty.validate(&mut ctx, &Path::root(), &Element::Long(1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::VALIDATION_FAILED);
    }

    #[test]
    fn validation_expression_cannot_modify_self() {
        let mut ctx = Context::for_object("node");
        let write = Operation::assign("SELF", vec![], Operation::literal(1i64, r()), r());
        let ty = FullType::new(BaseType::primitive(Primitive::Long)).with_validation(write);
        let err = ty.validate(&mut ctx, &Path::root(), &Element::Long(3)).unwrap_err();
        assert_eq!(err.code, ErrorCode::SELF_IS_FINAL);
    }

    #[test]
    fn alias_inherits_default() {
        let mut ctx = Context::for_object("node");
        ctx.register_type(
            "port",
            FullType::new(BaseType::primitive(Primitive::Long))
                .with_default(Operation::literal(80i64, r())),
        )
        .unwrap();
        let alias = FullType::new(BaseType::alias("port"));
        let value = alias.set_defaults(&mut ctx, &Path::root(), None).unwrap();
        assert_eq!(value, Some(Element::Long(80)));

        let existing = alias
            .set_defaults(&mut ctx, &Path::root(), Some(&Element::Long(8080)))
            .unwrap();
        assert_eq!(existing, None);
    }

    #[test]
    fn display() {
        let record = BaseType::record(
            vec![RecordField::optional(
                "port",
                BaseType::primitive(Primitive::Long).into(),
            )],
            true,
        );
        assert_eq!(record.to_string(), "extensible {port?: long}");
        assert_eq!(
            BaseType::list_of(BaseType::alias("host").into()).to_string(),
            "host[]"
        );
    }
}
