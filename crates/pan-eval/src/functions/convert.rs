use super::coerce::{decode_long, invalid_numeric, parse_radix, round_half_up, Args};
use crate::element::Element;
use crate::error::EvalResult;

/// `to_long(x)` or `to_long(string, radix)`.
pub(super) fn to_long(args: &Args<'_>) -> EvalResult<Element> {
    if args.len() == 2 {
        let text = args.string(0)?;
        let radix = args.long(1)?;
        if !(2..=36).contains(&radix) {
            return Err(args.invalid(format!("radix {radix} is not between 2 and 36")));
        }
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        return parse_radix(digits, radix as u32, negative)
            .map(Element::Long)
            .ok_or_else(|| invalid_numeric(text, "long"));
    }

    match args.get(0)? {
        Element::Long(n) => Ok(Element::Long(*n)),
        Element::Boolean(b) => Ok(Element::Long(i64::from(*b))),
        Element::Double(x) => Ok(Element::Long(round_half_up(*x))),
        Element::String(s) => decode_long(s)
            .map(Element::Long)
            .ok_or_else(|| invalid_numeric(s, "long")),
        _ => Err(args.mismatch(0, "a property")),
    }
}

pub(super) fn to_double(args: &Args<'_>) -> EvalResult<Element> {
    match args.get(0)? {
        Element::Double(x) => Ok(Element::Double(*x)),
        Element::Long(n) => Ok(Element::Double(*n as f64)),
        Element::Boolean(b) => Ok(Element::Double(if *b { 1.0 } else { 0.0 })),
        Element::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Element::Double)
            .map_err(|_| invalid_numeric(s, "double")),
        _ => Err(args.mismatch(0, "a property")),
    }
}

/// Numbers are true when non-zero; strings only when equal to "true" ignoring case.
pub(super) fn to_boolean(args: &Args<'_>) -> EvalResult<Element> {
    let result = match args.get(0)? {
        Element::Boolean(b) => *b,
        Element::Long(n) => *n != 0,
        Element::Double(x) => *x != 0.0,
        Element::String(s) => s.eq_ignore_ascii_case("true"),
        _ => return Err(args.mismatch(0, "a property")),
    };
    Ok(Element::Boolean(result))
}
