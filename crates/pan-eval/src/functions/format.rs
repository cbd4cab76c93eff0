//! printf-style formatting shared by `format`, `error` and `debug`.
//!
//! Supported conversions: `%s`, `%b`, `%d`, `%x`, `%X`, `%o`, `%f`, `%e`
//! and `%%`, with `-` and `0` flags, a field width and a precision.

use super::coerce::Args;
use crate::element::Element;
use crate::error::EvalResult;

#[derive(Debug, Default)]
struct Spec {
    left: bool,
    zero: bool,
    width: usize,
    precision: Option<usize>,
}

impl Spec {
    fn pad(&self, body: String) -> String {
        let len = body.chars().count();
        if len >= self.width {
            return body;
        }
        let fill = self.width - len;
        if self.left {
            format!("{body}{}", " ".repeat(fill))
        } else if self.zero {
            match body.strip_prefix('-') {
                Some(digits) => format!("-{}{digits}", "0".repeat(fill)),
                None => format!("{}{body}", "0".repeat(fill)),
            }
        } else {
            format!("{}{body}", " ".repeat(fill))
        }
    }
}

/// Format `args[first]` with the remaining arguments.
pub(super) fn format(args: &Args<'_>, first: usize) -> EvalResult<String> {
    let template = args.string(first)?;
    let mut next = first + 1;
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let mut spec = Spec::default();
        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => spec.left = true,
                '0' => spec.zero = true,
                _ => break,
            }
            chars.next();
        }
        spec.width = read_count(&mut chars).ok_or_else(|| args.invalid("field width is too large"))?;
        if chars.peek() == Some(&'.') {
            chars.next();
            let precision =
                read_count(&mut chars).ok_or_else(|| args.invalid("precision is too large"))?;
            spec.precision = Some(precision);
        }

        let conversion = chars
            .next()
            .ok_or_else(|| args.invalid("format string ends inside a conversion"))?;
        if conversion == '%' {
            out.push('%');
            continue;
        }

        let index = next;
        next += 1;
        let value = args
            .all()
            .get(index)
            .ok_or_else(|| args.invalid(format!("missing argument for '%{conversion}'")))?;

        let body = match (conversion, value) {
            ('s', v) => {
                let text = v.to_string();
                match spec.precision {
                    Some(p) => text.chars().take(p).collect(),
                    None => text,
                }
            }
            ('b', Element::Boolean(b)) => b.to_string(),
            ('d', Element::Long(n)) => n.to_string(),
            ('x', Element::Long(n)) => format!("{n:x}"),
            ('X', Element::Long(n)) => format!("{n:X}"),
            ('o', Element::Long(n)) => format!("{n:o}"),
            ('f', v) if v.is_number() => {
                let x = v.as_number().unwrap_or_default();
                format!("{x:.prec$}", prec = spec.precision.unwrap_or(6))
            }
            ('e', v) if v.is_number() => {
                let x = v.as_number().unwrap_or_default();
                format!("{x:.prec$e}", prec = spec.precision.unwrap_or(6))
            }
            ('s' | 'b' | 'd' | 'x' | 'X' | 'o' | 'f' | 'e', _) => {
                return Err(args.mismatch(index, expected(conversion)))
            }
            (other, _) => return Err(args.invalid(format!("unknown conversion '%{other}'"))),
        };
        out.push_str(&spec.pad(body));
    }

    Ok(out)
}

/// Largest width or precision a conversion may ask for.
const MAX_FIELD: usize = 1 << 16;

fn read_count(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<usize> {
    let mut n: usize = 0;
    while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
        n = n.checked_mul(10)?.checked_add(d as usize)?;
        if n > MAX_FIELD {
            return None;
        }
        chars.next();
    }
    Some(n)
}

fn expected(conversion: char) -> &'static str {
    match conversion {
        'b' => "a boolean",
        'f' | 'e' => "a number",
        _ => "a long",
    }
}
