//! String built-ins. Regular expressions use the `regex` crate's syntax.

use super::coerce::Args;
use super::resource::span;
use crate::element::{Element, ListResource};
use crate::error::EvalResult;
use pan_types::{ErrorCode, PanError};
use regex::Regex;

fn compile(args: &Args<'_>, index: usize) -> EvalResult<Regex> {
    let pattern = args.string(index)?;
    Regex::new(pattern).map_err(|e| {
        PanError::new(
            ErrorCode::INVALID_REGEX,
            format!("invalid regular expression '{pattern}': {e}"),
        )
    })
}

pub(super) fn to_uppercase(args: &Args<'_>) -> EvalResult<Element> {
    Ok(Element::String(args.string(0)?.to_uppercase()))
}

pub(super) fn to_lowercase(args: &Args<'_>) -> EvalResult<Element> {
    Ok(Element::String(args.string(0)?.to_lowercase()))
}

/// `substr(string, start[, length])`, counting characters. A negative start
/// counts from the end; a negative length leaves that many characters off the end.
pub(super) fn substr(args: &Args<'_>) -> EvalResult<Element> {
    let text = args.string(0)?;
    let start = args.long(1)?;
    let length = if args.len() == 3 { Some(args.long(2)?) } else { None };

    let chars: Vec<char> = text.chars().collect();
    let (from, to) = span(chars.len(), start, length)
        .ok_or_else(|| args.invalid("start or length out of range"))?;
    Ok(Element::String(chars[from..to].iter().collect()))
}

/// Position of a substring (or `-1`), position of a list element (or `-1`),
/// or key of a dict value (or `""`).
pub(super) fn index(args: &Args<'_>) -> EvalResult<Element> {
    let needle = args.get(0)?;
    let start = if args.len() == 3 { args.long(2)? } else { 0 };
    if start < 0 {
        return Err(args.invalid("start must not be negative"));
    }
    let start = start as usize;

    match args.get(1)? {
        Element::String(haystack) => {
            let needle = args.string(0)?;
            let offset = haystack
                .char_indices()
                .nth(start)
                .map(|(i, _)| i)
                .unwrap_or(haystack.len());
            let found = haystack[offset..]
                .find(needle)
                .map(|byte| (start + haystack[offset..offset + byte].chars().count()) as i64)
                .unwrap_or(-1);
            Ok(Element::Long(found))
        }
        Element::List(list) => {
            let found = list
                .iter()
                .enumerate()
                .skip(start)
                .find(|(_, child)| *child == needle)
                .map_or(-1, |(i, _)| i as i64);
            Ok(Element::Long(found))
        }
        Element::Hash(hash) => {
            let found = hash
                .iter()
                .skip(start)
                .find(|(_, child)| *child == needle)
                .map_or(String::new(), |(k, _)| k.clone());
            Ok(Element::String(found))
        }
        _ => Err(args.mismatch(1, "a string, list or dict")),
    }
}

/// Translate `$1`-style group references and `\$` escapes into the
/// replacement syntax understood by `regex`.
fn replacement_template(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('$') => out.push_str("$$"),
                Some(other) => out.push(other),
                None => out.push('\\'),
            },
            '$' if chars.peek().is_some_and(char::is_ascii_digit) => {
                out.push_str("${");
                while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                    out.push(d);
                    chars.next();
                }
                out.push('}');
            }
            '$' => out.push_str("$$"),
            other => out.push(other),
        }
    }
    out
}

/// `replace(regex, replacement, target)`: replace every match.
pub(super) fn replace(args: &Args<'_>) -> EvalResult<Element> {
    let regex = compile(args, 0)?;
    let template = replacement_template(args.string(1)?);
    let target = args.string(2)?;
    Ok(Element::String(
        regex.replace_all(target, template.as_str()).into_owned(),
    ))
}

/// `match(target, regex)`: whether the pattern occurs anywhere in the target.
pub(super) fn match_regex(args: &Args<'_>) -> EvalResult<Element> {
    let target = args.string(0)?;
    let regex = compile(args, 1)?;
    Ok(Element::Boolean(regex.is_match(target)))
}

/// `matches(target, regex)`: whole match and capture groups of the first
/// match, or an empty list.
pub(super) fn matches(args: &Args<'_>) -> EvalResult<Element> {
    let target = args.string(0)?;
    let regex = compile(args, 1)?;
    let groups = match regex.captures(target) {
        Some(caps) => caps
            .iter()
            .map(|group| Element::from(group.map_or("", |m| m.as_str())))
            .collect(),
        None => ListResource::new(),
    };
    Ok(Element::List(groups))
}

/// Split around regex matches with the usual limit rules: zero drops
/// trailing empty strings, a positive limit caps the number of pieces,
/// a negative limit keeps everything.
pub fn split_with_limit(regex: &Regex, target: &str, limit: i64) -> Vec<String> {
    if target.is_empty() {
        return vec![String::new()];
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for m in regex.find_iter(target) {
        if limit > 0 && pieces.len() as i64 >= limit - 1 {
            break;
        }
        // A zero-width match at the very start never yields a leading empty piece.
        if m.end() == 0 {
            continue;
        }
        pieces.push(target[start..m.start()].to_string());
        start = m.end();
    }
    if pieces.is_empty() {
        return vec![target.to_string()];
    }
    pieces.push(target[start..].to_string());

    if limit == 0 {
        while pieces.last().is_some_and(String::is_empty) {
            pieces.pop();
        }
    }
    pieces
}

/// `split(target, regex[, limit])`.
pub(super) fn split(args: &Args<'_>) -> EvalResult<Element> {
    let target = args.string(0)?;
    let regex = compile(args, 1)?;
    let limit = if args.len() == 3 { args.long(2)? } else { 0 };
    Ok(Element::List(
        split_with_limit(&regex, target, limit)
            .into_iter()
            .map(Element::String)
            .collect(),
    ))
}

/// `join(delimiter, list)` or `join(delimiter, s1, s2, ...)`.
pub(super) fn join(args: &Args<'_>) -> EvalResult<Element> {
    let delimiter = args.string(0)?;
    let parts: Vec<&str> = if args.len() == 2 && args.get(1)?.as_list().is_some() {
        let list = args.list(1)?;
        list.iter()
            .map(|child| child.as_str().ok_or_else(|| args.invalid("list elements must be strings")))
            .collect::<EvalResult<_>>()?
    } else {
        (1..args.len())
            .map(|i| args.string(i))
            .collect::<EvalResult<_>>()?
    };
    Ok(Element::String(parts.join(delimiter)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::BuiltIn;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn split_limits() {
        let comma = Regex::new(",").unwrap();
        assert_eq!(split_with_limit(&comma, "a,b,,c", 0), strings(&["a", "b", "", "c"]));
        assert_eq!(split_with_limit(&comma, "a,b,,c", 2), strings(&["a", "b,,c"]));
        assert_eq!(split_with_limit(&comma, "a,b,,", 0), strings(&["a", "b"]));
        assert_eq!(split_with_limit(&comma, "a,b,,", -1), strings(&["a", "b", "", ""]));
        assert_eq!(split_with_limit(&comma, ",a", 0), strings(&["", "a"]));
        assert_eq!(split_with_limit(&comma, "abc", 0), strings(&["abc"]));
        assert_eq!(split_with_limit(&comma, "", 0), strings(&[""]));
        assert!(split_with_limit(&comma, ",,", 0).is_empty());
    }

    #[test]
    fn replacement_groups() {
        assert_eq!(replacement_template("$1a"), "${1}a");
        assert_eq!(replacement_template("\\$5"), "$$5");
        let values = [Element::from("(\\w+)@"), Element::from("$1 at "), Element::from("me@host")];
        assert_eq!(
            replace(&Args::new(BuiltIn::Replace, &values)).unwrap(),
            Element::from("me at host")
        );
    }

    #[test]
    fn index_variants() {
        let values = [Element::from("lo"), Element::from("hello lo"), Element::Long(4)];
        assert_eq!(index(&Args::new(BuiltIn::Index, &values)).unwrap(), Element::Long(6));

        let values = [Element::from("x"), Element::from("abc")];
        assert_eq!(index(&Args::new(BuiltIn::Index, &values)).unwrap(), Element::Long(-1));
    }

    #[test]
    fn substr_negative_forms() {
        let values = [Element::from("abcdef"), Element::Long(-3)];
        assert_eq!(substr(&Args::new(BuiltIn::Substr, &values)).unwrap(), Element::from("def"));
        let values = [Element::from("abcdef"), Element::Long(1), Element::Long(-1)];
        assert_eq!(substr(&Args::new(BuiltIn::Substr, &values)).unwrap(), Element::from("bcde"));
    }

    #[test]
    fn bad_regex() {
        let values = [Element::from("abc"), Element::from("(")];
        assert_eq!(
            match_regex(&Args::new(BuiltIn::Match, &values)).unwrap_err().code,
            ErrorCode::INVALID_REGEX
        );
    }
}
