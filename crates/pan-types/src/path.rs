//! Profile paths: `/a/b/0`, `a/b`, `object:/a/b`.

use crate::term::{Term, TermError};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("empty path")]
    Empty,

    #[error("invalid path '{path}': {source}")]
    InvalidTerm {
        path: String,
        #[source]
        source: TermError,
    },

    #[error("invalid external path '{0}': the object name is empty")]
    EmptyObjectName(String),
}

/// Where a path is anchored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathKind {
    /// `/a/b`, anchored at the root of the current object.
    Absolute,
    /// `a/b`, resolved against the current prefix.
    Relative,
    /// `object:/a/b`, anchored at the root of another object.
    External(String),
}

/// A parsed profile path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    kind: PathKind,
    terms: Vec<Term>,
}

impl Path {
    /// The root path `/`.
    pub fn root() -> Self {
        Self {
            kind: PathKind::Absolute,
            terms: Vec::new(),
        }
    }

    pub fn absolute(terms: Vec<Term>) -> Self {
        Self {
            kind: PathKind::Absolute,
            terms,
        }
    }

    /// Parse the textual form of a path.
    pub fn parse(text: &str) -> Result<Self, PathError> {
        if text.is_empty() {
            return Err(PathError::Empty);
        }

        let (kind, rest) = match text.split_once(":/") {
            Some((object, rest)) => {
                if object.is_empty() {
                    return Err(PathError::EmptyObjectName(text.to_string()));
                }
                (PathKind::External(object.to_string()), rest)
            }
            None => match text.strip_prefix('/') {
                Some(rest) => (PathKind::Absolute, rest),
                None => (PathKind::Relative, text),
            },
        };

        let terms = rest
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(Term::parse)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| PathError::InvalidTerm {
                path: text.to_string(),
                source,
            })?;

        if kind == PathKind::Relative && terms.is_empty() {
            return Err(PathError::Empty);
        }

        Ok(Self { kind, terms })
    }

    pub fn kind(&self) -> &PathKind {
        &self.kind
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn is_absolute(&self) -> bool {
        self.kind == PathKind::Absolute
    }

    pub fn is_relative(&self) -> bool {
        self.kind == PathKind::Relative
    }

    pub fn is_external(&self) -> bool {
        matches!(self.kind, PathKind::External(_))
    }

    pub fn is_root(&self) -> bool {
        self.is_absolute() && self.terms.is_empty()
    }

    /// Resolve a relative path against `prefix`; other paths are returned unchanged.
    pub fn resolve(&self, prefix: &Path) -> Path {
        match self.kind {
            PathKind::Relative => {
                let mut terms = prefix.terms.clone();
                terms.extend(self.terms.iter().cloned());
                Path {
                    kind: prefix.kind.clone(),
                    terms,
                }
            }
            _ => self.clone(),
        }
    }

    /// Append one term, producing a child path.
    pub fn child(&self, term: Term) -> Path {
        let mut terms = self.terms.clone();
        terms.push(term);
        Path {
            kind: self.kind.clone(),
            terms,
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            PathKind::External(object) => write!(f, "{object}:")?,
            PathKind::Absolute => {}
            PathKind::Relative => {
                let parts: Vec<String> = self.terms.iter().map(Term::to_string).collect();
                return f.write_str(&parts.join("/"));
            }
        }
        if self.terms.is_empty() {
            return f.write_str("/");
        }
        for term in &self.terms {
            write!(f, "/{term}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_absolute() {
        let p = Path::parse("/hardware/cpu/0").unwrap();
        assert!(p.is_absolute());
        assert_eq!(
            p.terms(),
            &[
                Term::Key("hardware".into()),
                Term::Key("cpu".into()),
                Term::Index(0)
            ]
        );
        assert_eq!(p.to_string(), "/hardware/cpu/0");
    }

    #[test]
    fn parse_root() {
        let p = Path::parse("/").unwrap();
        assert!(p.is_root());
        assert_eq!(p.to_string(), "/");
    }

    #[test]
    fn parse_relative_and_resolve() {
        let p = Path::parse("alpha/beta").unwrap();
        assert!(p.is_relative());
        let prefix = Path::parse("/system").unwrap();
        assert_eq!(p.resolve(&prefix).to_string(), "/system/alpha/beta");
    }

    #[test]
    fn parse_external() {
        let p = Path::parse("node01:/system/name").unwrap();
        assert_eq!(p.kind(), &PathKind::External("node01".into()));
        assert_eq!(p.to_string(), "node01:/system/name");
    }

    #[test]
    fn parse_errors() {
        assert_eq!(Path::parse(""), Err(PathError::Empty));
        assert!(matches!(
            Path::parse(":/a"),
            Err(PathError::EmptyObjectName(_))
        ));
    }
}
