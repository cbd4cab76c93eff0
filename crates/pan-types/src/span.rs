use serde::{Deserialize, Serialize};
use std::fmt;

/// Location of an operation or statement in its template.
///
/// All line/column values are 1-based for human-readable error messages.
/// The parser attaches one of these to every node it hands to the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRange {
    #[serde(rename = "line")]
    pub start_line: u32,
    #[serde(rename = "column")]
    pub start_col: u32,
    pub end_line: u32,
    #[serde(rename = "end_column")]
    pub end_col: u32,
}

impl SourceRange {
    /// Create a new range.
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Create a zero-width range at a single position.
    pub fn point(line: u32, col: u32) -> Self {
        Self::new(line, col, line, col)
    }

    /// Merge two ranges into one that covers both.
    pub fn merge(self, other: SourceRange) -> SourceRange {
        let start_line = self.start_line.min(other.start_line);
        let start_col = if self.start_line < other.start_line {
            self.start_col
        } else if other.start_line < self.start_line {
            other.start_col
        } else {
            self.start_col.min(other.start_col)
        };

        let end_line = self.end_line.max(other.end_line);
        let end_col = if self.end_line > other.end_line {
            self.end_col
        } else if other.end_line > self.end_line {
            other.end_col
        } else {
            self.end_col.max(other.end_col)
        };

        SourceRange::new(start_line, start_col, end_line, end_col)
    }
}

impl fmt::Display for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start_line == self.end_line {
            write!(f, "[{}.{}-{}]", self.start_line, self.start_col, self.end_col)
        } else {
            write!(
                f,
                "[{}.{}-{}.{}]",
                self.start_line, self.start_col, self.end_line, self.end_col
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_point() {
        let r = SourceRange::point(1, 5);
        assert_eq!(r.start_line, 1);
        assert_eq!(r.start_col, 5);
        assert_eq!(r.end_line, 1);
        assert_eq!(r.end_col, 5);
    }

    #[test]
    fn test_range_merge() {
        let a = SourceRange::new(1, 5, 1, 10);
        let b = SourceRange::new(2, 3, 2, 8);
        let merged = a.merge(b);
        assert_eq!(merged.start_line, 1);
        assert_eq!(merged.start_col, 5);
        assert_eq!(merged.end_line, 2);
        assert_eq!(merged.end_col, 8);
    }

    #[test]
    fn test_range_merge_same_line() {
        let a = SourceRange::new(1, 5, 1, 10);
        let b = SourceRange::new(1, 3, 1, 8);
        let merged = a.merge(b);
        assert_eq!(merged.start_col, 3);
        assert_eq!(merged.end_col, 10);
    }

    #[test]
    fn test_range_display() {
        assert_eq!(SourceRange::new(3, 7, 3, 15).to_string(), "[3.7-15]");
        assert_eq!(SourceRange::new(3, 7, 4, 2).to_string(), "[3.7-4.2]");
    }

    #[test]
    fn test_range_json_field_names() {
        let json = serde_json::to_string(&SourceRange::new(1, 2, 3, 4)).unwrap();
        assert!(json.contains("\"line\":1"));
        assert!(json.contains("\"column\":2"));
        assert!(json.contains("\"end_line\":3"));
        assert!(json.contains("\"end_column\":4"));
    }
}
