use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Address of one scalar in a document, written `Table/row/Column`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathParseError {
    #[error("field path is empty")]
    Empty,
    #[error("field path {0:?} contains an empty segment")]
    EmptySegment(String),
}

impl FieldPath {
    /// Path of a table cell: `table/row/column`.
    pub fn cell(table: &str, row: usize, column: &str) -> Self {
        Self {
            segments: vec![
                PathSegment::Key(table.to_string()),
                PathSegment::Index(row),
                PathSegment::Key(column.to_string()),
            ],
        }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Splits a cell path back into `(table, row, column)`.
    pub fn as_cell(&self) -> Option<(&str, usize, &str)> {
        match self.segments.as_slice() {
            [
                PathSegment::Key(table),
                PathSegment::Index(row),
                PathSegment::Key(column),
            ] => Some((table.as_str(), *row, column.as_str())),
            _ => None,
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PathParseError::Empty);
        }

        let mut segments = Vec::new();
        for part in s.split('/') {
            if part.is_empty() {
                return Err(PathParseError::EmptySegment(s.to_string()));
            }
            segments.push(segment_from_str(part));
        }

        // The last segment of a cell path names a column, even when that name is digits.
        if let [_, _, last @ PathSegment::Index(_)] = segments.as_mut_slice() {
            *last = PathSegment::Key(last.to_string());
        }

        Ok(Self { segments })
    }
}

/// Digits become an index only when they print back the same way, so
/// `007` stays a key.
fn segment_from_str(part: &str) -> PathSegment {
    if part.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(index) = part.parse::<usize>() {
            if index.to_string() == part {
                return PathSegment::Index(index);
            }
        }
    }
    PathSegment::Key(part.to_string())
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.to_string()
    }
}

impl TryFrom<String> for FieldPath {
    type Error = PathParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
