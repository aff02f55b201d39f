//! Source location tracking.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A region of the source, as 1-based line and column positions.
///
/// Columns count characters. The end position is exclusive, so a one-character
/// token at line 3, column 5 spans `3:5-3:6`. A span whose start equals its end
/// is a point, used for productions that matched nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    /// Line of the first character.
    pub first_line: u32,
    /// Column of the first character.
    pub first_column: u32,
    /// Line of the end position.
    pub last_line: u32,
    /// Column just past the last character.
    pub last_column: u32,
}

impl SourceSpan {
    /// Create a new span.
    #[must_use]
    pub const fn new(first_line: u32, first_column: u32, last_line: u32, last_column: u32) -> Self {
        Self {
            first_line,
            first_column,
            last_line,
            last_column,
        }
    }

    /// Create an empty span at a position.
    #[must_use]
    pub const fn point(line: u32, column: u32) -> Self {
        Self::new(line, column, line, column)
    }

    /// The empty span at the end of this one.
    #[must_use]
    pub const fn end_point(&self) -> Self {
        Self::point(self.last_line, self.last_column)
    }

    /// Check if the span covers no characters.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.first_line == self.last_line && self.first_column == self.last_column
    }

    /// Span from the start of `self` to the end of `other`.
    #[must_use]
    pub const fn to(&self, other: &Self) -> Self {
        Self::new(
            self.first_line,
            self.first_column,
            other.last_line,
            other.last_column,
        )
    }
}

impl Default for SourceSpan {
    fn default() -> Self {
        Self::point(1, 1)
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.first_line, self.first_column, self.last_line, self.last_column
        )
    }
}

/// A value with an associated source span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spanned<T> {
    /// The value.
    pub value: T,
    /// The source span.
    pub span: SourceSpan,
}

impl<T> Spanned<T> {
    /// Create a new spanned value.
    #[must_use]
    pub const fn new(value: T, span: SourceSpan) -> Self {
        Self { value, span }
    }

    /// Map the inner value.
    #[must_use]
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Spanned<U> {
        Spanned {
            value: f(self.value),
            span: self.span,
        }
    }

    /// Get a reference to the inner value.
    #[must_use]
    pub const fn inner(&self) -> &T {
        &self.value
    }

    /// Unwrap the spanned value, discarding the span.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }
}
