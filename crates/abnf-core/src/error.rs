//! Structured parse errors.
//!
//! A [`ParseError`] is not a string: it carries the position it occurred at
//! and, where applicable, the sub-errors it absorbed (alternation's failed
//! branches). This lets callers (chiefly alternation) attribute a composite
//! failure to whichever branch actually progressed furthest.

use std::fmt;

use crate::cursor::Cursor;

/// A parse failure at a known input position, possibly composed of several
/// more specific failures (e.g. one per failed alternation branch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    message: String,
    position: usize,
    sub_errors: Vec<ParseError>,
}

impl ParseError {
    /// Builds an error at `cursor`'s current (1-based) position.
    pub fn at(cursor: &Cursor, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            position: cursor.error_position(),
            sub_errors: Vec::new(),
        }
    }

    pub fn at_position(position: usize, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            position,
            sub_errors: Vec::new(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn sub_errors(&self) -> &[ParseError] {
        &self.sub_errors
    }

    /// Appends `other` to this error's sub-errors. Used by alternation and
    /// concatenation-of-alternatives to assemble a composite failure.
    pub fn adopt(mut self, other: ParseError) -> ParseError {
        self.sub_errors.push(other);
        self
    }

    pub fn adopt_all(mut self, others: impl IntoIterator<Item = ParseError>) -> ParseError {
        self.sub_errors.extend(others);
        self
    }

    /// Depth-first scan for the descendant (or self) with the greatest
    /// position. Ties keep the shallower (earlier-found) candidate.
    pub fn furthest(&self) -> &ParseError {
        let mut best = self;
        for sub in &self.sub_errors {
            let candidate = sub.furthest();
            if candidate.position > best.position {
                best = candidate;
            }
        }
        best
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at position {}", self.message, self.position)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod error_tests {
    use super::*;
    use crate::cursor::cursor_from;

    #[test]
    fn display_matches_error_surface() {
        let c = cursor_from("x");
        let err = ParseError::at(&c, "expected ALPHA");
        assert_eq!(err.to_string(), "expected ALPHA at position 1");
    }

    #[test]
    fn furthest_picks_greatest_position_among_descendants() {
        let near = ParseError::at_position(1, "near");
        let far = ParseError::at_position(5, "far");
        let mid = ParseError::at_position(3, "mid");
        let composite = ParseError::at_position(1, "alternation exhausted")
            .adopt(near)
            .adopt(far.clone())
            .adopt(mid);
        assert_eq!(composite.furthest(), &far);
    }

    #[test]
    fn furthest_of_leaf_is_itself() {
        let leaf = ParseError::at_position(2, "leaf");
        assert_eq!(leaf.furthest(), &leaf);
    }
}
