//! Pretty-printing [`ParseError`] against its source text.
//!
//! Builder-pattern renderer, same shape as a source-annotated diagnostic
//! printer: call [`ParseErrorPrinter::new`], optionally attach `source` and
//! `path`, then `render()`. Without a source, falls back to the plain
//! `"<message> at position <n>"` surface.

use std::fmt::Write;

use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet};

use crate::error::ParseError;

/// Builder for rendering a [`ParseError`] (and its absorbed sub-errors) as
/// source-annotated diagnostics.
pub struct ParseErrorPrinter<'e, 's> {
    error: &'e ParseError,
    source: Option<&'s str>,
    path: Option<&'s str>,
    colored: bool,
}

impl<'e, 's> ParseErrorPrinter<'e, 's> {
    pub fn new(error: &'e ParseError) -> Self {
        Self {
            error,
            source: None,
            path: None,
            colored: false,
        }
    }

    pub fn source(mut self, source: &'s str) -> Self {
        self.source = Some(source);
        self
    }

    pub fn path(mut self, path: &'s str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let Some(source) = self.source else {
            return write!(w, "{}", self.error);
        };

        let renderer = if self.colored { Renderer::styled() } else { Renderer::plain() };

        let furthest = self.error.furthest();
        let span = code_point_span(source, furthest.position());

        let mut snippet = Snippet::source(source)
            .line_start(1)
            .annotation(AnnotationKind::Primary.span(span).label(furthest.message()));
        if let Some(p) = self.path {
            snippet = snippet.path(p);
        }

        for sub in self.error.sub_errors() {
            if std::ptr::eq(sub, furthest) {
                continue;
            }
            snippet = snippet.annotation(
                AnnotationKind::Context
                    .span(code_point_span(source, sub.position()))
                    .label(sub.message()),
            );
        }

        let report = vec![Level::ERROR.primary_title(self.error.message()).element(snippet)];
        write!(w, "{}", renderer.render(&report))
    }
}

/// Converts a 1-based code-point position into a byte-offset span over
/// `source`, covering one code point (or, at EOF, a zero-width point at the
/// end of the source).
fn code_point_span(source: &str, position: usize) -> std::ops::Range<usize> {
    let index = position.saturating_sub(1);
    let Some(start) = source.char_indices().map(|(offset, _)| offset).nth(index) else {
        return source.len()..source.len();
    };
    let end = source[start..].chars().next().map(|c| start + c.len_utf8()).unwrap_or(start);
    start..end
}

impl ParseError {
    pub fn printer(&self) -> ParseErrorPrinter<'_, '_> {
        ParseErrorPrinter::new(self)
    }
}

#[cfg(test)]
mod diagnostics_tests {
    use super::*;

    #[test]
    fn plain_format_matches_error_surface() {
        let err = ParseError::at_position(3, "expected ALPHA");
        assert_eq!(err.printer().render(), "expected ALPHA at position 3");
    }

    #[test]
    fn source_annotated_render_contains_message() {
        let err = ParseError::at_position(2, "expected DIGIT");
        let rendered = err.printer().source("a1").render();
        assert!(rendered.contains("expected DIGIT"));
    }
}
