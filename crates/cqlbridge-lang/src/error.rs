//! Error types for lexing and parsing.

use crate::span::{offset_to_line_col, Span};
use std::fmt;
use thiserror::Error;

/// Why the lexer rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    /// A quoted phrase has no closing quote.
    UnterminatedPhrase,
    /// A character that cannot appear in a query.
    IllegalCharacter(char),
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexErrorKind::UnterminatedPhrase => write!(f, "unterminated quoted phrase"),
            LexErrorKind::IllegalCharacter(c) => write!(f, "illegal character {:?}", c),
        }
    }
}

/// Error during lexing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct LexError {
    /// Source span of the offending input.
    pub span: Span,
    /// What went wrong.
    pub reason: LexErrorKind,
}

impl LexError {
    /// Create a new lex error.
    pub fn new(reason: LexErrorKind, span: Span) -> Self {
        Self { span, reason }
    }

    /// Format the error with source context.
    pub fn format_with_source(&self, source: &str) -> String {
        format_diagnostic(source, self.span, &format!("error: {}", self.reason), None)
    }
}

/// Error during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected}, found {found}")]
pub struct ParseError {
    /// Source span where the error occurred.
    pub span: Span,
    /// What the parser was looking for.
    pub expected: String,
    /// What it found instead.
    pub found: String,
    /// Optional hint for fixing the error.
    pub hint: Option<String>,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(expected: impl Into<String>, found: impl Into<String>, span: Span) -> Self {
        Self {
            span,
            expected: expected.into(),
            found: found.into(),
            hint: None,
        }
    }

    /// Add a hint to the error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Format the error with source context.
    pub fn format_with_source(&self, source: &str) -> String {
        format_diagnostic(
            source,
            self.span,
            &format!("error: {}", self),
            self.hint.as_deref(),
        )
    }
}

/// A combined error type for the public API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LangError {
    /// Lex error.
    #[error("lex error: {0}")]
    Lex(#[from] LexError),
    /// Parse error.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

impl LangError {
    /// Format the error with source context.
    pub fn format_with_source(&self, source: &str) -> String {
        match self {
            LangError::Lex(e) => e.format_with_source(source),
            LangError::Parse(e) => e.format_with_source(source),
        }
    }

    /// Get the span of the error.
    pub fn span(&self) -> Span {
        match self {
            LangError::Lex(e) => e.span,
            LangError::Parse(e) => e.span,
        }
    }
}

/// Render a caret diagnostic pointing at `span` inside `source`.
///
/// `header` is the first line of the output. Other crates use this to render
/// their own errors in the same layout.
pub fn format_diagnostic(source: &str, span: Span, header: &str, hint: Option<&str>) -> String {
    let (line, col) = offset_to_line_col(source, span.start);
    let mut result = format!("{}\n", header);
    result.push_str(&format!("  --> line {}:{}\n", line, col));

    if let Some(source_line) = source.lines().nth(line - 1) {
        result.push_str(&format!("   |\n{:3}| {}\n   |", line, source_line));

        for _ in 0..col {
            result.push(' ');
        }
        result.push('^');

        let span_len = span.end.saturating_sub(span.start);
        let room = (source_line.len() + 1).saturating_sub(col);
        for _ in 1..span_len.min(room) {
            result.push('~');
        }
        result.push('\n');
    }

    if let Some(hint) = hint {
        result.push_str(&format!("   = hint: {}\n", hint));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_formatting() {
        let source = "title=dinosaur and";
        let err = ParseError::new("a search clause", "end of input", Span::new(18, 18))
            .with_hint("remove the trailing boolean operator");

        let formatted = err.format_with_source(source);
        assert!(formatted.contains("line 1:19"));
        assert!(formatted.contains("expected a search clause, found end of input"));
        assert!(formatted.contains("hint: remove the trailing"));
    }

    #[test]
    fn test_underline_width() {
        let source = "age>abc";
        let rendered = format_diagnostic(source, Span::new(4, 7), "error: bad literal", None);
        assert!(rendered.contains("^~~"));
        assert!(!rendered.contains("^~~~"));
    }

    #[test]
    fn test_lex_error_display() {
        let err = LexError::new(LexErrorKind::UnterminatedPhrase, Span::new(6, 10));
        assert_eq!(err.to_string(), "unterminated quoted phrase");
        let lang: LangError = err.into();
        assert_eq!(lang.span(), Span::new(6, 10));
    }
}
