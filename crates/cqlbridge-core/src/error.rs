//! Core error types.

use crate::coerce::CoerceError;
use crate::resolve::ResolveError;
use cqlbridge_lang::{format_diagnostic, LangError, LexError, ParseError, Span};
use thiserror::Error;

/// Catalog and snapshot errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Protocol error.
    #[error("protocol error: {0}")]
    Protocol(#[from] cqlbridge_proto::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// JSON encoding or decoding error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The schema references something that does not exist.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// A data record does not fit its entity definition.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

/// Failure category of a translation, for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed token.
    Lex,
    /// Malformed query structure.
    Parse,
    /// Unknown root entity.
    UnknownEntity,
    /// Unknown field.
    UnknownField,
    /// Field does not denote a single attribute.
    AmbiguousField,
    /// Relation not applicable to the attribute's domain.
    UnsupportedOperator,
    /// Term not readable in the attribute's domain.
    Coercion,
    /// Sort requested on an attribute that cannot be ordered.
    UnsortableField,
}

/// Everything that can go wrong turning a CQL string into a predicate.
///
/// Translation is all-or-nothing: any error means nothing was produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    /// Lex error.
    #[error("{0}")]
    Lex(#[from] LexError),

    /// Parse error.
    #[error("{0}")]
    Parse(#[from] ParseError),

    /// The query exceeds the configured length limit.
    #[error("query is {length} bytes long; the limit is {limit}")]
    TooLong {
        /// Query length in bytes.
        length: usize,
        /// Configured limit.
        limit: usize,
    },

    /// Field resolution failed.
    #[error("{source}")]
    Resolve {
        /// Underlying error.
        source: ResolveError,
        /// Span of the field name.
        span: Span,
    },

    /// Term coercion failed.
    #[error("{source}")]
    Coerce {
        /// Underlying error.
        source: CoerceError,
        /// Span of the offending relation.
        span: Span,
    },

    /// Sort key cannot be ordered.
    #[error("cannot sort by '{field}': {reason}")]
    UnsortableField {
        /// Field name as written.
        field: String,
        /// Why it cannot be ordered.
        reason: String,
        /// Span of the sort key.
        span: Span,
    },
}

impl From<LangError> for TranslateError {
    fn from(err: LangError) -> Self {
        match err {
            LangError::Lex(e) => TranslateError::Lex(e),
            LangError::Parse(e) => TranslateError::Parse(e),
        }
    }
}

impl TranslateError {
    /// Wrap a resolution failure at `span`.
    pub fn resolve(source: ResolveError, span: Span) -> Self {
        TranslateError::Resolve { source, span }
    }

    /// Wrap a coercion failure at `span`.
    pub fn coerce(source: CoerceError, span: Span) -> Self {
        TranslateError::Coerce { source, span }
    }

    /// Get the error category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TranslateError::Lex(_) => ErrorKind::Lex,
            TranslateError::Parse(_) | TranslateError::TooLong { .. } => ErrorKind::Parse,
            TranslateError::Resolve { source, .. } => match source {
                ResolveError::UnknownEntity { .. } => ErrorKind::UnknownEntity,
                ResolveError::UnknownField { .. } => ErrorKind::UnknownField,
                ResolveError::AmbiguousField { .. } => ErrorKind::AmbiguousField,
            },
            TranslateError::Coerce { source, .. } => match source {
                CoerceError::Coercion { .. } => ErrorKind::Coercion,
                CoerceError::UnsupportedOperator { .. } => ErrorKind::UnsupportedOperator,
            },
            TranslateError::UnsortableField { .. } => ErrorKind::UnsortableField,
        }
    }

    /// Get the span of the error.
    pub fn span(&self) -> Span {
        match self {
            TranslateError::Lex(e) => e.span,
            TranslateError::Parse(e) => e.span,
            TranslateError::TooLong { limit, length } => Span::new(*limit, *length),
            TranslateError::Resolve { span, .. }
            | TranslateError::Coerce { span, .. }
            | TranslateError::UnsortableField { span, .. } => *span,
        }
    }

    /// Format the error with source context.
    pub fn format_with_source(&self, source: &str) -> String {
        match self {
            TranslateError::Lex(e) => e.format_with_source(source),
            TranslateError::Parse(e) => e.format_with_source(source),
            other => format_diagnostic(
                source,
                other.span(),
                &format!("error[{:?}]: {}", other.kind(), other),
                None,
            ),
        }
    }
}
