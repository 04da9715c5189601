//! Contextual Query Language (CQL) front end.
//!
//! This crate turns a CQL search string into a syntax tree. It knows nothing
//! about entities or attribute types; resolving fields and coercing terms is
//! the job of `cqlbridge-core`.
//!
//! # Query Syntax
//!
//! ```text
//! name=John
//! id==123 and status=active
//! (title=dinosaur or title=dragon) not author=smith
//! name=/respectCase "John Smith"
//! owner.address.city=Par*
//! cql.allRecords=1 sortBy name/sort.descending age
//! ```
//!
//! Relation symbols are `=`, `==`, `<>`, `<`, `<=`, `>`, `>=`. Relation
//! modifiers are `ignoreCase`, `respectCase`, `masked` and `unmasked`, and
//! may follow either the symbol or the term. `and`, `or`, `not` and
//! `sortBy` are reserved words matched without regard to case.
//!
//! # Usage
//!
//! ```rust
//! use cqlbridge_lang::{parse, Node};
//!
//! let query = parse("id==123 and status=active sortBy name").unwrap();
//! assert!(matches!(query.filter, Some(Node::Boolean { .. })));
//! assert_eq!(query.sort.len(), 1);
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;

// Re-export main types
pub use ast::{
    BooleanOp, CqlQuery, Modifier, Node, Relation, RelationOp, SortClause, SortDirection,
    ALL_RECORDS_INDEX,
};
pub use error::{format_diagnostic, LangError, LexError, LexErrorKind, ParseError};
pub use parser::{Parser, DEFAULT_MAX_DEPTH};
pub use span::{Span, Spanned};

/// Parse a source string into a query.
///
/// # Example
///
/// ```rust
/// use cqlbridge_lang::parse;
///
/// let query = parse("name=John").unwrap();
/// assert!(query.filter.is_some());
/// ```
pub fn parse(source: &str) -> Result<CqlQuery, LangError> {
    parser::parse(source)
}

/// Tokenize a source string (for debugging/testing).
///
/// # Example
///
/// ```rust
/// use cqlbridge_lang::tokenize;
///
/// let tokens = tokenize("name=John").unwrap();
/// assert_eq!(tokens.len(), 3);
/// ```
pub fn tokenize(source: &str) -> Result<Vec<lexer::SpannedToken>, LexError> {
    lexer::tokenize(source)
}
