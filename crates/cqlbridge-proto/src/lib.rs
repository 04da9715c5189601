//! cqlbridge protocol types.
//!
//! This crate defines the backend-neutral intermediate representation that
//! the CQL translator produces and execution gateways consume.
//!
//! # Modules
//!
//! - [`value`] - Typed runtime values for coerced literals and record data
//! - [`path`] - Resolved attribute paths and join steps
//! - [`predicate`] - Predicate trees and typed comparisons
//! - [`query`] - Sort keys, pagination windows, and paged results
//! - [`pattern`] - CQL masking helpers (`*`, `?`, escapes)
//! - [`error`] - Protocol error types
//!
//! # Serialization
//!
//! All types derive `serde::Serialize` and `serde::Deserialize`, so a
//! translated query can be shipped to a remote execution layer as JSON:
//!
//! ```
//! use cqlbridge_proto::{Predicate, Selection};
//!
//! let selection = Selection::new(Predicate::MatchAll);
//! let json = serde_json::to_string(&selection).unwrap();
//! let back: Selection = serde_json::from_str(&json).unwrap();
//! assert_eq!(selection, back);
//! ```

pub mod error;
pub mod path;
pub mod pattern;
pub mod predicate;
pub mod query;
pub mod value;

pub use error::Error;

// Re-export commonly used types at crate root
pub use path::{AttributePath, JoinStep, PathStep, StepKind, ValueDomain};
pub use predicate::{BooleanOp, CompareOp, Comparison, MatchMode, Predicate, TypedValue};
pub use query::{Page, PageRequest, Selection, SortDirection, SortKey};
pub use value::Value;
