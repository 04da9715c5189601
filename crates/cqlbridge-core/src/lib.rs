//! cqlbridge core - catalog, field resolution, and CQL translation.
//!
//! This crate turns CQL query strings into backend-neutral predicates over a
//! typed attribute graph:
//!
//! ```text
//! query string -> lexer -> parser -> AST
//!              -> field resolver + type coercion (per relation)
//!              -> predicate builder (selection / count) -> gateway
//! ```
//!
//! # Example
//!
//! ```rust
//! use cqlbridge_core::{CqlTranslator, EntityDef, FieldDef, ScalarType, SchemaBundle};
//! use std::sync::Arc;
//!
//! let schema = SchemaBundle::new(1).with_entity(
//!     EntityDef::new("User", "id")
//!         .with_field(FieldDef::scalar("id", ScalarType::Int64))
//!         .with_field(FieldDef::scalar("name", ScalarType::String)),
//! );
//! let translator = CqlTranslator::new(Arc::new(schema));
//!
//! let selection = translator
//!     .translate_for_selection("User", "name=John sortBy id/sort.descending")
//!     .unwrap();
//! assert_eq!(selection.sort.len(), 1);
//! ```

pub mod catalog;
pub mod coerce;
pub mod config;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod resolve;
pub mod translate;

pub use catalog::{
    Attribute, AttributeGraph, Cardinality, EntityDef, FieldDef, FieldType, RelationDef,
    ScalarType, SchemaBundle,
};
pub use coerce::CoerceError;
pub use config::{EqualityMatch, TranslatorConfig};
pub use error::{Error, ErrorKind, TranslateError};
pub use gateway::{CqlRepository, ExecutionGateway, RepositoryError};
pub use memory::{MemoryStore, Record};
pub use resolve::{FieldResolver, ResolveError};
pub use translate::{CqlTranslator, Translation};

/// Re-export protocol types.
pub use cqlbridge_proto as proto;

/// Re-export the query language front end.
pub use cqlbridge_lang as lang;
