//! CQL to predicate translation.
//!
//! A query is parsed once and translated into a [`Translation`], which
//! offers the selection form (predicate plus sort keys) and the count form
//! (predicate only).

mod builder;
mod sort;
mod translator;

pub use builder::PredicateBuilder;
pub use sort::translate_sort;
pub use translator::{CqlTranslator, Translation};
