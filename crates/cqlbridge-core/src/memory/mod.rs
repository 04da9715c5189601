//! In-memory execution gateway.
//!
//! [`MemoryStore`] holds nested records per entity and runs translated
//! predicates by full scan. It backs the command-line tool and the test
//! suites, and serves as a reference for gateway semantics.

mod eval;
mod record;
mod store;

pub use eval::{edge_column, wildcard_match, Evaluator};
pub use record::{value_to_json, Datum, Record};
pub use store::MemoryStore;
