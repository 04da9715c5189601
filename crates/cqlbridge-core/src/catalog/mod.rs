//! Entity catalog for cqlbridge.
//!
//! The catalog describes the entity types a query can target, their fields,
//! and the relations between them. Together they form the attribute graph
//! that dotted CQL field names are resolved against.

mod entity;
mod field;
mod graph;
mod relation;
mod schema;
mod types;

pub use entity::EntityDef;
pub use field::FieldDef;
pub use graph::{Attribute, AttributeGraph};
pub use relation::{Cardinality, RelationDef};
pub use schema::SchemaBundle;
pub use types::{FieldType, ScalarType};
