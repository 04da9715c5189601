//! Attribute graph abstraction consumed by the field resolver.

use super::{FieldDef, RelationDef, SchemaBundle};

/// A named attribute of an entity type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Attribute<'a> {
    /// A stored field (scalar, enum, or embedded object).
    Field(&'a FieldDef),
    /// A relation to another entity type.
    Relation(&'a RelationDef),
}

/// Read-only view of entity types and their attributes.
///
/// The translator is generic over this trait so that callers can plug in
/// their own metadata source. [`SchemaBundle`] is the built-in implementation.
pub trait AttributeGraph: Send + Sync {
    /// Check if an entity (or embedded) type exists.
    fn has_entity(&self, entity: &str) -> bool;

    /// Look up an attribute by name on an entity type.
    fn attribute(&self, entity: &str, name: &str) -> Option<Attribute<'_>>;

    /// Names of every attribute on an entity type, for diagnostics.
    fn attribute_names(&self, entity: &str) -> Vec<String>;
}

impl AttributeGraph for SchemaBundle {
    fn has_entity(&self, entity: &str) -> bool {
        self.entities.contains_key(entity)
    }

    fn attribute(&self, entity: &str, name: &str) -> Option<Attribute<'_>> {
        let def = self.get_entity(entity)?;
        if let Some(field) = def.get_field(name) {
            return Some(Attribute::Field(field));
        }
        self.get_relation(entity, name).map(Attribute::Relation)
    }

    fn attribute_names(&self, entity: &str) -> Vec<String> {
        let mut names: Vec<String> = match self.get_entity(entity) {
            Some(def) => def.fields.iter().map(|f| f.name.clone()).collect(),
            None => return Vec::new(),
        };
        names.extend(self.relations_from(entity).iter().map(|r| r.name.clone()));
        names.sort();
        names
    }
}
