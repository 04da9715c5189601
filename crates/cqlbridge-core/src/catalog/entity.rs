//! Entity definitions.

use super::field::FieldDef;

/// An entity definition.
///
/// Root entities have an identity field. Embedded types, stored inline inside
/// other entities, leave it empty.
#[derive(
    Debug,
    Clone,
    PartialEq,
    rkyv::Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct EntityDef {
    /// Entity name (unique within schema).
    pub name: String,
    /// Name of the primary identity field.
    #[serde(default)]
    pub identity_field: String,
    /// Field definitions.
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl EntityDef {
    /// Create a new entity definition.
    pub fn new(name: impl Into<String>, identity_field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identity_field: identity_field.into(),
            fields: Vec::new(),
        }
    }

    /// Create an embedded type definition.
    pub fn embedded(name: impl Into<String>) -> Self {
        Self::new(name, "")
    }

    /// Add a field to the entity.
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Get a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get the identity field definition.
    pub fn get_identity_field(&self) -> Option<&FieldDef> {
        self.get_field(&self.identity_field)
    }

    /// Check if this is an embedded type.
    pub fn is_embedded(&self) -> bool {
        self.identity_field.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FieldType, ScalarType};

    #[test]
    fn test_entity_builder() {
        let entity = EntityDef::new("User", "id")
            .with_field(FieldDef::scalar("id", ScalarType::Uuid))
            .with_field(FieldDef::scalar("name", ScalarType::String))
            .with_field(FieldDef::optional_scalar("email", ScalarType::String));

        assert_eq!(entity.name, "User");
        assert_eq!(entity.identity_field, "id");
        assert_eq!(entity.fields.len(), 3);
        assert!(!entity.is_embedded());
    }

    #[test]
    fn test_get_field() {
        let entity = EntityDef::new("User", "id")
            .with_field(FieldDef::scalar("id", ScalarType::Uuid))
            .with_field(FieldDef::new("address", FieldType::embedded("Address")));

        assert!(entity.get_field("id").is_some());
        assert!(entity.get_field("address").is_some());
        assert!(entity.get_field("nonexistent").is_none());
        assert!(entity.get_identity_field().is_some());
    }

    #[test]
    fn test_embedded_type() {
        let address = EntityDef::embedded("Address")
            .with_field(FieldDef::scalar("city", ScalarType::String));
        assert!(address.is_embedded());
        assert!(address.get_identity_field().is_none());
    }
}
