//! Field definitions for entities.

use super::types::{FieldType, ScalarType};

/// A field definition within an entity.
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
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Field data type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether queries may order results by this field.
    #[serde(default = "default_sortable")]
    pub sortable: bool,
}

fn default_sortable() -> bool {
    true
}

impl FieldDef {
    /// Create a new field.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            sortable: true,
        }
    }

    /// Create a required scalar field.
    pub fn scalar(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self::new(name, FieldType::Scalar(scalar))
    }

    /// Create an optional scalar field.
    pub fn optional_scalar(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self::new(name, FieldType::OptionalScalar(scalar))
    }

    /// Forbid ordering by this field.
    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    /// Check if the field may be absent.
    pub fn is_nullable(&self) -> bool {
        self.field_type.is_nullable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_def_builder() {
        let field = FieldDef::scalar("id", ScalarType::Uuid);
        assert_eq!(field.name, "id");
        assert!(field.sortable);
        assert!(!field.is_nullable());

        let notes = FieldDef::optional_scalar("notes", ScalarType::String).unsortable();
        assert!(!notes.sortable);
        assert!(notes.is_nullable());
    }

    #[test]
    fn test_sortable_defaults_on_deserialize() {
        let field: FieldDef =
            serde_json::from_str(r#"{"name":"age","type":{"scalar":"int32"}}"#).unwrap();
        assert!(field.sortable);
        assert_eq!(field.field_type, FieldType::scalar(ScalarType::Int32));
    }
}
