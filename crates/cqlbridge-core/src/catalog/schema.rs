//! Schema bundle - versioned snapshot of the attribute graph.

use super::relation::relation_key;
use super::{EntityDef, FieldType, RelationDef};
use crate::error::Error;
use std::collections::HashMap;

/// A versioned snapshot of every entity and relation the translator can see.
///
/// Relations are keyed by `Entity.name`, so two entities may each declare a
/// relation with the same name.
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
#[serde(from = "SchemaFile", into = "SchemaFile")]
pub struct SchemaBundle {
    /// Schema version (monotonically increasing).
    pub version: u64,
    /// Creation timestamp (microseconds since Unix epoch).
    pub created_at: u64,
    /// Entity definitions keyed by name.
    pub entities: HashMap<String, EntityDef>,
    /// Relation definitions keyed by `Entity.name`.
    pub relations: HashMap<String, RelationDef>,
}

/// On-disk JSON layout: plain lists instead of keyed maps.
#[derive(serde::Serialize, serde::Deserialize)]
struct SchemaFile {
    #[serde(default)]
    version: u64,
    #[serde(default)]
    created_at: u64,
    #[serde(default)]
    entities: Vec<EntityDef>,
    #[serde(default)]
    relations: Vec<RelationDef>,
}

impl From<SchemaFile> for SchemaBundle {
    fn from(file: SchemaFile) -> Self {
        let mut bundle = SchemaBundle {
            version: file.version,
            created_at: file.created_at,
            entities: HashMap::new(),
            relations: HashMap::new(),
        };
        for entity in file.entities {
            bundle = bundle.with_entity(entity);
        }
        for relation in file.relations {
            bundle = bundle.with_relation(relation);
        }
        bundle
    }
}

impl From<SchemaBundle> for SchemaFile {
    fn from(bundle: SchemaBundle) -> Self {
        let mut entities: Vec<EntityDef> = bundle.entities.into_values().collect();
        entities.sort_by(|a, b| a.name.cmp(&b.name));
        let mut relations: Vec<RelationDef> = bundle.relations.into_values().collect();
        relations.sort_by_key(|r| r.key());
        SchemaFile {
            version: bundle.version,
            created_at: bundle.created_at,
            entities,
            relations,
        }
    }
}

impl SchemaBundle {
    /// Create an empty schema bundle.
    pub fn new(version: u64) -> Self {
        Self {
            version,
            created_at: chrono::Utc::now().timestamp_micros().max(0) as u64,
            entities: HashMap::new(),
            relations: HashMap::new(),
        }
    }

    /// Add an entity to the schema.
    pub fn with_entity(mut self, entity: EntityDef) -> Self {
        self.entities.insert(entity.name.clone(), entity);
        self
    }

    /// Add a relation to the schema.
    pub fn with_relation(mut self, relation: RelationDef) -> Self {
        self.relations.insert(relation.key(), relation);
        self
    }

    /// Get an entity by name.
    pub fn get_entity(&self, name: &str) -> Option<&EntityDef> {
        self.entities.get(name)
    }

    /// Get the relation named `name` declared on `entity`.
    pub fn get_relation(&self, entity: &str, name: &str) -> Option<&RelationDef> {
        self.relations.get(&relation_key(entity, name))
    }

    /// Get all relations for an entity (as source).
    pub fn relations_from(&self, entity: &str) -> Vec<&RelationDef> {
        self.relations
            .values()
            .filter(|r| r.from_entity == entity)
            .collect()
    }

    /// Check that every reference in the schema points at something real.
    pub fn validate(&self) -> Result<(), Error> {
        for entity in self.entities.values() {
            if !entity.is_embedded() && entity.get_identity_field().is_none() {
                return Err(Error::InvalidSchema(format!(
                    "entity '{}' has no identity field '{}'",
                    entity.name, entity.identity_field
                )));
            }
            for field in &entity.fields {
                match &field.field_type {
                    FieldType::Enum { name, variants }
                    | FieldType::OptionalEnum { name, variants }
                        if variants.is_empty() =>
                    {
                        return Err(Error::InvalidSchema(format!(
                            "enum '{}' on '{}.{}' has no variants",
                            name, entity.name, field.name
                        )));
                    }
                    other => {
                        if let Some(target) = other.embedded_entity() {
                            if !self.entities.contains_key(target) {
                                return Err(Error::InvalidSchema(format!(
                                    "field '{}.{}' embeds unknown type '{}'",
                                    entity.name, field.name, target
                                )));
                            }
                        }
                    }
                }
            }
        }

        for relation in self.relations.values() {
            let from = self.get_entity(&relation.from_entity).ok_or_else(|| {
                Error::InvalidSchema(format!(
                    "relation '{}' starts at unknown entity '{}'",
                    relation.key(),
                    relation.from_entity
                ))
            })?;
            let to = self.get_entity(&relation.to_entity).ok_or_else(|| {
                Error::InvalidSchema(format!(
                    "relation '{}' targets unknown entity '{}'",
                    relation.key(),
                    relation.to_entity
                ))
            })?;
            if from.get_field(&relation.name).is_some() {
                return Err(Error::InvalidSchema(format!(
                    "relation '{}' shadows a field of the same name",
                    relation.key()
                )));
            }
            if from.get_field(&relation.from_field).is_none() {
                return Err(Error::InvalidSchema(format!(
                    "relation '{}' joins on unknown field '{}.{}'",
                    relation.key(),
                    from.name,
                    relation.from_field
                )));
            }
            if to.get_field(&relation.to_field).is_none() {
                return Err(Error::InvalidSchema(format!(
                    "relation '{}' joins on unknown field '{}.{}'",
                    relation.key(),
                    to.name,
                    relation.to_field
                )));
            }
            if relation.is_many_to_many() && relation.edge_entity.is_none() {
                return Err(Error::InvalidSchema(format!(
                    "many-to-many relation '{}' needs an edge entity",
                    relation.key()
                )));
            }
        }

        Ok(())
    }

    /// Parse and validate a schema from JSON.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let bundle: SchemaBundle = serde_json::from_str(json)?;
        bundle.validate()?;
        Ok(bundle)
    }

    /// Render the schema as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serialize the schema bundle to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|v| v.to_vec())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a schema bundle from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(bytes)
            .map_err(|e| Error::Deserialization(e.to_string()))
    }
}

impl Default for SchemaBundle {
    fn default() -> Self {
        Self::new(0)
    }
}
