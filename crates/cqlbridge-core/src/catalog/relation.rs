//! Relation definitions between entities.
//!
//! A relation is named from its source entity's point of view and behaves
//! like an attribute of that entity: `Pet.owner` follows the `owner`
//! relation from `Pet` to `Person`.

/// Cardinality of a relation, seen from the source entity.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    rkyv::Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// Each source row has at most one target row, and vice versa.
    OneToOne,
    /// Many source rows share one target row (foreign key on the source).
    ManyToOne,
    /// One source row has many target rows (foreign key on the target).
    OneToMany,
    /// Many-to-many relation (requires edge/join entity).
    ManyToMany,
}

impl Cardinality {
    /// Whether following the relation can reach many target rows.
    pub fn is_collection(&self) -> bool {
        matches!(self, Cardinality::OneToMany | Cardinality::ManyToMany)
    }
}

/// A relation definition between two entities.
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
pub struct RelationDef {
    /// Relation name (unique within the source entity).
    pub name: String,
    /// Source entity name.
    pub from_entity: String,
    /// Target entity name.
    pub to_entity: String,
    /// Relation cardinality.
    pub cardinality: Cardinality,
    /// Join field on the source entity.
    pub from_field: String,
    /// Join field on the target entity.
    pub to_field: String,
    /// Edge entity for many-to-many relations.
    #[serde(default)]
    pub edge_entity: Option<String>,
}

impl RelationDef {
    fn with_cardinality(
        cardinality: Cardinality,
        name: impl Into<String>,
        from_entity: impl Into<String>,
        from_field: impl Into<String>,
        to_entity: impl Into<String>,
        to_field: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            from_entity: from_entity.into(),
            to_entity: to_entity.into(),
            cardinality,
            from_field: from_field.into(),
            to_field: to_field.into(),
            edge_entity: None,
        }
    }

    /// Create a one-to-one relation.
    pub fn one_to_one(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        from_field: impl Into<String>,
        to_entity: impl Into<String>,
        to_field: impl Into<String>,
    ) -> Self {
        Self::with_cardinality(
            Cardinality::OneToOne,
            name,
            from_entity,
            from_field,
            to_entity,
            to_field,
        )
    }

    /// Create a many-to-one relation.
    pub fn many_to_one(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        from_field: impl Into<String>,
        to_entity: impl Into<String>,
        to_field: impl Into<String>,
    ) -> Self {
        Self::with_cardinality(
            Cardinality::ManyToOne,
            name,
            from_entity,
            from_field,
            to_entity,
            to_field,
        )
    }

    /// Create a one-to-many relation.
    pub fn one_to_many(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        from_field: impl Into<String>,
        to_entity: impl Into<String>,
        to_field: impl Into<String>,
    ) -> Self {
        Self::with_cardinality(
            Cardinality::OneToMany,
            name,
            from_entity,
            from_field,
            to_entity,
            to_field,
        )
    }

    /// Create a many-to-many relation.
    pub fn many_to_many(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        from_field: impl Into<String>,
        to_entity: impl Into<String>,
        to_field: impl Into<String>,
        edge_entity: impl Into<String>,
    ) -> Self {
        let mut rel = Self::with_cardinality(
            Cardinality::ManyToMany,
            name,
            from_entity,
            from_field,
            to_entity,
            to_field,
        );
        rel.edge_entity = Some(edge_entity.into());
        rel
    }

    /// Check if this is a many-to-many relation.
    pub fn is_many_to_many(&self) -> bool {
        self.cardinality == Cardinality::ManyToMany
    }

    /// Whether following the relation can reach many target rows.
    pub fn is_collection(&self) -> bool {
        self.cardinality.is_collection()
    }

    /// Key under which the relation is stored in a schema bundle.
    pub fn key(&self) -> String {
        relation_key(&self.from_entity, &self.name)
    }
}

/// Build the bundle key for a relation named `name` on `entity`.
pub(crate) fn relation_key(entity: &str, name: &str) -> String {
    format!("{}.{}", entity, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_to_one_relation() {
        let rel = RelationDef::one_to_one("profile", "User", "id", "Profile", "user_id");

        assert_eq!(rel.cardinality, Cardinality::OneToOne);
        assert_eq!(rel.from_entity, "User");
        assert_eq!(rel.to_entity, "Profile");
        assert!(rel.edge_entity.is_none());
        assert!(!rel.is_collection());
    }

    #[test]
    fn test_one_to_many_relation() {
        let rel = RelationDef::one_to_many("posts", "User", "id", "Post", "author_id");

        assert_eq!(rel.cardinality, Cardinality::OneToMany);
        assert!(rel.is_collection());
        assert_eq!(rel.key(), "User.posts");
    }

    #[test]
    fn test_many_to_many_relation() {
        let rel = RelationDef::many_to_many("tags", "User", "id", "Tag", "id", "UserTagEdge");

        assert!(rel.is_many_to_many());
        assert!(rel.is_collection());
        assert_eq!(rel.edge_entity, Some("UserTagEdge".to_string()));
    }
}
