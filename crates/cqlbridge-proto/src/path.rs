//! Resolved attribute paths.
//!
//! An [`AttributePath`] is the resolved form of a (possibly dotted) field
//! reference in a query. It records every hop taken through the entity's
//! attribute graph, the join implied by each relation hop, and the declared
//! domain of the terminal attribute.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value domain of a terminal attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueDomain {
    /// Free text.
    Text,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit floating point.
    Float32,
    /// 64-bit floating point.
    Float64,
    /// Boolean.
    Bool,
    /// Instant in time (microsecond precision).
    Timestamp,
    /// Calendar date.
    Date,
    /// UUID identifier.
    Uuid,
    /// Enumeration with a closed set of variants.
    Enum {
        /// Name of the enum type.
        name: String,
        /// Allowed variant values.
        variants: Vec<String>,
    },
}

impl ValueDomain {
    /// Check if this domain is text.
    pub fn is_text(&self) -> bool {
        matches!(self, ValueDomain::Text)
    }

    /// Check if this domain is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ValueDomain::Int32 | ValueDomain::Int64 | ValueDomain::Float32 | ValueDomain::Float64
        )
    }

    /// Check if values of this domain can be compared with `<`, `<=`, `>`, `>=`.
    pub fn is_ordered(&self) -> bool {
        self.is_text()
            || self.is_numeric()
            || matches!(self, ValueDomain::Timestamp | ValueDomain::Date)
    }
}

impl fmt::Display for ValueDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueDomain::Text => write!(f, "text"),
            ValueDomain::Int32 => write!(f, "int32"),
            ValueDomain::Int64 => write!(f, "int64"),
            ValueDomain::Float32 => write!(f, "float32"),
            ValueDomain::Float64 => write!(f, "float64"),
            ValueDomain::Bool => write!(f, "boolean"),
            ValueDomain::Timestamp => write!(f, "timestamp"),
            ValueDomain::Date => write!(f, "date"),
            ValueDomain::Uuid => write!(f, "uuid"),
            ValueDomain::Enum { name, .. } => write!(f, "enum {}", name),
        }
    }
}

/// A join between two entity types, implied by a relation hop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinStep {
    /// Name of the relation attribute on the source entity.
    pub relation: String,
    /// Source entity name.
    pub from_entity: String,
    /// Target entity name.
    pub to_entity: String,
    /// Join field on the source entity.
    pub from_field: String,
    /// Join field on the target entity.
    pub to_field: String,
    /// Edge entity for many-to-many relations.
    pub edge_entity: Option<String>,
    /// Whether the hop reaches many target rows per source row.
    pub collection: bool,
}

/// How a single hop is taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepKind {
    /// A scalar or enum attribute stored on the entity itself.
    Attribute {
        /// Whether the attribute holds an array of values.
        collection: bool,
    },
    /// A nested object stored inline with the entity.
    Embedded {
        /// Name of the embedded entity type.
        entity: String,
        /// Whether the attribute holds an array of objects.
        collection: bool,
    },
    /// A relation to another entity type.
    Join(JoinStep),
}

/// One hop of an attribute path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStep {
    /// Entity type the attribute belongs to.
    pub entity: String,
    /// Attribute name on that entity.
    pub attribute: String,
    /// How the hop is taken.
    pub kind: StepKind,
}

impl PathStep {
    /// Whether this hop fans out to many values.
    pub fn is_collection(&self) -> bool {
        match &self.kind {
            StepKind::Attribute { collection } => *collection,
            StepKind::Embedded { collection, .. } => *collection,
            StepKind::Join(join) => join.collection,
        }
    }
}

/// A resolved reference from a root entity to one of its (or a related
/// entity's) attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributePath {
    /// Root entity type the path starts from.
    pub entity: String,
    /// Hops in traversal order. Never empty.
    pub steps: Vec<PathStep>,
    /// Declared domain of the terminal attribute.
    pub domain: ValueDomain,
    /// Whether the terminal attribute may be absent.
    pub nullable: bool,
    /// Whether the path may yield more than one value per root row.
    pub collection: bool,
    /// Whether the catalog allows ordering by this path.
    pub sortable: bool,
}

impl AttributePath {
    /// Dotted form of the path (e.g. `owner.address.city`).
    pub fn dotted(&self) -> String {
        let names: Vec<&str> = self.steps.iter().map(|s| s.attribute.as_str()).collect();
        names.join(".")
    }

    /// The terminal attribute name.
    pub fn attribute(&self) -> &str {
        self.steps
            .last()
            .map(|s| s.attribute.as_str())
            .unwrap_or_default()
    }

    /// Number of hops in the path.
    pub fn depth(&self) -> usize {
        self.steps.len()
    }

    /// Whether the path leaves the root entity.
    pub fn is_nested(&self) -> bool {
        self.steps.len() > 1
    }

    /// Joins implied by relation hops, in traversal order.
    pub fn joins(&self) -> impl Iterator<Item = &JoinStep> {
        self.steps.iter().filter_map(|s| match &s.kind {
            StepKind::Join(join) => Some(join),
            _ => None,
        })
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entity, self.dotted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner_city() -> AttributePath {
        AttributePath {
            entity: "Pet".into(),
            steps: vec![
                PathStep {
                    entity: "Pet".into(),
                    attribute: "owner".into(),
                    kind: StepKind::Join(JoinStep {
                        relation: "owner".into(),
                        from_entity: "Pet".into(),
                        to_entity: "Person".into(),
                        from_field: "owner_id".into(),
                        to_field: "id".into(),
                        edge_entity: None,
                        collection: false,
                    }),
                },
                PathStep {
                    entity: "Person".into(),
                    attribute: "city".into(),
                    kind: StepKind::Attribute { collection: false },
                },
            ],
            domain: ValueDomain::Text,
            nullable: false,
            collection: false,
            sortable: true,
        }
    }

    #[test]
    fn test_path_helpers() {
        let path = owner_city();
        assert_eq!(path.dotted(), "owner.city");
        assert_eq!(path.attribute(), "city");
        assert_eq!(path.depth(), 2);
        assert!(path.is_nested());
        assert_eq!(path.joins().count(), 1);
        assert_eq!(path.to_string(), "Pet.owner.city");
    }

    #[test]
    fn test_domain_capabilities() {
        assert!(ValueDomain::Text.is_ordered());
        assert!(ValueDomain::Date.is_ordered());
        assert!(ValueDomain::Float32.is_numeric());
        assert!(!ValueDomain::Bool.is_ordered());
        assert!(!ValueDomain::Uuid.is_ordered());

        let status = ValueDomain::Enum {
            name: "Status".into(),
            variants: vec!["Open".into()],
        };
        assert!(!status.is_ordered());
        assert_eq!(status.to_string(), "enum Status");
    }
}
