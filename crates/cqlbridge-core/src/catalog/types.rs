//! Core type definitions for the catalog.

use cqlbridge_proto::ValueDomain;

/// Scalar data types an attribute may declare.
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
pub enum ScalarType {
    /// Boolean value.
    Bool,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit floating point.
    Float32,
    /// 64-bit floating point.
    Float64,
    /// UTF-8 string.
    String,
    /// Timestamp (microseconds since Unix epoch).
    Timestamp,
    /// Calendar date (days since Unix epoch).
    Date,
    /// UUID (128-bit identifier).
    Uuid,
}

/// Field types - flat representation without recursion.
///
/// Nested optional/array types are not supported. Use an embedded entity
/// type for structured values.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    rkyv::Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// A scalar value.
    Scalar(ScalarType),
    /// An optional scalar value (nullable).
    OptionalScalar(ScalarType),
    /// An array of scalar values.
    ArrayScalar(ScalarType),
    /// An enumeration type.
    Enum {
        /// Name of the enum type.
        name: String,
        /// Allowed variant values.
        variants: Vec<String>,
    },
    /// An optional enumeration.
    OptionalEnum {
        /// Name of the enum type.
        name: String,
        /// Allowed variant values.
        variants: Vec<String>,
    },
    /// An embedded entity (nested object).
    Embedded {
        /// Name of the embedded entity type.
        entity: String,
    },
    /// An optional embedded entity.
    OptionalEmbedded {
        /// Name of the embedded entity type.
        entity: String,
    },
    /// An array of embedded entities.
    ArrayEmbedded {
        /// Name of the embedded entity type.
        entity: String,
    },
}

impl ScalarType {
    /// The value domain literals are coerced into.
    pub fn domain(&self) -> ValueDomain {
        match self {
            ScalarType::Bool => ValueDomain::Bool,
            ScalarType::Int32 => ValueDomain::Int32,
            ScalarType::Int64 => ValueDomain::Int64,
            ScalarType::Float32 => ValueDomain::Float32,
            ScalarType::Float64 => ValueDomain::Float64,
            ScalarType::String => ValueDomain::Text,
            ScalarType::Timestamp => ValueDomain::Timestamp,
            ScalarType::Date => ValueDomain::Date,
            ScalarType::Uuid => ValueDomain::Uuid,
        }
    }
}

impl FieldType {
    /// Create a scalar field type.
    pub fn scalar(scalar: ScalarType) -> Self {
        FieldType::Scalar(scalar)
    }

    /// Create an optional scalar field type.
    pub fn optional_scalar(scalar: ScalarType) -> Self {
        FieldType::OptionalScalar(scalar)
    }

    /// Create an array of scalars field type.
    pub fn array_scalar(scalar: ScalarType) -> Self {
        FieldType::ArrayScalar(scalar)
    }

    /// Create an enum field type.
    pub fn enum_type(name: impl Into<String>, variants: Vec<String>) -> Self {
        FieldType::Enum {
            name: name.into(),
            variants,
        }
    }

    /// Create an embedded entity field type.
    pub fn embedded(entity: impl Into<String>) -> Self {
        FieldType::Embedded {
            entity: entity.into(),
        }
    }

    /// Create an array of embedded entities field type.
    pub fn array_embedded(entity: impl Into<String>) -> Self {
        FieldType::ArrayEmbedded {
            entity: entity.into(),
        }
    }

    /// Check if this type is nullable.
    pub fn is_nullable(&self) -> bool {
        matches!(
            self,
            FieldType::OptionalScalar(_)
                | FieldType::OptionalEnum { .. }
                | FieldType::OptionalEmbedded { .. }
        )
    }

    /// Check if this type is an array.
    pub fn is_array(&self) -> bool {
        matches!(
            self,
            FieldType::ArrayScalar(_) | FieldType::ArrayEmbedded { .. }
        )
    }

    /// Get the embedded entity type name, if any.
    pub fn embedded_entity(&self) -> Option<&str> {
        match self {
            FieldType::Embedded { entity }
            | FieldType::OptionalEmbedded { entity }
            | FieldType::ArrayEmbedded { entity } => Some(entity),
            _ => None,
        }
    }

    /// The value domain of a terminal attribute of this type.
    ///
    /// Embedded types have no domain of their own.
    pub fn domain(&self) -> Option<ValueDomain> {
        match self {
            FieldType::Scalar(s) | FieldType::OptionalScalar(s) | FieldType::ArrayScalar(s) => {
                Some(s.domain())
            }
            FieldType::Enum { name, variants } | FieldType::OptionalEnum { name, variants } => {
                Some(ValueDomain::Enum {
                    name: name.clone(),
                    variants: variants.clone(),
                })
            }
            FieldType::Embedded { .. }
            | FieldType::OptionalEmbedded { .. }
            | FieldType::ArrayEmbedded { .. } => None,
        }
    }
}
