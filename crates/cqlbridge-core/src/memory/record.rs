//! Nested records held by the in-memory store.

use crate::catalog::{EntityDef, FieldType, SchemaBundle};
use crate::coerce::{parse_date, parse_timestamp};
use crate::error::Error;
use chrono::{DateTime, Days, NaiveDate};
use cqlbridge_proto::{Value, ValueDomain};
use serde_json::{Map, Value as Json};
use std::collections::BTreeMap;

/// One attribute value of a record.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    /// A scalar or enum value.
    Scalar(Value),
    /// An embedded object.
    Object(Record),
    /// An array of scalars or embedded objects.
    List(Vec<Datum>),
}

impl From<Value> for Datum {
    fn from(value: Value) -> Self {
        Datum::Scalar(value)
    }
}

impl From<Record> for Datum {
    fn from(record: Record) -> Self {
        Datum::Object(record)
    }
}

impl<T: Into<Datum>> From<Vec<T>> for Datum {
    fn from(items: Vec<T>) -> Self {
        Datum::List(items.into_iter().map(Into::into).collect())
    }
}

/// A record: named attribute values, possibly nested.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Datum>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute (builder style).
    pub fn with(mut self, name: impl Into<String>, datum: impl Into<Datum>) -> Self {
        self.set(name, datum);
        self
    }

    /// Set an attribute.
    pub fn set(&mut self, name: impl Into<String>, datum: impl Into<Datum>) {
        self.fields.insert(name.into(), datum.into());
    }

    /// Get an attribute.
    pub fn get(&self, name: &str) -> Option<&Datum> {
        self.fields.get(name)
    }

    /// Get a scalar attribute.
    pub fn scalar(&self, name: &str) -> Option<&Value> {
        match self.fields.get(name)? {
            Datum::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Iterate over attributes in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Datum)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no attributes.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Read a JSON object as a record of `entity`, typing values by the
    /// entity's field definitions.
    ///
    /// Temporal values may be written as strings in any form the query
    /// language accepts; UUIDs as strings; enum members must be declared
    /// variants.
    pub fn from_json(schema: &SchemaBundle, entity: &str, json: &Json) -> Result<Self, Error> {
        let def = schema
            .get_entity(entity)
            .ok_or_else(|| Error::InvalidRecord(format!("unknown entity '{}'", entity)))?;
        let object = json.as_object().ok_or_else(|| {
            Error::InvalidRecord(format!("{} record must be a JSON object", entity))
        })?;
        object_to_record(schema, def, object)
    }

    /// Render the record as a JSON object.
    pub fn to_json(&self) -> Json {
        Json::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), datum_to_json(v)))
                .collect(),
        )
    }
}

fn object_to_record(
    schema: &SchemaBundle,
    def: &EntityDef,
    object: &Map<String, Json>,
) -> Result<Record, Error> {
    let mut record = Record::new();
    for (name, json) in object {
        let field = def.get_field(name).ok_or_else(|| {
            Error::InvalidRecord(format!("unknown field '{}' on entity '{}'", name, def.name))
        })?;
        let context = format!("{}.{}", def.name, name);
        let datum = field_datum(schema, &field.field_type, json, &context)?;
        record.set(name.clone(), datum);
    }
    Ok(record)
}

fn field_datum(
    schema: &SchemaBundle,
    field_type: &FieldType,
    json: &Json,
    context: &str,
) -> Result<Datum, Error> {
    if json.is_null() {
        return Ok(Datum::Scalar(Value::Null));
    }

    if field_type.is_array() {
        let items = json
            .as_array()
            .ok_or_else(|| Error::InvalidRecord(format!("{} must be an array", context)))?;
        let items = items
            .iter()
            .map(|item| element_datum(schema, field_type, item, context))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Datum::List(items));
    }

    element_datum(schema, field_type, json, context)
}

fn element_datum(
    schema: &SchemaBundle,
    field_type: &FieldType,
    json: &Json,
    context: &str,
) -> Result<Datum, Error> {
    if let Some(entity) = field_type.embedded_entity() {
        let def = schema.get_entity(entity).ok_or_else(|| {
            Error::InvalidRecord(format!("{} embeds unknown entity '{}'", context, entity))
        })?;
        let object = json
            .as_object()
            .ok_or_else(|| Error::InvalidRecord(format!("{} must be an object", context)))?;
        return Ok(Datum::Object(object_to_record(schema, def, object)?));
    }

    let domain = field_type
        .domain()
        .ok_or_else(|| Error::InvalidRecord(format!("{} has no value domain", context)))?;
    json_to_value(&domain, json)
        .map(Datum::Scalar)
        .ok_or_else(|| {
            Error::InvalidRecord(format!("{} cannot hold {} as {}", context, json, domain))
        })
}

fn json_to_value(domain: &ValueDomain, json: &Json) -> Option<Value> {
    if json.is_null() {
        return Some(Value::Null);
    }
    let value = match domain {
        ValueDomain::Text => Value::String(json.as_str()?.to_string()),
        ValueDomain::Int32 => Value::Int32(i32::try_from(json.as_i64()?).ok()?),
        ValueDomain::Int64 => Value::Int64(json.as_i64()?),
        ValueDomain::Float32 => Value::Float32(json.as_f64()? as f32),
        ValueDomain::Float64 => Value::Float64(json.as_f64()?),
        ValueDomain::Bool => Value::Bool(json.as_bool()?),
        ValueDomain::Timestamp => match json {
            Json::Number(n) => Value::Timestamp(n.as_i64()?),
            _ => Value::Timestamp(parse_timestamp(json.as_str()?)?),
        },
        ValueDomain::Date => Value::Date(parse_date(json.as_str()?)?),
        ValueDomain::Uuid => {
            let id = uuid::Uuid::parse_str(json.as_str()?).ok()?;
            Value::Uuid(*id.as_bytes())
        }
        ValueDomain::Enum { variants, .. } => {
            let s = json.as_str()?;
            Value::Enum(variants.iter().find(|v| v.as_str() == s)?.clone())
        }
    };
    Some(value)
}

fn datum_to_json(datum: &Datum) -> Json {
    match datum {
        Datum::Scalar(value) => value_to_json(value),
        Datum::Object(record) => record.to_json(),
        Datum::List(items) => Json::Array(items.iter().map(datum_to_json).collect()),
    }
}

/// Render a value as plain JSON, with temporal values and UUIDs as strings.
pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int32(n) => Json::from(*n),
        Value::Int64(n) => Json::from(*n),
        Value::Float32(f) => Json::from(f64::from(*f)),
        Value::Float64(f) => Json::from(*f),
        Value::String(s) | Value::Enum(s) => Json::String(s.clone()),
        Value::Timestamp(micros) => match DateTime::from_timestamp_micros(*micros) {
            Some(dt) => Json::String(dt.to_rfc3339()),
            None => Json::from(*micros),
        },
        Value::Date(days) => {
            let date = NaiveDate::from_ymd_opt(1970, 1, 1).and_then(|epoch| {
                if *days >= 0 {
                    epoch.checked_add_days(Days::new(u64::from(days.unsigned_abs())))
                } else {
                    epoch.checked_sub_days(Days::new(u64::from(days.unsigned_abs())))
                }
            });
            match date {
                Some(d) => Json::String(d.format("%Y-%m-%d").to_string()),
                None => Json::from(*days),
            }
        }
        Value::Uuid(bytes) => Json::String(uuid::Uuid::from_bytes(*bytes).hyphenated().to_string()),
    }
}
