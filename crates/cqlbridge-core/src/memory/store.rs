//! In-memory execution gateway.

use super::eval::Evaluator;
use super::record::Record;
use crate::catalog::SchemaBundle;
use crate::error::Error;
use crate::gateway::ExecutionGateway;
use cqlbridge_proto::{PageRequest, Predicate, SortKey};
use parking_lot::RwLock;
use serde_json::Value as Json;
use std::collections::HashMap;
use std::convert::Infallible;
use tracing::debug;

/// Records per entity, held in memory and searched by full scan.
///
/// Rows of equal sort rank keep their insertion order, so windows over the
/// same query never overlap or skip rows.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Record>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to `entity`.
    pub fn insert(&self, entity: impl Into<String>, record: Record) {
        self.tables
            .write()
            .entry(entity.into())
            .or_default()
            .push(record);
    }

    /// Append many records to `entity`.
    pub fn extend(&self, entity: impl Into<String>, records: impl IntoIterator<Item = Record>) {
        self.tables
            .write()
            .entry(entity.into())
            .or_default()
            .extend(records);
    }

    /// Load `{"Entity": [{...}, ...], ...}` typed by `schema`.
    ///
    /// Returns the number of records loaded. Nothing is loaded if any record
    /// is invalid.
    pub fn load_json(&self, schema: &SchemaBundle, json: &Json) -> Result<usize, Error> {
        let object = json.as_object().ok_or_else(|| {
            Error::InvalidRecord("data must map entity names to record arrays".to_string())
        })?;

        let mut staged = Vec::with_capacity(object.len());
        for (entity, rows) in object {
            let rows = rows.as_array().ok_or_else(|| {
                Error::InvalidRecord(format!("records of '{}' must be an array", entity))
            })?;
            let records = rows
                .iter()
                .map(|row| Record::from_json(schema, entity, row))
                .collect::<Result<Vec<_>, _>>()?;
            staged.push((entity.clone(), records));
        }

        let loaded = staged.iter().map(|(_, records)| records.len()).sum();
        for (entity, records) in staged {
            self.extend(entity, records);
        }
        debug!(loaded, "loaded records");
        Ok(loaded)
    }

    /// Number of records of `entity`.
    pub fn len(&self, entity: &str) -> usize {
        self.tables.read().get(entity).map_or(0, Vec::len)
    }

    /// Check if the store holds no records at all.
    pub fn is_empty(&self) -> bool {
        self.tables.read().values().all(Vec::is_empty)
    }
}

impl ExecutionGateway for MemoryStore {
    type Entity = Record;
    type Error = Infallible;

    fn execute(
        &self,
        entity: &str,
        predicate: &Predicate,
        sort: &[SortKey],
        page: PageRequest,
    ) -> Result<Vec<Record>, Infallible> {
        let tables = self.tables.read();
        let eval = Evaluator::new(&tables);
        let Some(rows) = tables.get(entity) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<&Record> = rows
            .iter()
            .filter(|row| eval.matches(row, predicate))
            .collect();
        if !sort.is_empty() {
            matched.sort_by(|a, b| eval.compare_records(a, b, sort));
        }

        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let result: Vec<Record> = matched
            .into_iter()
            .skip(offset)
            .take(page.limit() as usize)
            .cloned()
            .collect();

        debug!(entity, rows = result.len(), "executed selection");
        Ok(result)
    }

    fn execute_count(&self, entity: &str, predicate: &Predicate) -> Result<u64, Infallible> {
        let tables = self.tables.read();
        let eval = Evaluator::new(&tables);
        let count = tables
            .get(entity)
            .map_or(0, |rows| rows.iter().filter(|row| eval.matches(row, predicate)).count());

        debug!(entity, count, "executed count");
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{EntityDef, FieldDef, ScalarType};
    use cqlbridge_proto::Value;
    use serde_json::json;

    fn schema() -> SchemaBundle {
        SchemaBundle::new(1).with_entity(
            EntityDef::new("User", "id")
                .with_field(FieldDef::scalar("id", ScalarType::Int64))
                .with_field(FieldDef::scalar("name", ScalarType::String)),
        )
    }

    #[test]
    fn test_insert_and_len() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        store.insert("User", Record::new().with("id", Value::Int64(1)));
        store.extend(
            "User",
            (2..=3).map(|i| Record::new().with("id", Value::Int64(i))),
        );
        assert_eq!(store.len("User"), 3);
        assert_eq!(store.len("Ghost"), 0);
    }

    #[test]
    fn test_load_json_is_atomic() {
        let store = MemoryStore::new();
        let bad = json!({"User": [{"id": 1, "name": "a"}, {"id": "two"}]});
        assert!(store.load_json(&schema(), &bad).is_err());
        assert!(store.is_empty());

        let good = json!({"User": [{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]});
        assert_eq!(store.load_json(&schema(), &good).unwrap(), 2);
        assert_eq!(store.len("User"), 2);
    }

    #[test]
    fn test_window_and_count() {
        let store = MemoryStore::new();
        store.extend(
            "User",
            (0..5).map(|i| Record::new().with("id", Value::Int64(i))),
        );

        let rows = store
            .execute(
                "User",
                &Predicate::MatchAll,
                &[],
                PageRequest::new(3, 10).unwrap(),
            )
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].scalar("id"), Some(&Value::Int64(3)));
        assert_eq!(store.execute_count("User", &Predicate::MatchAll).unwrap(), 5);
        assert_eq!(store.execute_count("Ghost", &Predicate::MatchAll).unwrap(), 0);
    }
}
