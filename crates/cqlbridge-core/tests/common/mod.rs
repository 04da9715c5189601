//! Shared fixture: users with posts, tags, and embedded addresses.

#![allow(dead_code)]

use cqlbridge_core::catalog::{EntityDef, FieldDef, FieldType, RelationDef, ScalarType, SchemaBundle};
use cqlbridge_core::memory::{Datum, MemoryStore, Record};
use cqlbridge_core::proto::Value;
use cqlbridge_core::CqlTranslator;
use std::sync::Arc;

pub const USERS: i64 = 45;
pub const NAMES: [&str; 5] = ["Ann", "Bob", "John", "Johnny", "Mary"];
pub const CITIES: [&str; 3] = ["Paris", "Oslo", "Lima"];

pub fn schema() -> SchemaBundle {
    let user = EntityDef::new("User", "id")
        .with_field(FieldDef::scalar("id", ScalarType::Int64))
        .with_field(FieldDef::scalar("name", ScalarType::String))
        .with_field(FieldDef::scalar("age", ScalarType::Int32))
        .with_field(FieldDef::scalar("status", ScalarType::String))
        .with_field(FieldDef::scalar("active", ScalarType::Bool))
        .with_field(FieldDef::optional_scalar("joined", ScalarType::Date))
        .with_field(FieldDef::new("address", FieldType::embedded("Address")))
        .with_field(FieldDef::new(
            "nicknames",
            FieldType::array_scalar(ScalarType::String),
        ));

    let address = EntityDef::embedded("Address")
        .with_field(FieldDef::scalar("city", ScalarType::String))
        .with_field(FieldDef::scalar("zip", ScalarType::String));

    let post = EntityDef::new("Post", "id")
        .with_field(FieldDef::scalar("id", ScalarType::Int64))
        .with_field(FieldDef::scalar("title", ScalarType::String))
        .with_field(FieldDef::scalar("author_id", ScalarType::Int64))
        .with_field(FieldDef::scalar("published", ScalarType::Timestamp));

    let tag = EntityDef::new("Tag", "id")
        .with_field(FieldDef::scalar("id", ScalarType::Int64))
        .with_field(FieldDef::scalar("label", ScalarType::String));

    let user_tag = EntityDef::new("UserTag", "user_id")
        .with_field(FieldDef::scalar("user_id", ScalarType::Int64))
        .with_field(FieldDef::scalar("tag_id", ScalarType::Int64));

    SchemaBundle::new(1)
        .with_entity(user)
        .with_entity(address)
        .with_entity(post)
        .with_entity(tag)
        .with_entity(user_tag)
        .with_relation(RelationDef::many_to_one(
            "author", "Post", "author_id", "User", "id",
        ))
        .with_relation(RelationDef::one_to_many(
            "posts", "User", "id", "Post", "author_id",
        ))
        .with_relation(RelationDef::many_to_many(
            "tags", "User", "id", "Tag", "id", "UserTag",
        ))
}

/// User `i` (1-based): name cycles through `NAMES`, age is `20 + i`, every
/// third user is inactive and lives in Paris.
pub fn user(i: i64) -> Record {
    let idx = (i - 1) as usize;
    Record::new()
        .with("id", Value::Int64(i))
        .with("name", Value::from(NAMES[idx % NAMES.len()]))
        .with("age", Value::Int32(20 + i as i32))
        .with(
            "status",
            Value::from(if i % 3 == 0 { "inactive" } else { "active" }),
        )
        .with("active", Value::Bool(i % 3 != 0))
        .with("joined", Value::Null)
        .with(
            "address",
            Record::new()
                .with("city", Value::from(CITIES[i as usize % CITIES.len()]))
                .with("zip", Value::from(format!("{:05}", i))),
        )
        .with(
            "nicknames",
            Datum::List(vec![Datum::Scalar(Value::from(format!("nick{}", i)))]),
        )
}

pub fn store() -> MemoryStore {
    let store = MemoryStore::new();
    store.extend("User", (1..=USERS).map(user));
    store.extend(
        "Post",
        (1..=10).map(|i| {
            Record::new()
                .with("id", Value::Int64(100 + i))
                .with("author_id", Value::Int64(i))
                .with(
                    "title",
                    Value::from(if i % 2 == 0 { "Rust tips" } else { "Cooking" }),
                )
                .with("published", Value::Timestamp(1_700_000_000_000_000 + i))
        }),
    );
    store.extend(
        "Tag",
        [(1, "admin"), (2, "beta")].map(|(id, label)| {
            Record::new()
                .with("id", Value::Int64(id))
                .with("label", Value::from(label))
        }),
    );
    store.extend(
        "UserTag",
        [(1, 1), (2, 1), (2, 2)].map(|(user_id, tag_id)| {
            Record::new()
                .with("user_id", Value::Int64(user_id))
                .with("tag_id", Value::Int64(tag_id))
        }),
    );
    store
}

pub fn translator() -> Arc<CqlTranslator<SchemaBundle>> {
    Arc::new(CqlTranslator::new(Arc::new(schema())))
}

/// Ids of user records, in order.
pub fn ids(records: &[Record]) -> Vec<i64> {
    records
        .iter()
        .filter_map(|r| r.scalar("id").and_then(Value::as_i64))
        .collect()
}
