//! Translation and in-memory execution benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cqlbridge_core::catalog::{EntityDef, FieldDef, RelationDef, ScalarType, SchemaBundle};
use cqlbridge_core::memory::{MemoryStore, Record};
use cqlbridge_core::proto::{PageRequest, Value};
use cqlbridge_core::{CqlRepository, CqlTranslator, TranslatorConfig};
use std::sync::Arc;

const QUERIES: [(&str, &str); 4] = [
    ("simple", "name=Alice_7"),
    ("conjunction", "age>30 and status==active"),
    (
        "nested",
        "(name=a* or name=b*) and not (age<20 or age>60) sortBy age/sort.descending name",
    ),
    ("join", "author.name==Alice_3 and title=rust sortBy author.age"),
];

fn schema() -> Arc<SchemaBundle> {
    Arc::new(
        SchemaBundle::new(1)
            .with_entity(
                EntityDef::new("User", "id")
                    .with_field(FieldDef::scalar("id", ScalarType::Int64))
                    .with_field(FieldDef::scalar("name", ScalarType::String))
                    .with_field(FieldDef::scalar("age", ScalarType::Int32))
                    .with_field(FieldDef::scalar("status", ScalarType::String)),
            )
            .with_entity(
                EntityDef::new("Post", "id")
                    .with_field(FieldDef::scalar("id", ScalarType::Int64))
                    .with_field(FieldDef::scalar("title", ScalarType::String))
                    .with_field(FieldDef::scalar("author_id", ScalarType::Int64)),
            )
            .with_relation(RelationDef::many_to_one(
                "author", "Post", "author_id", "User", "id",
            )),
    )
}

fn entity_for(query: &str) -> &'static str {
    if query.contains("author.") {
        "Post"
    } else {
        "User"
    }
}

fn bench_translate(c: &mut Criterion) {
    let mut group = c.benchmark_group("translate");

    let cached = CqlTranslator::new(schema());
    let uncached =
        CqlTranslator::with_config(schema(), TranslatorConfig::new().with_cache_paths(false));

    for (name, query) in QUERIES {
        let entity = entity_for(query);
        group.bench_with_input(BenchmarkId::new("cached", name), &query, |b, q| {
            b.iter(|| black_box(cached.translate(entity, q).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("uncached", name), &query, |b, q| {
            b.iter(|| black_box(uncached.translate(entity, q).unwrap()));
        });
    }

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for (name, query) in QUERIES {
        group.bench_with_input(BenchmarkId::from_parameter(name), &query, |b, q| {
            b.iter(|| black_box(cqlbridge_core::lang::parse(q).unwrap()));
        });
    }

    group.finish();
}

fn bench_execute(c: &mut Criterion) {
    let mut group = c.benchmark_group("execute");

    let store = MemoryStore::new();
    store.extend(
        "User",
        (0..10_000).map(|i| {
            Record::new()
                .with("id", Value::Int64(i))
                .with("name", Value::from(format!("Alice_{}", i % 100)))
                .with("age", Value::Int32((i % 80) as i32))
                .with(
                    "status",
                    Value::from(if i % 2 == 0 { "active" } else { "inactive" }),
                )
        }),
    );
    store.extend(
        "Post",
        (0..2_000).map(|i| {
            Record::new()
                .with("id", Value::Int64(i))
                .with("title", Value::from(format!("rust post {}", i)))
                .with("author_id", Value::Int64(i % 500))
        }),
    );
    let repo = CqlRepository::new(Arc::new(CqlTranslator::new(schema())), store);

    for (name, query) in QUERIES {
        let entity = entity_for(query);
        group.bench_with_input(BenchmarkId::from_parameter(name), &query, |b, q| {
            let page = PageRequest::first(50).unwrap();
            b.iter(|| black_box(repo.find_by_cql(entity, q, page).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_translate, bench_parse, bench_execute);
criterion_main!(benches);
