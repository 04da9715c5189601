//! Field-path resolution against the attribute graph.
//!
//! A CQL index name such as `owner.address.city` is resolved hop by hop
//! starting at the query's root entity. Relation hops become join steps,
//! embedded hops descend into inline objects, and the final hop must land on
//! a scalar or enum attribute.
//!
//! Resolved paths are pure functions of (entity, field) and the graph, so
//! they are cached for the lifetime of the resolver. Failed resolutions are
//! not cached. Paths are limited to a fixed number of hops, which keeps the
//! set of cacheable keys finite even over cyclic relations.

use crate::catalog::{Attribute, AttributeGraph};
use cqlbridge_proto::{AttributePath, JoinStep, PathStep, StepKind};
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::trace;

/// Default maximum number of hops before the final attribute.
pub const DEFAULT_MAX_PATH_HOPS: usize = 8;

/// Field resolution failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The root entity type does not exist.
    #[error("unknown entity '{entity}'")]
    UnknownEntity {
        /// Entity name as given.
        entity: String,
    },

    /// A hop of the field path does not exist.
    #[error("unknown field '{field}' on entity '{entity}'")]
    UnknownField {
        /// Root entity.
        entity: String,
        /// Full field name as written.
        field: String,
    },

    /// The path cannot denote a single comparable attribute.
    #[error("ambiguous field '{field}' on entity '{entity}': {reason}")]
    AmbiguousField {
        /// Root entity.
        entity: String,
        /// Full field name as written.
        field: String,
        /// Why the path is ambiguous.
        reason: String,
    },
}

/// Resolves dotted field names into [`AttributePath`]s, with caching.
pub struct FieldResolver<G: AttributeGraph> {
    graph: Arc<G>,
    cache: DashMap<(String, String), Arc<AttributePath>>,
    caching: bool,
    max_hops: usize,
}

impl<G: AttributeGraph> FieldResolver<G> {
    /// Create a caching resolver over `graph`.
    pub fn new(graph: Arc<G>) -> Self {
        Self {
            graph,
            cache: DashMap::new(),
            caching: true,
            max_hops: DEFAULT_MAX_PATH_HOPS,
        }
    }

    /// Enable or disable the path cache.
    pub fn with_caching(mut self, caching: bool) -> Self {
        self.caching = caching;
        self
    }

    /// Set the maximum number of relation or embedded hops in a path.
    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }

    /// The graph paths are resolved against.
    pub fn graph(&self) -> &Arc<G> {
        &self.graph
    }

    /// Resolve `field` on `entity`.
    pub fn resolve(&self, entity: &str, field: &str) -> Result<Arc<AttributePath>, ResolveError> {
        if !self.caching {
            return self.build(entity, field).map(Arc::new);
        }

        let key = (entity.to_string(), field.to_string());
        if let Some(hit) = self.cache.get(&key) {
            trace!(entity, field, "resolver cache hit");
            return Ok(Arc::clone(hit.value()));
        }

        trace!(entity, field, "resolver cache miss");
        let path = Arc::new(self.build(entity, field)?);
        // A concurrent build of the same key may have won; keep whichever
        // landed first so every caller shares one path.
        let stored = self.cache.entry(key).or_insert(path);
        Ok(Arc::clone(stored.value()))
    }

    /// Number of cached paths.
    pub fn cached_paths(&self) -> usize {
        self.cache.len()
    }

    /// Drop every cached path.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    fn build(&self, entity: &str, field: &str) -> Result<AttributePath, ResolveError> {
        if !self.graph.has_entity(entity) {
            return Err(ResolveError::UnknownEntity {
                entity: entity.to_string(),
            });
        }

        let unknown = || ResolveError::UnknownField {
            entity: entity.to_string(),
            field: field.to_string(),
        };
        let ambiguous = |reason: String| ResolveError::AmbiguousField {
            entity: entity.to_string(),
            field: field.to_string(),
            reason,
        };

        let segments: Vec<&str> = field.split('.').collect();
        if segments.len() - 1 > self.max_hops {
            return Err(ambiguous(format!(
                "paths may cross at most {} relations or embedded objects",
                self.max_hops
            )));
        }

        let mut current = entity.to_string();
        let mut steps = Vec::with_capacity(segments.len());
        let mut collection = false;
        let mut nullable = false;

        for (i, segment) in segments.iter().enumerate() {
            let last = i + 1 == segments.len();
            if segment.is_empty() {
                return Err(unknown());
            }

            let attribute = self.graph.attribute(&current, segment).ok_or_else(unknown)?;
            match attribute {
                Attribute::Field(def) => {
                    let many = def.field_type.is_array();
                    collection |= many;
                    nullable |= def.field_type.is_nullable();

                    if let Some(target) = def.field_type.embedded_entity() {
                        if last {
                            return Err(ambiguous(format!(
                                "'{}' is an embedded {}; name one of its fields",
                                segment,
                                if many { "collection" } else { "object" }
                            )));
                        }
                        steps.push(PathStep {
                            entity: current.clone(),
                            attribute: segment.to_string(),
                            kind: StepKind::Embedded {
                                entity: target.to_string(),
                                collection: many,
                            },
                        });
                        current = target.to_string();
                        continue;
                    }

                    if !last {
                        return Err(ambiguous(format!(
                            "'{}' is a plain attribute and has no sub-fields",
                            segment
                        )));
                    }
                    let domain = def
                        .field_type
                        .domain()
                        .ok_or_else(|| ambiguous(format!("'{}' has no value domain", segment)))?;

                    steps.push(PathStep {
                        entity: current.clone(),
                        attribute: segment.to_string(),
                        kind: StepKind::Attribute { collection: many },
                    });
                    return Ok(AttributePath {
                        entity: entity.to_string(),
                        steps,
                        domain,
                        nullable,
                        collection,
                        sortable: def.sortable && !collection,
                    });
                }
                Attribute::Relation(rel) => {
                    if last {
                        return Err(ambiguous(format!(
                            "'{}' is a relation to {}; name one of its fields",
                            segment, rel.to_entity
                        )));
                    }
                    collection |= rel.is_collection();
                    nullable = true;
                    steps.push(PathStep {
                        entity: current.clone(),
                        attribute: segment.to_string(),
                        kind: StepKind::Join(JoinStep {
                            relation: rel.name.clone(),
                            from_entity: rel.from_entity.clone(),
                            to_entity: rel.to_entity.clone(),
                            from_field: rel.from_field.clone(),
                            to_field: rel.to_field.clone(),
                            edge_entity: rel.edge_entity.clone(),
                            collection: rel.is_collection(),
                        }),
                    });
                    current = rel.to_entity.clone();
                }
            }
        }

        Err(unknown())
    }
}
