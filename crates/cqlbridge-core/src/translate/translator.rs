//! The CQL translator entry point.

use super::builder::PredicateBuilder;
use super::sort::translate_sort;
use crate::catalog::AttributeGraph;
use crate::config::TranslatorConfig;
use crate::error::TranslateError;
use crate::resolve::FieldResolver;
use cqlbridge_lang::{CqlQuery, Parser};
use cqlbridge_proto::{Predicate, Selection, SortKey};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Both output forms of one translated query.
///
/// The count form is the selection predicate with the sort keys dropped, so
/// the two can never disagree on which records match.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    /// Filter predicate shared by both forms.
    pub predicate: Predicate,
    /// Sort keys in priority order.
    pub sort: Vec<SortKey>,
}

impl Translation {
    /// Selection form: predicate plus sort keys.
    pub fn selection(&self) -> Selection {
        Selection {
            predicate: self.predicate.clone(),
            sort: self.sort.clone(),
        }
    }

    /// Count form: predicate only.
    pub fn count(&self) -> &Predicate {
        &self.predicate
    }

    /// Consume into the selection form.
    pub fn into_selection(self) -> Selection {
        Selection {
            predicate: self.predicate,
            sort: self.sort,
        }
    }

    /// Consume into the count form.
    pub fn into_count(self) -> Predicate {
        self.predicate
    }
}

/// Translates CQL query strings into predicates over an attribute graph.
///
/// The translator holds no per-call state; share one behind an `Arc` across
/// threads. Resolved field paths are cached across calls.
pub struct CqlTranslator<G: AttributeGraph> {
    resolver: FieldResolver<G>,
    config: TranslatorConfig,
}

impl<G: AttributeGraph> CqlTranslator<G> {
    /// Create a translator with the default configuration.
    pub fn new(graph: Arc<G>) -> Self {
        Self::with_config(graph, TranslatorConfig::default())
    }

    /// Create a translator with an explicit configuration.
    pub fn with_config(graph: Arc<G>, config: TranslatorConfig) -> Self {
        Self {
            resolver: FieldResolver::new(graph)
                .with_caching(config.cache_paths)
                .with_max_hops(config.max_path_hops),
            config,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// The field resolver.
    pub fn resolver(&self) -> &FieldResolver<G> {
        &self.resolver
    }

    /// Translate `cql` against `entity` into both output forms.
    #[instrument(skip(self), level = "debug")]
    pub fn translate(&self, entity: &str, cql: &str) -> Result<Translation, TranslateError> {
        let query = self.parse(cql)?;

        let predicate = PredicateBuilder::new(&self.resolver, &self.config, entity)
            .build(query.filter.as_ref())?;
        let sort = translate_sort(&self.resolver, entity, &query.sort)?;

        debug!(
            leaves = predicate.leaf_count(),
            sort_keys = sort.len(),
            "translated query"
        );
        Ok(Translation { predicate, sort })
    }

    /// Translate into the selection form: predicate plus sort keys.
    pub fn translate_for_selection(
        &self,
        entity: &str,
        cql: &str,
    ) -> Result<Selection, TranslateError> {
        self.translate(entity, cql).map(Translation::into_selection)
    }

    /// Translate into the count form: the same predicate, no sort.
    ///
    /// Sort keys are still resolved so that a query rejected for selection is
    /// rejected for counting too.
    pub fn translate_for_count(&self, entity: &str, cql: &str) -> Result<Predicate, TranslateError> {
        self.translate(entity, cql).map(Translation::into_count)
    }

    fn parse(&self, cql: &str) -> Result<CqlQuery, TranslateError> {
        if cql.len() > self.config.max_query_length {
            return Err(TranslateError::TooLong {
                length: cql.len(),
                limit: self.config.max_query_length,
            });
        }
        let query = Parser::new(cql)
            .with_max_depth(self.config.max_depth)
            .parse_query()?;
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{EntityDef, FieldDef, RelationDef, ScalarType, SchemaBundle};
    use crate::config::EqualityMatch;
    use crate::error::ErrorKind;
    use cqlbridge_proto::{MatchMode, Value};

    fn schema() -> Arc<SchemaBundle> {
        Arc::new(
            SchemaBundle::new(1).with_entity(
                EntityDef::new("User", "id")
                    .with_field(FieldDef::scalar("id", ScalarType::Int64))
                    .with_field(FieldDef::scalar("name", ScalarType::String)),
            ),
        )
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_translator_is_send_sync() {
        assert_send_sync::<CqlTranslator<SchemaBundle>>();
    }

    #[test]
    fn test_selection_and_count_agree() {
        let translator = CqlTranslator::new(schema());
        let cql = "name=ann or id>3 sortBy name/sort.descending";
        let selection = translator.translate_for_selection("User", cql).unwrap();
        let count = translator.translate_for_count("User", cql).unwrap();
        assert_eq!(selection.predicate, count);
        assert_eq!(selection.sort.len(), 1);
    }

    #[test]
    fn test_equality_policy() {
        let translator = CqlTranslator::with_config(
            schema(),
            TranslatorConfig::new().with_equality(EqualityMatch::Exact),
        );
        let Predicate::Compare(cmp) = translator.translate_for_count("User", "name=ann").unwrap()
        else {
            panic!("expected comparison");
        };
        assert_eq!(cmp.value.mode, MatchMode::Exact);
        assert_eq!(cmp.value.value, Value::String("ann".into()));
    }

    #[test]
    fn test_query_too_long() {
        let translator = CqlTranslator::with_config(
            schema(),
            TranslatorConfig::new().with_max_query_length(8),
        );
        let err = translator
            .translate("User", "name=something long")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(matches!(err, TranslateError::TooLong { limit: 8, .. }));
    }

    #[test]
    fn test_max_depth_from_config() {
        let translator =
            CqlTranslator::with_config(schema(), TranslatorConfig::new().with_max_depth(1));
        assert!(translator.translate("User", "(name=a)").is_ok());
        let err = translator.translate("User", "((name=a))").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_unknown_entity() {
        let translator = CqlTranslator::new(schema());
        let err = translator.translate("Ghost", "name=a").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownEntity);
    }

    #[test]
    fn test_path_hop_limit() {
        let schema = Arc::new(
            SchemaBundle::new(1)
                .with_entity(
                    EntityDef::new("User", "id")
                        .with_field(FieldDef::scalar("id", ScalarType::Int64)),
                )
                .with_entity(
                    EntityDef::new("Post", "id")
                        .with_field(FieldDef::scalar("id", ScalarType::Int64))
                        .with_field(FieldDef::scalar("title", ScalarType::String))
                        .with_field(FieldDef::scalar("author_id", ScalarType::Int64)),
                )
                .with_relation(RelationDef::many_to_one(
                    "author", "Post", "author_id", "User", "id",
                ))
                .with_relation(RelationDef::one_to_many(
                    "posts", "User", "id", "Post", "author_id",
                )),
        );
        let translator =
            CqlTranslator::with_config(schema, TranslatorConfig::new().with_max_path_hops(1));

        let mut field = String::from("posts.title");
        for i in 0..50 {
            let result = translator.translate("User", &format!("{}=x", field));
            if i == 0 {
                assert!(result.is_ok());
            } else {
                assert_eq!(result.unwrap_err().kind(), ErrorKind::AmbiguousField);
            }
            field = format!("posts.author.{}", field);
        }
        assert_eq!(translator.resolver().cached_paths(), 1);
    }

    #[test]
    fn test_cache_toggle() {
        let cached = CqlTranslator::new(schema());
        cached.translate("User", "name=a and id=1").unwrap();
        assert_eq!(cached.resolver().cached_paths(), 2);

        let uncached =
            CqlTranslator::with_config(schema(), TranslatorConfig::new().with_cache_paths(false));
        uncached.translate("User", "name=a and id=1").unwrap();
        assert_eq!(uncached.resolver().cached_paths(), 0);
    }
}
