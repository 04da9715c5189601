//! AST to predicate translation.

use crate::catalog::AttributeGraph;
use crate::coerce::{coerce, compare_op};
use crate::config::TranslatorConfig;
use crate::error::TranslateError;
use crate::resolve::FieldResolver;
use cqlbridge_lang::{ast, Node, Relation};
use cqlbridge_proto::{BooleanOp, Comparison, Predicate};

/// Walks a parsed filter tree and produces the equivalent [`Predicate`].
///
/// Every relation is resolved and coerced on the way down; the first failure
/// aborts the whole build.
pub struct PredicateBuilder<'a, G: AttributeGraph> {
    resolver: &'a FieldResolver<G>,
    config: &'a TranslatorConfig,
    entity: &'a str,
}

impl<'a, G: AttributeGraph> PredicateBuilder<'a, G> {
    /// Create a builder for queries against `entity`.
    pub fn new(
        resolver: &'a FieldResolver<G>,
        config: &'a TranslatorConfig,
        entity: &'a str,
    ) -> Self {
        Self {
            resolver,
            config,
            entity,
        }
    }

    /// Build the predicate for an optional filter. No filter matches all.
    pub fn build(&self, filter: Option<&Node>) -> Result<Predicate, TranslateError> {
        match filter {
            Some(node) => self.build_node(node),
            None => Ok(Predicate::MatchAll),
        }
    }

    fn build_node(&self, node: &Node) -> Result<Predicate, TranslateError> {
        match node {
            Node::Boolean { op, children, .. } => {
                let children = children
                    .iter()
                    .map(|child| self.build_node(child))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Predicate::Boolean {
                    op: boolean_op(*op),
                    children,
                })
            }
            Node::Relation(relation) => self.build_relation(relation),
        }
    }

    fn build_relation(&self, relation: &Relation) -> Result<Predicate, TranslateError> {
        if relation.is_all_records() {
            return Ok(Predicate::MatchAll);
        }

        let path = self
            .resolver
            .resolve(self.entity, &relation.field.value)
            .map_err(|e| TranslateError::resolve(e, relation.field.span))?;

        let operator = relation.operator.value;
        let value = coerce(
            &path,
            &relation.value.value,
            operator,
            &relation.modifiers,
            self.config,
        )
        .map_err(|e| TranslateError::coerce(e, relation.span()))?;

        Ok(Predicate::Compare(Comparison {
            path: (*path).clone(),
            op: compare_op(operator),
            value,
        }))
    }
}

fn boolean_op(op: ast::BooleanOp) -> BooleanOp {
    match op {
        ast::BooleanOp::And => BooleanOp::And,
        ast::BooleanOp::Or => BooleanOp::Or,
        ast::BooleanOp::Not => BooleanOp::Not,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{EntityDef, FieldDef, ScalarType, SchemaBundle};
    use crate::error::ErrorKind;
    use cqlbridge_proto::{CompareOp, MatchMode, Value};
    use std::sync::Arc;

    fn resolver() -> FieldResolver<SchemaBundle> {
        let schema = SchemaBundle::new(1).with_entity(
            EntityDef::new("User", "id")
                .with_field(FieldDef::scalar("id", ScalarType::Int64))
                .with_field(FieldDef::scalar("name", ScalarType::String))
                .with_field(FieldDef::scalar("active", ScalarType::Bool)),
        );
        FieldResolver::new(Arc::new(schema))
    }

    fn build(source: &str) -> Result<Predicate, TranslateError> {
        let resolver = resolver();
        let config = TranslatorConfig::default();
        let query = cqlbridge_lang::parse(source).unwrap();
        PredicateBuilder::new(&resolver, &config, "User").build(query.filter.as_ref())
    }

    #[test]
    fn test_relation_leaf() {
        let predicate = build("name=John").unwrap();
        let Predicate::Compare(cmp) = predicate else {
            panic!("expected comparison");
        };
        assert_eq!(cmp.path.dotted(), "name");
        assert_eq!(cmp.op, CompareOp::Eq);
        assert_eq!(cmp.value.value, Value::String("John".into()));
        assert_eq!(cmp.value.mode, MatchMode::Contains);
        assert!(!cmp.value.case_sensitive);
    }

    #[test]
    fn test_boolean_structure_preserved() {
        let predicate = build("name=a or (id>1 and not active=true)").unwrap();
        let Predicate::Boolean { op, children } = &predicate else {
            panic!("expected boolean");
        };
        assert_eq!(*op, BooleanOp::Or);
        assert_eq!(children.len(), 2);
        let Predicate::Boolean { op, children } = &children[1] else {
            panic!("expected nested boolean");
        };
        assert_eq!(*op, BooleanOp::And);
        assert!(matches!(
            &children[1],
            Predicate::Boolean {
                op: BooleanOp::Not,
                ..
            }
        ));
        assert_eq!(predicate.leaf_count(), 3);
    }

    #[test]
    fn test_match_all() {
        assert!(build("cql.allRecords=1").unwrap().is_match_all());
        assert!(build("").unwrap().is_match_all());
        assert!(build("* sortBy name").unwrap().is_match_all());
    }

    #[test]
    fn test_error_spans() {
        let err = build("id=1 and nmae=John").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownField);
        assert_eq!(err.span().start, 9);
        assert_eq!(err.span().end, 13);

        let err = build("id=abc").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Coercion);
        assert_eq!(err.span().start, 0);
        assert_eq!(err.span().end, 6);

        let err = build("active<true").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedOperator);
    }
}
