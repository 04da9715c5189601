//! `sortBy` clause translation.

use crate::catalog::AttributeGraph;
use crate::error::TranslateError;
use crate::resolve::FieldResolver;
use cqlbridge_lang::{ast, SortClause};
use cqlbridge_proto::{SortDirection, SortKey};

/// Resolve sort clauses into sort keys, keeping clause order as priority.
pub fn translate_sort<G: AttributeGraph>(
    resolver: &FieldResolver<G>,
    entity: &str,
    clauses: &[SortClause],
) -> Result<Vec<SortKey>, TranslateError> {
    clauses
        .iter()
        .map(|clause| {
            let field = &clause.field;
            let path = resolver
                .resolve(entity, &field.value)
                .map_err(|e| TranslateError::resolve(e, field.span))?;

            if !path.sortable {
                let reason = if path.collection {
                    "the path is collection-valued"
                } else {
                    "the attribute is not sortable"
                };
                return Err(TranslateError::UnsortableField {
                    field: field.value.clone(),
                    reason: reason.to_string(),
                    span: clause.span,
                });
            }

            Ok(SortKey {
                path: (*path).clone(),
                direction: direction(clause.direction),
            })
        })
        .collect()
}

fn direction(direction: ast::SortDirection) -> SortDirection {
    match direction {
        ast::SortDirection::Ascending => SortDirection::Ascending,
        ast::SortDirection::Descending => SortDirection::Descending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        EntityDef, FieldDef, FieldType, RelationDef, ScalarType, SchemaBundle,
    };
    use crate::error::ErrorKind;
    use std::sync::Arc;

    fn resolver() -> FieldResolver<SchemaBundle> {
        let schema = SchemaBundle::new(1)
            .with_entity(
                EntityDef::new("Book", "id")
                    .with_field(FieldDef::scalar("id", ScalarType::Int64))
                    .with_field(FieldDef::scalar("title", ScalarType::String))
                    .with_field(FieldDef::scalar("author_id", ScalarType::Int64))
                    .with_field(FieldDef::scalar("blurb", ScalarType::String).unsortable())
                    .with_field(FieldDef::new(
                        "keywords",
                        FieldType::array_scalar(ScalarType::String),
                    )),
            )
            .with_entity(
                EntityDef::new("Author", "id")
                    .with_field(FieldDef::scalar("id", ScalarType::Int64))
                    .with_field(FieldDef::scalar("name", ScalarType::String)),
            )
            .with_relation(RelationDef::many_to_one(
                "author", "Book", "author_id", "Author", "id",
            ));
        FieldResolver::new(Arc::new(schema))
    }

    fn sort(source: &str) -> Result<Vec<SortKey>, TranslateError> {
        let query = cqlbridge_lang::parse(source).unwrap();
        translate_sort(&resolver(), "Book", &query.sort)
    }

    #[test]
    fn test_sort_order_and_direction() {
        let keys = sort("title=x sortBy author.name/sort.descending title id/ascending").unwrap();
        let rendered: Vec<_> = keys
            .iter()
            .map(|k| (k.path.dotted(), k.direction))
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("author.name".to_string(), SortDirection::Descending),
                ("title".to_string(), SortDirection::Ascending),
                ("id".to_string(), SortDirection::Ascending),
            ]
        );
    }

    #[test]
    fn test_no_sort() {
        assert!(sort("title=x").unwrap().is_empty());
    }

    #[test]
    fn test_unsortable() {
        let err = sort("title=x sortBy blurb").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsortableField);
        assert!(err.to_string().contains("not sortable"));

        let err = sort("title=x sortBy keywords").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsortableField);
        assert!(err.to_string().contains("collection"));
    }

    #[test]
    fn test_unknown_sort_field() {
        let err = sort("sortBy nope").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownField);
    }
}
