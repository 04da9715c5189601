//! Execution gateway contract and the CQL repository on top of it.
//!
//! The gateway is the store's side of the boundary: it runs a predicate with
//! sort keys and a window, or counts the matches of a predicate. The
//! repository translates CQL and drives the gateway, deriving page totals.

use crate::catalog::AttributeGraph;
use crate::error::TranslateError;
use crate::translate::CqlTranslator;
use cqlbridge_proto::{Page, PageRequest, Predicate, SortKey};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument};

/// Runs translated predicates against a store.
pub trait ExecutionGateway: Send + Sync {
    /// Row type produced by the store.
    type Entity;
    /// Store error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch the rows of `entity` matching `predicate`, ordered by `sort`,
    /// restricted to the `page` window.
    fn execute(
        &self,
        entity: &str,
        predicate: &Predicate,
        sort: &[SortKey],
        page: PageRequest,
    ) -> Result<Vec<Self::Entity>, Self::Error>;

    /// Count every row of `entity` matching `predicate`.
    fn execute_count(&self, entity: &str, predicate: &Predicate) -> Result<u64, Self::Error>;
}

/// Repository errors.
#[derive(Debug, Error)]
pub enum RepositoryError<E: std::error::Error + 'static> {
    /// The query did not translate. The gateway was not called.
    #[error("translation failed: {0}")]
    Translate(#[from] TranslateError),

    /// The gateway failed.
    #[error("gateway failed: {0}")]
    Gateway(#[source] E),
}

/// CQL search over an execution gateway.
pub struct CqlRepository<G: AttributeGraph, X: ExecutionGateway> {
    translator: Arc<CqlTranslator<G>>,
    gateway: X,
}

impl<G: AttributeGraph, X: ExecutionGateway> CqlRepository<G, X> {
    /// Create a repository.
    pub fn new(translator: Arc<CqlTranslator<G>>, gateway: X) -> Self {
        Self {
            translator,
            gateway,
        }
    }

    /// The translator.
    pub fn translator(&self) -> &Arc<CqlTranslator<G>> {
        &self.translator
    }

    /// The gateway.
    pub fn gateway(&self) -> &X {
        &self.gateway
    }

    /// Run `cql` against `entity` and return one page with the total count.
    ///
    /// The count query is skipped when the window itself shows the total: a
    /// short first page, or a short non-empty page further in.
    #[instrument(skip(self), level = "debug")]
    pub fn find_by_cql(
        &self,
        entity: &str,
        cql: &str,
        page: PageRequest,
    ) -> Result<Page<X::Entity>, RepositoryError<X::Error>> {
        let translation = self.translator.translate(entity, cql)?;

        let rows = self
            .gateway
            .execute(entity, &translation.predicate, &translation.sort, page)
            .map_err(RepositoryError::Gateway)?;

        let len = rows.len() as u64;
        let short = len < u64::from(page.limit());
        let total = if short && (page.offset() == 0 || len > 0) {
            page.offset() + len
        } else {
            self.gateway
                .execute_count(entity, &translation.predicate)
                .map_err(RepositoryError::Gateway)?
        };

        debug!(rows = len, total, "page fetched");
        Ok(Page::new(rows, total, page))
    }

    /// Count the rows of `entity` matching `cql`.
    #[instrument(skip(self), level = "debug")]
    pub fn count(&self, entity: &str, cql: &str) -> Result<u64, RepositoryError<X::Error>> {
        let predicate = self.translator.translate_for_count(entity, cql)?;
        self.gateway
            .execute_count(entity, &predicate)
            .map_err(RepositoryError::Gateway)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{EntityDef, FieldDef, ScalarType, SchemaBundle};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Gateway that pretends to hold `rows` matching rows and records calls.
    struct FixedGateway {
        rows: u64,
        executes: AtomicUsize,
        counts: AtomicUsize,
    }

    impl FixedGateway {
        fn new(rows: u64) -> Self {
            Self {
                rows,
                executes: AtomicUsize::new(0),
                counts: AtomicUsize::new(0),
            }
        }
    }

    impl ExecutionGateway for FixedGateway {
        type Entity = u64;
        type Error = std::io::Error;

        fn execute(
            &self,
            _entity: &str,
            _predicate: &Predicate,
            _sort: &[SortKey],
            page: PageRequest,
        ) -> Result<Vec<u64>, Self::Error> {
            self.executes.fetch_add(1, Ordering::SeqCst);
            Ok((page.offset()..page.end().min(self.rows)).collect())
        }

        fn execute_count(&self, _entity: &str, _predicate: &Predicate) -> Result<u64, Self::Error> {
            self.counts.fetch_add(1, Ordering::SeqCst);
            Ok(self.rows)
        }
    }

    fn repository(rows: u64) -> CqlRepository<SchemaBundle, FixedGateway> {
        let schema = SchemaBundle::new(1).with_entity(
            EntityDef::new("User", "id")
                .with_field(FieldDef::scalar("id", ScalarType::Int64))
                .with_field(FieldDef::scalar("name", ScalarType::String)),
        );
        CqlRepository::new(
            Arc::new(CqlTranslator::new(Arc::new(schema))),
            FixedGateway::new(rows),
        )
    }

    #[test]
    fn test_short_first_page_skips_count() {
        let repo = repository(4);
        let page = repo
            .find_by_cql("User", "name=a", PageRequest::first(10).unwrap())
            .unwrap();
        assert_eq!(page.total, 4);
        assert_eq!(page.len(), 4);
        assert_eq!(repo.gateway().counts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_short_last_page_skips_count() {
        let repo = repository(45);
        let page = repo
            .find_by_cql("User", "name=a", PageRequest::new(40, 10).unwrap())
            .unwrap();
        assert_eq!(page.total, 45);
        assert_eq!(page.len(), 5);
        assert!(!page.has_next());
        assert_eq!(repo.gateway().counts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_full_page_runs_count() {
        let repo = repository(45);
        let page = repo
            .find_by_cql("User", "name=a", PageRequest::new(20, 10).unwrap())
            .unwrap();
        assert_eq!(page.content, (20..30).collect::<Vec<_>>());
        assert_eq!(page.total, 45);
        assert!(page.has_next());
        assert_eq!(repo.gateway().counts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_page_past_end_runs_count() {
        let repo = repository(45);
        let page = repo
            .find_by_cql("User", "name=a", PageRequest::new(50, 10).unwrap())
            .unwrap();
        assert!(page.is_empty());
        assert_eq!(page.total, 45);
        assert_eq!(repo.gateway().counts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_translation_failure_skips_gateway() {
        let repo = repository(45);
        let err = repo
            .find_by_cql("User", "nmae=a", PageRequest::first(10).unwrap())
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Translate(_)));
        assert!(repo.count("User", "id=x").is_err());
        assert_eq!(repo.gateway().executes.load(Ordering::SeqCst), 0);
        assert_eq!(repo.gateway().counts.load(Ordering::SeqCst), 0);
    }
}
