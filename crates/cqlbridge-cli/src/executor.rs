//! Query translation and execution against a loaded schema.

use crate::formatter::Formatter;
use clap::ValueEnum;
use cqlbridge_core::catalog::{AttributeGraph, SchemaBundle};
use cqlbridge_core::gateway::{CqlRepository, RepositoryError};
use cqlbridge_core::{CqlTranslator, ErrorKind, MemoryStore, TranslateError, TranslatorConfig};
use cqlbridge_proto::PageRequest;
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// What to produce for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Filter and ordering (or the requested page of rows, with data).
    Selection,
    /// Filter only (or the number of matching rows, with data).
    Count,
    /// Both of the above.
    Both,
}

/// CLI errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// A file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid schema or data file.
    #[error("{0}")]
    Catalog(#[from] cqlbridge_core::Error),

    /// Malformed JSON data file.
    #[error("invalid data file: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid pagination window.
    #[error("{0}")]
    Page(#[from] cqlbridge_proto::Error),

    /// Query translation failed; holds the rendered diagnostic.
    #[error("{0}")]
    Translate(String),
}

/// A schema, an optional in-memory data set, and a translator over both.
pub struct Executor {
    schema: Arc<SchemaBundle>,
    repository: CqlRepository<SchemaBundle, MemoryStore>,
    has_data: bool,
}

impl Executor {
    /// Load the schema file and, if given, the data file.
    pub fn open(
        schema_path: &Path,
        data_path: Option<&Path>,
        config: TranslatorConfig,
    ) -> Result<Self, CliError> {
        let schema = Arc::new(SchemaBundle::from_json(&read(schema_path)?)?);
        info!(
            entities = schema.entities.len(),
            relations = schema.relations.len(),
            "loaded schema"
        );

        let store = MemoryStore::new();
        if let Some(path) = data_path {
            let json: serde_json::Value = serde_json::from_str(&read(path)?)?;
            let loaded = store.load_json(&schema, &json)?;
            info!(records = loaded, "loaded data");
        }

        let translator = CqlTranslator::with_config(Arc::clone(&schema), config);
        Ok(Self {
            schema,
            repository: CqlRepository::new(Arc::new(translator), store),
            has_data: data_path.is_some(),
        })
    }

    /// Translate (and, with data, run) `cql` against `entity`.
    pub fn execute(
        &self,
        entity: &str,
        cql: &str,
        mode: Mode,
        page: PageRequest,
        formatter: &dyn Formatter,
    ) -> Result<String, CliError> {
        if !self.has_data {
            let translation = self
                .repository
                .translator()
                .translate(entity, cql)
                .map_err(|e| self.diagnostic(entity, cql, e))?;
            return Ok(match mode {
                Mode::Selection => formatter.format_selection(&translation),
                Mode::Count => formatter.format_count_predicate(translation.count()),
                Mode::Both => format!(
                    "{}\n{}",
                    formatter.format_selection(&translation),
                    formatter.format_count_predicate(translation.count())
                ),
            });
        }

        match mode {
            Mode::Selection => {
                let page = self
                    .repository
                    .find_by_cql(entity, cql, page)
                    .map_err(|e| self.repository_error(entity, cql, e))?;
                Ok(formatter.format_page(&page))
            }
            Mode::Count => {
                let count = self
                    .repository
                    .count(entity, cql)
                    .map_err(|e| self.repository_error(entity, cql, e))?;
                Ok(formatter.format_count(count))
            }
            Mode::Both => {
                // The page already carries the total
                let page = self
                    .repository
                    .find_by_cql(entity, cql, page)
                    .map_err(|e| self.repository_error(entity, cql, e))?;
                Ok(format!(
                    "{}\n{}",
                    formatter.format_page(&page),
                    formatter.format_count(page.total)
                ))
            }
        }
    }

    fn repository_error(
        &self,
        entity: &str,
        cql: &str,
        err: RepositoryError<Infallible>,
    ) -> CliError {
        match err {
            RepositoryError::Translate(e) => self.diagnostic(entity, cql, e),
            RepositoryError::Gateway(never) => match never {},
        }
    }

    /// Render `err` against the query text, listing the entity's
    /// attributes when a field name was not found.
    fn diagnostic(&self, entity: &str, cql: &str, err: TranslateError) -> CliError {
        let mut message = err.format_with_source(cql);
        if err.kind() == ErrorKind::UnknownField {
            let names = self.schema.attribute_names(entity);
            if !names.is_empty() {
                message.push_str(&format!(
                    "\navailable fields on {}: {}",
                    entity,
                    names.join(", ")
                ));
            }
        }
        CliError::Translate(message)
    }
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}
