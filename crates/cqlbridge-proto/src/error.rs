//! Protocol error types.

use thiserror::Error;

/// Errors raised while constructing protocol values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A pagination window that cannot be served.
    #[error("invalid page request: {0}")]
    InvalidPage(String),
}
