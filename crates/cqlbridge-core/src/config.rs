//! Translator configuration.

use crate::resolve::DEFAULT_MAX_PATH_HOPS;
use cqlbridge_lang::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};

/// Default maximum query length in bytes.
pub const DEFAULT_MAX_QUERY_LENGTH: usize = 8 * 1024;

/// What the CQL `=` relation means for text attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EqualityMatch {
    /// The attribute contains the term.
    #[default]
    Contains,
    /// The attribute equals the term.
    Exact,
}

/// Translator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Semantics of `=` on text attributes.
    pub equality: EqualityMatch,

    /// Whether text comparisons respect case when no modifier says otherwise.
    pub case_sensitive: bool,

    /// Maximum parenthesis nesting depth.
    pub max_depth: usize,

    /// Maximum accepted query length in bytes.
    pub max_query_length: usize,

    /// Cache resolved field paths.
    pub cache_paths: bool,

    /// Maximum relation or embedded hops in a field path.
    pub max_path_hops: usize,
}

impl TranslatorConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self {
            equality: EqualityMatch::default(),
            case_sensitive: false,
            max_depth: DEFAULT_MAX_DEPTH,
            max_query_length: DEFAULT_MAX_QUERY_LENGTH,
            cache_paths: true,
            max_path_hops: DEFAULT_MAX_PATH_HOPS,
        }
    }

    /// Set the `=` semantics for text.
    pub fn with_equality(mut self, equality: EqualityMatch) -> Self {
        self.equality = equality;
        self
    }

    /// Set the default text case sensitivity.
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Set the maximum nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the maximum query length.
    pub fn with_max_query_length(mut self, max_query_length: usize) -> Self {
        self.max_query_length = max_query_length;
        self
    }

    /// Set the maximum number of hops in a field path.
    pub fn with_max_path_hops(mut self, max_path_hops: usize) -> Self {
        self.max_path_hops = max_path_hops;
        self
    }

    /// Enable or disable the field path cache.
    pub fn with_cache_paths(mut self, cache_paths: bool) -> Self {
        self.cache_paths = cache_paths;
        self
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TranslatorConfig::default();
        assert_eq!(config.equality, EqualityMatch::Contains);
        assert!(!config.case_sensitive);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.max_query_length, DEFAULT_MAX_QUERY_LENGTH);
        assert!(config.cache_paths);
        assert_eq!(config.max_path_hops, DEFAULT_MAX_PATH_HOPS);
    }

    #[test]
    fn test_config_builder() {
        let config = TranslatorConfig::new()
            .with_equality(EqualityMatch::Exact)
            .with_case_sensitive(true)
            .with_max_depth(4)
            .with_max_query_length(256)
            .with_cache_paths(false)
            .with_max_path_hops(2);

        assert_eq!(config.equality, EqualityMatch::Exact);
        assert!(config.case_sensitive);
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.max_query_length, 256);
        assert!(!config.cache_paths);
        assert_eq!(config.max_path_hops, 2);
    }

    #[test]
    fn test_partial_json() {
        let config: TranslatorConfig =
            serde_json::from_str(r#"{"equality":"exact","max_depth":8}"#).unwrap();
        assert_eq!(config.equality, EqualityMatch::Exact);
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.max_query_length, DEFAULT_MAX_QUERY_LENGTH);
    }
}
