//! cqlbridge command-line tool
//!
//! Translates CQL queries against a JSON schema file and, given a JSON data
//! file, runs them against an in-memory store.

mod executor;
mod formatter;

use clap::Parser;
use cqlbridge_core::{EqualityMatch, TranslatorConfig};
use cqlbridge_proto::PageRequest;
use executor::{Executor, Mode};
use formatter::{create_formatter, OutputFormat};
use std::path::PathBuf;

/// `=` semantics for text attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Equality {
    /// The attribute contains the term.
    Contains,
    /// The attribute equals the term.
    Exact,
}

/// cqlbridge command-line tool
#[derive(Parser, Debug)]
#[command(name = "cqlbridge")]
#[command(version, about = "Translate and run CQL queries")]
pub struct Args {
    /// Schema file (JSON)
    #[arg(short, long)]
    pub schema: PathBuf,

    /// Root entity to query
    #[arg(short, long)]
    pub entity: String,

    /// CQL query
    #[arg(short, long, default_value = "")]
    pub query: String,

    /// Data file (JSON object mapping entity names to record arrays)
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// What to produce
    #[arg(long, default_value = "both", value_enum)]
    pub mode: Mode,

    /// Rows to skip
    #[arg(long, default_value_t = 0)]
    pub offset: u64,

    /// Maximum rows to return
    #[arg(long, default_value_t = 20)]
    pub limit: u32,

    /// Meaning of `=` on text
    #[arg(long, default_value = "contains", value_enum)]
    pub equality: Equality,

    /// Respect case in text comparisons unless a modifier says otherwise
    #[arg(long)]
    pub case_sensitive: bool,

    /// Maximum parenthesis nesting depth
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Maximum query length in bytes
    #[arg(long)]
    pub max_query_length: Option<usize>,

    /// Maximum relation or embedded hops in a field path
    #[arg(long)]
    pub max_path_hops: Option<usize>,

    /// Disable the resolved path cache
    #[arg(long)]
    pub no_cache: bool,

    /// Output format
    #[arg(long, default_value = "text", value_enum)]
    pub format: OutputFormat,
}

impl Args {
    fn config(&self) -> TranslatorConfig {
        let equality = match self.equality {
            Equality::Contains => EqualityMatch::Contains,
            Equality::Exact => EqualityMatch::Exact,
        };
        let mut config = TranslatorConfig::new()
            .with_equality(equality)
            .with_case_sensitive(self.case_sensitive)
            .with_cache_paths(!self.no_cache);
        if let Some(depth) = self.max_depth {
            config = config.with_max_depth(depth);
        }
        if let Some(length) = self.max_query_length {
            config = config.with_max_query_length(length);
        }
        if let Some(hops) = self.max_path_hops {
            config = config.with_max_path_hops(hops);
        }
        config
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cqlbridge=info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<String, executor::CliError> {
    let page = PageRequest::new(args.offset, args.limit)?;
    let executor = Executor::open(&args.schema, args.data.as_deref(), args.config())?;
    let formatter = create_formatter(args.format);
    executor.execute(&args.entity, &args.query, args.mode, page, formatter.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_to_config() {
        let args = Args::parse_from([
            "cqlbridge",
            "--schema",
            "schema.json",
            "--entity",
            "User",
            "--equality",
            "exact",
            "--case-sensitive",
            "--max-depth",
            "4",
            "--max-path-hops",
            "2",
            "--no-cache",
        ]);
        assert_eq!(args.mode, Mode::Both);
        assert_eq!(args.format, OutputFormat::Text);
        assert_eq!(args.limit, 20);

        let config = args.config();
        assert_eq!(config.equality, EqualityMatch::Exact);
        assert!(config.case_sensitive);
        assert_eq!(config.max_depth, 4);
        assert!(!config.cache_paths);
        assert_eq!(config.max_path_hops, 2);
        assert_eq!(
            config.max_query_length,
            TranslatorConfig::new().max_query_length
        );
    }

    #[test]
    fn test_zero_limit_is_rejected() {
        let args = Args::parse_from([
            "cqlbridge", "-s", "/nonexistent.json", "-e", "User", "--limit", "0",
        ]);
        assert!(matches!(run(&args), Err(executor::CliError::Page(_))));
    }
}
