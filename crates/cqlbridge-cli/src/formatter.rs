//! Output formatters for translations and results.

use clap::ValueEnum;
use cqlbridge_core::memory::{value_to_json, Record};
use cqlbridge_core::Translation;
use cqlbridge_proto::{
    BooleanOp, MatchMode, Page, Predicate, SortDirection, SortKey, TypedValue,
};
use serde_json::json;
use std::fmt::Write;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Indented text tree
    Text,
    /// JSON format
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Trait for formatting output.
pub trait Formatter: Send + Sync {
    /// Format the selection form of a translation.
    fn format_selection(&self, translation: &Translation) -> String;

    /// Format the count form of a translation.
    fn format_count_predicate(&self, predicate: &Predicate) -> String;

    /// Format a page of records.
    fn format_page(&self, page: &Page<Record>) -> String;

    /// Format a count result.
    fn format_count(&self, count: u64) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Text formatter.
pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format_selection(&self, translation: &Translation) -> String {
        let mut output = String::from("selection:\n");
        write_predicate(&mut output, &translation.predicate, 1);
        if translation.sort.is_empty() {
            output.push_str("sort: (store order)\n");
        } else {
            output.push_str("sort:\n");
            for (i, key) in translation.sort.iter().enumerate() {
                let _ = writeln!(output, "  {}. {}", i + 1, format_sort_key(key));
            }
        }
        output
    }

    fn format_count_predicate(&self, predicate: &Predicate) -> String {
        let mut output = String::from("count:\n");
        write_predicate(&mut output, predicate, 1);
        output
    }

    fn format_page(&self, page: &Page<Record>) -> String {
        let mut output = String::new();
        for record in &page.content {
            let _ = writeln!(output, "{}", record.to_json());
        }
        let first = if page.is_empty() {
            0
        } else {
            page.request.offset() + 1
        };
        let last = page.request.offset() + page.len() as u64;
        let _ = write!(output, "rows {}-{} of {}", first, last, page.total);
        output
    }

    fn format_count(&self, count: u64) -> String {
        format!("{} row(s)", count)
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_selection(&self, translation: &Translation) -> String {
        pretty(&json!({
            "predicate": translation.predicate,
            "sort": translation.sort,
        }))
    }

    fn format_count_predicate(&self, predicate: &Predicate) -> String {
        pretty(&json!({ "predicate": predicate }))
    }

    fn format_page(&self, page: &Page<Record>) -> String {
        let rows: Vec<serde_json::Value> = page.content.iter().map(Record::to_json).collect();
        pretty(&json!({
            "offset": page.request.offset(),
            "limit": page.request.limit(),
            "total": page.total,
            "rows": rows,
        }))
    }

    fn format_count(&self, count: u64) -> String {
        json!({ "count": count }).to_string()
    }
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Append `predicate` as an indented tree.
fn write_predicate(output: &mut String, predicate: &Predicate, depth: usize) {
    let indent = "  ".repeat(depth);
    match predicate {
        Predicate::MatchAll => {
            let _ = writeln!(output, "{}match all", indent);
        }
        Predicate::Boolean { op, children } => {
            let _ = writeln!(output, "{}{}", indent, boolean_name(*op));
            for child in children {
                write_predicate(output, child, depth + 1);
            }
        }
        Predicate::Compare(cmp) => {
            let _ = writeln!(
                output,
                "{}{} {} {}{}",
                indent,
                cmp.path.dotted(),
                cmp.op,
                value_to_json(&cmp.value.value),
                describe_match(&cmp.value)
            );
        }
    }
}

fn boolean_name(op: BooleanOp) -> &'static str {
    match op {
        BooleanOp::And => "and",
        BooleanOp::Or => "or",
        BooleanOp::Not => "not",
    }
}

/// Bracketed match semantics for text terms; empty for typed terms.
fn describe_match(value: &TypedValue) -> String {
    if value.value.as_str().is_none() {
        return String::new();
    }
    let mode = match value.mode {
        MatchMode::Exact => "exact",
        MatchMode::Contains => "contains",
        MatchMode::Pattern => "pattern",
    };
    let case = if value.case_sensitive {
        "respect case"
    } else {
        "ignore case"
    };
    format!(" [{}, {}]", mode, case)
}

fn format_sort_key(key: &SortKey) -> String {
    let direction = match key.direction {
        SortDirection::Ascending => "ascending",
        SortDirection::Descending => "descending",
    };
    format!("{} {}", key.path.dotted(), direction)
}
