//! Predicate evaluation over in-memory records.
//!
//! Paths are followed hop by hop; a comparison holds when any value reached
//! by the path satisfies it. `<>` holds when values exist and none of them
//! equals the term.

use super::record::{Datum, Record};
use cqlbridge_proto::{
    BooleanOp, CompareOp, Comparison, MatchMode, PathStep, Predicate, SortDirection, SortKey,
    StepKind, TypedValue, Value,
};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Evaluates predicates against records of one store snapshot.
pub struct Evaluator<'a> {
    tables: &'a HashMap<String, Vec<Record>>,
}

impl<'a> Evaluator<'a> {
    /// Create an evaluator over `tables` (entity name to records).
    pub fn new(tables: &'a HashMap<String, Vec<Record>>) -> Self {
        Self { tables }
    }

    /// Check whether `record` satisfies `predicate`.
    pub fn matches(&self, record: &'a Record, predicate: &Predicate) -> bool {
        match predicate {
            Predicate::MatchAll => true,
            Predicate::Boolean { op, children } => match op {
                BooleanOp::And => children.iter().all(|c| self.matches(record, c)),
                BooleanOp::Or => children.iter().any(|c| self.matches(record, c)),
                BooleanOp::Not => !children.iter().all(|c| self.matches(record, c)),
            },
            Predicate::Compare(cmp) => self.compare(record, cmp),
        }
    }

    fn compare(&self, record: &'a Record, cmp: &Comparison) -> bool {
        let values = self.values(record, &cmp.path.steps);
        match cmp.op {
            CompareOp::Ne => {
                !values.is_empty() && !values.iter().any(|v| test(v, CompareOp::Eq, &cmp.value))
            }
            op => values.iter().any(|v| test(v, op, &cmp.value)),
        }
    }

    /// Collect every non-null value reached from `record` along `steps`.
    pub fn values(&self, record: &'a Record, steps: &[PathStep]) -> Vec<&'a Value> {
        let mut out = Vec::new();
        self.collect(record, steps, &mut out);
        out
    }

    fn collect(&self, record: &'a Record, steps: &[PathStep], out: &mut Vec<&'a Value>) {
        let Some((step, rest)) = steps.split_first() else {
            return;
        };

        match &step.kind {
            StepKind::Attribute { .. } => {
                if let Some(datum) = record.get(&step.attribute) {
                    collect_scalars(datum, out);
                }
            }
            StepKind::Embedded { .. } => {
                if let Some(datum) = record.get(&step.attribute) {
                    for object in objects(datum) {
                        self.collect(object, rest, out);
                    }
                }
            }
            StepKind::Join(join) => {
                let Some(key) = record.scalar(&join.from_field).filter(|v| !v.is_null()) else {
                    return;
                };
                let targets = self.table(&join.to_entity);

                match &join.edge_entity {
                    Some(edge) => {
                        let source_column = edge_column(&join.from_entity, &join.from_field);
                        let target_column = edge_column(&join.to_entity, &join.to_field);
                        for link in self.table(edge) {
                            if !link
                                .scalar(&source_column)
                                .is_some_and(|v| values_equal(v, key))
                            {
                                continue;
                            }
                            let Some(target_key) = link.scalar(&target_column) else {
                                continue;
                            };
                            for target in targets {
                                if target
                                    .scalar(&join.to_field)
                                    .is_some_and(|v| values_equal(v, target_key))
                                {
                                    self.collect(target, rest, out);
                                }
                            }
                        }
                    }
                    None => {
                        for target in targets {
                            if target
                                .scalar(&join.to_field)
                                .is_some_and(|v| values_equal(v, key))
                            {
                                self.collect(target, rest, out);
                            }
                        }
                    }
                }
            }
        }
    }

    fn table(&self, entity: &str) -> &'a [Record] {
        self.tables.get(entity).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Order two records by `sort`, earlier keys taking priority.
    pub fn compare_records(&self, a: &'a Record, b: &'a Record, sort: &[SortKey]) -> Ordering {
        for key in sort {
            let a_val = self.values(a, &key.path.steps).into_iter().next();
            let b_val = self.values(b, &key.path.steps).into_iter().next();

            let cmp = compare_values_opt(a_val, b_val);
            let cmp = match key.direction {
                SortDirection::Ascending => cmp,
                SortDirection::Descending => cmp.reverse(),
            };
            if cmp != Ordering::Equal {
                return cmp;
            }
        }
        Ordering::Equal
    }
}

/// Column of an edge record holding the join key of `entity`.
///
/// Edge records for `User.id` to `Tag.id` carry `user_id` and `tag_id`.
pub fn edge_column(entity: &str, field: &str) -> String {
    format!("{}_{}", entity.to_ascii_lowercase(), field)
}

fn collect_scalars<'a>(datum: &'a Datum, out: &mut Vec<&'a Value>) {
    match datum {
        Datum::Scalar(value) if !value.is_null() => out.push(value),
        Datum::Scalar(_) | Datum::Object(_) => {}
        Datum::List(items) => {
            for item in items {
                collect_scalars(item, out);
            }
        }
    }
}

fn objects(datum: &Datum) -> Vec<&Record> {
    match datum {
        Datum::Object(record) => vec![record],
        Datum::List(items) => items.iter().flat_map(objects).collect(),
        Datum::Scalar(_) => Vec::new(),
    }
}

/// Test one reached value against a coerced term.
fn test(actual: &Value, op: CompareOp, expected: &TypedValue) -> bool {
    if let (Value::String(a), Value::String(e)) = (actual, &expected.value) {
        let (a, e) = if expected.case_sensitive {
            (Cow::Borrowed(a.as_str()), Cow::Borrowed(e.as_str()))
        } else {
            (Cow::Owned(a.to_lowercase()), Cow::Owned(e.to_lowercase()))
        };
        return match (expected.mode, op) {
            (MatchMode::Contains, CompareOp::Eq) => a.contains(&*e),
            (MatchMode::Pattern, CompareOp::Eq) => wildcard_match(&a, &e),
            _ => ordering_holds(op, a.cmp(&e)),
        };
    }

    match op {
        CompareOp::Eq => values_equal(actual, &expected.value),
        CompareOp::Ne => !values_equal(actual, &expected.value),
        _ => compare_values(actual, &expected.value)
            .map(|ord| ordering_holds(op, ord))
            .unwrap_or(false),
    }
}

fn ordering_holds(op: CompareOp, ord: Ordering) -> bool {
    match op {
        CompareOp::Eq => ord.is_eq(),
        CompareOp::Ne => ord.is_ne(),
        CompareOp::Lt => ord.is_lt(),
        CompareOp::Le => ord.is_le(),
        CompareOp::Gt => ord.is_gt(),
        CompareOp::Ge => ord.is_ge(),
    }
}

/// Check if two values are equal.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int32(a), Value::Int64(b)) => i64::from(*a) == *b,
        (Value::Int64(a), Value::Int32(b)) => *a == i64::from(*b),
        (Value::Float32(a), Value::Float64(b)) => f64::from(*a) == *b,
        (Value::Float64(a), Value::Float32(b)) => *a == f64::from(*b),
        _ => a == b,
    }
}

/// Compare two values, returning their ordering if comparable.
fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Int32(a), Value::Int32(b)) => Some(a.cmp(b)),
        (Value::Int64(a), Value::Int64(b)) => Some(a.cmp(b)),
        (Value::Int32(a), Value::Int64(b)) => Some(i64::from(*a).cmp(b)),
        (Value::Int64(a), Value::Int32(b)) => Some(a.cmp(&i64::from(*b))),
        (Value::Float32(a), Value::Float32(b)) => a.partial_cmp(b),
        (Value::Float64(a), Value::Float64(b)) => a.partial_cmp(b),
        (Value::Float32(a), Value::Float64(b)) => f64::from(*a).partial_cmp(b),
        (Value::Float64(a), Value::Float32(b)) => a.partial_cmp(&f64::from(*b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Enum(a), Value::Enum(b)) => Some(a.cmp(b)),
        (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
        (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
        (Value::Uuid(a), Value::Uuid(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Compare two optional sort values; missing values sort first.
///
/// This is a total order: floats compare with `total_cmp` and values that
/// cannot be compared order by type name.
fn compare_values_opt(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (as_float(a), as_float(b)) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => compare_values(a, b).unwrap_or_else(|| a.type_name().cmp(b.type_name())),
        },
    }
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Float32(f) => Some(f64::from(*f)),
        Value::Float64(f) => Some(*f),
        _ => None,
    }
}

/// One element of a masking pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Glob {
    /// `*`: zero or more characters.
    Any,
    /// `?`: exactly one character.
    One,
    /// A literal character, including escaped `*`, `?` and `\`.
    Literal(char),
}

fn glob_tokens(pattern: &str) -> Vec<Glob> {
    let mut tokens = Vec::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '*' => Glob::Any,
            '?' => Glob::One,
            // Trailing backslash matches itself
            '\\' => Glob::Literal(chars.next().unwrap_or('\\')),
            c => Glob::Literal(c),
        });
    }
    tokens
}

/// Match a string against a CQL masking pattern.
///
/// Supports:
/// - `*` matches zero or more characters
/// - `?` matches exactly one character
/// - `\` makes the next character literal
///
/// Runs in O(value × pattern): on a mismatch only the most recent `*` is
/// retried, one character further along.
pub fn wildcard_match(value: &str, pattern: &str) -> bool {
    let value: Vec<char> = value.chars().collect();
    let tokens = glob_tokens(pattern);

    let (mut v, mut p) = (0, 0);
    // Pattern position after the last `*`, and the value position it resumes from
    let mut resume: Option<(usize, usize)> = None;

    while v < value.len() {
        match tokens.get(p) {
            Some(Glob::Any) => {
                p += 1;
                resume = Some((p, v));
                continue;
            }
            Some(Glob::One) => {
                v += 1;
                p += 1;
                continue;
            }
            Some(Glob::Literal(c)) if *c == value[v] => {
                v += 1;
                p += 1;
                continue;
            }
            _ => {}
        }

        match resume {
            Some((star_p, star_v)) => {
                p = star_p;
                v = star_v + 1;
                resume = Some((star_p, v));
            }
            None => return false,
        }
    }

    tokens[p..].iter().all(|t| *t == Glob::Any)
}
