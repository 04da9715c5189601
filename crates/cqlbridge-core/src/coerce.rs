//! Literal coercion into the value domain of a resolved attribute.
//!
//! CQL terms are untyped strings. Once a field has been resolved, its
//! declared domain decides how the term is parsed and which relations make
//! sense for it.

use crate::config::{EqualityMatch, TranslatorConfig};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use cqlbridge_lang::{Modifier, RelationOp};
use cqlbridge_proto::pattern::{has_wildcards, unescape};
use cqlbridge_proto::{AttributePath, CompareOp, MatchMode, TypedValue, Value, ValueDomain};
use std::collections::BTreeSet;
use thiserror::Error;

/// Coercion failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoerceError {
    /// The term cannot be read as a value of the target domain.
    #[error("cannot interpret '{literal}' as {target}")]
    Coercion {
        /// The term as written.
        literal: String,
        /// Target domain.
        target: String,
    },

    /// The relation makes no sense for the target domain.
    #[error("relation '{operator}' is not supported for {target}")]
    UnsupportedOperator {
        /// The relation (or `wildcard match`).
        operator: String,
        /// Target domain.
        target: String,
    },
}

/// Map a CQL relation onto the comparison operator it produces.
///
/// `=` and `==` both become [`CompareOp::Eq`]; they differ only in the match
/// mode chosen by [`coerce`].
pub fn compare_op(op: RelationOp) -> CompareOp {
    match op {
        RelationOp::Eq | RelationOp::ExactEq => CompareOp::Eq,
        RelationOp::Ne => CompareOp::Ne,
        RelationOp::Lt => CompareOp::Lt,
        RelationOp::Le => CompareOp::Le,
        RelationOp::Gt => CompareOp::Gt,
        RelationOp::Ge => CompareOp::Ge,
    }
}

/// Coerce `literal` into the domain of `path` for use with `op`.
pub fn coerce(
    path: &AttributePath,
    literal: &str,
    op: RelationOp,
    modifiers: &BTreeSet<Modifier>,
    config: &TranslatorConfig,
) -> Result<TypedValue, CoerceError> {
    let domain = &path.domain;
    let masked = !modifiers.contains(&Modifier::Unmasked);
    let wildcards = masked && has_wildcards(literal);

    if domain.is_text() {
        return coerce_text(literal, op, modifiers, config, wildcards);
    }

    if wildcards {
        return Err(unsupported("wildcard match", domain));
    }
    if op.is_ordering() && !domain.is_ordered() {
        return Err(unsupported(&op.to_string(), domain));
    }

    let term = literal.trim();
    let fail = || CoerceError::Coercion {
        literal: literal.to_string(),
        target: domain.to_string(),
    };

    let value = match domain {
        ValueDomain::Int32 => Value::Int32(term.parse().map_err(|_| fail())?),
        ValueDomain::Int64 => Value::Int64(term.parse().map_err(|_| fail())?),
        ValueDomain::Float32 => {
            let f: f32 = term.parse().map_err(|_| fail())?;
            if !f.is_finite() {
                return Err(fail());
            }
            Value::Float32(f)
        }
        ValueDomain::Float64 => {
            let f: f64 = term.parse().map_err(|_| fail())?;
            if !f.is_finite() {
                return Err(fail());
            }
            Value::Float64(f)
        }
        ValueDomain::Bool => {
            if term.eq_ignore_ascii_case("true") {
                Value::Bool(true)
            } else if term.eq_ignore_ascii_case("false") {
                Value::Bool(false)
            } else {
                return Err(fail());
            }
        }
        ValueDomain::Timestamp => Value::Timestamp(parse_timestamp(term).ok_or_else(fail)?),
        ValueDomain::Date => Value::Date(parse_date(term).ok_or_else(fail)?),
        ValueDomain::Uuid => {
            let id = uuid::Uuid::parse_str(term).map_err(|_| fail())?;
            Value::Uuid(*id.as_bytes())
        }
        ValueDomain::Enum { variants, .. } => {
            let variant = variants
                .iter()
                .find(|v| v.eq_ignore_ascii_case(term))
                .ok_or_else(fail)?;
            Value::Enum(variant.clone())
        }
        ValueDomain::Text => Value::String(unescape(literal)),
    };

    Ok(TypedValue::exact(value))
}

fn coerce_text(
    literal: &str,
    op: RelationOp,
    modifiers: &BTreeSet<Modifier>,
    config: &TranslatorConfig,
    wildcards: bool,
) -> Result<TypedValue, CoerceError> {
    let case_sensitive = if modifiers.contains(&Modifier::RespectCase) {
        true
    } else if modifiers.contains(&Modifier::IgnoreCase) {
        false
    } else {
        config.case_sensitive
    };

    if wildcards {
        if op.is_ordering() {
            return Err(CoerceError::UnsupportedOperator {
                operator: op.to_string(),
                target: "masked text".to_string(),
            });
        }
        return Ok(TypedValue::text(literal, MatchMode::Pattern).with_case_sensitive(case_sensitive));
    }

    let mode = match (op, config.equality) {
        (RelationOp::Eq, EqualityMatch::Contains) => MatchMode::Contains,
        _ => MatchMode::Exact,
    };
    Ok(TypedValue::text(unescape(literal), mode).with_case_sensitive(case_sensitive))
}

fn unsupported(operator: &str, domain: &ValueDomain) -> CoerceError {
    CoerceError::UnsupportedOperator {
        operator: operator.to_string(),
        target: domain.to_string(),
    }
}

/// Parse an instant into microseconds since the Unix epoch (UTC).
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.fff]` (read as UTC), or a
/// bare date (midnight UTC).
pub fn parse_timestamp(term: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(term) {
        return Some(dt.timestamp_micros());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(term, format) {
            return Some(naive.and_utc().timestamp_micros());
        }
    }
    let date = NaiveDate::parse_from_str(term, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_micros())
}

/// Parse a `YYYY-MM-DD` date into days since the Unix epoch.
pub fn parse_date(term: &str) -> Option<i32> {
    let date = NaiveDate::parse_from_str(term, "%Y-%m-%d").ok()?;
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
    i32::try_from(date.signed_duration_since(epoch).num_days()).ok()
}
