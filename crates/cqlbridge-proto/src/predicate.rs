//! Predicate trees handed to the execution layer.

use crate::path::AttributePath;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Boolean combinators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BooleanOp {
    /// All children must hold.
    And,
    /// At least one child must hold.
    Or,
    /// The single child must not hold.
    Not,
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BooleanOp::And => write!(f, "AND"),
            BooleanOp::Or => write!(f, "OR"),
            BooleanOp::Not => write!(f, "NOT"),
        }
    }
}

/// Comparison operators of a predicate leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    /// Equal (or matches, depending on [`MatchMode`]).
    Eq,
    /// Not equal (or does not match).
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
}

impl CompareOp {
    /// Whether this is an ordering comparison.
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            CompareOp::Lt | CompareOp::Le | CompareOp::Gt | CompareOp::Ge
        )
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        };
        f.write_str(s)
    }
}

/// How a text value is matched against an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Whole-value equality or ordering.
    Exact,
    /// The attribute contains the value as a substring.
    Contains,
    /// The value is a masked pattern (`*`, `?`, `\` escapes).
    Pattern,
}

/// A coerced literal together with the comparison semantics to use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedValue {
    /// The coerced value.
    pub value: Value,
    /// Matching semantics.
    pub mode: MatchMode,
    /// Whether text comparison respects case. Always true for non-text values.
    pub case_sensitive: bool,
}

impl TypedValue {
    /// An exact, case-sensitive value.
    pub fn exact(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            mode: MatchMode::Exact,
            case_sensitive: true,
        }
    }

    /// A text value with the given mode, case-insensitive.
    pub fn text(value: impl Into<String>, mode: MatchMode) -> Self {
        Self {
            value: Value::String(value.into()),
            mode,
            case_sensitive: false,
        }
    }

    /// Set case sensitivity.
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }
}

/// A typed comparison leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Resolved attribute.
    pub path: AttributePath,
    /// Operator.
    pub op: CompareOp,
    /// Coerced operand.
    pub value: TypedValue,
}

/// A field- and type-resolved predicate tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Predicate {
    /// Matches every row.
    MatchAll,
    /// Boolean combination of children, in source order.
    Boolean {
        /// Combinator.
        op: BooleanOp,
        /// Operands. `Not` has exactly one.
        children: Vec<Predicate>,
    },
    /// Typed comparison.
    Compare(Comparison),
}

impl Predicate {
    /// Create an AND of predicates.
    pub fn and(children: Vec<Predicate>) -> Self {
        Predicate::Boolean {
            op: BooleanOp::And,
            children,
        }
    }

    /// Create an OR of predicates.
    pub fn or(children: Vec<Predicate>) -> Self {
        Predicate::Boolean {
            op: BooleanOp::Or,
            children,
        }
    }

    /// Negate a predicate.
    #[allow(clippy::should_implement_trait)]
    pub fn not(child: Predicate) -> Self {
        Predicate::Boolean {
            op: BooleanOp::Not,
            children: vec![child],
        }
    }

    /// Create a comparison leaf.
    pub fn compare(path: AttributePath, op: CompareOp, value: TypedValue) -> Self {
        Predicate::Compare(Comparison { path, op, value })
    }

    /// Check if this is the universal predicate.
    pub fn is_match_all(&self) -> bool {
        matches!(self, Predicate::MatchAll)
    }

    /// Number of comparison leaves.
    pub fn leaf_count(&self) -> usize {
        match self {
            Predicate::MatchAll => 0,
            Predicate::Compare(_) => 1,
            Predicate::Boolean { children, .. } => children.iter().map(|c| c.leaf_count()).sum(),
        }
    }

    /// Dotted names of every attribute the predicate reads.
    pub fn fields(&self) -> BTreeSet<String> {
        let mut fields = BTreeSet::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields(&self, fields: &mut BTreeSet<String>) {
        match self {
            Predicate::MatchAll => {}
            Predicate::Compare(cmp) => {
                fields.insert(cmp.path.dotted());
            }
            Predicate::Boolean { children, .. } => {
                for child in children {
                    child.collect_fields(fields);
                }
            }
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::MatchAll => write!(f, "TRUE"),
            Predicate::Compare(cmp) => {
                let mode = match cmp.value.mode {
                    MatchMode::Exact => "",
                    MatchMode::Contains => "~",
                    MatchMode::Pattern => "like ",
                };
                let case = if cmp.value.case_sensitive { "" } else { "/i" };
                write!(f, "{} {}{}{} {:?}", cmp.path.dotted(), cmp.op, case, mode, cmp.value.value)
            }
            Predicate::Boolean { op: BooleanOp::Not, children } => {
                write!(f, "NOT (")?;
                for child in children {
                    write!(f, "{}", child)?;
                }
                write!(f, ")")
            }
            Predicate::Boolean { op, children } => {
                write!(f, "(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", op)?;
                    }
                    write!(f, "{}", child)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{PathStep, StepKind, ValueDomain};

    fn path(name: &str, domain: ValueDomain) -> AttributePath {
        AttributePath {
            entity: "User".into(),
            steps: vec![PathStep {
                entity: "User".into(),
                attribute: name.into(),
                kind: StepKind::Attribute { collection: false },
            }],
            domain,
            nullable: false,
            collection: false,
            sortable: true,
        }
    }

    #[test]
    fn test_builders_and_fields() {
        let p = Predicate::and(vec![
            Predicate::compare(
                path("id", ValueDomain::Int64),
                CompareOp::Eq,
                TypedValue::exact(123i64),
            ),
            Predicate::not(Predicate::compare(
                path("status", ValueDomain::Text),
                CompareOp::Eq,
                TypedValue::text("active", MatchMode::Contains),
            )),
        ]);

        assert_eq!(p.leaf_count(), 2);
        let fields: Vec<String> = p.fields().into_iter().collect();
        assert_eq!(fields, vec!["id".to_string(), "status".to_string()]);
        assert!(!p.is_match_all());
        assert!(Predicate::MatchAll.is_match_all());
    }

    #[test]
    fn test_display() {
        let p = Predicate::or(vec![
            Predicate::compare(
                path("age", ValueDomain::Int32),
                CompareOp::Gt,
                TypedValue::exact(30),
            ),
            Predicate::MatchAll,
        ]);
        assert_eq!(p.to_string(), "(age > Int32(30) OR TRUE)");
    }

    #[test]
    fn test_json_roundtrip() {
        let p = Predicate::not(Predicate::compare(
            path("name", ValueDomain::Text),
            CompareOp::Eq,
            TypedValue::text("Jo*", MatchMode::Pattern),
        ));
        let json = serde_json::to_string(&p).unwrap();
        let back: Predicate = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }
}
