//! Abstract Syntax Tree types for CQL.

use crate::span::{Span, Spanned};
use std::collections::BTreeSet;
use std::fmt;

/// Index name that matches every record regardless of the term.
pub const ALL_RECORDS_INDEX: &str = "cql.allRecords";

/// A parsed query: an optional filter plus the detached sort specification.
#[derive(Debug, Clone, PartialEq)]
pub struct CqlQuery {
    /// The filter tree. `None` means every record matches.
    pub filter: Option<Node>,
    /// Sort clauses in priority order.
    pub sort: Vec<SortClause>,
    /// The full span of the query.
    pub span: Span,
}

impl CqlQuery {
    /// Check if the query places no constraint on the result set.
    pub fn is_unfiltered(&self) -> bool {
        self.filter.is_none()
    }
}

/// Boolean combinators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    /// Logical AND.
    And,
    /// Logical OR.
    Or,
    /// Logical NOT (single operand).
    Not,
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BooleanOp::And => write!(f, "and"),
            BooleanOp::Or => write!(f, "or"),
            BooleanOp::Not => write!(f, "not"),
        }
    }
}

/// A node of the filter tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Boolean combination of children in source order.
    Boolean {
        op: BooleanOp,
        children: Vec<Node>,
        span: Span,
    },
    /// A single search clause.
    Relation(Relation),
}

impl Node {
    /// Get the span of this node.
    pub fn span(&self) -> Span {
        match self {
            Node::Boolean { span, .. } => *span,
            Node::Relation(r) => r.span(),
        }
    }

    /// Nesting depth of the tree (a single relation has depth 1).
    pub fn depth(&self) -> usize {
        match self {
            Node::Boolean { children, .. } => {
                1 + children.iter().map(Node::depth).max().unwrap_or(0)
            }
            Node::Relation(_) => 1,
        }
    }

    /// Visit every relation in source order.
    pub fn relations(&self) -> Vec<&Relation> {
        let mut out = Vec::new();
        self.collect_relations(&mut out);
        out
    }

    fn collect_relations<'a>(&'a self, out: &mut Vec<&'a Relation>) {
        match self {
            Node::Boolean { children, .. } => {
                for child in children {
                    child.collect_relations(out);
                }
            }
            Node::Relation(r) => out.push(r),
        }
    }
}

/// Relation symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationOp {
    /// `=`: word match (containment for text by default).
    Eq,
    /// `==`: exact match.
    ExactEq,
    /// `<>`: not equal.
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl RelationOp {
    /// Check if this is an ordering comparison.
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            RelationOp::Lt | RelationOp::Le | RelationOp::Gt | RelationOp::Ge
        )
    }
}

impl fmt::Display for RelationOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RelationOp::Eq => "=",
            RelationOp::ExactEq => "==",
            RelationOp::Ne => "<>",
            RelationOp::Lt => "<",
            RelationOp::Le => "<=",
            RelationOp::Gt => ">",
            RelationOp::Ge => ">=",
        };
        f.write_str(s)
    }
}

/// Relation modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modifier {
    /// Case-insensitive comparison.
    IgnoreCase,
    /// Case-sensitive comparison.
    RespectCase,
    /// `*` and `?` are masking characters.
    Masked,
    /// `*` and `?` are literal.
    Unmasked,
}

impl Modifier {
    /// Look up a modifier by name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Modifier> {
        const NAMES: [(&str, Modifier); 4] = [
            ("ignoreCase", Modifier::IgnoreCase),
            ("respectCase", Modifier::RespectCase),
            ("masked", Modifier::Masked),
            ("unmasked", Modifier::Unmasked),
        ];
        NAMES
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, m)| *m)
    }

    /// The modifier that cannot appear together with this one.
    pub fn opposite(&self) -> Modifier {
        match self {
            Modifier::IgnoreCase => Modifier::RespectCase,
            Modifier::RespectCase => Modifier::IgnoreCase,
            Modifier::Masked => Modifier::Unmasked,
            Modifier::Unmasked => Modifier::Masked,
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Modifier::IgnoreCase => "ignoreCase",
            Modifier::RespectCase => "respectCase",
            Modifier::Masked => "masked",
            Modifier::Unmasked => "unmasked",
        };
        f.write_str(s)
    }
}

/// A search clause: `field operator value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    /// Field (index) name, possibly dotted.
    pub field: Spanned<String>,
    /// Relation symbol.
    pub operator: Spanned<RelationOp>,
    /// Search term as written (phrase quotes removed).
    pub value: Spanned<String>,
    /// Modifiers attached to the relation.
    pub modifiers: BTreeSet<Modifier>,
}

impl Relation {
    /// Get the span of this relation.
    pub fn span(&self) -> Span {
        self.field.span.merge(self.value.span)
    }

    /// Check if this is a `cql.allRecords` clause.
    pub fn is_all_records(&self) -> bool {
        self.field.value.eq_ignore_ascii_case(ALL_RECORDS_INDEX)
    }

    /// Check if a modifier is present.
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Ascending,
    /// Descending order.
    Descending,
}

impl SortDirection {
    /// Look up a sort modifier by name (case-insensitive).
    pub fn from_modifier(name: &str) -> Option<SortDirection> {
        let lower = name.to_ascii_lowercase();
        match lower.as_str() {
            "sort.ascending" | "ascending" => Some(SortDirection::Ascending),
            "sort.descending" | "descending" => Some(SortDirection::Descending),
            _ => None,
        }
    }
}

/// One `sortBy` key.
#[derive(Debug, Clone, PartialEq)]
pub struct SortClause {
    /// Field (index) name, possibly dotted.
    pub field: Spanned<String>,
    /// Sort direction.
    pub direction: SortDirection,
    /// Span of the clause including modifiers.
    pub span: Span,
}
