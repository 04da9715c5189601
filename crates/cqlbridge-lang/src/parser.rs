//! Recursive descent parser for CQL.
//!
//! Precedence from loosest to tightest is `or`, `and`, `not`. A `not`
//! between two clauses is binary and means AND NOT.

use crate::ast::*;
use crate::error::{LangError, ParseError};
use crate::lexer::{Keyword, Lexer, SpannedToken, Token};
use crate::span::{Span, Spanned};
use std::collections::BTreeSet;

/// Default limit on parenthesis nesting.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Parser for CQL.
pub struct Parser<'source> {
    lexer: Lexer<'source>,
    source: &'source str,
    max_depth: usize,
    depth: usize,
}

impl<'source> Parser<'source> {
    /// Create a new parser for the given source.
    pub fn new(source: &'source str) -> Self {
        Self {
            lexer: Lexer::new(source),
            source,
            max_depth: DEFAULT_MAX_DEPTH,
            depth: 0,
        }
    }

    /// Set the maximum parenthesis nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse a complete query.
    pub fn parse_query(&mut self) -> Result<CqlQuery, LangError> {
        let filter = if self.at_query_end()? {
            None
        } else if self.is_bare_term()? {
            // A lone search term with no index matches everything.
            self.next_token()?;
            None
        } else {
            Some(self.parse_or()?)
        };

        let mut sort = Vec::new();
        if self.peek_keyword(Keyword::SortBy)? {
            self.next_token()?; // consume sortBy
            sort = self.parse_sort_spec()?;
        }

        if let Some(tok) = self.lexer.peek()? {
            let expected = if sort.is_empty() {
                "'and', 'or', 'not', 'sortBy' or end of query"
            } else {
                "sort key or end of query"
            };
            return Err(ParseError::new(expected, tok.token.describe(), tok.span).into());
        }

        Ok(CqlQuery {
            filter,
            sort,
            span: Span::new(0, self.source.len()),
        })
    }

    /// Parse OR chains.
    fn parse_or(&mut self) -> Result<Node, LangError> {
        let first = self.parse_and()?;
        let start = first.span();
        let mut children = vec![first];

        while self.peek_keyword(Keyword::Or)? {
            self.next_token()?; // consume or
            children.push(self.parse_and()?);
        }

        Ok(combine(BooleanOp::Or, children, start))
    }

    /// Parse AND chains, including binary NOT.
    fn parse_and(&mut self) -> Result<Node, LangError> {
        let first = self.parse_not()?;
        let start = first.span();
        let mut children = vec![first];

        loop {
            if self.peek_keyword(Keyword::And)? {
                self.next_token()?; // consume and
                children.push(self.parse_not()?);
            } else if self.peek_keyword(Keyword::Not)? {
                let not_tok = self.next_token()?;
                let operand = self.parse_term()?;
                let span = not_tok.span.merge(operand.span());
                children.push(Node::Boolean {
                    op: BooleanOp::Not,
                    children: vec![operand],
                    span,
                });
            } else {
                break;
            }
        }

        Ok(combine(BooleanOp::And, children, start))
    }

    /// Parse an optionally negated term.
    fn parse_not(&mut self) -> Result<Node, LangError> {
        if self.peek_keyword(Keyword::Not)? {
            let not_tok = self.next_token()?;
            let operand = self.parse_term()?;
            let span = not_tok.span.merge(operand.span());
            return Ok(Node::Boolean {
                op: BooleanOp::Not,
                children: vec![operand],
                span,
            });
        }
        self.parse_term()
    }

    /// Parse a parenthesized group or a relation.
    fn parse_term(&mut self) -> Result<Node, LangError> {
        let is_group = matches!(
            self.lexer.peek()?,
            Some(SpannedToken {
                token: Token::LParen,
                ..
            })
        );
        if !is_group {
            return self.parse_relation().map(Node::Relation);
        }

        let open = self.next_token()?;
        if self.depth >= self.max_depth {
            return Err(ParseError::new(
                format!("at most {} levels of nesting", self.max_depth),
                "'('",
                open.span,
            )
            .into());
        }

        self.depth += 1;
        let inner = self.parse_or()?;
        self.depth -= 1;

        self.expect_token(Token::RParen, "')'")?;
        Ok(inner)
    }

    /// Parse `field op [/mod]* value [/mod]*`.
    fn parse_relation(&mut self) -> Result<Relation, LangError> {
        let field = self.expect_field("search clause")?;

        let op_tok = self.next_token()?;
        let op = match op_tok.token {
            Token::Eq => RelationOp::Eq,
            Token::ExactEq => RelationOp::ExactEq,
            Token::Ne => RelationOp::Ne,
            Token::Lt => RelationOp::Lt,
            Token::Le => RelationOp::Le,
            Token::Gt => RelationOp::Gt,
            Token::Ge => RelationOp::Ge,
            other => {
                let err = ParseError::new("relation operator", other.describe(), op_tok.span);
                let err = if matches!(other, Token::Word(_) | Token::Phrase(_)) {
                    err.with_hint("search terms need an index, e.g. title=dinosaur")
                } else {
                    err
                };
                return Err(err.into());
            }
        };
        let operator = Spanned::new(op, op_tok.span);

        let mut modifiers = BTreeSet::new();
        self.parse_modifiers(&mut modifiers)?;

        let value_tok = self.next_token()?;
        let value = match value_tok.token {
            Token::Word(w) => Spanned::new(w, value_tok.span),
            Token::Phrase(p) => Spanned::new(p, value_tok.span),
            other => {
                return Err(
                    ParseError::new("search term", other.describe(), value_tok.span).into(),
                )
            }
        };

        self.parse_modifiers(&mut modifiers)?;

        Ok(Relation {
            field,
            operator,
            value,
            modifiers,
        })
    }

    /// Parse a run of `/modifier` suffixes into `modifiers`.
    fn parse_modifiers(&mut self, modifiers: &mut BTreeSet<Modifier>) -> Result<(), LangError> {
        while self.peek_is(|t| matches!(t, Token::Slash))? {
            self.next_token()?; // consume /
            let name_tok = self.next_token()?;
            let name = match name_tok.token {
                Token::Word(w) => w,
                other => {
                    return Err(
                        ParseError::new("modifier name", other.describe(), name_tok.span).into(),
                    )
                }
            };

            let modifier = Modifier::from_name(&name).ok_or_else(|| {
                ParseError::new("relation modifier", format!("'{}'", name), name_tok.span)
                    .with_hint("supported modifiers: ignoreCase, respectCase, masked, unmasked")
            })?;

            if modifiers.contains(&modifier.opposite()) {
                return Err(ParseError::new(
                    format!("no modifier conflicting with '{}'", modifier.opposite()),
                    format!("'{}'", name),
                    name_tok.span,
                )
                .into());
            }
            modifiers.insert(modifier);
        }
        Ok(())
    }

    /// Parse the keys following `sortBy`.
    fn parse_sort_spec(&mut self) -> Result<Vec<SortClause>, LangError> {
        let mut clauses = Vec::new();

        while self.peek_is(|t| matches!(t, Token::Word(_)))? {
            let field = self.expect_field("sort key")?;
            let mut span = field.span;
            let mut direction: Option<SortDirection> = None;

            while self.peek_is(|t| matches!(t, Token::Slash))? {
                self.next_token()?; // consume /
                let name_tok = self.next_token()?;
                let name = match name_tok.token {
                    Token::Word(w) => w,
                    other => {
                        return Err(ParseError::new(
                            "sort modifier",
                            other.describe(),
                            name_tok.span,
                        )
                        .into())
                    }
                };

                let parsed = SortDirection::from_modifier(&name).ok_or_else(|| {
                    ParseError::new("sort modifier", format!("'{}'", name), name_tok.span)
                        .with_hint("use sort.ascending or sort.descending")
                })?;
                if direction.is_some() {
                    return Err(ParseError::new(
                        "a single sort direction",
                        format!("'{}'", name),
                        name_tok.span,
                    )
                    .into());
                }
                direction = Some(parsed);
                span = span.merge(name_tok.span);
            }

            clauses.push(SortClause {
                field,
                direction: direction.unwrap_or_default(),
                span,
            });
        }

        if clauses.is_empty() {
            let eof = self.eof_span();
            let (found, span) = match self.lexer.peek()? {
                Some(tok) => (tok.token.describe(), tok.span),
                None => ("end of input".to_string(), eof),
            };
            return Err(ParseError::new("sort key after sortBy", found, span)
                .with_hint("sortBy needs at least one index name")
                .into());
        }

        Ok(clauses)
    }

    /// Expect an unquoted, non-reserved word naming an index.
    fn expect_field(&mut self, context: &str) -> Result<Spanned<String>, LangError> {
        let tok = self.next_token()?;
        if let Token::Word(w) = &tok.token {
            if tok.token.keyword().is_none() {
                return Ok(Spanned::new(w.clone(), tok.span));
            }
        }
        Err(ParseError::new(context, tok.token.describe(), tok.span).into())
    }

    /// Expect and consume a specific token.
    fn expect_token(&mut self, expected: Token, what: &str) -> Result<SpannedToken, LangError> {
        let tok = match self.lexer.next_token() {
            Some(tok) => tok?,
            None => return Err(ParseError::new(what, "end of input", self.eof_span()).into()),
        };
        if std::mem::discriminant(&tok.token) == std::mem::discriminant(&expected) {
            Ok(tok)
        } else {
            Err(ParseError::new(what, tok.token.describe(), tok.span).into())
        }
    }

    /// Check if the next token is the given keyword.
    fn peek_keyword(&mut self, keyword: Keyword) -> Result<bool, LangError> {
        self.peek_is(|t| t.keyword() == Some(keyword))
    }

    fn peek_is(&mut self, pred: impl Fn(&Token) -> bool) -> Result<bool, LangError> {
        Ok(self.lexer.peek()?.is_some_and(|t| pred(&t.token)))
    }

    /// Check if nothing but an optional sort specification remains.
    fn at_query_end(&mut self) -> Result<bool, LangError> {
        Ok(match self.lexer.peek()? {
            None => true,
            Some(tok) => tok.token.keyword() == Some(Keyword::SortBy),
        })
    }

    /// Check for a lone term followed by end of query or `sortBy`.
    fn is_bare_term(&mut self) -> Result<bool, LangError> {
        let mut ahead = self.lexer.clone();
        let first = match ahead.next_token().transpose()? {
            Some(tok) => tok,
            None => return Ok(false),
        };
        let is_term = match &first.token {
            Token::Phrase(_) => true,
            Token::Word(_) => first.token.keyword().is_none(),
            _ => false,
        };
        if !is_term {
            return Ok(false);
        }
        Ok(match ahead.next_token().transpose()? {
            None => true,
            Some(tok) => tok.token.keyword() == Some(Keyword::SortBy),
        })
    }

    /// Get the next token or error if EOF.
    fn next_token(&mut self) -> Result<SpannedToken, LangError> {
        match self.lexer.next_token() {
            Some(tok) => Ok(tok?),
            None => Err(ParseError::new("more input", "end of input", self.eof_span()).into()),
        }
    }

    fn eof_span(&self) -> Span {
        Span::new(self.source.len(), self.source.len())
    }
}

/// Build a boolean node, collapsing single-child chains.
fn combine(op: BooleanOp, mut children: Vec<Node>, start: Span) -> Node {
    if children.len() == 1 {
        return children.remove(0);
    }
    let span = children.iter().fold(start, |acc, c| acc.merge(c.span()));
    Node::Boolean { op, children, span }
}

/// Parse a source string into a query.
pub fn parse(source: &str) -> Result<CqlQuery, LangError> {
    let mut parser = Parser::new(source);
    parser.parse_query()
}
