//! Lexer for CQL using logos.
//!
//! CQL has very few reserved characters: whitespace, parentheses, the
//! relation symbols, `/` and the double quote. Everything else, including
//! dots, dashes and the masking characters `*` and `?`, is part of a word.
//! Boolean keywords are plain words; the parser recognises them
//! case-insensitively.

use crate::error::{LexError, LexErrorKind};
use crate::span::Span;
use logos::Logos;

/// Token types for CQL.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    // Relation symbols
    #[token("==")]
    ExactEq,
    #[token("=")]
    Eq,
    #[token("<>")]
    Ne,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("/")]
    Slash,

    // Quoted phrase; only `\"` is unescaped here
    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        unescape_phrase(&s[1..s.len() - 1])
    })]
    Phrase(String),

    // Unquoted word: field names, keywords, simple terms
    #[regex(r#"[^ ()=<>"/\x00-\x1F\x7F]+"#, |lex| lex.slice().to_string())]
    Word(String),
}

/// Reserved words, matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    And,
    Or,
    Not,
    SortBy,
}

impl Keyword {
    /// Match a word against the reserved words.
    pub fn from_word(word: &str) -> Option<Keyword> {
        if word.eq_ignore_ascii_case("and") {
            Some(Keyword::And)
        } else if word.eq_ignore_ascii_case("or") {
            Some(Keyword::Or)
        } else if word.eq_ignore_ascii_case("not") {
            Some(Keyword::Not)
        } else if word.eq_ignore_ascii_case("sortby") {
            Some(Keyword::SortBy)
        } else {
            None
        }
    }
}

impl Token {
    /// The keyword this token spells, if it is an unquoted reserved word.
    pub fn keyword(&self) -> Option<Keyword> {
        match self {
            Token::Word(w) => Keyword::from_word(w),
            _ => None,
        }
    }

    /// Check if this token is a relation symbol.
    pub fn is_relation(&self) -> bool {
        matches!(
            self,
            Token::ExactEq | Token::Eq | Token::Ne | Token::Le | Token::Ge | Token::Lt | Token::Gt
        )
    }

    /// Human-readable description for error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::ExactEq => "'=='".to_string(),
            Token::Eq => "'='".to_string(),
            Token::Ne => "'<>'".to_string(),
            Token::Le => "'<='".to_string(),
            Token::Ge => "'>='".to_string(),
            Token::Lt => "'<'".to_string(),
            Token::Gt => "'>'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::Phrase(p) => format!("phrase \"{}\"", p),
            Token::Word(w) if self.keyword().is_some() => format!("keyword '{}'", w),
            Token::Word(w) => format!("'{}'", w),
        }
    }
}

/// Unescape a quoted phrase. Escapes other than `\"` stay verbatim so that
/// escaped masking characters survive into coercion.
fn unescape_phrase(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('"') => result.push('"'),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// A token with its span in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

/// Lexer that produces spanned tokens.
///
/// Cloning a lexer yields an independent cursor at the same position, which
/// the parser uses for bounded lookahead.
#[derive(Clone)]
pub struct Lexer<'source> {
    inner: logos::Lexer<'source, Token>,
    peeked: Option<Option<Result<SpannedToken, LexError>>>,
    failed: bool,
}

impl<'source> Lexer<'source> {
    /// Create a new lexer for the given source.
    pub fn new(source: &'source str) -> Self {
        Self {
            inner: Token::lexer(source),
            peeked: None,
            failed: false,
        }
    }

    /// Peek at the next token without consuming it.
    pub fn peek(&mut self) -> Result<Option<&SpannedToken>, LexError> {
        if self.peeked.is_none() {
            self.peeked = Some(self.next_inner());
        }
        match self.peeked.as_ref() {
            Some(Some(Ok(tok))) => Ok(Some(tok)),
            Some(Some(Err(e))) => Err(e.clone()),
            _ => Ok(None),
        }
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Option<Result<SpannedToken, LexError>> {
        match self.peeked.take() {
            Some(peeked) => peeked,
            None => self.next_inner(),
        }
    }

    fn next_inner(&mut self) -> Option<Result<SpannedToken, LexError>> {
        if self.failed {
            return None;
        }
        let result = self.inner.next()?;
        let span: Span = self.inner.span().into();
        match result {
            Ok(token) => Some(Ok(SpannedToken { token, span })),
            Err(()) => {
                self.failed = true;
                Some(Err(self.classify_error(span)))
            }
        }
    }

    fn classify_error(&self, span: Span) -> LexError {
        let source = self.inner.source();
        let rest = &source[span.start..];
        if rest.starts_with('"') {
            LexError::new(
                LexErrorKind::UnterminatedPhrase,
                Span::new(span.start, source.len()),
            )
        } else {
            let c = rest.chars().next().unwrap_or('\0');
            LexError::new(
                LexErrorKind::IllegalCharacter(c),
                Span::new(span.start, span.start + c.len_utf8()),
            )
        }
    }

    /// Get the source string.
    pub fn source(&self) -> &'source str {
        self.inner.source()
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<SpannedToken, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Tokenize a source string into a vector of spanned tokens.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, LexError> {
    Lexer::new(source).collect()
}
