//! Token definitions for the cflat lexer.
//!
//! Tokens are the smallest meaningful units of cflat source code: keywords,
//! identifiers, operators, numbers, symbols, strings, comments, and
//! newlines. The lexer keeps newlines and comments as real tokens so that
//! downstream consumers decide for themselves whether to skip them.
//!
//! # Examples
//!
//! ```rust
//! use cflat_syntax::{Pos, Token, TokenKind};
//!
//! let tok = Token::new(TokenKind::Ident("main".to_string()), Pos::new(1, 5, "test.c"));
//! assert!(tok.is_ident());
//! assert_eq!(tok.pos.col, 5);
//! ```

use crate::pos::Pos;
use std::fmt;

/// Token categories produced by the lexer.
///
/// Each variant carries its semantic payload: keywords, identifiers,
/// operators, strings, and comments carry their text; numbers carry an
/// unsigned 64-bit value; symbols carry a single character. Reading the
/// wrong payload for a kind is a compile-time impossibility.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A reserved word (`int`, `return`, `if`, ...)
    Keyword(String),

    /// A one- or two-character operator (`+`, `==`, `<<`, `->`, ...)
    Operator(String),

    /// An identifier: variable, function, or type name
    Ident(String),

    /// An unsigned integer literal
    Number(u64),

    /// A structural single character (`(`, `)`, `{`, `;`, `#`, ...)
    Symbol(char),

    /// A string literal, including `'...'` quoted literals and
    /// `include <...>` header names
    Str(String),

    /// A `//` or `/* */` comment, with the delimiters stripped
    Comment(String),

    /// An explicit end-of-line marker
    Newline,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Keyword(s) => write!(f, "keyword '{}'", s),
            TokenKind::Operator(s) => write!(f, "operator '{}'", s),
            TokenKind::Ident(s) => write!(f, "identifier '{}'", s),
            TokenKind::Number(n) => write!(f, "number '{}'", n),
            TokenKind::Symbol(c) => write!(f, "'{}'", c),
            TokenKind::Str(s) => write!(f, "string \"{}\"", s),
            TokenKind::Comment(_) => write!(f, "comment"),
            TokenKind::Newline => write!(f, "newline"),
        }
    }
}

/// A token with its source location and lexer-side context.
///
/// `whitespace` records whether the token was preceded by spaces or tabs.
/// `between_parens` holds the raw text accumulated since the innermost
/// still-open `(` group started; it is `None` for tokens produced outside
/// any parenthesis group.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The category and payload of this token
    pub kind: TokenKind,

    /// Position of the token's first character
    pub pos: Pos,

    /// True when spaces or tabs immediately preceded this token
    pub whitespace: bool,

    /// Raw source text gathered since the enclosing `(` opened, if any
    pub between_parens: Option<String>,
}

impl Token {
    pub fn new(kind: TokenKind, pos: Pos) -> Self {
        Self {
            kind,
            pos,
            whitespace: false,
            between_parens: None,
        }
    }

    pub fn is_keyword(&self, kw: &str) -> bool {
        matches!(&self.kind, TokenKind::Keyword(s) if s == kw)
    }

    pub fn is_any_keyword(&self) -> bool {
        matches!(self.kind, TokenKind::Keyword(_))
    }

    pub fn is_operator(&self, op: &str) -> bool {
        matches!(&self.kind, TokenKind::Operator(s) if s == op)
    }

    pub fn is_any_operator(&self) -> bool {
        matches!(self.kind, TokenKind::Operator(_))
    }

    pub fn is_symbol(&self, c: char) -> bool {
        matches!(self.kind, TokenKind::Symbol(s) if s == c)
    }

    pub fn is_ident(&self) -> bool {
        matches!(self.kind, TokenKind::Ident(_))
    }

    pub fn is_newline(&self) -> bool {
        matches!(self.kind, TokenKind::Newline)
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.kind, TokenKind::Comment(_))
    }

    /// Text of the operator payload, if this token is an operator.
    pub fn operator(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Operator(s) => Some(s),
            _ => None,
        }
    }

    /// Text of the identifier payload, if this token is an identifier.
    pub fn ident(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(kind: TokenKind) -> Token {
        Token::new(kind, Pos::new(1, 1, "test.c"))
    }

    #[test]
    fn keyword_predicate_checks_payload() {
        let t = tok(TokenKind::Keyword("int".to_string()));
        assert!(t.is_keyword("int"));
        assert!(!t.is_keyword("return"));
        assert!(t.is_any_keyword());
    }

    #[test]
    fn symbol_predicate_checks_char() {
        let t = tok(TokenKind::Symbol(';'));
        assert!(t.is_symbol(';'));
        assert!(!t.is_symbol('{'));
    }

    #[test]
    fn display_names_the_kind() {
        assert_eq!(tok(TokenKind::Number(42)).to_string(), "number '42'");
        assert_eq!(
            tok(TokenKind::Operator("<<".to_string())).to_string(),
            "operator '<<'"
        );
        assert_eq!(tok(TokenKind::Symbol('{')).to_string(), "'{'");
    }
}
