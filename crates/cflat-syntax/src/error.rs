//! Error taxonomy for the cflat compiler.
//!
//! Each pipeline stage has its own typed error enum, and every source-level
//! variant carries the [`Pos`] where it was detected. All stages fail fast:
//! the first error aborts the stage and propagates to the driver, which
//! renders it and reports a failed compilation. Display output follows the
//! diagnostic format `"<message> on line <L>, col <C>, in file <path>"`.
//!
//! # Examples
//!
//! ```rust
//! use cflat_syntax::{LexError, Pos};
//!
//! let err = LexError::UnexpectedCharacter {
//!     ch: '@',
//!     pos: Pos::new(2, 7, "main.c"),
//! };
//! assert_eq!(
//!     err.to_string(),
//!     "unexpected character '@' on line 2, col 7, in file main.c"
//! );
//! ```

use crate::pos::Pos;
use thiserror::Error;

/// Errors produced while turning source text into tokens.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LexError {
    #[error("unexpected character '{ch}' on {pos}")]
    UnexpectedCharacter { ch: char, pos: Pos },

    #[error("the operator '{op}' isn't valid on {pos}")]
    InvalidOperator { op: String, pos: Pos },

    #[error("closing parenthesis without a matching opening one on {pos}")]
    UnbalancedParenthesis { pos: Pos },

    #[error("multiline comment is never closed on {pos}")]
    UnterminatedComment { pos: Pos },

    #[error("number literal '{literal}' does not fit in 64 bits on {pos}")]
    NumberOverflow { literal: String, pos: Pos },

    #[error("missing closing quote for literal on {pos}")]
    MissingClosingQuote { pos: Pos },
}

impl LexError {
    pub fn pos(&self) -> &Pos {
        match self {
            LexError::UnexpectedCharacter { pos, .. }
            | LexError::InvalidOperator { pos, .. }
            | LexError::UnbalancedParenthesis { pos }
            | LexError::UnterminatedComment { pos }
            | LexError::NumberOverflow { pos, .. }
            | LexError::MissingClosingQuote { pos } => pos,
        }
    }
}

/// Errors produced by the recursive-descent parser.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SyntaxError {
    #[error("expected {expected}, found {found} on {pos}")]
    ExpectedToken {
        expected: String,
        found: String,
        pos: Pos,
    },

    #[error("unexpected {found} on {pos}")]
    UnexpectedToken { found: String, pos: Pos },

    #[error("unexpected end of input on {pos}")]
    UnexpectedEndOfInput { pos: Pos },
}

impl SyntaxError {
    pub fn pos(&self) -> &Pos {
        match self {
            SyntaxError::ExpectedToken { pos, .. }
            | SyntaxError::UnexpectedToken { pos, .. }
            | SyntaxError::UnexpectedEndOfInput { pos } => pos,
        }
    }
}

/// Errors produced while emitting assembly from a finished AST.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CodegenError {
    #[error("unknown symbol '{name}' on {pos}")]
    UnknownSymbol { name: String, pos: Pos },

    #[error("cannot generate code for {kind} on {pos}")]
    UnsupportedNode { kind: String, pos: Pos },
}

impl CodegenError {
    pub fn pos(&self) -> &Pos {
        match self {
            CodegenError::UnknownSymbol { pos, .. }
            | CodegenError::UnsupportedNode { pos, .. } => pos,
        }
    }
}

/// A non-fatal diagnostic. Warnings render in the same position format as
/// errors but never terminate the run.
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub message: String,
    pub pos: Pos,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} on {}", self.message, self.pos)
    }
}

/// Top-level error for one compilation run.
///
/// The driver converts any stage error into this type. The two I/O cases
/// are checked before lexing begins and short-circuit the whole run.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("cannot open input file '{path}': {source}")]
    CannotOpenInput {
        path: String,
        source: std::io::Error,
    },

    #[error("cannot open output file '{path}': {source}")]
    CannotOpenOutput {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Codegen(#[from] CodegenError),
}

impl CompileError {
    /// Source position of the error, when it has one (I/O errors do not).
    pub fn pos(&self) -> Option<&Pos> {
        match self {
            CompileError::Lex(e) => Some(e.pos()),
            CompileError::Syntax(e) => Some(e.pos()),
            CompileError::Codegen(e) => Some(e.pos()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_formats_position_suffix() {
        let err = LexError::NumberOverflow {
            literal: "18446744073709551616".to_string(),
            pos: Pos::new(4, 1, "big.c"),
        };
        assert_eq!(
            err.to_string(),
            "number literal '18446744073709551616' does not fit in 64 bits on line 4, col 1, in file big.c"
        );
    }

    #[test]
    fn compile_error_is_transparent_over_stage_errors() {
        let inner = SyntaxError::UnexpectedEndOfInput {
            pos: Pos::new(9, 2, "eof.c"),
        };
        let outer: CompileError = inner.clone().into();
        assert_eq!(outer.to_string(), inner.to_string());
        assert_eq!(outer.pos(), Some(inner.pos()));
    }

    #[test]
    fn io_errors_have_no_position() {
        let err = CompileError::CannotOpenInput {
            path: "missing.c".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.pos().is_none());
        assert!(err.to_string().contains("missing.c"));
    }
}
