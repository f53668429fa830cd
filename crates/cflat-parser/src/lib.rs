//! Recursive-descent parser for cflat.
//!
//! Consumes the token sequence produced by `cflat-lexer` and builds the
//! AST defined in `cflat-syntax`. Parsing is fail-fast: the first grammar
//! violation aborts with a positioned error.

pub mod parser;
pub mod stream;

pub use parser::Parser;
pub use stream::TokenStream;
