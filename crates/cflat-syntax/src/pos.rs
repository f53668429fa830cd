//! Source positions for tokens and AST nodes.

use std::fmt;

/// A location in a source file.
///
/// Line and column are 1-based and monotonically increasing within a file.
/// Every token and every AST node carries the position of its leading
/// character so that diagnostics can point at the exact spot.
///
/// # Examples
///
/// ```rust
/// use cflat_syntax::Pos;
///
/// let pos = Pos::new(3, 14, "main.c");
/// assert_eq!(pos.to_string(), "line 3, col 14, in file main.c");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pos {
    /// Line number in the source file (1-based)
    pub line: usize,

    /// Column number in the source file (1-based)
    pub col: usize,

    /// Path of the source file this position belongs to
    pub filename: String,
}

impl Pos {
    pub fn new(line: usize, col: usize, filename: impl Into<String>) -> Self {
        Self {
            line,
            col,
            filename: filename.into(),
        }
    }

    /// Starting position of a file: line 1, column 1.
    pub fn start_of(filename: impl Into<String>) -> Self {
        Self::new(1, 1, filename)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, col {}, in file {}",
            self.line, self.col, self.filename
        )
    }
}
