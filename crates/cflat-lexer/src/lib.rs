//! cflat lexer: converts source text into tokens.
//!
//! The lexer is a stateful character-stream scanner. Whitespace is skipped
//! (but remembered on the following token), newlines and comments become
//! real tokens, and an explicit parenthesis-depth counter tracks `(`/`)`
//! nesting together with the raw text of the innermost open group. Any
//! lexical error aborts the whole tokenize call; no partial token sequence
//! survives an error.

pub mod source;

pub use source::{CharSource, FileSource, StrSource};

use cflat_syntax::error::{LexError, Warning};
use cflat_syntax::pos::Pos;
use cflat_syntax::token::{Token, TokenKind};

/// The fixed reserved-word set of the language.
const KEYWORDS: &[&str] = &[
    "int", "signed", "char", "unsigned", "short", "float", "double", "void", "struct", "union",
    "static", "return", "include", "sizeof", "if", "else", "for", "while", "break", "switch",
    "continue", "case", "default", "typedef", "const",
];

/// Valid two-character operator combinations. A pair outside this table is
/// split: the second character is pushed back and the first stands alone.
const TWO_CHAR_OPERATORS: &[&str] = &[
    "++", "+=", "--", "-=", "/=", "*=", "&&", "||", "<<", ">>", "==", "->", ">=", "<=",
];

/// Operators that are valid as a single character.
const SINGLE_CHAR_OPERATORS: &[char] = &[
    '+', '-', '*', '/', '%', '=', '&', '|', '~', '!', '?', '<', '>', ',', '.',
];

/// Structural single-character symbols.
const SYMBOLS: &[char] = &[')', ']', ':', ';', '\\', '{', '}', '#', '(', '['];

fn is_operator_start(c: char) -> bool {
    matches!(
        c,
        '+' | '-' | '*' | '~' | '.' | ',' | '^' | '&' | '|' | '!' | '?' | '%' | '<' | '>' | '='
    )
}

/// Streaming scanner that produces tokens with positions.
///
/// All lexer state is explicit: the current position, the parenthesis
/// depth, and the lazily allocated raw-text buffer of the innermost open
/// `(` group. The depth is always >= 0; a `)` at depth zero is a reported
/// error, never an underflow.
pub struct Lexer<S: CharSource> {
    source: S,
    pos: Pos,
    paren_depth: usize,
    paren_buffer: Option<String>,
    warnings: Vec<Warning>,
}

impl Lexer<StrSource> {
    /// Lexer over an in-memory string, mainly for tests and tooling.
    pub fn from_str(input: &str, filename: &str) -> Self {
        Self::new(StrSource::new(input), filename)
    }
}

impl<S: CharSource> Lexer<S> {
    pub fn new(source: S, filename: &str) -> Self {
        Self {
            source,
            pos: Pos::start_of(filename),
            paren_depth: 0,
            paren_buffer: None,
            warnings: Vec::new(),
        }
    }

    /// Non-fatal diagnostics gathered during tokenization.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    fn peek(&mut self) -> Option<char> {
        self.source.peek_char()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.source.next_char()?;
        if self.paren_depth > 0 {
            if let Some(buf) = self.paren_buffer.as_mut() {
                buf.push(c);
            }
        }
        if c == '\n' {
            self.pos.line += 1;
            self.pos.col = 1;
        } else {
            self.pos.col += 1;
        }
        Some(c)
    }

    /// Undo one `advance`. Only ever used for non-newline characters.
    fn unread(&mut self, c: char) {
        self.source.push_back(c);
        self.pos.col -= 1;
        if self.paren_depth > 0 {
            if let Some(buf) = self.paren_buffer.as_mut() {
                buf.pop();
            }
        }
    }

    /// Skip spaces and tabs; returns true when any were consumed.
    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while matches!(self.peek(), Some(' ') | Some('\t') | Some('\r')) {
            self.advance();
            skipped = true;
        }
        skipped
    }

    /// Tokenize the entire input. No trailing end-of-file token is
    /// appended; the end of the vector is the end of input.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens: Vec<Token> = Vec::new();
        loop {
            let whitespace = self.skip_whitespace();
            let start = self.pos.clone();
            let Some(c) = self.peek() else { break };

            let kind = match c {
                '0'..='9' => self.read_number(&start)?,
                '"' => self.read_delimited('"', '"', &start)?,
                '\'' => self.read_quote(&start)?,
                '/' => self.read_slash_or_comment(&start)?,
                '<' if tokens.last().is_some_and(|t| t.is_keyword("include")) => {
                    self.read_delimited('<', '>', &start)?
                }
                '\n' => {
                    self.advance();
                    TokenKind::Newline
                }
                c if c.is_ascii_alphabetic() || c == '_' => self.read_ident_or_keyword(),
                c if SYMBOLS.contains(&c) => self.read_symbol(&start)?,
                c if is_operator_start(c) => self.read_operator(&start)?,
                other => {
                    return Err(LexError::UnexpectedCharacter {
                        ch: other,
                        pos: start,
                    })
                }
            };

            let mut token = Token::new(kind, start);
            token.whitespace = whitespace;
            if self.paren_depth > 0 {
                token.between_parens = self.paren_buffer.clone();
            }
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn read_number(&mut self, start: &Pos) -> Result<TokenKind, LexError> {
        let mut literal = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                literal.push(c);
                self.advance();
            } else {
                break;
            }
        }
        let value: u64 = literal.parse().map_err(|_| LexError::NumberOverflow {
            literal,
            pos: start.clone(),
        })?;
        Ok(TokenKind::Number(value))
    }

    fn read_ident_or_keyword(&mut self) -> TokenKind {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if KEYWORDS.contains(&text.as_str()) {
            TokenKind::Keyword(text)
        } else {
            TokenKind::Ident(text)
        }
    }

    /// Read a delimited literal; `"..."` strings carry their text raw (no
    /// escape processing), and `include <...>` paths come through here too.
    fn read_delimited(
        &mut self,
        open: char,
        close: char,
        start: &Pos,
    ) -> Result<TokenKind, LexError> {
        let first = self.advance();
        debug_assert_eq!(first, Some(open));
        let mut text = String::new();
        loop {
            match self.advance() {
                Some(c) if c == close => return Ok(TokenKind::Str(text)),
                Some(c) => text.push(c),
                None => {
                    return Err(LexError::MissingClosingQuote { pos: start.clone() });
                }
            }
        }
    }

    /// Read a `'...'` quoted literal with escape decoding for `\n \t \\ \'`.
    /// Unknown escapes keep the raw character and raise a warning.
    fn read_quote(&mut self, start: &Pos) -> Result<TokenKind, LexError> {
        let first = self.advance();
        debug_assert_eq!(first, Some('\''));
        let mut text = String::new();
        loop {
            match self.advance() {
                Some('\'') => return Ok(TokenKind::Str(text)),
                Some('\\') => match self.advance() {
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some('\\') => text.push('\\'),
                    Some('\'') => text.push('\''),
                    Some(other) => {
                        self.warnings.push(Warning {
                            message: format!("unknown escape sequence '\\{}'", other),
                            pos: start.clone(),
                        });
                        text.push(other);
                    }
                    None => {
                        return Err(LexError::MissingClosingQuote { pos: start.clone() });
                    }
                },
                Some(c) => text.push(c),
                None => {
                    return Err(LexError::MissingClosingQuote { pos: start.clone() });
                }
            }
        }
    }

    /// `//` starts a one-line comment, `/*` a block comment; a bare `/`
    /// is the division symbol.
    fn read_slash_or_comment(&mut self, start: &Pos) -> Result<TokenKind, LexError> {
        self.advance();
        match self.peek() {
            Some('/') => {
                self.advance();
                let mut text = String::new();
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    text.push(c);
                    self.advance();
                }
                Ok(TokenKind::Comment(text))
            }
            Some('*') => {
                self.advance();
                let mut text = String::new();
                while let Some(c) = self.advance() {
                    if c == '*' && self.peek() == Some('/') {
                        self.advance();
                        return Ok(TokenKind::Comment(text));
                    }
                    text.push(c);
                }
                Err(LexError::UnterminatedComment { pos: start.clone() })
            }
            _ => Ok(TokenKind::Symbol('/')),
        }
    }

    /// Greedy one-or-two character operator munch. An invalid two-character
    /// combination pushes the second character back; an invalid standalone
    /// operator is a hard error.
    fn read_operator(&mut self, start: &Pos) -> Result<TokenKind, LexError> {
        let first = self.advance().unwrap_or_default();

        // "..." is the only three-character operator; ".." alone splits
        // back into two separate dots.
        if first == '.' && self.peek() == Some('.') {
            self.advance();
            if self.peek() == Some('.') {
                self.advance();
                return Ok(TokenKind::Operator("...".to_string()));
            }
            self.unread('.');
            return Ok(TokenKind::Operator(".".to_string()));
        }

        let mut op = String::new();
        op.push(first);
        if let Some(second) = self.peek() {
            if is_operator_start(second) {
                let mut two = op.clone();
                two.push(second);
                if TWO_CHAR_OPERATORS.contains(&two.as_str()) {
                    self.advance();
                    return Ok(TokenKind::Operator(two));
                }
            }
        }

        if !SINGLE_CHAR_OPERATORS.contains(&first) {
            return Err(LexError::InvalidOperator {
                op,
                pos: start.clone(),
            });
        }
        Ok(TokenKind::Operator(op))
    }

    fn read_symbol(&mut self, start: &Pos) -> Result<TokenKind, LexError> {
        let c = self.advance().unwrap_or_default();
        match c {
            '(' => {
                self.paren_depth += 1;
                if self.paren_depth == 1 {
                    self.paren_buffer = Some(String::new());
                }
            }
            ')' => {
                if self.paren_depth == 0 {
                    return Err(LexError::UnbalancedParenthesis { pos: start.clone() });
                }
                self.paren_depth -= 1;
                if self.paren_depth == 0 {
                    self.paren_buffer = None;
                }
            }
            _ => {}
        }
        Ok(TokenKind::Symbol(c))
    }
}
