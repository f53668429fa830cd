//! Recursive-descent parser for the cflat grammar.
//!
//! ```text
//! program      → statement* ;
//! statement    → if_stmt | while_stmt | for_stmt | return_stmt
//!              | decl_or_fn | block | preprocessor | expr_stmt ;
//! if_stmt      → "if" "(" expression ")" statement ( "else" statement )? ;
//! while_stmt   → "while" "(" expression ")" statement ;
//! for_stmt     → "for" "(" expression ";" expression ";" expression ")" statement ;
//! return_stmt  → "return" expression? ";" ;
//! decl_or_fn   → TYPE IDENT "(" params ")" block        (function definition)
//!              | TYPE IDENT ( "=" expression )? ";" ;   (variable declaration)
//! params       → ( TYPE IDENT ( "," TYPE IDENT )* )? ;
//! block        → "{" statement* "}" ;
//! expression   → assignment ;
//! assignment   → equality ( "=" assignment )? ;
//! equality     → comparison ( "==" comparison )* ;
//! comparison   → term ( ( "<" | ">" | "<=" | ">=" ) term )* ;
//! term         → factor ( ( "+" | "-" ) factor )* ;
//! factor       → unary ( ( "*" | "/" ) unary )* ;
//! unary        → ( "-" | "!" | "~" ) unary | primary ;
//! primary      → IDENT | IDENT "(" args ")" | NUMBER | STRING
//!              | "(" expression ")" ;
//! ```
//!
//! The decl_or_fn choice is made with two-token lookahead: a type keyword
//! followed by an identifier and then `(` starts a function definition,
//! anything else a variable declaration. An `else` always binds to the
//! nearest open `if`.
//!
//! Every grammar violation fails immediately with a positioned
//! [`SyntaxError`]; there is no recovery or multi-error reporting.

use crate::stream::TokenStream;
use cflat_syntax::ast::{Node, NodeKind, Param};
use cflat_syntax::error::SyntaxError;
use cflat_syntax::pos::Pos;
use cflat_syntax::token::{Token, TokenKind};

/// Keywords that can begin a declaration or function definition.
const TYPE_KEYWORDS: &[&str] = &[
    "int", "char", "short", "float", "double", "void", "signed", "unsigned",
];

pub struct Parser {
    stream: TokenStream,
    /// Position of the most recently consumed token, for end-of-input
    /// diagnostics.
    last_pos: Pos,
}

type Result<T> = std::result::Result<T, SyntaxError>;

impl Parser {
    /// Build a parser over a lexed token sequence. Newline and comment
    /// tokens carry no grammar; this consumer drops them up front so that
    /// the two-token lookahead counts only significant tokens.
    pub fn new(tokens: Vec<Token>, filename: &str) -> Self {
        let significant: Vec<Token> = tokens
            .into_iter()
            .filter(|t| !t.is_newline() && !t.is_comment())
            .collect();
        Self {
            stream: TokenStream::new(significant),
            last_pos: Pos::start_of(filename),
        }
    }

    /// Parse the whole token sequence into a Root node.
    pub fn parse_program(&mut self) -> Result<Node> {
        let pos = self
            .stream
            .peek()
            .map(|t| t.pos.clone())
            .unwrap_or_else(|| self.last_pos.clone());
        let mut statements = Vec::new();
        while !self.stream.is_at_end() {
            statements.push(self.parse_statement()?);
        }
        Ok(Node::new(NodeKind::Root { statements }, pos))
    }

    /// Parse a single statement; exposed for tests and tooling.
    pub fn parse_statement(&mut self) -> Result<Node> {
        let token = self.peek_or_eof()?;
        if token.is_keyword("if") {
            return self.parse_if();
        }
        if token.is_keyword("while") {
            return self.parse_while();
        }
        if token.is_keyword("for") {
            return self.parse_for();
        }
        if token.is_keyword("return") {
            return self.parse_return();
        }
        if Self::is_type_keyword(token) {
            return self.parse_declaration_or_function();
        }
        if token.is_symbol('{') {
            return self.parse_block();
        }
        if token.is_symbol('#') {
            return self.parse_preprocessor();
        }
        self.parse_expression_statement()
    }

    fn is_type_keyword(token: &Token) -> bool {
        TYPE_KEYWORDS.iter().any(|kw| token.is_keyword(kw))
    }

    /// The central disambiguation of the grammar: after a type keyword,
    /// look two tokens ahead. `TYPE IDENT (` is a function definition,
    /// everything else is a variable declaration.
    fn parse_declaration_or_function(&mut self) -> Result<Node> {
        let name_is_ident = self.stream.peek_ahead(1).is_some_and(|t| t.is_ident());
        let opens_paren = self.stream.peek_ahead(2).is_some_and(|t| t.is_symbol('('));
        if name_is_ident && opens_paren {
            self.parse_function_definition()
        } else {
            self.parse_declaration()
        }
    }

    fn parse_function_definition(&mut self) -> Result<Node> {
        let (return_type, pos) = self.expect_type_keyword()?;
        let (name, _) = self.expect_ident()?;
        self.expect_symbol('(')?;

        let mut params = Vec::new();
        if !self.check_symbol(')') {
            loop {
                let (type_name, _) = self.expect_type_keyword()?;
                let (param_name, _) = self.expect_ident()?;
                params.push(Param {
                    type_name,
                    name: param_name,
                });
                if !self.match_operator(",") {
                    break;
                }
            }
        }
        self.expect_symbol(')')?;

        let body = self.parse_block()?;
        Ok(Node::new(
            NodeKind::FunctionDefinition {
                return_type,
                name,
                params,
                body: Box::new(body),
            },
            pos,
        ))
    }

    fn parse_declaration(&mut self) -> Result<Node> {
        let (type_name, pos) = self.expect_type_keyword()?;
        let (name, _) = self.expect_ident()?;
        let initializer = if self.match_operator("=") {
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };
        self.expect_symbol(';')?;
        Ok(Node::new(
            NodeKind::Declaration {
                type_name,
                name,
                initializer,
            },
            pos,
        ))
    }

    fn parse_block(&mut self) -> Result<Node> {
        let open = self.expect_symbol('{')?;
        let mut statements = Vec::new();
        while !self.check_symbol('}') {
            if self.stream.is_at_end() {
                return Err(self.eof_error());
            }
            statements.push(self.parse_statement()?);
        }
        self.expect_symbol('}')?;
        Ok(Node::new(NodeKind::Block { statements }, open.pos))
    }

    fn parse_if(&mut self) -> Result<Node> {
        let kw = self.advance_or_eof()?;
        self.expect_symbol('(')?;
        let condition = self.parse_expression()?;
        self.expect_symbol(')')?;
        let then_branch = self.parse_statement()?;
        let else_branch = if self.match_keyword("else") {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Node::new(
            NodeKind::If {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch,
            },
            kw.pos,
        ))
    }

    fn parse_while(&mut self) -> Result<Node> {
        let kw = self.advance_or_eof()?;
        self.expect_symbol('(')?;
        let condition = self.parse_expression()?;
        self.expect_symbol(')')?;
        let body = self.parse_statement()?;
        Ok(Node::new(
            NodeKind::While {
                condition: Box::new(condition),
                body: Box::new(body),
            },
            kw.pos,
        ))
    }

    fn parse_for(&mut self) -> Result<Node> {
        let kw = self.advance_or_eof()?;
        self.expect_symbol('(')?;
        let init = self.parse_expression()?;
        self.expect_symbol(';')?;
        let condition = self.parse_expression()?;
        self.expect_symbol(';')?;
        let step = self.parse_expression()?;
        self.expect_symbol(')')?;
        let body = self.parse_statement()?;
        Ok(Node::new(
            NodeKind::For {
                init: Box::new(init),
                condition: Box::new(condition),
                step: Box::new(step),
                body: Box::new(body),
            },
            kw.pos,
        ))
    }

    fn parse_return(&mut self) -> Result<Node> {
        let kw = self.advance_or_eof()?;
        let value = if self.check_symbol(';') {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_symbol(';')?;
        Ok(Node::new(NodeKind::Return { value }, kw.pos))
    }

    /// `#include <header>`; the lexer has already folded the `<...>` path
    /// into a string token.
    fn parse_preprocessor(&mut self) -> Result<Node> {
        let hash = self.advance_or_eof()?;
        let directive = self.advance_or_eof()?;
        if !directive.is_keyword("include") {
            return Err(SyntaxError::UnexpectedToken {
                found: directive.to_string(),
                pos: directive.pos,
            });
        }
        let argument = self.advance_or_eof()?;
        match argument.kind {
            TokenKind::Str(path) => Ok(Node::new(
                NodeKind::Preprocessor {
                    directive: "include".to_string(),
                    argument: path,
                },
                hash.pos,
            )),
            _ => Err(SyntaxError::ExpectedToken {
                expected: "a header path".to_string(),
                found: argument.to_string(),
                pos: argument.pos,
            }),
        }
    }

    fn parse_expression_statement(&mut self) -> Result<Node> {
        let expr = self.parse_expression()?;
        let pos = expr.pos.clone();
        self.expect_symbol(';')?;
        Ok(Node::new(
            NodeKind::ExpressionStatement {
                expr: Box::new(expr),
            },
            pos,
        ))
    }

    /// Parse a single expression; exposed for tests and tooling.
    pub fn parse_expression(&mut self) -> Result<Node> {
        self.parse_assignment()
    }

    // Assignment is right-associative and the lowest precedence level.
    fn parse_assignment(&mut self) -> Result<Node> {
        let left = self.parse_equality()?;
        if self.match_operator("=") {
            let right = self.parse_assignment()?;
            let pos = left.pos.clone();
            return Ok(Node::new(
                NodeKind::BinaryOp {
                    op: "=".to_string(),
                    left: Box::new(left),
                    right: Box::new(right),
                },
                pos,
            ));
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Node> {
        let mut left = self.parse_comparison()?;
        while let Some(op) = self.match_any_operator(&["=="]) {
            let right = self.parse_comparison()?;
            left = Self::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Node> {
        let mut left = self.parse_term()?;
        while let Some(op) = self.match_any_operator(&["<", ">", "<=", ">="]) {
            let right = self.parse_term()?;
            left = Self::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Node> {
        let mut left = self.parse_factor()?;
        while let Some(op) = self.match_any_operator(&["+", "-"]) {
            let right = self.parse_factor()?;
            left = Self::binary(op, left, right);
        }
        Ok(left)
    }

    // Division arrives as the '/' symbol token, multiplication as the '*'
    // operator token; both sit at the same precedence level.
    fn parse_factor(&mut self) -> Result<Node> {
        let mut left = self.parse_unary()?;
        loop {
            let op = if self.peek_is_operator("*") {
                self.advance_or_eof()?;
                "*".to_string()
            } else if self.check_symbol('/') {
                self.advance_or_eof()?;
                "/".to_string()
            } else {
                break;
            };
            let right = self.parse_unary()?;
            left = Self::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Node> {
        let is_unary = self
            .stream
            .peek()
            .is_some_and(|t| t.is_operator("-") || t.is_operator("!") || t.is_operator("~"));
        if is_unary {
            // The operator token leads the node, so its position wins.
            let token = self.advance_or_eof()?;
            let op = match token.kind {
                TokenKind::Operator(op) => op,
                _ => unreachable!("unary operators are operator tokens"),
            };
            let operand = self.parse_unary()?;
            return Ok(Node::new(
                NodeKind::UnaryOp {
                    op,
                    operand: Box::new(operand),
                },
                token.pos,
            ));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Node> {
        let token = self.advance_or_eof()?;
        match token.kind {
            TokenKind::Number(value) => Ok(Node::new(NodeKind::Number { value }, token.pos)),
            TokenKind::Str(value) => Ok(Node::new(NodeKind::StringLit { value }, token.pos)),
            TokenKind::Ident(name) => {
                if self.check_symbol('(') {
                    self.parse_call(name, token.pos)
                } else {
                    Ok(Node::new(NodeKind::Identifier { name }, token.pos))
                }
            }
            TokenKind::Symbol('(') => {
                // Parenthesized expressions contribute no node of their own.
                let inner = self.parse_expression()?;
                self.expect_symbol(')')?;
                Ok(inner)
            }
            _ => Err(SyntaxError::ExpectedToken {
                expected: "an expression".to_string(),
                found: token.to_string(),
                pos: token.pos,
            }),
        }
    }

    /// `name(args)` — the identifier has been consumed and the next token
    /// is known to be `(`.
    fn parse_call(&mut self, name: String, pos: Pos) -> Result<Node> {
        self.expect_symbol('(')?;
        let mut args = Vec::new();
        if !self.check_symbol(')') {
            loop {
                args.push(self.parse_expression()?);
                if !self.match_operator(",") {
                    break;
                }
            }
        }
        self.expect_symbol(')')?;
        Ok(Node::new(NodeKind::FunctionCall { name, args }, pos))
    }

    fn binary(op: String, left: Node, right: Node) -> Node {
        let pos = left.pos.clone();
        Node::new(
            NodeKind::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            pos,
        )
    }

    // --- token-level helpers -------------------------------------------

    fn eof_error(&self) -> SyntaxError {
        SyntaxError::UnexpectedEndOfInput {
            pos: self.last_pos.clone(),
        }
    }

    fn peek_or_eof(&self) -> Result<&Token> {
        self.stream.peek().ok_or_else(|| self.eof_error())
    }

    fn advance_or_eof(&mut self) -> Result<Token> {
        match self.stream.advance() {
            Some(token) => {
                self.last_pos = token.pos.clone();
                Ok(token)
            }
            None => Err(self.eof_error()),
        }
    }

    fn check_symbol(&self, c: char) -> bool {
        self.stream.peek().is_some_and(|t| t.is_symbol(c))
    }

    fn peek_is_operator(&self, op: &str) -> bool {
        self.stream.peek().is_some_and(|t| t.is_operator(op))
    }

    fn expect_symbol(&mut self, c: char) -> Result<Token> {
        match self.stream.peek() {
            Some(t) if t.is_symbol(c) => self.advance_or_eof(),
            Some(t) => Err(SyntaxError::ExpectedToken {
                expected: format!("'{}'", c),
                found: t.to_string(),
                pos: t.pos.clone(),
            }),
            None => Err(self.eof_error()),
        }
    }

    fn expect_ident(&mut self) -> Result<(String, Pos)> {
        let token = self.advance_or_eof()?;
        match token.kind {
            TokenKind::Ident(name) => Ok((name, token.pos)),
            _ => Err(SyntaxError::ExpectedToken {
                expected: "an identifier".to_string(),
                found: token.to_string(),
                pos: token.pos,
            }),
        }
    }

    fn expect_type_keyword(&mut self) -> Result<(String, Pos)> {
        let token = self.advance_or_eof()?;
        if Self::is_type_keyword(&token) {
            match token.kind {
                TokenKind::Keyword(name) => Ok((name, token.pos)),
                _ => unreachable!("type keywords are keyword tokens"),
            }
        } else {
            Err(SyntaxError::ExpectedToken {
                expected: "a type specifier".to_string(),
                found: token.to_string(),
                pos: token.pos,
            })
        }
    }

    fn match_operator(&mut self, op: &str) -> bool {
        if self.peek_is_operator(op) {
            if let Some(token) = self.stream.advance() {
                self.last_pos = token.pos;
            }
            true
        } else {
            false
        }
    }

    fn match_any_operator(&mut self, ops: &[&str]) -> Option<String> {
        for op in ops {
            if self.match_operator(op) {
                return Some((*op).to_string());
            }
        }
        None
    }

    fn match_keyword(&mut self, kw: &str) -> bool {
        if self.stream.peek().is_some_and(|t| t.is_keyword(kw)) {
            if let Some(token) = self.stream.advance() {
                self.last_pos = token.pos;
            }
            true
        } else {
            false
        }
    }
}
