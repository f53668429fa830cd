//! AST (abstract syntax tree) types for the cflat language.
//!
//! The tree is single-owner: each node owns its children outright through
//! `Box` and `Vec`, so teardown is automatic and the structure can contain
//! no cycles. Nodes are built bottom-up by the parser and are not mutated
//! afterwards.

use crate::pos::Pos;
use std::fmt::Write;

/// A function parameter: `int x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub type_name: String,
    pub name: String,
}

/// An AST node: a kind plus the position of its leading token.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub pos: Pos,
}

/// Node kinds. Composite variants own their children.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Top-level container for a translation unit.
    Root { statements: Vec<Node> },

    /// `type name(params) { ... }`
    FunctionDefinition {
        return_type: String,
        name: String,
        params: Vec<Param>,
        body: Box<Node>,
    },

    /// `type name;` or `type name = expr;`
    Declaration {
        type_name: String,
        name: String,
        initializer: Option<Box<Node>>,
    },

    /// `{ statement* }`
    Block { statements: Vec<Node> },

    /// `if (cond) stmt` with optional `else stmt`
    If {
        condition: Box<Node>,
        then_branch: Box<Node>,
        else_branch: Option<Box<Node>>,
    },

    /// `while (cond) stmt`
    While {
        condition: Box<Node>,
        body: Box<Node>,
    },

    /// `for (init; cond; step) stmt`
    For {
        init: Box<Node>,
        condition: Box<Node>,
        step: Box<Node>,
        body: Box<Node>,
    },

    /// `return;` or `return expr;`
    Return { value: Option<Box<Node>> },

    /// An expression in statement position, e.g. `x = 5;`
    ExpressionStatement { expr: Box<Node> },

    /// `left op right`
    BinaryOp {
        op: String,
        left: Box<Node>,
        right: Box<Node>,
    },

    /// `op operand`, e.g. `-x`, `!x`, `~x`
    UnaryOp { op: String, operand: Box<Node> },

    /// `name(args)`
    FunctionCall { name: String, args: Vec<Node> },

    /// A variable or function name in expression position
    Identifier { name: String },

    /// An unsigned integer literal
    Number { value: u64 },

    /// A string or quoted literal
    StringLit { value: String },

    /// `#include <header>` and friends; carried through, never expanded
    Preprocessor { directive: String, argument: String },
}

impl Node {
    pub fn new(kind: NodeKind, pos: Pos) -> Self {
        Self { kind, pos }
    }

    /// Render the tree as indented text, pre-order, two spaces per depth
    /// level. Printing is a pure traversal: repeated calls on the same
    /// root produce byte-identical output.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        out
    }

    fn dump_into(&self, out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        match &self.kind {
            NodeKind::Root { statements } => {
                out.push_str("Root\n");
                for s in statements {
                    s.dump_into(out, depth + 1);
                }
            }
            NodeKind::FunctionDefinition {
                return_type,
                name,
                params,
                body,
            } => {
                let _ = write!(out, "FunctionDefinition {} {}(", return_type, name);
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    let _ = write!(out, "{} {}", p.type_name, p.name);
                }
                out.push_str(")\n");
                body.dump_into(out, depth + 1);
            }
            NodeKind::Declaration {
                type_name,
                name,
                initializer,
            } => {
                let _ = writeln!(out, "Declaration {} {}", type_name, name);
                if let Some(init) = initializer {
                    init.dump_into(out, depth + 1);
                }
            }
            NodeKind::Block { statements } => {
                out.push_str("Block\n");
                for s in statements {
                    s.dump_into(out, depth + 1);
                }
            }
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                out.push_str("If\n");
                condition.dump_into(out, depth + 1);
                then_branch.dump_into(out, depth + 1);
                if let Some(eb) = else_branch {
                    for _ in 0..depth {
                        out.push_str("  ");
                    }
                    out.push_str("Else\n");
                    eb.dump_into(out, depth + 1);
                }
            }
            NodeKind::While { condition, body } => {
                out.push_str("While\n");
                condition.dump_into(out, depth + 1);
                body.dump_into(out, depth + 1);
            }
            NodeKind::For {
                init,
                condition,
                step,
                body,
            } => {
                out.push_str("For\n");
                init.dump_into(out, depth + 1);
                condition.dump_into(out, depth + 1);
                step.dump_into(out, depth + 1);
                body.dump_into(out, depth + 1);
            }
            NodeKind::Return { value } => {
                out.push_str("Return\n");
                if let Some(v) = value {
                    v.dump_into(out, depth + 1);
                }
            }
            NodeKind::ExpressionStatement { expr } => {
                out.push_str("ExpressionStatement\n");
                expr.dump_into(out, depth + 1);
            }
            NodeKind::BinaryOp { op, left, right } => {
                let _ = writeln!(out, "BinaryOp {}", op);
                left.dump_into(out, depth + 1);
                right.dump_into(out, depth + 1);
            }
            NodeKind::UnaryOp { op, operand } => {
                let _ = writeln!(out, "UnaryOp {}", op);
                operand.dump_into(out, depth + 1);
            }
            NodeKind::FunctionCall { name, args } => {
                let _ = writeln!(out, "FunctionCall {}", name);
                for a in args {
                    a.dump_into(out, depth + 1);
                }
            }
            NodeKind::Identifier { name } => {
                let _ = writeln!(out, "Identifier {}", name);
            }
            NodeKind::Number { value } => {
                let _ = writeln!(out, "Number {}", value);
            }
            NodeKind::StringLit { value } => {
                let _ = writeln!(out, "String \"{}\"", value);
            }
            NodeKind::Preprocessor {
                directive,
                argument,
            } => {
                let _ = writeln!(out, "Preprocessor #{} {}", directive, argument);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> Pos {
        Pos::new(1, 1, "test.c")
    }

    fn num(value: u64) -> Node {
        Node::new(NodeKind::Number { value }, pos())
    }

    #[test]
    fn dump_indents_by_depth() {
        let tree = Node::new(
            NodeKind::Root {
                statements: vec![Node::new(
                    NodeKind::BinaryOp {
                        op: "+".to_string(),
                        left: Box::new(num(1)),
                        right: Box::new(num(2)),
                    },
                    pos(),
                )],
            },
            pos(),
        );
        assert_eq!(
            tree.dump(),
            "Root\n  BinaryOp +\n    Number 1\n    Number 2\n"
        );
    }

    #[test]
    fn dump_is_idempotent() {
        let tree = Node::new(
            NodeKind::If {
                condition: Box::new(Node::new(
                    NodeKind::Identifier {
                        name: "x".to_string(),
                    },
                    pos(),
                )),
                then_branch: Box::new(Node::new(NodeKind::Block { statements: vec![] }, pos())),
                else_branch: None,
            },
            pos(),
        );
        assert_eq!(tree.dump(), tree.dump());
    }

    #[test]
    fn dump_renders_else_branch_at_parent_depth() {
        let tree = Node::new(
            NodeKind::If {
                condition: Box::new(num(1)),
                then_branch: Box::new(num(2)),
                else_branch: Some(Box::new(num(3))),
            },
            pos(),
        );
        assert_eq!(
            tree.dump(),
            "If\n  Number 1\n  Number 2\nElse\n  Number 3\n"
        );
    }
}
