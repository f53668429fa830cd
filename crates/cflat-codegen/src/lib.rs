//! cflat code generator: AST -> x86-64 AT&T assembly text.
//!
//! Expressions evaluate into `%rax` with intermediate operands spilled to
//! the machine stack, locals live at negative `%rbp` offsets recorded in a
//! per-function [`Frame`], and control flow uses local labels minted by a
//! [`LabelAllocator`]. Generation is fail-fast: an undeclared name or a
//! node with no lowering aborts the run with a [`CodegenError`].

pub mod frame;

pub use frame::{Frame, LabelAllocator};

use std::fmt::Write;

use cflat_syntax::ast::{Node, NodeKind, Param};
use cflat_syntax::error::CodegenError;

/// SysV AMD64 integer argument registers, in order.
const ARG_REGISTERS: [&str; 6] = ["%rdi", "%rsi", "%rdx", "%rcx", "%r8", "%r9"];

type Result<T> = std::result::Result<T, CodegenError>;

pub struct Codegen {
    out: String,
    labels: LabelAllocator,
    /// String literals hoisted into `.rodata`, flushed after the last
    /// function so they never interrupt a text section.
    rodata: Vec<(String, String)>,
}

impl Default for Codegen {
    fn default() -> Self {
        Self::new()
    }
}

impl Codegen {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            labels: LabelAllocator::new(),
            rodata: Vec::new(),
        }
    }

    /// Lower a finished tree to assembly text.
    pub fn generate(mut self, root: &Node) -> Result<String> {
        let NodeKind::Root { statements } = &root.kind else {
            return Err(CodegenError::UnsupportedNode {
                kind: describe(&root.kind).to_string(),
                pos: root.pos.clone(),
            });
        };

        self.line(&format!(".file \"{}\"", root.pos.filename));
        self.line(".text");

        // Top-level declarations share one frame, like function bodies do.
        let mut frame = Frame::new();
        for statement in statements {
            self.emit_statement(statement, &mut frame)?;
        }

        if !self.rodata.is_empty() {
            self.line(".section .rodata");
            for (label, text) in std::mem::take(&mut self.rodata) {
                self.label(&label);
                self.line(&format!(".string \"{}\"", text));
            }
        }
        self.line(".section .note.GNU-stack,\"\",@progbits");
        Ok(self.out)
    }

    fn emit_statement(&mut self, node: &Node, frame: &mut Frame) -> Result<()> {
        match &node.kind {
            NodeKind::FunctionDefinition {
                name, params, body, ..
            } => self.emit_function(node, name, params, body),

            NodeKind::Declaration {
                name, initializer, ..
            } => {
                let offset = frame.declare(name);
                self.line("subq $8, %rsp");
                match initializer {
                    Some(init) => {
                        self.emit_expression(init, frame)?;
                        self.line(&format!("movq %rax, {}(%rbp)", offset));
                    }
                    None => self.line(&format!("movq $0, {}(%rbp)", offset)),
                }
                Ok(())
            }

            NodeKind::Block { statements } => {
                for statement in statements {
                    self.emit_statement(statement, frame)?;
                }
                Ok(())
            }

            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.emit_expression(condition, frame)?;
                self.line("cmpq $0, %rax");
                let end = self.labels.fresh();
                match else_branch {
                    Some(else_branch) => {
                        let else_label = self.labels.fresh();
                        self.line(&format!("je {}", else_label));
                        self.emit_statement(then_branch, frame)?;
                        self.line(&format!("jmp {}", end));
                        self.label(&else_label);
                        self.emit_statement(else_branch, frame)?;
                    }
                    None => {
                        self.line(&format!("je {}", end));
                        self.emit_statement(then_branch, frame)?;
                    }
                }
                self.label(&end);
                Ok(())
            }

            NodeKind::While { condition, body } => {
                let start = self.labels.fresh();
                let end = self.labels.fresh();
                self.label(&start);
                self.emit_expression(condition, frame)?;
                self.line("cmpq $0, %rax");
                self.line(&format!("je {}", end));
                self.emit_statement(body, frame)?;
                self.line(&format!("jmp {}", start));
                self.label(&end);
                Ok(())
            }

            NodeKind::For {
                init,
                condition,
                step,
                body,
            } => {
                self.emit_expression(init, frame)?;
                let start = self.labels.fresh();
                let end = self.labels.fresh();
                self.label(&start);
                self.emit_expression(condition, frame)?;
                self.line("cmpq $0, %rax");
                self.line(&format!("je {}", end));
                self.emit_statement(body, frame)?;
                self.emit_expression(step, frame)?;
                self.line(&format!("jmp {}", start));
                self.label(&end);
                Ok(())
            }

            NodeKind::Return { value } => {
                if let Some(value) = value {
                    self.emit_expression(value, frame)?;
                }
                self.emit_epilogue();
                Ok(())
            }

            NodeKind::ExpressionStatement { expr } => {
                // Value left in %rax and discarded.
                self.emit_expression(expr, frame)
            }

            // Includes are inert at this stage; keep them visible in the
            // output as comments.
            NodeKind::Preprocessor {
                directive,
                argument,
            } => {
                self.line(&format!("# {} <{}>", directive, argument));
                Ok(())
            }

            other => Err(CodegenError::UnsupportedNode {
                kind: describe(other).to_string(),
                pos: node.pos.clone(),
            }),
        }
    }

    fn emit_function(
        &mut self,
        node: &Node,
        name: &str,
        params: &[Param],
        body: &Node,
    ) -> Result<()> {
        self.line(".text");
        self.line(&format!(".globl {}", name));
        self.line(&format!(".type {}, @function", name));
        self.label(name);
        self.line("pushq %rbp");
        self.line("movq %rsp, %rbp");

        let mut frame = Frame::new();
        for (index, param) in params.iter().enumerate() {
            let Some(register) = ARG_REGISTERS.get(index) else {
                return Err(CodegenError::UnsupportedNode {
                    kind: "a parameter past the sixth".to_string(),
                    pos: node.pos.clone(),
                });
            };
            let offset = frame.declare(&param.name);
            self.line("subq $8, %rsp");
            self.line(&format!("movq {}, {}(%rbp)", register, offset));
        }

        self.emit_statement(body, &mut frame)?;
        self.emit_epilogue();
        Ok(())
    }

    fn emit_epilogue(&mut self) {
        self.line("movq %rbp, %rsp");
        self.line("popq %rbp");
        self.line("ret");
    }

    /// Evaluate an expression; the result ends up in `%rax`.
    fn emit_expression(&mut self, node: &Node, frame: &mut Frame) -> Result<()> {
        match &node.kind {
            NodeKind::Number { value } => {
                self.line(&format!("movq ${}, %rax", value));
                Ok(())
            }

            NodeKind::Identifier { name } => {
                let offset = frame.resolve(name).ok_or_else(|| CodegenError::UnknownSymbol {
                    name: name.clone(),
                    pos: node.pos.clone(),
                })?;
                self.line(&format!("movq {}(%rbp), %rax", offset));
                Ok(())
            }

            NodeKind::StringLit { value } => {
                let label = format!(".LC{}", self.rodata.len());
                self.rodata.push((label.clone(), value.clone()));
                self.line(&format!("leaq {}(%rip), %rax", label));
                Ok(())
            }

            NodeKind::UnaryOp { op, operand } => {
                self.emit_expression(operand, frame)?;
                match op.as_str() {
                    "-" => self.line("negq %rax"),
                    "~" => self.line("notq %rax"),
                    "!" => {
                        self.line("cmpq $0, %rax");
                        self.line("sete %al");
                        self.line("movzbq %al, %rax");
                    }
                    other => {
                        return Err(CodegenError::UnsupportedNode {
                            kind: format!("unary operator '{}'", other),
                            pos: node.pos.clone(),
                        })
                    }
                }
                Ok(())
            }

            NodeKind::BinaryOp { op, left, right } if op == "=" => {
                let NodeKind::Identifier { name } = &left.kind else {
                    return Err(CodegenError::UnsupportedNode {
                        kind: "an assignment target".to_string(),
                        pos: left.pos.clone(),
                    });
                };
                let offset = frame.resolve(name).ok_or_else(|| CodegenError::UnknownSymbol {
                    name: name.clone(),
                    pos: left.pos.clone(),
                })?;
                self.emit_expression(right, frame)?;
                // The stored value stays in %rax, so assignment chains work.
                self.line(&format!("movq %rax, {}(%rbp)", offset));
                Ok(())
            }

            NodeKind::BinaryOp { op, left, right } => {
                self.emit_expression(left, frame)?;
                self.line("pushq %rax");
                self.emit_expression(right, frame)?;
                // Left operand in %rcx, right operand in %rax.
                self.line("popq %rcx");
                match op.as_str() {
                    "+" => self.line("addq %rcx, %rax"),
                    "-" => {
                        self.line("subq %rax, %rcx");
                        self.line("movq %rcx, %rax");
                    }
                    "*" => self.line("imulq %rcx, %rax"),
                    "/" => {
                        self.line("movq %rax, %r10");
                        self.line("movq %rcx, %rax");
                        self.line("cqo");
                        self.line("idivq %r10");
                    }
                    "==" => self.emit_comparison("sete"),
                    "<" => self.emit_comparison("setl"),
                    ">" => self.emit_comparison("setg"),
                    "<=" => self.emit_comparison("setle"),
                    ">=" => self.emit_comparison("setge"),
                    other => {
                        return Err(CodegenError::UnsupportedNode {
                            kind: format!("operator '{}'", other),
                            pos: node.pos.clone(),
                        })
                    }
                }
                Ok(())
            }

            NodeKind::FunctionCall { name, args } => {
                if args.len() > ARG_REGISTERS.len() {
                    return Err(CodegenError::UnsupportedNode {
                        kind: "a call with more than six arguments".to_string(),
                        pos: node.pos.clone(),
                    });
                }
                for arg in args {
                    self.emit_expression(arg, frame)?;
                    self.line("pushq %rax");
                }
                for index in (0..args.len()).rev() {
                    self.line(&format!("popq {}", ARG_REGISTERS[index]));
                }
                self.line(&format!("call {}", name));
                Ok(())
            }

            other => Err(CodegenError::UnsupportedNode {
                kind: describe(other).to_string(),
                pos: node.pos.clone(),
            }),
        }
    }

    /// `%rcx` (left) against `%rax` (right), 0/1 result in `%rax`.
    fn emit_comparison(&mut self, set: &str) {
        self.line("cmpq %rax, %rcx");
        self.line(&format!("{} %al", set));
        self.line("movzbq %al, %rax");
    }

    fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "\t{}", text);
    }

    fn label(&mut self, name: &str) {
        let _ = writeln!(self.out, "{}:", name);
    }
}

fn describe(kind: &NodeKind) -> &'static str {
    match kind {
        NodeKind::Root { .. } => "a nested root",
        NodeKind::FunctionDefinition { .. } => "a function definition",
        NodeKind::Declaration { .. } => "a declaration",
        NodeKind::Block { .. } => "a block",
        NodeKind::If { .. } => "an if statement",
        NodeKind::While { .. } => "a while loop",
        NodeKind::For { .. } => "a for loop",
        NodeKind::Return { .. } => "a return statement",
        NodeKind::ExpressionStatement { .. } => "an expression statement",
        NodeKind::BinaryOp { .. } => "a binary operation",
        NodeKind::UnaryOp { .. } => "a unary operation",
        NodeKind::FunctionCall { .. } => "a function call",
        NodeKind::Identifier { .. } => "an identifier",
        NodeKind::Number { .. } => "a number",
        NodeKind::StringLit { .. } => "a string literal",
        NodeKind::Preprocessor { .. } => "a preprocessor directive",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cflat_lexer::Lexer;
    use cflat_parser::Parser;

    fn gen(input: &str) -> String {
        let tokens = Lexer::from_str(input, "test.c").tokenize().unwrap();
        let root = Parser::new(tokens, "test.c").parse_program().unwrap();
        Codegen::new().generate(&root).unwrap()
    }

    fn gen_err(input: &str) -> CodegenError {
        let tokens = Lexer::from_str(input, "test.c").tokenize().unwrap();
        let root = Parser::new(tokens, "test.c").parse_program().unwrap();
        Codegen::new().generate(&root).unwrap_err()
    }

    #[test]
    fn function_gets_prologue_and_epilogue() {
        let asm = gen("int main() { return 0; }");
        assert!(asm.contains("\t.globl main\n"));
        assert!(asm.contains("\t.type main, @function\n"));
        assert!(asm.contains("main:\n\tpushq %rbp\n\tmovq %rsp, %rbp\n"));
        assert!(asm.contains("\tmovq %rbp, %rsp\n\tpopq %rbp\n\tret\n"));
    }

    #[test]
    fn module_carries_file_and_gnu_stack_directives() {
        let asm = gen("int main() { return 0; }");
        assert!(asm.starts_with("\t.file \"test.c\"\n\t.text\n"));
        assert!(asm.ends_with("\t.section .note.GNU-stack,\"\",@progbits\n"));
    }

    #[test]
    fn each_declaration_gets_its_own_slot() {
        let asm = gen("int main() { int a = 1; int b = 2; return a; }");
        assert!(asm.contains("movq %rax, -8(%rbp)"));
        assert!(asm.contains("movq %rax, -16(%rbp)"));
        assert!(asm.contains("movq -8(%rbp), %rax"));
    }

    #[test]
    fn uninitialized_declaration_zeroes_its_slot() {
        let asm = gen("int main() { int a; return 0; }");
        assert!(asm.contains("movq $0, -8(%rbp)"));
    }

    #[test]
    fn undeclared_name_is_a_fatal_unknown_symbol() {
        match gen_err("int main() { return x; }") {
            CodegenError::UnknownSymbol { name, pos } => {
                assert_eq!(name, "x");
                assert_eq!(pos.line, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn assignment_to_undeclared_name_fails() {
        assert!(matches!(
            gen_err("int main() { x = 1; return 0; }"),
            CodegenError::UnknownSymbol { .. }
        ));
    }

    #[test]
    fn labels_are_unique_across_statements() {
        let asm = gen("int main() { if (1) return 1; if (2) return 2; return 0; }");
        let mut labels: Vec<&str> = asm
            .lines()
            .filter(|l| l.starts_with(".L") && l.ends_with(':'))
            .collect();
        assert_eq!(labels.len(), 2);
        labels.dedup();
        assert_eq!(labels.len(), 2);
    }

    #[test]
    fn if_else_branches_around() {
        let asm = gen("int main() { if (1) return 1; else return 2; }");
        assert!(asm.contains("cmpq $0, %rax"));
        assert!(asm.contains("je .L1"));
        assert!(asm.contains("jmp .L0"));
        assert!(asm.contains(".L0:"));
        assert!(asm.contains(".L1:"));
    }

    #[test]
    fn while_loop_has_a_back_edge() {
        let asm = gen("int main() { int i = 0; while (i < 3) i = i + 1; return i; }");
        assert!(asm.contains(".L0:"));
        assert!(asm.contains("je .L1"));
        assert!(asm.contains("jmp .L0"));
        assert!(asm.contains(".L1:"));
    }

    #[test]
    fn for_loop_runs_init_condition_step() {
        let asm = gen("int main() { int i; for (i = 0; i < 3; i = i + 1) f(i); return i; }");
        assert!(asm.contains(".L0:"));
        assert!(asm.contains("jmp .L0"));
        assert!(asm.contains("call f"));
    }

    #[test]
    fn comparison_produces_zero_or_one() {
        let asm = gen("int main() { return 1 < 2; }");
        assert!(asm.contains("cmpq %rax, %rcx"));
        assert!(asm.contains("setl %al"));
        assert!(asm.contains("movzbq %al, %rax"));
    }

    #[test]
    fn division_sign_extends_the_dividend() {
        let asm = gen("int main() { return 8 / 2; }");
        assert!(asm.contains("cqo"));
        assert!(asm.contains("idivq %r10"));
    }

    #[test]
    fn unary_operators_lower_to_neg_not_sete() {
        let asm = gen("int main() { return -(!1); }");
        assert!(asm.contains("negq %rax"));
        assert!(asm.contains("sete %al"));
    }

    #[test]
    fn parameters_arrive_in_sysv_registers() {
        let asm = gen("int add(int a, int b) { return a + b; }");
        assert!(asm.contains("movq %rdi, -8(%rbp)"));
        assert!(asm.contains("movq %rsi, -16(%rbp)"));
    }

    #[test]
    fn call_arguments_fill_registers_in_order() {
        let asm = gen("int main() { f(1, 2, 3); return 0; }");
        assert!(asm.contains("popq %rdx"));
        assert!(asm.contains("popq %rsi"));
        assert!(asm.contains("popq %rdi"));
        assert!(asm.contains("call f"));
    }

    #[test]
    fn seventh_argument_is_rejected() {
        assert!(matches!(
            gen_err("int main() { f(1, 2, 3, 4, 5, 6, 7); return 0; }"),
            CodegenError::UnsupportedNode { .. }
        ));
    }

    #[test]
    fn seventh_parameter_is_rejected() {
        assert!(matches!(
            gen_err("int f(int a, int b, int c, int d, int e, int g, int h) { return 0; }"),
            CodegenError::UnsupportedNode { .. }
        ));
    }

    #[test]
    fn string_literals_land_in_rodata() {
        let asm = gen("int main() { puts(\"hi\"); return 0; }");
        assert!(asm.contains("leaq .LC0(%rip), %rax"));
        assert!(asm.contains("\t.section .rodata\n.LC0:\n\t.string \"hi\"\n"));
    }

    #[test]
    fn include_becomes_a_comment() {
        let asm = gen("#include <stdio.h>\nint main() { return 0; }");
        assert!(asm.contains("\t# include <stdio.h>\n"));
    }

    #[test]
    fn generation_is_deterministic() {
        let src = "int main() { if (1) return 1; else return 2; }";
        assert_eq!(gen(src), gen(src));
    }
}
