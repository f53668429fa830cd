//! The compile entry point: source file in, assembly file (optionally) out.

use std::fs;
use std::path::Path;

use cflat_codegen::Codegen;
use cflat_lexer::{FileSource, Lexer};
use cflat_parser::Parser;
use cflat_syntax::ast::Node;
use cflat_syntax::error::{CompileError, Warning};

/// Reserved option bitmask. No bits are recognized yet; callers pass
/// [`NO_FLAGS`].
pub type Flags = u32;

pub const NO_FLAGS: Flags = 0;

/// What a successful run produced.
pub struct Compilation {
    pub root: Node,
    pub warnings: Vec<Warning>,
}

/// Run the full pipeline on one source file.
///
/// Input I/O is checked before any lexing begins. With an `output` path the
/// tree is lowered to assembly and written there; without one the run stops
/// after parsing (analysis only, nothing written). The output file is
/// created only once generation has succeeded, so a failed compile never
/// leaves a file behind.
pub fn compile(
    source: &Path,
    output: Option<&Path>,
    _flags: Flags,
) -> Result<Compilation, CompileError> {
    let chars = FileSource::open(source).map_err(|e| CompileError::CannotOpenInput {
        path: source.display().to_string(),
        source: e,
    })?;

    let filename = source.display().to_string();
    let mut lexer = Lexer::new(chars, &filename);
    let tokens = lexer.tokenize()?;
    let warnings = lexer.warnings().to_vec();

    let root = Parser::new(tokens, &filename).parse_program()?;

    if let Some(output) = output {
        let asm = Codegen::new().generate(&root)?;
        fs::write(output, asm).map_err(|e| CompileError::CannotOpenOutput {
            path: output.display().to_string(),
            source: e,
        })?;
    }

    Ok(Compilation { root, warnings })
}
