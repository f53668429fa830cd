mod driver;

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use owo_colors::OwoColorize;

use cflat_syntax::error::{CompileError, Warning};
use cflat_syntax::pos::Pos;

#[derive(Parser)]
#[command(name = "cflat", version, about = "Compile cflat source to x86-64 assembly")]
struct Args {
    /// Source file to compile
    input: PathBuf,

    /// Assembly output path; omit to analyze without writing a file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the parsed tree to stdout
    #[arg(long)]
    dump_ast: bool,
}

fn render_source_line(source: &str, pos: &Pos) {
    if let Some(src_line) = source.lines().nth(pos.line - 1) {
        let line_num_str = format!("{:3} | ", pos.line);
        eprintln!("     |");
        eprintln!("{}{}", line_num_str.bright_black(), src_line);

        let mut marker = String::new();
        marker.push_str(&" ".repeat(line_num_str.len()));
        if pos.col > 1 {
            marker.push_str(&" ".repeat(pos.col - 1));
        }
        marker.push('^');
        eprintln!("{}", marker.red());
        eprintln!("     |");
    }
}

fn render_error(source: Option<&str>, err: &CompileError) {
    eprintln!("{}: {}", "error".red().bold(), err.to_string().red());
    if let (Some(source), Some(pos)) = (source, err.pos()) {
        render_source_line(source, pos);
    }
}

fn render_warning(warning: &Warning) {
    eprintln!("{}: {}", "warning".yellow().bold(), warning);
}

fn main() {
    let args = Args::parse();

    // Kept around for caret rendering; the driver re-opens the file itself.
    let source_text = fs::read_to_string(&args.input).ok();

    match driver::compile(&args.input, args.output.as_deref(), driver::NO_FLAGS) {
        Ok(compilation) => {
            for warning in &compilation.warnings {
                render_warning(warning);
            }
            if args.dump_ast {
                print!("{}", compilation.root.dump());
            }
        }
        Err(err) => {
            render_error(source_text.as_deref(), &err);
            std::process::exit(1);
        }
    }
}
