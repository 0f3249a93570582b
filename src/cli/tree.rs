use std::path::PathBuf;
use std::process;

use clap::Args;

use automi::annotate::annotate_body;
use automi::diagnostic::render_diagnostics;
use automi::Phase;

use super::{load_program, read_input};

#[derive(Args)]
pub struct TreeArgs {
    /// Single-instance vertex program
    pub input: PathBuf,
    /// Phase whose annotated tree to print
    #[arg(long)]
    pub phase: Phase,
}

pub fn cmd_tree(args: TreeArgs) {
    let source = read_input(&args.input);
    let program = load_program(&args.input, &source);
    let filename = args.input.display().to_string();

    let Some(method) = program.vertex_program.phase(args.phase) else {
        eprintln!("error: no {} method in '{}'", args.phase, filename);
        process::exit(1);
    };
    let annotated = match annotate_body(&method.body) {
        Ok(annotated) => annotated,
        Err(e) => {
            render_diagnostics(&[e], &filename, &source);
            process::exit(1);
        }
    };
    render_diagnostics(&annotated.warnings, &filename, &source);

    match serde_json::to_string_pretty(&annotated.root) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("error: cannot serialize the tree: {}", e);
            process::exit(1);
        }
    }
}
