use std::path::PathBuf;
use std::process;

use clap::Args;

use automi::diagnostic::render_diagnostics;
use automi::lower::render;
use automi::Phase;

use super::{options_or_exit, read_input};

#[derive(Args)]
pub struct PhasesArgs {
    /// Single-instance vertex program
    pub input: PathBuf,
    /// Print only this phase (gather, apply or scatter)
    #[arg(long)]
    pub phase: Option<Phase>,
    /// Convert without per-message track masks
    #[arg(long)]
    pub track_free: bool,
    /// Project file to use instead of searching for automi.toml
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

pub fn cmd_phases(args: PhasesArgs) {
    let source = read_input(&args.input);
    let options = options_or_exit(&args.input, args.config.as_deref(), args.track_free);
    let filename = args.input.display().to_string();

    let converted = match automi::convert_with_options(&source, &filename, &options) {
        Ok(converted) => converted,
        Err(errors) => {
            render_diagnostics(&errors, &filename, &source);
            process::exit(1);
        }
    };
    render_diagnostics(&converted.warnings, &filename, &source);

    for output in &converted.phases {
        if args.phase.is_some_and(|p| p != output.phase) {
            continue;
        }
        println!("// {} ({} masks)", output.phase, output.masks);
        println!("{}", render(&output.lines));
    }
}
