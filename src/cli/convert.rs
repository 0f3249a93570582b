use std::path::PathBuf;
use std::process;

use clap::Args;
use rayon::prelude::*;

use automi::diagnostic::render_diagnostics;
use automi::{Error, Report};

use super::resolve_options;

#[derive(Args)]
pub struct ConvertArgs {
    /// Single-instance vertex program(s) to convert
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
    /// Output file (single input only; default: <stem>.mi.cpp next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Emit code without per-message track masks
    #[arg(long)]
    pub track_free: bool,
    /// Project file to use instead of searching for automi.toml
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

pub fn cmd_convert(args: ConvertArgs) {
    let ConvertArgs {
        inputs,
        output,
        track_free,
        config,
    } = args;
    if output.is_some() && inputs.len() > 1 {
        eprintln!("error: --output can only be used with a single input");
        process::exit(1);
    }

    let results: Vec<Result<Report, Error>> = inputs
        .par_iter()
        .map(|input| {
            let options = resolve_options(input, config.as_deref(), track_free)?;
            let output = output
                .clone()
                .unwrap_or_else(|| automi::default_output_path(input));
            automi::convert_file(input, &output, &options)
        })
        .collect();

    let mut failed = 0;
    for result in results {
        match result {
            Ok(report) => {
                let filename = report.input.display().to_string();
                render_diagnostics(&report.warnings, &filename, &report.source);
                eprintln!(
                    "Converted {} -> {} ({} masks, {} warnings)",
                    report.input.display(),
                    report.output.display(),
                    report.masks,
                    report.warnings.len()
                );
            }
            Err(e) => {
                e.render();
                eprintln!("error: {}", e);
                failed += 1;
            }
        }
    }
    if failed > 0 {
        eprintln!("{} of {} file(s) failed", failed, inputs.len());
        process::exit(1);
    }
}
