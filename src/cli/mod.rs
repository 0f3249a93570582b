pub mod convert;
pub mod phases;
pub mod tree;

use std::path::Path;
use std::process;

use automi::diagnostic::render_diagnostics;
use automi::project::Project;
use automi::{ConvertOptions, Error, SourceProgram};

/// Read an input file or exit.
pub fn read_input(input: &Path) -> String {
    match std::fs::read_to_string(input) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", input.display(), e);
            process::exit(1);
        }
    }
}

/// Options for one input: an explicit `--config` file, else the nearest
/// automi.toml above the input. `--track-free` overrides either.
pub fn resolve_options(
    input: &Path,
    config: Option<&Path>,
    track_free: bool,
) -> Result<ConvertOptions, Error> {
    let toml_path = match config {
        Some(path) => Some(path.to_path_buf()),
        None => Project::find(input.parent().unwrap_or(Path::new("."))),
    };
    let mut options = match toml_path {
        Some(path) => {
            let project = Project::load(&path).map_err(|e| Error::Config {
                path: path.clone(),
                message: e.message,
            })?;
            ConvertOptions::from_project(&project)
        }
        None => ConvertOptions::default(),
    };
    if track_free {
        options.tracking = false;
    }
    Ok(options)
}

pub fn options_or_exit(input: &Path, config: Option<&Path>, track_free: bool) -> ConvertOptions {
    match resolve_options(input, config, track_free) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

/// Parse an input into its program pieces, rendering diagnostics on failure.
pub fn load_program(input: &Path, source: &str) -> SourceProgram {
    let filename = input.display().to_string();
    match automi::parse_program(source) {
        Ok(program) => {
            render_diagnostics(&program.warnings, &filename, source);
            program
        }
        Err(errors) => {
            render_diagnostics(&errors, &filename, source);
            process::exit(1);
        }
    }
}
