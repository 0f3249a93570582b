pub mod annotate;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod lower;
pub mod ops;
pub mod phase;
pub mod program;
pub mod syntax;

pub use config::project;
pub use config::ConvertOptions;
pub use diagnostic::{Diagnostic, Severity};
pub use error::Error;
pub use phase::{convert_phase, Phase, PhaseOutput};
pub use program::{convert_program, parse_program, Converted, SourceProgram};

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

/// Extension appended to the input stem for the default output path.
pub const OUTPUT_SUFFIX: &str = "mi.cpp";

/// Convert a single-instance program with default options.
pub fn convert(source: &str, filename: &str) -> Result<Converted, Vec<Diagnostic>> {
    convert_with_options(source, filename, &ConvertOptions::default())
}

#[instrument(skip(source, options), fields(tracking = options.tracking))]
pub fn convert_with_options(
    source: &str,
    filename: &str,
    options: &ConvertOptions,
) -> Result<Converted, Vec<Diagnostic>> {
    let program = parse_program(source)?;
    convert_program(&program, options)
}

/// Outcome of converting one file.
#[derive(Clone, Debug)]
pub struct Report {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Branch masks minted across the three phases.
    pub masks: u32,
    pub warnings: Vec<Diagnostic>,
    /// Input text, for rendering the warnings.
    pub source: String,
}

/// `<dir>/<stem>.mi.cpp` next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out".to_string());
    input.with_file_name(format!("{}.{}", stem, OUTPUT_SUFFIX))
}

/// Read, convert and write one file.
#[instrument(skip_all, fields(input = %input.display()))]
pub fn convert_file(
    input: &Path,
    output: &Path,
    options: &ConvertOptions,
) -> error::Result<Report> {
    let source = fs::read_to_string(input).map_err(|source| Error::Read {
        path: input.to_path_buf(),
        source,
    })?;
    let filename = input.display().to_string();
    let converted = match convert_with_options(&source, &filename, options) {
        Ok(converted) => converted,
        Err(diagnostics) => {
            return Err(Error::Convert {
                path: input.to_path_buf(),
                source_text: source,
                diagnostics,
            })
        }
    };
    fs::write(output, &converted.text).map_err(|source| Error::Write {
        path: output.to_path_buf(),
        source,
    })?;

    let masks: u32 = converted.phases.iter().map(|p| p.masks).sum();
    debug!(output = %output.display(), masks, "file converted");
    Ok(Report {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        masks,
        warnings: converted.warnings,
        source,
    })
}
