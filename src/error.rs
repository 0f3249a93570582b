//! File-level driver errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::diagnostic::Diagnostic;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("'{path}' did not convert ({} error(s))", .diagnostics.len())]
    Convert {
        path: PathBuf,
        /// Source text, kept so the diagnostics can be rendered.
        source_text: String,
        diagnostics: Vec<Diagnostic>,
    },

    #[error("invalid project file '{path}': {message}")]
    Config { path: PathBuf, message: String },
}

impl Error {
    /// Render attached diagnostics (if any) to stderr.
    pub fn render(&self) {
        if let Error::Convert {
            path,
            source_text,
            diagnostics,
        } = self
        {
            let filename = path.display().to_string();
            crate::diagnostic::render_diagnostics(diagnostics, &filename, source_text);
        }
    }
}
