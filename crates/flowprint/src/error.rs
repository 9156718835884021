//! CLI error types.

use std::path::PathBuf;

use flowprint_config::ConfigError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("source document not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("HTML file not found: {}", .0.display())]
    HtmlNotFound(PathBuf),

    #[error("no converter produced a PDF from {}", .0.display())]
    ExportFailed(PathBuf),
}
