//! Converter contract and shared process plumbing.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

/// PDF conversion error.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Tool is not installed or not on `PATH`.
    #[error("{tool} not found")]
    Unavailable { tool: String },
    /// Tool process could not be started.
    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },
    /// Tool exited with a non-zero status.
    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },
    /// Tool reported success but wrote no file.
    #[error("{tool} produced no output at {}", path.display())]
    MissingOutput { tool: String, path: PathBuf },
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// One way of turning an HTML file into a PDF.
pub trait Converter {
    /// Human-readable name used in progress and failure messages.
    fn name(&self) -> &str;

    /// Whether output from this converter lacks diagrams and prose.
    fn degraded(&self) -> bool {
        false
    }

    /// Where this converter writes when `pdf` is the requested path.
    fn output_path(&self, pdf: &Path) -> PathBuf {
        pdf.to_path_buf()
    }

    /// Convert `html` into `pdf`.
    ///
    /// Success means the tool finished cleanly and `pdf` exists.
    fn convert(&self, html: &Path, pdf: &Path) -> Result<(), ConvertError>;
}

/// Run an external tool and check that it produced `output`.
pub(crate) fn run_tool(
    tool: &str,
    program: &Path,
    args: Vec<OsString>,
    output: &Path,
) -> Result<(), ConvertError> {
    tracing::debug!(tool, program = %program.display(), "Running converter");

    let result = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output();

    let out = match result {
        Ok(out) => out,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ConvertError::Unavailable {
                tool: tool.to_owned(),
            });
        }
        Err(source) => {
            return Err(ConvertError::Spawn {
                tool: tool.to_owned(),
                source,
            });
        }
    };

    if !out.status.success() {
        return Err(ConvertError::Failed {
            tool: tool.to_owned(),
            status: out.status,
            stderr: String::from_utf8_lossy(&out.stderr).trim().to_owned(),
        });
    }
    if !output.exists() {
        return Err(ConvertError::MissingOutput {
            tool: tool.to_owned(),
            path: output.to_path_buf(),
        });
    }
    Ok(())
}

/// Resolve a binary name to a path by searching `PATH`.
pub(crate) fn resolve_binary(binary: &str) -> Option<PathBuf> {
    resolve_binary_in(binary, &std::env::var_os("PATH").unwrap_or_default())
}

/// Resolve a binary name against the given `PATH` value.
///
/// Names containing a path separator are checked as-is.
pub(crate) fn resolve_binary_in(binary: &str, path_var: &std::ffi::OsStr) -> Option<PathBuf> {
    if binary.is_empty() {
        return None;
    }
    let path = Path::new(binary);
    if path.is_absolute() || path.components().count() > 1 {
        return path.is_file().then(|| path.to_path_buf());
    }
    std::env::split_paths(path_var)
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
}
