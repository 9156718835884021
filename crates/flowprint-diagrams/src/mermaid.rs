//! External diagram renderers.
//!
//! [`MermaidCli`] shells out to `mmdc`. The diagram source is written to a
//! scratch `.mmd` file that is removed when the call returns, whether or not
//! rendering succeeded.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use flowprint_config::{DiagramFormat, DiagramsConfig};

/// Diagram rendering error.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Renderer binary could not be found.
    #[error("{command} not found")]
    Unavailable { command: String },
    /// Renderer process could not be started.
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    /// Renderer exited with a non-zero status.
    #[error("{command} exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
    /// Renderer reported success but wrote no file.
    #[error("{command} produced no output at {}", path.display())]
    MissingOutput { command: String, path: PathBuf },
    /// Scratch or output file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Renders one diagram source into an image file.
pub trait DiagramRenderer {
    /// Format of the files written by [`render`](Self::render).
    fn format(&self) -> DiagramFormat;

    /// Settings that change the output image, mixed into cache keys.
    fn fingerprint(&self) -> String;

    /// Render `source` to `output`.
    ///
    /// Success means the process exited cleanly and `output` exists.
    fn render(&self, source: &str, output: &Path) -> Result<(), RenderError>;
}

/// Renderer backed by the Mermaid CLI (`mmdc`).
#[derive(Debug, Clone)]
pub struct MermaidCli {
    command: String,
    theme: String,
    format: DiagramFormat,
    width: u32,
    height: u32,
    scale: u32,
    background: String,
}

impl MermaidCli {
    /// Create a renderer invoking `command` with default settings.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self::from_config(&DiagramsConfig {
            command: command.into(),
            ..DiagramsConfig::default()
        })
    }

    #[must_use]
    pub fn from_config(config: &DiagramsConfig) -> Self {
        Self {
            command: config.command.clone(),
            theme: config.theme.clone(),
            format: config.format,
            width: config.width,
            height: config.height,
            scale: config.scale,
            background: config.background.clone(),
        }
    }

    #[must_use]
    pub fn theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    #[must_use]
    pub fn output_format(mut self, format: DiagramFormat) -> Self {
        self.format = format;
        self
    }

    fn args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        vec![
            "-i".into(),
            input.into(),
            "-o".into(),
            output.into(),
            "-t".into(),
            self.theme.as_str().into(),
            "-e".into(),
            self.format.extension().into(),
            "-w".into(),
            self.width.to_string().into(),
            "-H".into(),
            self.height.to_string().into(),
            "-s".into(),
            self.scale.to_string().into(),
            "-b".into(),
            self.background.as_str().into(),
        ]
    }
}

impl DiagramRenderer for MermaidCli {
    fn format(&self) -> DiagramFormat {
        self.format
    }

    fn fingerprint(&self) -> String {
        format!(
            "{}:{}:{}x{}@{}:{}",
            self.command, self.theme, self.width, self.height, self.scale, self.background
        )
    }

    fn render(&self, source: &str, output: &Path) -> Result<(), RenderError> {
        let mut scratch = tempfile::Builder::new()
            .prefix("flowprint-")
            .suffix(".mmd")
            .tempfile()?;
        scratch.write_all(source.as_bytes())?;
        scratch.flush()?;

        // A stale file would hide a renderer that exits cleanly without output.
        if output.exists() {
            std::fs::remove_file(output)?;
        }

        let result = Command::new(&self.command)
            .args(self.args(scratch.path(), output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output();

        let out = match result {
            Ok(out) => out,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(RenderError::Unavailable {
                    command: self.command.clone(),
                });
            }
            Err(source) => {
                return Err(RenderError::Spawn {
                    command: self.command.clone(),
                    source,
                });
            }
        };

        if !out.status.success() {
            return Err(RenderError::Failed {
                command: self.command.clone(),
                status: out.status,
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_owned(),
            });
        }
        if !output.exists() {
            return Err(RenderError::MissingOutput {
                command: self.command.clone(),
                path: output.to_path_buf(),
            });
        }

        tracing::debug!(output = %output.display(), "Rendered diagram");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_args_match_mmdc_cli() {
        let cli = MermaidCli::new("mmdc");
        let args: Vec<String> = cli
            .args(Path::new("/tmp/in.mmd"), Path::new("/out/d.png"))
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            args,
            vec![
                "-i", "/tmp/in.mmd", "-o", "/out/d.png", "-t", "default", "-e", "png", "-w",
                "1200", "-H", "800", "-s", "2", "-b", "white",
            ]
        );
    }

    #[test]
    fn test_fingerprint_tracks_settings() {
        let base = MermaidCli::new("mmdc");
        assert_ne!(base.fingerprint(), base.clone().theme("dark").fingerprint());
        assert_eq!(base.fingerprint(), MermaidCli::new("mmdc").fingerprint());
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let tmp = TempDir::new().unwrap();
        let cli = MermaidCli::new("flowprint-test-no-such-mmdc");

        let err = cli.render("A-->B", &tmp.path().join("out.png")).unwrap_err();
        assert!(matches!(err, RenderError::Unavailable { .. }));
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use pretty_assertions::assert_eq;
        use std::os::unix::fs::PermissionsExt;

        /// Write an executable shell script standing in for `mmdc`.
        fn fake_mmdc(dir: &Path, body: &str) -> String {
            let path = dir.join("mmdc");
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path.to_string_lossy().into_owned()
        }

        #[test]
        fn test_render_success_copies_source() {
            let tmp = TempDir::new().unwrap();
            // -i is $2, -o is $4
            let cli = MermaidCli::new(fake_mmdc(tmp.path(), r#"cp "$2" "$4""#));
            let output = tmp.path().join("out.png");

            cli.render("A-->B", &output).unwrap();
            assert_eq!(std::fs::read_to_string(&output).unwrap(), "A-->B");
        }

        #[test]
        fn test_render_non_zero_exit() {
            let tmp = TempDir::new().unwrap();
            let cli = MermaidCli::new(fake_mmdc(tmp.path(), "echo 'Parse error' >&2; exit 1"));

            let err = cli.render("bad", &tmp.path().join("out.png")).unwrap_err();
            match err {
                RenderError::Failed { stderr, .. } => assert_eq!(stderr, "Parse error"),
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn test_render_without_output_file() {
            let tmp = TempDir::new().unwrap();
            let cli = MermaidCli::new(fake_mmdc(tmp.path(), "exit 0"));
            let output = tmp.path().join("out.png");
            std::fs::write(&output, "stale").unwrap();

            let err = cli.render("A-->B", &output).unwrap_err();
            assert!(matches!(err, RenderError::MissingOutput { .. }));
        }

        #[test]
        fn test_scratch_file_removed() {
            let tmp = TempDir::new().unwrap();
            let record = tmp.path().join("input-path");
            let cli = MermaidCli::new(fake_mmdc(
                tmp.path(),
                &format!(r#"echo "$2" > "{}"; exit 1"#, record.display()),
            ));

            let _ = cli.render("A-->B", &tmp.path().join("out.png"));
            let scratch = std::fs::read_to_string(&record).unwrap();
            let scratch = scratch.trim();

            assert!(scratch.ends_with(".mmd"));
            assert!(!Path::new(scratch).exists());
        }
    }
}
