//! `wkhtmltopdf` command-line converter.

use std::ffi::OsString;
use std::path::Path;

use crate::converter::{ConvertError, Converter, run_tool};

const NAME: &str = "wkhtmltopdf";

/// Runs `wkhtmltopdf` with page size, margins and UTF-8 encoding.
#[derive(Debug, Clone)]
pub struct Wkhtmltopdf {
    command: String,
    page_size: String,
    margin_mm: u32,
}

impl Wkhtmltopdf {
    #[must_use]
    pub fn new(command: impl Into<String>, page_size: impl Into<String>, margin_mm: u32) -> Self {
        Self {
            command: command.into(),
            page_size: page_size.into(),
            margin_mm,
        }
    }

    fn args(&self, html: &Path, pdf: &Path) -> Vec<OsString> {
        let margin = format!("{}mm", self.margin_mm);
        let mut args: Vec<OsString> = vec!["--page-size".into(), self.page_size.as_str().into()];
        for side in ["top", "bottom", "left", "right"] {
            args.push(format!("--margin-{side}").into());
            args.push(margin.as_str().into());
        }
        args.extend([
            "--encoding".into(),
            "UTF-8".into(),
            // Diagram images are referenced by relative file paths.
            "--enable-local-file-access".into(),
            html.into(),
            pdf.into(),
        ]);
        args
    }
}

impl Converter for Wkhtmltopdf {
    fn name(&self) -> &str {
        NAME
    }

    fn convert(&self, html: &Path, pdf: &Path) -> Result<(), ConvertError> {
        run_tool(NAME, Path::new(&self.command), self.args(html, pdf), pdf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_args() {
        let tool = Wkhtmltopdf::new("wkhtmltopdf", "A4", 20);
        let args: Vec<String> = tool
            .args(Path::new("doc.html"), Path::new("doc.pdf"))
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            args,
            vec![
                "--page-size",
                "A4",
                "--margin-top",
                "20mm",
                "--margin-bottom",
                "20mm",
                "--margin-left",
                "20mm",
                "--margin-right",
                "20mm",
                "--encoding",
                "UTF-8",
                "--enable-local-file-access",
                "doc.html",
                "doc.pdf",
            ]
        );
    }
}
