//! `flowprint export` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use flowprint_config::Config;
use flowprint_export::{ExportPipeline, ExportReport};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the export command.
#[derive(Args)]
pub(crate) struct ExportArgs {
    /// HTML file to convert.
    html: PathBuf,

    /// PDF path (default: next to the HTML file).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover flowprint.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl ExportArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(self.config.as_deref(), None)?;

        if !self.html.is_file() {
            return Err(CliError::HtmlNotFound(self.html));
        }
        let pdf = self
            .output
            .unwrap_or_else(|| self.html.with_extension("pdf"));

        output.highlight(&format!("Generating PDF from {}", self.html.display()));
        output.separator();

        // The text-only fallback reads its outline back from the HTML.
        let pipeline = ExportPipeline::standard(&config.export, None);
        let report = pipeline.run(&self.html, &pdf);
        report_export(&report, &self.html, &output);

        if report.succeeded() {
            Ok(())
        } else {
            Err(CliError::ExportFailed(self.html))
        }
    }
}

/// Print the outcome of an export run, with manual steps when nothing worked.
pub(super) fn report_export(report: &ExportReport, html: &Path, output: &Output) {
    for failure in &report.failures {
        output.failure(&format!("{} failed: {}", failure.converter, failure.message));
    }

    match (&report.output, &report.converter) {
        (Some(path), Some(converter)) => {
            output.success(&format!(
                "PDF generated with {converter}: {}",
                path.display()
            ));
            if report.degraded {
                output.warning(
                    "This is a text-only version without diagrams or prose. \
                     For diagrams, use the HTML file.",
                );
            }
        }
        _ => {
            output.failure("Could not generate a PDF.");
            output.info("To create one manually:");
            output.info(&format!("  1. Open {} in a web browser", html.display()));
            output.info("  2. Use the browser's Print function and save as PDF");
            output.info("  3. Or install wkhtmltopdf (https://wkhtmltopdf.org)");
            output.info("  4. Or install WeasyPrint: pip install weasyprint");
        }
    }
}
