//! Ordered converter fallback.

use std::io;
use std::path::{Path, PathBuf};

use flowprint_config::ExportConfig;

use crate::chrome::ChromeHeadless;
use crate::converter::Converter;
use crate::fallback::{Outline, TextFallback};
use crate::weasyprint::WeasyPrint;
use crate::wkhtmltopdf::Wkhtmltopdf;

/// A converter that did not produce a PDF, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterFailure {
    pub converter: String,
    pub message: String,
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Path of the produced PDF.
    pub output: Option<PathBuf>,
    /// Name of the converter that produced it.
    pub converter: Option<String>,
    /// Produced by a converter that drops diagrams and prose.
    pub degraded: bool,
    /// Converters tried before success, or all of them on total failure.
    pub failures: Vec<ConverterFailure>,
}

impl ExportReport {
    pub fn succeeded(&self) -> bool {
        self.output.is_some()
    }
}

/// Tries converters in order until one succeeds.
pub struct ExportPipeline {
    converters: Vec<Box<dyn Converter>>,
}

impl ExportPipeline {
    #[must_use]
    pub fn new(converters: Vec<Box<dyn Converter>>) -> Self {
        Self { converters }
    }

    /// Browser printing, `WeasyPrint`, `wkhtmltopdf`, then the text-only PDF
    /// unless disabled.
    ///
    /// With no `outline`, the text-only PDF reads it back from the HTML.
    #[must_use]
    pub fn standard(config: &ExportConfig, outline: Option<Outline>) -> Self {
        let mut converters: Vec<Box<dyn Converter>> = vec![
            Box::new(ChromeHeadless::new(
                config.chrome.clone(),
                config.page_size.as_str(),
            )),
            Box::new(WeasyPrint::new(config.weasyprint.as_str())),
            Box::new(Wkhtmltopdf::new(
                config.wkhtmltopdf.as_str(),
                config.page_size.as_str(),
                config.margin_mm,
            )),
        ];
        if config.text_fallback {
            converters.push(Box::new(TextFallback::new(outline)));
        }
        Self::new(converters)
    }

    /// Converter names in the order they are tried.
    pub fn names(&self) -> Vec<&str> {
        self.converters.iter().map(|c| c.name()).collect()
    }

    /// Convert `html` into `pdf`, or the degraded path of the converter that
    /// succeeds.
    ///
    /// Never fails: every converter error ends up in the report.
    pub fn run(&self, html: &Path, pdf: &Path) -> ExportReport {
        let mut report = ExportReport::default();

        for converter in &self.converters {
            let target = converter.output_path(pdf);
            // A leftover file from an earlier run must not pass for fresh output.
            if let Err(e) = std::fs::remove_file(&target)
                && e.kind() != io::ErrorKind::NotFound
            {
                tracing::warn!(
                    converter = converter.name(),
                    path = %target.display(),
                    error = %e,
                    "Cannot remove stale output"
                );
                report.failures.push(ConverterFailure {
                    converter: converter.name().to_owned(),
                    message: format!("cannot remove stale {}: {e}", target.display()),
                });
                continue;
            }

            match converter.convert(html, &target) {
                Ok(()) => {
                    tracing::info!(
                        converter = converter.name(),
                        path = %target.display(),
                        degraded = converter.degraded(),
                        "PDF generated"
                    );
                    report.converter = Some(converter.name().to_owned());
                    report.degraded = converter.degraded();
                    report.output = Some(target);
                    return report;
                }
                Err(e) => {
                    tracing::warn!(converter = converter.name(), error = %e, "PDF conversion failed");
                    report.failures.push(ConverterFailure {
                        converter: converter.name().to_owned(),
                        message: e.to_string(),
                    });
                }
            }
        }

        tracing::warn!(html = %html.display(), "No converter produced a PDF");
        report
    }
}
