//! HTML to PDF export for flowprint.
//!
//! [`ExportPipeline`] tries converters in a fixed order and stops at the first
//! that produces a PDF:
//!
//! 1. [`ChromeHeadless`] prints through a headless browser
//! 2. [`WeasyPrint`] runs the `weasyprint` command
//! 3. [`Wkhtmltopdf`] runs `wkhtmltopdf`
//! 4. [`TextFallback`] writes a text-only PDF to `<stem>-simple.pdf`
//!
//! Converter errors never escape the pipeline; they are collected in the
//! [`ExportReport`].
//!
//! ```no_run
//! use std::path::Path;
//! use flowprint_config::ExportConfig;
//! use flowprint_export::ExportPipeline;
//!
//! let pipeline = ExportPipeline::standard(&ExportConfig::default(), None);
//! let report = pipeline.run(Path::new("doc.html"), Path::new("doc.pdf"));
//! if let Some(path) = &report.output {
//!     println!("wrote {}", path.display());
//! }
//! ```

mod chrome;
mod converter;
mod fallback;
mod pipeline;
mod weasyprint;
mod wkhtmltopdf;

pub use chrome::ChromeHeadless;
pub use converter::{ConvertError, Converter};
pub use fallback::{Outline, TextFallback, simple_path};
pub use pipeline::{ConverterFailure, ExportPipeline, ExportReport};
pub use weasyprint::WeasyPrint;
pub use wkhtmltopdf::Wkhtmltopdf;
