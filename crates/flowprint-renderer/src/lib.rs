//! Markdown flow-chart documents to styled HTML.
//!
//! This crate turns a Markdown document with embedded diagram fences into
//! one HTML page. It does not render diagrams itself; callers render the
//! snippets found by [`DiagramExtractor`] and hand the results back as
//! [`Artifacts`].
//!
//! # Pipeline
//!
//! - [`DiagramExtractor`]: finds diagram fences in document order
//! - [`split_sections`]: partitions the text at `## ` headings
//! - [`SectionRenderer`]: strips diagrams from prose, applies emphasis,
//!   attaches figures
//! - [`render_document`]: wraps section fragments in the page template
//!
//! [`Document`] ties these together.
//!
//! # Example
//!
//! ```
//! use flowprint_renderer::{Artifacts, DiagramExtractor, Document, TemplateConfig};
//!
//! let extractor = DiagramExtractor::default();
//! let document = Document::parse("## Intro\nHello", &extractor);
//! let html = document.render(&TemplateConfig::default(), &Artifacts::new());
//! assert!(html.contains("<h2>Intro</h2>"));
//! ```

mod document;
mod extract;
mod fence;
mod inline;
mod section;
mod sections;
mod template;
mod util;

pub use document::Document;
pub use extract::{DEFAULT_DIAGRAM_LANGUAGE, DiagramExtractor, DiagramSnippet, Snippets};
pub use inline::EmphasisMode;
pub use section::{Artifacts, RenderedArtifact, SectionRenderer};
pub use sections::{FigureAssignment, SECTION_MARKER, Section, assign_figures, split_sections};
pub use template::{MetadataField, TemplateConfig, TemplateStyle, render_document};
pub use util::escape_html;
