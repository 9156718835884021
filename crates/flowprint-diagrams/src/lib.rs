//! Diagram rendering via external tools for flowprint.
//!
//! - [`DiagramRenderer`] abstracts the external tool; [`MermaidCli`] drives `mmdc`
//! - [`DiagramProcessor`] renders every snippet of a document into
//!   `<output_dir>/diagrams/` and returns the artifacts the HTML references
//! - [`DiagramCache`] reuses images across runs, keyed by [`DiagramKey`]
//!
//! Rendering failures never abort a conversion. They surface as warnings and
//! the affected figure is left out of the HTML.

mod cache;
mod mermaid;
mod output;
mod processor;

pub use cache::{DiagramCache, DiagramKey};
pub use mermaid::{DiagramRenderer, MermaidCli, RenderError};
pub use output::{DIAGRAMS_DIR, DiagramOutput, file_name, slugify};
pub use processor::DiagramProcessor;

/// Cache version; a change invalidates every cached image.
pub const CACHE_VERSION: &str = env!("CARGO_PKG_VERSION");
