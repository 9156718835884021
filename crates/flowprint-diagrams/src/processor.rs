//! Rendering every diagram of a document.

use std::fs;
use std::path::{Path, PathBuf};

use flowprint_renderer::{Artifacts, Document, FigureAssignment, RenderedArtifact};

use crate::cache::{DiagramCache, DiagramKey};
use crate::mermaid::{DiagramRenderer, RenderError};
use crate::output::{DIAGRAMS_DIR, DiagramOutput, file_name};

/// Renders the diagrams of a [`Document`] into image files.
///
/// Failures are recoverable per diagram: the diagram gets no artifact and a
/// warning is recorded. When the renderer binary is missing, the remaining
/// diagrams are skipped with a single warning.
///
/// # Example
///
/// ```ignore
/// use flowprint_diagrams::{DiagramProcessor, DiagramOutput, MermaidCli};
///
/// let mut processor = DiagramProcessor::new(Box::new(MermaidCli::new("mmdc")), "out")
///     .output(DiagramOutput::Inline);
/// let artifacts = processor.process(&document, FigureAssignment::PerSection);
/// ```
pub struct DiagramProcessor {
    renderer: Box<dyn DiagramRenderer>,
    output_dir: PathBuf,
    output: DiagramOutput,
    cache: Option<DiagramCache>,
    warnings: Vec<String>,
}

impl DiagramProcessor {
    /// Create a processor writing images under `<output_dir>/diagrams/`.
    #[must_use]
    pub fn new(renderer: Box<dyn DiagramRenderer>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            renderer,
            output_dir: output_dir.into(),
            output: DiagramOutput::default(),
            cache: None,
            warnings: Vec::new(),
        }
    }

    /// Set how the HTML references images. Default is [`DiagramOutput::Files`].
    #[must_use]
    pub fn output(mut self, output: DiagramOutput) -> Self {
        self.output = output;
        self
    }

    /// Reuse rendered images from `cache`.
    #[must_use]
    pub fn with_cache(mut self, cache: DiagramCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Warnings collected by [`process`](Self::process).
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Render every diagram snippet of `document`.
    ///
    /// Image names use the title of the section that displays the diagram
    /// under `assignment`.
    pub fn process(&mut self, document: &Document<'_>, assignment: FigureAssignment) -> Artifacts {
        let mut artifacts = Artifacts::new();
        let snippets = document.snippets();
        if snippets.is_empty() {
            return artifacts;
        }

        let dir = self.output_dir.join(DIAGRAMS_DIR);
        if let Err(e) = fs::create_dir_all(&dir) {
            tracing::warn!(dir = %dir.display(), error = %e, "Failed to create diagrams directory");
            self.warnings
                .push(format!("Cannot create {}: {e}", dir.display()));
            return artifacts;
        }

        let format = self.renderer.format();
        for (pos, snippet) in snippets.iter().enumerate() {
            let title = document.figure_title(snippet.index, assignment);
            let name = file_name(snippet.index, title, format);
            let path = dir.join(&name);

            match self.render_one(snippet.source, &path) {
                Ok(bytes) => {
                    tracing::info!(index = snippet.index, path = %path.display(), "Rendered diagram");
                    artifacts.insert(
                        snippet.index,
                        RenderedArtifact {
                            index: snippet.index,
                            src: self.output.src(&name, format, &bytes),
                            path,
                        },
                    );
                }
                Err(e @ RenderError::Unavailable { .. }) => {
                    let skipped = snippets.len() - pos;
                    tracing::warn!(error = %e, skipped, "Diagram renderer unavailable");
                    self.warnings
                        .push(format!("{e}; skipped {skipped} diagram(s)"));
                    break;
                }
                Err(e) => {
                    tracing::warn!(index = snippet.index, error = %e, "Diagram rendering failed");
                    self.warnings
                        .push(format!("Diagram {} failed: {e}", snippet.index + 1));
                }
            }
        }

        artifacts
    }

    /// Render one snippet to `path`, going through the cache when enabled.
    fn render_one(&self, source: &str, path: &Path) -> Result<Vec<u8>, RenderError> {
        let fingerprint = self.renderer.fingerprint();
        let ext = self.renderer.format().extension();
        let hash = DiagramKey {
            source,
            fingerprint: &fingerprint,
            format: ext,
        }
        .compute_hash();

        if let Some(bytes) = self.cache.as_ref().and_then(|c| c.get(&hash, ext)) {
            tracing::debug!(%hash, "Diagram cache hit");
            fs::write(path, &bytes)?;
            return Ok(bytes);
        }

        self.renderer.render(source, path)?;
        let bytes = fs::read(path)?;
        if let Some(cache) = &self.cache {
            cache.set(&hash, ext, &bytes);
        }
        Ok(bytes)
    }
}
