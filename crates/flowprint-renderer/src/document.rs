//! Whole-document parsing and HTML assembly.

use crate::extract::{DiagramExtractor, DiagramSnippet};
use crate::section::{Artifacts, RenderedArtifact, SectionRenderer};
use crate::sections::{FigureAssignment, Section, assign_figures, split_sections};
use crate::template::{TemplateConfig, render_document};

/// A parsed source document.
///
/// Holds the diagram snippets and sections derived from one immutable text.
/// Diagram rendering happens outside this crate; its results are passed back
/// to [`Document::render`] as [`Artifacts`].
pub struct Document<'a> {
    extractor: &'a DiagramExtractor,
    snippets: Vec<DiagramSnippet<'a>>,
    sections: Vec<Section>,
}

impl<'a> Document<'a> {
    /// Extract diagrams and split sections from `text`.
    #[must_use]
    pub fn parse(text: &'a str, extractor: &'a DiagramExtractor) -> Self {
        let snippets = extractor.extract(text);
        let sections = split_sections(text, &snippets);
        tracing::debug!(
            diagrams = snippets.len(),
            sections = sections.len(),
            "Parsed document"
        );
        Self {
            extractor,
            snippets,
            sections,
        }
    }

    /// Diagram snippets in document order.
    #[must_use]
    pub fn snippets(&self) -> &[DiagramSnippet<'a>] {
        &self.snippets
    }

    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Diagram indices displayed by each section.
    #[must_use]
    pub fn figures(&self, mode: FigureAssignment) -> Vec<Vec<usize>> {
        assign_figures(&self.sections, self.snippets.len(), mode)
    }

    /// Title of the section that displays diagram `index`, if any.
    #[must_use]
    pub fn figure_title(&self, index: usize, mode: FigureAssignment) -> Option<&str> {
        self.figures(mode)
            .iter()
            .position(|figures| figures.contains(&index))
            .map(|pos| self.sections[pos].title.as_str())
    }

    /// Render the complete HTML document.
    ///
    /// Diagrams without an entry in `artifacts` are omitted along with their
    /// caption. A document without sections still produces the template.
    #[must_use]
    pub fn render(&self, config: &TemplateConfig, artifacts: &Artifacts) -> String {
        let renderer = SectionRenderer::new(self.extractor, config.emphasis);
        let figures = self.figures(config.assignment);

        let fragments: Vec<String> = self
            .sections
            .iter()
            .zip(&figures)
            .map(|(section, indices)| {
                let attached: Vec<&RenderedArtifact> = indices
                    .iter()
                    .filter_map(|index| artifacts.get(index))
                    .collect();
                renderer.render(section, &attached)
            })
            .collect();

        if fragments.is_empty() {
            tracing::warn!("Document has no level-two sections");
        }

        render_document(config, &fragments)
    }
}
