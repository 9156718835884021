//! Section splitting and figure assignment.

use crate::extract::DiagramSnippet;
use crate::fence::{FenceEvent, FenceTracker};

/// Heading marker that starts a new section.
pub const SECTION_MARKER: &str = "## ";

/// A level-two section of the source document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    /// Heading text, trimmed.
    pub title: String,
    /// Lines following the heading, up to the next section.
    pub body_lines: Vec<String>,
    /// Indices of the diagram blocks written inside this section.
    pub diagrams: Vec<usize>,
}

/// How rendered diagrams are attached to sections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum FigureAssignment {
    /// Each section shows the diagrams written in its own body.
    #[default]
    PerSection,
    /// The Nth diagram goes to the Nth section, wherever it was written.
    Positional,
}

/// Split a document into sections at level-two headings.
///
/// Text before the first heading is discarded, and headings inside fenced
/// code blocks do not split. A document without level-two headings yields no
/// sections. Each snippet is recorded on the section whose body contains its
/// opening fence; snippets in the preamble belong to no section.
#[must_use]
pub fn split_sections(text: &str, snippets: &[DiagramSnippet<'_>]) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut starts: Vec<usize> = Vec::new();
    let mut fence = FenceTracker::new();
    let mut offset = 0;

    for raw in text.split_inclusive('\n') {
        let line_start = offset;
        offset += raw.len();
        let line = raw.trim_end_matches(['\n', '\r']);

        let was_in_fence = fence.in_fence();
        let event = fence.update(line);
        if !was_in_fence
            && event == FenceEvent::Content
            && let Some(title) = heading_title(line)
        {
            sections.push(Section {
                title,
                ..Section::default()
            });
            starts.push(line_start);
            continue;
        }

        if let Some(section) = sections.last_mut() {
            section.body_lines.push(line.to_owned());
        }
    }

    for snippet in snippets {
        if let Some(pos) = starts.iter().rposition(|&start| start <= snippet.offset) {
            sections[pos].diagrams.push(snippet.index);
        }
    }

    tracing::debug!(sections = sections.len(), "Split document into sections");
    sections
}

fn heading_title(line: &str) -> Option<String> {
    line.strip_prefix(SECTION_MARKER)
        .map(|rest| rest.trim().to_owned())
}

/// Decide which diagram indices each section displays.
///
/// Returns one list per section, in section order.
#[must_use]
pub fn assign_figures(
    sections: &[Section],
    diagram_count: usize,
    mode: FigureAssignment,
) -> Vec<Vec<usize>> {
    match mode {
        FigureAssignment::PerSection => sections.iter().map(|s| s.diagrams.clone()).collect(),
        FigureAssignment::Positional => (0..sections.len())
            .map(|i| if i < diagram_count { vec![i] } else { Vec::new() })
            .collect(),
    }
}
