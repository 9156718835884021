//! Diagram block extraction.
//!
//! A diagram is a fenced code block tagged with the diagram language
//! (`mermaid` by default). Everything between the opening and closing fence
//! is passed through verbatim; no diagram syntax is validated here.

use crate::fence::{FenceEvent, FenceTracker};

/// Default language tag marking a diagram fence.
pub const DEFAULT_DIAGRAM_LANGUAGE: &str = "mermaid";

/// Source of one diagram block found in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagramSnippet<'a> {
    /// Zero-based position of the diagram in the document.
    pub index: usize,
    /// Byte offset of the opening fence line in the document.
    pub offset: usize,
    /// Diagram source between the fences.
    pub source: &'a str,
}

/// Finds diagram fences in markdown text.
///
/// Fences follow the same rules as the section splitter and renderer:
/// backticks or tildes, three or more, and the first word of the info
/// string names the language. An unclosed diagram fence runs to the end of
/// the document.
#[derive(Debug, Clone)]
pub struct DiagramExtractor {
    language: String,
}

impl DiagramExtractor {
    /// Create an extractor for fences tagged with `language`.
    #[must_use]
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_owned(),
        }
    }

    /// Language tag this extractor matches.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Iterate over diagram snippets in document order.
    ///
    /// The iterator is lazy; call again to restart from the beginning.
    pub fn snippets<'r, 't>(&'r self, text: &'t str) -> Snippets<'r, 't> {
        Snippets {
            extractor: self,
            text,
            offset: 0,
            fence: FenceTracker::new(),
            next_index: 0,
        }
    }

    /// Collect all diagram snippets in document order.
    #[must_use]
    pub fn extract<'t>(&self, text: &'t str) -> Vec<DiagramSnippet<'t>> {
        self.snippets(text).collect()
    }

    /// Whether a fence info string opens a diagram block.
    pub(crate) fn matches_info(&self, info: &str) -> bool {
        info.split_whitespace().next() == Some(self.language.as_str())
    }
}

impl Default for DiagramExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_DIAGRAM_LANGUAGE)
    }
}

/// Lazy iterator over the diagram snippets of one document.
pub struct Snippets<'r, 't> {
    extractor: &'r DiagramExtractor,
    text: &'t str,
    offset: usize,
    fence: FenceTracker,
    next_index: usize,
}

impl<'t> Snippets<'_, 't> {
    /// Next line without its terminator, with the byte offset of its start.
    fn next_line(&mut self) -> Option<(usize, &'t str)> {
        let text = self.text;
        let rest = text.get(self.offset..).filter(|r| !r.is_empty())?;
        let len = rest.find('\n').map_or(rest.len(), |i| i + 1);
        let start = self.offset;
        self.offset += len;
        Some((start, rest[..len].trim_end_matches(['\n', '\r'])))
    }
}

impl<'t> Iterator for Snippets<'_, 't> {
    type Item = DiagramSnippet<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let open = loop {
            let (start, line) = self.next_line()?;
            if let FenceEvent::Open(info) = self.fence.update(line)
                && self.extractor.matches_info(info)
            {
                break start;
            }
        };

        let body_start = self.offset;
        let mut body_end = self.text.len();
        while let Some((start, line)) = self.next_line() {
            if self.fence.update(line) == FenceEvent::Close {
                body_end = start;
                break;
            }
        }

        let text = self.text;
        let body = &text[body_start..body_end];
        let body = body.strip_suffix('\n').unwrap_or(body);
        let body = body.strip_suffix('\r').unwrap_or(body);

        let index = self.next_index;
        self.next_index += 1;

        Some(DiagramSnippet {
            index,
            offset: open,
            source: body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_single_diagram() {
        let text = "## Flow\n```mermaid\nA-->B\n```\nBye";
        let snippets = DiagramExtractor::default().extract(text);

        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].source, "A-->B");
        assert_eq!(snippets[0].index, 0);
        assert_eq!(snippets[0].offset, 8);
    }

    #[test]
    fn test_extract_multiline_diagram() {
        let text = "```mermaid\nflowchart TD\n    A --> B\n    B --> C\n```\n";
        let snippets = DiagramExtractor::default().extract(text);

        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].source, "flowchart TD\n    A --> B\n    B --> C");
    }

    #[test]
    fn test_extract_preserves_order_and_indices() {
        let text = "```mermaid\nfirst\n```\ntext\n```mermaid\nsecond\n```\n```mermaid\nthird\n```";
        let snippets = DiagramExtractor::default().extract(text);

        let sources: Vec<_> = snippets.iter().map(|s| s.source).collect();
        let indices: Vec<_> = snippets.iter().map(|s| s.index).collect();
        assert_eq!(sources, vec!["first", "second", "third"]);
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_non_matching_fences_ignored() {
        let text = "```rust\nfn main() {}\n```\n```plantuml\n@startuml\n@enduml\n```";
        assert!(DiagramExtractor::default().extract(text).is_empty());
    }

    #[test]
    fn test_empty_document() {
        assert!(DiagramExtractor::default().extract("").is_empty());
    }

    #[test]
    fn test_trailing_whitespace_after_tag() {
        let text = "```mermaid   \nA-->B\n```";
        let snippets = DiagramExtractor::default().extract(text);
        assert_eq!(snippets[0].source, "A-->B");
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = "```mermaid\r\nA-->B\r\n```\r\n";
        let snippets = DiagramExtractor::default().extract(text);
        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].source, "A-->B");
    }

    #[test]
    fn test_iterator_is_restartable() {
        let extractor = DiagramExtractor::default();
        let text = "```mermaid\none\n```\n```mermaid\ntwo\n```";

        let first: Vec<_> = extractor.snippets(text).map(|s| s.source).collect();
        let second: Vec<_> = extractor.snippets(text).map(|s| s.source).collect();
        assert_eq!(first, second);
        assert_eq!(extractor.snippets(text).next().map(|s| s.source), Some("one"));
    }

    #[test]
    fn test_prose_does_not_change_count() {
        let extractor = DiagramExtractor::default();
        let base = "## A\n```mermaid\nA-->B\n```\n## B\n```mermaid\nC-->D\n```\n";
        let padded = format!(
            "Preamble *with* markers\n\n{base}\nTrailing paragraph.\n\n```text\nnot a diagram\n```\n"
        );

        assert_eq!(
            extractor.extract(base).len(),
            extractor.extract(&padded).len()
        );
    }

    #[test]
    fn test_custom_language() {
        let extractor = DiagramExtractor::new("dot");
        let text = "```dot\ndigraph { a -> b }\n```\n```mermaid\nA-->B\n```";
        let snippets = extractor.extract(text);

        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].source, "digraph { a -> b }");
        assert_eq!(extractor.language(), "dot");
    }

    #[test]
    fn test_empty_block_does_not_swallow_next_section() {
        let text = "## A\n```mermaid\n```\n## B\n```mermaid\nX-->Y\n```\n";
        let sources: Vec<_> = DiagramExtractor::default()
            .extract(text)
            .iter()
            .map(|s| s.source)
            .collect();

        assert_eq!(sources, vec!["", "X-->Y"]);
    }

    #[test]
    fn test_tilde_and_spaced_fences() {
        let text = "~~~mermaid\nA-->B\n~~~\n``` mermaid\nC-->D\n```\n```mermaid title=x\nE-->F\n```";
        let sources: Vec<_> = DiagramExtractor::default()
            .extract(text)
            .iter()
            .map(|s| s.source)
            .collect();

        assert_eq!(sources, vec!["A-->B", "C-->D", "E-->F"]);
    }

    #[test]
    fn test_mermaid_inside_other_fence_ignored() {
        let text = "````markdown\n```mermaid\nA-->B\n```\n````\n";
        assert!(DiagramExtractor::default().extract(text).is_empty());
    }

    #[test]
    fn test_unclosed_fence_runs_to_end() {
        let text = "## A\n```mermaid\nA-->B\nB-->C\n";
        let snippets = DiagramExtractor::default().extract(text);

        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].source, "A-->B\nB-->C");
        assert_eq!(snippets[0].offset, 5);
    }

    #[test]
    fn test_matches_info() {
        let extractor = DiagramExtractor::default();
        assert!(extractor.matches_info("mermaid"));
        assert!(extractor.matches_info("mermaid title=flow"));
        assert!(!extractor.matches_info("mermaidx"));
        assert!(!extractor.matches_info("rust"));
        assert!(!extractor.matches_info(""));
    }
}
