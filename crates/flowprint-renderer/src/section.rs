//! Per-section HTML rendering.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::PathBuf;

use crate::extract::DiagramExtractor;
use crate::fence::{FenceEvent, FenceTracker};
use crate::inline::{Emphasis, EmphasisMode};
use crate::sections::Section;
use crate::util::escape_html;

/// A diagram image produced by an external renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    /// Index of the diagram this image was rendered from.
    pub index: usize,
    /// Location of the image file on disk.
    pub path: PathBuf,
    /// Value of the `src` attribute (relative path or data URI).
    pub src: String,
}

/// Rendered diagrams keyed by diagram index.
pub type Artifacts = BTreeMap<usize, RenderedArtifact>;

/// Body content left after diagram blocks are removed.
#[derive(Debug, PartialEq, Eq)]
enum Block {
    Paragraph(String),
    Code {
        language: Option<String>,
        content: String,
    },
}

/// Renders one [`Section`] into an HTML fragment.
pub struct SectionRenderer<'a> {
    extractor: &'a DiagramExtractor,
    emphasis: EmphasisMode,
}

impl<'a> SectionRenderer<'a> {
    /// Create a renderer that strips fences recognized by `extractor`.
    #[must_use]
    pub fn new(extractor: &'a DiagramExtractor, emphasis: EmphasisMode) -> Self {
        Self {
            extractor,
            emphasis,
        }
    }

    /// Render a section with the figures attached to it.
    ///
    /// Figures are captioned `Figure {index + 1}: {title}`. Never fails; a
    /// section with an empty body and no figures still produces its heading.
    #[must_use]
    pub fn render(&self, section: &Section, figures: &[&RenderedArtifact]) -> String {
        let title = escape_html(&section.title);
        let mut html = String::with_capacity(512);

        html.push_str("<div class=\"section\">\n");
        let _ = writeln!(html, "<h2>{title}</h2>");

        for figure in figures {
            render_figure(&mut html, figure, &title);
        }

        let blocks = self.blocks(&section.body_lines);
        if !blocks.is_empty() {
            let mut emphasis = Emphasis::new(self.emphasis);
            html.push_str("<div class=\"section-content\">\n");
            for block in blocks {
                match block {
                    Block::Paragraph(text) => {
                        let _ = writeln!(html, "<p>{}</p>", emphasis.apply(&escape_html(&text)));
                    }
                    Block::Code { language, content } => {
                        render_code(&mut html, language.as_deref(), &content);
                    }
                }
            }
            html.push_str("</div>\n");
        }

        html.push_str("</div>\n");
        html
    }

    /// Split body lines into paragraphs and code blocks, dropping diagrams.
    fn blocks(&self, lines: &[String]) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut paragraph: Vec<&str> = Vec::new();
        let mut code: Option<(Option<String>, Vec<&str>)> = None;
        let mut in_diagram = false;
        let mut fence = FenceTracker::new();

        for line in lines {
            let was_in_fence = fence.in_fence();
            match fence.update(line) {
                FenceEvent::Open(info) => {
                    flush_paragraph(&mut paragraph, &mut blocks);
                    if self.extractor.matches_info(info) {
                        in_diagram = true;
                    } else {
                        let language = info.split_whitespace().next().map(str::to_owned);
                        code = Some((language, Vec::new()));
                    }
                }
                FenceEvent::Close => {
                    if in_diagram {
                        in_diagram = false;
                    } else if let Some((language, content)) = code.take() {
                        blocks.push(Block::Code {
                            language,
                            content: content.join("\n"),
                        });
                    }
                }
                FenceEvent::Content if was_in_fence => {
                    if let Some((_, content)) = code.as_mut() {
                        content.push(line);
                    }
                }
                FenceEvent::Content => {
                    if line.trim().is_empty() {
                        flush_paragraph(&mut paragraph, &mut blocks);
                    } else {
                        paragraph.push(line.trim_end());
                    }
                }
            }
        }

        if let Some((language, content)) = code {
            blocks.push(Block::Code {
                language,
                content: content.join("\n"),
            });
        }
        flush_paragraph(&mut paragraph, &mut blocks);
        blocks
    }
}

fn flush_paragraph(paragraph: &mut Vec<&str>, blocks: &mut Vec<Block>) {
    if !paragraph.is_empty() {
        blocks.push(Block::Paragraph(paragraph.join("\n")));
        paragraph.clear();
    }
}

fn render_figure(html: &mut String, figure: &RenderedArtifact, title: &str) {
    html.push_str("<div class=\"flowchart-container\">\n");
    let _ = writeln!(
        html,
        "<img src=\"{}\" alt=\"Flowchart: {title}\" class=\"flowchart-image\">",
        escape_html(&figure.src)
    );
    let _ = writeln!(
        html,
        "<div class=\"flowchart-caption\">Figure {}: {title}</div>",
        figure.index + 1
    );
    html.push_str("</div>\n");
}

fn render_code(html: &mut String, language: Option<&str>, content: &str) {
    if let Some(language) = language {
        let _ = writeln!(
            html,
            r#"<pre><code class="language-{}">{}</code></pre>"#,
            escape_html(language),
            escape_html(content)
        );
    } else {
        let _ = writeln!(html, "<pre><code>{}</code></pre>", escape_html(content));
    }
}
