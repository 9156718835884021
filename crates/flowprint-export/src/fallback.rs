//! Text-only PDF written natively when no HTML converter is available.
//!
//! The output carries the document outline (title, metadata, overview and
//! section titles) and nothing else. Diagrams and prose are dropped, so the
//! file is written next to the requested PDF as `<stem>-simple.pdf`.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use flowprint_config::TemplateConfig;
use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str, TextStr};
use regex::Regex;

use crate::converter::{ConvertError, Converter};

const NAME: &str = "Text-only PDF";

/// A4 in points.
const PAGE_WIDTH: u16 = 595;
const PAGE_HEIGHT: u16 = 842;
/// 20mm.
const MARGIN: u16 = 57;

const TITLE_SIZE: u16 = 18;
const HEADING_SIZE: u16 = 14;
const BODY_SIZE: u16 = 11;

const REGULAR: Name<'static> = Name(b"F1");
const BOLD: Name<'static> = Name(b"F2");

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<title>(.*?)</title>").unwrap());
static H2_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<h2>(.*?)</h2>").unwrap());
static METADATA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<div class="metadata-item"><strong>(.*?)</strong>(.*?)</div>|<p><strong>(.*?):</strong> (.*?)</p>"#,
    )
    .unwrap()
});
static OVERVIEW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<h2>Overview</h2>\s*<div class="section-content">\s*<p>(.*?)</p>"#).unwrap()
});
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// What survives in the text-only PDF.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outline {
    pub title: String,
    pub metadata: Vec<(String, String)>,
    pub overview: Option<String>,
    pub sections: Vec<String>,
}

impl Outline {
    /// Build from the template configuration and the parsed section titles.
    #[must_use]
    pub fn from_template(config: &TemplateConfig, sections: Vec<String>) -> Self {
        Self {
            title: config.title.clone(),
            metadata: config
                .metadata
                .iter()
                .map(|f| (f.label.clone(), f.value.clone()))
                .collect(),
            overview: config.overview.clone(),
            sections,
        }
    }

    /// Recover the outline from a generated HTML document.
    ///
    /// A leading "Overview" heading becomes the overview, not a section.
    #[must_use]
    pub fn from_html(html: &str) -> Self {
        let title = TITLE_RE
            .captures(html)
            .map(|c| text_of(&c[1]))
            .unwrap_or_default();

        // Metadata sits between the header and the first heading.
        let metadata_block = html.find("<div class=\"metadata\">").map_or("", |start| {
            let rest = &html[start..];
            rest.find("<h2>").map_or(rest, |end| &rest[..end])
        });
        let metadata = METADATA_RE
            .captures_iter(metadata_block)
            .filter_map(|c| {
                let label = c.get(1).or_else(|| c.get(3))?;
                let value = c.get(2).or_else(|| c.get(4))?;
                Some((text_of(label.as_str()), text_of(value.as_str())))
            })
            .collect();

        let overview = OVERVIEW_RE.captures(html).map(|c| text_of(&c[1]));

        let mut sections: Vec<String> = H2_RE.captures_iter(html).map(|c| text_of(&c[1])).collect();
        if overview.is_some() && sections.first().is_some_and(|s| s == "Overview") {
            sections.remove(0);
        }

        Self {
            title,
            metadata,
            overview,
            sections,
        }
    }
}

/// Strip tags and undo the entity escaping applied by the renderer.
fn text_of(fragment: &str) -> String {
    TAG_RE
        .replace_all(fragment, "")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
        .trim()
        .to_owned()
}

/// Degraded converter producing a text-only PDF.
#[derive(Debug, Clone, Default)]
pub struct TextFallback {
    outline: Option<Outline>,
}

impl TextFallback {
    /// With `None`, the outline is read back from the HTML being converted.
    #[must_use]
    pub fn new(outline: Option<Outline>) -> Self {
        Self { outline }
    }
}

impl Converter for TextFallback {
    fn name(&self) -> &str {
        NAME
    }

    fn degraded(&self) -> bool {
        true
    }

    fn output_path(&self, pdf: &Path) -> PathBuf {
        simple_path(pdf)
    }

    fn convert(&self, html: &Path, pdf: &Path) -> Result<(), ConvertError> {
        let outline = match &self.outline {
            Some(outline) => outline.clone(),
            None => Outline::from_html(&std::fs::read_to_string(html)?),
        };
        std::fs::write(pdf, write_pdf(&outline))?;
        Ok(())
    }
}

/// `doc.pdf` becomes `doc-simple.pdf`.
pub fn simple_path(pdf: &Path) -> PathBuf {
    let stem = pdf
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    pdf.with_file_name(format!("{stem}-simple.pdf"))
}

struct Line {
    bold: bool,
    size: u16,
    text: String,
    space_before: u16,
}

fn layout(outline: &Outline) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut push = |bold: bool, size: u16, text: &str, space_before: u16| {
        for (i, chunk) in wrap(text, size).into_iter().enumerate() {
            lines.push(Line {
                bold,
                size,
                text: chunk,
                space_before: if i == 0 { space_before } else { 0 },
            });
        }
    };

    push(true, TITLE_SIZE, &outline.title, 0);
    for (label, value) in &outline.metadata {
        push(false, BODY_SIZE, &format!("{label}: {value}"), 0);
    }
    if let Some(overview) = &outline.overview {
        push(true, HEADING_SIZE, "Overview", 18);
        push(false, BODY_SIZE, overview, 4);
    }
    for section in &outline.sections {
        push(true, HEADING_SIZE, section, 18);
        push(
            false,
            BODY_SIZE,
            &format!(
                "This section contains detailed flowcharts and diagrams for {}. \
                 Please refer to the HTML version for visual diagrams.",
                section.to_lowercase()
            ),
            4,
        );
    }
    lines
}

/// Greedy word wrap on an average glyph width of half the font size.
fn wrap(text: &str, size: u16) -> Vec<String> {
    let max_chars = usize::from((PAGE_WIDTH - 2 * MARGIN) * 2 / size);
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// The standard fonts are single-byte; anything outside ASCII becomes `?`.
fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(c).ok().filter(u8::is_ascii).unwrap_or(b'?'))
        .collect()
}

fn paginate(lines: &[Line]) -> Vec<Vec<(&Line, f32)>> {
    let top = f32::from(PAGE_HEIGHT - MARGIN);
    let bottom = f32::from(MARGIN);

    let mut pages = vec![Vec::new()];
    let mut y = top;
    for line in lines {
        let advance = f32::from(line.size) * 1.4 + f32::from(line.space_before);
        if y - advance < bottom {
            pages.push(Vec::new());
            y = top;
        }
        y -= advance;
        if let Some(page) = pages.last_mut() {
            page.push((line, y));
        }
    }
    pages
}

fn write_pdf(outline: &Outline) -> Vec<u8> {
    let lines = layout(outline);
    let pages = paginate(&lines);

    let mut alloc = Ref::new(1);
    let catalog_id = alloc.bump();
    let tree_id = alloc.bump();
    let regular_id = alloc.bump();
    let bold_id = alloc.bump();
    let info_id = alloc.bump();
    let page_ids: Vec<(Ref, Ref)> = pages.iter().map(|_| (alloc.bump(), alloc.bump())).collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id)
        .kids(page_ids.iter().map(|(page, _)| *page))
        .count(i32::try_from(page_ids.len()).unwrap_or(i32::MAX));
    pdf.type1_font(regular_id).base_font(Name(b"Helvetica"));
    pdf.type1_font(bold_id).base_font(Name(b"Helvetica-Bold"));
    pdf.document_info(info_id).title(TextStr(&outline.title));

    for (page_lines, (page_id, content_id)) in pages.iter().zip(&page_ids) {
        {
            let mut page = pdf.page(*page_id);
            page.media_box(Rect::new(
                0.0,
                0.0,
                f32::from(PAGE_WIDTH),
                f32::from(PAGE_HEIGHT),
            ));
            page.parent(tree_id);
            page.contents(*content_id);
            page.resources()
                .fonts()
                .pair(REGULAR, regular_id)
                .pair(BOLD, bold_id);
        }

        let mut content = Content::new();
        for (line, y) in page_lines {
            content.begin_text();
            content.set_font(if line.bold { BOLD } else { REGULAR }, f32::from(line.size));
            content.next_line(f32::from(MARGIN), *y);
            content.show(Str(&encode(&line.text)));
            content.end_text();
        }
        pdf.stream(*content_id, &content.finish());
    }

    pdf.finish()
}
