//! HTML document template.
//!
//! Wraps rendered section fragments in a fixed preamble (style block, title,
//! metadata, optional overview) and epilogue (footer). Two stylesheets are
//! available, matching the classic and professional looks of the generated
//! flow-chart documents.

use std::fmt::Write;

use crate::inline::EmphasisMode;
use crate::sections::FigureAssignment;
use crate::util::escape_html;

/// One label/value row of document metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct MetadataField {
    pub label: String,
    pub value: String,
}

impl MetadataField {
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Visual style of the generated document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum TemplateStyle {
    /// Single white card with left-bordered headings.
    Classic,
    /// Gradient header, metadata grid and dark footer.
    #[default]
    Professional,
}

/// Fixed content surrounding the rendered sections.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct TemplateConfig {
    /// Document title, used for `<title>` and the main heading.
    pub title: String,
    /// Line shown under the title.
    pub subtitle: Option<String>,
    /// Ordered metadata rows.
    pub metadata: Vec<MetadataField>,
    /// Paragraph rendered as an "Overview" section before the content.
    pub overview: Option<String>,
    /// Footer lines, one paragraph each.
    pub footer: Vec<String>,
    /// Stylesheet selection.
    pub style: TemplateStyle,
    /// Emphasis marker handling for section prose.
    pub emphasis: EmphasisMode,
    /// How diagrams are attached to sections.
    pub assignment: FigureAssignment,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            title: "User Flow Chart".to_owned(),
            subtitle: None,
            metadata: Vec::new(),
            overview: None,
            footer: Vec::new(),
            style: TemplateStyle::default(),
            emphasis: EmphasisMode::default(),
            assignment: FigureAssignment::default(),
        }
    }
}

const CLASSIC_CSS: &str = "\
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; \
line-height: 1.6; color: #333; max-width: 1200px; margin: 0 auto; padding: 20px; \
background-color: #f8f9fa; }
.container { background-color: white; padding: 40px; border-radius: 8px; \
box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
h1 { color: #2c3e50; border-bottom: 3px solid #3498db; padding-bottom: 10px; margin-bottom: 30px; }
h2 { color: #34495e; margin-top: 40px; margin-bottom: 20px; border-left: 4px solid #3498db; \
padding-left: 15px; }
.subtitle { color: #6c757d; margin-top: -20px; margin-bottom: 30px; }
.flowchart-container { text-align: center; margin: 30px 0; padding: 20px; \
background-color: #f8f9fa; border-radius: 8px; border: 1px solid #e9ecef; }
.flowchart-image { max-width: 100%; height: auto; border-radius: 4px; \
box-shadow: 0 2px 8px rgba(0,0,0,0.1); }
.flowchart-caption { margin-top: 15px; font-style: italic; color: #6c757d; font-size: 14px; }
.section { margin-bottom: 40px; page-break-inside: avoid; }
.metadata { background-color: #e3f2fd; padding: 15px; border-radius: 6px; margin-bottom: 30px; \
border-left: 4px solid #2196f3; }
.metadata p { margin: 5px 0; font-size: 14px; }
pre { background-color: #f8f9fa; padding: 12px; border-radius: 4px; overflow-x: auto; }
.footer { margin-top: 40px; border-top: 2px solid #e9ecef; padding-top: 20px; \
text-align: center; color: #6c757d; font-size: 14px; }
@media print {
  body { background-color: white; margin: 0; padding: 20px; }
  .container { box-shadow: none; padding: 20px; }
  .flowchart-container { page-break-inside: avoid; }
}
";

const PROFESSIONAL_CSS: &str = "\
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: 'Inter', -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; \
line-height: 1.7; color: #1a202c; background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); \
min-height: 100vh; padding: 20px; }
.container { max-width: 1400px; margin: 0 auto; background: white; border-radius: 16px; \
box-shadow: 0 20px 40px rgba(0,0,0,0.1); overflow: hidden; }
.header { background: linear-gradient(135deg, #2c3e50 0%, #34495e 100%); color: white; \
padding: 40px; text-align: center; }
.header h1 { font-size: 2.5rem; font-weight: 700; margin-bottom: 10px; }
.header .subtitle { font-size: 1.1rem; opacity: 0.9; font-weight: 300; }
.metadata { background: linear-gradient(135deg, #e3f2fd 0%, #f3e5f5 100%); padding: 30px 40px; \
border-bottom: 1px solid #e1e8ed; }
.metadata-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 20px; }
.metadata-item { background: white; padding: 15px; border-radius: 8px; \
box-shadow: 0 2px 8px rgba(0,0,0,0.1); }
.metadata-item strong { color: #2c3e50; display: block; margin-bottom: 5px; }
.content { padding: 40px; }
.section { margin-bottom: 60px; page-break-inside: avoid; }
.section h2 { font-size: 1.8rem; font-weight: 600; color: #2c3e50; margin-bottom: 25px; \
padding-bottom: 10px; border-bottom: 3px solid #3498db; }
.flowchart-container { background: linear-gradient(135deg, #f8f9fa 0%, #e9ecef 100%); \
border-radius: 12px; padding: 30px; margin: 30px 0; border: 1px solid #dee2e6; \
box-shadow: 0 4px 12px rgba(0,0,0,0.05); }
.flowchart-image { width: 100%; height: auto; border-radius: 8px; \
box-shadow: 0 8px 24px rgba(0,0,0,0.15); }
.flowchart-caption { text-align: center; margin-top: 20px; font-weight: 500; color: #495057; \
font-size: 1rem; padding: 10px; background: white; border-radius: 6px; \
box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
.section-content { background: white; padding: 25px; border-radius: 8px; \
box-shadow: 0 2px 8px rgba(0,0,0,0.05); margin-top: 20px; }
.section-content p { margin-bottom: 15px; color: #495057; }
.section-content pre { background: #f8f9fa; padding: 12px; border-radius: 6px; \
overflow-x: auto; margin-bottom: 15px; }
.footer { background: linear-gradient(135deg, #2c3e50 0%, #34495e 100%); color: white; \
padding: 30px 40px; text-align: center; }
.footer p { margin: 5px 0; opacity: 0.9; }
@media print {
  body { background: white; padding: 0; }
  .container { box-shadow: none; border-radius: 0; }
  .header { background: #2c3e50 !important; -webkit-print-color-adjust: exact; print-color-adjust: exact; }
  .flowchart-container { page-break-inside: avoid; background: #f8f9fa !important; \
-webkit-print-color-adjust: exact; print-color-adjust: exact; }
}
@media (max-width: 768px) {
  .header h1 { font-size: 2rem; }
  .content { padding: 20px; }
  .metadata-grid { grid-template-columns: 1fr; }
}
";

/// Assemble a complete HTML document from rendered section fragments.
///
/// Fragments are concatenated in order. The output contains nothing that
/// varies between runs, so identical input yields identical bytes.
#[must_use]
pub fn render_document(config: &TemplateConfig, fragments: &[String]) -> String {
    let body_len: usize = fragments.iter().map(String::len).sum();
    let mut html = String::with_capacity(body_len + 8192);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape_html(&config.title));
    html.push_str("<style>\n");
    html.push_str(match config.style {
        TemplateStyle::Classic => CLASSIC_CSS,
        TemplateStyle::Professional => PROFESSIONAL_CSS,
    });
    html.push_str("</style>\n</head>\n<body>\n<div class=\"container\">\n");

    match config.style {
        TemplateStyle::Classic => render_classic_header(&mut html, config),
        TemplateStyle::Professional => render_professional_header(&mut html, config),
    }

    if let Some(overview) = &config.overview {
        html.push_str("<div class=\"section\">\n<h2>Overview</h2>\n");
        let _ = writeln!(
            html,
            "<div class=\"section-content\">\n<p>{}</p>\n</div>",
            escape_html(overview)
        );
        html.push_str("</div>\n");
    }

    for fragment in fragments {
        html.push_str(fragment);
    }

    if config.style == TemplateStyle::Professional {
        // Closes .content
        html.push_str("</div>\n");
    }

    render_footer(&mut html, &config.footer);

    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn render_classic_header(html: &mut String, config: &TemplateConfig) {
    let _ = writeln!(html, "<h1>{}</h1>", escape_html(&config.title));
    if let Some(subtitle) = &config.subtitle {
        let _ = writeln!(html, "<p class=\"subtitle\">{}</p>", escape_html(subtitle));
    }
    if !config.metadata.is_empty() {
        html.push_str("<div class=\"metadata\">\n");
        for field in &config.metadata {
            let _ = writeln!(
                html,
                "<p><strong>{}:</strong> {}</p>",
                escape_html(&field.label),
                escape_html(&field.value)
            );
        }
        html.push_str("</div>\n");
    }
}

fn render_professional_header(html: &mut String, config: &TemplateConfig) {
    html.push_str("<div class=\"header\">\n");
    let _ = writeln!(html, "<h1>{}</h1>", escape_html(&config.title));
    if let Some(subtitle) = &config.subtitle {
        let _ = writeln!(html, "<p class=\"subtitle\">{}</p>", escape_html(subtitle));
    }
    html.push_str("</div>\n");

    if !config.metadata.is_empty() {
        html.push_str("<div class=\"metadata\">\n<div class=\"metadata-grid\">\n");
        for field in &config.metadata {
            let _ = writeln!(
                html,
                "<div class=\"metadata-item\"><strong>{}</strong>{}</div>",
                escape_html(&field.label),
                escape_html(&field.value)
            );
        }
        html.push_str("</div>\n</div>\n");
    }

    html.push_str("<div class=\"content\">\n");
}

fn render_footer(html: &mut String, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    html.push_str("<div class=\"footer\">\n");
    for line in lines {
        let _ = writeln!(html, "<p>{}</p>", escape_html(line));
    }
    html.push_str("</div>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config(style: TemplateStyle) -> TemplateConfig {
        TemplateConfig {
            title: "App - User Flow Chart".to_owned(),
            subtitle: Some("User Flow Documentation".to_owned()),
            metadata: vec![
                MetadataField::new("Version", "1.0.0 (MVP)"),
                MetadataField::new("Document Type", "User Flow Documentation"),
            ],
            overview: Some("All user flows.".to_owned()),
            footer: vec!["App v1.0.0".to_owned()],
            style,
            ..TemplateConfig::default()
        }
    }

    #[test]
    fn test_document_skeleton() {
        let html = render_document(&TemplateConfig::default(), &[]);

        assert!(html.starts_with("<!DOCTYPE html>\n<html lang=\"en\">"));
        assert!(html.contains("<title>User Flow Chart</title>"));
        assert!(html.ends_with("</body>\n</html>\n"));
        assert!(!html.contains("class=\"footer\""));
        assert!(!html.contains("Overview"));
    }

    #[test]
    fn test_fragments_in_order() {
        let fragments = vec!["<p>first</p>\n".to_owned(), "<p>second</p>\n".to_owned()];
        let html = render_document(&TemplateConfig::default(), &fragments);

        let first = html.find("<p>first</p>").unwrap();
        let second = html.find("<p>second</p>").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_professional_layout() {
        let html = render_document(&config(TemplateStyle::Professional), &["<x/>".to_owned()]);

        assert!(html.contains("<div class=\"header\">\n<h1>App - User Flow Chart</h1>"));
        assert!(html.contains("<p class=\"subtitle\">User Flow Documentation</p>"));
        assert!(html.contains(
            "<div class=\"metadata-item\"><strong>Version</strong>1.0.0 (MVP)</div>"
        ));
        assert!(html.contains("<h2>Overview</h2>"));
        assert!(html.contains("<x/></div>\n<div class=\"footer\">\n<p>App v1.0.0</p>"));
        assert!(html.contains(".metadata-grid"));
    }

    #[test]
    fn test_classic_layout() {
        let html = render_document(&config(TemplateStyle::Classic), &[]);

        assert!(html.contains("<h1>App - User Flow Chart</h1>"));
        assert!(!html.contains("class=\"header\""));
        assert!(html.contains("<p><strong>Version:</strong> 1.0.0 (MVP)</p>"));
        assert!(!html.contains("class=\"content\""));
        assert!(html.contains("border-left: 4px solid #3498db"));
    }

    #[test]
    fn test_overview_precedes_sections() {
        let html = render_document(
            &config(TemplateStyle::Professional),
            &["<div class=\"section\">\n<h2>Intro</h2>\n</div>\n".to_owned()],
        );
        assert!(html.find("Overview").unwrap() < html.find("Intro").unwrap());
    }

    #[test]
    fn test_template_text_escaped() {
        let mut config = config(TemplateStyle::Classic);
        config.title = "A <b> & C".to_owned();
        config.footer = vec!["<script>".to_owned()];
        let html = render_document(&config, &[]);

        assert!(html.contains("<title>A &lt;b&gt; &amp; C</title>"));
        assert!(html.contains("<p>&lt;script&gt;</p>"));
    }

    #[test]
    fn test_output_is_deterministic() {
        let config = config(TemplateStyle::Professional);
        let fragments = vec!["<p>x</p>".to_owned()];
        assert_eq!(
            render_document(&config, &fragments),
            render_document(&config, &fragments)
        );
    }
}
