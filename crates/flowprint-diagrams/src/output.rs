//! Image naming and HTML references for rendered diagrams.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use flowprint_config::{DiagramEmbed, DiagramFormat};

/// Directory under the output directory receiving diagram images.
pub const DIAGRAMS_DIR: &str = "diagrams";

/// How the HTML refers to rendered images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DiagramOutput {
    /// `src` is a path relative to the HTML file, e.g. `diagrams/diagram_00_flow.png`.
    #[default]
    Files,
    /// `src` is a base64 `data:` URI; the HTML needs no sibling files.
    Inline,
}

impl From<DiagramEmbed> for DiagramOutput {
    fn from(embed: DiagramEmbed) -> Self {
        match embed {
            DiagramEmbed::Files => Self::Files,
            DiagramEmbed::Inline => Self::Inline,
        }
    }
}

impl DiagramOutput {
    /// Build the `src` attribute for an image.
    pub(crate) fn src(self, file_name: &str, format: DiagramFormat, bytes: &[u8]) -> String {
        match self {
            Self::Files => format!("{DIAGRAMS_DIR}/{file_name}"),
            Self::Inline => format!(
                "data:{};base64,{}",
                format.mime_type(),
                BASE64_STANDARD.encode(bytes)
            ),
        }
    }
}

/// Reduce a section title to a file-name fragment.
///
/// Keeps ASCII letters, digits, whitespace and hyphens; spaces become
/// underscores and the result is lowercased.
#[must_use]
pub fn slugify(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .map(|c| if c == ' ' { '_' } else { c.to_ascii_lowercase() })
        .collect()
}

/// `diagram_{NN}_{slug}.{ext}`, or `diagram_{NN}.{ext}` without a usable title.
#[must_use]
pub fn file_name(index: usize, title: Option<&str>, format: DiagramFormat) -> String {
    let ext = format.extension();
    match title.map(slugify).filter(|slug| !slug.trim().is_empty()) {
        Some(slug) => format!("diagram_{index:02}_{slug}.{ext}"),
        None => format!("diagram_{index:02}.{ext}"),
    }
}
