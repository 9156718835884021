//! Inline emphasis substitution.
//!
//! Only two markers are recognized: `**` for `<strong>` and `*` for `<em>`.
//! Input is expected to be HTML-escaped already.

use std::sync::LazyLock;

use regex::Regex;

static STRONG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\*\*(\S(?:.*?\S)??)\*\*").unwrap());

static EM_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(\S(?:[^*]*?\S)??)\*").unwrap());

/// Strategy for turning emphasis markers into tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum EmphasisMode {
    /// Convert only complete marker pairs; unmatched markers stay literal.
    #[default]
    Paired,
    /// Every marker occurrence toggles between an opening and a closing tag,
    /// carried across the paragraphs of a section. An odd number of markers
    /// leaves a tag open.
    Alternating,
}

/// Emphasis state for one section.
#[derive(Debug, Default)]
pub(crate) struct Emphasis {
    mode: EmphasisMode,
    strong_open: bool,
    em_open: bool,
}

impl Emphasis {
    pub(crate) fn new(mode: EmphasisMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Apply emphasis substitution to one paragraph of escaped text.
    pub(crate) fn apply(&mut self, text: &str) -> String {
        match self.mode {
            EmphasisMode::Paired => {
                let strong = STRONG_PATTERN.replace_all(text, "<strong>$1</strong>");
                EM_PATTERN.replace_all(&strong, "<em>$1</em>").into_owned()
            }
            EmphasisMode::Alternating => {
                let strong = alternate(text, "**", "strong", &mut self.strong_open);
                alternate(&strong, "*", "em", &mut self.em_open)
            }
        }
    }
}

/// Replace each `marker` with an opening or closing `tag`, toggling `open`.
fn alternate(text: &str, marker: &str, tag: &str, open: &mut bool) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut rest = text;
    while let Some(pos) = rest.find(marker) {
        out.push_str(&rest[..pos]);
        if *open {
            out.push_str("</");
        } else {
            out.push('<');
        }
        out.push_str(tag);
        out.push('>');
        *open = !*open;
        rest = &rest[pos + marker.len()..];
    }
    out.push_str(rest);
    out
}
