//! Headless Chrome/Chromium printing.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::converter::{ConvertError, Converter, resolve_binary, run_tool};

const NAME: &str = "Chrome headless";

/// Path characters kept as-is in a `file://` URL: unreserved, `/` and `:`.
const PATH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/')
    .remove(b':');

/// Prints the HTML to PDF with the first browser found among `candidates`.
#[derive(Debug, Clone)]
pub struct ChromeHeadless {
    candidates: Vec<String>,
    page_size: String,
}

impl ChromeHeadless {
    #[must_use]
    pub fn new(candidates: Vec<String>, page_size: impl Into<String>) -> Self {
        Self {
            candidates,
            page_size: page_size.into(),
        }
    }

    fn locate(&self) -> Option<PathBuf> {
        self.candidates.iter().find_map(|c| resolve_binary(c))
    }

    fn args(&self, html: &Path, pdf: &Path) -> Vec<OsString> {
        let mut print_to = OsString::from("--print-to-pdf=");
        print_to.push(pdf);
        vec![
            "--headless".into(),
            "--disable-gpu".into(),
            print_to,
            "--print-to-pdf-no-header".into(),
            "--no-margins".into(),
            format!("--page-size={}", self.page_size).into(),
            file_url(html).into(),
        ]
    }
}

impl Converter for ChromeHeadless {
    fn name(&self) -> &str {
        NAME
    }

    fn convert(&self, html: &Path, pdf: &Path) -> Result<(), ConvertError> {
        let Some(browser) = self.locate() else {
            return Err(ConvertError::Unavailable {
                tool: NAME.to_owned(),
            });
        };
        let html = std::path::absolute(html)?;
        let pdf = std::path::absolute(pdf)?;
        run_tool(NAME, &browser, self.args(&html, &pdf), &pdf)
    }
}

/// `file://` URL for an absolute path, percent-encoding each segment.
fn file_url(path: &Path) -> String {
    let mut raw = path.to_string_lossy().into_owned();
    if cfg!(windows) {
        raw = raw.replace('\\', "/");
    }
    if !raw.starts_with('/') {
        raw.insert(0, '/');
    }
    format!("file://{}", utf8_percent_encode(&raw, PATH_ENCODE_SET))
}
