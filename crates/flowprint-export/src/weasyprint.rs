//! `WeasyPrint` through its command-line front end.

use std::path::Path;

use crate::converter::{ConvertError, Converter, run_tool};

const NAME: &str = "WeasyPrint";

/// Runs `weasyprint <html> <pdf>`.
#[derive(Debug, Clone)]
pub struct WeasyPrint {
    command: String,
}

impl WeasyPrint {
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Converter for WeasyPrint {
    fn name(&self) -> &str {
        NAME
    }

    fn convert(&self, html: &Path, pdf: &Path) -> Result<(), ConvertError> {
        run_tool(
            NAME,
            Path::new(&self.command),
            vec![html.into(), pdf.into()],
            pdf,
        )
    }
}
