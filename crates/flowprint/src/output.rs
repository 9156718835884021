//! Colored terminal output utilities.

use console::{Style, Term};

/// Progress reporter for the terminal.
pub(crate) struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
    cyan_bold: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stdout(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            cyan_bold: Style::new().cyan().bold(),
        }
    }

    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Green, prefixed with a check mark.
    pub(crate) fn success(&self, msg: &str) {
        let line = format!("✅ {msg}");
        let _ = self.term.write_line(&self.green.apply_to(line).to_string());
    }

    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.term.write_line(&self.yellow.apply_to(msg).to_string());
    }

    /// Red, prefixed with a cross.
    pub(crate) fn failure(&self, msg: &str) {
        let line = format!("❌ {msg}");
        let _ = self.term.write_line(&self.red.apply_to(line).to_string());
    }

    /// Fatal errors go to stderr.
    pub(crate) fn error(&self, msg: &str) {
        let _ = Term::stderr().write_line(&self.red.apply_to(msg).to_string());
    }

    pub(crate) fn highlight(&self, msg: &str) {
        let _ = self
            .term
            .write_line(&self.cyan_bold.apply_to(msg).to_string());
    }

    pub(crate) fn separator(&self) {
        let _ = self.term.write_line(&"=".repeat(50));
    }
}
