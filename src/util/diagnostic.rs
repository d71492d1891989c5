//! User-friendly diagnostic messages.
//!
//! Every problem printed to the terminal says what is wrong, where, and what
//! to do about it.

use std::fmt;
use std::path::PathBuf;

use crate::core::error::ManifestError;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when no manifest file is found.
    pub const NO_MANIFESTS: &str =
        "Check the workspace path, or pass --target if manifests use another file name";

    /// Suggestion when a check finds problems.
    pub const SEE_JSON: &str = "Run `sherpa check --format json` for a machine-readable report";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl Severity {
    fn paint(self, color: bool) -> &'static str {
        match (self, color) {
            (Severity::Error, true) => "\x1b[1;31merror\x1b[0m",
            (Severity::Warning, true) => "\x1b[1;33mwarning\x1b[0m",
            (Severity::Note, true) => "\x1b[1;36mnote\x1b[0m",
            (Severity::Error, false) => "error",
            (Severity::Warning, false) => "warning",
            (Severity::Note, false) => "note",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.paint(false))
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Numeric error code, shown as `error[201]`
    pub code: Option<u32>,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related location (file path)
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    fn with_severity(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity,
            code: None,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Error, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Warning, message)
    }

    /// Create a new note.
    pub fn note(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Note, message)
    }

    /// Build an error diagnostic from a report error.
    pub fn from_manifest_error(err: &ManifestError) -> Self {
        let mut diag = Diagnostic::error(&err.message).with_code(err.code);
        if let Some(field) = &err.field {
            diag = diag.with_context(format!("field: {}", field));
        }
        if !err.developer_message.is_empty() {
            diag = diag.with_context(&err.developer_message);
        }
        if !err.help.is_empty() {
            diag = diag.with_suggestion(&err.help);
        }
        diag
    }

    /// Attach a numeric code.
    pub fn with_code(mut self, code: u32) -> Self {
        self.code = Some(code);
        self
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add a file location.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity = self.severity.paint(color);
        match self.code {
            Some(code) => output.push_str(&format!("{}[{}]: {}\n", severity, code, self.message)),
            None => output.push_str(&format!("{}: {}\n", severity, self.message)),
        }

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for ctx in &self.context {
            output.push_str(&format!("   = {}\n", ctx));
        }

        let help = if color { "\x1b[1;32mhelp\x1b[0m" } else { "help" };
        match self.suggestions.as_slice() {
            [] => {}
            [only] => output.push_str(&format!("   {}: {}\n", help, only)),
            many => {
                output.push_str(&format!("   {}: consider:\n", help));
                for (i, suggestion) in many.iter().enumerate() {
                    output.push_str(&format!("     {}. {}\n", i + 1, suggestion));
                }
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
