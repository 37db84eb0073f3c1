use std::fmt::Display;
use std::path::Path;

use super::code::ErrorCode;

/// Labelled context lines shown under the headline in verbose mode
///
/// Lines keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    lines: Vec<(&'static str, String)>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filesystem location
    pub fn path(self, label: &'static str, path: &Path) -> Self {
        self.value(label, path.display())
    }

    /// Adds any displayable value
    pub fn value(mut self, label: &'static str, value: impl Display) -> Self {
        self.lines.push((label, value.to_string()));
        self
    }

    pub fn lines(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.lines.iter().map(|(label, value)| (*label, value.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Error ready for display: code, one-line message and context
#[derive(Debug, Clone)]
pub struct RichError {
    code: ErrorCode,
    message: String,
    context: ErrorContext,
    orphaned: bool,
}

impl RichError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            orphaned: false,
        }
    }

    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = context;
        self
    }

    /// Marks that the registry kept an entry without a local database
    pub fn with_orphaned_entry(mut self) -> Self {
        self.orphaned = true;
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &ErrorContext {
        &self.context
    }

    pub fn orphaned(&self) -> bool {
        self.orphaned
    }
}

impl Display for RichError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "error[{}]: {}", self.code, self.message)
    }
}

impl std::error::Error for RichError {}
