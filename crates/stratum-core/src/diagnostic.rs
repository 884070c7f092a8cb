//! Diagnostics reported by the parsing and graph pipeline.
//!
//! Nothing in the pipeline fails on bad domain data. Malformed records,
//! dangling references and unknown kinds are turned into a [`Diagnostic`],
//! logged, and accumulated so the caller can decide whether to block, warn or
//! proceed.
//!
//! # Example
//!
//! ```
//! use stratum_core::diagnostic::{Diagnostic, ErrorCode};
//!
//! let diag = Diagnostic::warning("relationship `rel1` targets missing element `x`")
//!     .with_code(ErrorCode::W301)
//!     .with_subject("rel1")
//!     .with_help("check the target id or add the element to the model");
//!
//! assert!(diag.severity().is_warning());
//! assert_eq!(diag.subject(), Some("rel1"));
//! ```

mod error_code;
mod report;
mod severity;

pub use error_code::ErrorCode;
pub use report::ValidationReport;
pub use severity::Severity;

use std::fmt;

use serde::Serialize;

/// A single warning or validation error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<ErrorCode>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the error code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Id of the element, relationship or edge the diagnostic is about.
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Set the subject id.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            subject: None,
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{}[{}]: {}", self.severity, code, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display_with_code() {
        let diag = Diagnostic::error("duplicate element id `g1`").with_code(ErrorCode::E200);
        assert_eq!(diag.to_string(), "error[E200]: duplicate element id `g1`");
    }

    #[test]
    fn test_diagnostic_display_without_code() {
        let diag = Diagnostic::warning("something odd");
        assert_eq!(diag.to_string(), "warning: something odd");
    }

    #[test]
    fn test_diagnostic_builder() {
        let diag = Diagnostic::warning("unknown type")
            .with_code(ErrorCode::W400)
            .with_subject("n1")
            .with_help("add a dimension entry");

        assert_eq!(diag.code(), Some(ErrorCode::W400));
        assert_eq!(diag.subject(), Some("n1"));
        assert_eq!(diag.help(), Some("add a dimension entry"));
        assert!(diag.severity().is_warning());
    }
}
