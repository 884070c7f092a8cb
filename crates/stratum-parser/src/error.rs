//! Error types for the parser.
//!
//! Two tiers are kept apart:
//! - [`ParseError`] is returned from entry points when the input has an
//!   impossible shape (a layer payload that is not a collection, a model
//!   document that is not JSON). It signals a caller contract violation.
//! - [`RecordIssue`] is the per-record outcome for malformed domain data.
//!   The parser converts it into a warning [`Diagnostic`] and moves on.

use std::fmt;

use thiserror::Error;

use stratum_core::diagnostic::{Diagnostic, ErrorCode};

/// Fatal parser error.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("layer `{layer}`: `{field}` must be an array, found {found}")]
    NotACollection {
        layer: String,
        field: &'static str,
        found: &'static str,
    },

    #[error("invalid model document: {0}")]
    InvalidModel(#[from] serde_json::Error),
}

/// What went wrong with a single raw record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    NotAnObject,
    MissingId,
    MissingType,
    MissingEndpoint,
    MissingRelationshipType,
    MalformedReference,
}

impl IssueKind {
    fn code(self) -> ErrorCode {
        match self {
            IssueKind::NotAnObject => ErrorCode::W100,
            IssueKind::MissingId => ErrorCode::W101,
            IssueKind::MissingType => ErrorCode::W102,
            IssueKind::MissingEndpoint => ErrorCode::W103,
            IssueKind::MissingRelationshipType => ErrorCode::W104,
            IssueKind::MalformedReference => ErrorCode::W105,
        }
    }
}

/// Recoverable problem with one record; the record is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordIssue {
    pub kind: IssueKind,
    pub message: String,
    /// Id of the record when it had one.
    pub subject: Option<String>,
}

impl RecordIssue {
    pub fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            subject: None,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Converts the issue into a warning diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic = Diagnostic::warning(self.message.clone()).with_code(self.kind.code());
        match &self.subject {
            Some(subject) => diagnostic.with_subject(subject.clone()),
            None => diagnostic,
        }
    }
}

impl fmt::Display for RecordIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
