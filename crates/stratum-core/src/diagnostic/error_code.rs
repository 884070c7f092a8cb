//! Diagnostic codes.
//!
//! Codes are organized by pipeline phase:
//! - `W1xx` - Layer parsing warnings
//! - `E2xx` - Validation errors
//! - `W3xx` - Graph construction and cross-layer resolution warnings
//! - `W4xx` - Node transformation warnings
//! - `W5xx` - Layout warnings

use std::fmt;

use serde::Serialize;

/// Codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorCode {
    // =========================================================================
    // Parsing (W1xx)
    // =========================================================================
    /// A raw record is not an object and was skipped.
    W100,

    /// An element record has no usable `id` and was skipped.
    W101,

    /// An element record has no usable `type` and was skipped.
    W102,

    /// A relationship record is missing its source or target and was skipped.
    W103,

    /// A relationship record has no usable `type` and was skipped.
    W104,

    /// A cross-layer reference record is malformed and was skipped.
    W105,

    // =========================================================================
    // Validation (E2xx)
    // =========================================================================
    /// Two elements share the same id.
    E200,

    /// A relationship source does not resolve to an element.
    E201,

    /// A relationship target does not resolve to an element.
    E202,

    /// Two relationships share the same id.
    E203,

    /// A relationship points from an element to itself.
    W204,

    // =========================================================================
    // Graph construction (W3xx)
    // =========================================================================
    /// A node with an already-present id was dropped.
    W300,

    /// A relationship with a dangling endpoint was excluded from the edges.
    W301,

    /// An edge with an already-present id was dropped.
    W302,

    /// A cross-layer relationship could not be resolved and was dropped.
    W310,

    // =========================================================================
    // Node transformation (W4xx)
    // =========================================================================
    /// A node type has no dimension entry; the default size was used.
    W400,

    /// Two producers contributed the same edge id; the later one was dropped.
    W401,

    // =========================================================================
    // Layout (W5xx)
    // =========================================================================
    /// The configured layout algorithm is not registered.
    W500,

    /// A layout engine could not place the graph and a fallback was used.
    W501,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "E200").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::W100 => "W100",
            ErrorCode::W101 => "W101",
            ErrorCode::W102 => "W102",
            ErrorCode::W103 => "W103",
            ErrorCode::W104 => "W104",
            ErrorCode::W105 => "W105",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::W204 => "W204",
            ErrorCode::W300 => "W300",
            ErrorCode::W301 => "W301",
            ErrorCode::W302 => "W302",
            ErrorCode::W310 => "W310",
            ErrorCode::W400 => "W400",
            ErrorCode::W401 => "W401",
            ErrorCode::W500 => "W500",
            ErrorCode::W501 => "W501",
        }
    }

    /// Returns a short description of the code.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::W100 => "record is not an object",
            ErrorCode::W101 => "element without id",
            ErrorCode::W102 => "element without type",
            ErrorCode::W103 => "relationship without endpoint",
            ErrorCode::W104 => "relationship without type",
            ErrorCode::W105 => "malformed reference",
            ErrorCode::E200 => "duplicate element id",
            ErrorCode::E201 => "dangling relationship source",
            ErrorCode::E202 => "dangling relationship target",
            ErrorCode::E203 => "duplicate relationship id",
            ErrorCode::W204 => "self-referencing relationship",
            ErrorCode::W300 => "duplicate node dropped",
            ErrorCode::W301 => "dangling relationship excluded",
            ErrorCode::W302 => "duplicate edge dropped",
            ErrorCode::W310 => "unresolved cross-layer reference",
            ErrorCode::W400 => "unknown node type",
            ErrorCode::W401 => "edge id collision",
            ErrorCode::W500 => "unknown layout algorithm",
            ErrorCode::W501 => "layout fallback",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::W100.to_string(), "W100");
        assert_eq!(ErrorCode::E200.to_string(), "E200");
        assert_eq!(ErrorCode::W401.to_string(), "W401");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E200.description(), "duplicate element id");
        assert_eq!(ErrorCode::W400.description(), "unknown node type");
    }
}
