//! Error types for Stratum operations.
//!
//! This module provides the main error type [`StratumError`]. Data-quality
//! problems never end up here; they are reported as
//! [`Diagnostic`](stratum_core::diagnostic::Diagnostic) warnings instead.

use std::io;

use thiserror::Error;

use stratum_parser::ParseError;

use crate::layout::LayoutError;

/// The main error type for Stratum operations.
#[derive(Debug, Error)]
pub enum StratumError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
