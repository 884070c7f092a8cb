//! Raw model document as produced by the loader.
//!
//! Only the envelope is typed. Element and relationship payloads stay as
//! [`serde_json::Value`] so that malformed records reach the
//! [`LayerParser`](crate::LayerParser) and become warnings instead of failing
//! deserialization of the whole document.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ParseError;

/// Whole model document: `{layers: {<id>: {elements, relationships}}, references}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawModel {
    pub version: Option<String>,
    pub metadata: Value,
    pub layers: IndexMap<String, RawLayer>,
    pub references: Value,
}

/// One layer of the raw document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawLayer {
    pub id: Option<String>,
    pub name: Option<String>,
    pub elements: Value,
    pub relationships: Value,
}

impl RawModel {
    /// Deserializes a model document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidModel`] when the text is not JSON or the
    /// envelope has the wrong shape (e.g. `layers` is not an object).
    pub fn from_json(text: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Deserializes a model document from an already parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, ParseError> {
        Ok(serde_json::from_value(value)?)
    }
}
