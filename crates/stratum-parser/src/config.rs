use serde::Deserialize;

/// Parser options, read from the `[parser]` section of the configuration file.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ParserConfig {
    /// Map loader-style layer ids (`data_model`) to PascalCase (`DataModel`).
    normalize_layer_ids: bool,
    /// Turn relationship-valued element properties into relationships.
    implicit_relationships: bool,
}

impl ParserConfig {
    pub fn new(normalize_layer_ids: bool, implicit_relationships: bool) -> Self {
        Self {
            normalize_layer_ids,
            implicit_relationships,
        }
    }

    pub fn normalize_layer_ids(&self) -> bool {
        self.normalize_layer_ids
    }

    pub fn implicit_relationships(&self) -> bool {
        self.implicit_relationships
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::new(true, true)
    }
}
