//! Tolerant parsing of raw architecture models.
//!
//! The entry point for whole documents is [`parse_model`]. It turns a
//! [`RawModel`] into a [`MetaModel`] and collects every skipped record as a
//! warning. Single layers can be parsed with [`LayerParser`].

mod config;
pub mod error;
mod implicit;
mod layer_id;
mod layer_parser;
mod raw;

use log::{debug, info};

use stratum_core::{
    diagnostic::{Diagnostic, ValidationReport},
    model::{Layer, MetaModel},
};

pub use config::ParserConfig;
pub use error::ParseError;
pub use implicit::{IMPLICIT_RELATIONSHIP_KEYS, implicit_relationships, target_element_id};
pub use layer_id::normalize_layer_id;
pub use layer_parser::{
    LayerMetadata, LayerParser, ParsedLayer, parse_element, parse_reference, parse_relationship,
};
pub use raw::{RawLayer, RawModel};

/// Result of [`parse_model`].
#[derive(Debug, Clone, Default)]
pub struct ParsedModel {
    pub model: MetaModel,
    /// Records that were skipped, in input order.
    pub warnings: Vec<Diagnostic>,
    /// Duplicate ids and self-references found in the parsed layers.
    pub validation: ValidationReport,
}

/// Parses every layer and the reference list of a raw document.
///
/// Layers whose ids normalise to the same value are merged in input order.
///
/// # Errors
///
/// Returns [`ParseError::NotACollection`] when a layer's `elements` or
/// `relationships`, or the model's `references`, is neither an array nor
/// `null`.
pub fn parse_model(raw: &RawModel, config: &ParserConfig) -> Result<ParsedModel, ParseError> {
    let mut parser = LayerParser::new(*config);
    let mut model = MetaModel::new();
    let mut validation = ValidationReport::new();

    for (raw_id, raw_layer) in &raw.layers {
        let layer_id = if config.normalize_layer_ids() {
            normalize_layer_id(raw_id)
        } else {
            raw_id.clone()
        };

        let parsed = parser.parse_layer(&layer_id, &raw_layer.elements, &raw_layer.relationships)?;
        validation.merge(parser.validate(&parsed));

        let layer = model
            .layers
            .entry(layer_id.clone())
            .or_insert_with(|| Layer::new(layer_id.clone()));
        if let Some(name) = &raw_layer.name {
            layer.name = name.clone();
        }
        layer.elements.extend(parsed.elements);
        layer.relationships.extend(parsed.relationships);
        debug!(layer_id = layer_id, raw_id = raw_id.as_str(); "Layer merged into model");
    }

    model.references = parser.parse_references(&raw.references)?;
    let warnings = parser.take_warnings();

    info!(
        layers = model.layers.len(),
        elements = model.element_count(),
        references = model.references.len(),
        warnings = warnings.len();
        "Model parsed"
    );

    Ok(ParsedModel {
        model,
        warnings,
        validation,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_model_normalizes_and_merges_layers() {
        let raw = RawModel::from_value(json!({
            "layers": {
                "data_model": {"elements": [{"id": "user", "type": "schema"}]},
                "DataModel": {"elements": [{"id": "order", "type": "schema"}]},
                "business": {"elements": [{"id": "b1", "type": "service"}]}
            }
        }))
        .unwrap();

        let parsed = parse_model(&raw, &ParserConfig::default()).unwrap();
        let ids: Vec<_> = parsed.model.layers.keys().cloned().collect();
        assert_eq!(ids, vec!["DataModel", "Business"]);
        assert_eq!(parsed.model.layers["DataModel"].elements.len(), 2);
        assert_eq!(parsed.model.layers["DataModel"].elements[0].layer_id, "DataModel");
    }

    #[test]
    fn test_parse_model_keeps_raw_ids_when_disabled() {
        let raw = RawModel::from_value(json!({
            "layers": {"data_model": {"elements": []}}
        }))
        .unwrap();

        let parsed = parse_model(&raw, &ParserConfig::new(false, true)).unwrap();
        assert!(parsed.model.layers.contains_key("data_model"));
    }

    #[test]
    fn test_parse_model_collects_warnings_and_validation() {
        let raw = RawModel::from_value(json!({
            "layers": {
                "Business": {
                    "elements": [{"id": "b1", "type": "service"}, {"id": "b1", "type": "actor"}, {"type": "actor"}]
                }
            },
            "references": [{"sourceId": "b1"}]
        }))
        .unwrap();

        let parsed = parse_model(&raw, &ParserConfig::default()).unwrap();
        assert_eq!(parsed.warnings.len(), 2);
        assert_eq!(parsed.validation.errors().len(), 1);
        assert!(parsed.model.references.is_empty());
    }

    #[test]
    fn test_parse_model_rejects_non_collection_references() {
        let raw = RawModel::from_value(json!({"layers": {}, "references": {"a": 1}})).unwrap();
        assert!(matches!(
            parse_model(&raw, &ParserConfig::default()),
            Err(ParseError::NotACollection { field: "references", .. })
        ));
    }
}
