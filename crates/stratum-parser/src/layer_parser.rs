//! Parsing of one layer's raw records into typed elements and relationships.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, warn};
use serde_json::{Map, Value};

use stratum_core::{
    diagnostic::{Diagnostic, ErrorCode, ValidationReport},
    geometry::{Point, Size},
    model::{
        Element, ElementKind, Field, Properties, PropertyValue, Relationship, RelationshipKind,
        Visual,
    },
};

use crate::{
    config::ParserConfig,
    error::{IssueKind, ParseError, RecordIssue},
    implicit::{implicit_relationships, synthesize_relationship_id, target_element_id},
};

/// Counts describing a parsed layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerMetadata {
    pub element_count: usize,
    pub relationship_count: usize,
    /// Number of elements per type tag, in first-seen order.
    pub elements_by_type: IndexMap<String, usize>,
}

/// Output of [`LayerParser::parse_layer`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLayer {
    pub layer_id: String,
    pub elements: Vec<Element>,
    pub relationships: Vec<Relationship>,
    pub metadata: LayerMetadata,
}

impl ParsedLayer {
    fn new(layer_id: &str, elements: Vec<Element>, relationships: Vec<Relationship>) -> Self {
        let mut elements_by_type = IndexMap::new();
        for element in &elements {
            *elements_by_type
                .entry(element.type_tag().to_string())
                .or_insert(0) += 1;
        }

        Self {
            layer_id: layer_id.to_string(),
            metadata: LayerMetadata {
                element_count: elements.len(),
                relationship_count: relationships.len(),
                elements_by_type,
            },
            elements,
            relationships,
        }
    }
}

/// Tolerant parser for raw layer payloads.
///
/// Malformed records are skipped and reported through [`LayerParser::warnings`].
/// The only failure is a payload that is not a collection at all.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use stratum_parser::LayerParser;
///
/// let mut parser = LayerParser::default();
/// let layer = parser
///     .parse_layer(
///         "Motivation",
///         &json!([{"id": "g1", "type": "goal"}, {"name": "no id"}]),
///         &json!([]),
///     )
///     .expect("payloads are arrays");
///
/// assert_eq!(layer.elements.len(), 1);
/// assert_eq!(parser.warnings().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct LayerParser {
    config: ParserConfig,
    warnings: Vec<Diagnostic>,
}

impl LayerParser {
    pub fn new(config: ParserConfig) -> Self {
        Self {
            config,
            warnings: Vec::new(),
        }
    }

    /// Parses the element and relationship records of one layer.
    ///
    /// An absent (`null`) payload is treated as an empty collection.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NotACollection`] when either payload is neither
    /// an array nor `null`.
    pub fn parse_layer(
        &mut self,
        layer_id: &str,
        raw_elements: &Value,
        raw_relationships: &Value,
    ) -> Result<ParsedLayer, ParseError> {
        let element_records = as_collection(layer_id, "elements", raw_elements)?;
        let relationship_records = as_collection(layer_id, "relationships", raw_relationships)?;

        let mut elements = Vec::with_capacity(element_records.len());
        let mut implicit = Vec::new();
        for record in element_records {
            match parse_element(layer_id, record) {
                Ok(element) => {
                    if self.config.implicit_relationships() {
                        if let Some(Value::Object(properties)) = record.get("properties") {
                            implicit.extend(implicit_relationships(&element.id, properties));
                        }
                    }
                    elements.push(element);
                }
                Err(issue) => self.record_issue(layer_id, &issue),
            }
        }

        let mut relationships = Vec::with_capacity(relationship_records.len() + implicit.len());
        for record in relationship_records {
            match parse_relationship(record) {
                Ok(relationship) => relationships.push(relationship),
                Err(issue) => self.record_issue(layer_id, &issue),
            }
        }
        relationships.extend(implicit);

        debug!(
            layer_id = layer_id,
            elements = elements.len(),
            relationships = relationships.len();
            "Layer parsed"
        );

        Ok(ParsedLayer::new(layer_id, elements, relationships))
    }

    /// Parses the model-level reference list.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NotACollection`] when `raw_references` is neither
    /// an array nor `null`.
    pub fn parse_references(&mut self, raw_references: &Value) -> Result<Vec<Relationship>, ParseError> {
        let records = as_collection("<model>", "references", raw_references)?;
        let mut references = Vec::with_capacity(records.len());
        for record in records {
            match parse_reference(record) {
                Ok(reference) => references.push(reference),
                Err(issue) => self.record_issue("<model>", &issue),
            }
        }
        Ok(references)
    }

    /// Reports duplicate ids and self-references within a parsed layer.
    ///
    /// Duplicates are validation errors. They are never raised while parsing
    /// so that one bad record does not hide the rest of the layer.
    pub fn validate(&self, layer: &ParsedLayer) -> ValidationReport {
        let mut report = ValidationReport::new();

        let mut seen = HashSet::new();
        for element in &layer.elements {
            if !seen.insert(element.id.as_str()) {
                report.push(
                    Diagnostic::error(format!(
                        "duplicate element id `{}` in layer `{}`",
                        element.id, layer.layer_id
                    ))
                    .with_code(ErrorCode::E200)
                    .with_subject(element.id.clone()),
                );
            }
        }

        let mut seen = HashSet::new();
        for relationship in &layer.relationships {
            if !seen.insert(relationship.id.as_str()) {
                report.push(
                    Diagnostic::error(format!(
                        "duplicate relationship id `{}` in layer `{}`",
                        relationship.id, layer.layer_id
                    ))
                    .with_code(ErrorCode::E203)
                    .with_subject(relationship.id.clone()),
                );
            }
            if relationship.is_self_loop() {
                report.push(
                    Diagnostic::warning(format!(
                        "relationship `{}` points from `{}` to itself",
                        relationship.id, relationship.source_id
                    ))
                    .with_code(ErrorCode::W204)
                    .with_subject(relationship.id.clone()),
                );
            }
        }

        report
    }

    /// Warnings accumulated since construction or the last [`take_warnings`](Self::take_warnings).
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Removes and returns the accumulated warnings.
    pub fn take_warnings(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.warnings)
    }

    fn record_issue(&mut self, layer_id: &str, issue: &RecordIssue) {
        let diagnostic = issue.to_diagnostic();
        warn!(layer_id = layer_id; "{diagnostic}");
        self.warnings.push(diagnostic);
    }
}

/// Parses a single element record.
///
/// # Errors
///
/// Returns a [`RecordIssue`] when the record is not an object or lacks a
/// usable `id` or `type`.
pub fn parse_element(layer_id: &str, record: &Value) -> Result<Element, RecordIssue> {
    let object = record.as_object().ok_or_else(|| {
        RecordIssue::new(
            IssueKind::NotAnObject,
            format!("element record in layer `{layer_id}` is not an object"),
        )
    })?;

    let id = id_field(object, "id").ok_or_else(|| {
        RecordIssue::new(
            IssueKind::MissingId,
            format!("element record in layer `{layer_id}` has no id"),
        )
    })?;
    let type_tag = string_field(object, "type").ok_or_else(|| {
        RecordIssue::new(
            IssueKind::MissingType,
            format!("element `{id}` in layer `{layer_id}` has no type"),
        )
        .with_subject(id.clone())
    })?;

    let raw_properties = object.get("properties").and_then(Value::as_object);
    let mut kind = ElementKind::from_tag(type_tag);
    if kind.list_items().is_some() {
        kind.set_list_items(list_items(object, raw_properties));
    }

    let description = string_field(object, "description")
        .or_else(|| raw_properties.and_then(|props| string_field(props, "description")))
        .map(str::to_string);

    let mut element = Element::new(id.clone(), kind, layer_id)
        .with_name(string_field(object, "name").unwrap_or(&id));
    element.description = description;
    element.properties = raw_properties.map(scalar_properties).unwrap_or_default();
    element.visual = object.get("visual").map(parse_visual).unwrap_or_default();

    Ok(element)
}

/// Parses a single relationship record.
///
/// Accepts `sourceId`/`targetId` as well as `source`/`target`. A record
/// without `id` gets the synthesised id `"{source}-{type}-{target}"`.
///
/// # Errors
///
/// Returns a [`RecordIssue`] when the record is not an object or lacks a
/// source, target or type.
pub fn parse_relationship(record: &Value) -> Result<Relationship, RecordIssue> {
    let object = record.as_object().ok_or_else(|| {
        RecordIssue::new(
            IssueKind::NotAnObject,
            "relationship record is not an object",
        )
    })?;
    let explicit_id = id_field(object, "id");
    let label = explicit_id.clone().unwrap_or_else(|| "<unnamed>".to_string());

    let endpoint = |primary: &str, alternate: &str| {
        string_field(object, primary).or_else(|| string_field(object, alternate))
    };
    let (Some(source), Some(target)) = (
        endpoint("sourceId", "source"),
        endpoint("targetId", "target"),
    ) else {
        let issue = RecordIssue::new(
            IssueKind::MissingEndpoint,
            format!("relationship `{label}` is missing its source or target"),
        );
        return Err(match explicit_id {
            Some(id) => issue.with_subject(id),
            None => issue,
        });
    };

    let type_tag = string_field(object, "type").ok_or_else(|| {
        RecordIssue::new(
            IssueKind::MissingRelationshipType,
            format!("relationship `{label}` has no type"),
        )
        .with_subject(label.clone())
    })?;

    let id = explicit_id.unwrap_or_else(|| synthesize_relationship_id(source, type_tag, target));
    let mut relationship =
        Relationship::new(id, RelationshipKind::from_tag(type_tag), source, target);
    relationship.properties = object
        .get("properties")
        .and_then(Value::as_object)
        .map(scalar_properties)
        .unwrap_or_default();

    Ok(relationship)
}

/// Parses a model-level reference.
///
/// Besides the flat relationship shape, the nested loader shape
/// `{source: {layerId, elementId}, target: {layerId, elementId}, type}` is
/// accepted. Dotted element ids (`layer.type.id`) are reduced to the last
/// segment.
///
/// # Errors
///
/// Returns a [`RecordIssue`] when neither shape can be read.
pub fn parse_reference(record: &Value) -> Result<Relationship, RecordIssue> {
    let nested = record
        .get("source")
        .and_then(Value::as_object)
        .zip(record.get("target").and_then(Value::as_object));
    let Some((source, target)) = nested else {
        return parse_relationship(record);
    };

    let malformed = |what: &str| {
        RecordIssue::new(
            IssueKind::MalformedReference,
            format!("cross-layer reference is missing {what}"),
        )
    };
    let source_id = string_field(source, "elementId")
        .map(target_element_id)
        .ok_or_else(|| malformed("source.elementId"))?;
    let target_id = string_field(target, "elementId")
        .map(target_element_id)
        .ok_or_else(|| malformed("target.elementId"))?;
    let type_tag = record
        .get("type")
        .and_then(Value::as_str)
        .filter(|tag| !tag.trim().is_empty())
        .ok_or_else(|| malformed("type"))?;

    let id = record
        .as_object()
        .and_then(|object| id_field(object, "id"))
        .unwrap_or_else(|| synthesize_relationship_id(source_id, type_tag, target_id));

    Ok(Relationship::new(
        id,
        RelationshipKind::from_tag(type_tag),
        source_id,
        target_id,
    ))
}

fn as_collection<'v>(
    layer_id: &str,
    field: &'static str,
    value: &'v Value,
) -> Result<&'v [Value], ParseError> {
    match value {
        Value::Array(records) => Ok(records),
        Value::Null => Ok(&[]),
        other => Err(ParseError::NotACollection {
            layer: layer_id.to_string(),
            field,
            found: json_type_name(other),
        }),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Non-empty, non-blank string field.
fn string_field<'v>(object: &'v Map<String, Value>, key: &str) -> Option<&'v str> {
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
}

/// Id field; numeric ids are accepted and stringified.
fn id_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(id) if !id.trim().is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn scalar(value: &Value) -> Option<PropertyValue> {
    match value {
        Value::Null => Some(PropertyValue::Null),
        Value::Bool(flag) => Some(PropertyValue::Bool(*flag)),
        Value::Number(number) => number.as_f64().map(PropertyValue::Number),
        Value::String(text) => Some(PropertyValue::String(text.clone())),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Keeps the scalar entries of a property object. Nested values are the
/// business of [`implicit_relationships`].
fn scalar_properties(raw: &Map<String, Value>) -> Properties {
    raw.iter()
        .filter_map(|(key, value)| scalar(value).map(|value| (key.clone(), value)))
        .collect()
}

fn list_items(object: &Map<String, Value>, properties: Option<&Map<String, Value>>) -> Vec<Field> {
    let raw_items = ["fields", "columns"]
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_array))
        .or_else(|| {
            let properties = properties?;
            ["fields", "columns"]
                .iter()
                .find_map(|key| properties.get(*key).and_then(Value::as_array))
        });

    raw_items
        .into_iter()
        .flatten()
        .filter_map(|item| match item {
            Value::String(name) => Some(Field::new(name.clone(), None)),
            Value::Object(field) => {
                let name = string_field(field, "name")?;
                let data_type = string_field(field, "type").map(str::to_string);
                Some(Field::new(name, data_type))
            }
            _ => None,
        })
        .collect()
}

fn parse_visual(raw: &Value) -> Visual {
    let number = |object: &Map<String, Value>, key: &str| -> Option<f32> {
        object.get(key).and_then(Value::as_f64).map(|n| n as f32)
    };

    let position = raw
        .get("position")
        .and_then(Value::as_object)
        .and_then(|p| Some(Point::new(number(p, "x")?, number(p, "y")?)));
    let size = raw
        .get("size")
        .and_then(Value::as_object)
        .and_then(|s| Some(Size::new(number(s, "width")?, number(s, "height")?)));
    let style = raw
        .get("style")
        .and_then(Value::as_object)
        .map(|style| {
            style
                .iter()
                .filter_map(|(key, value)| Some((key.clone(), value.as_str()?.to_string())))
                .collect()
        })
        .unwrap_or_default();

    Visual {
        position,
        size,
        style,
    }
}
