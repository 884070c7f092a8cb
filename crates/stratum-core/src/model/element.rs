use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::geometry::{Point, Size};

/// Scalar property value. Nested objects and arrays are not properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl PropertyValue {
    /// Returns the string payload, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Null => write!(f, "null"),
            PropertyValue::Bool(value) => write!(f, "{value}"),
            PropertyValue::Number(value) => write!(f, "{value}"),
            PropertyValue::String(value) => write!(f, "{value}"),
        }
    }
}

/// Ordered property bag of an element or relationship.
pub type Properties = IndexMap<String, PropertyValue>;

/// A single entry of a list-style element (schema field, table column).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub data_type: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: Option<String>) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Visual hints carried over from the raw model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Visual {
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub style: IndexMap<String, String>,
}

/// Kind of an element.
///
/// Every variant has exactly one canonical tag (see [`ElementKind::tag`]).
/// Tags are matched case-insensitively, ignoring `-`, `_` and spaces, so
/// `businessObject`, `business_object` and `business-object` are the same kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    // Motivation
    Stakeholder,
    Driver,
    Assessment,
    Goal,
    Outcome,
    Principle,
    Requirement,
    Constraint,
    // Business
    Actor,
    Service,
    Function,
    Process,
    Event,
    BusinessObject,
    // Application
    Component,
    Interface,
    DataObject,
    // Technology
    Node,
    Device,
    SystemSoftware,
    Artifact,
    // Security
    Role,
    Permission,
    Policy,
    Zone,
    Objective,
    // API
    Operation,
    Endpoint,
    // Data
    Schema { fields: Vec<Field> },
    Table { columns: Vec<Field> },
    Database,
    // UX and navigation
    View,
    Route,
    Flow,
    // Observability
    Metric,
    /// A tag with no dedicated variant. Always non-empty.
    Other(String),
}

const KNOWN_TAGS: &[&str] = &[
    "stakeholder",
    "driver",
    "assessment",
    "goal",
    "outcome",
    "principle",
    "requirement",
    "constraint",
    "actor",
    "service",
    "function",
    "process",
    "event",
    "business-object",
    "component",
    "interface",
    "data-object",
    "node",
    "device",
    "system-software",
    "artifact",
    "role",
    "permission",
    "policy",
    "zone",
    "objective",
    "operation",
    "endpoint",
    "schema",
    "table",
    "database",
    "view",
    "route",
    "flow",
    "metric",
];

/// Lowercases and strips separators so tag spellings compare equal.
pub(crate) fn fold_tag(tag: &str) -> String {
    tag.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

impl ElementKind {
    /// Resolves a raw type tag. List-style kinds start with no items.
    pub fn from_tag(tag: &str) -> Self {
        match fold_tag(tag).as_str() {
            "stakeholder" => ElementKind::Stakeholder,
            "driver" => ElementKind::Driver,
            "assessment" => ElementKind::Assessment,
            "goal" => ElementKind::Goal,
            "outcome" => ElementKind::Outcome,
            "principle" => ElementKind::Principle,
            "requirement" => ElementKind::Requirement,
            "constraint" => ElementKind::Constraint,
            "actor" => ElementKind::Actor,
            "service" => ElementKind::Service,
            "function" => ElementKind::Function,
            "process" => ElementKind::Process,
            "event" => ElementKind::Event,
            "businessobject" => ElementKind::BusinessObject,
            "component" => ElementKind::Component,
            "interface" => ElementKind::Interface,
            "dataobject" => ElementKind::DataObject,
            "node" => ElementKind::Node,
            "device" => ElementKind::Device,
            "systemsoftware" => ElementKind::SystemSoftware,
            "artifact" => ElementKind::Artifact,
            "role" => ElementKind::Role,
            "permission" => ElementKind::Permission,
            "policy" => ElementKind::Policy,
            "zone" => ElementKind::Zone,
            "objective" => ElementKind::Objective,
            "operation" => ElementKind::Operation,
            "endpoint" => ElementKind::Endpoint,
            "schema" => ElementKind::Schema { fields: Vec::new() },
            "table" => ElementKind::Table {
                columns: Vec::new(),
            },
            "database" => ElementKind::Database,
            "view" => ElementKind::View,
            "route" => ElementKind::Route,
            "flow" => ElementKind::Flow,
            "metric" => ElementKind::Metric,
            _ => ElementKind::Other(tag.to_string()),
        }
    }

    /// Canonical tag of this kind. For [`ElementKind::Other`] the original tag.
    pub fn tag(&self) -> &str {
        match self {
            ElementKind::Stakeholder => KNOWN_TAGS[0],
            ElementKind::Driver => KNOWN_TAGS[1],
            ElementKind::Assessment => KNOWN_TAGS[2],
            ElementKind::Goal => KNOWN_TAGS[3],
            ElementKind::Outcome => KNOWN_TAGS[4],
            ElementKind::Principle => KNOWN_TAGS[5],
            ElementKind::Requirement => KNOWN_TAGS[6],
            ElementKind::Constraint => KNOWN_TAGS[7],
            ElementKind::Actor => KNOWN_TAGS[8],
            ElementKind::Service => KNOWN_TAGS[9],
            ElementKind::Function => KNOWN_TAGS[10],
            ElementKind::Process => KNOWN_TAGS[11],
            ElementKind::Event => KNOWN_TAGS[12],
            ElementKind::BusinessObject => KNOWN_TAGS[13],
            ElementKind::Component => KNOWN_TAGS[14],
            ElementKind::Interface => KNOWN_TAGS[15],
            ElementKind::DataObject => KNOWN_TAGS[16],
            ElementKind::Node => KNOWN_TAGS[17],
            ElementKind::Device => KNOWN_TAGS[18],
            ElementKind::SystemSoftware => KNOWN_TAGS[19],
            ElementKind::Artifact => KNOWN_TAGS[20],
            ElementKind::Role => KNOWN_TAGS[21],
            ElementKind::Permission => KNOWN_TAGS[22],
            ElementKind::Policy => KNOWN_TAGS[23],
            ElementKind::Zone => KNOWN_TAGS[24],
            ElementKind::Objective => KNOWN_TAGS[25],
            ElementKind::Operation => KNOWN_TAGS[26],
            ElementKind::Endpoint => KNOWN_TAGS[27],
            ElementKind::Schema { .. } => KNOWN_TAGS[28],
            ElementKind::Table { .. } => KNOWN_TAGS[29],
            ElementKind::Database => KNOWN_TAGS[30],
            ElementKind::View => KNOWN_TAGS[31],
            ElementKind::Route => KNOWN_TAGS[32],
            ElementKind::Flow => KNOWN_TAGS[33],
            ElementKind::Metric => KNOWN_TAGS[34],
            ElementKind::Other(tag) => tag,
        }
    }

    /// Items of a list-style kind, `None` for every other kind.
    pub fn list_items(&self) -> Option<&[Field]> {
        match self {
            ElementKind::Schema { fields } => Some(fields),
            ElementKind::Table { columns } => Some(columns),
            _ => None,
        }
    }

    /// Replaces the items of a list-style kind. No-op for other kinds.
    pub fn set_list_items(&mut self, items: Vec<Field>) {
        match self {
            ElementKind::Schema { fields } => *fields = items,
            ElementKind::Table { columns } => *columns = items,
            _ => {}
        }
    }

    /// True for kinds without a dedicated variant.
    pub fn is_other(&self) -> bool {
        matches!(self, ElementKind::Other(_))
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A typed element of one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: String,
    pub kind: ElementKind,
    pub name: String,
    pub layer_id: String,
    pub description: Option<String>,
    pub properties: Properties,
    pub visual: Visual,
}

impl Element {
    /// Creates an element with empty properties and visuals; the name defaults to the id.
    pub fn new(id: impl Into<String>, kind: ElementKind, layer_id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            kind,
            layer_id: layer_id.into(),
            description: None,
            properties: Properties::new(),
            visual: Visual::default(),
        }
    }

    /// Sets the display name (builder style).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Type tag of the element
    pub fn type_tag(&self) -> &str {
        self.kind.tag()
    }
}
