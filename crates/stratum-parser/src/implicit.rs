//! Relationships declared inside element properties.
//!
//! Model authors often write relationships as element properties instead of
//! separate records:
//!
//! ```json
//! {"id": "app-1", "type": "component",
//!  "properties": {"realizes": "business.service.billing",
//!                 "relationships": {"uses": ["db-1", "cache-1"]}}}
//! ```
//!
//! Both the nested `relationships` object and a fixed set of well-known keys
//! are turned into [`Relationship`]s whose id is `"{source}-{type}-{target}"`.

use serde_json::{Map, Value};

use stratum_core::model::{Relationship, RelationshipKind};

/// Property keys that declare a relationship when present.
pub const IMPLICIT_RELATIONSHIP_KEYS: &[&str] = &[
    "deployedTo",
    "realizes",
    "uses",
    "implements",
    "accesses",
    "serves",
    "triggers",
    "flowsTo",
    "composedOf",
    "aggregates",
    "specializes",
    "associatedWith",
];

/// Strips a dotted `layer.type.id` reference down to the element id.
pub fn target_element_id(reference: &str) -> &str {
    reference.rsplit('.').next().unwrap_or(reference)
}

/// Synthesised id of a relationship that had none.
pub fn synthesize_relationship_id(source: &str, kind: &str, target: &str) -> String {
    format!("{source}-{kind}-{target}")
}

/// Extracts the relationships declared in `properties` of element `source_id`.
///
/// Entries of the nested `relationships` object take precedence over the
/// well-known keys with the same name. Targets that are not strings are
/// ignored.
pub fn implicit_relationships(source_id: &str, properties: &Map<String, Value>) -> Vec<Relationship> {
    let mut declared: Vec<(&str, &Value)> = Vec::new();

    if let Some(Value::Object(nested)) = properties.get("relationships") {
        declared.extend(nested.iter().map(|(key, value)| (key.as_str(), value)));
    }
    for key in IMPLICIT_RELATIONSHIP_KEYS {
        if declared.iter().any(|(declared_key, _)| declared_key == key) {
            continue;
        }
        if let Some(value) = properties.get(*key) {
            declared.push((*key, value));
        }
    }

    let mut relationships = Vec::new();
    for (rel_type, targets) in declared {
        let targets: Vec<&str> = match targets {
            Value::String(target) => vec![target.as_str()],
            Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
            _ => continue,
        };
        for target in targets {
            let target_id = target_element_id(target);
            if target_id.is_empty() {
                continue;
            }
            relationships.push(Relationship::new(
                synthesize_relationship_id(source_id, rel_type, target_id),
                RelationshipKind::from_tag(rel_type),
                source_id,
                target_id,
            ));
        }
    }

    relationships
}
