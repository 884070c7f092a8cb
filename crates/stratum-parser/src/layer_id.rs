//! Layer id normalisation.
//!
//! Loaders spell layer ids in lower snake case (`data_model`) while the model
//! and its consumers key layers by PascalCase (`DataModel`). Known ids map
//! through a fixed table; others are converted word by word.

const KNOWN_LAYERS: &[(&str, &str)] = &[
    ("motivation", "Motivation"),
    ("business", "Business"),
    ("security", "Security"),
    ("application", "Application"),
    ("technology", "Technology"),
    ("api", "Api"),
    ("data_model", "DataModel"),
    ("datastore", "Datastore"),
    ("ux", "Ux"),
    ("navigation", "Navigation"),
    ("apm", "ApmObservability"),
];

/// Normalises a raw layer id to its PascalCase form.
///
/// Ids that already start with an uppercase letter are kept as they are.
pub fn normalize_layer_id(layer_id: &str) -> String {
    if let Some((_, normalized)) = KNOWN_LAYERS.iter().find(|(raw, _)| *raw == layer_id) {
        return (*normalized).to_string();
    }
    if layer_id.chars().next().is_some_and(char::is_uppercase) {
        return layer_id.to_string();
    }

    layer_id
        .split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_layers() {
        assert_eq!(normalize_layer_id("motivation"), "Motivation");
        assert_eq!(normalize_layer_id("data_model"), "DataModel");
        assert_eq!(normalize_layer_id("apm"), "ApmObservability");
    }

    #[test]
    fn test_already_normalized() {
        assert_eq!(normalize_layer_id("DataModel"), "DataModel");
        assert_eq!(normalize_layer_id("Business"), "Business");
    }

    #[test]
    fn test_unknown_layers() {
        assert_eq!(normalize_layer_id("integration_bus"), "IntegrationBus");
        assert_eq!(normalize_layer_id("edge-cache"), "EdgeCache");
        assert_eq!(normalize_layer_id(""), "");
    }
}
