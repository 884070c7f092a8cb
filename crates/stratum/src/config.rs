use serde::Deserialize;

use stratum_core::model::RelationshipKind;
use stratum_parser::ParserConfig;

use crate::layout::LayoutConfig;

/// Application configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Graph construction section
    #[serde(default)]
    pub graph: GraphConfig,

    /// Parser section
    #[serde(default)]
    pub parser: ParserConfig,
}

/// Graph construction section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Relationship type tags read as parent → child containment.
    containment: Vec<String>,
}

impl GraphConfig {
    pub fn new(containment: Vec<String>) -> Self {
        Self { containment }
    }

    /// Configured containment type tags, as written.
    pub fn containment(&self) -> &[String] {
        &self.containment
    }

    /// Containment kinds, resolved from the configured tags.
    pub fn containment_kinds(&self) -> Vec<RelationshipKind> {
        self.containment
            .iter()
            .map(|tag| RelationshipKind::from_tag(tag))
            .collect()
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            containment: RelationshipKind::default_containment()
                .iter()
                .map(|kind| kind.tag().to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_config_default_containment() {
        let config = GraphConfig::default();
        assert_eq!(
            config.containment_kinds(),
            vec![RelationshipKind::Composition, RelationshipKind::Aggregation]
        );
    }

    #[test]
    fn test_graph_config_custom_tags() {
        let config = GraphConfig::new(vec!["contains".to_string(), "deployed-to".to_string()]);
        assert_eq!(
            config.containment_kinds(),
            vec![RelationshipKind::Composition, RelationshipKind::DeployedTo]
        );
    }
}
