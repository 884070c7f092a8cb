//! Assembles elements and relationships into a [`Graph`].

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, info, warn};

use stratum_core::{
    diagnostic::{Diagnostic, ErrorCode, ValidationReport},
    model::{Element, MetaModel, Relationship, RelationshipKind},
};

use super::{
    Graph, GraphEdge, GraphNode, Metrics, build_indices, compute_hierarchy, detect_cycles,
    detect_orphans,
};
use crate::config::GraphConfig;

/// Builds graphs and collects the warnings raised while doing so.
///
/// Building never fails. Duplicate nodes, duplicate edges and edges with a
/// missing endpoint are dropped and reported through [`GraphBuilder::warnings`].
#[derive(Debug)]
pub struct GraphBuilder {
    containment: Vec<RelationshipKind>,
    warnings: Vec<Diagnostic>,
    /// Ids of relationships the last build dropped for a missing endpoint.
    excluded: Vec<String>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(&GraphConfig::default())
    }
}

impl GraphBuilder {
    pub fn new(config: &GraphConfig) -> Self {
        Self {
            containment: config.containment_kinds(),
            warnings: Vec::new(),
            excluded: Vec::new(),
        }
    }

    /// Builds a graph from every element of `model` and from its layer
    /// relationships followed by its references.
    pub fn build_from_model(&mut self, model: &MetaModel) -> Graph {
        let elements: Vec<Element> = model.elements().cloned().collect();
        let relationships: Vec<Relationship> = model.all_relationships().cloned().collect();
        self.build_graph(&elements, &relationships)
    }

    /// Builds a graph with hierarchy, metrics and indices.
    ///
    /// The first element with a given id wins. Relationships are kept only
    /// when both endpoints exist and their id has not been seen yet.
    pub fn build_graph(&mut self, elements: &[Element], relationships: &[Relationship]) -> Graph {
        self.excluded.clear();
        let mut nodes: IndexMap<String, GraphNode> = IndexMap::with_capacity(elements.len());
        for element in elements {
            if nodes.contains_key(&element.id) {
                self.warn(
                    Diagnostic::warning(format!(
                        "element `{}` in layer `{}` duplicates an existing node and was dropped",
                        element.id, element.layer_id
                    ))
                    .with_code(ErrorCode::W300)
                    .with_subject(element.id.clone()),
                );
                continue;
            }
            nodes.insert(element.id.clone(), GraphNode::new(element.clone()));
        }

        let mut edges: IndexMap<String, GraphEdge> = IndexMap::with_capacity(relationships.len());
        for relationship in relationships {
            let source = nodes.get(&relationship.source_id);
            let target = nodes.get(&relationship.target_id);
            let (Some(source), Some(target)) = (source, target) else {
                let missing = if source.is_none() {
                    &relationship.source_id
                } else {
                    &relationship.target_id
                };
                self.warn(
                    Diagnostic::warning(format!(
                        "relationship `{}` references missing element `{missing}` and was excluded",
                        relationship.id
                    ))
                    .with_code(ErrorCode::W301)
                    .with_subject(relationship.id.clone()),
                );
                self.excluded.push(relationship.id.clone());
                continue;
            };
            if edges.contains_key(&relationship.id) {
                self.warn(
                    Diagnostic::warning(format!(
                        "relationship id `{}` is already used by another edge; the later one was dropped",
                        relationship.id
                    ))
                    .with_code(ErrorCode::W302)
                    .with_subject(relationship.id.clone()),
                );
                continue;
            }

            let edge = GraphEdge {
                relationship: relationship.clone(),
                source_layer: source.layer_id().to_string(),
                target_layer: target.layer_id().to_string(),
            };
            edges.insert(relationship.id.clone(), edge);
        }

        let hierarchy = compute_hierarchy(&mut nodes, &edges, &self.containment);
        let indices = build_indices(&nodes, &edges);

        let mut graph = Graph {
            metrics: Metrics {
                node_count: nodes.len(),
                edge_count: edges.len(),
                ..Metrics::default()
            },
            nodes,
            edges,
            hierarchy,
            indices,
            cross_layer_links: Vec::new(),
        };
        graph.metrics.circular_dependencies = detect_cycles(&graph);
        graph.metrics.orphaned_nodes = detect_orphans(&graph);

        info!(
            nodes = graph.metrics.node_count,
            edges = graph.metrics.edge_count,
            max_depth = graph.hierarchy.max_depth,
            cycles = graph.metrics.circular_dependencies.len(),
            orphans = graph.metrics.orphaned_nodes.len();
            "Graph built"
        );

        graph
    }

    /// Warnings accumulated by every build since construction or the last
    /// [`take_warnings`](Self::take_warnings).
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Ids of the relationships the last build excluded because an endpoint
    /// was missing. Each of them has a W301 warning.
    pub fn excluded_relationships(&self) -> &[String] {
        &self.excluded
    }

    pub fn take_warnings(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.warnings)
    }

    fn warn(&mut self, diagnostic: Diagnostic) {
        warn!(code:? = diagnostic.code(); "{}", diagnostic.message());
        self.warnings.push(diagnostic);
    }
}

/// Checks relationships against elements without building a graph.
///
/// Reports duplicate element ids (E200), dangling sources (E201) and targets
/// (E202), and duplicate relationship ids (E203). The report is informational.
pub fn validate_relationships(elements: &[Element], relationships: &[Relationship]) -> ValidationReport {
    let mut report = ValidationReport::new();

    let mut element_ids = HashSet::with_capacity(elements.len());
    for element in elements {
        if !element_ids.insert(element.id.as_str()) {
            report.push(
                Diagnostic::error(format!("duplicate element id `{}`", element.id))
                    .with_code(ErrorCode::E200)
                    .with_subject(element.id.clone()),
            );
        }
    }

    let mut relationship_ids = HashSet::with_capacity(relationships.len());
    for relationship in relationships {
        if !relationship_ids.insert(relationship.id.as_str()) {
            report.push(
                Diagnostic::error(format!("duplicate relationship id `{}`", relationship.id))
                    .with_code(ErrorCode::E203)
                    .with_subject(relationship.id.clone()),
            );
        }
        if !element_ids.contains(relationship.source_id.as_str()) {
            report.push(
                Diagnostic::error(format!(
                    "relationship `{}` has unknown source `{}`",
                    relationship.id, relationship.source_id
                ))
                .with_code(ErrorCode::E201)
                .with_subject(relationship.id.clone()),
            );
        }
        if !element_ids.contains(relationship.target_id.as_str()) {
            report.push(
                Diagnostic::error(format!(
                    "relationship `{}` has unknown target `{}`",
                    relationship.id, relationship.target_id
                ))
                .with_code(ErrorCode::E202)
                .with_subject(relationship.id.clone()),
            );
        }
    }

    debug!(
        errors = report.errors().len(),
        warnings = report.warnings().len();
        "Relationships validated"
    );

    report
}

#[cfg(test)]
mod tests {
    use stratum_core::model::ElementKind;

    use super::*;

    fn goal(id: &str) -> Element {
        Element::new(id, ElementKind::Goal, "Motivation")
    }

    #[test]
    fn test_two_elements_one_relationship() {
        let elements = vec![
            goal("g1"),
            Element::new("r1", ElementKind::Requirement, "Motivation"),
        ];
        let relationships = vec![Relationship::new(
            "rel1",
            RelationshipKind::Requires,
            "g1",
            "r1",
        )];

        let mut builder = GraphBuilder::default();
        let graph = builder.build_graph(&elements, &relationships);

        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.metrics.node_count, 2);
        assert_eq!(graph.metrics.edge_count, 1);
        assert!(graph.metrics.orphaned_nodes.is_empty());
        assert!(builder.warnings().is_empty());
    }

    #[test]
    fn test_missing_target_is_excluded_with_warning() {
        let elements = vec![goal("g1")];
        let relationships = vec![Relationship::new(
            "rel1",
            RelationshipKind::Requires,
            "g1",
            "missing",
        )];

        let mut builder = GraphBuilder::default();
        let graph = builder.build_graph(&elements, &relationships);

        assert!(graph.edges.is_empty());
        assert_eq!(builder.warnings().len(), 1);
        assert_eq!(builder.warnings()[0].code(), Some(ErrorCode::W301));
        assert!(builder.warnings()[0].message().contains("missing"));
        assert_eq!(builder.excluded_relationships(), ["rel1".to_string()]);

        builder.build_graph(&elements, &[]);
        assert!(builder.excluded_relationships().is_empty());
    }

    #[test]
    fn test_duplicate_node_first_wins() {
        let mut second = goal("g1");
        second.name = "Second".to_string();
        let elements = vec![goal("g1").with_name("First"), second];

        let mut builder = GraphBuilder::default();
        let graph = builder.build_graph(&elements, &[]);

        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes["g1"].element.name, "First");
        assert_eq!(builder.warnings()[0].code(), Some(ErrorCode::W300));
    }

    #[test]
    fn test_duplicate_edge_dropped() {
        let elements = vec![goal("a"), goal("b")];
        let relationships = vec![
            Relationship::new("r", RelationshipKind::Influence, "a", "b"),
            Relationship::new("r", RelationshipKind::Influence, "b", "a"),
        ];

        let mut builder = GraphBuilder::default();
        let graph = builder.build_graph(&elements, &relationships);

        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges["r"].source_id(), "a");
        assert_eq!(builder.warnings()[0].code(), Some(ErrorCode::W302));
    }

    #[test]
    fn test_edge_layers_resolved() {
        let elements = vec![
            goal("g1"),
            Element::new("s1", ElementKind::Service, "Business"),
        ];
        let relationships = vec![Relationship::new(
            "r",
            RelationshipKind::Realization,
            "s1",
            "g1",
        )];

        let graph = GraphBuilder::default().build_graph(&elements, &relationships);

        let edge = &graph.edges["r"];
        assert_eq!(edge.source_layer, "Business");
        assert_eq!(edge.target_layer, "Motivation");
        assert!(edge.is_cross_layer());
    }

    #[test]
    fn test_custom_containment() {
        let elements = vec![
            Element::new("node", ElementKind::Node, "Technology"),
            Element::new("app", ElementKind::Component, "Application"),
        ];
        let relationships = vec![Relationship::new(
            "d",
            RelationshipKind::DeployedTo,
            "node",
            "app",
        )];

        let config = GraphConfig::new(vec!["deployed-to".to_string()]);
        let graph = GraphBuilder::new(&config).build_graph(&elements, &relationships);

        assert_eq!(graph.hierarchy.max_depth, 1);
        assert_eq!(graph.nodes["app"].parent_id.as_deref(), Some("node"));
    }

    #[test]
    fn test_empty_input() {
        let graph = GraphBuilder::default().build_graph(&[], &[]);
        assert!(graph.is_empty());
        assert_eq!(graph.metrics, Metrics::default());
        assert_eq!(graph.hierarchy.max_depth, 0);
    }

    #[test]
    fn test_validate_relationships() {
        let elements = vec![goal("a"), goal("a"), goal("b")];
        let relationships = vec![
            Relationship::new("r1", RelationshipKind::Influence, "a", "b"),
            Relationship::new("r1", RelationshipKind::Influence, "x", "y"),
        ];

        let report = validate_relationships(&elements, &relationships);

        assert!(!report.valid());
        let codes: Vec<_> = report.errors().iter().filter_map(|d| d.code()).collect();
        assert_eq!(
            codes,
            vec![
                ErrorCode::E200,
                ErrorCode::E203,
                ErrorCode::E201,
                ErrorCode::E202
            ]
        );
    }
}
