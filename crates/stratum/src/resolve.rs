//! Bundling of relationships that cross layer boundaries.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{info, warn};
use serde::Serialize;

use stratum_core::{
    diagnostic::{Diagnostic, ErrorCode},
    model::{MetaModel, Relationship},
};

use crate::graph::Graph;

/// One or more relationships between the same element pair, with the same
/// type, whose endpoints lie in different layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossLayerLink {
    /// Id of the first bundled relationship.
    pub id: String,
    pub source_id: String,
    pub source_layer: String,
    pub target_id: String,
    pub target_layer: String,
    pub relationship_type: String,
    pub bundled_count: usize,
    pub relationship_ids: Vec<String>,
}

/// Produces [`CrossLayerLink`]s for a graph.
#[derive(Debug, Default)]
pub struct CrossLayerReferenceResolver {
    warnings: Vec<Diagnostic>,
    /// Relationships whose missing endpoint was reported upstream.
    reported: HashSet<String>,
}

impl CrossLayerReferenceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relationship ids already reported as dangling, typically
    /// [`GraphBuilder::excluded_relationships`](crate::graph::GraphBuilder::excluded_relationships).
    /// They are skipped without a second warning.
    pub fn with_reported<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reported.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Returns `graph` with `cross_layer_links` rebuilt from `model`.
    ///
    /// Every layer relationship and every model reference is considered.
    /// Endpoint layers come from the graph's nodes; a relationship whose
    /// source or target is not a node is dropped with a warning.
    pub fn resolve_all_links(&mut self, mut graph: Graph, model: &MetaModel) -> Graph {
        graph.cross_layer_links = self.resolve_links(&graph, model.all_relationships());
        info!(links = graph.cross_layer_links.len(); "Cross-layer links resolved");
        graph
    }

    /// Bundles the cross-layer subset of `relationships`, in first-seen order.
    ///
    /// A relationship id is bundled once; repeats of an id already in a link
    /// do not raise `bundled_count`.
    pub fn resolve_links<'a>(
        &mut self,
        graph: &Graph,
        relationships: impl IntoIterator<Item = &'a Relationship>,
    ) -> Vec<CrossLayerLink> {
        let mut links: IndexMap<(&str, &str, &str), CrossLayerLink> = IndexMap::new();
        let mut bundled: HashSet<&str> = HashSet::new();

        for relationship in relationships {
            let source = graph.node(&relationship.source_id);
            let target = graph.node(&relationship.target_id);
            let (Some(source), Some(target)) = (source, target) else {
                if self.reported.contains(&relationship.id) {
                    continue;
                }
                let missing = if source.is_none() {
                    &relationship.source_id
                } else {
                    &relationship.target_id
                };
                self.warn(
                    Diagnostic::warning(format!(
                        "cross-layer resolution of `{}` failed: element `{missing}` not found",
                        relationship.id
                    ))
                    .with_code(ErrorCode::W310)
                    .with_subject(relationship.id.clone()),
                );
                continue;
            };
            if source.layer_id() == target.layer_id() || !bundled.insert(relationship.id.as_str()) {
                continue;
            }

            let key = (
                relationship.source_id.as_str(),
                relationship.target_id.as_str(),
                relationship.type_tag(),
            );
            links
                .entry(key)
                .and_modify(|link| {
                    link.bundled_count += 1;
                    link.relationship_ids.push(relationship.id.clone());
                })
                .or_insert_with(|| CrossLayerLink {
                    id: relationship.id.clone(),
                    source_id: relationship.source_id.clone(),
                    source_layer: source.layer_id().to_string(),
                    target_id: relationship.target_id.clone(),
                    target_layer: target.layer_id().to_string(),
                    relationship_type: relationship.type_tag().to_string(),
                    bundled_count: 1,
                    relationship_ids: vec![relationship.id.clone()],
                });
        }

        links.into_values().collect()
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.warnings)
    }

    fn warn(&mut self, diagnostic: Diagnostic) {
        warn!(code:? = diagnostic.code(); "{}", diagnostic.message());
        self.warnings.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use stratum_core::model::{Element, ElementKind, Layer, RelationshipKind};

    use super::*;
    use crate::graph::GraphBuilder;

    fn model() -> MetaModel {
        let mut business = Layer::new("Business");
        business
            .elements
            .push(Element::new("svc", ElementKind::Service, "Business"));
        business
            .elements
            .push(Element::new("proc", ElementKind::Process, "Business"));
        business.relationships.push(Relationship::new(
            "intra",
            RelationshipKind::Serving,
            "svc",
            "proc",
        ));

        let mut application = Layer::new("Application");
        application
            .elements
            .push(Element::new("app", ElementKind::Component, "Application"));
        application.relationships.push(Relationship::new(
            "real-1",
            RelationshipKind::Realization,
            "app",
            "svc",
        ));

        let mut model = MetaModel::new().with_layer(business).with_layer(application);
        model.references = vec![
            Relationship::new("real-2", RelationshipKind::Realization, "app", "svc"),
            Relationship::new("serve-1", RelationshipKind::Serving, "app", "proc"),
            Relationship::new("broken", RelationshipKind::Serving, "app", "ghost"),
        ];
        model
    }

    #[test]
    fn test_bundles_identical_triples() {
        let model = model();
        let graph = GraphBuilder::default().build_from_model(&model);

        let mut resolver = CrossLayerReferenceResolver::new();
        let graph = resolver.resolve_all_links(graph, &model);

        assert_eq!(graph.cross_layer_links.len(), 2);
        let first = &graph.cross_layer_links[0];
        assert_eq!(first.id, "real-1");
        assert_eq!(first.bundled_count, 2);
        assert_eq!(first.relationship_ids, vec!["real-1", "real-2"]);
        assert_eq!(first.source_layer, "Application");
        assert_eq!(first.target_layer, "Business");
        assert_eq!(graph.cross_layer_links[1].id, "serve-1");
    }

    #[test]
    fn test_unresolvable_reference_is_dropped_with_warning() {
        let model = model();
        let graph = GraphBuilder::default().build_from_model(&model);

        let mut resolver = CrossLayerReferenceResolver::new();
        let graph = resolver.resolve_all_links(graph, &model);

        assert!(graph.cross_layer_links.iter().all(|l| l.id != "broken"));
        assert_eq!(resolver.warnings().len(), 1);
        assert_eq!(resolver.warnings()[0].code(), Some(ErrorCode::W310));
    }

    #[test]
    fn test_reported_relationships_not_warned_twice() {
        let model = model();
        let mut builder = GraphBuilder::default();
        let graph = builder.build_from_model(&model);

        let mut resolver =
            CrossLayerReferenceResolver::new().with_reported(builder.excluded_relationships());
        let graph = resolver.resolve_all_links(graph, &model);

        assert_eq!(graph.cross_layer_links.len(), 2);
        assert!(resolver.warnings().is_empty());
    }

    #[test]
    fn test_repeated_relationship_id_bundled_once() {
        let model = model();
        let graph = GraphBuilder::default().build_from_model(&model);
        let repeated = Relationship::new("real-1", RelationshipKind::Realization, "app", "svc");

        let links = CrossLayerReferenceResolver::new()
            .resolve_links(&graph, model.all_relationships().chain([&repeated]));

        assert_eq!(links[0].bundled_count, 2);
        assert_eq!(links[0].relationship_ids, vec!["real-1", "real-2"]);
    }

    #[test]
    fn test_same_layer_relationships_ignored() {
        let model = model();
        let graph = GraphBuilder::default().build_from_model(&model);

        let links =
            CrossLayerReferenceResolver::new().resolve_links(&graph, model.layer_relationships());

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].id, "real-1");
    }
}
