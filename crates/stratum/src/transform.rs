//! Turns a [`Graph`] into a render graph ready for layout.
//!
//! The [`NodeTransformer`] assigns every node its render dimensions and merges
//! the edges coming from layer relationships and cross-layer links, keeping at
//! most one edge per id.

mod dimensions;
mod edges;

pub use dimensions::{
    DEFAULT_NODE_SIZE, LIST_HEADER_HEIGHT, LIST_ITEM_HEIGHT, LIST_NODE_WIDTH, dimensions_for,
};
pub use edges::{EdgeCollision, EdgeSource, RenderEdge, add_edge_if_unique};

use std::collections::{HashMap, HashSet};

use log::{debug, warn};
use serde::Serialize;

use stratum_core::{
    diagnostic::{Diagnostic, ErrorCode},
    geometry::{Point, Size},
};

use crate::{
    graph::{Graph, GraphNode},
    layout::{LayoutEdge, LayoutGraph, LayoutNode, LayoutResult},
};

/// Node of the render graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub type_tag: String,
    pub layer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub hierarchy_level: usize,
    pub size: Size,
    /// Center of the node. Filled in once a layout has been applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
}

impl RenderNode {
    fn from_graph_node(node: &GraphNode) -> Self {
        Self {
            id: node.id().to_string(),
            name: node.element.name.clone(),
            type_tag: node.type_tag().to_string(),
            layer_id: node.layer_id().to_string(),
            parent_id: node.parent_id.clone(),
            hierarchy_level: node.hierarchy_level,
            size: node.dimensions,
            position: None,
        }
    }
}

/// Nodes and deduplicated edges handed to the rendering layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderGraph {
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
}

impl RenderGraph {
    /// Abstract node and edge set for a layout engine.
    pub fn to_layout_graph(&self) -> LayoutGraph {
        LayoutGraph {
            nodes: self
                .nodes
                .iter()
                .map(|node| LayoutNode {
                    id: node.id.clone(),
                    size: node.size,
                    parent_id: node.parent_id.clone(),
                })
                .collect(),
            edges: self
                .edges
                .iter()
                .map(|edge| LayoutEdge::new(&edge.id, &edge.source_id, &edge.target_id))
                .collect(),
        }
    }

    /// Copies positions and routing points from `layout` onto the render graph.
    pub fn apply_layout(&mut self, layout: &LayoutResult) {
        let positions: HashMap<&str, Point> = layout
            .nodes
            .iter()
            .map(|node| (node.id.as_str(), node.position))
            .collect();
        for node in &mut self.nodes {
            node.position = positions.get(node.id.as_str()).copied();
        }

        let routes: HashMap<&str, &Option<Vec<Point>>> = layout
            .edges
            .iter()
            .map(|edge| (edge.id.as_str(), &edge.routing_points))
            .collect();
        for edge in &mut self.edges {
            edge.routing_points = routes.get(edge.id.as_str()).and_then(|points| (*points).clone());
        }
    }
}

/// Dimensions nodes and merges edges into a [`RenderGraph`].
#[derive(Debug, Default)]
pub struct NodeTransformer {
    warned_types: HashSet<String>,
    collisions: Vec<EdgeCollision>,
    warnings: Vec<Diagnostic>,
}

impl NodeTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `dimensions` on every node.
    ///
    /// An explicit `visual.size` wins over the kind table. Kinds without an
    /// entry get [`DEFAULT_NODE_SIZE`] and one warning per type tag per call.
    pub fn precalculate_dimensions<'a>(&mut self, nodes: impl IntoIterator<Item = &'a mut GraphNode>) {
        self.warned_types.clear();
        for node in nodes {
            node.dimensions = match (node.element.visual.size, dimensions_for(node.kind())) {
                (Some(size), _) if size.width() > 0.0 && size.height() > 0.0 => size,
                (_, Some(size)) => size,
                (_, None) => {
                    self.warn_unknown_type(node.type_tag());
                    DEFAULT_NODE_SIZE
                }
            };
        }
    }

    /// Builds the render graph for `graph`, dimensioning its nodes first.
    ///
    /// Edges are merged in two passes: edges within one layer, then
    /// cross-layer links. Edges between layers are represented by their link
    /// only.
    pub fn transform(&mut self, graph: &mut Graph) -> RenderGraph {
        self.precalculate_dimensions(graph.nodes.values_mut());

        let nodes = graph.nodes.values().map(RenderNode::from_graph_node).collect();

        let mut edges = Vec::with_capacity(graph.edges.len() + graph.cross_layer_links.len());
        let mut seen = HashMap::new();

        for edge in graph.edges.values().filter(|edge| !edge.is_cross_layer()) {
            let render_edge =
                RenderEdge::new(edge.id(), edge.source_id(), edge.target_id(), edge.type_tag());
            self.merge(render_edge, &mut edges, &mut seen, EdgeSource::LayerRelationship);
        }
        for link in &graph.cross_layer_links {
            let mut render_edge = RenderEdge::new(
                &link.id,
                &link.source_id,
                &link.target_id,
                &link.relationship_type,
            );
            render_edge.bundled_count = link.bundled_count;
            self.merge(render_edge, &mut edges, &mut seen, EdgeSource::CrossLayerLink);
        }

        debug!(
            nodes = graph.nodes.len(),
            edges = edges.len(),
            collisions = self.collisions.len();
            "Render graph built"
        );

        RenderGraph { nodes, edges }
    }

    /// Edge-id collisions seen so far.
    pub fn collisions(&self) -> &[EdgeCollision] {
        &self.collisions
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.warnings)
    }

    fn merge(
        &mut self,
        edge: RenderEdge,
        edges: &mut Vec<RenderEdge>,
        seen: &mut HashMap<String, EdgeSource>,
        source: EdgeSource,
    ) {
        if let Some(collision) = add_edge_if_unique(edge, edges, seen, source) {
            self.warnings.push(collision.to_diagnostic());
            self.collisions.push(collision);
        }
    }

    fn warn_unknown_type(&mut self, type_tag: &str) {
        if !self.warned_types.insert(type_tag.to_string()) {
            return;
        }
        warn!(type_tag = type_tag; "Unknown node type, using default dimensions");
        self.warnings.push(
            Diagnostic::warning(format!(
                "unknown node type `{type_tag}`; default dimensions {}x{} used",
                DEFAULT_NODE_SIZE.width(),
                DEFAULT_NODE_SIZE.height()
            ))
            .with_code(ErrorCode::W400)
            .with_subject(type_tag.to_string()),
        );
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use stratum_core::model::{Element, ElementKind, Layer, MetaModel, Relationship, RelationshipKind};

    use super::*;
    use crate::{graph::GraphBuilder, resolve::CrossLayerReferenceResolver};

    fn graph_with(elements: Vec<Element>, relationships: Vec<Relationship>) -> Graph {
        GraphBuilder::default().build_graph(&elements, &relationships)
    }

    #[test]
    fn test_unknown_types_warn_once_per_type() {
        let mut graph = graph_with(
            vec![
                Element::new("w1", ElementKind::Other("widget".to_string()), "Ux"),
                Element::new("w2", ElementKind::Other("widget".to_string()), "Ux"),
                Element::new("g1", ElementKind::Other("gadget".to_string()), "Ux"),
                Element::new("v1", ElementKind::View, "Ux"),
            ],
            vec![],
        );

        let mut transformer = NodeTransformer::new();
        transformer.precalculate_dimensions(graph.nodes.values_mut());

        assert_eq!(transformer.warnings().len(), 2);
        assert!(transformer.warnings()[0].message().contains("widget"));
        assert_eq!(graph.nodes["w2"].dimensions, DEFAULT_NODE_SIZE);
        assert_approx_eq!(f32, graph.nodes["v1"].dimensions.width(), 200.0);
    }

    #[test]
    fn test_reused_transformer_warns_each_run() {
        let mut graph = graph_with(
            vec![Element::new("w1", ElementKind::Other("widget".to_string()), "Ux")],
            vec![],
        );

        let mut transformer = NodeTransformer::new();
        transformer.transform(&mut graph);
        let first = transformer.take_warnings();
        transformer.transform(&mut graph);
        let second = transformer.take_warnings();

        assert_eq!(first.len(), 1);
        assert_eq!(second, first);
    }

    #[test]
    fn test_visual_size_wins() {
        let mut element = Element::new("c", ElementKind::Component, "Application");
        element.visual.size = Some(Size::new(300.0, 50.0));
        let mut graph = graph_with(vec![element], vec![]);

        NodeTransformer::new().precalculate_dimensions(graph.nodes.values_mut());

        assert_eq!(graph.nodes["c"].dimensions, Size::new(300.0, 50.0));
    }

    #[test]
    fn test_transform_merges_direct_edges_and_links() {
        let mut business = Layer::new("Business");
        business.elements = vec![
            Element::new("svc", ElementKind::Service, "Business"),
            Element::new("proc", ElementKind::Process, "Business"),
        ];
        business.relationships = vec![Relationship::new(
            "dup",
            RelationshipKind::Serving,
            "svc",
            "proc",
        )];
        let mut application = Layer::new("Application");
        application.elements = vec![Element::new("app", ElementKind::Component, "Application")];
        let mut model = MetaModel::new().with_layer(business).with_layer(application);
        model.references = vec![
            Relationship::new("dup", RelationshipKind::Realization, "app", "svc"),
            Relationship::new("real", RelationshipKind::Realization, "app", "proc"),
        ];

        let graph = GraphBuilder::default().build_from_model(&model);
        let mut graph = CrossLayerReferenceResolver::new().resolve_all_links(graph, &model);

        let mut transformer = NodeTransformer::new();
        let render = transformer.transform(&mut graph);

        let ids: Vec<_> = render.edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["dup", "real"]);
        assert_eq!(render.edges[0].source, EdgeSource::LayerRelationship);
        assert_eq!(render.edges[1].source, EdgeSource::CrossLayerLink);
        assert_eq!(transformer.collisions().len(), 1);
        assert_eq!(transformer.warnings()[0].code(), Some(ErrorCode::W401));
        assert_eq!(render.nodes.len(), 3);
        assert!(render.nodes.iter().all(|n| n.size.width() > 0.0));
    }

    #[test]
    fn test_to_layout_graph_and_apply_layout() {
        let mut graph = graph_with(
            vec![
                Element::new("a", ElementKind::Service, "Business"),
                Element::new("b", ElementKind::Service, "Business"),
            ],
            vec![Relationship::new("r", RelationshipKind::Serving, "a", "b")],
        );
        let mut render = NodeTransformer::new().transform(&mut graph);

        let layout_graph = render.to_layout_graph();
        assert_eq!(layout_graph.nodes.len(), 2);
        assert_eq!(layout_graph.edges[0].source_id, "a");

        let layout = LayoutResult {
            nodes: vec![
                crate::layout::NodePosition::new("a", Point::new(1.0, 2.0)),
                crate::layout::NodePosition::new("b", Point::new(3.0, 4.0)),
            ],
            edges: vec![crate::layout::EdgeRoute::new("r", Some(vec![Point::new(2.0, 3.0)]))],
        };
        render.apply_layout(&layout);

        assert_eq!(render.nodes[1].position, Some(Point::new(3.0, 4.0)));
        assert_eq!(render.edges[0].routing_points.as_ref().map(Vec::len), Some(1));
    }
}
