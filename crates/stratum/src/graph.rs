//! Graph representation of a parsed model.
//!
//! The [`Graph`] is built once per pipeline run by [`GraphBuilder`] and is then
//! enriched by the cross-layer resolver and the node transformer. It owns
//! copies of the elements and relationships it was built from.
//!
//! Submodules:
//! - [`builder`]: [`GraphBuilder`] and relationship validation
//! - [`cycles`]: [`detect_cycles`]
//! - [`hierarchy`]: [`compute_hierarchy`] over containment relationships
//! - [`indices`]: [`build_indices`] and [`detect_orphans`]

mod builder;
mod cycles;
mod hierarchy;
mod indices;

pub use builder::{GraphBuilder, validate_relationships};
pub use cycles::detect_cycles;
pub use hierarchy::compute_hierarchy;
pub use indices::{build_indices, detect_orphans};

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use stratum_core::{
    geometry::Size,
    model::{Element, ElementKind, Relationship, RelationshipKind},
};

use crate::resolve::CrossLayerLink;

/// A graph node, one per element.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub element: Element,
    /// First containment parent, if any.
    pub parent_id: Option<String>,
    pub child_ids: IndexSet<String>,
    /// Distance from the nearest containment root.
    pub hierarchy_level: usize,
    /// Render size. Zero until the node transformer runs.
    pub dimensions: Size,
}

impl GraphNode {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            parent_id: None,
            child_ids: IndexSet::new(),
            hierarchy_level: 0,
            dimensions: Size::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.element.id
    }

    pub fn kind(&self) -> &ElementKind {
        &self.element.kind
    }

    pub fn type_tag(&self) -> &str {
        self.element.type_tag()
    }

    pub fn layer_id(&self) -> &str {
        &self.element.layer_id
    }
}

/// A graph edge, one per relationship whose endpoints both exist.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    pub relationship: Relationship,
    pub source_layer: String,
    pub target_layer: String,
}

impl GraphEdge {
    pub fn id(&self) -> &str {
        &self.relationship.id
    }

    pub fn source_id(&self) -> &str {
        &self.relationship.source_id
    }

    pub fn target_id(&self) -> &str {
        &self.relationship.target_id
    }

    pub fn kind(&self) -> &RelationshipKind {
        &self.relationship.kind
    }

    pub fn type_tag(&self) -> &str {
        self.relationship.type_tag()
    }

    pub fn is_cross_layer(&self) -> bool {
        self.source_layer != self.target_layer
    }
}

/// Containment tree summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hierarchy {
    /// Nodes without an incoming containment edge.
    pub roots: IndexSet<String>,
    pub max_depth: usize,
}

/// A cycle found by [`detect_cycles`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CircularDependency {
    /// Type tag of the edge that closes the cycle.
    #[serde(rename = "type")]
    pub kind: String,
    /// Node ids along the cycle, starting at the target of the closing edge.
    pub cycle: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub node_count: usize,
    pub edge_count: usize,
    pub orphaned_nodes: Vec<String>,
    pub circular_dependencies: Vec<CircularDependency>,
}

/// Lookup tables over nodes and edges. Always rebuilt as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphIndices {
    /// Element type tag to node ids.
    pub by_type: IndexMap<String, IndexSet<String>>,
    /// Layer id to node ids.
    pub by_layer: IndexMap<String, IndexSet<String>>,
    /// Relationship type tag to edge ids.
    pub edges_by_type: IndexMap<String, IndexSet<String>>,
    /// Node id to ids of edges leaving it.
    pub outgoing: IndexMap<String, Vec<String>>,
    /// Node id to ids of edges entering it.
    pub incoming: IndexMap<String, Vec<String>>,
}

/// Validated, indexed graph of a model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    pub nodes: IndexMap<String, GraphNode>,
    pub edges: IndexMap<String, GraphEdge>,
    pub hierarchy: Hierarchy,
    pub metrics: Metrics,
    pub indices: GraphIndices,
    pub cross_layer_links: Vec<CrossLayerLink>,
}

impl Graph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn edge(&self, id: &str) -> Option<&GraphEdge> {
        self.edges.get(id)
    }

    /// Edges leaving `node_id`, in insertion order.
    pub fn outgoing_edges<'a>(&'a self, node_id: &str) -> impl Iterator<Item = &'a GraphEdge> {
        self.indices
            .outgoing
            .get(node_id)
            .into_iter()
            .flatten()
            .filter_map(|edge_id| self.edges.get(edge_id))
    }

    /// Edges entering `node_id`, in insertion order.
    pub fn incoming_edges<'a>(&'a self, node_id: &str) -> impl Iterator<Item = &'a GraphEdge> {
        self.indices
            .incoming
            .get(node_id)
            .into_iter()
            .flatten()
            .filter_map(|edge_id| self.edges.get(edge_id))
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
