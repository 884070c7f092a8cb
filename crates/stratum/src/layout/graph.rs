//! Engine input and output types.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use stratum_core::geometry::{Point, Size};

/// Node handed to a layout engine.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub id: String,
    pub size: Size,
    /// Containment parent, used by grouping engines.
    pub parent_id: Option<String>,
}

impl LayoutNode {
    pub fn new(id: impl Into<String>, size: Size) -> Self {
        Self {
            id: id.into(),
            size,
            parent_id: None,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }
}

/// Directed edge handed to a layout engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutEdge {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
}

impl LayoutEdge {
    pub fn new(
        id: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
        }
    }
}

/// Abstract node and edge set. May contain self-loops, duplicate edges and
/// edges with unknown endpoints; engines ignore those for placement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutGraph {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
}

impl LayoutGraph {
    pub fn new(nodes: Vec<LayoutNode>, edges: Vec<LayoutEdge>) -> Self {
        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodePosition {
    pub id: String,
    /// Center of the node.
    pub position: Point,
}

impl NodePosition {
    pub fn new(id: impl Into<String>, position: Point) -> Self {
        Self {
            id: id.into(),
            position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRoute {
    pub id: String,
    /// Bend points between the end nodes; `None` when the edge is drawn
    /// straight or was not placed (self-loop, unknown endpoint).
    pub routing_points: Option<Vec<Point>>,
}

impl EdgeRoute {
    pub fn new(id: impl Into<String>, routing_points: Option<Vec<Point>>) -> Self {
        Self {
            id: id.into(),
            routing_points,
        }
    }
}

/// Positions for every input node and routes for every input edge.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutResult {
    pub nodes: Vec<NodePosition>,
    pub edges: Vec<EdgeRoute>,
}

impl LayoutResult {
    pub fn position_of(&self, id: &str) -> Option<Point> {
        self.nodes
            .iter()
            .find(|node| node.id == id)
            .map(|node| node.position)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Index-based view of a [`LayoutGraph`] shared by the engines.
///
/// Node ids are deduplicated (first entry wins), sizes are sanitised, and only
/// distinct non-self-loop edges between known nodes are kept.
#[derive(Debug)]
pub(crate) struct Topology<'g> {
    pub ids: Vec<&'g str>,
    pub sizes: Vec<Size>,
    pub parents: Vec<Option<usize>>,
    pub edges: Vec<(usize, usize)>,
    pub index: HashMap<&'g str, usize>,
}

impl<'g> Topology<'g> {
    pub fn new(graph: &'g LayoutGraph) -> Self {
        let mut ids = Vec::with_capacity(graph.nodes.len());
        let mut sizes = Vec::with_capacity(graph.nodes.len());
        let mut index = HashMap::with_capacity(graph.nodes.len());
        let mut parent_ids = Vec::with_capacity(graph.nodes.len());

        for node in &graph.nodes {
            if index.contains_key(node.id.as_str()) {
                continue;
            }
            index.insert(node.id.as_str(), ids.len());
            ids.push(node.id.as_str());
            sizes.push(sanitize_size(node.size));
            parent_ids.push(node.parent_id.as_deref());
        }

        let parents = parent_ids
            .into_iter()
            .enumerate()
            .map(|(i, parent)| parent.and_then(|id| index.get(id).copied()).filter(|p| *p != i))
            .collect();

        let mut seen = HashSet::new();
        let edges = graph
            .edges
            .iter()
            .filter_map(|edge| {
                let source = *index.get(edge.source_id.as_str())?;
                let target = *index.get(edge.target_id.as_str())?;
                (source != target && seen.insert((source, target))).then_some((source, target))
            })
            .collect();

        Self {
            ids,
            sizes,
            parents,
            edges,
            index,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Successor lists over the placeable edges.
    pub fn successors(&self) -> Vec<Vec<usize>> {
        let mut successors = vec![Vec::new(); self.len()];
        for &(source, target) in &self.edges {
            successors[source].push(target);
        }
        successors
    }

    /// Neighbour lists ignoring direction.
    pub fn neighbors(&self) -> Vec<Vec<usize>> {
        let mut neighbors = vec![Vec::new(); self.len()];
        for &(source, target) in &self.edges {
            neighbors[source].push(target);
            neighbors[target].push(source);
        }
        neighbors
    }

    pub fn max_size(&self) -> Size {
        self.sizes
            .iter()
            .fold(Size::default(), |acc, size| acc.max(*size))
    }
}

fn sanitize_size(size: Size) -> Size {
    let clean = |value: f32| if value.is_finite() && value > 0.0 { value } else { 0.0 };
    Size::new(clean(size.width()), clean(size.height()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topology_filters_edges() {
        let graph = LayoutGraph::new(
            vec![
                LayoutNode::new("a", Size::new(10.0, 10.0)),
                LayoutNode::new("b", Size::new(f32::NAN, 10.0)),
                LayoutNode::new("a", Size::new(99.0, 99.0)),
            ],
            vec![
                LayoutEdge::new("1", "a", "b"),
                LayoutEdge::new("2", "a", "b"),
                LayoutEdge::new("3", "a", "a"),
                LayoutEdge::new("4", "a", "ghost"),
            ],
        );

        let topology = Topology::new(&graph);

        assert_eq!(topology.ids, vec!["a", "b"]);
        assert_eq!(topology.edges, vec![(0, 1)]);
        assert_eq!(topology.sizes[0], Size::new(10.0, 10.0));
        assert_eq!(topology.sizes[1], Size::new(0.0, 10.0));
    }

    #[test]
    fn test_topology_parents() {
        let graph = LayoutGraph::new(
            vec![
                LayoutNode::new("p", Size::default()),
                LayoutNode::new("c", Size::default()).with_parent("p"),
                LayoutNode::new("x", Size::default()).with_parent("unknown"),
            ],
            vec![],
        );

        let topology = Topology::new(&graph);

        assert_eq!(topology.parents, vec![None, Some(0), None]);
    }
}
