use indexmap::{IndexMap, IndexSet};

use super::{Graph, GraphEdge, GraphIndices, GraphNode};

/// Builds every lookup table in one pass over nodes and one over edges.
///
/// `outgoing` and `incoming` hold an entry for every node, empty when the
/// node has no edges in that direction.
pub fn build_indices(
    nodes: &IndexMap<String, GraphNode>,
    edges: &IndexMap<String, GraphEdge>,
) -> GraphIndices {
    let mut indices = GraphIndices::default();

    for (id, node) in nodes {
        indices
            .by_type
            .entry(node.type_tag().to_string())
            .or_insert_with(IndexSet::new)
            .insert(id.clone());
        indices
            .by_layer
            .entry(node.layer_id().to_string())
            .or_insert_with(IndexSet::new)
            .insert(id.clone());
        indices.outgoing.insert(id.clone(), Vec::new());
        indices.incoming.insert(id.clone(), Vec::new());
    }

    for (id, edge) in edges {
        indices
            .edges_by_type
            .entry(edge.type_tag().to_string())
            .or_insert_with(IndexSet::new)
            .insert(id.clone());
        if let Some(out) = indices.outgoing.get_mut(edge.source_id()) {
            out.push(id.clone());
        }
        if let Some(inc) = indices.incoming.get_mut(edge.target_id()) {
            inc.push(id.clone());
        }
    }

    indices
}

/// Ids of nodes with neither incoming nor outgoing edges, in node order.
pub fn detect_orphans(graph: &Graph) -> Vec<String> {
    let mut connected: IndexSet<&str> = IndexSet::new();
    for edge in graph.edges.values() {
        connected.insert(edge.source_id());
        connected.insert(edge.target_id());
    }

    graph
        .nodes
        .keys()
        .filter(|id| !connected.contains(id.as_str()))
        .cloned()
        .collect()
}
