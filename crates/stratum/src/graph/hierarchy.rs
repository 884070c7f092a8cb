use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};

use stratum_core::model::RelationshipKind;

use super::{GraphEdge, GraphNode, Hierarchy};

/// Derives the containment tree from edges whose kind is in `containment`.
///
/// Sets `parent_id`, `child_ids` and `hierarchy_level` on `nodes`. The first
/// containment edge into a node decides its parent. Levels are BFS distances
/// from the roots; nodes only reachable through a containment cycle keep
/// level 0.
pub fn compute_hierarchy(
    nodes: &mut IndexMap<String, GraphNode>,
    edges: &IndexMap<String, GraphEdge>,
    containment: &[RelationshipKind],
) -> Hierarchy {
    for node in nodes.values_mut() {
        node.parent_id = None;
        node.child_ids.clear();
        node.hierarchy_level = 0;
    }

    let mut children: IndexMap<&str, Vec<&str>> = IndexMap::new();
    let mut has_parent_edge: IndexSet<&str> = IndexSet::new();
    for edge in edges.values() {
        if !containment.contains(edge.kind()) {
            continue;
        }
        has_parent_edge.insert(edge.target_id());
        if edge.relationship.is_self_loop() {
            continue;
        }
        children
            .entry(edge.source_id())
            .or_default()
            .push(edge.target_id());
    }

    // First containment edge into a node wins.
    let mut links: Vec<(String, String)> = Vec::new();
    let mut parented: IndexSet<&str> = IndexSet::new();
    for edge in edges.values() {
        if containment.contains(edge.kind())
            && !edge.relationship.is_self_loop()
            && parented.insert(edge.target_id())
        {
            links.push((edge.source_id().to_string(), edge.target_id().to_string()));
        }
    }
    for (parent, child) in &links {
        if let Some(node) = nodes.get_mut(child) {
            node.parent_id = Some(parent.clone());
        }
        if let Some(node) = nodes.get_mut(parent) {
            node.child_ids.insert(child.clone());
        }
    }

    let roots: IndexSet<String> = nodes
        .keys()
        .filter(|id| !has_parent_edge.contains(id.as_str()))
        .cloned()
        .collect();

    let mut levels: IndexMap<String, usize> = IndexMap::new();
    let mut queue: VecDeque<(String, usize)> =
        roots.iter().map(|root| (root.clone(), 0)).collect();
    while let Some((id, level)) = queue.pop_front() {
        if levels.contains_key(&id) {
            continue;
        }
        if let Some(targets) = children.get(id.as_str()) {
            for target in targets {
                if !levels.contains_key(*target) {
                    queue.push_back((target.to_string(), level + 1));
                }
            }
        }
        levels.insert(id, level);
    }

    let mut max_depth = 0;
    for (id, level) in levels {
        if let Some(node) = nodes.get_mut(&id) {
            node.hierarchy_level = level;
            max_depth = max_depth.max(level);
        }
    }

    Hierarchy { roots, max_depth }
}
