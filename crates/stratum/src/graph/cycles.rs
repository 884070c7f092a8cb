use std::collections::HashMap;

use super::{CircularDependency, Graph};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Finds circular dependencies with a depth-first search over every edge.
///
/// Each back edge yields one [`CircularDependency`] holding the ids on the
/// DFS stack from the back edge's target up to its source. Cycles are
/// reported only; the graph is left untouched. Nodes are visited in
/// insertion order, so the output is stable for a given graph.
pub fn detect_cycles(graph: &Graph) -> Vec<CircularDependency> {
    let mut adjacency: HashMap<&str, Vec<(&str, &str)>> = HashMap::new();
    for edge in graph.edges.values() {
        adjacency
            .entry(edge.source_id())
            .or_default()
            .push((edge.target_id(), edge.type_tag()));
    }

    let mut marks: HashMap<&str, Mark> = graph
        .nodes
        .keys()
        .map(|id| (id.as_str(), Mark::Unvisited))
        .collect();
    let mut cycles = Vec::new();

    for start in graph.nodes.keys() {
        if marks.get(start.as_str()) != Some(&Mark::Unvisited) {
            continue;
        }

        // Iterative DFS; each frame is (node, index of the next edge to follow).
        let mut path: Vec<&str> = vec![start.as_str()];
        let mut frames: Vec<(&str, usize)> = vec![(start.as_str(), 0)];
        marks.insert(start.as_str(), Mark::OnStack);

        while let Some(frame) = frames.last_mut() {
            let (node, next) = *frame;
            let successors = adjacency.get(node).map(Vec::as_slice).unwrap_or_default();

            let Some(&(target, kind)) = successors.get(next) else {
                marks.insert(node, Mark::Done);
                frames.pop();
                path.pop();
                continue;
            };
            frame.1 += 1;

            match marks.get(target).copied() {
                Some(Mark::Unvisited) => {
                    marks.insert(target, Mark::OnStack);
                    path.push(target);
                    frames.push((target, 0));
                }
                Some(Mark::OnStack) => {
                    if let Some(start) = path.iter().position(|id| *id == target) {
                        cycles.push(CircularDependency {
                            kind: kind.to_string(),
                            cycle: path[start..].iter().map(|id| id.to_string()).collect(),
                        });
                    }
                }
                Some(Mark::Done) | None => {}
            }
        }
    }

    cycles
}
