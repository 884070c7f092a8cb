//! Assembly of a [`LayoutResult`] from engine positions.

use std::collections::{HashMap, HashSet};

use stratum_core::geometry::Point;

use super::{
    config::{Direction, EdgeRouting},
    graph::{EdgeRoute, LayoutGraph, LayoutResult, NodePosition, Topology},
};

/// Bend points supplied by an engine, keyed by `(source, target)` node index.
pub(crate) type Waypoints = HashMap<(usize, usize), Vec<Point>>;

/// Builds the result for `graph` from per-node centers.
///
/// Every distinct node id appears once. Missing or non-finite positions are
/// replaced by slots on a grid below the placed nodes. Every distinct edge id
/// gets a route; self-loops and edges with unknown endpoints get `None`.
pub(crate) fn finalize(
    graph: &LayoutGraph,
    topology: &Topology<'_>,
    mut positions: Vec<Point>,
    waypoints: &Waypoints,
    routing: EdgeRouting,
    direction: Direction,
) -> LayoutResult {
    positions.resize(topology.len(), Point::new(f32::NAN, f32::NAN));
    place_stragglers(topology, &mut positions);

    let nodes = topology
        .ids
        .iter()
        .zip(&positions)
        .map(|(id, position)| NodePosition::new(*id, *position))
        .collect();

    let mut seen = HashSet::with_capacity(graph.edges.len());
    let edges = graph
        .edges
        .iter()
        .filter(|edge| seen.insert(edge.id.as_str()))
        .map(|edge| {
            let source = topology.index.get(edge.source_id.as_str()).copied();
            let target = topology.index.get(edge.target_id.as_str()).copied();
            let points = match (source, target) {
                (Some(s), Some(t)) if s != t => {
                    route(positions[s], positions[t], waypoints.get(&(s, t)), routing, direction)
                }
                _ => None,
            };
            EdgeRoute::new(edge.id.clone(), points)
        })
        .collect();

    LayoutResult { nodes, edges }
}

fn route(
    source: Point,
    target: Point,
    waypoints: Option<&Vec<Point>>,
    routing: EdgeRouting,
    direction: Direction,
) -> Option<Vec<Point>> {
    let points = match routing {
        EdgeRouting::Straight => return None,
        EdgeRouting::Polyline => waypoints.cloned().unwrap_or_default(),
        EdgeRouting::Orthogonal => orthogonal_bends(source, target, direction),
    };
    let points: Vec<Point> = points.into_iter().filter(|p| p.is_finite()).collect();
    (!points.is_empty()).then_some(points)
}

/// Two axis-aligned bends halfway along the growth axis.
fn orthogonal_bends(source: Point, target: Point, direction: Direction) -> Vec<Point> {
    if direction.is_vertical() {
        if source.x() == target.x() {
            return Vec::new();
        }
        let mid = (source.y() + target.y()) / 2.0;
        vec![Point::new(source.x(), mid), Point::new(target.x(), mid)]
    } else {
        if source.y() == target.y() {
            return Vec::new();
        }
        let mid = (source.x() + target.x()) / 2.0;
        vec![Point::new(mid, source.y()), Point::new(mid, target.y())]
    }
}

/// Puts nodes without a finite position on a grid under the others.
fn place_stragglers(topology: &Topology<'_>, positions: &mut [Point]) {
    let stragglers: Vec<usize> = (0..positions.len())
        .filter(|&i| !positions[i].is_finite())
        .collect();
    if stragglers.is_empty() {
        return;
    }

    let max_y = positions
        .iter()
        .zip(&topology.sizes)
        .filter(|(p, _)| p.is_finite())
        .map(|(p, s)| p.y() + s.height() / 2.0)
        .fold(None, |acc: Option<f32>, y| Some(acc.map_or(y, |a| a.max(y))));
    let cell = topology.max_size();
    let cell_w = cell.width() + 40.0;
    let cell_h = cell.height() + 40.0;
    let top = max_y.map_or(0.0, |y| y + cell_h);
    let columns = (stragglers.len() as f32).sqrt().ceil().max(1.0) as usize;

    for (k, node) in stragglers.into_iter().enumerate() {
        let row = k / columns;
        let column = k % columns;
        positions[node] = Point::new(column as f32 * cell_w, top + row as f32 * cell_h);
    }
}

#[cfg(test)]
mod tests {
    use stratum_core::geometry::Size;

    use super::*;
    use crate::layout::graph::{LayoutEdge, LayoutNode};

    fn graph() -> LayoutGraph {
        LayoutGraph::new(
            vec![
                LayoutNode::new("a", Size::new(10.0, 10.0)),
                LayoutNode::new("b", Size::new(10.0, 10.0)),
                LayoutNode::new("c", Size::new(10.0, 10.0)),
            ],
            vec![
                LayoutEdge::new("ab", "a", "b"),
                LayoutEdge::new("ab", "b", "a"),
                LayoutEdge::new("loop", "c", "c"),
                LayoutEdge::new("dangling", "a", "zzz"),
            ],
        )
    }

    #[test]
    fn test_non_finite_positions_replaced() {
        let graph = graph();
        let topology = Topology::new(&graph);
        let positions = vec![
            Point::new(0.0, 0.0),
            Point::new(f32::INFINITY, 0.0),
            Point::new(5.0, f32::NAN),
        ];

        let result = finalize(
            &graph,
            &topology,
            positions,
            &Waypoints::new(),
            EdgeRouting::Straight,
            Direction::Down,
        );

        assert_eq!(result.nodes.len(), 3);
        assert!(result.nodes.iter().all(|n| n.position.is_finite()));
        assert_ne!(result.nodes[1].position, result.nodes[2].position);
    }

    #[test]
    fn test_missing_positions_filled() {
        let graph = graph();
        let topology = Topology::new(&graph);

        let result = finalize(
            &graph,
            &topology,
            Vec::new(),
            &Waypoints::new(),
            EdgeRouting::Straight,
            Direction::Down,
        );

        assert_eq!(result.nodes.len(), 3);
        assert!(result.nodes.iter().all(|n| n.position.is_finite()));
    }

    #[test]
    fn test_edges_once_per_id_and_unplaced_get_none() {
        let graph = graph();
        let topology = Topology::new(&graph);
        let positions = vec![
            Point::new(0.0, 0.0),
            Point::new(50.0, 100.0),
            Point::new(100.0, 0.0),
        ];

        let result = finalize(
            &graph,
            &topology,
            positions,
            &Waypoints::new(),
            EdgeRouting::Orthogonal,
            Direction::Down,
        );

        let ids: Vec<_> = result.edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["ab", "loop", "dangling"]);
        assert_eq!(
            result.edges[0].routing_points,
            Some(vec![Point::new(0.0, 50.0), Point::new(50.0, 50.0)])
        );
        assert!(result.edges[1].routing_points.is_none());
        assert!(result.edges[2].routing_points.is_none());
    }

    #[test]
    fn test_polyline_uses_waypoints() {
        let graph = graph();
        let topology = Topology::new(&graph);
        let mut waypoints = Waypoints::new();
        waypoints.insert((0, 1), vec![Point::new(1.0, 2.0)]);

        let result = finalize(
            &graph,
            &topology,
            vec![Point::default(); 3],
            &waypoints,
            EdgeRouting::Polyline,
            Direction::Down,
        );

        assert_eq!(result.edges[0].routing_points, Some(vec![Point::new(1.0, 2.0)]));
    }
}
