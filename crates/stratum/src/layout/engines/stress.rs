//! Stress-majorisation engine.
//!
//! Graph distances come from unit-weight shortest paths over the undirected
//! edges; pairs in different components are treated as one hop further apart
//! than the longest finite path. Positions start on a seeded circle and are
//! improved with localized SMACOF updates until they settle or the iteration
//! budget runs out.

use std::f32::consts::TAU;

use log::debug;
use petgraph::{
    algo::dijkstra,
    graph::{NodeIndex, UnGraph},
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use stratum_core::geometry::Point;

use crate::layout::{
    LayoutEngine, LayoutError,
    config::{EdgeRouting, LayoutConfig},
    finalize::{Waypoints, finalize},
    graph::{LayoutGraph, LayoutResult, Topology},
};

use super::{center, empty_result};

/// Stress layout engine
#[derive(Debug, Clone)]
pub struct Engine {
    iterations: usize,
    spacing: f32,
    seed: u64,
    /// Largest movement of any node, below which the layout counts as settled.
    tolerance: f32,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            iterations: 100,
            spacing: 60.0,
            seed: 42,
            tolerance: 0.1,
        }
    }

    /// Set the default iteration budget
    pub fn set_iterations(&mut self, iterations: usize) -> &mut Self {
        self.iterations = iterations;
        self
    }

    /// Hop distances between all node pairs.
    fn distances(&self, topology: &Topology<'_>) -> Vec<Vec<f32>> {
        let n = topology.len();
        let mut graph = UnGraph::<(), ()>::with_capacity(n, topology.edges.len());
        for _ in 0..n {
            graph.add_node(());
        }
        for &(source, target) in &topology.edges {
            graph.add_edge(NodeIndex::new(source), NodeIndex::new(target), ());
        }

        let mut distances = vec![vec![f32::INFINITY; n]; n];
        for (start, row) in distances.iter_mut().enumerate() {
            let reached = dijkstra(&graph, NodeIndex::new(start), None, |_| 1u32);
            for (node, hops) in reached {
                row[node.index()] = hops as f32;
            }
        }

        let longest = distances
            .iter()
            .flatten()
            .copied()
            .filter(|d| d.is_finite())
            .fold(0.0f32, f32::max);
        for value in distances.iter_mut().flatten() {
            if !value.is_finite() {
                *value = longest + 1.0;
            }
        }
        distances
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutEngine for Engine {
    fn calculate_layout(
        &self,
        graph: &LayoutGraph,
        config: &LayoutConfig,
    ) -> Result<LayoutResult, LayoutError> {
        let topology = Topology::new(graph);
        if topology.is_empty() {
            return Ok(empty_result(graph, &topology));
        }

        let n = topology.len();
        let largest = topology.max_size();
        let unit = largest.width().max(largest.height()) + config.spacing_or(self.spacing);
        let distances: Vec<Vec<f32>> = self
            .distances(&topology)
            .into_iter()
            .map(|row| row.into_iter().map(|hops| hops * unit).collect())
            .collect();

        let mut rng = StdRng::seed_from_u64(config.seed_or(self.seed));
        let radius = (unit * n as f32 / TAU).max(unit);
        let mut positions: Vec<Point> = (0..n)
            .map(|i| {
                let angle = TAU * i as f32 / n as f32 + rng.random_range(-0.1..0.1);
                Point::new(radius * angle.cos(), radius * angle.sin())
            })
            .collect();

        let iterations = config.iterations_or(self.iterations);
        let mut performed = 0;
        for _ in 0..iterations {
            performed += 1;
            let mut largest_move = 0.0f32;
            for i in 0..n {
                let mut weight_sum = 0.0f32;
                let mut sum = Point::default();
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let target = distances[i][j];
                    if target <= 0.0 {
                        continue;
                    }
                    let weight = 1.0 / (target * target);
                    let delta = positions[i].sub_point(positions[j]);
                    let current = delta.hypot().max(1e-3);
                    let pulled = positions[j].add_point(delta.scale(target / current));
                    sum = sum.add_point(pulled.scale(weight));
                    weight_sum += weight;
                }
                if weight_sum > 0.0 {
                    let next = sum.scale(1.0 / weight_sum);
                    if next.is_finite() {
                        largest_move = largest_move.max(next.distance(positions[i]));
                        positions[i] = next;
                    }
                }
            }
            if largest_move < self.tolerance {
                break;
            }
        }

        center(&mut positions);
        if let Some(ratio) = config.aspect_ratio() {
            stretch_to_ratio(&mut positions, ratio);
        }

        debug!(nodes = n, iterations = performed; "Stress layout finished");

        Ok(finalize(
            graph,
            &topology,
            positions,
            &Waypoints::new(),
            config.edge_routing_or(EdgeRouting::Straight),
            config.direction(),
        ))
    }
}

/// Scales x so that the bounding box has the requested width / height.
fn stretch_to_ratio(positions: &mut [Point], ratio: f32) {
    let extent = |axis: fn(&Point) -> f32| {
        let (min, max) = positions
            .iter()
            .map(axis)
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        max - min
    };
    let width = extent(|p| p.x());
    let height = extent(|p| p.y());
    if width <= f32::EPSILON || height <= f32::EPSILON {
        return;
    }
    let factor = ratio * height / width;
    for pos in positions.iter_mut() {
        *pos = Point::new(pos.x() * factor, pos.y());
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::layout::engines::test_support::{
        assert_complete, assert_deterministic, edge, messy, node, position,
    };

    fn path() -> LayoutGraph {
        LayoutGraph::new(
            ["a", "b", "c", "d"].into_iter().map(node).collect(),
            vec![edge("a", "b"), edge("b", "c"), edge("c", "d")],
        )
    }

    #[test]
    fn test_empty_graph() {
        let result = Engine::new()
            .calculate_layout(&LayoutGraph::default(), &LayoutConfig::default())
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_distances_between_components() {
        let graph = LayoutGraph::new(
            ["a", "b", "c"].into_iter().map(node).collect(),
            vec![edge("a", "b")],
        );
        let topology = Topology::new(&graph);

        let distances = Engine::new().distances(&topology);

        assert_approx_eq!(f32, distances[0][1], 1.0);
        assert_approx_eq!(f32, distances[0][2], 2.0);
        assert_approx_eq!(f32, distances[2][2], 0.0);
    }

    #[test]
    fn test_graph_distance_reflected() {
        let result = Engine::new()
            .calculate_layout(&path(), &LayoutConfig::default())
            .unwrap();

        let near = position(&result, "a").distance(position(&result, "b"));
        let far = position(&result, "a").distance(position(&result, "d"));
        assert!(far > near);
    }

    #[test]
    fn test_seed_is_respected() {
        let graph = messy();
        let engine = Engine::new();
        let first = engine
            .calculate_layout(&graph, &LayoutConfig::default().with_seed(7))
            .unwrap();
        let second = engine
            .calculate_layout(&graph, &LayoutConfig::default().with_seed(7))
            .unwrap();
        assert_eq!(first, second);
        assert_complete(&graph, &first);
    }

    #[test]
    fn test_deterministic() {
        assert_deterministic(&Engine::new(), &messy());
    }

    #[test]
    fn test_aspect_ratio() {
        let config = LayoutConfig {
            aspect_ratio: Some(2.0),
            ..LayoutConfig::default()
        };
        let result = Engine::new().calculate_layout(&messy(), &config).unwrap();

        let xs: Vec<f32> = result.nodes.iter().map(|n| n.position.x()).collect();
        let ys: Vec<f32> = result.nodes.iter().map(|n| n.position.y()).collect();
        let span = |v: &[f32]| {
            v.iter().copied().fold(f32::MIN, f32::max) - v.iter().copied().fold(f32::MAX, f32::min)
        };
        assert_approx_eq!(f32, span(&xs) / span(&ys), 2.0, epsilon = 1e-3);
    }

    #[test]
    fn test_single_node() {
        let graph = LayoutGraph::new(vec![node("solo")], vec![]);
        let result = Engine::new()
            .calculate_layout(&graph, &LayoutConfig::default())
            .unwrap();
        assert_eq!(result.nodes.len(), 1);
        assert!(result.nodes[0].position.is_finite());
    }
}
