//! Rank assignment and in-rank ordering shared by the layered engines.

use std::collections::{HashSet, VecDeque};

use stratum_core::geometry::{Point, Size};

use super::{
    config::{Direction, Layering},
    finalize::Waypoints,
};

/// Makes `edges` acyclic by reversing DFS back edges.
///
/// Nodes are visited in index order. The result has no duplicates and no
/// self-loops.
pub(crate) fn acyclic_edges(n: usize, edges: &[(usize, usize)]) -> Vec<(usize, usize)> {
    let mut successors = vec![Vec::new(); n];
    for &(source, target) in edges {
        successors[source].push(target);
    }

    // 0 = unvisited, 1 = on stack, 2 = done
    let mut state = vec![0u8; n];
    let mut back_edges = HashSet::new();
    for start in 0..n {
        if state[start] != 0 {
            continue;
        }
        state[start] = 1;
        let mut frames = vec![(start, 0usize)];
        while let Some(frame) = frames.last_mut() {
            let (node, next) = *frame;
            let Some(&target) = successors[node].get(next) else {
                state[node] = 2;
                frames.pop();
                continue;
            };
            frame.1 += 1;
            match state[target] {
                0 => {
                    state[target] = 1;
                    frames.push((target, 0));
                }
                1 => {
                    back_edges.insert((node, target));
                }
                _ => {}
            }
        }
    }

    let mut seen = HashSet::with_capacity(edges.len());
    edges
        .iter()
        .map(|&edge| {
            if back_edges.contains(&edge) {
                (edge.1, edge.0)
            } else {
                edge
            }
        })
        .filter(|&(source, target)| source != target && seen.insert((source, target)))
        .collect()
}

/// Assigns a rank to every node of an acyclic edge set so that
/// `rank[target] > rank[source]` for every edge.
pub(crate) fn assign_ranks(n: usize, dag: &[(usize, usize)], layering: Layering) -> Vec<usize> {
    let order = topological_order(n, dag);
    let mut ranks = vec![0usize; n];

    match layering {
        Layering::BreadthFirst => {
            let mut successors = vec![Vec::new(); n];
            for &(source, target) in dag {
                successors[source].push(target);
            }
            for &node in &order {
                for &target in &successors[node] {
                    ranks[target] = ranks[target].max(ranks[node] + 1);
                }
            }
        }
        Layering::LongestPath => {
            let mut predecessors = vec![Vec::new(); n];
            for &(source, target) in dag {
                predecessors[target].push(source);
            }
            let mut height = vec![0usize; n];
            for &node in order.iter().rev() {
                for &source in &predecessors[node] {
                    height[source] = height[source].max(height[node] + 1);
                }
            }
            let max_height = height.iter().copied().max().unwrap_or(0);
            for (rank, h) in ranks.iter_mut().zip(&height) {
                *rank = max_height - h;
            }
            // Isolated nodes belong on the first rank, not with the sinks.
            let mut touched = vec![false; n];
            for &(source, target) in dag {
                touched[source] = true;
                touched[target] = true;
            }
            for (rank, touched) in ranks.iter_mut().zip(touched) {
                if !touched {
                    *rank = 0;
                }
            }
        }
    }

    ranks
}

/// Kahn's algorithm, ties broken by node index.
fn topological_order(n: usize, dag: &[(usize, usize)]) -> Vec<usize> {
    let mut in_degree = vec![0usize; n];
    let mut successors = vec![Vec::new(); n];
    for &(source, target) in dag {
        in_degree[target] += 1;
        successors[source].push(target);
    }

    let mut queue: VecDeque<usize> = (0..n).filter(|&node| in_degree[node] == 0).collect();
    let mut order = Vec::with_capacity(n);
    while let Some(node) = queue.pop_front() {
        order.push(node);
        for &target in &successors[node] {
            in_degree[target] -= 1;
            if in_degree[target] == 0 {
                queue.push_back(target);
            }
        }
    }
    order
}

/// Groups nodes by rank and orders each rank with barycenter sweeps.
///
/// Each sweep goes down then up the ranks, sorting a rank by the mean
/// position of its neighbours in the adjacent rank. Nodes without such
/// neighbours keep their position. Ties keep the previous order.
pub(crate) fn order_ranks(
    ranks: &[usize],
    edges: &[(usize, usize)],
    sweeps: usize,
) -> Vec<Vec<usize>> {
    let rank_count = ranks.iter().copied().max().map_or(0, |max| max + 1);
    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); rank_count];
    for (node, &rank) in ranks.iter().enumerate() {
        layers[rank].push(node);
    }

    let mut up = vec![Vec::new(); ranks.len()];
    let mut down = vec![Vec::new(); ranks.len()];
    for &(source, target) in edges {
        let (upper, lower) = if ranks[source] <= ranks[target] {
            (source, target)
        } else {
            (target, source)
        };
        if ranks[lower] == ranks[upper] + 1 {
            down[upper].push(lower);
            up[lower].push(upper);
        }
    }

    let mut slot = vec![0usize; ranks.len()];
    let refresh = |layer: &[usize], slot: &mut [usize]| {
        for (i, &node) in layer.iter().enumerate() {
            slot[node] = i;
        }
    };
    for layer in &layers {
        refresh(layer, &mut slot);
    }

    for _ in 0..sweeps {
        for r in 1..rank_count {
            sort_by_barycenter(&mut layers[r], &up, &slot);
            refresh(&layers[r], &mut slot);
        }
        for r in (0..rank_count.saturating_sub(1)).rev() {
            sort_by_barycenter(&mut layers[r], &down, &slot);
            refresh(&layers[r], &mut slot);
        }
    }

    layers
}

fn sort_by_barycenter(layer: &mut [usize], neighbors: &[Vec<usize>], slot: &[usize]) {
    let mut keyed: Vec<(f32, usize, usize)> = layer
        .iter()
        .map(|&node| {
            let adjacent = &neighbors[node];
            let key = if adjacent.is_empty() {
                slot[node] as f32
            } else {
                adjacent.iter().map(|&n| slot[n] as f32).sum::<f32>() / adjacent.len() as f32
            };
            (key, slot[node], node)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    for (target, (_, _, node)) in layer.iter_mut().zip(keyed) {
        *target = node;
    }
}

/// Node coordinates of a ranked drawing, before orientation.
#[derive(Debug)]
pub(crate) struct RankPlacement {
    /// Per node, coordinate along the growth axis.
    pub along: Vec<f32>,
    /// Per node, coordinate across the growth axis.
    pub across: Vec<f32>,
    /// Per rank, center line along the growth axis.
    pub rank_along: Vec<f32>,
}

impl RankPlacement {
    /// Places `layers` rank after rank.
    ///
    /// A rank is as thick as its thickest node and ranks are `layer_spacing`
    /// apart. Inside a rank nodes are packed `spacing` apart and centered on
    /// the axis; with `uniform_cells` every node takes the same cell so that
    /// ranks line up in columns.
    pub fn new(
        sizes: &[Size],
        layers: &[Vec<usize>],
        direction: Direction,
        spacing: f32,
        layer_spacing: f32,
        uniform_cells: bool,
    ) -> Self {
        let extent = |size: Size| {
            if direction.is_vertical() {
                (size.height(), size.width())
            } else {
                (size.width(), size.height())
            }
        };
        let cell = sizes
            .iter()
            .map(|size| extent(*size).1)
            .fold(0.0f32, f32::max);

        let mut along = vec![0.0; sizes.len()];
        let mut across = vec![0.0; sizes.len()];
        let mut rank_along = Vec::with_capacity(layers.len());

        let mut cursor = 0.0f32;
        for layer in layers {
            let thickness = layer
                .iter()
                .map(|&node| extent(sizes[node]).0)
                .fold(0.0f32, f32::max);
            let center = cursor + thickness / 2.0;
            rank_along.push(center);
            cursor += thickness + layer_spacing;

            let widths: Vec<f32> = layer
                .iter()
                .map(|&node| if uniform_cells { cell } else { extent(sizes[node]).1 })
                .collect();
            let total = widths.iter().sum::<f32>()
                + spacing * layer.len().saturating_sub(1) as f32;
            let mut offset = -total / 2.0;
            for (&node, width) in layer.iter().zip(widths) {
                along[node] = center;
                across[node] = offset + width / 2.0;
                offset += width + spacing;
            }
        }

        Self {
            along,
            across,
            rank_along,
        }
    }

    pub fn points(&self, direction: Direction) -> Vec<Point> {
        self.along
            .iter()
            .zip(&self.across)
            .map(|(along, across)| direction.orient(*along, *across))
            .collect()
    }

    /// Bend points where edges cross intermediate ranks, interpolated across.
    pub fn waypoints(
        &self,
        edges: &[(usize, usize)],
        ranks: &[usize],
        direction: Direction,
    ) -> Waypoints {
        let mut waypoints = Waypoints::new();
        for &(source, target) in edges {
            let (rs, rt) = (ranks[source], ranks[target]);
            if rs.abs_diff(rt) < 2 {
                continue;
            }
            let span = rt as f32 - rs as f32;
            let intermediate: Vec<usize> = if rs < rt {
                (rs + 1..rt).collect()
            } else {
                (rt + 1..rs).rev().collect()
            };
            let points = intermediate
                .into_iter()
                .map(|rank| {
                    let t = (rank as f32 - rs as f32) / span;
                    let across =
                        self.across[source] + (self.across[target] - self.across[source]) * t;
                    direction.orient(self.rank_along[rank], across)
                })
                .collect();
            waypoints.insert((source, target), points);
        }
        waypoints
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_acyclic_edges_reverses_back_edge() {
        let dag = acyclic_edges(3, &[(0, 1), (1, 2), (2, 0)]);
        assert_eq!(dag, vec![(0, 1), (1, 2), (0, 2)]);
    }

    #[test]
    fn test_acyclic_edges_drops_resulting_duplicates() {
        let dag = acyclic_edges(2, &[(0, 1), (1, 0)]);
        assert_eq!(dag, vec![(0, 1)]);
    }

    #[test]
    fn test_longest_path_puts_sinks_last() {
        // 0 -> 1 -> 2, 0 -> 3
        let ranks = assign_ranks(4, &[(0, 1), (1, 2), (0, 3)], Layering::LongestPath);
        assert_eq!(ranks, vec![0, 1, 2, 2]);
    }

    #[test]
    fn test_breadth_first_keeps_nodes_near_roots() {
        let ranks = assign_ranks(4, &[(0, 1), (1, 2), (0, 3)], Layering::BreadthFirst);
        assert_eq!(ranks, vec![0, 1, 2, 1]);
    }

    #[test]
    fn test_ranks_strictly_increase_along_edges() {
        let edges = [(0, 1), (0, 2), (2, 1), (1, 3), (4, 3)];
        for layering in [Layering::LongestPath, Layering::BreadthFirst] {
            let ranks = assign_ranks(5, &edges, layering);
            for &(s, t) in &edges {
                assert!(ranks[t] > ranks[s], "{layering:?}: {s}->{t}");
            }
        }
    }

    #[test]
    fn test_isolated_nodes_on_first_rank() {
        let ranks = assign_ranks(3, &[(0, 1)], Layering::LongestPath);
        assert_eq!(ranks[2], 0);
    }

    #[test]
    fn test_order_ranks_reduces_crossing() {
        // Rank 0: 0, 1; rank 1: 2, 3 with edges 0->3, 1->2 (crossing in index order).
        let layers = order_ranks(&[0, 0, 1, 1], &[(0, 3), (1, 2)], 2);
        assert_eq!(layers[0].len(), 2);
        let first_top = layers[0][0];
        let first_bottom = layers[1][0];
        assert!((first_top == 0 && first_bottom == 3) || (first_top == 1 && first_bottom == 2));
    }

    #[test]
    fn test_rank_placement_stacks_ranks() {
        let sizes = vec![Size::new(100.0, 40.0), Size::new(60.0, 20.0), Size::new(60.0, 20.0)];
        let layers = vec![vec![0], vec![1, 2]];

        let placement = RankPlacement::new(&sizes, &layers, Direction::Down, 10.0, 50.0, false);

        assert_approx_eq!(f32, placement.rank_along[0], 20.0);
        assert_approx_eq!(f32, placement.rank_along[1], 100.0);
        assert_approx_eq!(f32, placement.across[0], 0.0);
        assert_approx_eq!(f32, placement.across[1], -35.0);
        assert_approx_eq!(f32, placement.across[2], 35.0);

        let points = placement.points(Direction::Right);
        assert_approx_eq!(f32, points[1].x(), 100.0);
        assert_approx_eq!(f32, points[1].y(), -35.0);
    }

    #[test]
    fn test_waypoints_on_long_edges_only() {
        let sizes = vec![Size::new(10.0, 10.0); 3];
        let layers = vec![vec![0], vec![1], vec![2]];
        let ranks = vec![0, 1, 2];
        let placement = RankPlacement::new(&sizes, &layers, Direction::Down, 10.0, 10.0, false);

        let waypoints = placement.waypoints(&[(0, 1), (0, 2), (2, 0)], &ranks, Direction::Down);

        assert!(!waypoints.contains_key(&(0, 1)));
        assert_eq!(waypoints[&(0, 2)], vec![Point::new(0.0, 25.0)]);
        assert_eq!(waypoints[&(2, 0)], vec![Point::new(0.0, 25.0)]);
    }
}
