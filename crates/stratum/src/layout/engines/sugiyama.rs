//! Sugiyama engine backed by the `rust-sugiyama` crate.
//!
//! The crate computes levels and in-level coordinates per connected
//! component. Components are laid side by side across the growth axis and
//! nodes without edges are appended after them on the first rank. A panic or
//! an unusable result from the crate is reported as [`LayoutError::Engine`].

use std::{collections::HashMap, panic};

use log::debug;
use rust_sugiyama::configure::Config;

use crate::layout::{
    LayoutEngine, LayoutError,
    config::{EdgeRouting, LayoutConfig},
    finalize::finalize,
    graph::{LayoutGraph, LayoutResult, Topology},
    layering::RankPlacement,
};

use super::empty_result;

const ENGINE_NAME: &str = "sugiyama";

/// The Sugiyama layout engine
#[derive(Debug, Clone)]
pub struct Engine {
    /// Gap between nodes of one level
    spacing: f32,

    /// Gap between levels
    layer_spacing: f32,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            spacing: 50.0,
            layer_spacing: 80.0,
        }
    }

    /// Runs `rust-sugiyama` and returns, per node index, its level and its
    /// coordinate inside the level. Isolated nodes are absent.
    fn levels(
        &self,
        topology: &Topology<'_>,
    ) -> Result<HashMap<usize, (i64, f32)>, LayoutError> {
        let edges: Vec<(u32, u32)> = topology
            .edges
            .iter()
            .map(|&(source, target)| (source as u32, target as u32))
            .collect();

        let layouts = panic::catch_unwind(move || {
            let config = Config {
                minimum_length: 1,
                vertex_spacing: 1.0,
                ..Default::default()
            };
            rust_sugiyama::from_edges(&edges, &config)
        })
        .map_err(|err| {
            let message = err
                .downcast_ref::<String>()
                .cloned()
                .or_else(|| err.downcast_ref::<&str>().map(|s| s.to_string()))
                .unwrap_or_else(|| "panicked with unknown error".to_string());
            engine_error(message)
        })?;

        if layouts.is_empty() {
            return Err(engine_error("returned empty layout results"));
        }

        // Components side by side: shift each past the previous one.
        let mut levels = HashMap::with_capacity(topology.len());
        let mut offset = 0.0f32;
        for (coords, _, _) in &layouts {
            let min = coords
                .iter()
                .map(|&(_, (x, _))| x as f32)
                .fold(f32::INFINITY, f32::min);
            let mut max = offset;
            for &(id, (x, y)) in coords {
                let across = offset + (x as f32 - min);
                max = max.max(across);
                if id < topology.len() {
                    levels.insert(id, (y as i64, across));
                } else {
                    debug!(id = id; "Node id from rust-sugiyama out of range");
                }
            }
            offset = max + 1.0;
        }

        if levels.is_empty() {
            return Err(engine_error("failed to map any positions back to nodes"));
        }
        Ok(levels)
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

        let levels = if topology.edges.is_empty() {
            HashMap::new()
        } else {
            self.levels(&topology)?
        };

        // Level values grow or shrink along the edges depending on the crate;
        // normalise so that ranks grow from source to target.
        let mut distinct: Vec<i64> = levels.values().map(|&(level, _)| level).collect();
        distinct.sort_unstable();
        distinct.dedup();
        let descending = topology
            .edges
            .iter()
            .filter_map(|(s, t)| Some((levels.get(s)?.0, levels.get(t)?.0)))
            .filter(|(s, t)| s > t)
            .count()
            * 2
            > topology.edges.len();
        if descending {
            distinct.reverse();
        }
        let rank_of: HashMap<i64, usize> =
            distinct.iter().enumerate().map(|(rank, &level)| (level, rank)).collect();

        let mut ranks = vec![0usize; topology.len()];
        let mut slots: Vec<(f32, usize)> = Vec::with_capacity(topology.len());
        let mut tail = levels.values().map(|&(_, across)| across).fold(-1.0f32, f32::max);
        for node in 0..topology.len() {
            match levels.get(&node) {
                Some(&(level, across)) => {
                    ranks[node] = rank_of.get(&level).copied().unwrap_or(0);
                    slots.push((across, node));
                }
                None => {
                    tail += 1.0;
                    slots.push((tail, node));
                }
            }
        }

        for &(source, target) in &topology.edges {
            if ranks[source] == ranks[target] {
                return Err(engine_error("placed an edge inside a single level"));
            }
        }

        slots.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        let rank_count = ranks.iter().copied().max().map_or(0, |max| max + 1);
        let mut layers = vec![Vec::new(); rank_count];
        for (_, node) in slots {
            layers[ranks[node]].push(node);
        }

        debug!(
            nodes = topology.len(),
            edges = topology.edges.len(),
            levels = rank_count;
            "Sugiyama levels mapped"
        );

        let direction = config.direction();
        let placement = RankPlacement::new(
            &topology.sizes,
            &layers,
            direction,
            config.spacing_or(self.spacing),
            config.layer_spacing_or(self.layer_spacing).max(1.0),
            false,
        );
        let waypoints = placement.waypoints(&topology.edges, &ranks, direction);

        Ok(finalize(
            graph,
            &topology,
            placement.points(direction),
            &waypoints,
            config.edge_routing_or(EdgeRouting::Polyline),
            direction,
        ))
    }
}

fn engine_error(message: impl Into<String>) -> LayoutError {
    LayoutError::Engine {
        engine: ENGINE_NAME,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::engines::test_support::{
        assert_complete, assert_deterministic, assert_directed, dag, edge, node, position,
    };

    #[test]
    fn test_empty_graph() {
        let result = Engine::new()
            .calculate_layout(&LayoutGraph::default(), &LayoutConfig::default())
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_edges_point_along_direction() {
        assert_directed(&Engine::new(), &dag());
    }

    #[test]
    fn test_isolated_nodes_placed() {
        let graph = LayoutGraph::new(vec![node("a"), node("b"), node("c")], vec![]);
        let result = Engine::new()
            .calculate_layout(&graph, &LayoutConfig::default())
            .unwrap();
        assert_complete(&graph, &result);
        assert_ne!(position(&result, "a"), position(&result, "b"));
    }

    #[test]
    fn test_components_do_not_overlap() {
        let graph = LayoutGraph::new(
            ["a", "b", "x", "y"].into_iter().map(node).collect(),
            vec![edge("a", "b"), edge("x", "y")],
        );
        let result = Engine::new()
            .calculate_layout(&graph, &LayoutConfig::default())
            .unwrap();

        assert_complete(&graph, &result);
        assert_ne!(position(&result, "a"), position(&result, "x"));
        assert_ne!(position(&result, "b"), position(&result, "y"));
    }

    #[test]
    fn test_deterministic() {
        assert_deterministic(&Engine::new(), &dag());
    }
}
