//! Layered engine.
//!
//! Breaks cycles by reversing DFS back edges, assigns ranks with the
//! configured [`Layering`](crate::layout::Layering), orders every rank with
//! barycenter sweeps and stacks the ranks along the configured direction.

use log::debug;

use crate::layout::{
    LayoutEngine, LayoutError,
    config::{EdgeRouting, LayoutConfig},
    finalize::finalize,
    graph::{LayoutGraph, LayoutResult, Topology},
    layering::{RankPlacement, acyclic_edges, assign_ranks, order_ranks},
};

use super::empty_result;

/// Layered (hierarchical) layout engine.
#[derive(Debug, Clone)]
pub struct Engine {
    spacing: f32,
    layer_spacing: f32,
    sweeps: usize,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            spacing: 50.0,
            layer_spacing: 80.0,
            sweeps: 4,
        }
    }

    /// Set the default gap between nodes of one rank
    pub fn set_spacing(&mut self, spacing: f32) -> &mut Self {
        self.spacing = spacing;
        self
    }

    /// Set the default gap between ranks
    pub fn set_layer_spacing(&mut self, spacing: f32) -> &mut Self {
        self.layer_spacing = spacing;
        self
    }

    /// Lays out `graph`, with every node in a cell as wide as the widest
    /// node when `uniform_cells` is set.
    pub(super) fn layout(
        &self,
        graph: &LayoutGraph,
        config: &LayoutConfig,
        uniform_cells: bool,
        default_routing: EdgeRouting,
    ) -> LayoutResult {
        let topology = Topology::new(graph);
        if topology.is_empty() {
            return empty_result(graph, &topology);
        }

        let direction = config.direction();
        let dag = acyclic_edges(topology.len(), &topology.edges);
        let ranks = assign_ranks(topology.len(), &dag, config.layering());
        let layers = order_ranks(&ranks, &dag, self.sweeps);

        debug!(
            nodes = topology.len(),
            edges = topology.edges.len(),
            ranks = layers.len();
            "Ranks assigned"
        );

        let placement = RankPlacement::new(
            &topology.sizes,
            &layers,
            direction,
            config.spacing_or(self.spacing),
            config.layer_spacing_or(self.layer_spacing).max(1.0),
            uniform_cells,
        );
        let waypoints = placement.waypoints(&topology.edges, &ranks, direction);

        finalize(
            graph,
            &topology,
            placement.points(direction),
            &waypoints,
            config.edge_routing_or(default_routing),
            direction,
        )
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
        Ok(self.layout(graph, config, false, EdgeRouting::Polyline))
    }
}
