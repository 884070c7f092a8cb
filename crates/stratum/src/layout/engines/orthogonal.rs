//! Orthogonal engine: the layered ranks on a uniform grid, with axis-aligned
//! edge routes by default.

use crate::layout::{
    LayoutEngine, LayoutError,
    config::{EdgeRouting, LayoutConfig},
    graph::{LayoutGraph, LayoutResult},
};

use super::layered;

#[derive(Debug, Clone)]
pub struct Engine {
    ranks: layered::Engine,
}

impl Engine {
    pub fn new() -> Self {
        let mut ranks = layered::Engine::new();
        ranks.set_spacing(40.0).set_layer_spacing(60.0);
        Self { ranks }
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
        Ok(self
            .ranks
            .layout(graph, config, true, EdgeRouting::Orthogonal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::engines::test_support::{
        assert_complete, assert_deterministic, assert_directed, dag, messy,
    };

    #[test]
    fn test_edges_point_along_direction() {
        assert_directed(&Engine::new(), &dag());
    }

    #[test]
    fn test_routes_are_axis_aligned() {
        let graph = dag();
        let result = Engine::new()
            .calculate_layout(&graph, &LayoutConfig::default())
            .unwrap();

        for route in &result.edges {
            let edge = graph.edges.iter().find(|e| e.id == route.id).unwrap();
            let source = result.position_of(&edge.source_id).unwrap();
            let target = result.position_of(&edge.target_id).unwrap();
            let mut path = vec![source];
            path.extend(route.routing_points.clone().unwrap_or_default());
            path.push(target);
            if route.routing_points.is_none() {
                continue;
            }
            for pair in path.windows(2) {
                assert!(
                    pair[0].x() == pair[1].x() || pair[0].y() == pair[1].y(),
                    "segment of {} is diagonal",
                    route.id
                );
            }
        }
    }

    #[test]
    fn test_nodes_share_grid_columns() {
        let result = Engine::new()
            .calculate_layout(&dag(), &LayoutConfig::default())
            .unwrap();
        let cell = 120.0 + 40.0;
        for node in &result.nodes {
            let column = node.position.x() / (cell / 2.0);
            assert!((column - column.round()).abs() < 1e-3, "{}", node.id);
        }
    }

    #[test]
    fn test_messy_graph_complete() {
        let graph = messy();
        let result = Engine::new()
            .calculate_layout(&graph, &LayoutConfig::default())
            .unwrap();
        assert_complete(&graph, &result);
        assert_deterministic(&Engine::new(), &graph);
    }
}
