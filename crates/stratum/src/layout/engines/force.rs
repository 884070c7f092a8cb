//! Force-directed layout engine
//!
//! Nodes repel each other and edges act as springs. Nodes start on a jittered
//! grid drawn from a seeded generator, so runs are reproducible.

use log::debug;
use rand::{Rng, SeedableRng, rngs::StdRng};
use stratum_core::geometry::{Point, Size};

use crate::layout::{
    LayoutEngine, LayoutError,
    config::{EdgeRouting, LayoutConfig},
    finalize::{Waypoints, finalize},
    graph::{LayoutGraph, LayoutResult, Topology},
};

use super::{center, empty_result};

/// Force layout engine
///
/// Uses a physics simulation to position nodes based on a system of
/// attractive and repulsive forces.
#[derive(Debug, Clone)]
pub struct Engine {
    // Simulation parameters
    iterations: usize,
    spring_constant: f32,
    repulsion_constant: f32,
    damping_factor: f32,
    max_velocity: f32,
    // Used for maintaining distance between nodes
    min_distance: f32,
    seed: u64,
    /// Largest width or height of the centered drawing.
    max_dimension: f32,
}

impl Engine {
    /// Create a new force layout engine
    pub fn new() -> Self {
        Self {
            iterations: 300,
            spring_constant: 0.1,
            repulsion_constant: 1000.0,
            damping_factor: 0.85,
            max_velocity: 100.0,
            min_distance: 80.0,
            seed: 42,
            max_dimension: 1200.0,
        }
    }

    /// Set the default number of iterations for the force simulation
    pub fn set_iterations(&mut self, iterations: usize) -> &mut Self {
        self.iterations = iterations;
        self
    }

    /// Set the spring constant for edge forces
    pub fn set_spring_constant(&mut self, constant: f32) -> &mut Self {
        self.spring_constant = constant;
        self
    }

    /// Set the repulsion constant for node forces
    pub fn set_repulsion_constant(&mut self, constant: f32) -> &mut Self {
        self.repulsion_constant = constant;
        self
    }

    /// Set the damping factor for the simulation
    pub fn set_damping_factor(&mut self, factor: f32) -> &mut Self {
        self.damping_factor = factor;
        self
    }

    /// Initialize jittered grid positions
    fn initialize_positions(&self, n: usize, min_distance: f32, rng: &mut StdRng) -> Vec<Point> {
        let grid_size = (n as f32).sqrt().ceil().max(1.0) as usize;
        let cell_size = min_distance * 1.5;

        (0..n)
            .map(|i| {
                let row = i / grid_size;
                let col = i % grid_size;
                let base = Point::new(col as f32 * cell_size, row as f32 * cell_size);

                // Avoid perfect grid alignment
                let jitter =
                    Point::new(rng.random_range(-20.0..20.0), rng.random_range(-20.0..20.0));

                base.add_point(jitter)
            })
            .collect()
    }

    /// Run force-directed layout algorithm
    fn run_force_simulation(
        &self,
        topology: &Topology<'_>,
        config: &LayoutConfig,
    ) -> Vec<Point> {
        let n = topology.len();
        let min_distance = config.spacing_or(self.min_distance);
        let mut rng = StdRng::seed_from_u64(config.seed_or(self.seed));
        let mut positions = self.initialize_positions(n, min_distance, &mut rng);
        let mut velocities = vec![Point::default(); n];
        let sizes: &[Size] = &topology.sizes;

        for _ in 0..config.iterations_or(self.iterations) {
            let mut forces = vec![Point::default(); n];

            // Repulsive forces between all nodes
            for i in 0..n {
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let trans = positions[i].sub_point(positions[j]);

                    let min_dist = (sizes[i].width()
                        + sizes[j].width()
                        + sizes[i].height()
                        + sizes[j].height())
                        / 4.0
                        + min_distance;

                    // Avoid division by zero
                    let distance = trans.hypot().max(1.0);

                    // Stronger repulsion when nodes are too close
                    let force_factor = if distance < min_dist {
                        self.repulsion_constant * (min_dist / distance).powf(2.0)
                    } else {
                        self.repulsion_constant / distance
                    };

                    forces[i] = forces[i].add_point(trans.scale(force_factor / distance));
                }
            }

            // Spring forces between connected nodes
            for &(source, target) in &topology.edges {
                // Proportional to distance, along the edge
                let force = positions[source]
                    .sub_point(positions[target])
                    .scale(self.spring_constant);

                forces[source] = forces[source].sub_point(force);
                forces[target] = forces[target].add_point(force);
            }

            for i in 0..n {
                let mut velocity = velocities[i].add_point(forces[i]).scale(self.damping_factor);
                let speed = velocity.hypot();
                if speed > self.max_velocity {
                    velocity = velocity.scale(self.max_velocity / speed);
                }
                velocities[i] = velocity;
                positions[i] = positions[i].add_point(velocity);
            }
        }

        self.center_layout(&mut positions);
        positions
    }

    /// Center the layout around the origin and shrink it if too large
    fn center_layout(&self, positions: &mut [Point]) {
        center(positions);

        let (width, height) = positions.iter().fold((0.0f32, 0.0f32), |(w, h), pos| {
            (w.max(pos.x().abs() * 2.0), h.max(pos.y().abs() * 2.0))
        });
        if width > self.max_dimension || height > self.max_dimension {
            let scale_factor = self.max_dimension / width.max(height);
            for pos in positions.iter_mut() {
                *pos = pos.scale(scale_factor);
            }
        }
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

        debug!(
            nodes = topology.len(),
            edges = topology.edges.len();
            "Running force simulation"
        );
        let positions = self.run_force_simulation(&topology, config);

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::engines::test_support::{
        assert_complete, assert_deterministic, dag, messy, position,
    };

    #[test]
    fn test_empty_graph() {
        let result = Engine::new()
            .calculate_layout(&LayoutGraph::default(), &LayoutConfig::default())
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_messy_graph_complete() {
        let graph = messy();
        let result = Engine::new()
            .calculate_layout(&graph, &LayoutConfig::default())
            .unwrap();
        assert_complete(&graph, &result);
    }

    #[test]
    fn test_deterministic_per_seed() {
        assert_deterministic(&Engine::new(), &dag());

        let engine = Engine::new();
        let graph = dag();
        let a = engine
            .calculate_layout(&graph, &LayoutConfig::default().with_seed(1))
            .unwrap();
        let b = engine
            .calculate_layout(&graph, &LayoutConfig::default().with_seed(1))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_layout_is_bounded_and_spread() {
        let graph = dag();
        let result = Engine::new()
            .calculate_layout(&graph, &LayoutConfig::default())
            .unwrap();

        for node in &result.nodes {
            assert!(node.position.x().abs() <= 600.0 + 1e-3);
            assert!(node.position.y().abs() <= 600.0 + 1e-3);
        }
        assert_ne!(position(&result, "a"), position(&result, "b"));
    }

    #[test]
    fn test_zero_iterations_keeps_grid() {
        let graph = dag();
        let result = Engine::new()
            .calculate_layout(&graph, &LayoutConfig::default().with_iterations(0))
            .unwrap();
        assert_complete(&graph, &result);
    }
}
