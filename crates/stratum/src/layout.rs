//! Pluggable layout engines.
//!
//! An engine turns an abstract [`LayoutGraph`] into node centers and edge
//! routes. Engines are registered by name in a [`LayoutEngineRegistry`];
//! [`LayoutEngineRegistry::with_defaults`] provides `layered`, `stress`,
//! `orthogonal`, `tree`, `force` and `sugiyama`.
//!
//! Every engine honours the same contract:
//!
//! - Empty input gives an empty result.
//! - Every distinct node id is placed exactly once, at finite coordinates.
//! - Self-loops, duplicate edges and edges with unknown endpoints are ignored
//!   for placement and reported with `routing_points = None`.
//! - Identical `(graph, config)` pairs give identical results.

mod config;
mod engines;
mod finalize;
mod graph;
mod layering;
mod registry;

pub use config::{Direction, EdgeRouting, Layering, LayoutConfig};
pub use engines::{
    ForceEngine, LayeredEngine, OrthogonalEngine, StressEngine, SugiyamaEngine, TreeEngine,
};
pub use graph::{EdgeRoute, LayoutEdge, LayoutGraph, LayoutNode, LayoutResult, NodePosition};
pub use registry::{DEFAULT_ALGORITHM, LayoutEngineRegistry};

use thiserror::Error;

/// Failure of a layout engine.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("layout engine `{engine}` failed: {message}")]
    Engine {
        engine: &'static str,
        message: String,
    },

    #[error("unknown layout algorithm `{0}`")]
    UnknownAlgorithm(String),
}

/// A layout algorithm.
pub trait LayoutEngine {
    /// Positions every node of `graph` and routes its edges.
    fn calculate_layout(
        &self,
        graph: &LayoutGraph,
        config: &LayoutConfig,
    ) -> Result<LayoutResult, LayoutError>;
}
