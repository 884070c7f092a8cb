//! Built-in layout engines.

mod force;
mod layered;
mod orthogonal;
mod stress;
mod sugiyama;
mod tree;

pub use force::Engine as ForceEngine;
pub use layered::Engine as LayeredEngine;
pub use orthogonal::Engine as OrthogonalEngine;
pub use stress::Engine as StressEngine;
pub use sugiyama::Engine as SugiyamaEngine;
pub use tree::Engine as TreeEngine;

use stratum_core::geometry::Point;

use super::{
    config::{Direction, EdgeRouting},
    finalize::{Waypoints, finalize},
    graph::{LayoutGraph, LayoutResult, Topology},
};

/// Result for a graph without nodes; any edges are reported unrouted.
fn empty_result(graph: &LayoutGraph, topology: &Topology<'_>) -> LayoutResult {
    finalize(
        graph,
        topology,
        Vec::new(),
        &Waypoints::new(),
        EdgeRouting::Straight,
        Direction::Down,
    )
}

/// Moves the bounding-box center of `positions` to the origin.
fn center(positions: &mut [Point]) {
    let Some(first) = positions.first() else {
        return;
    };
    let (mut min, mut max) = (*first, *first);
    for pos in positions.iter() {
        min = Point::new(min.x().min(pos.x()), min.y().min(pos.y()));
        max = Point::new(max.x().max(pos.x()), max.y().max(pos.y()));
    }
    let middle = min.midpoint(max);
    for pos in positions.iter_mut() {
        *pos = pos.sub_point(middle);
    }
}
