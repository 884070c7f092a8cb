//! Edge merging with id deduplication.

use std::{collections::HashMap, fmt};

use log::warn;
use serde::Serialize;

use stratum_core::{
    diagnostic::{Diagnostic, ErrorCode},
    geometry::Point,
};

/// Producer of a render edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeSource {
    /// A relationship inside one layer.
    LayerRelationship,
    /// A bundled relationship between layers.
    CrossLayerLink,
    /// Any other producer, identified by label.
    Named(String),
}

impl fmt::Display for EdgeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeSource::LayerRelationship => f.write_str("layer relationship"),
            EdgeSource::CrossLayerLink => f.write_str("cross-layer link"),
            EdgeSource::Named(label) => f.write_str(label),
        }
    }
}

/// Edge of the render graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderEdge {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub relationship_type: String,
    pub source: EdgeSource,
    /// Number of relationships this edge stands for.
    pub bundled_count: usize,
    /// Filled in once a layout has been applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_points: Option<Vec<Point>>,
}

impl RenderEdge {
    pub fn new(
        id: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        relationship_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            relationship_type: relationship_type.into(),
            source: EdgeSource::Named(String::new()),
            bundled_count: 1,
            routing_points: None,
        }
    }
}

/// Two producers contributed an edge with the same id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeCollision {
    pub edge_id: String,
    /// Producer of the edge that was kept.
    pub kept: EdgeSource,
    /// Producer of the edge that was dropped.
    pub dropped: EdgeSource,
}

impl EdgeCollision {
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::warning(format!(
            "edge id `{}` from {} collides with the edge from {}; the later edge was dropped",
            self.edge_id, self.dropped, self.kept
        ))
        .with_code(ErrorCode::W401)
        .with_subject(self.edge_id.clone())
    }
}

/// Appends `edge` to `edges_out` unless its id is already in `seen`.
///
/// The kept edge is tagged with `source`. On a collision the edge is dropped,
/// a warning naming both producers is logged, and the collision is returned.
pub fn add_edge_if_unique(
    mut edge: RenderEdge,
    edges_out: &mut Vec<RenderEdge>,
    seen: &mut HashMap<String, EdgeSource>,
    source: EdgeSource,
) -> Option<EdgeCollision> {
    if let Some(kept) = seen.get(&edge.id) {
        let collision = EdgeCollision {
            edge_id: edge.id,
            kept: kept.clone(),
            dropped: source,
        };
        warn!(
            edge_id = collision.edge_id,
            kept:% = collision.kept,
            dropped:% = collision.dropped;
            "Duplicate edge id dropped"
        );
        return Some(collision);
    }

    seen.insert(edge.id.clone(), source.clone());
    edge.source = source;
    edges_out.push(edge);
    None
}
