use serde::Deserialize;

use stratum_core::geometry::Point;

/// Growth direction of direction-aware engines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    #[serde(alias = "up")]
    Up,
    #[default]
    #[serde(alias = "down")]
    Down,
    #[serde(alias = "left")]
    Left,
    #[serde(alias = "right")]
    Right,
}

impl Direction {
    /// `true` when ranks grow along the y axis.
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    /// Maps a coordinate along the growth axis and one across it to a point.
    pub fn orient(self, along: f32, across: f32) -> Point {
        match self {
            Direction::Down => Point::new(across, along),
            Direction::Up => Point::new(across, -along),
            Direction::Right => Point::new(along, across),
            Direction::Left => Point::new(-along, across),
        }
    }
}

/// Rank assignment strategy of layered engines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layering {
    /// Ranks measured back from the sinks; every sink ends up on the last rank.
    #[default]
    #[serde(alias = "longestPath")]
    LongestPath,
    /// Ranks measured from the sources; nodes sit as close to a root as the
    /// edges allow.
    #[serde(alias = "breadthFirst")]
    BreadthFirst,
}

/// How edges are routed between their end nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeRouting {
    /// No bend points.
    Straight,
    /// Bend points where a long edge crosses intermediate ranks.
    #[default]
    Polyline,
    /// Axis-aligned bend points.
    Orthogonal,
}

/// Layout options. Absent options fall back to engine defaults; unknown keys
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Registry name of the engine to run.
    pub algorithm: Option<String>,
    pub direction: Option<Direction>,
    /// Gap between neighbouring nodes.
    pub spacing: Option<f32>,
    /// Gap between ranks.
    #[serde(alias = "layerSpacing")]
    pub layer_spacing: Option<f32>,
    pub layering: Option<Layering>,
    #[serde(alias = "edgeRouting")]
    pub edge_routing: Option<EdgeRouting>,
    /// Target width / height of the drawing, for engines that can stretch it.
    #[serde(alias = "aspectRatio")]
    pub aspect_ratio: Option<f32>,
    /// Iteration budget of iterative engines.
    pub iterations: Option<usize>,
    /// Seed of randomised engines.
    pub seed: Option<u64>,
}

impl LayoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = Some(algorithm.into());
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = Some(spacing);
        self
    }

    pub fn with_layering(mut self, layering: Layering) -> Self {
        self.layering = Some(layering);
        self
    }

    pub fn with_edge_routing(mut self, routing: EdgeRouting) -> Self {
        self.edge_routing = Some(routing);
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = Some(iterations);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn direction(&self) -> Direction {
        self.direction.unwrap_or_default()
    }

    pub fn layering(&self) -> Layering {
        self.layering.unwrap_or_default()
    }

    pub fn spacing_or(&self, default: f32) -> f32 {
        non_negative(self.spacing, default)
    }

    pub fn layer_spacing_or(&self, default: f32) -> f32 {
        non_negative(self.layer_spacing, default)
    }

    pub fn edge_routing_or(&self, default: EdgeRouting) -> EdgeRouting {
        self.edge_routing.unwrap_or(default)
    }

    pub fn iterations_or(&self, default: usize) -> usize {
        self.iterations.unwrap_or(default)
    }

    pub fn seed_or(&self, default: u64) -> u64 {
        self.seed.unwrap_or(default)
    }

    /// Positive, finite aspect ratio, if configured.
    pub fn aspect_ratio(&self) -> Option<f32> {
        self.aspect_ratio
            .filter(|ratio| ratio.is_finite() && *ratio > 0.0)
    }
}

fn non_negative(value: Option<f32>, default: f32) -> f32 {
    value
        .filter(|value| value.is_finite() && *value >= 0.0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_direction_orient() {
        assert_eq!(Direction::Down.orient(10.0, 2.0), Point::new(2.0, 10.0));
        assert_eq!(Direction::Up.orient(10.0, 2.0), Point::new(2.0, -10.0));
        assert_eq!(Direction::Right.orient(10.0, 2.0), Point::new(10.0, 2.0));
        assert_eq!(Direction::Left.orient(10.0, 2.0), Point::new(-10.0, 2.0));
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = LayoutConfig {
            spacing: Some(f32::NAN),
            layer_spacing: Some(-5.0),
            aspect_ratio: Some(0.0),
            ..LayoutConfig::default()
        };
        assert_approx_eq!(f32, config.spacing_or(40.0), 40.0);
        assert_approx_eq!(f32, config.layer_spacing_or(80.0), 80.0);
        assert!(config.aspect_ratio().is_none());
    }

    #[test]
    fn test_defaults() {
        let config = LayoutConfig::new();
        assert_eq!(config.direction(), Direction::Down);
        assert_eq!(config.layering(), Layering::LongestPath);
        assert_eq!(config.edge_routing_or(EdgeRouting::Straight), EdgeRouting::Straight);
    }
}
