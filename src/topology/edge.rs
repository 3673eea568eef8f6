//! Directed weighted edges between coordinates

use serde::{Deserialize, Serialize};

use super::coordinate::Coordinate;

/// A directed, weighted edge between two coordinates in a hypergrid space.
///
/// `dimension` is a free index carried for the caller's bookkeeping — there
/// is no invariant that the edge actually moves along that axis. Self-loops
/// are permitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: Coordinate,
    pub target: Coordinate,
    pub dimension: usize,
    pub label: Option<String>,
    pub weight: f64,
}

impl Edge {
    /// Create a new edge with the default weight of `1.0`.
    pub fn new(
        source: Coordinate,
        target: Coordinate,
        dimension: usize,
        label: Option<String>,
    ) -> Self {
        Self {
            source,
            target,
            dimension,
            label,
            weight: 1.0,
        }
    }

    /// Builder-style weight override.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weight_is_one() {
        let edge = Edge::new(Coordinate::scalar(0), Coordinate::scalar(1), 0, None);
        assert_eq!(edge.weight, 1.0);
    }

    #[test]
    fn with_weight_overrides() {
        let edge = Edge::new(Coordinate::scalar(0), Coordinate::scalar(1), 0, None)
            .with_weight(2.5);
        assert_eq!(edge.weight, 2.5);
    }

    #[test]
    fn self_loops_permitted() {
        let c = Coordinate::scalar(4);
        let edge = Edge::new(c.clone(), c.clone(), 0, None);
        assert_eq!(edge.source, edge.target);
    }
}
