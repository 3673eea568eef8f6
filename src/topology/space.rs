//! HypergridSpace: the mutable container of cells and edges

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::coordinate::{Coordinate, DimensionDescriptor};
use super::edge::Edge;

/// Errors raised by coordinate and space operations.
///
/// Construction and argument errors are fatal and raised immediately — none
/// of these surface mid-simulation.
#[derive(Debug, Error, PartialEq)]
pub enum TopologyError {
    #[error("coordinate must have rank >= 1")]
    EmptyCoordinate,

    #[error("coordinate index {index} out of bounds for rank {rank}")]
    IndexOutOfBounds { index: usize, rank: usize },

    #[error("rank mismatch: expected {expected}, got {actual}")]
    RankMismatch { expected: usize, actual: usize },

    #[error("dimensions must be non-empty")]
    EmptyDimensions,

    #[error("duplicate dimension index {0}")]
    DuplicateDimensionIndex(usize),
}

/// Lifecycle state of a cell. Transitions are unordered and caller-driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridCellState {
    Idle,
    Active,
    Processing,
    Faulted,
}

/// A vertex in the hypergrid space.
///
/// Position is fixed for the cell's life; ownership belongs to the
/// `HypergridSpace` that contains it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub position: Coordinate,
    pub node_id: String,
    pub state: GridCellState,
}

impl GridCell {
    pub fn new(position: Coordinate, node_id: impl Into<String>) -> Self {
        Self {
            position,
            node_id: node_id.into(),
            state: GridCellState::Idle,
        }
    }
}

/// An N-D coordinate space containing cells and directed weighted edges.
///
/// Single-writer assumed: construct the space (adding cells and edges), then
/// query it. There is no internal synchronization — callers must serialize
/// construction phases from query phases themselves.
#[derive(Debug, Clone)]
pub struct HypergridSpace {
    dimensions: Vec<DimensionDescriptor>,
    cells: IndexMap<Coordinate, GridCell>,
    edges: Vec<Edge>,
}

impl HypergridSpace {
    /// Create a new space over the given dimensions.
    ///
    /// Fails if `dimensions` is empty, or if any `index` repeats.
    pub fn new(dimensions: Vec<DimensionDescriptor>) -> Result<Self, TopologyError> {
        if dimensions.is_empty() {
            return Err(TopologyError::EmptyDimensions);
        }
        let mut seen = std::collections::HashSet::new();
        for d in &dimensions {
            if !seen.insert(d.index) {
                return Err(TopologyError::DuplicateDimensionIndex(d.index));
            }
        }
        Ok(Self {
            dimensions,
            cells: IndexMap::new(),
            edges: Vec::new(),
        })
    }

    /// The rank of this space (number of dimensions).
    pub fn rank(&self) -> usize {
        self.dimensions.len()
    }

    pub fn dimensions(&self) -> &[DimensionDescriptor] {
        &self.dimensions
    }

    /// Insert (or replace) a cell at `position`.
    ///
    /// Fails if `position.rank() != self.rank()`.
    pub fn add_cell(
        &mut self,
        position: Coordinate,
        node_id: impl Into<String>,
    ) -> Result<GridCell, TopologyError> {
        if position.rank() != self.rank() {
            return Err(TopologyError::RankMismatch {
                expected: self.rank(),
                actual: position.rank(),
            });
        }
        let cell = GridCell::new(position.clone(), node_id);
        self.cells.insert(position, cell.clone());
        Ok(cell)
    }

    /// Record a directed edge in insertion order.
    ///
    /// No rank or cell-existence check — edges may reference coordinates
    /// with no cell; such orphans are silently ignored at CSR-build time.
    pub fn connect(
        &mut self,
        source: Coordinate,
        target: Coordinate,
        dimension: usize,
        label: Option<String>,
    ) -> Edge {
        let edge = Edge::new(source, target, dimension, label);
        self.edges.push(edge.clone());
        edge
    }

    pub fn get_cell(&self, position: &Coordinate) -> Option<&GridCell> {
        self.cells.get(position)
    }

    /// Edges whose source equals `position`, in insertion order.
    pub fn edges_from<'a>(&'a self, position: &'a Coordinate) -> impl Iterator<Item = &'a Edge> {
        self.edges.iter().filter(move |e| &e.source == position)
    }

    /// All edges, in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// All cells, in insertion order — the order the state builder relies on
    /// for stable cell indexing.
    pub fn cells(&self) -> impl Iterator<Item = (&Coordinate, &GridCell)> {
        self.cells.iter()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims() -> Vec<DimensionDescriptor> {
        vec![
            DimensionDescriptor::new(0, "x", "first axis"),
            DimensionDescriptor::new(1, "y", "second axis"),
        ]
    }

    #[test]
    fn new_rejects_empty_dimensions() {
        assert!(matches!(
            HypergridSpace::new(vec![]).unwrap_err(),
            TopologyError::EmptyDimensions
        ));
    }

    #[test]
    fn new_rejects_duplicate_dimension_index() {
        let dims = vec![
            DimensionDescriptor::new(0, "x", ""),
            DimensionDescriptor::new(0, "y", ""),
        ];
        assert!(matches!(
            HypergridSpace::new(dims).unwrap_err(),
            TopologyError::DuplicateDimensionIndex(0)
        ));
    }

    #[test]
    fn add_cell_rejects_rank_mismatch() {
        let mut space = HypergridSpace::new(dims()).unwrap();
        let bad = Coordinate::new(vec![1, 2, 3]).unwrap();
        assert!(matches!(
            space.add_cell(bad, "n").unwrap_err(),
            TopologyError::RankMismatch { expected: 2, actual: 3 }
        ));
    }

    #[test]
    fn add_cell_at_existing_position_replaces() {
        let mut space = HypergridSpace::new(dims()).unwrap();
        let pos = Coordinate::new(vec![0, 0]).unwrap();
        space.add_cell(pos.clone(), "first").unwrap();
        space.add_cell(pos.clone(), "second").unwrap();
        assert_eq!(space.cell_count(), 1);
        assert_eq!(space.get_cell(&pos).unwrap().node_id, "second");
    }

    #[test]
    fn connect_allows_orphan_and_self_loop_edges() {
        let mut space = HypergridSpace::new(dims()).unwrap();
        let a = Coordinate::new(vec![0, 0]).unwrap();
        let b = Coordinate::new(vec![9, 9]).unwrap();
        space.connect(a.clone(), a.clone(), 0, None);
        space.connect(a, b, 0, None);
        assert_eq!(space.edge_count(), 2);
    }

    #[test]
    fn edges_from_filters_by_source() {
        let mut space = HypergridSpace::new(dims()).unwrap();
        let a = Coordinate::new(vec![0, 0]).unwrap();
        let b = Coordinate::new(vec![1, 1]).unwrap();
        let c = Coordinate::new(vec![2, 2]).unwrap();
        space.connect(a.clone(), b.clone(), 0, None);
        space.connect(b.clone(), c.clone(), 0, None);
        let from_a: Vec<_> = space.edges_from(&a).collect();
        assert_eq!(from_a.len(), 1);
        assert_eq!(from_a[0].target, b);
    }

    #[test]
    fn cell_iteration_preserves_insertion_order() {
        let mut space = HypergridSpace::new(dims()).unwrap();
        let positions: Vec<Coordinate> = (0..5)
            .map(|i| Coordinate::new(vec![i, i]).unwrap())
            .collect();
        for p in &positions {
            space.add_cell(p.clone(), format!("n{p}")).unwrap();
        }
        let observed: Vec<Coordinate> = space.cells().map(|(c, _)| c.clone()).collect();
        assert_eq!(observed, positions);
    }
}
