//! Projects a `HypergridSpace` into CSR `SimulationState`

use std::collections::HashMap;

use crate::topology::{Coordinate, HypergridSpace};

use super::state::SimulationState;

/// Builds CSR simulation state from a space.
pub struct GridStateBuilder;

impl GridStateBuilder {
    /// Assign every cell a stable index in `space.cells()` iteration order,
    /// seed activations with `initial_activation`, then fold edges into
    /// CSR form keyed by target cell. Edges referencing a coordinate with
    /// no cell are orphans and are skipped.
    pub fn build(
        space: &HypergridSpace,
        initial_activation: impl Fn(&crate::topology::GridCell) -> f64,
    ) -> SimulationState {
        let mut index_of: HashMap<Coordinate, usize> = HashMap::with_capacity(space.cell_count());
        let mut activations = Vec::with_capacity(space.cell_count());
        for (i, (position, cell)) in space.cells().enumerate() {
            index_of.insert(position.clone(), i);
            activations.push(initial_activation(cell));
        }

        let mut triples: Vec<(usize, usize, f64)> = Vec::new();
        for edge in space.edges() {
            if let (Some(&target_idx), Some(&source_idx)) =
                (index_of.get(&edge.target), index_of.get(&edge.source))
            {
                triples.push((target_idx, source_idx, edge.weight));
            }
        }
        triples.sort_by_key(|(target_idx, _, _)| *target_idx);

        let cell_count = activations.len();
        let mut edge_row_ptr = vec![0usize; cell_count + 1];
        let mut edge_sources = Vec::with_capacity(triples.len());
        let mut edge_weights = Vec::with_capacity(triples.len());
        for (target_idx, source_idx, weight) in &triples {
            edge_row_ptr[*target_idx + 1] += 1;
            edge_sources.push(*source_idx);
            edge_weights.push(*weight);
        }
        for i in 1..edge_row_ptr.len() {
            edge_row_ptr[i] += edge_row_ptr[i - 1];
        }

        SimulationState::try_new(activations, edge_row_ptr, edge_sources, edge_weights, 0)
            .expect("builder produces well-formed CSR state by construction")
    }
}
