//! Immutable CSR snapshot of cell activations and incoming-edge topology

use std::sync::Arc;

use super::engine::SimulatorError;

/// An immutable snapshot of cell activations and the incoming-edge adjacency
/// that drives propagation.
///
/// Topology arrays (`edge_row_ptr`, `edge_sources`, `edge_weights`) are
/// shared via `Arc<[_]>` across steps so that advancing the simulation never
/// copies the graph — only `activations` and `step_number` change.
#[derive(Debug, Clone)]
pub struct SimulationState {
    activations: Arc<[f64]>,
    edge_row_ptr: Arc<[usize]>,
    edge_sources: Arc<[usize]>,
    edge_weights: Arc<[f64]>,
    step_number: usize,
}

impl SimulationState {
    /// Construct a new state, validating CSR invariants.
    ///
    /// Invalid CSR lengths are a fatal construction error, never a mid-loop
    /// failure: `edge_row_ptr.len() == cell_count + 1`, `edge_sources.len()
    /// == edge_weights.len()`, `edge_row_ptr` monotone non-decreasing, and
    /// `edge_row_ptr[cell_count] == edge_sources.len()`.
    pub fn try_new(
        activations: Vec<f64>,
        edge_row_ptr: Vec<usize>,
        edge_sources: Vec<usize>,
        edge_weights: Vec<f64>,
        step_number: usize,
    ) -> Result<Self, SimulatorError> {
        let cell_count = activations.len();

        if edge_row_ptr.len() != cell_count + 1 {
            return Err(SimulatorError::InvalidCsr(format!(
                "edge_row_ptr length {} must equal cell_count + 1 ({})",
                edge_row_ptr.len(),
                cell_count + 1
            )));
        }
        if edge_sources.len() != edge_weights.len() {
            return Err(SimulatorError::InvalidCsr(format!(
                "edge_sources length {} must equal edge_weights length {}",
                edge_sources.len(),
                edge_weights.len()
            )));
        }
        if !edge_row_ptr.windows(2).all(|w| w[0] <= w[1]) {
            return Err(SimulatorError::InvalidCsr(
                "edge_row_ptr must be monotone non-decreasing".to_string(),
            ));
        }
        if edge_row_ptr.last().copied().unwrap_or(0) != edge_sources.len() {
            return Err(SimulatorError::InvalidCsr(format!(
                "edge_row_ptr[last] ({}) must equal edge_sources length ({})",
                edge_row_ptr.last().copied().unwrap_or(0),
                edge_sources.len()
            )));
        }

        Ok(Self {
            activations: activations.into(),
            edge_row_ptr: edge_row_ptr.into(),
            edge_sources: edge_sources.into(),
            edge_weights: edge_weights.into(),
            step_number,
        })
    }

    /// Construct a new state that shares this state's topology arrays but
    /// replaces activations and bumps the step number — the per-step update
    /// path, never re-validating or re-copying topology.
    pub(super) fn with_activations(&self, activations: Vec<f64>, step_number: usize) -> Self {
        Self {
            activations: activations.into(),
            edge_row_ptr: self.edge_row_ptr.clone(),
            edge_sources: self.edge_sources.clone(),
            edge_weights: self.edge_weights.clone(),
            step_number,
        }
    }

    pub fn cell_count(&self) -> usize {
        self.activations.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_sources.len()
    }

    pub fn step_number(&self) -> usize {
        self.step_number
    }

    pub fn activations(&self) -> &[f64] {
        &self.activations
    }

    pub(super) fn edge_row_ptr(&self) -> &[usize] {
        &self.edge_row_ptr
    }

    pub(super) fn edge_sources(&self) -> &[usize] {
        &self.edge_sources
    }

    pub(super) fn edge_weights(&self) -> &[f64] {
        &self.edge_weights
    }
}
