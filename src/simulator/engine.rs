//! One-step propagation and the convergence loop

use thiserror::Error;

use super::backend::SimulatorBackend;
use super::state::SimulationState;

/// Errors raised by simulator construction and comparison.
#[derive(Debug, Error, PartialEq)]
pub enum SimulatorError {
    #[error("invalid CSR state: {0}")]
    InvalidCsr(String),

    #[error("cell count mismatch: {a} vs {b}")]
    CellCountMismatch { a: usize, b: usize },
}

/// Runs a `SimulatorBackend` over `SimulationState` snapshots.
pub struct Simulator<B: SimulatorBackend> {
    backend: B,
}

impl<B: SimulatorBackend> Simulator<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Advance the state by exactly one step.
    ///
    /// Cells with no incoming edges retain their prior activation; all
    /// others become `activate(sum(a[source] * weight))` over their
    /// incoming edges. Topology arrays are shared by reference with the
    /// input state — only the activation vector is freshly allocated.
    pub fn step(&self, state: &SimulationState) -> SimulationState {
        let row_ptr = state.edge_row_ptr();
        let sources = state.edge_sources();
        let weights = state.edge_weights();
        let activations = state.activations();

        let next: Vec<f64> = (0..state.cell_count())
            .map(|i| {
                let start = row_ptr[i];
                let end = row_ptr[i + 1];
                if start == end {
                    activations[i]
                } else {
                    let sum: f64 = (start..end)
                        .map(|e| activations[sources[e]] * weights[e])
                        .sum();
                    self.backend.activate(sum)
                }
            })
            .collect();

        state.with_activations(next, state.step_number() + 1)
    }

    /// Step repeatedly until the maximum per-cell activation delta drops
    /// below `threshold`, or `max_steps` is reached.
    ///
    /// Returning `(state, max_steps)` without convergence is not an error.
    pub fn run_until_convergence(
        &self,
        initial: SimulationState,
        threshold: f64,
        max_steps: usize,
    ) -> (SimulationState, usize) {
        let mut current = initial;
        for taken in 0..max_steps {
            let next = self.step(&current);
            let delta = Self::max_delta(&current, &next).expect("step preserves cell_count");
            current = next;
            if delta < threshold {
                return (current, taken + 1);
            }
        }
        (current, max_steps)
    }

    /// The largest per-cell absolute activation difference between two
    /// states of equal cell count.
    pub fn max_delta(a: &SimulationState, b: &SimulationState) -> Result<f64, SimulatorError> {
        if a.cell_count() != b.cell_count() {
            return Err(SimulatorError::CellCountMismatch {
                a: a.cell_count(),
                b: b.cell_count(),
            });
        }
        Ok(a.activations()
            .iter()
            .zip(b.activations())
            .map(|(x, y)| (x - y).abs())
            .fold(0.0, f64::max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::backend::CpuBackend;

    #[test]
    fn isolated_cell_retains_activation() {
        let state = SimulationState::try_new(vec![1.0, 0.0], vec![0, 0, 0], vec![], vec![], 0).unwrap();
        let sim = Simulator::new(CpuBackend::with_activation(|x| x));
        let next = sim.step(&state);
        assert_eq!(next.activations(), &[1.0, 0.0]);
        assert_eq!(next.step_number(), 1);
    }

    #[test]
    fn weighted_sum_with_identity_activation() {
        // A(3), B(7) --w=1.0--> C(0)
        let state = SimulationState::try_new(
            vec![3.0, 7.0, 0.0],
            vec![0, 0, 0, 2],
            vec![0, 1],
            vec![1.0, 1.0],
            0,
        )
        .unwrap();
        let sim = Simulator::new(CpuBackend::with_activation(|x| x));
        let next = sim.step(&state);
        assert_eq!(next.activations()[2], 10.0);
    }

    #[test]
    fn step_number_increments_by_one() {
        let state = SimulationState::try_new(vec![0.5], vec![0, 0], vec![], vec![], 7).unwrap();
        let sim = Simulator::new(CpuBackend::new());
        assert_eq!(sim.step(&state).step_number(), 8);
    }

    #[test]
    fn deterministic_for_identical_inputs() {
        let state = SimulationState::try_new(vec![0.5, -0.2], vec![0, 1, 2], vec![0], vec![0.5], 0).unwrap();
        let sim = Simulator::new(CpuBackend::new());
        let a = sim.step(&state);
        let b = sim.step(&state);
        assert_eq!(a.activations(), b.activations());
    }

    #[test]
    fn run_until_convergence_stops_early_for_stable_state() {
        let state = SimulationState::try_new(vec![0.0, 0.0], vec![0, 0, 0], vec![], vec![], 0).unwrap();
        let sim = Simulator::new(CpuBackend::new());
        let (final_state, steps) = sim.run_until_convergence(state, 1e-6, 100);
        assert_eq!(steps, 1);
        assert_eq!(final_state.activations(), &[0.0, 0.0]);
    }

    #[test]
    fn run_until_convergence_reaches_max_steps_when_oscillating() {
        // A -> B -> A, weight 1.0, tanh never settles below a tight threshold
        // starting far from the fixed point within very few steps.
        let state = SimulationState::try_new(vec![5.0, -5.0], vec![0, 1, 2], vec![1, 0], vec![1.0, 1.0], 0).unwrap();
        let sim = Simulator::new(CpuBackend::new());
        let (_, steps) = sim.run_until_convergence(state, 1e-12, 3);
        assert_eq!(steps, 3);
    }

    #[test]
    fn max_delta_rejects_cell_count_mismatch() {
        let a = SimulationState::try_new(vec![0.0], vec![0, 0], vec![], vec![], 0).unwrap();
        let b = SimulationState::try_new(vec![0.0, 0.0], vec![0, 0, 0], vec![], vec![], 0).unwrap();
        assert!(matches!(
            Simulator::<CpuBackend>::max_delta(&a, &b).unwrap_err(),
            SimulatorError::CellCountMismatch { a: 1, b: 2 }
        ));
    }
}
