//! Pluggable simulator backends
//!
//! One trait defines the activation seam, one concrete implementation
//! (`CpuBackend`) ships in this crate. A GPU backend would implement the
//! same trait without touching the propagation kernel.

/// The activation function and identity of a simulator backend.
pub trait SimulatorBackend: Send + Sync {
    /// A human-readable backend name, e.g. `"CPU"`.
    fn name(&self) -> &str;

    /// The nonlinearity applied to a cell's weighted incoming sum.
    fn activate(&self, x: f64) -> f64;
}

/// The default CPU backend. Uses `tanh` unless constructed with an override.
pub struct CpuBackend {
    activation: Box<dyn Fn(f64) -> f64 + Send + Sync>,
}

impl CpuBackend {
    /// The default backend: `tanh` activation.
    pub fn new() -> Self {
        Self {
            activation: Box::new(f64::tanh),
        }
    }

    /// Construct a CPU backend with a custom activation function — useful in
    /// tests that want an identity or linear activation to make propagation
    /// arithmetic easy to check by hand.
    pub fn with_activation(f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Self {
            activation: Box::new(f),
        }
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatorBackend for CpuBackend {
    fn name(&self) -> &str {
        "CPU"
    }

    fn activate(&self, x: f64) -> f64 {
        (self.activation)(x)
    }
}

impl SimulatorBackend for Box<dyn SimulatorBackend> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn activate(&self, x: f64) -> f64 {
        (**self).activate(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_backend_is_named_cpu() {
        assert_eq!(CpuBackend::new().name(), "CPU");
    }

    #[test]
    fn default_activation_is_tanh() {
        let backend = CpuBackend::new();
        assert_eq!(backend.activate(0.5), 0.5f64.tanh());
    }

    #[test]
    fn identity_override_is_honored() {
        let backend = CpuBackend::with_activation(|x| x);
        assert_eq!(backend.activate(3.0), 3.0);
    }
}
