//! Runtime configuration for the convergence engine
//!
//! A plain struct with a `new()` default and named knobs, plus a `from_env()`
//! constructor that overlays `HYPERGRID_*` environment variables on top of
//! the defaults.

/// Tunable knobs for aspects and the convergence loop.
#[derive(Debug, Clone)]
pub struct HypergridConfig {
    /// Sliding window size for `TemporalAspect`.
    pub temporal_window_size: usize,
    /// Minimum coherence for `GuardianAspect` to pass a payload.
    pub guardian_threshold: f64,
    /// Convergence delta threshold for `Convergence::think`'s propagation step.
    pub convergence_threshold: f64,
    /// Maximum propagation steps for `Convergence::think`.
    pub convergence_max_steps: usize,
    /// Maximum character length before truncation helpers clip a string.
    pub truncate_max_len: usize,
}

impl HypergridConfig {
    pub fn new() -> Self {
        Self {
            temporal_window_size: 5,
            guardian_threshold: 0.3,
            convergence_threshold: 1e-4,
            convergence_max_steps: 50,
            truncate_max_len: 60,
        }
    }

    /// Overlay `HYPERGRID_*` environment variables on top of the defaults.
    /// Unset or unparsable variables fall back to the default silently.
    pub fn from_env() -> Self {
        let defaults = Self::new();
        Self {
            temporal_window_size: env_usize("HYPERGRID_TEMPORAL_WINDOW_SIZE")
                .unwrap_or(defaults.temporal_window_size),
            guardian_threshold: env_f64("HYPERGRID_GUARDIAN_THRESHOLD")
                .unwrap_or(defaults.guardian_threshold),
            convergence_threshold: env_f64("HYPERGRID_CONVERGENCE_THRESHOLD")
                .unwrap_or(defaults.convergence_threshold),
            convergence_max_steps: env_usize("HYPERGRID_CONVERGENCE_MAX_STEPS")
                .unwrap_or(defaults.convergence_max_steps),
            truncate_max_len: env_usize("HYPERGRID_TRUNCATE_MAX_LEN")
                .unwrap_or(defaults.truncate_max_len),
        }
    }
}

impl Default for HypergridConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn env_usize(key: &str) -> Option<usize> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_f64(key: &str) -> Option<f64> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_values() {
        let config = HypergridConfig::new();
        assert_eq!(config.temporal_window_size, 5);
        assert_eq!(config.guardian_threshold, 0.3);
        assert_eq!(config.convergence_threshold, 1e-4);
        assert_eq!(config.convergence_max_steps, 50);
    }

    #[test]
    fn from_env_falls_back_to_defaults_when_unset() {
        std::env::remove_var("HYPERGRID_TEMPORAL_WINDOW_SIZE");
        let config = HypergridConfig::from_env();
        assert_eq!(config.temporal_window_size, 5);
    }

    #[test]
    fn from_env_honors_overrides() {
        std::env::set_var("HYPERGRID_TEMPORAL_WINDOW_SIZE", "9");
        let config = HypergridConfig::from_env();
        assert_eq!(config.temporal_window_size, 9);
        std::env::remove_var("HYPERGRID_TEMPORAL_WINDOW_SIZE");
    }
}
