//! Named, dimension-bound text transformers and their shared plumbing
//!
//! Tagged composition rather than a class hierarchy: a shared `AspectCore`
//! backs every concrete aspect with a common `id`/`name`/`activation` shape
//! behind one trait, so callers can address any aspect generically through
//! `Arc<dyn Aspect>` without downcasting.

mod analytical;
mod creative;
mod guardian;
mod synthesis;
mod temporal;

pub use analytical::AnalyticalAspect;
pub use creative::CreativeAspect;
pub use guardian::GuardianAspect;
pub use synthesis::SynthesisAspect;
pub use temporal::TemporalAspect;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use thiserror::Error;

use crate::environment::{Environment, EnvironmentError};
use crate::stream::{Cell, CancellationToken, Thought};
use crate::topology::Coordinate;

/// Errors raised during aspect binding and transformation.
#[derive(Debug, Error, Clone)]
pub enum AspectError {
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error("aspect operation cancelled")]
    Cancelled,
}

/// The behavioral contract shared by every aspect.
///
/// Every aspect is also a `Cell<String, String>` — the stream-processing
/// pipeline described in `run_pipeline` below — so the orchestrator can
/// drive a registered `Arc<dyn Aspect>` through its `process` method
/// directly, without downcasting to a concrete aspect type.
#[async_trait]
pub trait Aspect: Cell<String, String, Error = AspectError> + Send + Sync {
    fn aspect_id(&self) -> &str;
    fn name(&self) -> &str;
    /// Negative denotes "meta-dimensional": no axis projection, no
    /// synthesis edge.
    fn primary_dimension(&self) -> i64;
    fn system_prompt(&self) -> &str;

    /// Whether this payload should be transformed at all. Default always
    /// processes; e.g. Guardian skips whitespace-only payloads.
    fn should_process(&self, _payload: &str) -> bool {
        true
    }

    async fn transform_async(&self, input: &str, position: &Coordinate) -> Result<String, AspectError>;
    fn transform_local(&self, input: &str, position: &Coordinate) -> String;

    fn activation(&self) -> f64;
    fn processed_count(&self) -> u64;

    /// Bind the environment this aspect should delegate non-local
    /// transforms to. Invoked by the orchestrator before first use.
    fn bind(&self, environment: Arc<dyn Environment>);
}

/// The shared mutable state backing every concrete aspect.
pub(crate) struct AspectCore {
    id: String,
    name: String,
    primary_dimension: i64,
    processed_count: AtomicU64,
    activation: Mutex<f64>,
    environment: ArcSwapOption<EnvHandle>,
}

/// Sized wrapper around `Arc<dyn Environment>` so it can live behind
/// `ArcSwapOption`, which requires its pointee to be `Sized`.
struct EnvHandle(Arc<dyn Environment>);

impl AspectCore {
    pub(crate) fn new(id: impl Into<String>, name: impl Into<String>, primary_dimension: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            primary_dimension,
            processed_count: AtomicU64::new(0),
            activation: Mutex::new(0.0),
            environment: ArcSwapOption::from(None),
        }
    }

    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn primary_dimension(&self) -> i64 {
        self.primary_dimension
    }

    pub(crate) fn activation(&self) -> f64 {
        *self.activation.lock().expect("activation mutex poisoned")
    }

    pub(crate) fn set_activation(&self, value: f64) {
        *self.activation.lock().expect("activation mutex poisoned") = value;
    }

    pub(crate) fn processed_count(&self) -> u64 {
        self.processed_count.load(Ordering::Relaxed)
    }

    pub(crate) fn increment_processed(&self) -> u64 {
        self.processed_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn bind(&self, environment: Arc<dyn Environment>) {
        self.environment.store(Some(Arc::new(EnvHandle(environment))));
    }

    pub(crate) fn environment(&self) -> Option<Arc<dyn Environment>> {
        self.environment.load_full().map(|h| h.0.clone())
    }
}

/// If `s` is longer than `max_len`, clip it and append `"..."`.
///
/// Shared by every aspect that truncates prior context, rather than
/// duplicating the same slice-and-append logic five times.
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.len() > max_len {
        format!("{}...", &s[..max_len])
    } else {
        s.to_string()
    }
}

/// The `Cell` behavior shared by every aspect: marks itself active, filters
/// via `should_process`, transforms (environment-aware), attaches metadata,
/// resets activation on completion. Each concrete aspect's `Cell` impl
/// delegates here, passing its own core for the activation/counter mutation
/// that `Aspect`'s public interface deliberately keeps read-only.
///
/// A transform failure aborts the pipeline immediately and propagates the
/// error to the caller, discarding whatever partial outputs were collected
/// so far — it is never silently downgraded into a short output stream.
/// Cancellation, by contrast, is not an error: it ends the loop early and
/// returns whatever was already produced.
pub(crate) async fn run_pipeline(
    core: &AspectCore,
    aspect: &(dyn Aspect + Send + Sync),
    mut input: BoxStream<'_, Thought<String>>,
    position: Coordinate,
    cancel: CancellationToken,
) -> Result<BoxStream<'static, Thought<String>>, AspectError> {
    let mut outputs = Vec::new();
    core.set_activation(1.0);

    while let Some(thought) = input.next().await {
        if cancel.is_cancelled() {
            break;
        }
        if !aspect.should_process(&thought.payload) {
            outputs.push(thought);
            continue;
        }
        let transformed = match aspect.transform_async(&thought.payload, &position).await {
            Ok(text) => text,
            Err(err) => {
                core.set_activation(0.0);
                return Err(err);
            }
        };
        core.increment_processed();

        let mut metadata = std::collections::HashMap::new();
        metadata.insert("aspect".to_string(), serde_json::json!(core.id()));
        metadata.insert("aspect_name".to_string(), serde_json::json!(core.name()));
        metadata.insert(
            "environment_name".to_string(),
            serde_json::json!(core.environment().map(|e| e.name().to_string())),
        );
        metadata.insert(
            "source_origin".to_string(),
            serde_json::json!(thought.origin.to_string()),
        );

        let mut out = thought.map(|_| transformed);
        out.metadata = Some(metadata);
        outputs.push(out);
    }

    core.set_activation(0.0);
    Ok(futures::stream::iter(outputs).boxed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_passes_short_strings_through() {
        assert_eq!(truncate("short", 60), "short");
    }

    #[test]
    fn truncate_clips_and_appends_ellipsis() {
        let long = "a".repeat(100);
        let truncated = truncate(&long, 10);
        assert_eq!(truncated, format!("{}...", "a".repeat(10)));
    }
}
