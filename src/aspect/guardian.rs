//! Coherence scoring and block/pass gating

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::environment::Environment;
use crate::stream::{Cell, CancellationToken, Thought};
use crate::topology::Coordinate;

use super::{run_pipeline, Aspect, AspectCore, AspectError};

pub struct GuardianAspect {
    core: AspectCore,
    threshold: f64,
    blocked_count: AtomicU64,
}

impl GuardianAspect {
    pub fn new(threshold: f64) -> Self {
        Self {
            core: AspectCore::new("guardian", "Guardian", 0),
            threshold,
            blocked_count: AtomicU64::new(0),
        }
    }

    pub fn blocked_count(&self) -> u64 {
        self.blocked_count.load(Ordering::Relaxed)
    }

    fn coherence(input: &str) -> f64 {
        let words: Vec<&str> = input.split_whitespace().collect();
        if words.is_empty() {
            return 0.0;
        }
        let long_fraction = words.iter().filter(|w| w.len() > 2).count() as f64 / words.len() as f64;
        let avg_len = words.iter().map(|w| w.len()).sum::<usize>() as f64 / words.len() as f64;
        0.6 * long_fraction + 0.4 * (avg_len / 8.0).min(1.0)
    }
}

impl Default for GuardianAspect {
    fn default() -> Self {
        Self::new(0.3)
    }
}

#[async_trait]
impl Aspect for GuardianAspect {
    fn aspect_id(&self) -> &str {
        self.core.id()
    }

    fn name(&self) -> &str {
        self.core.name()
    }

    fn primary_dimension(&self) -> i64 {
        self.core.primary_dimension()
    }

    fn system_prompt(&self) -> &str {
        "You are a coherence guardian. Assess whether the input is well-formed before it propagates."
    }

    fn should_process(&self, payload: &str) -> bool {
        !payload.trim().is_empty()
    }

    async fn transform_async(&self, input: &str, position: &Coordinate) -> Result<String, AspectError> {
        if let Some(environment) = self.core.environment().filter(|e| !e.is_local()) {
            let ctx = crate::environment::EnvironmentContext::new(self.aspect_id(), self.system_prompt());
            return Ok(environment.process(input, &ctx).await?);
        }
        Ok(self.transform_local(input, position))
    }

    fn transform_local(&self, input: &str, position: &Coordinate) -> String {
        let coherence = Self::coherence(input);
        if coherence < self.threshold {
            self.blocked_count.fetch_add(1, Ordering::Relaxed);
            format!(
                "[GUARDIAN@{}] BLOCKED coherence={:.2} below threshold={:.2} | {}",
                position, coherence, self.threshold, input
            )
        } else {
            format!("[GUARDIAN@{}] PASSED coherence={:.2} | {}", position, coherence, input)
        }
    }

    fn activation(&self) -> f64 {
        self.core.activation()
    }

    fn processed_count(&self) -> u64 {
        self.core.processed_count()
    }

    fn bind(&self, environment: Arc<dyn Environment>) {
        self.core.bind(environment);
    }
}

#[async_trait]
impl Cell<String, String> for GuardianAspect {
    type Error = AspectError;

    async fn process(
        &self,
        input: BoxStream<'_, Thought<String>>,
        position: Coordinate,
        cancel: CancellationToken,
    ) -> Result<BoxStream<'static, Thought<String>>, AspectError> {
        run_pipeline(&self.core, self, input, position, cancel).await
    }
}
