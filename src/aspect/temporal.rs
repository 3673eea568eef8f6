//! Bounded sliding window over recent inputs

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::environment::Environment;
use crate::stream::{Cell, CancellationToken, Thought};
use crate::topology::Coordinate;

use super::{run_pipeline, truncate, Aspect, AspectCore, AspectError};

pub struct TemporalAspect {
    core: AspectCore,
    window_size: usize,
    truncate_max_len: usize,
    step: AtomicU64,
    window: Mutex<VecDeque<String>>,
}

impl TemporalAspect {
    pub fn new(window_size: usize, truncate_max_len: usize) -> Self {
        Self {
            core: AspectCore::new("temporal", "Temporal", 0),
            window_size,
            truncate_max_len,
            step: AtomicU64::new(0),
            window: Mutex::new(VecDeque::with_capacity(window_size)),
        }
    }

    /// The current window contents, oldest first.
    pub fn context(&self) -> Vec<String> {
        self.window.lock().expect("window mutex poisoned").iter().cloned().collect()
    }
}

impl Default for TemporalAspect {
    fn default() -> Self {
        Self::new(5, 60)
    }
}

#[async_trait]
impl Aspect for TemporalAspect {
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
        "You track the recent conversation history and situate each input within it."
    }

    async fn transform_async(&self, input: &str, position: &Coordinate) -> Result<String, AspectError> {
        if let Some(environment) = self.core.environment().filter(|e| !e.is_local()) {
            let ctx = crate::environment::EnvironmentContext::new(self.aspect_id(), self.system_prompt());
            return Ok(environment.process(input, &ctx).await?);
        }
        Ok(self.transform_local(input, position))
    }

    fn transform_local(&self, input: &str, position: &Coordinate) -> String {
        let ctx_len = {
            let mut window = self.window.lock().expect("window mutex poisoned");
            window.push_back(input.to_string());
            while window.len() > self.window_size {
                window.pop_front();
            }
            window.len()
        };

        let step = self.step.fetch_add(1, Ordering::Relaxed) + 1;

        let middle = if ctx_len <= 1 {
            "(initial)".to_string()
        } else {
            let window = self.window.lock().expect("window mutex poisoned");
            let prior = &window[ctx_len - 2];
            format!("prior=\"{}\"", truncate(prior, self.truncate_max_len))
        };

        format!(
            "[TEMPORAL@{}] step={} context={}/{} {} | {}",
            position, step, ctx_len, self.window_size, middle, input
        )
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
impl Cell<String, String> for TemporalAspect {
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
