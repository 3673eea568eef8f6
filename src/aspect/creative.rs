//! Concept extraction and connector-phrase rotation
//!
//! The rotation counter cycles a fixed connector list on every call, so
//! repeated output for the same input varies without any randomness.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::environment::Environment;
use crate::stream::{Cell, CancellationToken, Thought};
use crate::topology::Coordinate;

use super::{run_pipeline, Aspect, AspectCore, AspectError};

const CONNECTORS: [&str; 8] = [
    "reimagines",
    "refracts",
    "transmutes",
    "entangles",
    "distills",
    "unravels",
    "recomposes",
    "echoes",
];

pub struct CreativeAspect {
    core: AspectCore,
    rotation: AtomicUsize,
}

impl CreativeAspect {
    pub fn new() -> Self {
        Self {
            core: AspectCore::new("creative", "Creative", 1),
            rotation: AtomicUsize::new(0),
        }
    }

    fn concepts(input: &str) -> Vec<&str> {
        let mut words: Vec<&str> = input.split_whitespace().filter(|w| w.len() > 4).collect();
        words.sort_by_key(|w| std::cmp::Reverse(w.len()));
        words.truncate(3);
        words
    }

    fn next_connector(&self) -> &'static str {
        let idx = self.rotation.fetch_add(1, Ordering::Relaxed) % CONNECTORS.len();
        CONNECTORS[idx]
    }
}

impl Default for CreativeAspect {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Aspect for CreativeAspect {
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
        "You are a creative synthesis engine. Extract concepts and reframe the input imaginatively."
    }

    async fn transform_async(&self, input: &str, position: &Coordinate) -> Result<String, AspectError> {
        if let Some(environment) = self.core.environment().filter(|e| !e.is_local()) {
            let ctx = crate::environment::EnvironmentContext::new(self.aspect_id(), self.system_prompt());
            return Ok(environment.process(input, &ctx).await?);
        }
        Ok(self.transform_local(input, position))
    }

    fn transform_local(&self, input: &str, position: &Coordinate) -> String {
        let concepts = Self::concepts(input);
        let connector = self.next_connector();
        let concepts_text = if concepts.is_empty() {
            "the void".to_string()
        } else {
            concepts.join(", ")
        };
        format!(
            "[CREATIVE@{}] \"{}\" — this {} {}. Semantic depth: {} concepts extracted.",
            position,
            input,
            connector,
            concepts_text,
            concepts.len()
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
impl Cell<String, String> for CreativeAspect {
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
