//! Token/marker analysis
//!
//! Word iteration plus case-insensitive substring checks, rather than a
//! parser or regex engine.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::environment::Environment;
use crate::stream::{Cell, CancellationToken, Thought};
use crate::topology::Coordinate;

use super::{run_pipeline, Aspect, AspectCore, AspectError};

pub struct AnalyticalAspect {
    core: AspectCore,
}

impl AnalyticalAspect {
    pub fn new() -> Self {
        Self {
            core: AspectCore::new("analytical", "Analytical", 2),
        }
    }

    fn analyze(input: &str) -> String {
        let words: Vec<&str> = input.split_whitespace().collect();
        let tokens = words.len();
        let unique = {
            let mut set: Vec<&str> = Vec::new();
            for w in &words {
                let lower: &str = w;
                if !set.iter().any(|s: &&str| s.eq_ignore_ascii_case(lower)) {
                    set.push(w);
                }
            }
            set.len()
        };
        let avg_len = if tokens == 0 {
            0.0
        } else {
            words.iter().map(|w| w.len()).sum::<usize>() as f64 / tokens as f64
        };

        let lower = input.to_lowercase();
        let causal = lower.contains("because") || lower.contains("therefore") || lower.contains("thus");
        let conditional = lower.contains("if") || lower.contains("when");
        let interrogative = input.contains('?');

        format!(
            "tokens={} unique={} avg_len={:.1} causal={} conditional={} interrogative={}",
            tokens,
            unique,
            avg_len,
            capitalized_bool(causal),
            capitalized_bool(conditional),
            capitalized_bool(interrogative)
        )
    }
}

fn capitalized_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

impl Default for AnalyticalAspect {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Aspect for AnalyticalAspect {
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
        "You are an analytical reasoning engine. Extract structure and logical markers from the input."
    }

    async fn transform_async(&self, input: &str, position: &Coordinate) -> Result<String, AspectError> {
        if let Some(environment) = self.core.environment().filter(|e| !e.is_local()) {
            let ctx = crate::environment::EnvironmentContext::new(self.aspect_id(), self.system_prompt());
            return Ok(environment.process(input, &ctx).await?);
        }
        Ok(self.transform_local(input, position))
    }

    fn transform_local(&self, input: &str, position: &Coordinate) -> String {
        format!("[ANALYTICAL@{}] {} | {}", position, Self::analyze(input), input)
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
impl Cell<String, String> for AnalyticalAspect {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_causal_marker() {
        let out = AnalyticalAspect::analyze("because the sky is blue");
        assert!(out.contains("causal=True"));
    }

    #[test]
    fn detects_interrogative_marker() {
        let out = AnalyticalAspect::analyze("is this true?");
        assert!(out.contains("interrogative=True"));
    }

    #[test]
    fn counts_tokens_and_unique() {
        let out = AnalyticalAspect::analyze("the the cat sat");
        assert!(out.contains("tokens=4"));
        assert!(out.contains("unique=3"));
    }

    #[tokio::test]
    async fn transform_local_includes_position_and_input() {
        let aspect = AnalyticalAspect::new();
        let pos = Coordinate::new(vec![1, 0, 0]).unwrap();
        let out = aspect.transform_local("Because X, therefore Y", &pos);
        assert!(out.starts_with("[ANALYTICAL@(1,0,0)]"));
        assert!(out.ends_with("| Because X, therefore Y"));
    }
}
