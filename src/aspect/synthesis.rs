//! Meta-dimensional tag-line merge and fan-in synthesis

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::environment::Environment;
use crate::stream::{Cell, CancellationToken, Thought};
use crate::topology::Coordinate;

use super::{run_pipeline, truncate, Aspect, AspectCore, AspectError};

pub struct SynthesisAspect {
    core: AspectCore,
    truncate_max_len: usize,
}

impl SynthesisAspect {
    pub fn new(truncate_max_len: usize) -> Self {
        Self {
            core: AspectCore::new("synthesis", "Synthesis", -1),
            truncate_max_len,
        }
    }

    /// Splits a `[TAG@pos] rest` line into its tag and remainder.
    fn parse_tagged_line(line: &str) -> Option<(&str, &str)> {
        let rest = line.strip_prefix('[')?;
        let at = rest.find('@')?;
        let close = rest.find(']')?;
        if at > close {
            return None;
        }
        let tag = &rest[..at];
        let body = rest.get(close + 1..)?.trim_start_matches(' ');
        Some((tag, body))
    }

    fn merge_lines(&self, input: &str) -> String {
        let lines: Vec<&str> = input.lines().filter(|l| !l.is_empty()).collect();
        if lines.len() <= 1 {
            return format!("Unified: {input}");
        }
        let merged: Vec<String> = lines
            .iter()
            .map(|line| match Self::parse_tagged_line(line) {
                Some((tag, body)) => format!("  {}: {}", tag, truncate(body, self.truncate_max_len)),
                None => format!("  {}", truncate(line, self.truncate_max_len)),
            })
            .collect();
        format!("Converged {} streams:\n{}", lines.len(), merged.join("\n"))
    }

    /// Joins per-aspect outputs and delegates to the environment when bound
    /// to a non-local one; falls back to the local merge otherwise.
    pub async fn synthesize_async(&self, outputs: &[String], position: &Coordinate) -> Result<String, AspectError> {
        let joined = outputs.join("\n");
        self.transform_async(&joined, position).await
    }
}

impl Default for SynthesisAspect {
    fn default() -> Self {
        Self::new(60)
    }
}

#[async_trait]
impl Aspect for SynthesisAspect {
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
        "You merge the outputs of every aspect into one coherent synthesis."
    }

    async fn transform_async(&self, input: &str, position: &Coordinate) -> Result<String, AspectError> {
        if let Some(environment) = self.core.environment().filter(|e| !e.is_local()) {
            let ctx = crate::environment::EnvironmentContext::new(self.aspect_id(), self.system_prompt());
            return Ok(environment.process(input, &ctx).await?);
        }
        Ok(self.transform_local(input, position))
    }

    fn transform_local(&self, input: &str, position: &Coordinate) -> String {
        format!("[SYNTHESIS@{}] {}", position, self.merge_lines(input))
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
impl Cell<String, String> for SynthesisAspect {
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
    fn single_line_is_unified() {
        let merged = SynthesisAspect::new(60).merge_lines("just one line");
        assert_eq!(merged, "Unified: just one line");
    }

    #[test]
    fn tagged_lines_are_extracted_by_tag() {
        let input = "[ANALYTICAL@(0,0,1)] tokens=3 | hi\n[GUARDIAN@(1,0,0)] PASSED | hi";
        let merged = SynthesisAspect::new(60).merge_lines(input);
        assert!(merged.starts_with("Converged 2 streams:"));
        assert!(merged.contains("ANALYTICAL: tokens=3 | hi"));
        assert!(merged.contains("GUARDIAN: PASSED | hi"));
    }

    #[tokio::test]
    async fn synthesize_async_joins_and_merges_outputs() {
        let aspect = SynthesisAspect::new(60);
        let pos = Coordinate::new(vec![0, 0, 0]).unwrap();
        let outputs = vec![
            "[ANALYTICAL@(0,0,1)] tokens=2 | hi there".to_string(),
            "[CREATIVE@(0,1,0)] \"hi there\" — this echoes the void.".to_string(),
        ];
        let merged = aspect.synthesize_async(&outputs, &pos).await.unwrap();
        assert!(merged.starts_with("[SYNTHESIS@(0,0,0)] Converged 2 streams:"));
    }
}
