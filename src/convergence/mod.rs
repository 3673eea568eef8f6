//! Registers aspects, runs fan-out + activation propagation + fan-in
//! synthesis for a single input — the one full cycle of the engine.
//!
//! Fan-out is a sequential loop over every registered aspect in
//! registration order; a per-thought transform error terminates the whole
//! cycle rather than being isolated per aspect.

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{BoxStream, StreamExt};
use indexmap::IndexMap;
use thiserror::Error;
use uuid::Uuid;

use crate::aspect::{
    Aspect, AspectError, AnalyticalAspect, CreativeAspect, GuardianAspect, SynthesisAspect, TemporalAspect,
};
use crate::config::HypergridConfig;
use crate::environment::{Environment, LocalEnvironment};
use crate::simulator::{CpuBackend, GridStateBuilder, Simulator, SimulatorBackend, SimulatorError};
use crate::stream::{Cell, CancellationToken, Thought};
use crate::topology::{Coordinate, DimensionDescriptor, HypergridSpace, TopologyError};

/// Errors raised by the orchestrator.
#[derive(Debug, Error)]
pub enum ConvergenceError {
    #[error("unknown aspect id: {0}")]
    UnknownAspect(String),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Simulator(#[from] SimulatorError),

    #[error(transparent)]
    Aspect(#[from] AspectError),
}

/// Owns the space, the bound environment, the simulator, and every
/// registered aspect; runs one convergence cycle per `think` call.
pub struct Convergence {
    space: HypergridSpace,
    environment: Arc<dyn Environment>,
    simulator: Simulator<Box<dyn SimulatorBackend>>,
    aspects: IndexMap<String, Arc<dyn Aspect>>,
    synthesis_position: Coordinate,
    synthesis: Arc<SynthesisAspect>,
    config: HypergridConfig,
}

impl Convergence {
    /// Build a convergence engine with the four standard aspects already
    /// registered over a `{temporal, semantic, causal}` 3-D space.
    pub fn create(
        environment: Option<Arc<dyn Environment>>,
        simulator: Option<Simulator<Box<dyn SimulatorBackend>>>,
    ) -> Result<Self, ConvergenceError> {
        let environment = environment.unwrap_or_else(|| Arc::new(LocalEnvironment));
        let simulator = simulator
            .unwrap_or_else(|| Simulator::new(Box::new(CpuBackend::new()) as Box<dyn SimulatorBackend>));
        let config = HypergridConfig::from_env();

        let dimensions = vec![
            DimensionDescriptor::new(0, "temporal", "recency axis"),
            DimensionDescriptor::new(1, "semantic", "meaning axis"),
            DimensionDescriptor::new(2, "causal", "reasoning axis"),
        ];
        let synthesis_position = Coordinate::new(vec![0, 0, 0])?;
        let mut space = HypergridSpace::new(dimensions)?;
        space.add_cell(synthesis_position.clone(), "synthesis")?;

        let synthesis = Arc::new(SynthesisAspect::new(config.truncate_max_len));

        let mut convergence = Self {
            space,
            environment,
            simulator,
            aspects: IndexMap::new(),
            synthesis_position,
            synthesis,
            config,
        };

        convergence.register_aspect(Arc::new(AnalyticalAspect::new()), Coordinate::new(vec![0, 0, 1])?)?;
        convergence.register_aspect(Arc::new(CreativeAspect::new()), Coordinate::new(vec![0, 1, 0])?)?;
        convergence.register_aspect(
            Arc::new(GuardianAspect::new(convergence.config.guardian_threshold)),
            Coordinate::new(vec![1, 0, 0])?,
        )?;
        convergence.register_aspect(
            Arc::new(TemporalAspect::new(
                convergence.config.temporal_window_size,
                convergence.config.truncate_max_len,
            )),
            Coordinate::new(vec![2, 0, 0])?,
        )?;

        Ok(convergence)
    }

    /// Binds the environment, records the cell, and — unless the aspect is
    /// meta-dimensional — wires an edge from the aspect's position to the
    /// synthesis position on the aspect's primary dimension.
    pub fn register_aspect(&mut self, aspect: Arc<dyn Aspect>, position: Coordinate) -> Result<(), ConvergenceError> {
        aspect.bind(self.environment.clone());
        self.aspects.insert(aspect.aspect_id().to_string(), aspect.clone());
        self.space.add_cell(position.clone(), aspect.aspect_id())?;
        if aspect.primary_dimension() >= 0 {
            self.space
                .connect(position, self.synthesis_position.clone(), aspect.primary_dimension() as usize, None);
        }
        Ok(())
    }

    /// Runs one full fan-out / propagate / fan-in cycle over `input`.
    pub async fn think(&mut self, input: &str) -> Result<Thought<String>, ConvergenceError> {
        self.synthesis.bind(self.environment.clone());

        let trace_id = Uuid::new_v4();
        let input_thought = Thought::new(input.to_string(), self.synthesis_position.clone()).with_trace_id(trace_id);

        let mut outputs: Vec<String> = Vec::with_capacity(self.aspects.len());
        let mut activation_by_id: HashMap<String, f64> = HashMap::with_capacity(self.aspects.len());

        for (id, aspect) in &self.aspects {
            let thought_clone = input_thought.clone();
            let singleton: BoxStream<'_, Thought<String>> =
                futures::stream::once(async move { thought_clone }).boxed();
            let position = self
                .space
                .cells()
                .find(|(_, cell)| cell.node_id == *id)
                .map(|(pos, _)| pos.clone())
                .unwrap_or_else(|| self.synthesis_position.clone());

            let mut result = aspect.process(singleton, position, CancellationToken::new()).await?;
            while let Some(thought) = result.next().await {
                outputs.push(thought.payload);
            }
            activation_by_id.insert(id.clone(), aspect.activation());
        }

        let state = GridStateBuilder::build(&self.space, |cell| {
            activation_by_id.get(&cell.node_id).copied().unwrap_or(0.0)
        });

        let mut convergence_steps: Option<usize> = None;
        if state.cell_count() > 0 && state.edge_count() > 0 {
            let (_, steps) = self.simulator.run_until_convergence(
                state,
                self.config.convergence_threshold,
                self.config.convergence_max_steps,
            );
            convergence_steps = Some(steps);
        }

        let merged = self
            .synthesis
            .synthesize_async(&outputs, &self.synthesis_position)
            .await?;

        let mut metadata = HashMap::new();
        metadata.insert("convergent".to_string(), serde_json::json!(true));
        metadata.insert("aspects_count".to_string(), serde_json::json!(self.aspects.len()));
        metadata.insert(
            "compute_backend".to_string(),
            serde_json::json!(self.simulator.backend().name()),
        );
        metadata.insert("environment_name".to_string(), serde_json::json!(self.environment.name()));
        if let Some(steps) = convergence_steps {
            metadata.insert("convergence_steps".to_string(), serde_json::json!(steps));
        }

        Ok(Thought::new(merged, self.synthesis_position.clone())
            .with_trace_id(trace_id)
            .with_metadata(metadata))
    }

    /// Resolve `id` and run its local transform synchronously.
    pub fn query_aspect(&self, id: &str, input: &str) -> Result<String, ConvergenceError> {
        let aspect = self
            .aspects
            .get(id)
            .ok_or_else(|| ConvergenceError::UnknownAspect(id.to_string()))?;
        Ok(aspect.transform_local(input, &self.synthesis_position))
    }

    /// Resolve `id` and run its environment-aware transform.
    pub async fn query_aspect_async(&self, id: &str, input: &str) -> Result<String, ConvergenceError> {
        let aspect = self
            .aspects
            .get(id)
            .ok_or_else(|| ConvergenceError::UnknownAspect(id.to_string()))?;
        Ok(aspect.transform_async(input, &self.synthesis_position).await?)
    }

    /// Runs `think` once per inbound thought, yielding each result as it
    /// completes.
    pub fn think_stream<'a>(
        &'a mut self,
        input: impl futures::Stream<Item = Thought<String>> + Send + 'a,
    ) -> impl futures::Stream<Item = Result<Thought<String>, ConvergenceError>> + 'a {
        async_stream::stream! {
            futures::pin_mut!(input);
            while let Some(thought) = input.next().await {
                yield self.think(&thought.payload).await;
            }
        }
    }

    pub fn aspect_ids(&self) -> Vec<&str> {
        self.aspects.keys().map(|s| s.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_registers_four_standard_aspects() {
        let convergence = Convergence::create(None, None).unwrap();
        assert_eq!(convergence.aspect_ids().len(), 4);
    }

    #[tokio::test]
    async fn think_returns_convergent_synthesis_with_all_tags() {
        let mut convergence = Convergence::create(None, None).unwrap();
        let thought = convergence.think("Because X, therefore Y").await.unwrap();
        assert!(thought.payload.contains("SYNTHESIS"));
        for tag in ["ANALYTICAL", "CREATIVE", "GUARDIAN", "TEMPORAL"] {
            assert!(thought.payload.contains(tag), "missing tag {tag}");
        }
        assert!(thought.payload.contains("causal=True"));
        let metadata = thought.metadata.unwrap();
        assert_eq!(metadata["aspects_count"], serde_json::json!(4));
        assert_eq!(metadata["convergent"], serde_json::json!(true));
    }

    #[tokio::test]
    async fn query_aspect_rejects_unknown_id() {
        let convergence = Convergence::create(None, None).unwrap();
        assert!(matches!(
            convergence.query_aspect("nonexistent", "hi"),
            Err(ConvergenceError::UnknownAspect(_))
        ));
    }

    #[tokio::test]
    async fn query_aspect_resolves_registered_id() {
        let convergence = Convergence::create(None, None).unwrap();
        let out = convergence.query_aspect("guardian", "a coherent enough sentence here").unwrap();
        assert!(out.contains("GUARDIAN"));
    }
}
