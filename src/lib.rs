//! Hypergrid: N-dimensional graph-activation engine
//!
//! A CSR-encoded activation propagation simulator wired to a pluggable set
//! of text-transforming "aspects," coordinated by an asynchronous
//! thought-stream dataflow algebra.
//!
//! # Core concepts
//!
//! - **Topology**: an N-dimensional coordinate space (`HypergridSpace`) of
//!   cells connected by directed, weighted edges.
//! - **Simulator**: a CSR-encoded propagation kernel over that space, with a
//!   pluggable activation backend and a bounded convergence loop.
//! - **Aspects**: named, dimension-bound text transformers (`Analytical`,
//!   `Creative`, `Guardian`, `Temporal`, `Synthesis`) driven by the stream
//!   algebra.
//! - **Convergence**: the orchestrator that fans input out to every
//!   registered aspect, propagates activation across the topology, and
//!   fans the results back in through synthesis.
//!
//! # Example
//!
//! ```
//! use hypergrid::Convergence;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mut convergence = Convergence::create(None, None).unwrap();
//! let thought = convergence.think("Because X, therefore Y").await.unwrap();
//! assert!(thought.payload.contains("SYNTHESIS"));
//! # }
//! ```

pub mod aspect;
pub mod config;
pub mod convergence;
pub mod environment;
pub mod simulator;
pub mod stream;
pub mod topology;

pub use aspect::{
    Aspect, AspectError, AnalyticalAspect, CreativeAspect, GuardianAspect, SynthesisAspect, TemporalAspect,
};
pub use config::HypergridConfig;
pub use convergence::{Convergence, ConvergenceError};
pub use environment::{Environment, EnvironmentContext, EnvironmentError, LocalEnvironment};
pub use simulator::{CpuBackend, GridStateBuilder, SimulationState, Simulator, SimulatorBackend, SimulatorError};
pub use stream::{filter, from_iter, map, merge, of, split, CancellationToken, Cell, Confluence, StreamError, Thought};
pub use topology::{Coordinate, DimensionDescriptor, Edge, GridCell, GridCellState, HypergridSpace, TopologyError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
