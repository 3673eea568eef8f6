//! The generic stream-in/stream-out processing stage at a grid position
//!
//! Cells are data-flow stages, not graph-mutation emitters: a cell consumes
//! a stream of thoughts and produces one, rather than writing into a shared
//! sink.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::topology::Coordinate;

use super::cancel::CancellationToken;
use super::thought::Thought;

/// A processing stage positioned at a coordinate in the space.
///
/// Output thoughts preserve arrival order per input thought. Cancellation
/// must terminate promptly (returning whatever was produced before the
/// cancellation was observed, not an error). A per-thought processing
/// failure is a genuine error and propagates via `Self::Error` rather than
/// being swallowed into a short output stream. Cells may hold private
/// mutable state; a single `Convergence` is assumed to be the only consumer
/// of any given cell.
#[async_trait]
pub trait Cell<In, Out>: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn process(
        &self,
        input: BoxStream<'_, Thought<In>>,
        position: Coordinate,
        cancel: CancellationToken,
    ) -> Result<BoxStream<'static, Thought<Out>>, Self::Error>;
}
