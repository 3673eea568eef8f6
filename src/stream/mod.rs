//! Asynchronous, lazy, cancellation-aware thought-stream dataflow algebra

mod cancel;
mod cell;
mod ops;
mod thought;

pub use cancel::{CancellationToken, StreamError};
pub use cell::Cell;
pub use ops::{filter, from_iter, map, merge, of, split, Confluence};
pub use thought::Thought;
