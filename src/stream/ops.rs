//! Lazy, cancellation-aware combinators over `Stream<Item = Thought<T>>`
//!
//! Built on `futures::Stream`, `async-stream`, and `tokio-stream` — the same
//! trio used elsewhere in the retrieval pack for hand-rolled async dataflow
//! (`tokio_stream::wrappers::ReceiverStream` fronting an `mpsc` channel).

use futures::stream::{BoxStream, StreamExt};
use futures::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::cancel::CancellationToken;
use super::thought::Thought;

/// A stream yielding a single thought.
pub fn of<T: Send + 'static>(thought: Thought<T>) -> impl Stream<Item = Thought<T>> {
    futures::stream::once(async move { thought })
}

/// A stream yielding every thought in `iter`, in order.
pub fn from_iter<T: Send + 'static, I>(iter: I) -> impl Stream<Item = Thought<T>>
where
    I: IntoIterator<Item = Thought<T>>,
    I::IntoIter: Send + 'static,
{
    futures::stream::iter(iter)
}

/// Transforms each thought's payload, preserving every other field.
pub fn map<T, U>(
    source: impl Stream<Item = Thought<T>> + Send + 'static,
    mut f: impl FnMut(T) -> U + Send + 'static,
) -> impl Stream<Item = Thought<U>>
where
    T: Send + 'static,
    U: Send + 'static,
{
    source.map(move |thought| thought.map(&mut f))
}

/// Keeps only thoughts whose payload satisfies `predicate`.
pub fn filter<T>(
    source: impl Stream<Item = Thought<T>> + Send + 'static,
    predicate: impl Fn(&T) -> bool + Send + 'static,
) -> impl Stream<Item = Thought<T>>
where
    T: Send + 'static,
{
    source.filter(move |thought| {
        let keep = predicate(&thought.payload);
        async move { keep }
    })
}

/// Unordered interleave of every source stream. Completes once all sources
/// complete. Sources are polled concurrently, so a pending source never
/// blocks a ready one from being yielded. Checks `cancel` before yielding
/// each item and stops emitting as soon as cancellation is observed.
pub fn merge<T>(
    sources: Vec<BoxStream<'static, Thought<T>>>,
    cancel: CancellationToken,
) -> impl Stream<Item = Thought<T>>
where
    T: Send + 'static,
{
    async_stream::stream! {
        let mut combined = futures::stream::select_all(sources);
        while let Some(thought) = combined.next().await {
            if cancel.check().is_err() {
                tracing::debug!("merge cancelled");
                break;
            }
            yield thought;
        }
    }
}

/// Splits `source` into two streams by `predicate`, run from a single
/// background task. Conservation law: every thought from `source` appears
/// in exactly one of the two output streams.
pub fn split<T>(
    mut source: BoxStream<'static, Thought<T>>,
    predicate: impl Fn(&T) -> bool + Send + 'static,
    cancel: CancellationToken,
) -> (BoxStream<'static, Thought<T>>, BoxStream<'static, Thought<T>>)
where
    T: Send + 'static,
{
    let (matching_tx, matching_rx) = mpsc::channel(32);
    let (non_matching_tx, non_matching_rx) = mpsc::channel(32);

    tokio::spawn(async move {
        while let Some(thought) = source.next().await {
            if cancel.check().is_err() {
                break;
            }
            let sent = if predicate(&thought.payload) {
                matching_tx.send(thought).await
            } else {
                non_matching_tx.send(thought).await
            };
            if sent.is_err() {
                break;
            }
        }
    });

    (
        ReceiverStream::new(matching_rx).boxed(),
        ReceiverStream::new(non_matching_rx).boxed(),
    )
}

/// A fluent accumulator of heterogeneous sources that can be merged or
/// pulled from in a synchronized round.
pub struct Confluence<T> {
    sources: Vec<BoxStream<'static, Thought<T>>>,
}

impl<T: Send + 'static> Confluence<T> {
    pub fn new() -> Self {
        Self { sources: Vec::new() }
    }

    pub fn add(&mut self, source: impl Stream<Item = Thought<T>> + Send + 'static) {
        self.sources.push(source.boxed());
    }

    /// Equivalent to `merge` over every registered source.
    pub fn emit(self, cancel: CancellationToken) -> impl Stream<Item = Thought<T>> {
        merge(self.sources, cancel)
    }

    /// Pulls exactly one thought from each registered source, in
    /// registration order. Sources that complete without producing
    /// contribute nothing and never block the others.
    pub async fn collect_first(self) -> Vec<Thought<T>> {
        let mut out = Vec::with_capacity(self.sources.len());
        for mut source in self.sources {
            if let Some(thought) = source.next().await {
                out.push(thought);
            }
        }
        out
    }
}

impl<T: Send + 'static> Default for Confluence<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::Coordinate;

    fn thought(payload: i32) -> Thought<i32> {
        Thought::new(payload, Coordinate::scalar(0))
    }

    #[tokio::test]
    async fn map_transforms_every_payload() {
        let source = from_iter(vec![thought(1), thought(2), thought(3)]);
        let mapped: Vec<_> = map(source, |x| x * 10).collect().await;
        let payloads: Vec<_> = mapped.into_iter().map(|t| t.payload).collect();
        assert_eq!(payloads, vec![10, 20, 30]);
    }

    #[tokio::test]
    async fn filter_keeps_matching_only() {
        let source = from_iter(vec![thought(1), thought(2), thought(3), thought(4)]);
        let filtered: Vec<_> = filter(source, |x| x % 2 == 0).collect().await;
        let payloads: Vec<_> = filtered.into_iter().map(|t| t.payload).collect();
        assert_eq!(payloads, vec![2, 4]);
    }

    #[tokio::test]
    async fn merge_yields_every_item_from_every_source() {
        let a: BoxStream<'static, Thought<i32>> = from_iter(vec![thought(1), thought(2)]).boxed();
        let b: BoxStream<'static, Thought<i32>> = from_iter(vec![thought(3)]).boxed();
        let mut merged: Vec<_> = merge(vec![a, b], CancellationToken::new())
            .map(|t| t.payload)
            .collect()
            .await;
        merged.sort();
        assert_eq!(merged, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn merge_does_not_block_on_a_pending_source() {
        let (_tx, rx) = mpsc::channel::<Thought<i32>>(1);
        let pending: BoxStream<'static, Thought<i32>> = ReceiverStream::new(rx).boxed();
        let ready: BoxStream<'static, Thought<i32>> = from_iter(vec![thought(1), thought(2)]).boxed();

        let mut merged = merge(vec![pending, ready], CancellationToken::new()).boxed();
        let first = tokio::time::timeout(std::time::Duration::from_millis(200), merged.next()).await;
        let second = tokio::time::timeout(std::time::Duration::from_millis(200), merged.next()).await;

        assert!(first.is_ok(), "ready source should yield promptly despite a pending source");
        assert!(second.is_ok(), "ready source should yield promptly despite a pending source");
    }

    #[tokio::test]
    async fn split_conserves_total_count() {
        let source: BoxStream<'static, Thought<i32>> =
            from_iter((0..10).map(thought)).boxed();
        let (matching, non_matching) = split(source, |x| x % 2 == 0, CancellationToken::new());
        let matching: Vec<_> = matching.collect().await;
        let non_matching: Vec<_> = non_matching.collect().await;
        assert_eq!(matching.len() + non_matching.len(), 10);
        assert_eq!(matching.len(), 5);
    }

    #[tokio::test]
    async fn confluence_collect_first_preserves_registration_order() {
        let mut confluence = Confluence::new();
        confluence.add(from_iter(vec![thought(1)]));
        confluence.add(from_iter(Vec::<Thought<i32>>::new()));
        confluence.add(from_iter(vec![thought(3)]));
        let first: Vec<_> = confluence.collect_first().await.into_iter().map(|t| t.payload).collect();
        assert_eq!(first, vec![1, 3]);
    }
}
