//! Bounded-concurrency, order-preserving asynchronous transform stage.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, Stream, StreamExt};

use crate::error::{BoxError, PipelineError, Stage};
use crate::record::Record;

/// Default number of in-flight transform calls when unspecified.
pub const DEFAULT_PARALLEL: usize = 1;

/// Stream combinator that applies an async transform to each record with at
/// most `max_parallel` calls in flight, releasing results strictly in input
/// order.
///
/// Work may complete out of order internally; completed results park in an
/// index-keyed reorder buffer until the release cursor reaches them. Parked
/// results count against the concurrency budget, so at most `max_parallel`
/// records are outstanding (in flight or awaiting release) at any instant.
///
/// The first failure in index order wins: a fast failure on a later record
/// never overtakes an earlier record's outcome. Once any failure is parked
/// the stage stops pulling input; after the failing index is released the
/// stream is fused and remaining in-flight work is dropped.
pub struct OrderedTransform<St, F, T> {
    input: Option<St>,
    transform: F,
    max_parallel: usize,
    in_flight: FuturesUnordered<BoxFuture<'static, (u64, Result<T, PipelineError>)>>,
    parked: BTreeMap<u64, Result<T, PipelineError>>,
    next_input: u64,
    next_output: u64,
    done: bool,
}

impl<St, F, Fut, T, E> OrderedTransform<St, F, T>
where
    St: Stream<Item = Result<Record, PipelineError>> + Unpin,
    F: FnMut(Record) -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Into<BoxError>,
{
    /// Create a new transform stage over `input`.
    ///
    /// `max_parallel` is clamped to at least 1.
    pub fn new(input: St, max_parallel: usize, transform: F) -> Self {
        Self {
            input: Some(input),
            transform,
            max_parallel: max_parallel.max(1),
            in_flight: FuturesUnordered::new(),
            parked: BTreeMap::new(),
            next_input: 0,
            next_output: 0,
            done: false,
        }
    }

    /// Number of records currently outstanding (in flight or parked).
    pub fn outstanding(&self) -> usize {
        self.in_flight.len() + self.parked.len()
    }
}

impl<St, F, Fut, T, E> Stream for OrderedTransform<St, F, T>
where
    St: Stream<Item = Result<Record, PipelineError>> + Unpin,
    F: FnMut(Record) -> Fut + Unpin,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Into<BoxError>,
{
    type Item = Result<T, PipelineError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if this.done {
            return Poll::Ready(None);
        }

        loop {
            // Release the next in-order result if it has arrived.
            if let Some(result) = this.parked.remove(&this.next_output) {
                this.next_output += 1;
                if result.is_err() {
                    this.done = true;
                    this.input = None;
                    this.in_flight.clear();
                    this.parked.clear();
                }
                return Poll::Ready(Some(result));
            }

            // Admit new input while the concurrency budget has room. An
            // upstream error occupies its index slot and closes the input.
            while let Some(input) = this.input.as_mut() {
                if this.in_flight.len() + this.parked.len() >= this.max_parallel {
                    break;
                }
                if this.parked.values().any(|r| r.is_err()) {
                    // A failure is waiting to be released; stop admitting work.
                    this.input = None;
                    break;
                }
                match input.poll_next_unpin(cx) {
                    Poll::Ready(Some(Ok(record))) => {
                        let index = this.next_input;
                        this.next_input += 1;
                        let fut = (this.transform)(record);
                        this.in_flight.push(Box::pin(async move {
                            let result = fut.await.map_err(|e| {
                                PipelineError::for_record(Stage::Transform, index, e.into())
                            });
                            (index, result)
                        }));
                    }
                    Poll::Ready(Some(Err(e))) => {
                        let index = this.next_input;
                        this.next_input += 1;
                        this.parked.insert(index, Err(e));
                        this.input = None;
                    }
                    Poll::Ready(None) => {
                        this.input = None;
                    }
                    Poll::Pending => break,
                }
            }

            // Drive outstanding transform calls and park completions.
            match this.in_flight.poll_next_unpin(cx) {
                Poll::Ready(Some((index, result))) => {
                    this.parked.insert(index, result);
                }
                Poll::Ready(None) => {
                    // Indices are assigned contiguously, so with nothing in
                    // flight the buffer is either empty or holds next_output.
                    if this.parked.contains_key(&this.next_output) {
                        continue;
                    }
                    if this.input.is_none() {
                        return Poll::Ready(None);
                    }
                    return Poll::Pending;
                }
                Poll::Pending => {
                    if this.parked.contains_key(&this.next_output) {
                        continue;
                    }
                    return Poll::Pending;
                }
            }
        }
    }
}
