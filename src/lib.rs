//! # feedpipe
//!
//! Streaming conversion of delimited-record files into XML feeds.
//!
//! ## Overview
//!
//! feedpipe turns a large CSV-style input into a single well-formed XML
//! document, one output element per input record, without holding the whole
//! dataset in memory:
//!
//! - **Record source**: lazy row-by-row decoding of delimited input into
//!   ordered field/value records
//! - **Ordered async transform**: a caller-supplied async mapping applied
//!   with bounded concurrency, results released strictly in input order
//! - **XML feed serializer**: a stateful serializer emitting exactly one
//!   prolog/header/info block and exactly one footer around the record
//!   envelopes, for any record count including zero
//! - **Pipeline orchestration**: source, transform, serializer, and sink run
//!   as one connected pipeline with end-to-end backpressure; the first fatal
//!   error from any stage aborts the run
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use feedpipe::{FeedOptions, FeedPipeline, Record};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = FeedOptions::new("entry")
//!         .with_header("<catalog>")
//!         .with_footer("</catalog>");
//!
//!     FeedPipeline::new(options)
//!         .with_parallel(8)
//!         .run(
//!             |record: Record| async move { Ok::<_, std::io::Error>(record) },
//!             "products.csv",
//!             "products.xml",
//!         )
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Ordering & concurrency semantics
//!
//! The transform stage keeps at most `parallel` mapping calls outstanding and
//! releases results in input order: a fast call on record 5 is parked until
//! the result for record 4 is available. Completed-but-unreleased results
//! count against the same budget, so memory stays bounded no matter how
//! skewed per-record latency is. If a mapping call fails, the failure with
//! the lowest record index is the one reported, input consumption stops, and
//! the run aborts; no record after the failing index reaches the serializer.
//!
//! Everything runs on one logical task: "parallel" means multiple async
//! operations in flight, not CPU parallelism. A slow sink stalls record
//! consumption from the source.

// Core modules
pub mod error;
pub mod feed;
pub mod io;
pub mod pipeline;
pub mod record;
pub mod source;
pub mod transform;

// Re-exports for convenience
pub use error::{BoxError, PipelineError, Stage};
pub use feed::{
    FeedOptions, MarkupError, MarkupFn, MarkupStrategy, XmlBuilder, XmlBuilderOptions, XmlFeed,
};
pub use io::{
    FeedSink, FileInput, FileSink, MemoryInput, MemorySink, RecordInput, StdinInput, StdoutSink,
};
pub use pipeline::FeedPipeline;
pub use record::Record;
pub use source::ParseOptions;
pub use transform::OrderedTransform;

use std::future::Future;
use std::path::Path;

use serde::Serialize;

/// Convert a delimited-record file into an XML feed.
///
/// Convenience wrapper around [`FeedPipeline::run`] for one-shot use: applies
/// `transform` to every record of `input` with the pipeline's concurrency
/// limit and writes the resulting feed to `output`. Resolves once the whole
/// input has been consumed and the whole output durably written.
pub async fn csv_to_feed<F, Fut, T, E>(
    pipeline: FeedPipeline,
    transform: F,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<(), PipelineError>
where
    F: FnMut(Record) -> Fut + Unpin,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Serialize + Send + 'static,
    E: Into<BoxError>,
{
    pipeline.run(transform, input, output).await
}

// Internal test modules (see src/tests)
#[cfg(test)]
mod tests;
