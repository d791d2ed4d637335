//! Pipeline orchestration: source, transform, serializer, and sink composed
//! into one end-to-end asynchronous operation.

use std::future::Future;
use std::path::Path;

use futures::StreamExt;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::error::{BoxError, PipelineError, Stage};
use crate::feed::{FeedOptions, XmlFeed};
use crate::io::{FeedSink, FileInput, FileSink, RecordInput, StdinInput, StdoutSink};
use crate::source::{ParseOptions, record_stream};
use crate::transform::{DEFAULT_PARALLEL, OrderedTransform};

/// A configured record-to-feed pipeline.
///
/// The pipeline value is reusable; each run gets a fresh serializer and
/// freshly opened input and sink.
#[derive(Debug, Clone)]
pub struct FeedPipeline {
    parse: ParseOptions,
    parallel: usize,
    feed: FeedOptions,
}

impl FeedPipeline {
    /// Create a pipeline with the given feed configuration.
    ///
    /// Records pass through the transform one at a time unless
    /// [`with_parallel`](Self::with_parallel) raises the limit.
    pub fn new(feed: FeedOptions) -> Self {
        Self {
            parse: ParseOptions::default(),
            parallel: DEFAULT_PARALLEL,
            feed,
        }
    }

    /// Set the record parse options.
    pub fn with_parse_options(mut self, parse: ParseOptions) -> Self {
        self.parse = parse;
        self
    }

    /// Set the maximum number of in-flight transform calls.
    ///
    /// Output order always equals input order regardless of this limit.
    pub fn with_parallel(mut self, parallel: usize) -> Self {
        self.parallel = parallel.max(1);
        self
    }

    /// Run the pipeline from an input path to an output path.
    ///
    /// `"-"` reads from stdin or writes to stdout.
    pub async fn run<F, Fut, T, E>(
        &self,
        transform: F,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<(), PipelineError>
    where
        F: FnMut(crate::Record) -> Fut + Unpin,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Serialize + Send + 'static,
        E: Into<BoxError>,
    {
        let input = input.as_ref();
        let output = output.as_ref();

        let source: Box<dyn RecordInput> = if input == Path::new("-") {
            Box::new(StdinInput::new())
        } else {
            Box::new(FileInput::new(input))
        };
        let sink: Box<dyn FeedSink> = if output == Path::new("-") {
            Box::new(StdoutSink::new())
        } else {
            Box::new(FileSink::new(output))
        };

        self.run_with(transform, source.as_ref(), sink.as_ref()).await
    }

    /// Run the pipeline over explicit input and sink implementations.
    ///
    /// Resolves only after every record has flowed through and the sink has
    /// accepted the footer, been flushed, and shut down. The first error from
    /// any stage aborts the run; a partial output file is not guaranteed to
    /// be valid XML.
    pub async fn run_with<F, Fut, T, E>(
        &self,
        transform: F,
        input: &dyn RecordInput,
        sink: &dyn FeedSink,
    ) -> Result<(), PipelineError>
    where
        F: FnMut(crate::Record) -> Fut + Unpin,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Serialize + Send + 'static,
        E: Into<BoxError>,
    {
        let records = record_stream(input, &self.parse)?;
        let mut transformed = OrderedTransform::new(records, self.parallel, transform);
        let mut feed = XmlFeed::new(self.feed.clone());

        let mut writer = sink
            .open()
            .await
            .map_err(|e| PipelineError::new(Stage::Write, e).with_target(sink.id()))?;

        // Each fragment is written before the next record is released, so a
        // slow sink stalls consumption from the source.
        while let Some(item) = transformed.next().await {
            let value = item?;
            let fragment = feed
                .push(value)
                .map_err(|e| PipelineError::new(Stage::Serialize, e))?;
            if !fragment.is_empty() {
                writer
                    .write_all(fragment.as_bytes())
                    .await
                    .map_err(|e| PipelineError::new(Stage::Write, e).with_target(sink.id()))?;
            }
        }

        let footer = feed
            .finish()
            .map_err(|e| PipelineError::new(Stage::Serialize, e))?;
        if !footer.is_empty() {
            writer
                .write_all(footer.as_bytes())
                .await
                .map_err(|e| PipelineError::new(Stage::Write, e).with_target(sink.id()))?;
        }

        writer
            .flush()
            .await
            .map_err(|e| PipelineError::new(Stage::Write, e).with_target(sink.id()))?;
        writer
            .shutdown()
            .await
            .map_err(|e| PipelineError::new(Stage::Write, e).with_target(sink.id()))?;

        Ok(())
    }
}
