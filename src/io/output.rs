//! Feed sink trait and standard implementations.

use std::fmt::Debug;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWrite;

/// Trait for destinations that accept the serialized feed.
///
/// A sink is opened once per pipeline run and receives markup fragments in
/// emission order. The run only resolves after the returned writer has been
/// flushed and shut down.
#[async_trait]
pub trait FeedSink: Send + Sync + Debug {
    /// Returns a unique identifier for this sink.
    ///
    /// Used in error messages. Convention: "-" for stdout, file path for files.
    fn id(&self) -> &str;

    /// Open the sink for writing, truncating any existing content.
    async fn open(&self) -> std::io::Result<Box<dyn AsyncWrite + Unpin + Send>>;
}

/// Sink that writes the feed to a file, replacing any existing content.
#[derive(Debug, Clone)]
pub struct FileSink {
    id: String,
    path: PathBuf,
}

impl FileSink {
    /// Create a new file sink for the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let id = path.to_string_lossy().into_owned();
        Self { id, path }
    }

    /// Get the file path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl FeedSink for FileSink {
    fn id(&self) -> &str {
        &self.id
    }

    async fn open(&self) -> std::io::Result<Box<dyn AsyncWrite + Unpin + Send>> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&self.path)
            .await?;
        Ok(Box::new(file))
    }
}

/// Sink that writes the feed to stdout.
#[derive(Debug, Clone)]
pub struct StdoutSink {
    id: String,
}

impl StdoutSink {
    /// Create a new stdout sink.
    pub fn new() -> Self {
        Self { id: "-".into() }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedSink for StdoutSink {
    fn id(&self) -> &str {
        &self.id
    }

    async fn open(&self) -> std::io::Result<Box<dyn AsyncWrite + Unpin + Send>> {
        Ok(Box::new(tokio::io::stdout()))
    }
}
