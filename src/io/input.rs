//! Record input trait and standard implementations.

use std::fmt::Debug;
use std::io::Read;
use std::path::PathBuf;

/// Trait for byte sources the record parser reads from.
///
/// Implementors provide a way to open a readable stream from various sources
/// such as files, stdin, or in-memory buffers.
pub trait RecordInput: Send + Sync + Debug {
    /// Returns a unique identifier for this input source.
    ///
    /// Used in error messages. Convention: "-" for stdin, file path for files.
    fn id(&self) -> &str;

    /// Open and return a new readable stream.
    ///
    /// Each call should return a fresh stream positioned at the beginning.
    fn open(&self) -> std::io::Result<Box<dyn Read + Send>>;
}

/// Input that reads from a file on disk.
#[derive(Debug, Clone)]
pub struct FileInput {
    id: String,
    path: PathBuf,
}

impl FileInput {
    /// Create a new file input for the given path.
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

impl RecordInput for FileInput {
    fn id(&self) -> &str {
        &self.id
    }

    fn open(&self) -> std::io::Result<Box<dyn Read + Send>> {
        let file = std::fs::File::open(&self.path)?;
        Ok(Box::new(file))
    }
}

/// Input that reads from stdin.
#[derive(Debug, Clone)]
pub struct StdinInput {
    id: String,
}

impl StdinInput {
    /// Create a new stdin input.
    pub fn new() -> Self {
        Self { id: "-".into() }
    }
}

impl Default for StdinInput {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordInput for StdinInput {
    fn id(&self) -> &str {
        &self.id
    }

    fn open(&self) -> std::io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(std::io::stdin()))
    }
}
