//! In-memory I/O implementations for testing.

use std::io::{self, Cursor, Read};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use async_trait::async_trait;
use tokio::io::AsyncWrite;

use super::{FeedSink, RecordInput};

/// In-memory record input for testing.
#[derive(Debug, Clone)]
pub struct MemoryInput {
    id: String,
    data: Arc<Vec<u8>>,
}

impl MemoryInput {
    /// Create a new in-memory input with the given data.
    pub fn new(id: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            data: Arc::new(data),
        }
    }

    /// Create a new in-memory input from a string.
    pub fn from_string(id: impl Into<String>, data: impl Into<String>) -> Self {
        Self::new(id, data.into().into_bytes())
    }
}

impl RecordInput for MemoryInput {
    fn id(&self) -> &str {
        &self.id
    }

    fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(Cursor::new(self.data.as_ref().clone())))
    }
}

/// In-memory feed sink for testing.
#[derive(Debug, Clone)]
pub struct MemorySink {
    id: String,
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    /// Create a new empty in-memory sink.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            buf: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get the contents of the sink as bytes.
    pub fn contents(&self) -> Vec<u8> {
        self.buf.lock().unwrap().clone()
    }

    /// Get the contents of the sink as a string.
    pub fn contents_string(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }

    /// Clear the sink contents.
    pub fn clear(&self) {
        self.buf.lock().unwrap().clear();
    }
}

#[async_trait]
impl FeedSink for MemorySink {
    fn id(&self) -> &str {
        &self.id
    }

    async fn open(&self) -> io::Result<Box<dyn AsyncWrite + Unpin + Send>> {
        // Truncate on open, matching the file sink
        self.buf.lock().unwrap().clear();
        Ok(Box::new(MemoryWriteHandle {
            buf: self.buf.clone(),
        }))
    }
}

/// Write handle for the in-memory sink.
struct MemoryWriteHandle {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl AsyncWrite for MemoryWriteHandle {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        data: &[u8],
    ) -> Poll<io::Result<usize>> {
        let mut guard = self.buf.lock().unwrap();
        guard.extend_from_slice(data);
        Poll::Ready(Ok(data.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
