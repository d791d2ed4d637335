//! I/O abstractions for record inputs and feed sinks.
//!
//! This module provides:
//! - `RecordInput`: Trait for byte sources the record parser reads from
//! - `FeedSink`: Trait for destinations that accept markup fragments
//! - File and stdin/stdout implementations
//! - In-memory implementations for testing

mod input;
mod memory;
mod output;

pub use input::{FileInput, RecordInput, StdinInput};
pub use memory::{MemoryInput, MemorySink};
pub use output::{FeedSink, FileSink, StdoutSink};
