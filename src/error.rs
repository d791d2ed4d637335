//! Error types for feed pipeline runs.
//!
//! This module provides:
//! - `Stage`: Indicates where an error occurred in the pipeline
//! - `PipelineError`: The single error surfaced by a pipeline run

use std::fmt;

/// Boxed error type used as the source of pipeline errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Error while reading bytes from the input source
    Read,
    /// Error while decoding a row into a record
    Parse,
    /// The caller-supplied transform rejected a record
    Transform,
    /// Error while converting a record or info object to markup
    Serialize,
    /// Error while writing fragments to the sink
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Read => write!(f, "Read"),
            Stage::Parse => write!(f, "Parse"),
            Stage::Transform => write!(f, "Transform"),
            Stage::Serialize => write!(f, "Serialize"),
            Stage::Write => write!(f, "Write"),
        }
    }
}

/// A fatal pipeline error.
///
/// The first error raised by any stage short-circuits the run and is the one
/// returned to the caller. None of the stages retry.
#[derive(Debug)]
pub struct PipelineError {
    /// Stage where the error occurred
    pub stage: Stage,
    /// Identifier of the input or sink involved, when known
    pub target: Option<String>,
    /// Zero-based sequence index of the record being processed, when known
    pub record: Option<u64>,
    /// The underlying error
    pub error: BoxError,
}

impl PipelineError {
    /// Create a new error for the given stage.
    pub fn new(stage: Stage, error: impl Into<BoxError>) -> Self {
        Self {
            stage,
            target: None,
            record: None,
            error: error.into(),
        }
    }

    /// Create a new error attributed to a specific record index.
    pub fn for_record(stage: Stage, record: u64, error: impl Into<BoxError>) -> Self {
        Self {
            stage,
            target: None,
            record: Some(record),
            error: error.into(),
        }
    }

    /// Attach the identifier of the input or sink involved.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.stage)?;
        if let Some(target) = &self.target {
            write!(f, " {target}:")?;
        }
        if let Some(index) = self.record {
            write!(f, " record {index}:")?;
        }
        write!(f, " {}", self.error)
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.error.as_ref())
    }
}
