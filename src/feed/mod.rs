//! Stateful XML feed serialization.
//!
//! This module provides:
//! - `XmlFeed`: State machine turning a sequence of values into one document
//! - `FeedOptions`: Prolog/header/footer/info/envelope configuration
//! - `MarkupStrategy`: Built-in builder or caller-supplied markup function
//! - `MarkupError`: Errors raised while producing markup

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

mod builder;
pub use builder::{XmlBuilder, XmlBuilderOptions};

/// Default prolog emitted before the header.
pub const DEFAULT_PROLOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Errors that can occur while converting values to markup.
#[derive(Debug, Error)]
pub enum MarkupError {
    /// The value has no XML representation under the configured conventions
    #[error("value cannot be represented as markup: {0}")]
    Unrepresentable(String),

    /// The value could not be bridged through serde
    #[error("serde error: {0}")]
    Serde(Box<dyn std::error::Error + Send + Sync>),

    /// A caller-supplied markup function failed
    #[error("custom markup function failed: {0}")]
    Custom(Box<dyn std::error::Error + Send + Sync>),

    /// The feed already emitted its footer
    #[error("feed is finished; no further fragments can be produced")]
    Closed,
}

/// Type alias for a caller-supplied markup function.
///
/// Receives the envelope (or info) value and returns a markup fragment. When
/// configured it entirely replaces the built-in builder, including its
/// options.
pub type MarkupFn = Arc<dyn Fn(&Value) -> Result<String, MarkupError> + Send + Sync>;

/// How values are converted to markup fragments.
///
/// Exactly one strategy is active per feed, chosen at construction.
#[derive(Clone)]
pub enum MarkupStrategy {
    /// The built-in [`XmlBuilder`]
    Builder(XmlBuilder),
    /// A caller-supplied function
    Custom(MarkupFn),
}

impl Default for MarkupStrategy {
    fn default() -> Self {
        MarkupStrategy::Builder(XmlBuilder::default())
    }
}

impl std::fmt::Debug for MarkupStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkupStrategy::Builder(b) => f.debug_tuple("Builder").field(b).finish(),
            MarkupStrategy::Custom(_) => f.debug_tuple("Custom").field(&"<fn>").finish(),
        }
    }
}

impl MarkupStrategy {
    fn render(&self, value: &Value) -> Result<String, MarkupError> {
        match self {
            MarkupStrategy::Builder(builder) => builder.build(value),
            MarkupStrategy::Custom(f) => f(value),
        }
    }
}

/// Configuration for one [`XmlFeed`].
#[derive(Debug, Clone)]
pub struct FeedOptions {
    /// Content placed at the very beginning of the document
    pub prolog: Option<String>,
    /// Raw markup emitted after the prolog, before any record
    pub header: Option<String>,
    /// Raw markup emitted once at end of input
    pub footer: Option<String>,
    /// Wrapper element name each record is nested under
    pub object_name: String,
    /// Optional static object serialized once between header and records
    pub info: Option<Value>,
    /// Markup strategy for records and the info object
    pub strategy: MarkupStrategy,
}

impl FeedOptions {
    /// Create options with the mandatory wrapper element name.
    pub fn new(object_name: impl Into<String>) -> Self {
        Self {
            prolog: None,
            header: None,
            footer: None,
            object_name: object_name.into(),
            info: None,
            strategy: MarkupStrategy::default(),
        }
    }

    /// Set the prolog, replacing the default XML declaration.
    pub fn with_prolog(mut self, prolog: impl Into<String>) -> Self {
        self.prolog = Some(prolog.into());
        self
    }

    /// Set the header markup.
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Set the footer markup.
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Set the static info object.
    pub fn with_info(mut self, info: impl Into<Value>) -> Self {
        self.info = Some(info.into());
        self
    }

    /// Use the built-in builder with the given options.
    pub fn with_builder_options(mut self, options: XmlBuilderOptions) -> Self {
        self.strategy = MarkupStrategy::Builder(XmlBuilder::new(options));
        self
    }

    /// Use a caller-supplied markup function instead of the built-in builder.
    pub fn with_markup_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Result<String, MarkupError> + Send + Sync + 'static,
    {
        self.strategy = MarkupStrategy::Custom(Arc::new(f));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeedState {
    BeforeFirst,
    Streaming,
    Done,
}

/// State machine that serializes a sequence of values into one XML document.
///
/// The first pushed value (or [`finish`](XmlFeed::finish) on an empty feed)
/// carries the prolog, header, and info fragment as one unit; every later
/// push yields only that value's envelope fragment; `finish` yields the
/// footer exactly once. Concatenating every returned fragment in order gives
/// the complete document.
///
/// A feed instance serves exactly one run: once finished it is closed and
/// further calls return [`MarkupError::Closed`].
#[derive(Debug)]
pub struct XmlFeed {
    prolog: String,
    header: String,
    footer: String,
    object_name: String,
    info: Option<Value>,
    strategy: MarkupStrategy,
    state: FeedState,
}

impl XmlFeed {
    /// Create a feed from the given options.
    pub fn new(options: FeedOptions) -> Self {
        Self {
            prolog: options.prolog.unwrap_or_else(|| DEFAULT_PROLOG.to_string()),
            header: options.header.unwrap_or_default(),
            footer: options.footer.unwrap_or_default(),
            object_name: options.object_name,
            info: options.info,
            strategy: options.strategy,
            state: FeedState::BeforeFirst,
        }
    }

    /// Whether the footer has been emitted.
    pub fn is_finished(&self) -> bool {
        self.state == FeedState::Done
    }

    /// Serialize one value and return its markup fragment.
    ///
    /// The value is wrapped in the `{ object_name: value }` envelope. An
    /// empty object contributes an empty fragment. The first push also
    /// carries prolog, header, and info.
    pub fn push<T: Serialize>(&mut self, value: T) -> Result<String, MarkupError> {
        let value = serde_json::to_value(value).map_err(|e| MarkupError::Serde(Box::new(e)))?;
        self.push_value(value)
    }

    /// Serialize one already-bridged value and return its markup fragment.
    pub fn push_value(&mut self, value: Value) -> Result<String, MarkupError> {
        match self.state {
            FeedState::BeforeFirst => {
                let fragment = self.render_item(&value)?;
                let preamble = self.preamble()?;
                self.state = FeedState::Streaming;
                Ok(format!("{preamble}{fragment}"))
            }
            FeedState::Streaming => self.render_item(&value),
            FeedState::Done => Err(MarkupError::Closed),
        }
    }

    /// Emit the footer and close the feed.
    ///
    /// On a feed that never saw a record this also emits the prolog, header,
    /// and info fragment, so an empty input still yields a complete document.
    pub fn finish(&mut self) -> Result<String, MarkupError> {
        match self.state {
            FeedState::BeforeFirst => {
                let preamble = self.preamble()?;
                self.state = FeedState::Done;
                Ok(format!("{preamble}{}", self.footer))
            }
            FeedState::Streaming => {
                self.state = FeedState::Done;
                Ok(self.footer.clone())
            }
            FeedState::Done => Err(MarkupError::Closed),
        }
    }

    fn preamble(&self) -> Result<String, MarkupError> {
        Ok(format!(
            "{}\n{}{}",
            self.prolog,
            self.header,
            self.render_info()?
        ))
    }

    fn render_item(&self, value: &Value) -> Result<String, MarkupError> {
        // Empty records contribute nothing, not an empty envelope
        if is_empty_object(value) {
            return Ok(String::new());
        }
        let mut envelope = serde_json::Map::new();
        envelope.insert(self.object_name.clone(), value.clone());
        self.strategy.render(&Value::Object(envelope))
    }

    fn render_info(&self) -> Result<String, MarkupError> {
        match &self.info {
            Some(info) if !is_empty_object(info) => self.strategy.render(info),
            _ => Ok(String::new()),
        }
    }
}

fn is_empty_object(value: &Value) -> bool {
    matches!(value, Value::Object(map) if map.is_empty())
}
