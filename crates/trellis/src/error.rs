//! Error types for the widget layer.
//!
//! Misuse of the public API (bad grid cells, negative splitter weights,
//! stale widget or item ids) surfaces as a typed error at the call site. Errors
//! returned by event handlers are wrapped in [`HandlerError`] and travel up
//! to the application loop, which applies its configured policy.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;
use trellis_core::{ObjectError, ObjectId};
use trellis_render::BackendError;

use crate::graph::ItemId;

/// Errors raised by layout configuration calls.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// A splitter pane was given a negative weight.
    #[error("negative weight {weight} for splitter pane {index}")]
    NegativeWeight { index: usize, weight: f32 },

    /// A grid cell lies outside the configured column count.
    #[error("grid cell ({row}, {column}) is outside a {columns}-column grid")]
    GridIndexOutOfRange {
        row: usize,
        column: usize,
        columns: usize,
    },

    /// A column setting names a column past the configured count.
    #[error("column {column} is outside a {columns}-column grid")]
    GridColumnOutOfRange { column: usize, columns: usize },

    /// A row or column span of zero.
    #[error("invalid span {row_span}x{column_span}")]
    InvalidSpan { row_span: usize, column_span: usize },

    /// An index past the end of a layout's items or rows.
    #[error("index {index} out of range for {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    /// `set_weights` was called with the wrong number of weights.
    #[error("expected {expected} weights, got {actual}")]
    WeightCountMismatch { expected: usize, actual: usize },

    /// The widget is already managed by this layout.
    #[error("widget {0:?} is already in the layout")]
    DuplicateItem(ObjectId),

    /// A negative size was passed where a length was expected.
    #[error("negative size {0}")]
    NegativeSize(f32),
}

/// Errors raised by item graph calls.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphError {
    /// The id does not refer to an item in this graph.
    #[error("no item with id {0:?}")]
    ItemNotFound(ItemId),

    /// The item cannot be selected.
    #[error("item {0:?} is not selectable")]
    NotSelectable(ItemId),
}

/// An error returned by a widget's event handler.
#[derive(Debug)]
pub struct HandlerError {
    /// The widget whose handler failed, when known.
    pub widget: Option<ObjectId>,
    pub source: Box<dyn StdError + Send + Sync>,
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.widget {
            Some(widget) => write!(f, "event handler failed in {widget:?}: {}", self.source),
            None => write!(f, "event handler failed: {}", self.source),
        }
    }
}

impl StdError for HandlerError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.source.as_ref())
    }
}

impl HandlerError {
    /// Wrap any error raised inside a handler.
    pub fn new(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self {
            widget: None,
            source: source.into(),
        }
    }

    /// Attach the failing widget, keeping an id that is already set.
    pub fn in_widget(mut self, widget: ObjectId) -> Self {
        self.widget.get_or_insert(widget);
        self
    }
}

/// Errors loading or saving [`AppConfig`](crate::AppConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid color {0:?}, expected #rrggbb or #rrggbbaa")]
    InvalidColor(String),
}

/// Umbrella error for the widget layer.
#[derive(Error, Debug)]
pub enum TrellisError {
    #[error(transparent)]
    Object(#[from] ObjectError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Handler(#[from] HandlerError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The id does not refer to a live widget.
    #[error("no widget with id {0:?}")]
    WidgetNotFound(ObjectId),

    /// The id refers to an object with no widget attached.
    #[error("widget {0:?} is not a {1}")]
    WrongWidgetType(ObjectId, &'static str),
}

pub type TrellisResult<T> = Result<T, TrellisError>;
