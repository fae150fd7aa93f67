//! Prelude module for Trellis.
//!
//! This module re-exports the most commonly used types for convenient importing:
//!
//! ```
//! use trellis::prelude::*;
//! ```
//!
//! This provides access to:
//! - Application context and configuration (`Application`, `AppConfig`)
//! - Node tree and signals (`ObjectId`, `Signal`)
//! - Widget foundation (`Widget`, `WidgetBase`, `PaintContext`, `EventContext`)
//! - Layout strategies (`BoxLayout`, `GridLayout`, `FormLayout`, ...)
//! - Item graph (`ItemGraph`, `GraphView`, `ShapeItem`)
//! - Geometry types (`Point`, `Size`, `Rect`, `Color`)

// ============================================================================
// Application
// ============================================================================

pub use crate::{AppConfig, Application, HandlerErrorPolicy, LayoutDefaults};
pub use crate::error::{HandlerError, TrellisError, TrellisResult};

// ============================================================================
// Node Tree and Signals
// ============================================================================

pub use trellis_core::{ConnectionId, ObjectId, Signal};

// ============================================================================
// Widget Foundation
// ============================================================================

pub use crate::widget::{
    DialogCode, DragData, EventContext, EventResult, FocusReason, ModalHandle, PaintContext,
    SizeHint, Widget, WidgetBase, WidgetEvent,
};

// ============================================================================
// Layout System
// ============================================================================

pub use crate::widget::layout::{
    BoxLayout, ContentMargins, FormLayout, GridLayout, Layout, LayoutKind, Orientation,
    SplitterLayout, StackLayout,
};

// ============================================================================
// Item Graph
// ============================================================================

pub use crate::graph::{GraphView, ItemFlags, ItemGraph, ItemId, ShapeItem};

// ============================================================================
// Geometry and Rendering
// ============================================================================

pub use crate::render::{Backend, Color, Key, KeyboardModifiers, MouseButton, Painter, Point, Rect, Size};
