//! Widget system for Trellis.
//!
//! This module provides the widget architecture:
//!
//! - [`Widget`] trait: the base trait for all UI elements
//! - [`WidgetBase`]: common state (geometry, focus, hover, signals)
//! - [`WidgetTree`]: the explicit context owning every widget and layout
//! - [`EventDispatcher`]: routes backend input through the tree
//! - [`layout`]: box, grid, form, stacked and splitter strategies
//!
//! # Creating a Widget
//!
//! 1. Define a struct with a `WidgetBase` field
//! 2. Implement the `Widget` trait
//! 3. Provide `size_hint()` for layout
//! 4. Implement `paint()` for rendering
//!
//! ```
//! use trellis::widget::{EventContext, EventResult, PaintContext, SizeHint, Widget, WidgetBase, WidgetEvent};
//! use trellis_render::Color;
//!
//! struct Swatch {
//!     base: WidgetBase,
//!     clicks: u32,
//! }
//!
//! impl Widget for Swatch {
//!     fn widget_base(&self) -> &WidgetBase { &self.base }
//!     fn widget_base_mut(&mut self) -> &mut WidgetBase { &mut self.base }
//!
//!     fn size_hint(&self) -> SizeHint {
//!         SizeHint::from_dimensions(80.0, 30.0)
//!     }
//!
//!     fn paint(&self, ctx: &mut PaintContext<'_>) {
//!         let rect = ctx.rect();
//!         ctx.painter().fill_rect(rect, Color::BLUE);
//!     }
//!
//!     fn event(&mut self, _ctx: &mut EventContext<'_>, event: &mut WidgetEvent) -> EventResult {
//!         if let WidgetEvent::MousePress(_) = event {
//!             self.clicks += 1;
//!             return Ok(true);
//!         }
//!         Ok(false)
//!     }
//! }
//! ```
//!
//! # Coordinate Systems
//!
//! - **Local coordinates**: origin at the widget's top-left corner
//! - **Parent coordinates**: what [`WidgetBase::geometry`] is expressed in
//! - **Window coordinates**: what the backend reports pointer positions in

mod base;
mod dispatcher;
pub mod drag_drop;
mod events;
mod focus;
mod geometry;
pub mod layout;
mod modal;
mod traits;
mod tree;

pub use base::WidgetBase;
pub use dispatcher::EventDispatcher;
pub use drag_drop::{DragData, DragEnterEvent, DragLeaveEvent, DropEvent};
pub use events::{
    EnterEvent, EventBase, FocusInEvent, FocusOutEvent, FocusReason, KeyPressEvent, LeaveEvent,
    MouseMoveEvent, MousePressEvent, MouseReleaseEvent, WheelEvent, WidgetEvent,
};
pub use focus::FocusManager;
pub use geometry::SizeHint;
pub use layout::{ContentMargins, Layout, LayoutBase, LayoutKind};
pub use modal::{DialogCode, ModalHandle, ModalScope, ModalStack};
pub use traits::{EventContext, EventResult, PaintContext, Widget};
pub use tree::{WidgetAccess, WidgetTree};

pub(crate) use dispatcher::AppRequest;
