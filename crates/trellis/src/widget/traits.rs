//! Core widget trait definitions.
//!
//! # Key Types
//!
//! - [`Widget`] - Base trait for all UI elements
//! - [`PaintContext`] - Drawing context passed to [`Widget::paint`]
//! - [`EventContext`] - Request channel passed to [`Widget::event`]
//!
//! Handlers never receive the tree or the application. Anything that
//! reaches outside the widget (moving focus, opening a popup or a modal,
//! starting a drag, quitting) is queued on the [`EventContext`] and applied
//! by the dispatcher once the handler returns.

use std::any::Any;

use trellis_core::ObjectId;
use trellis_render::{CursorShape, Painter, Rect, Size};

use super::base::WidgetBase;
use super::drag_drop::DragData;
use super::events::{FocusReason, WidgetEvent};
use super::geometry::SizeHint;
use super::modal::ModalHandle;
use crate::error::HandlerError;

/// Result of [`Widget::event`]. `Ok(true)` marks the event accepted.
pub type EventResult = Result<bool, HandlerError>;

/// Context provided during widget painting.
///
/// The painter is already translated to the widget's origin, so
/// [`rect`](Self::rect) always starts at (0, 0).
pub struct PaintContext<'a> {
    painter: &'a mut dyn Painter,
    widget_rect: Rect,
    focused: bool,
    hovered: bool,
}

impl<'a> PaintContext<'a> {
    pub fn new(painter: &'a mut dyn Painter, widget_rect: Rect) -> Self {
        Self {
            painter,
            widget_rect,
            focused: false,
            hovered: false,
        }
    }

    #[inline]
    pub fn with_state(mut self, focused: bool, hovered: bool) -> Self {
        self.focused = focused;
        self.hovered = hovered;
        self
    }

    #[inline]
    pub fn painter(&mut self) -> &mut dyn Painter {
        self.painter
    }

    /// The widget's local rectangle.
    #[inline]
    pub fn rect(&self) -> Rect {
        self.widget_rect
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.widget_rect.size
    }

    #[inline]
    pub fn has_focus(&self) -> bool {
        self.focused
    }

    #[inline]
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }
}

/// A side effect requested by a handler.
#[derive(Debug)]
pub(crate) enum Request {
    SetFocus(ObjectId, FocusReason),
    ClearFocus,
    OpenPopup(ObjectId),
    ClosePopup,
    StartDrag(DragData),
    OpenModal { root: ObjectId, handle: ModalHandle },
    Quit,
}

/// Passed to [`Widget::event`] for queuing requests.
pub struct EventContext<'a> {
    widget: ObjectId,
    requests: &'a mut Vec<Request>,
    drag_threshold: f32,
}

impl<'a> EventContext<'a> {
    pub(crate) fn new(widget: ObjectId, requests: &'a mut Vec<Request>, drag_threshold: f32) -> Self {
        Self {
            widget,
            requests,
            drag_threshold,
        }
    }

    /// The widget receiving the event.
    #[inline]
    pub fn widget(&self) -> ObjectId {
        self.widget
    }

    /// Pointer travel before a press should be treated as a drag.
    #[inline]
    pub fn drag_threshold(&self) -> f32 {
        self.drag_threshold
    }

    /// Give keyboard focus to the receiving widget.
    pub fn request_focus(&mut self) {
        self.requests
            .push(Request::SetFocus(self.widget, FocusReason::Other));
    }

    /// Give keyboard focus to another widget.
    pub fn set_focus(&mut self, target: ObjectId) {
        self.requests.push(Request::SetFocus(target, FocusReason::Other));
    }

    pub fn clear_focus(&mut self) {
        self.requests.push(Request::ClearFocus);
    }

    /// Show `popup` and route pointer input to it first until it closes.
    ///
    /// Only one popup is open at a time; opening another replaces it.
    pub fn open_popup(&mut self, popup: ObjectId) {
        self.requests.push(Request::OpenPopup(popup));
    }

    pub fn close_popup(&mut self) {
        self.requests.push(Request::ClosePopup);
    }

    /// Start an internal drag carrying `data`.
    ///
    /// The drag follows the pointer until the button is released.
    pub fn start_drag(&mut self, data: DragData) {
        self.requests
            .push(Request::StartDrag(data.with_source(self.widget)));
    }

    /// Open `root` as a modal scope once this handler returns.
    ///
    /// The returned handle finishes the scope; input outside `root` is
    /// blocked until then.
    pub fn open_modal(&mut self, root: ObjectId) -> ModalHandle {
        let handle = ModalHandle::new();
        self.requests.push(Request::OpenModal {
            root,
            handle: handle.clone(),
        });
        handle
    }

    /// Ask the application loop to stop.
    pub fn quit(&mut self) {
        self.requests.push(Request::Quit);
    }
}

/// The base trait for all widgets.
///
/// A widget is a tree node with a rectangle, a paint contract and an
/// optional event handler. Capability methods (`natural_size`,
/// `is_multi_line`, `overlay_active`, ...) let layouts and the dispatcher
/// ask what a widget can do without knowing its concrete type.
pub trait Widget: Any + Send + Sync {
    fn widget_base(&self) -> &WidgetBase;

    fn widget_base_mut(&mut self) -> &mut WidgetBase;

    /// Natural and minimum size.
    fn size_hint(&self) -> SizeHint {
        SizeHint::default()
    }

    /// Draw the widget into `ctx.rect()`.
    fn paint(&self, ctx: &mut PaintContext<'_>);

    /// Handle an event.
    ///
    /// Return `Ok(true)` or call `event.accept()` to stop propagation.
    /// Errors go to the application loop.
    fn event(&mut self, _ctx: &mut EventContext<'_>, _event: &mut WidgetEvent) -> EventResult {
        Ok(false)
    }

    // =========================================================================
    // Capabilities
    // =========================================================================

    /// The size layouts treat as this widget's preferred size.
    ///
    /// An explicit `resize` wins over the size hint.
    fn natural_size(&self) -> Size {
        self.widget_base()
            .explicit_size()
            .unwrap_or_else(|| self.size_hint().preferred)
    }

    /// The size no layout may shrink this widget below.
    fn minimum_size(&self) -> Size {
        self.widget_base()
            .minimum_size()
            .unwrap_or_else(|| self.size_hint().effective_minimum())
    }

    /// Whether the widget shows several lines of content. Form rows hosting
    /// such a field default to a taller height.
    fn is_multi_line(&self) -> bool {
        false
    }

    /// Whether the widget has an open sub-state (an expanded menu, an open
    /// list) that must see pointer input anywhere in the window.
    fn overlay_active(&self) -> bool {
        false
    }

    fn accepts_drops(&self) -> bool {
        self.widget_base().accepts_drops()
    }

    fn cursor(&self) -> Option<CursorShape> {
        self.widget_base().cursor()
    }

    // =========================================================================
    // Convenience accessors
    // =========================================================================

    fn object_id(&self) -> Option<ObjectId> {
        self.widget_base().object_id()
    }

    fn geometry(&self) -> Rect {
        self.widget_base().geometry()
    }

    fn is_focusable(&self) -> bool {
        self.widget_base().is_focusable()
    }

    fn has_focus(&self) -> bool {
        self.widget_base().has_focus()
    }
}

impl dyn Widget {
    /// Downcast to a concrete widget type.
    pub fn downcast_ref<T: Widget>(&self) -> Option<&T> {
        let any: &dyn Any = self;
        any.downcast_ref()
    }

    pub fn downcast_mut<T: Widget>(&mut self) -> Option<&mut T> {
        let any: &mut dyn Any = self;
        any.downcast_mut()
    }
}
