//! Widget base implementation.
//!
//! `WidgetBase` holds the state every widget shares: geometry, focus and
//! hover flags, size overrides and the widget's standard signals. Widgets
//! embed one and hand it out through
//! [`Widget::widget_base`](super::Widget::widget_base).
//!
//! Visibility is not stored here. It lives on the widget's node in the tree
//! so that effective visibility can be derived from ancestors; use
//! [`WidgetTree::set_visible`](super::WidgetTree::set_visible).

use trellis_core::{ObjectId, Signal, SignalBlocker};
use trellis_render::{CursorShape, Point, Rect, Size};

/// The base implementation for all widgets.
///
/// # Example
///
/// ```
/// use trellis::widget::{PaintContext, SizeHint, Widget, WidgetBase};
///
/// struct Swatch {
///     base: WidgetBase,
/// }
///
/// impl Widget for Swatch {
///     fn widget_base(&self) -> &WidgetBase { &self.base }
///     fn widget_base_mut(&mut self) -> &mut WidgetBase { &mut self.base }
///
///     fn size_hint(&self) -> SizeHint {
///         SizeHint::from_dimensions(40.0, 40.0)
///     }
///
///     fn paint(&self, ctx: &mut PaintContext<'_>) {
///         let rect = ctx.rect();
///         ctx.painter().fill_rect(rect, trellis_render::Color::BLUE);
///     }
/// }
/// ```
pub struct WidgetBase {
    object_id: Option<ObjectId>,

    /// Position relative to the parent, and size.
    geometry: Rect,

    /// Natural size set by `resize`, overriding the size hint.
    explicit_size: Option<Size>,

    /// Minimum size override.
    minimum_size: Option<Size>,

    focusable: bool,
    focused: bool,
    hovered: bool,
    accepts_drops: bool,
    cursor: Option<CursorShape>,

    blocker: SignalBlocker,

    /// Emitted when the geometry changes.
    pub geometry_changed: Signal<Rect>,

    /// Emitted when the widget's own visibility flag changes.
    pub visible_changed: Signal<bool>,
}

impl Default for WidgetBase {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetBase {
    pub fn new() -> Self {
        let blocker = SignalBlocker::new();
        Self {
            object_id: None,
            geometry: Rect::ZERO,
            explicit_size: None,
            minimum_size: None,
            focusable: false,
            focused: false,
            hovered: false,
            accepts_drops: false,
            cursor: None,
            geometry_changed: Signal::with_blocker(&blocker),
            visible_changed: Signal::with_blocker(&blocker),
            blocker,
        }
    }

    /// The widget's id, once it has been inserted into a tree.
    #[inline]
    pub fn object_id(&self) -> Option<ObjectId> {
        self.object_id
    }

    pub(crate) fn attach(&mut self, id: ObjectId) {
        self.object_id = Some(id);
    }

    /// The blocker shared with this widget's tree node and signals.
    pub fn signal_blocker(&self) -> &SignalBlocker {
        &self.blocker
    }

    /// Create a signal that is silenced together with this widget's signals.
    pub fn new_signal<Args: 'static>(&self) -> Signal<Args> {
        Signal::with_blocker(&self.blocker)
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    #[inline]
    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    /// Set the geometry, emitting `geometry_changed` if it changed.
    pub fn set_geometry(&mut self, rect: Rect) {
        if self.geometry != rect {
            self.geometry = rect;
            self.geometry_changed.emit(rect);
        }
    }

    #[inline]
    pub fn pos(&self) -> Point {
        self.geometry.origin
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.geometry.size
    }

    /// The geometry in the widget's own coordinates.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(Point::ZERO, self.geometry.size)
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.set_geometry(Rect::from_origin_size(Point::new(x, y), self.geometry.size));
    }

    /// Resize the widget and make `size` its natural size for layouts.
    pub fn resize(&mut self, width: f32, height: f32) {
        let size = Size::new(width, height);
        self.explicit_size = Some(size);
        self.set_geometry(Rect::from_origin_size(self.geometry.origin, size));
    }

    pub fn explicit_size(&self) -> Option<Size> {
        self.explicit_size
    }

    pub fn clear_explicit_size(&mut self) {
        self.explicit_size = None;
    }

    pub fn minimum_size(&self) -> Option<Size> {
        self.minimum_size
    }

    pub fn set_minimum_size(&mut self, size: Option<Size>) {
        self.minimum_size = size;
    }

    // =========================================================================
    // Focus, hover and input
    // =========================================================================

    #[inline]
    pub fn is_focusable(&self) -> bool {
        self.focusable
    }

    pub fn set_focusable(&mut self, focusable: bool) {
        self.focusable = focusable;
    }

    #[inline]
    pub fn has_focus(&self) -> bool {
        self.focused
    }

    pub(crate) fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    #[inline]
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub(crate) fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    /// Whether drag events are delivered to this widget.
    #[inline]
    pub fn accepts_drops(&self) -> bool {
        self.accepts_drops
    }

    pub fn set_accepts_drops(&mut self, accepts: bool) {
        self.accepts_drops = accepts;
    }

    pub fn cursor(&self) -> Option<CursorShape> {
        self.cursor
    }

    /// Cursor shown while the pointer is over this widget. `None` inherits
    /// from the parent.
    pub fn set_cursor(&mut self, cursor: Option<CursorShape>) {
        self.cursor = cursor;
    }

    // =========================================================================
    // Signals
    // =========================================================================

    /// Block or unblock this widget's signals, returning the previous state.
    pub fn block_signals(&self, blocked: bool) -> bool {
        self.blocker.block(blocked)
    }

    pub fn signals_blocked(&self) -> bool {
        self.blocker.is_blocked()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_geometry_change_emits_once() {
        let mut base = WidgetBase::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        base.geometry_changed.connect(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        base.set_geometry(Rect::new(0.0, 0.0, 10.0, 10.0));
        base.set_geometry(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_resize_sets_natural_size() {
        let mut base = WidgetBase::new();
        base.move_to(5.0, 5.0);
        base.resize(30.0, 20.0);
        assert_eq!(base.geometry(), Rect::new(5.0, 5.0, 30.0, 20.0));
        assert_eq!(base.explicit_size(), Some(Size::new(30.0, 20.0)));
    }

    #[test]
    fn test_block_signals_returns_previous() {
        let mut base = WidgetBase::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        base.geometry_changed.connect(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!base.block_signals(true));
        base.set_geometry(Rect::new(1.0, 1.0, 1.0, 1.0));
        assert!(base.block_signals(false));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
