//! Widget-level events.
//!
//! The dispatcher turns each [`RawEvent`](trellis_render::RawEvent) into a
//! [`WidgetEvent`] and offers it to candidate widgets one at a time. Every
//! event starts out ignored; the first handler that calls
//! [`accept`](WidgetEvent::accept) (or returns `Ok(true)`) stops propagation.
//! An event nobody accepts is dropped.

use trellis_render::{Key, KeyboardModifiers, MouseButton, Point};

use super::drag_drop::{DragEnterEvent, DragLeaveEvent, DropEvent};

/// Acceptance state shared by every event type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventBase {
    accepted: bool,
}

impl EventBase {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn accept(&mut self) {
        self.accepted = true;
    }

    #[inline]
    pub fn ignore(&mut self) {
        self.accepted = false;
    }

    #[inline]
    pub fn is_accepted(&self) -> bool {
        self.accepted
    }
}

/// A pointer button went down.
#[derive(Debug, Clone)]
pub struct MousePressEvent {
    pub base: EventBase,
    pub button: MouseButton,
    /// Position relative to the receiving widget.
    pub local_pos: Point,
    /// Position relative to the window.
    pub window_pos: Point,
    pub modifiers: KeyboardModifiers,
}

impl MousePressEvent {
    pub fn new(button: MouseButton, window_pos: Point, modifiers: KeyboardModifiers) -> Self {
        Self {
            base: EventBase::new(),
            button,
            local_pos: window_pos,
            window_pos,
            modifiers,
        }
    }
}

/// A pointer button went up.
#[derive(Debug, Clone)]
pub struct MouseReleaseEvent {
    pub base: EventBase,
    pub button: MouseButton,
    pub local_pos: Point,
    pub window_pos: Point,
    pub modifiers: KeyboardModifiers,
}

impl MouseReleaseEvent {
    pub fn new(button: MouseButton, window_pos: Point, modifiers: KeyboardModifiers) -> Self {
        Self {
            base: EventBase::new(),
            button,
            local_pos: window_pos,
            window_pos,
            modifiers,
        }
    }
}

/// The pointer moved.
#[derive(Debug, Clone)]
pub struct MouseMoveEvent {
    pub base: EventBase,
    /// Button held during the move, if any.
    pub button: Option<MouseButton>,
    pub local_pos: Point,
    pub window_pos: Point,
    pub modifiers: KeyboardModifiers,
}

impl MouseMoveEvent {
    pub fn new(
        button: Option<MouseButton>,
        window_pos: Point,
        modifiers: KeyboardModifiers,
    ) -> Self {
        Self {
            base: EventBase::new(),
            button,
            local_pos: window_pos,
            window_pos,
            modifiers,
        }
    }
}

/// Scroll wheel or trackpad scroll.
#[derive(Debug, Clone)]
pub struct WheelEvent {
    pub base: EventBase,
    pub local_pos: Point,
    pub window_pos: Point,
    /// Scroll amount; positive y scrolls content up.
    pub delta: Point,
}

impl WheelEvent {
    pub fn new(window_pos: Point, delta: Point) -> Self {
        Self {
            base: EventBase::new(),
            local_pos: window_pos,
            window_pos,
            delta,
        }
    }
}

/// The pointer entered the widget.
#[derive(Debug, Clone)]
pub struct EnterEvent {
    pub base: EventBase,
    pub local_pos: Point,
}

/// The pointer left the widget.
#[derive(Debug, Clone, Default)]
pub struct LeaveEvent {
    pub base: EventBase,
}

/// Why keyboard focus moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusReason {
    /// A click on a focusable widget.
    Mouse,
    /// Tab moved focus forward.
    Tab,
    /// Shift+Tab moved focus backward.
    Backtab,
    /// The focused widget was hidden or destroyed.
    Hidden,
    /// A modal scope opened or closed.
    Modal,
    /// Requested by code.
    Other,
}

#[derive(Debug, Clone)]
pub struct FocusInEvent {
    pub base: EventBase,
    pub reason: FocusReason,
}

#[derive(Debug, Clone)]
pub struct FocusOutEvent {
    pub base: EventBase,
    pub reason: FocusReason,
}

/// A key was pressed while the receiving widget had focus.
#[derive(Debug, Clone)]
pub struct KeyPressEvent {
    pub base: EventBase,
    pub key: Key,
    pub modifiers: KeyboardModifiers,
    /// Text produced by the key, if any.
    pub text: Option<String>,
}

impl KeyPressEvent {
    pub fn new(key: Key, modifiers: KeyboardModifiers, text: Option<String>) -> Self {
        Self {
            base: EventBase::new(),
            key,
            modifiers,
            text,
        }
    }
}

/// Every event a widget can receive.
#[derive(Debug, Clone)]
pub enum WidgetEvent {
    MousePress(MousePressEvent),
    MouseRelease(MouseReleaseEvent),
    MouseMove(MouseMoveEvent),
    Wheel(WheelEvent),
    Enter(EnterEvent),
    Leave(LeaveEvent),
    FocusIn(FocusInEvent),
    FocusOut(FocusOutEvent),
    KeyPress(KeyPressEvent),
    DragEnter(DragEnterEvent),
    DragLeave(DragLeaveEvent),
    Drop(DropEvent),
}

impl WidgetEvent {
    fn base(&self) -> &EventBase {
        match self {
            Self::MousePress(e) => &e.base,
            Self::MouseRelease(e) => &e.base,
            Self::MouseMove(e) => &e.base,
            Self::Wheel(e) => &e.base,
            Self::Enter(e) => &e.base,
            Self::Leave(e) => &e.base,
            Self::FocusIn(e) => &e.base,
            Self::FocusOut(e) => &e.base,
            Self::KeyPress(e) => &e.base,
            Self::DragEnter(e) => &e.base,
            Self::DragLeave(e) => &e.base,
            Self::Drop(e) => &e.base,
        }
    }

    fn base_mut(&mut self) -> &mut EventBase {
        match self {
            Self::MousePress(e) => &mut e.base,
            Self::MouseRelease(e) => &mut e.base,
            Self::MouseMove(e) => &mut e.base,
            Self::Wheel(e) => &mut e.base,
            Self::Enter(e) => &mut e.base,
            Self::Leave(e) => &mut e.base,
            Self::FocusIn(e) => &mut e.base,
            Self::FocusOut(e) => &mut e.base,
            Self::KeyPress(e) => &mut e.base,
            Self::DragEnter(e) => &mut e.base,
            Self::DragLeave(e) => &mut e.base,
            Self::Drop(e) => &mut e.base,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.base().is_accepted()
    }

    pub fn accept(&mut self) {
        self.base_mut().accept();
    }

    pub fn ignore(&mut self) {
        self.base_mut().ignore();
    }

    /// Whether the event should continue to the next candidate.
    pub fn should_propagate(&self) -> bool {
        !self.is_accepted()
    }

    /// Position relative to the receiving widget, for positional events.
    pub fn local_pos(&self) -> Option<Point> {
        match self {
            Self::MousePress(e) => Some(e.local_pos),
            Self::MouseRelease(e) => Some(e.local_pos),
            Self::MouseMove(e) => Some(e.local_pos),
            Self::Wheel(e) => Some(e.local_pos),
            Self::Enter(e) => Some(e.local_pos),
            Self::DragEnter(e) => Some(e.local_pos),
            Self::Drop(e) => Some(e.local_pos),
            _ => None,
        }
    }

    /// Rebase a positional event onto a widget whose window origin is `origin`.
    pub(crate) fn set_local_origin(&mut self, origin: Point) {
        match self {
            Self::MousePress(e) => e.local_pos = e.window_pos - origin,
            Self::MouseRelease(e) => e.local_pos = e.window_pos - origin,
            Self::MouseMove(e) => e.local_pos = e.window_pos - origin,
            Self::Wheel(e) => e.local_pos = e.window_pos - origin,
            Self::DragEnter(e) => e.local_pos = e.window_pos - origin,
            Self::Drop(e) => e.local_pos = e.window_pos - origin,
            _ => {}
        }
    }

    /// Whether this is pointer input that is routed by hit testing.
    pub fn is_pointer(&self) -> bool {
        matches!(
            self,
            Self::MousePress(_) | Self::MouseRelease(_) | Self::MouseMove(_) | Self::Wheel(_)
        )
    }

    /// Short name used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MousePress(_) => "mouse_press",
            Self::MouseRelease(_) => "mouse_release",
            Self::MouseMove(_) => "mouse_move",
            Self::Wheel(_) => "wheel",
            Self::Enter(_) => "enter",
            Self::Leave(_) => "leave",
            Self::FocusIn(_) => "focus_in",
            Self::FocusOut(_) => "focus_out",
            Self::KeyPress(_) => "key_press",
            Self::DragEnter(_) => "drag_enter",
            Self::DragLeave(_) => "drag_leave",
            Self::Drop(_) => "drop",
        }
    }
}
