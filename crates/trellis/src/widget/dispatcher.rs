//! Event dispatching and propagation for widgets.
//!
//! [`EventDispatcher`] turns each [`RawEvent`] from the backend into
//! [`WidgetEvent`]s and delivers them through the [`WidgetTree`].
//!
//! # Event Flow
//!
//! Pointer events are routed by hit testing. The tree under the input root
//! is walked depth first in reverse child order, children before their
//! parent, and every visible widget whose window rectangle contains the
//! pointer becomes a candidate. Candidates are offered the event in that
//! order:
//!
//! 1. **Layout**: if the candidate hosts a layout that consumes pointer input
//!    (a splitter handle), the layout sees the event first. Consuming it
//!    re-arranges the host.
//!
//! 2. **Widget Handler**: otherwise the widget's `event()` method is called.
//!
//! The first candidate that accepts stops propagation; an event nobody
//! accepts is dropped. A widget reporting
//! [`overlay_active`](super::Widget::overlay_active) is a candidate wherever
//! the pointer is.
//!
//! The widget that accepts a press grabs the pointer: it receives the
//! following moves and the release even outside its rectangle. Hover state
//! follows the latest pointer position regardless of any grab.
//!
//! Key presses go only to the focused widget, and never to one that has
//! been hidden since it took focus. An unaccepted Tab or Shift+Tab moves
//! focus.
//!
//! Drag-and-drop events are only offered to widgets that opted in with
//! [`set_accepts_drops`](super::WidgetBase::set_accepts_drops).
//!
//! # Requests
//!
//! Handlers never touch the tree directly. Whatever they queue on their
//! [`EventContext`] is applied here once delivery is over, even when a
//! handler failed.

use std::sync::Arc;

use trellis_core::ObjectId;
use trellis_render::{CursorShape, Key, MouseButton, Point, RawEvent, Rect};

use super::drag_drop::{DragData, DragEnterEvent, DragLeaveEvent, DropEvent};
use super::events::{
    EnterEvent, EventBase, FocusReason, KeyPressEvent, LeaveEvent, MouseMoveEvent,
    MousePressEvent, MouseReleaseEvent, WheelEvent, WidgetEvent,
};
use super::focus::FocusManager;
use super::modal::ModalHandle;
use super::traits::{EventContext, Request};
use super::tree::{WidgetAccess, WidgetTree};
use crate::error::HandlerError;

/// Rounds of request processing before the rest are dropped. Each round
/// can only be refilled by focus handlers asking for more focus changes.
const MAX_REQUEST_ROUNDS: usize = 16;

/// Requests queued by handlers during one dispatch.
#[derive(Debug)]
pub(crate) struct Outbox {
    requests: Vec<Request>,
    drag_threshold: f32,
}

impl Outbox {
    pub(crate) fn new(drag_threshold: f32) -> Self {
        Self {
            requests: Vec::new(),
            drag_threshold,
        }
    }

    fn take(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.requests)
    }
}

/// Deliver `event` to a single widget without propagation.
///
/// Returns whether the widget accepted it, either by calling `accept()` or
/// by returning `Ok(true)`. A missing widget ignores the event.
pub(crate) fn send_event<S: WidgetAccess + ?Sized>(
    storage: &mut S,
    id: ObjectId,
    event: &mut WidgetEvent,
    outbox: &mut Outbox,
) -> Result<bool, HandlerError> {
    let threshold = outbox.drag_threshold;
    let Some(widget) = storage.get_widget_mut(id) else {
        return Ok(false);
    };
    let mut ctx = EventContext::new(id, &mut outbox.requests, threshold);
    if widget.event(&mut ctx, event).map_err(|e| e.in_widget(id))? {
        event.accept();
    }
    Ok(event.is_accepted())
}

/// A request the dispatcher cannot satisfy on its own.
#[derive(Debug)]
pub(crate) enum AppRequest {
    OpenModal { root: ObjectId, handle: ModalHandle },
    Quit,
}

#[derive(Debug)]
struct ActiveDrag {
    data: Arc<DragData>,
    target: Option<ObjectId>,
}

/// Routes backend input through a widget tree.
///
/// The dispatcher owns the interaction state that outlives a single event:
/// focus, hover, pointer grab, the open popup and any drag in progress.
#[derive(Debug)]
pub struct EventDispatcher {
    focus: FocusManager,
    hovered: Option<ObjectId>,
    grab: Option<ObjectId>,
    popup: Option<ObjectId>,
    drag: Option<ActiveDrag>,
    last_pointer: Option<Point>,
    outbox: Outbox,
    app_requests: Vec<AppRequest>,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new(4.0)
    }
}

impl EventDispatcher {
    /// Create a dispatcher. `drag_threshold` is handed to handlers through
    /// [`EventContext::drag_threshold`].
    pub fn new(drag_threshold: f32) -> Self {
        Self {
            focus: FocusManager::new(),
            hovered: None,
            grab: None,
            popup: None,
            drag: None,
            last_pointer: None,
            outbox: Outbox::new(drag_threshold),
            app_requests: Vec::new(),
        }
    }

    pub fn focused_widget(&self) -> Option<ObjectId> {
        self.focus.focused_widget()
    }

    pub fn hovered_widget(&self) -> Option<ObjectId> {
        self.hovered
    }

    /// The widget holding the implicit pointer grab.
    pub fn grab_widget(&self) -> Option<ObjectId> {
        self.grab
    }

    pub fn popup(&self) -> Option<ObjectId> {
        self.popup
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// The current drop target of an internal drag.
    pub fn drop_target(&self) -> Option<ObjectId> {
        self.drag.as_ref().and_then(|d| d.target)
    }

    pub fn last_pointer(&self) -> Option<Point> {
        self.last_pointer
    }

    /// Dispatch one raw event to the subtree of `root`.
    ///
    /// Returns whether any widget accepted it. Resize and quit events are
    /// left to the application and return `Ok(false)`.
    pub fn dispatch(
        &mut self,
        tree: &mut WidgetTree,
        root: ObjectId,
        event: &RawEvent,
    ) -> Result<bool, HandlerError> {
        let delivered = self.dispatch_raw(tree, root, event);
        let processed = self.process_requests(tree, root);
        let validated = self.validate(tree);
        let accepted = delivered?;
        processed?;
        validated?;
        Ok(accepted)
    }

    fn dispatch_raw(
        &mut self,
        tree: &mut WidgetTree,
        root: ObjectId,
        event: &RawEvent,
    ) -> Result<bool, HandlerError> {
        match event {
            RawEvent::PointerDown {
                pos,
                button,
                modifiers,
            } => {
                self.last_pointer = Some(*pos);
                let press = MousePressEvent::new(*button, *pos, *modifiers);
                self.pointer_down(tree, root, *pos, *button, press)
            }
            RawEvent::PointerMove {
                pos,
                button,
                modifiers,
            } => {
                self.last_pointer = Some(*pos);
                let event = MouseMoveEvent::new(*button, *pos, *modifiers);
                self.pointer_move(tree, root, *pos, event)
            }
            RawEvent::PointerUp {
                pos,
                button,
                modifiers,
            } => {
                self.last_pointer = Some(*pos);
                let event = MouseReleaseEvent::new(*button, *pos, *modifiers);
                self.pointer_up(tree, root, *pos, event)
            }
            RawEvent::Wheel { pos, delta } => {
                self.last_pointer = Some(*pos);
                let mut event = WidgetEvent::Wheel(WheelEvent::new(*pos, *delta));
                Ok(self.route(tree, root, *pos, &mut event)?.is_some())
            }
            RawEvent::KeyDown {
                key,
                modifiers,
                text,
            } => {
                let mut event =
                    WidgetEvent::KeyPress(KeyPressEvent::new(*key, *modifiers, text.clone()));
                self.key_down(tree, root, &mut event)
            }
            RawEvent::FileDrop { path } => {
                let data = Arc::new(DragData::from_paths([path.clone()]));
                self.file_drop(tree, root, data)
            }
            RawEvent::Resize { .. } | RawEvent::Quit => Ok(false),
        }
    }

    // =========================================================================
    // Pointer input
    // =========================================================================

    fn pointer_down(
        &mut self,
        tree: &mut WidgetTree,
        root: ObjectId,
        pos: Point,
        button: MouseButton,
        press: MousePressEvent,
    ) -> Result<bool, HandlerError> {
        if let Some(popup) = self.popup
            && !self.popup_contains(tree, popup, pos)
        {
            tracing::debug!(target: "trellis::dispatch", ?popup, "press outside popup closes it");
            self.close_popup(tree);
            return Ok(true);
        }

        let candidates = self.candidates(tree, root, pos);
        if button == MouseButton::Left
            && let Some(&(target, _)) = candidates
                .iter()
                .find(|(id, _)| FocusManager::can_focus(&*tree, *id))
        {
            self.focus
                .set_focus(tree, &mut self.outbox, target, FocusReason::Mouse)?;
        }

        let mut event = WidgetEvent::MousePress(press);
        let accepted = self.deliver_chain(tree, &candidates, &mut event)?;
        if accepted.is_some() {
            self.grab = accepted;
        }
        tracing::trace!(target: "trellis::dispatch", ?pos, ?accepted, "pointer down");
        Ok(accepted.is_some())
    }

    fn pointer_move(
        &mut self,
        tree: &mut WidgetTree,
        root: ObjectId,
        pos: Point,
        event: MouseMoveEvent,
    ) -> Result<bool, HandlerError> {
        self.update_hover(tree, root, pos)?;

        if self.drag.is_some() {
            self.update_drop_target(tree, root, pos)?;
            return Ok(true);
        }

        let mut event = WidgetEvent::MouseMove(event);
        match self.grab {
            Some(grab) if tree.contains(grab) => self.deliver_to(tree, grab, &mut event),
            _ => Ok(self.route(tree, root, pos, &mut event)?.is_some()),
        }
    }

    fn pointer_up(
        &mut self,
        tree: &mut WidgetTree,
        root: ObjectId,
        pos: Point,
        event: MouseReleaseEvent,
    ) -> Result<bool, HandlerError> {
        let grab = self.grab.take();

        if let Some(drag) = self.drag.take() {
            let target = self.update_drop_target_with(tree, root, pos, &drag.data, drag.target)?;
            if let Some(target) = target {
                tracing::debug!(target: "trellis::dispatch", ?target, "drop");
                let mut drop = WidgetEvent::Drop(DropEvent::new(pos, drag.data.clone()));
                self.deliver_to(tree, target, &mut drop)?;
            }
            // The source still gets its release.
            if let Some(grab) = grab
                && tree.contains(grab)
            {
                let mut event = WidgetEvent::MouseRelease(event);
                self.deliver_to(tree, grab, &mut event)?;
            }
            return Ok(true);
        }

        let mut event = WidgetEvent::MouseRelease(event);
        match grab {
            Some(grab) if tree.contains(grab) => self.deliver_to(tree, grab, &mut event),
            _ => Ok(self.route(tree, root, pos, &mut event)?.is_some()),
        }
    }

    fn update_hover(
        &mut self,
        tree: &mut WidgetTree,
        root: ObjectId,
        pos: Point,
    ) -> Result<(), HandlerError> {
        let hit = tree.hit_test(root, pos);
        if hit == self.hovered {
            return Ok(());
        }
        let old = std::mem::replace(&mut self.hovered, hit);
        tracing::trace!(target: "trellis::dispatch", ?old, new = ?hit, "hover changed");

        let left = match old {
            Some(old) if tree.contains(old) => {
                if let Some(w) = tree.widget_mut(old) {
                    w.widget_base_mut().set_hovered(false);
                }
                let mut event = WidgetEvent::Leave(LeaveEvent::default());
                self.deliver_to(tree, old, &mut event).map(|_| ())
            }
            _ => Ok(()),
        };
        let entered = match hit {
            Some(new) => {
                if let Some(w) = tree.widget_mut(new) {
                    w.widget_base_mut().set_hovered(true);
                }
                let origin = tree.absolute_origin(new).unwrap_or(Point::ZERO);
                let mut event = WidgetEvent::Enter(EnterEvent {
                    base: EventBase::new(),
                    local_pos: pos - origin,
                });
                self.deliver_to(tree, new, &mut event).map(|_| ())
            }
            None => Ok(()),
        };
        left.and(entered)
    }

    // =========================================================================
    // Keyboard input
    // =========================================================================

    fn key_down(
        &mut self,
        tree: &mut WidgetTree,
        root: ObjectId,
        event: &mut WidgetEvent,
    ) -> Result<bool, HandlerError> {
        let target = self
            .focus
            .focused_widget()
            .filter(|&id| tree.is_ancestor_of(root, id));

        if let Some(id) = target {
            if !tree.is_effectively_visible(id) {
                tracing::trace!(target: "trellis::dispatch", ?id, "focused widget hidden, key dropped");
                self.focus.validate(tree, &mut self.outbox)?;
                return Ok(false);
            }
            if send_event(tree, id, event, &mut self.outbox)? {
                tracing::trace!(target: "trellis::dispatch", ?id, "key accepted");
                return Ok(true);
            }
        }

        let WidgetEvent::KeyPress(key) = event else {
            return Ok(false);
        };
        match key.key {
            Key::Tab if key.modifiers.shift => {
                self.focus.focus_previous(tree, &mut self.outbox, root)
            }
            Key::Tab => self.focus.focus_next(tree, &mut self.outbox, root),
            Key::Escape if self.popup.is_some() => {
                self.close_popup(tree);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    // =========================================================================
    // Drag and drop
    // =========================================================================

    fn update_drop_target(
        &mut self,
        tree: &mut WidgetTree,
        root: ObjectId,
        pos: Point,
    ) -> Result<(), HandlerError> {
        let Some(drag) = self.drag.as_ref() else {
            return Ok(());
        };
        let data = drag.data.clone();
        let current = drag.target;
        let target = self.update_drop_target_with(tree, root, pos, &data, current)?;
        if let Some(drag) = self.drag.as_mut() {
            drag.target = target;
        }
        Ok(())
    }

    /// Find the drop target under `pos`, sending enter and leave events as
    /// it changes. Returns the new target.
    fn update_drop_target_with(
        &mut self,
        tree: &mut WidgetTree,
        root: ObjectId,
        pos: Point,
        data: &Arc<DragData>,
        current: Option<ObjectId>,
    ) -> Result<Option<ObjectId>, HandlerError> {
        let mut target = None;
        for (id, origin) in self.candidates(tree, root, pos) {
            if !accepts_drops(tree, id) {
                continue;
            }
            if Some(id) == current {
                target = current;
                break;
            }
            let mut event = WidgetEvent::DragEnter(DragEnterEvent::new(pos, data.clone()));
            event.set_local_origin(origin);
            if send_event(tree, id, &mut event, &mut self.outbox)? {
                target = Some(id);
                break;
            }
        }

        if target != current
            && let Some(old) = current
        {
            let mut event = WidgetEvent::DragLeave(DragLeaveEvent::default());
            send_event(tree, old, &mut event, &mut self.outbox)?;
        }
        if target != current {
            tracing::trace!(target: "trellis::dispatch", old = ?current, new = ?target, "drop target changed");
        }
        Ok(target)
    }

    fn file_drop(
        &mut self,
        tree: &mut WidgetTree,
        root: ObjectId,
        data: Arc<DragData>,
    ) -> Result<bool, HandlerError> {
        let pos = self.last_pointer.unwrap_or(Point::ZERO);
        let Some(target) = self.update_drop_target_with(tree, root, pos, &data, None)? else {
            tracing::debug!(target: "trellis::dispatch", ?pos, "file drop had no target");
            return Ok(false);
        };
        let mut event = WidgetEvent::Drop(DropEvent::new(pos, data));
        self.deliver_to(tree, target, &mut event)
    }

    // =========================================================================
    // Routing
    // =========================================================================

    /// Widgets that may receive a pointer event at `pos`, in delivery order,
    /// paired with their window origin. An open popup comes first.
    fn candidates(&self, tree: &WidgetTree, root: ObjectId, pos: Point) -> Vec<(ObjectId, Point)> {
        let mut out = Vec::new();
        if let Some(popup) = self.popup {
            collect_candidates(tree, popup, parent_origin(tree, popup), pos, &mut out);
        }
        let mut rest = Vec::new();
        collect_candidates(tree, root, parent_origin(tree, root), pos, &mut rest);
        rest.retain(|(id, _)| !out.iter().any(|(p, _)| p == id));
        out.append(&mut rest);
        out
    }

    fn route(
        &mut self,
        tree: &mut WidgetTree,
        root: ObjectId,
        pos: Point,
        event: &mut WidgetEvent,
    ) -> Result<Option<ObjectId>, HandlerError> {
        let candidates = self.candidates(tree, root, pos);
        self.deliver_chain(tree, &candidates, event)
    }

    fn deliver_chain(
        &mut self,
        tree: &mut WidgetTree,
        candidates: &[(ObjectId, Point)],
        event: &mut WidgetEvent,
    ) -> Result<Option<ObjectId>, HandlerError> {
        for &(id, origin) in candidates {
            if self.deliver_at(tree, id, origin, event)? {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    fn deliver_to(
        &mut self,
        tree: &mut WidgetTree,
        id: ObjectId,
        event: &mut WidgetEvent,
    ) -> Result<bool, HandlerError> {
        let origin = tree.absolute_origin(id).unwrap_or(Point::ZERO);
        self.deliver_at(tree, id, origin, event)
    }

    /// Offer the event to the layout hosted by `id`, then to the widget.
    fn deliver_at(
        &mut self,
        tree: &mut WidgetTree,
        id: ObjectId,
        origin: Point,
        event: &mut WidgetEvent,
    ) -> Result<bool, HandlerError> {
        event.set_local_origin(origin);
        if let Some(layout) = tree.layout_mut(id)
            && layout.pointer_event(event)
        {
            event.accept();
            tree.arrange(id);
            return Ok(true);
        }
        send_event(tree, id, event, &mut self.outbox)
    }

    fn popup_contains(&self, tree: &WidgetTree, popup: ObjectId, pos: Point) -> bool {
        if tree.widget(popup).is_some_and(|w| w.overlay_active()) {
            return true;
        }
        tree.hit_test(popup, pos).is_some()
    }

    // =========================================================================
    // Requests
    // =========================================================================

    fn process_requests(
        &mut self,
        tree: &mut WidgetTree,
        root: ObjectId,
    ) -> Result<(), HandlerError> {
        let mut result = Ok(());
        for _ in 0..MAX_REQUEST_ROUNDS {
            let requests = self.outbox.take();
            if requests.is_empty() {
                return result;
            }
            for request in requests {
                let applied = self.apply_request(tree, root, request);
                if result.is_ok() {
                    result = applied;
                }
            }
        }
        let dropped = self.outbox.take().len();
        tracing::warn!(target: "trellis::dispatch", dropped, "request queue did not settle");
        result
    }

    fn apply_request(
        &mut self,
        tree: &mut WidgetTree,
        root: ObjectId,
        request: Request,
    ) -> Result<(), HandlerError> {
        tracing::trace!(target: "trellis::dispatch", ?request, "applying request");
        match request {
            Request::SetFocus(id, reason) => {
                self.focus.set_focus(tree, &mut self.outbox, id, reason)?;
            }
            Request::ClearFocus => {
                self.focus
                    .clear_focus(tree, &mut self.outbox, FocusReason::Other)?;
            }
            Request::OpenPopup(popup) => {
                if self.popup.is_some_and(|p| p != popup) {
                    self.close_popup(tree);
                }
                if tree.set_visible(popup, true).is_ok() {
                    if let Err(err) = tree.raise(popup) {
                        tracing::warn!(target: "trellis::dispatch", ?popup, %err, "popup not raised");
                    }
                    self.popup = Some(popup);
                    tracing::debug!(target: "trellis::dispatch", ?popup, "popup opened");
                }
            }
            Request::ClosePopup => self.close_popup(tree),
            Request::StartDrag(data) => {
                tracing::debug!(target: "trellis::dispatch", source = ?data.source(), "drag started");
                self.drag = Some(ActiveDrag {
                    data: Arc::new(data),
                    target: None,
                });
                if let Some(pos) = self.last_pointer {
                    self.update_drop_target(tree, root, pos)?;
                }
            }
            Request::OpenModal { root, handle } => {
                self.app_requests.push(AppRequest::OpenModal { root, handle });
            }
            Request::Quit => self.app_requests.push(AppRequest::Quit),
        }
        Ok(())
    }

    fn close_popup(&mut self, tree: &mut WidgetTree) {
        if let Some(popup) = self.popup.take() {
            if let Err(err) = tree.set_visible(popup, false) {
                tracing::warn!(target: "trellis::dispatch", ?popup, %err, "popup not hidden");
            }
            tracing::debug!(target: "trellis::dispatch", ?popup, "popup closed");
        }
    }

    /// Drop state that points at hidden widgets.
    fn validate(&mut self, tree: &mut WidgetTree) -> Result<(), HandlerError> {
        if self.popup.is_some_and(|p| !tree.is_effectively_visible(p)) {
            self.popup = None;
        }
        if self.grab.is_some_and(|g| !tree.is_effectively_visible(g)) {
            self.grab = None;
        }
        self.focus.validate(tree, &mut self.outbox)
    }

    pub(crate) fn take_app_requests(&mut self) -> Vec<AppRequest> {
        std::mem::take(&mut self.app_requests)
    }

    // =========================================================================
    // State management
    // =========================================================================

    /// Focus `id` as if requested by code.
    pub fn set_focus(
        &mut self,
        tree: &mut WidgetTree,
        id: ObjectId,
        reason: FocusReason,
    ) -> Result<bool, HandlerError> {
        let focused = self.focus.set_focus(tree, &mut self.outbox, id, reason);
        let mut root = id;
        while let Some(parent) = tree.parent(root) {
            root = parent;
        }
        let processed = self.process_requests(tree, root);
        let focused = focused?;
        processed?;
        Ok(focused)
    }

    pub fn clear_focus(&mut self, tree: &mut WidgetTree, reason: FocusReason) -> Result<(), HandlerError> {
        self.focus.clear_focus(tree, &mut self.outbox, reason)
    }

    /// Clear focus if the focused widget is no longer visible.
    pub fn validate_focus(&mut self, tree: &mut WidgetTree) -> Result<(), HandlerError> {
        self.validate(tree)
    }

    /// Forget destroyed widgets without sending them events.
    pub fn forget(&mut self, removed: &[ObjectId]) {
        for &id in removed {
            self.focus.forget(id);
            if self.hovered == Some(id) {
                self.hovered = None;
            }
            if self.grab == Some(id) {
                self.grab = None;
            }
            if self.popup == Some(id) {
                self.popup = None;
            }
            if let Some(drag) = self.drag.as_mut()
                && drag.target == Some(id)
            {
                drag.target = None;
            }
        }
    }

    /// Release the grab, hover and any drag, e.g. when a modal scope opens
    /// above the widgets holding them.
    pub fn reset_pointer(&mut self, tree: &mut WidgetTree) -> Result<(), HandlerError> {
        self.grab = None;
        self.drag = None;
        match self.hovered.take() {
            Some(old) if tree.contains(old) => {
                if let Some(w) = tree.widget_mut(old) {
                    w.widget_base_mut().set_hovered(false);
                }
                let mut event = WidgetEvent::Leave(LeaveEvent::default());
                self.deliver_to(tree, old, &mut event).map(|_| ())
            }
            _ => Ok(()),
        }
    }

    /// The cursor to show at the latest pointer position.
    ///
    /// Starts at the grab or hovered widget and walks up its ancestors,
    /// asking each hosted layout and then each widget. Defaults to the arrow.
    pub fn cursor(&self, tree: &WidgetTree) -> CursorShape {
        let mut current = self.grab.or(self.hovered);
        while let Some(id) = current {
            if let Some(layout) = tree.layout(id)
                && let Some(pos) = self.last_pointer
                && let Some(origin) = tree.absolute_origin(id)
                && let Some(shape) = layout.cursor_at(pos - origin)
            {
                return shape;
            }
            if let Some(shape) = tree.widget(id).and_then(|w| w.cursor()) {
                return shape;
            }
            current = tree.parent(id);
        }
        CursorShape::Arrow
    }
}

/// Window origin of the parent of `id`.
fn parent_origin(tree: &WidgetTree, id: ObjectId) -> Point {
    tree.parent(id)
        .and_then(|parent| tree.absolute_origin(parent))
        .unwrap_or(Point::ZERO)
}

fn collect_candidates(
    tree: &WidgetTree,
    id: ObjectId,
    parent_origin: Point,
    pos: Point,
    out: &mut Vec<(ObjectId, Point)>,
) {
    if !tree.is_visible(id) {
        return;
    }
    let Some(widget) = tree.widget(id) else {
        return;
    };
    let geometry = widget.geometry();
    let origin = parent_origin + geometry.origin;
    for &child in tree.children(id).iter().rev() {
        collect_candidates(tree, child, origin, pos, out);
    }
    if widget.overlay_active() || Rect::from_origin_size(origin, geometry.size).contains(pos) {
        out.push((id, origin));
    }
}

fn accepts_drops(tree: &WidgetTree, id: ObjectId) -> bool {
    tree.widget(id).is_some_and(|w| w.accepts_drops())
}
