//! Focus management for widget trees.
//!
//! [`FocusManager`] tracks the single widget that receives keyboard input.
//! Focus moves when a focusable widget is clicked, when a handler requests
//! it, or on Tab/Shift+Tab. A focused widget that becomes hidden (itself or
//! through an ancestor) or is destroyed loses focus.
//!
//! # Tab Order
//!
//! Tab order is a depth-first pre-order walk from the input root, visiting
//! children in stacking order. Hidden subtrees are skipped and only focusable
//! widgets are included. Navigation wraps at both ends.

use trellis_core::ObjectId;

use super::dispatcher::{Outbox, send_event};
use super::events::{EventBase, FocusInEvent, FocusOutEvent, FocusReason, WidgetEvent};
use super::tree::WidgetAccess;
use crate::error::HandlerError;

/// Manages keyboard focus for a widget tree.
///
/// On a change the manager first updates both widgets' focus flags, then
/// sends a `FocusOut` to the old widget and a `FocusIn` to the new one.
/// Focus events go straight to their target and do not propagate.
#[derive(Debug, Default)]
pub struct FocusManager {
    focused: Option<ObjectId>,
}

impl FocusManager {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn focused_widget(&self) -> Option<ObjectId> {
        self.focused
    }

    #[inline]
    pub fn has_focus(&self, widget: ObjectId) -> bool {
        self.focused == Some(widget)
    }

    /// Whether `widget` may take focus right now.
    pub fn can_focus<S: WidgetAccess + ?Sized>(storage: &S, widget: ObjectId) -> bool {
        storage
            .get_widget(widget)
            .is_some_and(|w| w.is_focusable())
            && storage.is_widget_effectively_visible(widget)
    }

    /// Focus `widget`. Returns `Ok(false)` and leaves focus unchanged when
    /// the widget is not focusable or not visible.
    pub(crate) fn set_focus<S: WidgetAccess + ?Sized>(
        &mut self,
        storage: &mut S,
        outbox: &mut Outbox,
        widget: ObjectId,
        reason: FocusReason,
    ) -> Result<bool, HandlerError> {
        if !Self::can_focus(&*storage, widget) {
            return Ok(false);
        }
        if self.focused == Some(widget) {
            return Ok(true);
        }

        let old = self.focused.replace(widget);
        if let Some(old) = old
            && let Some(w) = storage.get_widget_mut(old)
        {
            w.widget_base_mut().set_focused(false);
        }
        if let Some(w) = storage.get_widget_mut(widget) {
            w.widget_base_mut().set_focused(true);
        }
        tracing::debug!(target: "trellis::dispatch", ?old, new = ?widget, ?reason, "focus changed");

        let out = match old {
            Some(old) => send_focus_out(storage, outbox, old, reason),
            None => Ok(false),
        };
        let into = send_focus_in(storage, outbox, widget, reason);
        out.and(into).map(|_| true)
    }

    /// Remove focus from the focused widget, if any.
    pub(crate) fn clear_focus<S: WidgetAccess + ?Sized>(
        &mut self,
        storage: &mut S,
        outbox: &mut Outbox,
        reason: FocusReason,
    ) -> Result<(), HandlerError> {
        let Some(old) = self.focused.take() else {
            return Ok(());
        };
        tracing::debug!(target: "trellis::dispatch", ?old, ?reason, "focus cleared");
        match storage.get_widget_mut(old) {
            Some(w) => {
                w.widget_base_mut().set_focused(false);
                send_focus_out(storage, outbox, old, reason).map(|_| ())
            }
            None => Ok(()),
        }
    }

    /// Drop focus from a widget that is gone or no longer visible.
    pub(crate) fn validate<S: WidgetAccess + ?Sized>(
        &mut self,
        storage: &mut S,
        outbox: &mut Outbox,
    ) -> Result<(), HandlerError> {
        match self.focused {
            Some(id) if !storage.is_widget_effectively_visible(id) => {
                self.clear_focus(storage, outbox, FocusReason::Hidden)
            }
            _ => Ok(()),
        }
    }

    /// Forget a destroyed widget without sending it events.
    pub(crate) fn forget(&mut self, widget: ObjectId) {
        if self.focused == Some(widget) {
            self.focused = None;
        }
    }

    /// Move focus forward in tab order under `root`.
    pub(crate) fn focus_next<S: WidgetAccess + ?Sized>(
        &mut self,
        storage: &mut S,
        outbox: &mut Outbox,
        root: ObjectId,
    ) -> Result<bool, HandlerError> {
        let order = Self::tab_order(&*storage, root);
        let next = match self.focused.and_then(|f| order.iter().position(|&id| id == f)) {
            Some(pos) => order.get((pos + 1) % order.len()),
            None => order.first(),
        };
        match next.copied() {
            Some(id) => self.set_focus(storage, outbox, id, FocusReason::Tab),
            None => Ok(false),
        }
    }

    /// Move focus backward in tab order under `root`.
    pub(crate) fn focus_previous<S: WidgetAccess + ?Sized>(
        &mut self,
        storage: &mut S,
        outbox: &mut Outbox,
        root: ObjectId,
    ) -> Result<bool, HandlerError> {
        let order = Self::tab_order(&*storage, root);
        let previous = match self.focused.and_then(|f| order.iter().position(|&id| id == f)) {
            Some(pos) => order.get((pos + order.len() - 1) % order.len()),
            None => order.last(),
        };
        match previous.copied() {
            Some(id) => self.set_focus(storage, outbox, id, FocusReason::Backtab),
            None => Ok(false),
        }
    }

    /// Focusable, visible widgets under `root` in tab order.
    pub fn tab_order<S: WidgetAccess + ?Sized>(storage: &S, root: ObjectId) -> Vec<ObjectId> {
        let mut order = Vec::new();
        collect_tab_order(storage, root, &mut order);
        order
    }
}

fn collect_tab_order<S: WidgetAccess + ?Sized>(
    storage: &S,
    widget: ObjectId,
    order: &mut Vec<ObjectId>,
) {
    let Some(w) = storage.get_widget(widget) else {
        return;
    };
    if !storage.is_widget_visible(widget) {
        return;
    }
    if w.is_focusable() {
        order.push(widget);
    }
    for child in storage.get_children(widget) {
        collect_tab_order(storage, child, order);
    }
}

fn send_focus_out<S: WidgetAccess + ?Sized>(
    storage: &mut S,
    outbox: &mut Outbox,
    widget: ObjectId,
    reason: FocusReason,
) -> Result<bool, HandlerError> {
    let mut event = WidgetEvent::FocusOut(FocusOutEvent {
        base: EventBase::new(),
        reason,
    });
    send_event(storage, widget, &mut event, outbox)
}

fn send_focus_in<S: WidgetAccess + ?Sized>(
    storage: &mut S,
    outbox: &mut Outbox,
    widget: ObjectId,
    reason: FocusReason,
) -> Result<bool, HandlerError> {
    let mut event = WidgetEvent::FocusIn(FocusInEvent {
        base: EventBase::new(),
        reason,
    });
    send_event(storage, widget, &mut event, outbox)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::widget::base::WidgetBase;
    use crate::widget::traits::{EventContext, EventResult, PaintContext, Widget};
    use crate::widget::tree::WidgetTree;

    type Log = Arc<Mutex<Vec<(ObjectId, &'static str)>>>;

    struct Field {
        base: WidgetBase,
        log: Log,
    }

    impl Field {
        fn new(log: &Log, focusable: bool) -> Self {
            let mut base = WidgetBase::new();
            base.set_focusable(focusable);
            Self {
                base,
                log: log.clone(),
            }
        }
    }

    impl Widget for Field {
        fn widget_base(&self) -> &WidgetBase {
            &self.base
        }

        fn widget_base_mut(&mut self) -> &mut WidgetBase {
            &mut self.base
        }

        fn paint(&self, _ctx: &mut PaintContext<'_>) {}

        fn event(&mut self, ctx: &mut EventContext<'_>, event: &mut WidgetEvent) -> EventResult {
            self.log.lock().push((ctx.widget(), event.kind()));
            Ok(false)
        }
    }

    fn setup() -> (WidgetTree, ObjectId, Vec<ObjectId>, Log) {
        let log: Log = Arc::default();
        let mut tree = WidgetTree::new();
        let root = tree.insert(Field::new(&log, false));
        let a = tree.insert_child(root, Field::new(&log, true)).unwrap();
        let panel = tree.insert_child(root, Field::new(&log, false)).unwrap();
        let b = tree.insert_child(panel, Field::new(&log, true)).unwrap();
        let c = tree.insert_child(root, Field::new(&log, true)).unwrap();
        (tree, root, vec![a, panel, b, c], log)
    }

    #[test]
    fn test_tab_order_is_preorder_of_focusable() {
        let (mut tree, root, ids, _) = setup();
        assert_eq!(FocusManager::tab_order(&tree, root), vec![ids[0], ids[2], ids[3]]);

        tree.set_visible(ids[1], false).unwrap();
        assert_eq!(FocusManager::tab_order(&tree, root), vec![ids[0], ids[3]]);
    }

    #[test]
    fn test_focus_events_out_then_in() {
        let (mut tree, _, ids, log) = setup();
        let mut focus = FocusManager::new();
        let mut outbox = Outbox::new(4.0);

        assert!(focus.set_focus(&mut tree, &mut outbox, ids[0], FocusReason::Mouse).unwrap());
        log.lock().clear();
        assert!(focus.set_focus(&mut tree, &mut outbox, ids[3], FocusReason::Mouse).unwrap());

        assert_eq!(*log.lock(), vec![(ids[0], "focus_out"), (ids[3], "focus_in")]);
        assert!(!tree.widget(ids[0]).unwrap().has_focus());
        assert!(tree.widget(ids[3]).unwrap().has_focus());

        // Not focusable.
        assert!(!focus.set_focus(&mut tree, &mut outbox, ids[1], FocusReason::Other).unwrap());
        assert_eq!(focus.focused_widget(), Some(ids[3]));
    }

    #[test]
    fn test_tab_wraps_both_ways() {
        let (mut tree, root, ids, _) = setup();
        let mut focus = FocusManager::new();
        let mut outbox = Outbox::new(4.0);

        focus.focus_next(&mut tree, &mut outbox, root).unwrap();
        assert_eq!(focus.focused_widget(), Some(ids[0]));
        focus.focus_previous(&mut tree, &mut outbox, root).unwrap();
        assert_eq!(focus.focused_widget(), Some(ids[3]));
        focus.focus_next(&mut tree, &mut outbox, root).unwrap();
        assert_eq!(focus.focused_widget(), Some(ids[0]));
    }

    #[test]
    fn test_hidden_ancestor_clears_focus() {
        let (mut tree, _, ids, log) = setup();
        let mut focus = FocusManager::new();
        let mut outbox = Outbox::new(4.0);
        focus.set_focus(&mut tree, &mut outbox, ids[2], FocusReason::Other).unwrap();

        tree.set_visible(ids[1], false).unwrap();
        log.lock().clear();
        focus.validate(&mut tree, &mut outbox).unwrap();

        assert_eq!(focus.focused_widget(), None);
        assert_eq!(*log.lock(), vec![(ids[2], "focus_out")]);
        assert!(!focus.set_focus(&mut tree, &mut outbox, ids[2], FocusReason::Other).unwrap());
    }
}
