//! The item graph: z-ordered, selectable, transformable items.
//!
//! Items are stored unordered; [`ItemGraph::items`] sorts them by z-value,
//! ties broken by insertion order. Hit testing walks that list from the
//! top and tests each item's position plus its content bounds. Rotation and
//! scale are not taken into account when hit testing, only when painting.
//!
//! # Selection
//!
//! A plain click on a selectable item makes it the only selected item; a
//! click with Shift or Ctrl held adds it to the selection instead. A plain
//! click on empty space clears the selection. Every mutator emits
//! [`selection_changed`](ItemGraph::selection_changed) at most once, no matter
//! how many items it touched.
//!
//! # Example
//!
//! ```
//! use trellis::graph::{ItemGraph, ShapeItem};
//! use trellis_render::{Color, Point, Rect};
//!
//! let mut graph = ItemGraph::new();
//! let a = graph.add_item(ShapeItem::rect(Rect::new(0.0, 0.0, 50.0, 50.0), Color::BLUE));
//! let b = graph.add_item(ShapeItem::rect(Rect::new(0.0, 0.0, 50.0, 50.0), Color::WHITE));
//! graph.set_z(a, 1.0).unwrap();
//!
//! assert_eq!(graph.items(), vec![b, a]);
//! assert_eq!(graph.item_at(Point::new(10.0, 10.0)), Some(a));
//! ```

use std::collections::HashMap;

use slotmap::SlotMap;
use trellis_core::Signal;
use trellis_render::{Color, KeyboardModifiers, Painter, Point, Rect, Stroke, Transform2D};

use super::item::{GraphItem, ItemContent, ItemFlags, ItemId};
use crate::error::GraphError;

/// Outline drawn around selected items.
const SELECTION_STROKE: Stroke = Stroke::new(Color::BLUE, 1.0);

/// An in-progress drag of the selected movable items.
#[derive(Debug)]
struct MoveDrag {
    press: Point,
    start: HashMap<ItemId, Point>,
    /// Item pressed without modifiers while already selected. It becomes the
    /// only selection on release unless the drag moved anything.
    pending_select: Option<ItemId>,
    moved: bool,
}

/// A z-ordered collection of items with a selection model.
pub struct ItemGraph {
    items: SlotMap<ItemId, GraphItem>,
    next_seq: u64,
    focus_item: Option<ItemId>,
    drag: Option<MoveDrag>,

    /// Emitted once per selection change.
    pub selection_changed: Signal<()>,
    /// Emitted with the new focus item.
    pub focus_item_changed: Signal<Option<ItemId>>,
}

impl Default for ItemGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ItemGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemGraph")
            .field("items", &self.items.len())
            .field("selected", &self.selected_items().len())
            .field("focus_item", &self.focus_item)
            .finish_non_exhaustive()
    }
}

impl ItemGraph {
    pub fn new() -> Self {
        Self {
            items: SlotMap::with_key(),
            next_seq: 0,
            focus_item: None,
            drag: None,
            selection_changed: Signal::new(),
            focus_item_changed: Signal::new(),
        }
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Add an item at the origin with z = 0.
    pub fn add_item(&mut self, content: impl ItemContent + 'static) -> ItemId {
        self.add_boxed(Box::new(content))
    }

    /// Add an item at `pos` with the given z-value.
    pub fn add_item_at(
        &mut self,
        content: impl ItemContent + 'static,
        pos: Point,
        z: f32,
    ) -> ItemId {
        let id = self.add_boxed(Box::new(content));
        if let Some(item) = self.items.get_mut(id) {
            item.pos = pos;
            item.z = z;
        }
        id
    }

    pub fn add_boxed(&mut self, content: Box<dyn ItemContent>) -> ItemId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let id = self.items.insert(GraphItem::new(content, seq));
        tracing::trace!(target: "trellis::graph", ?id, "item added");
        id
    }

    /// Remove an item. Emits `selection_changed` if it was selected.
    pub fn remove_item(&mut self, id: ItemId) -> Result<(), GraphError> {
        let item = self.items.remove(id).ok_or(GraphError::ItemNotFound(id))?;
        if let Some(drag) = self.drag.as_mut() {
            drag.start.remove(&id);
            if drag.pending_select == Some(id) {
                drag.pending_select = None;
            }
        }
        if self.focus_item == Some(id) {
            self.focus_item = None;
            self.focus_item_changed.emit(None);
        }
        tracing::trace!(target: "trellis::graph", ?id, "item removed");
        if item.selected {
            self.selection_changed.emit(());
        }
        Ok(())
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Every item, ascending by z-value. Equal z keeps insertion order.
    pub fn items(&self) -> Vec<ItemId> {
        let mut ordered: Vec<(ItemId, &GraphItem)> = self.items.iter().collect();
        ordered.sort_by(|(_, a), (_, b)| a.z.total_cmp(&b.z).then(a.seq.cmp(&b.seq)));
        ordered.into_iter().map(|(id, _)| id).collect()
    }

    fn get(&self, id: ItemId) -> Result<&GraphItem, GraphError> {
        self.items.get(id).ok_or(GraphError::ItemNotFound(id))
    }

    fn get_mut(&mut self, id: ItemId) -> Result<&mut GraphItem, GraphError> {
        self.items.get_mut(id).ok_or(GraphError::ItemNotFound(id))
    }

    pub fn content(&self, id: ItemId) -> Option<&dyn ItemContent> {
        self.items.get(id).map(|item| item.content.as_ref())
    }

    pub fn pos(&self, id: ItemId) -> Option<Point> {
        self.items.get(id).map(|item| item.pos)
    }

    pub fn set_pos(&mut self, id: ItemId, pos: Point) -> Result<(), GraphError> {
        self.get_mut(id)?.pos = pos;
        Ok(())
    }

    pub fn z(&self, id: ItemId) -> Option<f32> {
        self.items.get(id).map(|item| item.z)
    }

    pub fn set_z(&mut self, id: ItemId, z: f32) -> Result<(), GraphError> {
        self.get_mut(id)?.z = z;
        Ok(())
    }

    pub fn transform(&self, id: ItemId) -> Option<Transform2D> {
        self.items.get(id).map(|item| item.transform)
    }

    /// Set the item transform, applied around the item position when
    /// painting.
    pub fn set_transform(&mut self, id: ItemId, transform: Transform2D) -> Result<(), GraphError> {
        self.get_mut(id)?.transform = transform;
        Ok(())
    }

    pub fn opacity(&self, id: ItemId) -> Option<f32> {
        self.items.get(id).map(|item| item.opacity)
    }

    /// Set the opacity, clamped to 0.0..=1.0.
    pub fn set_opacity(&mut self, id: ItemId, opacity: f32) -> Result<(), GraphError> {
        self.get_mut(id)?.opacity = opacity.clamp(0.0, 1.0);
        Ok(())
    }

    pub fn flags(&self, id: ItemId) -> Option<ItemFlags> {
        self.items.get(id).map(|item| item.flags)
    }

    /// Change an item's flags. Clearing `selectable` deselects it.
    pub fn set_flags(&mut self, id: ItemId, flags: ItemFlags) -> Result<(), GraphError> {
        let item = self.get_mut(id)?;
        item.flags = flags;
        let deselected = !flags.selectable && std::mem::take(&mut item.selected);
        if !flags.focusable && self.focus_item == Some(id) {
            self.focus_item = None;
            self.focus_item_changed.emit(None);
        }
        if deselected {
            self.selection_changed.emit(());
        }
        Ok(())
    }

    /// Bounds used for hit testing, in graph coordinates.
    pub fn item_rect(&self, id: ItemId) -> Option<Rect> {
        self.items.get(id).map(GraphItem::hit_rect)
    }

    /// Union of every item's hit rectangle.
    pub fn bounding_rect(&self) -> Rect {
        self.items
            .values()
            .map(GraphItem::hit_rect)
            .reduce(|acc, r| acc.union(&r))
            .unwrap_or(Rect::ZERO)
    }

    // =========================================================================
    // Hit testing
    // =========================================================================

    /// The topmost item whose rectangle contains `point`.
    pub fn item_at(&self, point: Point) -> Option<ItemId> {
        self.items()
            .into_iter()
            .rev()
            .find(|&id| self.items[id].hit_rect().contains(point))
    }

    /// Every item containing `point`, topmost first.
    pub fn items_at(&self, point: Point) -> Vec<ItemId> {
        self.items()
            .into_iter()
            .rev()
            .filter(|&id| self.items[id].hit_rect().contains(point))
            .collect()
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn is_selected(&self, id: ItemId) -> bool {
        self.items.get(id).is_some_and(|item| item.selected)
    }

    /// Selected items in z order.
    pub fn selected_items(&self) -> Vec<ItemId> {
        self.items()
            .into_iter()
            .filter(|&id| self.items[id].selected)
            .collect()
    }

    /// Select or deselect one item. Returns whether the state changed.
    pub fn set_selected(&mut self, id: ItemId, selected: bool) -> Result<bool, GraphError> {
        let item = self.get_mut(id)?;
        if selected && !item.flags.selectable {
            return Err(GraphError::NotSelectable(id));
        }
        if item.selected == selected {
            return Ok(false);
        }
        item.selected = selected;
        self.selection_changed.emit(());
        Ok(true)
    }

    /// Replace the selection with `ids`. Non-selectable ids are rejected
    /// before anything changes.
    pub fn set_selection(
        &mut self,
        ids: impl IntoIterator<Item = ItemId>,
    ) -> Result<bool, GraphError> {
        let ids: Vec<ItemId> = ids.into_iter().collect();
        for &id in &ids {
            if !self.get(id)?.flags.selectable {
                return Err(GraphError::NotSelectable(id));
            }
        }
        let mut changed = false;
        for (id, item) in self.items.iter_mut() {
            let selected = ids.contains(&id);
            if item.selected != selected {
                item.selected = selected;
                changed = true;
            }
        }
        if changed {
            self.selection_changed.emit(());
        }
        Ok(changed)
    }

    /// Deselect everything. Returns whether anything was selected.
    pub fn clear_selection(&mut self) -> bool {
        let mut changed = false;
        for item in self.items.values_mut() {
            changed |= std::mem::take(&mut item.selected);
        }
        if changed {
            self.selection_changed.emit(());
        }
        changed
    }

    /// Select every selectable item.
    pub fn select_all(&mut self) -> bool {
        let mut changed = false;
        for item in self.items.values_mut() {
            if item.flags.selectable && !item.selected {
                item.selected = true;
                changed = true;
            }
        }
        if changed {
            self.selection_changed.emit(());
        }
        changed
    }

    // =========================================================================
    // Focus
    // =========================================================================

    pub fn focus_item(&self) -> Option<ItemId> {
        self.focus_item
    }

    /// Make `id` the focus item, or clear it with `None`.
    pub fn set_focus_item(&mut self, id: Option<ItemId>) -> Result<bool, GraphError> {
        if let Some(id) = id
            && !self.get(id)?.flags.focusable
        {
            return Ok(false);
        }
        if self.focus_item == id {
            return Ok(true);
        }
        self.focus_item = id;
        self.focus_item_changed.emit(id);
        Ok(true)
    }

    // =========================================================================
    // Pointer gestures
    // =========================================================================

    /// Handle a press at `point` in graph coordinates.
    ///
    /// Updates the selection and focus item, and starts moving the selected
    /// movable items if the press landed on one. Returns the item hit.
    pub fn press(&mut self, point: Point, modifiers: KeyboardModifiers) -> Option<ItemId> {
        let extend = modifiers.shift || modifiers.control;
        let hit = self.item_at(point);
        tracing::trace!(target: "trellis::graph", ?point, ?hit, extend, "graph press");

        let Some(id) = hit else {
            if !extend {
                self.clear_selection();
            }
            return None;
        };

        let flags = self.items[id].flags;
        if flags.focusable {
            warn_on_failure(self.set_focus_item(Some(id)));
        }

        let mut pending_select = None;
        if flags.selectable {
            if extend {
                warn_on_failure(self.set_selected(id, true));
            } else if self.items[id].selected {
                pending_select = Some(id);
            } else {
                warn_on_failure(self.set_selection([id]));
            }
        }

        if flags.movable && self.items[id].selected {
            let start = self
                .items
                .iter()
                .filter(|(_, item)| item.selected && item.flags.movable)
                .map(|(id, item)| (id, item.pos))
                .collect();
            self.drag = Some(MoveDrag {
                press: point,
                start,
                pending_select,
                moved: false,
            });
        } else if let Some(pending) = pending_select {
            warn_on_failure(self.set_selection([pending]));
        }
        Some(id)
    }

    /// Continue a press-drag. Returns whether any item moved.
    pub fn drag_to(&mut self, point: Point) -> bool {
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };
        let delta = point - drag.press;
        for (&id, &start) in &drag.start {
            if let Some(item) = self.items.get_mut(id) {
                item.pos = start + delta;
            }
        }
        drag.moved |= delta != Point::ZERO;
        !drag.start.is_empty()
    }

    /// Finish a press-drag. Returns whether the drag moved anything.
    pub fn release(&mut self) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        if !drag.moved
            && let Some(id) = drag.pending_select
        {
            warn_on_failure(self.set_selection([id]));
        }
        if drag.moved {
            tracing::debug!(target: "trellis::graph", items = drag.start.len(), "items moved");
        }
        drag.moved
    }

    pub fn is_moving(&self) -> bool {
        self.drag.is_some()
    }

    // =========================================================================
    // Painting
    // =========================================================================

    /// Paint every item bottom to top, with selection outlines.
    pub fn paint(&self, painter: &mut dyn Painter) {
        for id in self.items() {
            let item = &self.items[id];
            if item.opacity <= 0.0 {
                continue;
            }
            painter.save();
            painter.translate(item.pos.x, item.pos.y);
            painter.concat_transform(&item.transform);
            painter.set_opacity(item.opacity);
            item.content.paint(painter);
            if item.selected {
                painter.stroke_rect(item.content.bounding_rect(), &SELECTION_STROKE);
            }
            painter.restore();
        }
    }
}

fn warn_on_failure<T>(result: Result<T, GraphError>) {
    if let Err(err) = result {
        tracing::warn!(target: "trellis::graph", %err, "selection update failed");
    }
}

static_assertions::assert_impl_all!(ItemGraph: Send, Sync);
