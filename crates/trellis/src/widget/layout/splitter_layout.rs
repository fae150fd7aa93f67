//! Splitter layout with draggable handles between panes.
//!
//! Pane sizes are stored as weights, not pixels. Arranging converts each
//! visible pane's weight into its share of the space left after the handles,
//! so resizing the whole splitter keeps the relative pane sizes. Dragging a
//! handle moves weight between the two panes next to it; the pair keeps its
//! combined weight and each side keeps at least the weight that corresponds
//! to the minimum pane size at the moment the drag started.
//!
//! The layout keeps the handle rectangles from the last arrange so that the
//! host can route pointer input to it. Every handle tracks whether it is
//! hovered or being dragged.

use trellis_core::{ObjectId, Signal};
use trellis_render::{Color, CursorShape, MouseButton, Painter, Point, Rect};

use super::base::{LayoutBase, absorb_overflow};
use super::box_layout::Orientation;
use super::item::Placement;
use super::managed_sizes;
use super::traits::{Layout, apply_placements};
use crate::config::LayoutDefaults;
use crate::error::LayoutError;
use crate::widget::events::WidgetEvent;
use crate::widget::tree::WidgetAccess;

/// Extra reach on each side of a handle for pointer hits.
const HANDLE_HIT_MARGIN: f32 = 2.0;

/// Pointer state of one handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HandleState {
    pub hovered: bool,
    /// The handle is being dragged.
    pub active: bool,
}

#[derive(Debug, Clone)]
struct DragState {
    handle: usize,
    start_pos: f32,
    start_weights: Vec<f32>,
    available: f32,
}

/// Geometry recorded by the last arrange.
#[derive(Debug, Clone, Default)]
struct Frame {
    content: Rect,
    /// Item indices of the visible panes, in order.
    visible: Vec<usize>,
    /// (start, length) of each visible pane on the main axis.
    panes: Vec<(f32, f32)>,
    available: f32,
}

/// A layout of weighted panes separated by draggable handles.
#[derive(Debug)]
pub struct SplitterLayout {
    base: LayoutBase,
    orientation: Orientation,
    items: Vec<ObjectId>,
    weights: Vec<f32>,
    handle_width: f32,
    min_pane: f32,
    handles: Vec<HandleState>,
    drag: Option<DragState>,
    frame: Frame,
    handle_color: Color,
    handle_hover_color: Color,
    handle_active_color: Color,

    /// Emitted with (handle index, handle position) when a drag moves a
    /// handle. The position is in host coordinates along the main axis.
    pub splitter_moved: Signal<(usize, f32)>,
}

impl SplitterLayout {
    pub fn new(orientation: Orientation) -> Self {
        let defaults = LayoutDefaults::default();
        Self {
            base: LayoutBase::new(),
            orientation,
            items: Vec::new(),
            weights: Vec::new(),
            handle_width: defaults.splitter_handle_width,
            min_pane: defaults.splitter_min_pane,
            handles: Vec::new(),
            drag: None,
            frame: Frame::default(),
            handle_color: Color::LIGHT_GRAY,
            handle_hover_color: Color::GRAY,
            handle_active_color: Color::DARK_GRAY,
            splitter_moved: Signal::new(),
        }
    }

    pub fn horizontal() -> Self {
        Self::new(Orientation::Horizontal)
    }

    pub fn vertical() -> Self {
        Self::new(Orientation::Vertical)
    }

    /// Take margins, handle width and minimum pane size from `defaults`.
    ///
    /// Spacing does not apply; the handles are the gaps.
    pub fn with_defaults(mut self, defaults: &LayoutDefaults) -> Self {
        self.base = LayoutBase::from_defaults(defaults);
        self.handle_width = defaults.splitter_handle_width.max(0.0);
        self.min_pane = defaults.splitter_min_pane.max(0.0);
        self
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    // =========================================================================
    // Panes and weights
    // =========================================================================

    /// Append a pane with weight 1.
    pub fn add_widget(&mut self, widget: ObjectId) -> Result<usize, LayoutError> {
        self.add_widget_with_weight(widget, 1.0)
    }

    pub fn add_widget_with_weight(
        &mut self,
        widget: ObjectId,
        weight: f32,
    ) -> Result<usize, LayoutError> {
        check_weight(self.items.len(), weight)?;
        if self.items.contains(&widget) {
            return Err(LayoutError::DuplicateItem(widget));
        }
        // A drag in progress tracks the old pane set.
        if self.end_drag() {
            tracing::trace!(target: "trellis::layout", "splitter drag cancelled by new pane");
        }
        self.items.push(widget);
        self.weights.push(weight);
        Ok(self.items.len() - 1)
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Replace every weight. The count must match the pane count.
    pub fn set_weights(&mut self, weights: Vec<f32>) -> Result<(), LayoutError> {
        if weights.len() != self.items.len() {
            return Err(LayoutError::WeightCountMismatch {
                expected: self.items.len(),
                actual: weights.len(),
            });
        }
        for (index, &weight) in weights.iter().enumerate() {
            check_weight(index, weight)?;
        }
        self.weights = weights;
        Ok(())
    }

    pub fn set_weight(&mut self, index: usize, weight: f32) -> Result<(), LayoutError> {
        if index >= self.weights.len() {
            return Err(LayoutError::IndexOutOfRange {
                index,
                len: self.weights.len(),
            });
        }
        check_weight(index, weight)?;
        self.weights[index] = weight;
        Ok(())
    }

    pub fn handle_width(&self) -> f32 {
        self.handle_width
    }

    pub fn set_handle_width(&mut self, width: f32) -> Result<(), LayoutError> {
        if width < 0.0 {
            return Err(LayoutError::NegativeSize(width));
        }
        self.handle_width = width;
        Ok(())
    }

    pub fn minimum_pane_size(&self) -> f32 {
        self.min_pane
    }

    pub fn set_minimum_pane_size(&mut self, size: f32) -> Result<(), LayoutError> {
        if size < 0.0 {
            return Err(LayoutError::NegativeSize(size));
        }
        self.min_pane = size;
        Ok(())
    }

    pub fn set_handle_colors(&mut self, normal: Color, hovered: Color, active: Color) {
        self.handle_color = normal;
        self.handle_hover_color = hovered;
        self.handle_active_color = active;
    }

    // =========================================================================
    // Handles
    // =========================================================================

    /// Number of handles after the last arrange.
    pub fn handle_count(&self) -> usize {
        self.frame.panes.len().saturating_sub(1)
    }

    /// Rectangle of handle `index` in host coordinates, as of the last
    /// arrange.
    pub fn handle_rect(&self, index: usize) -> Option<Rect> {
        if index >= self.handle_count() {
            return None;
        }
        let (start, length) = self.frame.panes[index];
        let cross = self.orientation.cross().span(self.frame.content);
        Some(
            self.orientation
                .compose((start + length, self.handle_width), cross),
        )
    }

    /// The handle under `pos`, with a small margin for easier grabbing.
    pub fn handle_at(&self, pos: Point) -> Option<usize> {
        (0..self.handle_count()).find(|&i| {
            self.handle_rect(i)
                .is_some_and(|rect| rect.inflate(HANDLE_HIT_MARGIN).contains(pos))
        })
    }

    pub fn handle_state(&self, index: usize) -> Option<HandleState> {
        self.handles.get(index).copied()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    fn set_hovered(&mut self, hovered: Option<usize>) {
        for (i, state) in self.handles.iter_mut().enumerate() {
            state.hovered = Some(i) == hovered;
        }
    }

    fn main_coord(&self, pos: Point) -> f32 {
        match self.orientation {
            Orientation::Horizontal => pos.x,
            Orientation::Vertical => pos.y,
        }
    }

    // =========================================================================
    // Interaction
    // =========================================================================

    /// Start dragging handle `handle` from main-axis position `pos`.
    pub fn begin_drag(&mut self, handle: usize, pos: f32) -> bool {
        if handle >= self.handle_count() || self.frame.available <= 0.0 {
            return false;
        }
        self.drag = Some(DragState {
            handle,
            start_pos: pos,
            start_weights: self.weights.clone(),
            available: self.frame.available,
        });
        if let Some(state) = self.handles.get_mut(handle) {
            state.active = true;
        }
        tracing::trace!(target: "trellis::layout", handle, "splitter drag started");
        true
    }

    /// Continue the active drag with the pointer at main-axis position `pos`.
    ///
    /// The pixel delta since the press is converted to weight using the
    /// space available when the drag started, then clamped so that neither
    /// pane of the pair drops below the minimum pane weight.
    pub fn drag_to(&mut self, pos: f32) -> bool {
        let Some(drag) = &self.drag else {
            return false;
        };
        let (Some(&a), Some(&b)) = (
            self.frame.visible.get(drag.handle),
            self.frame.visible.get(drag.handle + 1),
        ) else {
            return false;
        };

        let start = |i: usize| drag.start_weights.get(i).copied();
        let total: Option<f32> = self.frame.visible.iter().map(|&i| start(i)).sum();
        let (Some(total), Some(start_a), Some(start_b)) = (total, start(a), start(b)) else {
            tracing::debug!(target: "trellis::layout", handle = drag.handle, "panes changed during drag");
            self.end_drag();
            return false;
        };
        let (delta_weight, min_weight) = if total > 0.0 {
            (
                (pos - drag.start_pos) * total / drag.available,
                self.min_pane * total / drag.available,
            )
        } else {
            (0.0, 0.0)
        };

        let pair = start_a + start_b;
        let min_weight = min_weight.min(pair / 2.0);
        let first = (start_a + delta_weight).clamp(min_weight, pair - min_weight);
        let second = pair - first;
        let handle = drag.handle;

        if self.weights[a] == first && self.weights[b] == second {
            return true;
        }
        self.weights[a] = first;
        self.weights[b] = second;

        let position = self.handle_position(handle, total);
        self.splitter_moved.emit((handle, position));
        true
    }

    /// Where handle `handle` starts for the current weights, before minimum
    /// clamping.
    fn handle_position(&self, handle: usize, total: f32) -> f32 {
        let (start, _) = self.orientation.span(self.frame.content);
        let before: f32 = self.frame.visible[..=handle]
            .iter()
            .map(|&i| {
                if total > 0.0 {
                    self.frame.available * self.weights[i] / total
                } else {
                    self.frame.available / self.frame.visible.len() as f32
                }
            })
            .sum();
        start + before + self.handle_width * handle as f32
    }

    pub fn end_drag(&mut self) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        if let Some(state) = self.handles.get_mut(drag.handle) {
            state.active = false;
        }
        tracing::trace!(target: "trellis::layout", handle = drag.handle, weights = ?self.weights, "splitter drag finished");
        true
    }

    /// Handle pointer input in host coordinates. Returns `true` when the
    /// event was consumed by a handle.
    pub fn pointer_event(&mut self, event: &WidgetEvent) -> bool {
        match event {
            WidgetEvent::MousePress(e) if e.button == MouseButton::Left => {
                match self.handle_at(e.local_pos) {
                    Some(handle) => self.begin_drag(handle, self.main_coord(e.local_pos)),
                    None => false,
                }
            }
            WidgetEvent::MouseMove(e) => {
                if self.drag.is_some() {
                    return self.drag_to(self.main_coord(e.local_pos));
                }
                let hovered = self.handle_at(e.local_pos);
                self.set_hovered(hovered);
                hovered.is_some()
            }
            WidgetEvent::MouseRelease(e) if e.button == MouseButton::Left => self.end_drag(),
            WidgetEvent::Leave(_) => {
                if self.drag.is_none() {
                    self.set_hovered(None);
                }
                false
            }
            _ => false,
        }
    }

    pub fn cursor_at(&self, pos: Point) -> Option<CursorShape> {
        if self.drag.is_none() && self.handle_at(pos).is_none() {
            return None;
        }
        Some(match self.orientation {
            Orientation::Horizontal => CursorShape::ResizeHorizontal,
            Orientation::Vertical => CursorShape::ResizeVertical,
        })
    }

    /// Fill each handle with the colour for its state.
    pub fn paint_handles(&self, painter: &mut dyn Painter) {
        for index in 0..self.handle_count() {
            let Some(rect) = self.handle_rect(index) else {
                continue;
            };
            let state = self.handles.get(index).copied().unwrap_or_default();
            let color = if state.active {
                self.handle_active_color
            } else if state.hovered {
                self.handle_hover_color
            } else {
                self.handle_color
            };
            painter.fill_rect(rect, color);
        }
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    fn compute<S: WidgetAccess + ?Sized>(&self, storage: &S, rect: Rect) -> (Vec<Placement>, Frame) {
        let content = self.base.content_rect(rect);
        let mut visible = Vec::new();
        let mut minimums = Vec::new();
        for (index, &id) in self.items.iter().enumerate() {
            if let Some((_, minimum)) = managed_sizes(storage, id) {
                visible.push(index);
                minimums.push(self.orientation.pick(minimum));
            }
        }
        if visible.is_empty() {
            return (
                Vec::new(),
                Frame {
                    content,
                    ..Frame::default()
                },
            );
        }

        let (start, length) = self.orientation.span(content);
        let handles = self.handle_width * (visible.len() - 1) as f32;
        let available = (length - handles).max(0.0);
        let total: f32 = visible.iter().map(|&i| self.weights[i]).sum();

        let mut sizes: Vec<f32> = visible
            .iter()
            .zip(&minimums)
            .map(|(&i, &min)| {
                let share = if total > 0.0 {
                    available * self.weights[i] / total
                } else {
                    available / visible.len() as f32
                };
                share.max(min)
            })
            .collect();
        absorb_overflow(&mut sizes, &minimums, available);

        let cross = self.orientation.cross().span(content);
        let mut pos = start;
        let mut panes = Vec::with_capacity(sizes.len());
        let mut placements = Vec::with_capacity(sizes.len());
        for (&index, &size) in visible.iter().zip(&sizes) {
            let id = self.items[index];
            let cross_min = storage
                .get_widget(id)
                .map(|w| self.orientation.cross().pick(w.minimum_size()))
                .unwrap_or(0.0);
            placements.push((
                id,
                self.orientation
                    .compose((pos, size), (cross.0, cross.1.max(cross_min))),
            ));
            panes.push((pos, size));
            pos += size + self.handle_width;
        }

        (
            placements,
            Frame {
                content,
                visible,
                panes,
                available,
            },
        )
    }
}

fn check_weight(index: usize, weight: f32) -> Result<(), LayoutError> {
    if weight < 0.0 || !weight.is_finite() {
        return Err(LayoutError::NegativeWeight { index, weight });
    }
    Ok(())
}

impl Default for SplitterLayout {
    fn default() -> Self {
        Self::horizontal()
    }
}

impl Layout for SplitterLayout {
    fn base(&self) -> &LayoutBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut LayoutBase {
        &mut self.base
    }

    fn widgets(&self) -> Vec<ObjectId> {
        self.items.clone()
    }

    fn remove_widget(&mut self, widget: ObjectId) -> bool {
        let Some(index) = self.items.iter().position(|&w| w == widget) else {
            return false;
        };
        self.items.remove(index);
        self.weights.remove(index);
        self.drag = None;
        self.frame = Frame::default();
        self.handles.clear();
        true
    }

    fn calculate<S: WidgetAccess + ?Sized>(&self, storage: &S, rect: Rect) -> Vec<Placement> {
        self.compute(storage, rect).0
    }

    /// Apply pane geometry and record handle positions for hit testing.
    fn arrange<S: WidgetAccess + ?Sized>(&mut self, storage: &mut S, rect: Rect) -> Vec<Placement> {
        let (placements, frame) = self.compute(storage, rect);
        let handle_count = frame.panes.len().saturating_sub(1);
        self.frame = frame;
        self.handles.resize(handle_count, HandleState::default());
        apply_placements(storage, &placements);
        placements
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use trellis_render::KeyboardModifiers;

    use super::*;
    use crate::widget::events::{MouseMoveEvent, MousePressEvent, MouseReleaseEvent};
    use crate::widget::layout::testing::{MockStorage, MockWidget, create_test_ids};

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    fn three_panes() -> (MockStorage, SplitterLayout, Vec<ObjectId>) {
        let mut storage = MockStorage::new();
        let ids: Vec<_> = (0..3)
            .map(|_| storage.add(MockWidget::sized(10.0, 10.0)))
            .collect();
        let mut splitter = SplitterLayout::horizontal();
        for id in &ids {
            splitter.add_widget(*id).unwrap();
        }
        (storage, splitter, ids)
    }

    fn widths(storage: &MockStorage, ids: &[ObjectId]) -> Vec<f32> {
        ids.iter().map(|id| storage.geometry(*id).width()).collect()
    }

    #[test]
    fn test_weights_to_pixels() {
        let (mut storage, mut splitter, ids) = three_panes();
        splitter.set_weights(vec![1.0, 2.0, 1.0]).unwrap();
        splitter.arrange(&mut storage, Rect::new(0.0, 0.0, 410.0, 50.0));

        assert_eq!(widths(&storage, &ids), vec![100.0, 200.0, 100.0]);
        assert_eq!(storage.geometry(ids[1]).origin.x, 105.0);
        assert_eq!(splitter.handle_rect(0), Some(Rect::new(100.0, 0.0, 5.0, 50.0)));
        assert_eq!(splitter.handle_rect(2), None);
    }

    #[test]
    fn test_invalid_weights() {
        let (_, mut splitter, ids) = three_panes();
        assert_eq!(
            splitter.set_weights(vec![1.0, -1.0, 1.0]),
            Err(LayoutError::NegativeWeight {
                index: 1,
                weight: -1.0
            })
        );
        assert_eq!(
            splitter.set_weights(vec![1.0]),
            Err(LayoutError::WeightCountMismatch {
                expected: 3,
                actual: 1
            })
        );
        assert_eq!(
            splitter.add_widget(ids[0]),
            Err(LayoutError::DuplicateItem(ids[0]))
        );
        assert_eq!(splitter.weights(), &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_drag_moves_weight_between_pair() {
        let (mut storage, mut splitter, ids) = three_panes();
        splitter.arrange(&mut storage, Rect::new(0.0, 0.0, 310.0, 50.0));

        assert!(splitter.begin_drag(0, 102.0));
        assert!(splitter.drag_to(132.0));
        assert!(splitter.end_drag());
        assert!(approx_eq(splitter.weights()[0], 1.3));
        assert!(approx_eq(splitter.weights()[1], 0.7));
        assert_eq!(splitter.weights()[2], 1.0);

        splitter.arrange(&mut storage, Rect::new(0.0, 0.0, 310.0, 50.0));
        let w = widths(&storage, &ids);
        assert!(approx_eq(w[0], 130.0));
        assert!(approx_eq(w[1], 70.0));
    }

    #[test]
    fn test_drag_clamps_at_minimum_pane_weight() {
        let (mut storage, mut splitter, ids) = three_panes();
        splitter.set_minimum_pane_size(20.0).unwrap();
        splitter.arrange(&mut storage, Rect::new(0.0, 0.0, 310.0, 50.0));

        splitter.begin_drag(0, 102.0);
        splitter.drag_to(900.0);
        splitter.end_drag();
        assert!(approx_eq(splitter.weights()[0], 1.8));
        assert!(approx_eq(splitter.weights()[1], 0.2));

        splitter.arrange(&mut storage, Rect::new(0.0, 0.0, 310.0, 50.0));
        assert!(approx_eq(widths(&storage, &ids)[1], 20.0));
    }

    #[test]
    fn test_drag_then_resize_keeps_proportions() {
        let (mut storage, mut splitter, ids) = three_panes();
        splitter.arrange(&mut storage, Rect::new(0.0, 0.0, 310.0, 50.0));
        splitter.begin_drag(1, 207.0);
        splitter.drag_to(187.0);
        splitter.end_drag();

        splitter.arrange(&mut storage, Rect::new(0.0, 0.0, 310.0, 50.0));
        let before: Vec<f32> = widths(&storage, &ids).iter().map(|w| w / 300.0).collect();

        // Twice the available space.
        splitter.arrange(&mut storage, Rect::new(0.0, 0.0, 610.0, 50.0));
        let after: Vec<f32> = widths(&storage, &ids).iter().map(|w| w / 600.0).collect();

        for (b, a) in before.iter().zip(&after) {
            assert!(approx_eq(*b, *a), "{before:?} vs {after:?}");
        }
    }

    #[test]
    fn test_pointer_events_track_handle_state() {
        let (mut storage, mut splitter, _) = three_panes();
        splitter.arrange(&mut storage, Rect::new(0.0, 0.0, 310.0, 50.0));

        let moved = Arc::new(Mutex::new(Vec::new()));
        let m = moved.clone();
        splitter.splitter_moved.connect(move |args| m.lock().push(*args));

        let hover = WidgetEvent::MouseMove(MouseMoveEvent::new(
            None,
            Point::new(101.0, 10.0),
            KeyboardModifiers::NONE,
        ));
        assert!(splitter.pointer_event(&hover));
        assert_eq!(
            splitter.handle_state(0),
            Some(HandleState {
                hovered: true,
                active: false
            })
        );
        assert!(!splitter.handle_state(1).unwrap().hovered);
        assert_eq!(
            splitter.cursor_at(Point::new(101.0, 10.0)),
            Some(CursorShape::ResizeHorizontal)
        );

        let press = WidgetEvent::MousePress(MousePressEvent::new(
            MouseButton::Left,
            Point::new(101.0, 10.0),
            KeyboardModifiers::NONE,
        ));
        assert!(splitter.pointer_event(&press));
        assert!(splitter.handle_state(0).unwrap().active);

        let drag = WidgetEvent::MouseMove(MouseMoveEvent::new(
            Some(MouseButton::Left),
            Point::new(131.0, 10.0),
            KeyboardModifiers::NONE,
        ));
        assert!(splitter.pointer_event(&drag));

        let release = WidgetEvent::MouseRelease(MouseReleaseEvent::new(
            MouseButton::Left,
            Point::new(131.0, 10.0),
            KeyboardModifiers::NONE,
        ));
        assert!(splitter.pointer_event(&release));
        assert!(!splitter.handle_state(0).unwrap().active);

        let moved = moved.lock();
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].0, 0);
        assert!(approx_eq(moved[0].1, 130.0));
    }

    #[test]
    fn test_press_outside_handles_is_ignored() {
        let (mut storage, mut splitter, _) = three_panes();
        splitter.arrange(&mut storage, Rect::new(0.0, 0.0, 310.0, 50.0));
        let press = WidgetEvent::MousePress(MousePressEvent::new(
            MouseButton::Left,
            Point::new(50.0, 10.0),
            KeyboardModifiers::NONE,
        ));
        assert!(!splitter.pointer_event(&press));
        assert!(!splitter.is_dragging());
    }

    #[test]
    fn test_hidden_pane_takes_no_space() {
        let (mut storage, mut splitter, ids) = three_panes();
        storage.hide(ids[1]);
        splitter.arrange(&mut storage, Rect::new(0.0, 0.0, 205.0, 50.0));
        assert_eq!(storage.geometry(ids[0]).width(), 100.0);
        assert_eq!(storage.geometry(ids[2]).origin.x, 105.0);
        assert_eq!(splitter.handle_count(), 1);
    }

    #[test]
    fn test_remove_widget_drops_weight() {
        let ids = create_test_ids(2);
        let mut splitter = SplitterLayout::vertical();
        splitter.add_widget_with_weight(ids[0], 2.0).unwrap();
        splitter.add_widget(ids[1]).unwrap();
        assert!(splitter.remove_widget(ids[0]));
        assert_eq!(splitter.weights(), &[1.0]);
    }

    #[test]
    fn test_pane_added_during_drag_cancels_it() {
        let (mut storage, mut splitter, _) = three_panes();
        splitter.arrange(&mut storage, Rect::new(0.0, 0.0, 310.0, 50.0));
        assert!(splitter.begin_drag(0, 102.0));

        let extra = storage.add(MockWidget::sized(10.0, 10.0));
        splitter.add_widget(extra).unwrap();
        assert!(!splitter.is_dragging());
        splitter.arrange(&mut storage, Rect::new(0.0, 0.0, 415.0, 50.0));

        assert!(!splitter.drag_to(120.0));
        assert_eq!(splitter.weights(), &[1.0, 1.0, 1.0, 1.0]);
        assert!(!splitter.handle_state(0).unwrap().active);
    }

    #[test]
    fn test_drag_with_stale_start_weights_ends() {
        let (mut storage, mut splitter, _) = three_panes();
        splitter.arrange(&mut storage, Rect::new(0.0, 0.0, 310.0, 50.0));
        assert!(!splitter.begin_drag(2, 207.0));

        // Pane set grows behind the drag's back.
        assert!(splitter.begin_drag(1, 207.0));
        let extra = storage.add(MockWidget::sized(10.0, 10.0));
        splitter.items.push(extra);
        splitter.weights.push(1.0);
        splitter.arrange(&mut storage, Rect::new(0.0, 0.0, 415.0, 50.0));

        assert!(!splitter.drag_to(250.0));
        assert!(!splitter.is_dragging());
        assert_eq!(splitter.weights(), &[1.0, 1.0, 1.0, 1.0]);
    }
}
