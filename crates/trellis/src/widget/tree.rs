//! The widget tree.
//!
//! [`WidgetTree`] pairs an [`ObjectTree`] (ownership, z-order, visibility)
//! with the widget behind each node and the layout hosted by it. It is the
//! explicit context every other part of the widget layer works on; there are
//! no global registries.
//!
//! Layouts and the focus manager reach widgets through the [`WidgetAccess`]
//! trait, which lets them be tested against small mock stores.

use slotmap::SecondaryMap;
use trellis_core::{ObjectId, ObjectTree};
use trellis_render::{Painter, Point, Rect};

use super::layout::LayoutKind;
use super::traits::{PaintContext, Widget};
use crate::error::{TrellisError, TrellisResult};

/// Read and write access to widgets by id.
pub trait WidgetAccess {
    fn get_widget(&self, id: ObjectId) -> Option<&dyn Widget>;

    fn get_widget_mut(&mut self, id: ObjectId) -> Option<&mut dyn Widget>;

    /// Children of `id` in z-order, back to front.
    fn get_children(&self, _id: ObjectId) -> Vec<ObjectId> {
        Vec::new()
    }

    /// The widget's own visibility flag.
    fn is_widget_visible(&self, id: ObjectId) -> bool {
        self.get_widget(id).is_some()
    }

    /// Whether the widget and all its ancestors are visible.
    fn is_widget_effectively_visible(&self, id: ObjectId) -> bool {
        self.is_widget_visible(id)
    }

    fn set_widget_visible(&mut self, _id: ObjectId, _visible: bool) {}
}

/// Widgets, their hierarchy and their layouts.
pub struct WidgetTree {
    objects: ObjectTree,
    widgets: SecondaryMap<ObjectId, Box<dyn Widget>>,
    layouts: SecondaryMap<ObjectId, LayoutKind>,
}

impl Default for WidgetTree {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetTree {
    pub fn new() -> Self {
        Self {
            objects: ObjectTree::new(),
            widgets: SecondaryMap::new(),
            layouts: SecondaryMap::new(),
        }
    }

    /// The underlying node tree.
    pub fn objects(&self) -> &ObjectTree {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Insert a widget as a new top-level node.
    pub fn insert<W: Widget>(&mut self, widget: W) -> ObjectId {
        let mut widget: Box<dyn Widget> = Box::new(widget);
        let blocker = widget.widget_base().signal_blocker().clone();
        let id = self
            .objects
            .create_with_blocker(std::any::type_name::<W>(), blocker);
        widget.widget_base_mut().attach(id);
        self.widgets.insert(id, widget);
        id
    }

    /// Insert a widget as the topmost child of `parent`.
    pub fn insert_child<W: Widget>(&mut self, parent: ObjectId, widget: W) -> TrellisResult<ObjectId> {
        if !self.contains(parent) {
            return Err(TrellisError::WidgetNotFound(parent));
        }
        let id = self.insert(widget);
        self.objects.set_parent(id, Some(parent))?;
        Ok(id)
    }

    /// Destroy a widget and its subtree, returning every removed id.
    ///
    /// The widget is removed from its parent's layout first.
    pub fn destroy(&mut self, id: ObjectId) -> TrellisResult<Vec<ObjectId>> {
        self.detach_from_layout(id);
        let removed = self.objects.destroy(id)?;
        for node in &removed {
            self.widgets.remove(*node);
            self.layouts.remove(*node);
        }
        tracing::debug!(target: "trellis::app", ?id, count = removed.len(), "destroyed widget subtree");
        Ok(removed)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.widgets.contains_key(id)
    }

    // =========================================================================
    // Widget access
    // =========================================================================

    pub fn widget(&self, id: ObjectId) -> Option<&dyn Widget> {
        self.widgets.get(id).map(|w| w.as_ref())
    }

    pub fn widget_mut(&mut self, id: ObjectId) -> Option<&mut dyn Widget> {
        self.widgets.get_mut(id).map(|w| w.as_mut())
    }

    /// The widget at `id` as its concrete type.
    pub fn widget_as<T: Widget>(&self, id: ObjectId) -> TrellisResult<&T> {
        self.widget(id)
            .ok_or(TrellisError::WidgetNotFound(id))?
            .downcast_ref::<T>()
            .ok_or(TrellisError::WrongWidgetType(id, std::any::type_name::<T>()))
    }

    pub fn widget_as_mut<T: Widget>(&mut self, id: ObjectId) -> TrellisResult<&mut T> {
        self.widget_mut(id)
            .ok_or(TrellisError::WidgetNotFound(id))?
            .downcast_mut::<T>()
            .ok_or(TrellisError::WrongWidgetType(id, std::any::type_name::<T>()))
    }

    // =========================================================================
    // Hierarchy
    // =========================================================================

    pub fn parent(&self, id: ObjectId) -> Option<ObjectId> {
        self.objects.parent(id).ok().flatten()
    }

    /// Children of `id`, back to front. Empty for unknown ids.
    pub fn children(&self, id: ObjectId) -> &[ObjectId] {
        self.objects.children(id).unwrap_or(&[])
    }

    pub fn top_levels(&self) -> &[ObjectId] {
        self.objects.top_levels()
    }

    /// Move `id` under `parent`, or make it top-level with `None`.
    ///
    /// A widget moved away from its parent leaves that parent's layout. The
    /// widget becomes the topmost child of its new parent.
    pub fn set_parent(&mut self, id: ObjectId, parent: Option<ObjectId>) -> TrellisResult<()> {
        if !self.contains(id) {
            return Err(TrellisError::WidgetNotFound(id));
        }
        if self.parent(id) != parent {
            // Validate before touching the old layout.
            if let Some(p) = parent
                && (p == id || self.objects.is_ancestor_of(id, p))
            {
                return Err(trellis_core::ObjectError::CircularParentage.into());
            }
            self.detach_from_layout(id);
        }
        self.objects.set_parent(id, parent)?;
        Ok(())
    }

    fn detach_from_layout(&mut self, id: ObjectId) {
        if let Some(parent) = self.parent(id)
            && let Some(layout) = self.layouts.get_mut(parent)
            && layout.remove_widget(id)
        {
            tracing::trace!(target: "trellis::layout", ?id, ?parent, "widget left parent layout");
        }
    }

    pub fn raise(&mut self, id: ObjectId) -> TrellisResult<()> {
        Ok(self.objects.raise(id)?)
    }

    pub fn lower(&mut self, id: ObjectId) -> TrellisResult<()> {
        Ok(self.objects.lower(id)?)
    }

    /// `root` and its descendants in pre-order, children back to front.
    pub fn preorder(&self, root: ObjectId) -> Vec<ObjectId> {
        self.objects.depth_first_preorder(root).unwrap_or_default()
    }

    pub fn is_ancestor_of(&self, ancestor: ObjectId, id: ObjectId) -> bool {
        self.objects.is_ancestor_of(ancestor, id)
    }

    // =========================================================================
    // Visibility and signals
    // =========================================================================

    /// Show or hide a widget, returning the previous flag.
    ///
    /// `visible_changed` is emitted when the flag changes.
    pub fn set_visible(&mut self, id: ObjectId, visible: bool) -> TrellisResult<bool> {
        let previous = self.objects.set_visible(id, visible)?;
        if previous != visible
            && let Some(widget) = self.widgets.get(id)
        {
            widget.widget_base().visible_changed.emit(visible);
        }
        Ok(previous)
    }

    pub fn is_visible(&self, id: ObjectId) -> bool {
        self.objects.is_visible(id).unwrap_or(false)
    }

    /// Whether `id` and all its ancestors are visible.
    pub fn is_effectively_visible(&self, id: ObjectId) -> bool {
        self.objects.is_effectively_visible(id).unwrap_or(false)
    }

    /// Block or unblock every signal owned by `id`, returning the previous
    /// state.
    pub fn block_signals(&self, id: ObjectId, blocked: bool) -> TrellisResult<bool> {
        Ok(self.objects.block_signals(id, blocked)?)
    }

    // =========================================================================
    // Layouts
    // =========================================================================

    /// Install `layout` on `host`, replacing any previous one.
    ///
    /// Every widget the layout manages becomes a child of `host`.
    pub fn set_layout(&mut self, host: ObjectId, layout: impl Into<LayoutKind>) -> TrellisResult<()> {
        if !self.contains(host) {
            return Err(TrellisError::WidgetNotFound(host));
        }
        let layout = layout.into();
        let managed = layout.widgets();
        self.layouts.insert(host, layout);
        self.adopt(host, &managed)
    }

    pub fn layout(&self, host: ObjectId) -> Option<&LayoutKind> {
        self.layouts.get(host)
    }

    pub fn layout_mut(&mut self, host: ObjectId) -> Option<&mut LayoutKind> {
        self.layouts.get_mut(host)
    }

    pub fn take_layout(&mut self, host: ObjectId) -> Option<LayoutKind> {
        self.layouts.remove(host)
    }

    /// Edit the layout on `host`, then adopt any widget it newly manages.
    pub fn update_layout<R>(
        &mut self,
        host: ObjectId,
        f: impl FnOnce(&mut LayoutKind) -> R,
    ) -> TrellisResult<R> {
        let layout = self
            .layouts
            .get_mut(host)
            .ok_or(TrellisError::WidgetNotFound(host))?;
        let result = f(layout);
        let managed = layout.widgets();
        self.adopt(host, &managed)?;
        Ok(result)
    }

    fn adopt(&mut self, host: ObjectId, managed: &[ObjectId]) -> TrellisResult<()> {
        for &id in managed {
            if !self.contains(id) {
                return Err(TrellisError::WidgetNotFound(id));
            }
            if self.parent(id) != Some(host) {
                self.objects.set_parent(id, Some(host))?;
            }
        }
        Ok(())
    }

    /// Run the layouts of `root` and its descendants, top down.
    pub fn arrange(&mut self, root: ObjectId) {
        let Some(geometry) = self.widget(root).map(|w| w.geometry()) else {
            return;
        };
        if let Some(mut layout) = self.layouts.remove(root) {
            let local = Rect::from_origin_size(Point::ZERO, geometry.size);
            let placements = layout.arrange(self, local);
            tracing::trace!(
                target: "trellis::layout",
                host = ?root,
                kind = layout.kind_name(),
                placed = placements.len(),
                "arranged layout"
            );
            self.layouts.insert(root, layout);
        }
        for child in self.children(root).to_vec() {
            self.arrange(child);
        }
    }

    // =========================================================================
    // Geometry and hit testing
    // =========================================================================

    /// Window position of the top-left corner of `id`.
    pub fn absolute_origin(&self, id: ObjectId) -> Option<Point> {
        let mut origin = self.widget(id)?.geometry().origin;
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            if let Some(widget) = self.widget(ancestor) {
                origin = origin + widget.geometry().origin;
            }
            current = self.parent(ancestor);
        }
        Some(origin)
    }

    /// The widget's rectangle in window coordinates.
    pub fn absolute_rect(&self, id: ObjectId) -> Option<Rect> {
        let origin = self.absolute_origin(id)?;
        let size = self.widget(id)?.geometry().size;
        Some(Rect::from_origin_size(origin, size))
    }

    /// The topmost visible widget under `pos` in the subtree of `root`.
    ///
    /// Children are tested before their parent and later siblings before
    /// earlier ones. Children may extend beyond their parent.
    pub fn hit_test(&self, root: ObjectId, pos: Point) -> Option<ObjectId> {
        let origin = self.absolute_origin(root)? - self.widget(root)?.geometry().origin;
        self.hit_test_at(root, origin, pos)
    }

    fn hit_test_at(&self, id: ObjectId, parent_origin: Point, pos: Point) -> Option<ObjectId> {
        if !self.is_visible(id) {
            return None;
        }
        let geometry = self.widget(id)?.geometry();
        let origin = parent_origin + geometry.origin;
        for &child in self.children(id).iter().rev() {
            if let Some(hit) = self.hit_test_at(child, origin, pos) {
                return Some(hit);
            }
        }
        Rect::from_origin_size(origin, geometry.size)
            .contains(pos)
            .then_some(id)
    }

    // =========================================================================
    // Painting
    // =========================================================================

    /// Paint `root` and its visible descendants back to front.
    pub fn paint(&self, root: ObjectId, painter: &mut dyn Painter) {
        let Some(widget) = self.widget(root) else {
            return;
        };
        if !self.is_visible(root) {
            return;
        }
        let geometry = widget.geometry();
        painter.save();
        painter.translate(geometry.origin.x, geometry.origin.y);
        {
            let base = widget.widget_base();
            let mut ctx = PaintContext::new(
                painter,
                Rect::from_origin_size(Point::ZERO, geometry.size),
            )
            .with_state(base.has_focus(), base.is_hovered());
            widget.paint(&mut ctx);
        }
        for &child in self.children(root) {
            self.paint(child, painter);
        }
        if let Some(layout) = self.layouts.get(root) {
            layout.paint(painter);
        }
        painter.restore();
    }
}

impl WidgetAccess for WidgetTree {
    fn get_widget(&self, id: ObjectId) -> Option<&dyn Widget> {
        self.widget(id)
    }

    fn get_widget_mut(&mut self, id: ObjectId) -> Option<&mut dyn Widget> {
        self.widget_mut(id)
    }

    fn get_children(&self, id: ObjectId) -> Vec<ObjectId> {
        self.children(id).to_vec()
    }

    fn is_widget_visible(&self, id: ObjectId) -> bool {
        self.contains(id) && self.is_visible(id)
    }

    fn is_widget_effectively_visible(&self, id: ObjectId) -> bool {
        self.contains(id) && self.is_effectively_visible(id)
    }

    fn set_widget_visible(&mut self, id: ObjectId, visible: bool) {
        if let Err(err) = self.set_visible(id, visible) {
            tracing::warn!(target: "trellis::layout", ?id, %err, "cannot change visibility");
        }
    }
}
