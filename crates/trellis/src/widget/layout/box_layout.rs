//! Box layout for arranging widgets in a row or column.
//!
//! Items are classified as fixed (natural size along the main axis) or
//! expandable (stretch factor above zero). Expandable items share
//! `container − Σfixed − (n−1)·spacing − margins` in proportion to their
//! stretch factors; the share is clamped at zero. On the cross axis items
//! fill the container unless their constraint names an alignment, in which
//! case they keep their natural cross size.
//!
//! ```
//! use trellis::widget::layout::{BoxLayout, LayoutConstraint, Orientation};
//! # use trellis_core::ObjectId;
//! # let (a, b) = (ObjectId::from_raw(1), ObjectId::from_raw(2));
//!
//! let mut layout = BoxLayout::vertical();
//! layout.add_widget_with(a, LayoutConstraint::fixed()).unwrap();
//! layout.add_spacing(8.0).unwrap();
//! layout.add_widget(b).unwrap();
//! layout.add_stretch(1);
//! assert_eq!(layout.orientation(), Orientation::Vertical);
//! ```

use trellis_core::ObjectId;
use trellis_render::Rect;

use super::base::{AxisSlot, LayoutBase, distribute, gaps, offsets};
use super::item::{Alignment, LayoutConstraint, LayoutItem, Placement};
use super::traits::Layout;
use super::{ContentMargins, managed_sizes};
use crate::config::LayoutDefaults;
use crate::error::LayoutError;
use crate::widget::tree::WidgetAccess;

/// Layout orientation for box and splitter layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Items are arranged left to right.
    #[default]
    Horizontal,
    /// Items are arranged top to bottom.
    Vertical,
}

impl Orientation {
    /// The perpendicular orientation.
    pub fn cross(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }

    /// (start, length) of `rect` along this axis.
    #[inline]
    pub(crate) fn span(self, rect: Rect) -> (f32, f32) {
        match self {
            Self::Horizontal => (rect.origin.x, rect.width()),
            Self::Vertical => (rect.origin.y, rect.height()),
        }
    }

    /// Leading and trailing margins along this axis.
    #[inline]
    pub(crate) fn margins(self, margins: &ContentMargins) -> (f32, f32) {
        match self {
            Self::Horizontal => (margins.left, margins.right),
            Self::Vertical => (margins.top, margins.bottom),
        }
    }

    #[inline]
    pub(crate) fn pick(self, size: trellis_render::Size) -> f32 {
        match self {
            Self::Horizontal => size.width,
            Self::Vertical => size.height,
        }
    }

    /// Build a rect from main-axis and cross-axis spans.
    #[inline]
    pub(crate) fn compose(self, main: (f32, f32), cross: (f32, f32)) -> Rect {
        match self {
            Self::Horizontal => Rect::new(main.0, cross.0, main.1, cross.1),
            Self::Vertical => Rect::new(cross.0, main.0, cross.1, main.1),
        }
    }
}

/// A layout that arranges items in a single row or column.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxLayout {
    base: LayoutBase,
    orientation: Orientation,
    items: Vec<LayoutItem>,
}

impl BoxLayout {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            base: LayoutBase::new(),
            orientation,
            items: Vec::new(),
        }
    }

    pub fn horizontal() -> Self {
        Self::new(Orientation::Horizontal)
    }

    pub fn vertical() -> Self {
        Self::new(Orientation::Vertical)
    }

    /// Take spacing and margins from the application defaults.
    pub fn with_defaults(mut self, defaults: &LayoutDefaults) -> Self {
        self.base = LayoutBase::from_defaults(defaults);
        self
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    pub fn items(&self) -> &[LayoutItem] {
        &self.items
    }

    /// Add a widget with the default constraint (stretch 1, fill).
    pub fn add_widget(&mut self, widget: ObjectId) -> Result<(), LayoutError> {
        self.add_widget_with(widget, LayoutConstraint::default())
    }

    pub fn add_widget_with(
        &mut self,
        widget: ObjectId,
        constraint: LayoutConstraint,
    ) -> Result<(), LayoutError> {
        self.insert_widget(self.items.len(), widget, constraint)
    }

    pub fn insert_widget(
        &mut self,
        index: usize,
        widget: ObjectId,
        constraint: LayoutConstraint,
    ) -> Result<(), LayoutError> {
        if index > self.items.len() {
            return Err(LayoutError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        if self.contains_widget(widget) {
            return Err(LayoutError::DuplicateItem(widget));
        }
        self.items.insert(
            index,
            LayoutItem::Widget {
                id: widget,
                constraint,
            },
        );
        Ok(())
    }

    /// Add fixed empty space.
    pub fn add_spacing(&mut self, size: f32) -> Result<(), LayoutError> {
        if size < 0.0 {
            return Err(LayoutError::NegativeSize(size));
        }
        self.items.push(LayoutItem::Spacing(size));
        Ok(())
    }

    /// Add an empty item that absorbs leftover space.
    pub fn add_stretch(&mut self, stretch: u32) {
        self.items.push(LayoutItem::Stretch(stretch));
    }

    pub fn constraint(&self, widget: ObjectId) -> Option<LayoutConstraint> {
        self.items.iter().find_map(|item| match item {
            LayoutItem::Widget { id, constraint } if *id == widget => Some(*constraint),
            _ => None,
        })
    }

    /// Replace a widget's constraint. Returns `false` if it is not managed.
    pub fn set_constraint(&mut self, widget: ObjectId, new: LayoutConstraint) -> bool {
        for item in &mut self.items {
            if let LayoutItem::Widget { id, constraint } = item
                && *id == widget
            {
                *constraint = new;
                return true;
            }
        }
        false
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl Layout for BoxLayout {
    fn base(&self) -> &LayoutBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut LayoutBase {
        &mut self.base
    }

    fn widgets(&self) -> Vec<ObjectId> {
        self.items.iter().filter_map(LayoutItem::widget_id).collect()
    }

    fn remove_widget(&mut self, widget: ObjectId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.widget_id() != Some(widget));
        self.items.len() != before
    }

    fn calculate<S: WidgetAccess + ?Sized>(&self, storage: &S, rect: Rect) -> Vec<Placement> {
        let main = self.orientation;
        let cross = main.cross();
        let content = self.base.content_rect(rect);
        let (main_start, main_len) = main.span(content);
        let (cross_start, cross_len) = cross.span(content);

        // Hidden and missing widgets take no room and no spacing.
        let mut slots = Vec::with_capacity(self.items.len());
        let mut overrides = Vec::with_capacity(self.items.len());
        let mut widgets = Vec::with_capacity(self.items.len());
        for (index, item) in self.items.iter().enumerate() {
            match item {
                LayoutItem::Widget { id, constraint } => {
                    let Some((natural, minimum)) = managed_sizes(storage, *id) else {
                        continue;
                    };
                    let (lead, trail) = main.margins(&constraint.margins);
                    let extra = lead + trail;
                    let min_main = main.pick(minimum) + extra;
                    slots.push(if constraint.is_expandable() {
                        AxisSlot::stretch(constraint.stretch, min_main)
                    } else {
                        AxisSlot::fixed(main.pick(natural) + extra, min_main)
                    });
                    overrides.push(constraint.spacing);
                    widgets.push(Some(index));
                }
                LayoutItem::Spacing(size) => {
                    slots.push(AxisSlot::fixed(*size, 0.0));
                    overrides.push(None);
                    widgets.push(None);
                }
                LayoutItem::Stretch(stretch) => {
                    slots.push(AxisSlot::stretch(*stretch, 0.0));
                    overrides.push(None);
                    widgets.push(None);
                }
            }
        }

        let gaps = gaps(&overrides, self.base.spacing());
        let sizes = distribute(&slots, main_len, &gaps);
        let starts = offsets(&sizes, main_start, &gaps);

        let mut placements = Vec::new();
        for (slot, item_index) in widgets.iter().enumerate() {
            let Some(item_index) = item_index else {
                continue;
            };
            let LayoutItem::Widget { id, constraint } = &self.items[*item_index] else {
                continue;
            };
            let Some((natural, minimum)) = managed_sizes(storage, *id) else {
                continue;
            };

            let (lead, trail) = main.margins(&constraint.margins);
            let main_span = (
                starts[slot] + lead,
                (sizes[slot] - lead - trail).max(0.0),
            );

            let (cross_lead, cross_trail) = cross.margins(&constraint.margins);
            let avail = (cross_len - cross_lead - cross_trail).max(0.0);
            let min_cross = cross.pick(minimum);
            let origin = cross_start + cross_lead;
            let cross_span = match constraint.alignment {
                Alignment::Fill => (origin, avail.max(min_cross)),
                align => {
                    let length = cross.pick(natural).max(min_cross);
                    align.place(origin, avail, length)
                }
            };

            placements.push((*id, main.compose(main_span, cross_span)));
        }
        placements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::layout::testing::{MockStorage, MockWidget};

    #[test]
    fn test_box_layout_creation() {
        let hbox = BoxLayout::horizontal();
        assert_eq!(hbox.orientation(), Orientation::Horizontal);
        assert_eq!(hbox.item_count(), 0);
        assert_eq!(BoxLayout::vertical().orientation(), Orientation::Vertical);
    }

    #[test]
    fn test_fixed_fixed_stretch_column() {
        let mut storage = MockStorage::new();
        let a = storage.add(MockWidget::sized(100.0, 30.0));
        let b = storage.add(MockWidget::sized(100.0, 30.0));
        let c = storage.add(MockWidget::sized(100.0, 30.0));

        let mut layout = BoxLayout::vertical();
        layout.add_widget_with(a, LayoutConstraint::fixed()).unwrap();
        layout.add_widget_with(b, LayoutConstraint::fixed()).unwrap();
        layout.add_widget(c).unwrap();

        layout.arrange(&mut storage, Rect::new(0.0, 0.0, 200.0, 300.0));
        assert_eq!(storage.geometry(a), Rect::new(0.0, 0.0, 200.0, 30.0));
        assert_eq!(storage.geometry(b), Rect::new(0.0, 30.0, 200.0, 30.0));
        assert_eq!(storage.geometry(c), Rect::new(0.0, 60.0, 200.0, 240.0));
    }

    #[test]
    fn test_spacing_and_margins() {
        let mut storage = MockStorage::new();
        let a = storage.add(MockWidget::sized(50.0, 20.0));
        let b = storage.add(MockWidget::sized(50.0, 20.0));

        let mut layout = BoxLayout::horizontal();
        layout.set_spacing(10.0);
        layout.set_content_margins(ContentMargins::uniform(5.0));
        layout.add_widget(a).unwrap();
        layout.add_widget(b).unwrap();

        let placements = layout.calculate(&storage, Rect::new(0.0, 0.0, 220.0, 50.0));
        assert_eq!(placements[0], (a, Rect::new(5.0, 5.0, 100.0, 40.0)));
        assert_eq!(placements[1], (b, Rect::new(115.0, 5.0, 100.0, 40.0)));
    }

    #[test]
    fn test_item_spacing_overrides_layout_spacing() {
        let mut storage = MockStorage::new();
        let a = storage.add(MockWidget::sized(50.0, 20.0));
        let b = storage.add(MockWidget::sized(50.0, 20.0));
        let c = storage.add(MockWidget::sized(50.0, 20.0));

        let mut layout = BoxLayout::horizontal();
        layout.set_spacing(10.0);
        layout
            .add_widget_with(a, LayoutConstraint::fixed().with_spacing(30.0))
            .unwrap();
        layout.add_widget_with(b, LayoutConstraint::fixed()).unwrap();
        layout.add_widget_with(c, LayoutConstraint::fixed()).unwrap();

        let placements = layout.calculate(&storage, Rect::new(0.0, 0.0, 300.0, 20.0));
        assert_eq!(placements[0].1.origin.x, 0.0);
        assert_eq!(placements[1].1.origin.x, 80.0);
        assert_eq!(placements[2].1.origin.x, 140.0);
    }

    #[test]
    fn test_cross_alignment_uses_natural_size() {
        let mut storage = MockStorage::new();
        let a = storage.add(MockWidget::sized(50.0, 20.0));

        let mut layout = BoxLayout::horizontal();
        layout
            .add_widget_with(a, LayoutConstraint::fixed().with_alignment(Alignment::Center))
            .unwrap();

        let placements = layout.calculate(&storage, Rect::new(0.0, 0.0, 200.0, 100.0));
        assert_eq!(placements[0].1, Rect::new(0.0, 40.0, 50.0, 20.0));
    }

    #[test]
    fn test_hidden_items_are_skipped() {
        let mut storage = MockStorage::new();
        let a = storage.add(MockWidget::sized(50.0, 20.0));
        let b = storage.add(MockWidget::sized(50.0, 20.0));
        storage.hide(a);

        let mut layout = BoxLayout::horizontal();
        layout.set_spacing(10.0);
        layout.add_widget(a).unwrap();
        layout.add_widget(b).unwrap();

        let placements = layout.calculate(&storage, Rect::new(0.0, 0.0, 100.0, 10.0));
        assert_eq!(placements, vec![(b, Rect::new(0.0, 0.0, 100.0, 10.0))]);
    }

    #[test]
    fn test_stretch_item_takes_leftover() {
        let mut storage = MockStorage::new();
        let a = storage.add(MockWidget::sized(40.0, 20.0));
        let b = storage.add(MockWidget::sized(40.0, 20.0));

        let mut layout = BoxLayout::horizontal();
        layout.add_widget_with(a, LayoutConstraint::fixed()).unwrap();
        layout.add_stretch(1);
        layout.add_widget_with(b, LayoutConstraint::fixed()).unwrap();

        let placements = layout.calculate(&storage, Rect::new(0.0, 0.0, 200.0, 20.0));
        assert_eq!(placements[1].1.origin.x, 160.0);
    }

    #[test]
    fn test_minimum_clamp_when_container_too_small() {
        let mut storage = MockStorage::new();
        let a = storage.add(MockWidget::sized(10.0, 10.0).with_minimum(60.0, 15.0));
        let b = storage.add(MockWidget::sized(10.0, 10.0).with_minimum(60.0, 15.0));

        let mut layout = BoxLayout::horizontal();
        layout.add_widget(a).unwrap();
        layout.add_widget(b).unwrap();

        for (_, rect) in layout.calculate(&storage, Rect::new(0.0, 0.0, 80.0, 10.0)) {
            assert!(rect.width() >= 60.0);
            assert!(rect.height() >= 15.0);
        }
    }

    #[test]
    fn test_duplicate_and_bad_index_rejected() {
        let id = ObjectId::from_raw(1);
        let mut layout = BoxLayout::horizontal();
        layout.add_widget(id).unwrap();
        assert_eq!(layout.add_widget(id), Err(LayoutError::DuplicateItem(id)));
        assert!(matches!(
            layout.insert_widget(5, ObjectId::from_raw(2), LayoutConstraint::default()),
            Err(LayoutError::IndexOutOfRange { index: 5, len: 1 })
        ));
        assert_eq!(layout.add_spacing(-1.0), Err(LayoutError::NegativeSize(-1.0)));
    }

    #[test]
    fn test_remove_widget() {
        let id = ObjectId::from_raw(1);
        let mut layout = BoxLayout::horizontal();
        layout.add_widget(id).unwrap();
        assert!(layout.remove_widget(id));
        assert!(!layout.remove_widget(id));
        assert!(layout.is_empty());
    }
}
