//! Layout system for automatic widget positioning and sizing.
//!
//! A layout is attached to one host widget and positions the host's managed
//! children inside the host's rectangle. Five strategies are provided:
//!
//! - [`BoxLayout`] - a row or column with stretch factors
//! - [`GridLayout`] - rows and columns with spans and an auto-insert cursor
//! - [`FormLayout`] - label/field rows with multi-line defaults
//! - [`StackLayout`] - several pages, one visible at a time
//! - [`SplitterLayout`] - weighted panes separated by draggable handles
//!
//! Every strategy honours each widget's minimum size. When minimums no
//! longer fit, the last item gives up the overflow first.
//!
//! # Example
//!
//! ```
//! use trellis::widget::layout::{BoxLayout, ContentMargins, Layout};
//! # use trellis_core::ObjectId;
//!
//! let mut layout = BoxLayout::horizontal();
//! layout.set_spacing(10.0);
//! layout.set_content_margins(ContentMargins::uniform(8.0));
//! layout.add_widget(ObjectId::from_raw(1)).unwrap();
//! layout.add_stretch(1);
//! assert_eq!(layout.item_count(), 1);
//! ```

mod base;
mod box_layout;
mod form_layout;
mod grid_layout;
mod item;
mod splitter_layout;
mod stack_layout;
mod traits;

pub use base::LayoutBase;
pub use box_layout::{BoxLayout, Orientation};
pub use form_layout::{FormLayout, FormRow, MULTI_LINE_ROW_HEIGHT, DEFAULT_ROW_HEIGHT};
pub use grid_layout::{GridCell, GridLayout};
pub use item::{Alignment, LayoutConstraint, LayoutItem, Placement, SizeMode};
pub use splitter_layout::{HandleState, SplitterLayout};
pub use stack_layout::StackLayout;
pub use traits::Layout;

use serde::{Deserialize, Serialize};
use trellis_core::ObjectId;
use trellis_render::{CursorShape, Painter, Rect, Size};

use crate::config::LayoutDefaults;
use crate::widget::events::WidgetEvent;
use crate::widget::tree::WidgetAccess;

/// Space kept between a layout's edges and its content.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentMargins {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl ContentMargins {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn uniform(margin: f32) -> Self {
        Self::new(margin, margin, margin, margin)
    }

    pub const fn symmetric(horizontal: f32, vertical: f32) -> Self {
        Self::new(horizontal, vertical, horizontal, vertical)
    }

    /// Total horizontal margin (left + right).
    #[inline]
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// Total vertical margin (top + bottom).
    #[inline]
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    /// `rect` with the margins removed. Never yields a negative size.
    pub fn shrink(&self, rect: Rect) -> Rect {
        rect.inset(self.left, self.top, self.right, self.bottom)
    }
}

/// Natural and minimum size of a managed widget, or `None` when it is hidden
/// or missing and so takes no space.
pub(crate) fn managed_sizes<S: WidgetAccess + ?Sized>(
    storage: &S,
    id: ObjectId,
) -> Option<(Size, Size)> {
    if !storage.is_widget_visible(id) {
        return None;
    }
    let widget = storage.get_widget(id)?;
    let minimum = widget.minimum_size();
    Some((widget.natural_size().max(minimum), minimum))
}

/// Any of the built-in layouts.
///
/// [`Layout`] has generic methods and is not object safe, so hosts store
/// their layout as a `LayoutKind` and dispatch through it.
#[derive(Debug)]
pub enum LayoutKind {
    Box(BoxLayout),
    Grid(GridLayout),
    Form(FormLayout),
    Stacked(StackLayout),
    Splitter(SplitterLayout),
}

macro_rules! delegate {
    ($self:expr, $l:ident => $body:expr) => {
        match $self {
            LayoutKind::Box($l) => $body,
            LayoutKind::Grid($l) => $body,
            LayoutKind::Form($l) => $body,
            LayoutKind::Stacked($l) => $body,
            LayoutKind::Splitter($l) => $body,
        }
    };
}

impl LayoutKind {
    pub fn horizontal(defaults: &LayoutDefaults) -> Self {
        Self::Box(BoxLayout::horizontal().with_defaults(defaults))
    }

    pub fn vertical(defaults: &LayoutDefaults) -> Self {
        Self::Box(BoxLayout::vertical().with_defaults(defaults))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Box(_) => "box",
            Self::Grid(_) => "grid",
            Self::Form(_) => "form",
            Self::Stacked(_) => "stacked",
            Self::Splitter(_) => "splitter",
        }
    }

    pub fn calculate<S: WidgetAccess + ?Sized>(&self, storage: &S, rect: Rect) -> Vec<Placement> {
        delegate!(self, l => l.calculate(storage, rect))
    }

    pub fn arrange<S: WidgetAccess + ?Sized>(&mut self, storage: &mut S, rect: Rect) -> Vec<Placement> {
        delegate!(self, l => l.arrange(storage, rect))
    }

    pub fn widgets(&self) -> Vec<ObjectId> {
        delegate!(self, l => l.widgets())
    }

    pub fn contains_widget(&self, widget: ObjectId) -> bool {
        delegate!(self, l => l.contains_widget(widget))
    }

    pub fn remove_widget(&mut self, widget: ObjectId) -> bool {
        delegate!(self, l => l.remove_widget(widget))
    }

    pub fn set_spacing(&mut self, spacing: f32) {
        delegate!(self, l => l.set_spacing(spacing))
    }

    pub fn set_content_margins(&mut self, margins: ContentMargins) {
        delegate!(self, l => l.set_content_margins(margins))
    }

    /// Offer a pointer event in host-local coordinates. Returns `true` when
    /// the layout consumed it; only splitter handles do.
    pub fn pointer_event(&mut self, event: &WidgetEvent) -> bool {
        match self {
            Self::Splitter(l) => l.pointer_event(event),
            _ => false,
        }
    }

    /// Cursor the layout wants at a host-local point.
    pub fn cursor_at(&self, pos: trellis_render::Point) -> Option<CursorShape> {
        match self {
            Self::Splitter(l) => l.cursor_at(pos),
            _ => None,
        }
    }

    /// Draw layout decorations over the host, in host-local coordinates.
    pub fn paint(&self, painter: &mut dyn Painter) {
        if let Self::Splitter(l) = self {
            l.paint_handles(painter);
        }
    }

    pub fn as_box_mut(&mut self) -> Option<&mut BoxLayout> {
        match self {
            Self::Box(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_grid_mut(&mut self) -> Option<&mut GridLayout> {
        match self {
            Self::Grid(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_form_mut(&mut self) -> Option<&mut FormLayout> {
        match self {
            Self::Form(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_stack(&self) -> Option<&StackLayout> {
        match self {
            Self::Stacked(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_stack_mut(&mut self) -> Option<&mut StackLayout> {
        match self {
            Self::Stacked(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_splitter(&self) -> Option<&SplitterLayout> {
        match self {
            Self::Splitter(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_splitter_mut(&mut self) -> Option<&mut SplitterLayout> {
        match self {
            Self::Splitter(l) => Some(l),
            _ => None,
        }
    }
}

impl From<BoxLayout> for LayoutKind {
    fn from(layout: BoxLayout) -> Self {
        Self::Box(layout)
    }
}

impl From<GridLayout> for LayoutKind {
    fn from(layout: GridLayout) -> Self {
        Self::Grid(layout)
    }
}

impl From<FormLayout> for LayoutKind {
    fn from(layout: FormLayout) -> Self {
        Self::Form(layout)
    }
}

impl From<StackLayout> for LayoutKind {
    fn from(layout: StackLayout) -> Self {
        Self::Stacked(layout)
    }
}

impl From<SplitterLayout> for LayoutKind {
    fn from(layout: SplitterLayout) -> Self {
        Self::Splitter(layout)
    }
}

/// Mock widgets and storage shared by the layout tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashSet;

    use slotmap::SlotMap;
    use trellis_core::ObjectId;
    use trellis_render::Rect;

    use crate::widget::base::WidgetBase;
    use crate::widget::geometry::SizeHint;
    use crate::widget::traits::{PaintContext, Widget};
    use crate::widget::tree::WidgetAccess;

    pub struct MockWidget {
        base: WidgetBase,
        hint: SizeHint,
        multi_line: bool,
    }

    impl MockWidget {
        pub fn sized(width: f32, height: f32) -> Self {
            Self {
                base: WidgetBase::new(),
                hint: SizeHint::from_dimensions(width, height),
                multi_line: false,
            }
        }

        pub fn with_minimum(mut self, width: f32, height: f32) -> Self {
            self.hint = self.hint.with_minimum_dimensions(width, height);
            self
        }

        pub fn multi_line(mut self) -> Self {
            self.multi_line = true;
            self
        }
    }

    impl Widget for MockWidget {
        fn widget_base(&self) -> &WidgetBase {
            &self.base
        }

        fn widget_base_mut(&mut self) -> &mut WidgetBase {
            &mut self.base
        }

        fn size_hint(&self) -> SizeHint {
            self.hint
        }

        fn is_multi_line(&self) -> bool {
            self.multi_line
        }

        fn paint(&self, _ctx: &mut PaintContext<'_>) {}
    }

    pub struct MockStorage {
        widgets: SlotMap<ObjectId, MockWidget>,
        hidden: HashSet<ObjectId>,
    }

    impl MockStorage {
        pub fn new() -> Self {
            Self {
                widgets: SlotMap::with_key(),
                hidden: HashSet::new(),
            }
        }

        pub fn add(&mut self, widget: MockWidget) -> ObjectId {
            let id = self.widgets.insert(widget);
            self.widgets[id].base.attach(id);
            id
        }

        pub fn hide(&mut self, id: ObjectId) {
            self.hidden.insert(id);
        }

        pub fn is_hidden(&self, id: ObjectId) -> bool {
            self.hidden.contains(&id)
        }

        pub fn geometry(&self, id: ObjectId) -> Rect {
            self.widgets[id].base.geometry()
        }
    }

    impl WidgetAccess for MockStorage {
        fn get_widget(&self, id: ObjectId) -> Option<&dyn Widget> {
            self.widgets.get(id).map(|w| w as &dyn Widget)
        }

        fn get_widget_mut(&mut self, id: ObjectId) -> Option<&mut dyn Widget> {
            self.widgets.get_mut(id).map(|w| w as &mut dyn Widget)
        }

        fn is_widget_visible(&self, id: ObjectId) -> bool {
            self.widgets.contains_key(id) && !self.hidden.contains(&id)
        }

        fn set_widget_visible(&mut self, id: ObjectId, visible: bool) {
            if visible {
                self.hidden.remove(&id);
            } else {
                self.hidden.insert(id);
            }
        }
    }

    /// Ids for layouts that are only inspected, never calculated.
    pub fn create_test_ids(count: usize) -> Vec<ObjectId> {
        let mut map: SlotMap<ObjectId, ()> = SlotMap::with_key();
        (0..count).map(|_| map.insert(())).collect()
    }
}
