//! Layout items and per-item constraints.

use trellis_core::ObjectId;

use super::ContentMargins;

/// How an item is sized along a layout's main axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeMode {
    /// Take a share of the leftover space proportional to the stretch
    /// factor.
    #[default]
    Stretch,
    /// Keep the natural size.
    Natural,
}

/// Placement of an item inside its slot on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    /// Fill the whole slot.
    #[default]
    Fill,
    Start,
    Center,
    End,
}

impl Alignment {
    /// Position a `length`-long item inside a slot starting at `start`.
    ///
    /// `Fill` returns the slot unchanged; the others keep `length`.
    pub fn place(self, start: f32, slot: f32, length: f32) -> (f32, f32) {
        match self {
            Self::Fill => (start, slot),
            Self::Start => (start, length),
            Self::Center => (start + (slot - length) / 2.0, length),
            Self::End => (start + slot - length, length),
        }
    }
}

/// Constraints attached to an item when it is inserted into a layout.
///
/// The constraint belongs to the layout entry, not to the widget, so a
/// widget can move between layouts without carrying stale settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConstraint {
    /// Share of leftover space relative to other stretch items.
    pub stretch: u32,
    pub size_mode: SizeMode,
    /// Cross-axis alignment in box layouts, both axes in grid cells.
    pub alignment: Alignment,
    /// Space kept around the item inside its slot.
    pub margins: ContentMargins,
    /// Gap after this item in place of the layout's spacing. In a grid it
    /// applies after the item's last row and column.
    pub spacing: Option<f32>,
}

impl Default for LayoutConstraint {
    fn default() -> Self {
        Self {
            stretch: 1,
            size_mode: SizeMode::Stretch,
            alignment: Alignment::Fill,
            margins: ContentMargins::ZERO,
            spacing: None,
        }
    }
}

impl LayoutConstraint {
    pub fn new() -> Self {
        Self::default()
    }

    /// A constraint that keeps the item at its natural size.
    pub fn fixed() -> Self {
        Self {
            size_mode: SizeMode::Natural,
            ..Self::default()
        }
    }

    /// A stretch item with the given factor.
    pub fn stretch(factor: u32) -> Self {
        Self {
            stretch: factor,
            ..Self::default()
        }
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_margins(mut self, margins: ContentMargins) -> Self {
        self.margins = margins;
        self
    }

    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = Some(spacing.max(0.0));
        self
    }

    /// Whether the item takes part in leftover distribution.
    #[inline]
    pub fn is_expandable(&self) -> bool {
        self.size_mode == SizeMode::Stretch && self.stretch > 0
    }
}

/// An entry in a box layout.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutItem {
    Widget {
        id: ObjectId,
        constraint: LayoutConstraint,
    },
    /// Fixed empty space along the main axis.
    Spacing(f32),
    /// Empty space that absorbs leftover room.
    Stretch(u32),
}

impl LayoutItem {
    pub fn widget(id: ObjectId) -> Self {
        Self::Widget {
            id,
            constraint: LayoutConstraint::default(),
        }
    }

    pub fn widget_id(&self) -> Option<ObjectId> {
        match self {
            Self::Widget { id, .. } => Some(*id),
            _ => None,
        }
    }

    pub fn is_widget(&self) -> bool {
        matches!(self, Self::Widget { .. })
    }
}

/// A computed rectangle for one managed widget.
pub type Placement = (ObjectId, trellis_render::Rect);
