//! Items of the item graph.
//!
//! An item is positioned content with its own z-value, transform, opacity
//! and interaction flags. What an item draws is supplied through the
//! [`ItemContent`] trait; [`ShapeItem`] covers plain rectangles, ellipses
//! and polygons.

use slotmap::new_key_type;
use trellis_render::{Color, Painter, Point, Rect, Stroke, Transform2D};

new_key_type! {
    /// A handle to an item in an [`ItemGraph`](super::ItemGraph).
    pub struct ItemId;
}

/// Interaction flags of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemFlags {
    /// Clicks can select the item.
    pub selectable: bool,
    /// Dragging a selected item moves it.
    pub movable: bool,
    /// The item can become the graph's focus item.
    pub focusable: bool,
}

impl ItemFlags {
    pub const NONE: Self = Self {
        selectable: false,
        movable: false,
        focusable: false,
    };

    pub const SELECTABLE: Self = Self {
        selectable: true,
        ..Self::NONE
    };

    pub const ALL: Self = Self {
        selectable: true,
        movable: true,
        focusable: true,
    };
}

impl Default for ItemFlags {
    fn default() -> Self {
        Self::SELECTABLE
    }
}

/// What an item draws.
///
/// Coordinates are item-local: the graph translates the painter to the item
/// position and applies its transform before calling [`paint`](Self::paint).
pub trait ItemContent: Send + Sync {
    /// Local bounds of everything the item draws.
    fn bounding_rect(&self) -> Rect;

    fn paint(&self, painter: &mut dyn Painter);
}

/// The geometry drawn by a [`ShapeItem`].
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect(Rect),
    /// The ellipse inscribed in the rectangle.
    Ellipse(Rect),
    Polygon(Vec<Point>),
}

impl Shape {
    pub fn bounds(&self) -> Rect {
        match self {
            Self::Rect(rect) | Self::Ellipse(rect) => rect.normalized(),
            Self::Polygon(points) => {
                let mut iter = points.iter();
                let Some(first) = iter.next() else {
                    return Rect::ZERO;
                };
                iter.fold(Rect::from_origin_size(*first, Default::default()), |acc, p| {
                    acc.union(&Rect::from_origin_size(*p, Default::default()))
                })
            }
        }
    }
}

/// A filled and optionally outlined shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeItem {
    pub shape: Shape,
    pub fill: Color,
    pub outline: Option<Stroke>,
}

impl ShapeItem {
    pub fn rect(rect: Rect, fill: Color) -> Self {
        Self {
            shape: Shape::Rect(rect),
            fill,
            outline: None,
        }
    }

    pub fn ellipse(rect: Rect, fill: Color) -> Self {
        Self {
            shape: Shape::Ellipse(rect),
            fill,
            outline: None,
        }
    }

    pub fn polygon(points: Vec<Point>, fill: Color) -> Self {
        Self {
            shape: Shape::Polygon(points),
            fill,
            outline: None,
        }
    }

    pub fn with_outline(mut self, stroke: Stroke) -> Self {
        self.outline = Some(stroke);
        self
    }
}

impl ItemContent for ShapeItem {
    fn bounding_rect(&self) -> Rect {
        let bounds = self.shape.bounds();
        match &self.outline {
            Some(stroke) => bounds.inflate(stroke.width / 2.0),
            None => bounds,
        }
    }

    fn paint(&self, painter: &mut dyn Painter) {
        match &self.shape {
            Shape::Rect(rect) => {
                painter.fill_rect(*rect, self.fill);
                if let Some(stroke) = &self.outline {
                    painter.stroke_rect(*rect, stroke);
                }
            }
            Shape::Ellipse(rect) => {
                painter.fill_ellipse(*rect, self.fill);
                if let Some(stroke) = &self.outline {
                    painter.stroke_ellipse(*rect, stroke);
                }
            }
            Shape::Polygon(points) => {
                painter.fill_polygon(points, self.fill);
                if let Some(stroke) = &self.outline {
                    for (i, from) in points.iter().enumerate() {
                        let to = points[(i + 1) % points.len()];
                        painter.draw_line(*from, to, stroke);
                    }
                }
            }
        }
    }
}

/// One item stored in a graph.
pub(crate) struct GraphItem {
    pub(crate) pos: Point,
    pub(crate) z: f32,
    pub(crate) transform: Transform2D,
    pub(crate) opacity: f32,
    pub(crate) flags: ItemFlags,
    pub(crate) selected: bool,
    /// Insertion sequence, breaks z ties.
    pub(crate) seq: u64,
    pub(crate) content: Box<dyn ItemContent>,
}

impl GraphItem {
    pub(crate) fn new(content: Box<dyn ItemContent>, seq: u64) -> Self {
        Self {
            pos: Point::ZERO,
            z: 0.0,
            transform: Transform2D::IDENTITY,
            opacity: 1.0,
            flags: ItemFlags::default(),
            selected: false,
            seq,
            content,
        }
    }

    /// Bounds used for hit testing: position plus local bounds. The
    /// transform is not applied.
    pub(crate) fn hit_rect(&self) -> Rect {
        self.content.bounding_rect().offset(self.pos.x, self.pos.y)
    }
}

impl std::fmt::Debug for GraphItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphItem")
            .field("pos", &self.pos)
            .field("z", &self.z)
            .field("opacity", &self.opacity)
            .field("flags", &self.flags)
            .field("selected", &self.selected)
            .field("bounds", &self.content.bounding_rect())
            .finish()
    }
}
