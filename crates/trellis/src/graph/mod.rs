//! The item graph.
//!
//! A secondary, canvas-style collection of z-ordered items hosted inside a
//! single widget. Unlike widgets, items are not tree nodes: they live in an
//! [`ItemGraph`] arena, carry their own transform and opacity, and share one
//! selection model.
//!
//! - [`ItemGraph`]: storage, z-order, hit testing, selection, moving
//! - [`ItemContent`]: what an item draws; [`ShapeItem`] for basic shapes
//! - [`GraphView`]: the widget that paints a graph and feeds it input

mod item;
mod scene;
mod view;

pub use item::{ItemContent, ItemFlags, ItemId, Shape, ShapeItem};
pub use scene::ItemGraph;
pub use view::GraphView;
