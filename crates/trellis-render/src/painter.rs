//! The drawing contract widgets paint through.
//!
//! A [`Painter`] is handed to every widget's `paint` call. It keeps a
//! save/restore stack of transform, clip and opacity; [`RenderStateStack`]
//! is a reusable implementation of that stack for backends.

use crate::backend::{Font, ImageId};
use crate::transform::Transform2D;
use crate::types::{Color, Point, Rect};

/// Outline style for stroked shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

impl Stroke {
    pub const fn new(color: Color, width: f32) -> Self {
        Self { color, width }
    }
}

impl Default for Stroke {
    fn default() -> Self {
        Self::new(Color::BLACK, 1.0)
    }
}

/// The 2D drawing interface.
///
/// Coordinates are in the current user space, which starts as device space
/// at the beginning of a frame and is changed by [`translate`](Self::translate)
/// and [`concat_transform`](Self::concat_transform).
///
/// ```ignore
/// painter.save();
/// painter.translate(10.0, 10.0);
/// painter.fill_rect(rect, Color::BLUE);
/// painter.restore();
/// ```
pub trait Painter {
    // =========================================================================
    // State Management
    // =========================================================================

    /// Save the current state (transform, clip, opacity).
    fn save(&mut self);

    /// Restore the previously saved state. Unbalanced calls are ignored.
    fn restore(&mut self);

    // =========================================================================
    // Transform Operations
    // =========================================================================

    /// The current user-to-device transform.
    fn transform(&self) -> Transform2D;

    /// Pre-multiply `transform` onto the current transform.
    fn concat_transform(&mut self, transform: &Transform2D);

    fn translate(&mut self, tx: f32, ty: f32) {
        self.concat_transform(&Transform2D::translate(tx, ty));
    }

    // =========================================================================
    // Clipping and Opacity
    // =========================================================================

    /// Intersect the clip with `rect` (user space).
    fn clip_rect(&mut self, rect: Rect);

    /// Current clip in device space, if any.
    fn clip_bounds(&self) -> Option<Rect>;

    /// Multiply the current opacity by `opacity`.
    fn set_opacity(&mut self, opacity: f32);

    fn opacity(&self) -> f32;

    // =========================================================================
    // Primitives
    // =========================================================================

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn stroke_rect(&mut self, rect: Rect, stroke: &Stroke);

    fn draw_line(&mut self, from: Point, to: Point, stroke: &Stroke);

    /// Fill the ellipse inscribed in `rect`.
    fn fill_ellipse(&mut self, rect: Rect, color: Color);

    fn stroke_ellipse(&mut self, rect: Rect, stroke: &Stroke);

    /// Fill a closed polygon.
    fn fill_polygon(&mut self, points: &[Point], color: Color);

    /// Draw a run of text with its top-left corner at `origin`.
    fn draw_text(&mut self, origin: Point, text: &str, font: &Font, color: Color);

    /// Draw a loaded image scaled into `dest`.
    fn draw_image(&mut self, image: ImageId, dest: Rect);
}

/// Saved painter state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    pub transform: Transform2D,
    /// Clip in device space.
    pub clip: Option<Rect>,
    pub opacity: f32,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            transform: Transform2D::IDENTITY,
            clip: None,
            opacity: 1.0,
        }
    }
}

/// Save/restore state management shared by painter implementations.
#[derive(Debug, Clone, Default)]
pub struct RenderStateStack {
    stack: Vec<RenderState>,
    current: RenderState,
}

impl RenderStateStack {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn current(&self) -> &RenderState {
        &self.current
    }

    pub fn save(&mut self) {
        self.stack.push(self.current);
    }

    pub fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.current = state;
        }
    }

    /// Reset to default state and clear the stack.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.current = RenderState::default();
    }

    pub fn concat_transform(&mut self, transform: &Transform2D) {
        self.current.transform = self.current.transform.then(transform);
    }

    /// Intersect the clip with `rect`, given in user space.
    ///
    /// An empty intersection leaves a zero-sized clip so later drawing is
    /// discarded.
    pub fn clip_rect(&mut self, rect: Rect) {
        let device = self.current.transform.transform_rect(&rect);
        self.current.clip = Some(match self.current.clip {
            Some(existing) => existing.intersect(&device).unwrap_or(Rect::ZERO),
            None => device,
        });
    }

    pub fn multiply_opacity(&mut self, opacity: f32) {
        self.current.opacity = (self.current.opacity * opacity).clamp(0.0, 1.0);
    }

    /// Map a user-space rect to device space and clip it.
    ///
    /// Returns `None` when nothing of the rect remains visible.
    pub fn map_and_clip(&self, rect: Rect) -> Option<Rect> {
        let device = self.current.transform.transform_rect(&rect);
        match self.current.clip {
            Some(clip) => clip.intersect(&device),
            None if device.is_empty() => None,
            None => Some(device),
        }
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_state_stack() {
        let mut stack = RenderStateStack::new();

        stack.concat_transform(&Transform2D::translate(10.0, 20.0));
        stack.save();
        stack.concat_transform(&Transform2D::translate(5.0, 5.0));
        stack.multiply_opacity(0.5);
        assert_eq!(stack.current().transform.translation(), Point::new(15.0, 25.0));
        assert_eq!(stack.depth(), 1);

        stack.restore();
        assert_eq!(stack.current().transform.translation(), Point::new(10.0, 20.0));
        assert_eq!(stack.current().opacity, 1.0);

        stack.restore();
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_clip_intersection() {
        let mut stack = RenderStateStack::new();

        stack.clip_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        stack.clip_rect(Rect::new(50.0, 50.0, 100.0, 100.0));
        assert_eq!(stack.current().clip, Some(Rect::new(50.0, 50.0, 50.0, 50.0)));

        stack.clip_rect(Rect::new(500.0, 500.0, 10.0, 10.0));
        assert!(stack.map_and_clip(Rect::new(60.0, 60.0, 5.0, 5.0)).is_none());
    }

    #[test]
    fn test_map_and_clip_uses_transform() {
        let mut stack = RenderStateStack::new();
        stack.clip_rect(Rect::new(0.0, 0.0, 50.0, 50.0));
        stack.concat_transform(&Transform2D::translate(40.0, 40.0));

        assert_eq!(
            stack.map_and_clip(Rect::new(0.0, 0.0, 20.0, 20.0)),
            Some(Rect::new(40.0, 40.0, 10.0, 10.0))
        );
    }
}
