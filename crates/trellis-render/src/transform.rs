//! 2D affine transforms.
//!
//! Items in the item graph carry a [`Transform2D`], and painters keep one as
//! part of their saved state. The matrix is a thin wrapper over
//! [`glam::Affine2`].
//!
//! ```
//! use trellis_render::{Point, Transform2D};
//!
//! // `then` applies the argument first, then `self`.
//! let t = Transform2D::scale(2.0).then(&Transform2D::translate(10.0, 0.0));
//! assert_eq!(t.transform_point(Point::new(5.0, 0.0)), Point::new(30.0, 0.0));
//! ```

use glam::{Affine2, Vec2};

use crate::types::{Point, Rect};

/// A 2D affine transformation (translation, rotation, scale, shear).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D(Affine2);

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform2D {
    /// The identity transform.
    pub const IDENTITY: Self = Self(Affine2::IDENTITY);

    /// Create a transform from raw matrix elements.
    ///
    /// `(m00, m01)` is the image of the x axis, `(m10, m11)` the image of
    /// the y axis and `(m20, m21)` the translation.
    #[inline]
    pub fn from_matrix(m00: f32, m01: f32, m10: f32, m11: f32, m20: f32, m21: f32) -> Self {
        Self(Affine2::from_cols_array(&[m00, m01, m10, m11, m20, m21]))
    }

    #[inline]
    pub fn translate(tx: f32, ty: f32) -> Self {
        Self(Affine2::from_translation(Vec2::new(tx, ty)))
    }

    #[inline]
    pub fn scale(s: f32) -> Self {
        Self::scale_xy(s, s)
    }

    #[inline]
    pub fn scale_xy(sx: f32, sy: f32) -> Self {
        Self(Affine2::from_scale(Vec2::new(sx, sy)))
    }

    /// Rotation by `angle` radians (clockwise on a y-down surface).
    #[inline]
    pub fn rotate(angle: f32) -> Self {
        Self(Affine2::from_angle(angle))
    }

    /// Rotation around `center`.
    pub fn rotate_around(angle: f32, center: Point) -> Self {
        Self::translate(center.x, center.y)
            .then(&Self::rotate(angle))
            .then(&Self::translate(-center.x, -center.y))
    }

    /// Compose: the result applies `other` first, then `self`.
    #[inline]
    pub fn then(&self, other: &Self) -> Self {
        Self(self.0 * other.0)
    }

    #[inline]
    pub fn translated(&self, tx: f32, ty: f32) -> Self {
        self.then(&Self::translate(tx, ty))
    }

    #[inline]
    pub fn scaled(&self, s: f32) -> Self {
        self.then(&Self::scale(s))
    }

    #[inline]
    pub fn rotated(&self, angle: f32) -> Self {
        self.then(&Self::rotate(angle))
    }

    /// Map a point through the transform.
    #[inline]
    pub fn transform_point(&self, p: Point) -> Point {
        Point::from_vec2(self.0.transform_point2(p.to_vec2()))
    }

    /// The inverse transform, or `None` when the matrix is singular.
    pub fn inverse(&self) -> Option<Self> {
        if self.0.matrix2.determinant().abs() < 1e-10 {
            return None;
        }
        Some(Self(self.0.inverse()))
    }

    /// The translation component.
    #[inline]
    pub fn translation(&self) -> Point {
        Point::from_vec2(self.0.translation)
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Whether the transform is a pure translation.
    #[inline]
    pub fn is_translation_only(&self) -> bool {
        self.0.matrix2 == glam::Mat2::IDENTITY
    }

    /// The axis-aligned bounding box of the transformed rectangle.
    pub fn transform_rect(&self, rect: &Rect) -> Rect {
        let r = rect.normalized();
        let corners = [
            Point::new(r.left(), r.top()),
            Point::new(r.right(), r.top()),
            Point::new(r.left(), r.bottom()),
            Point::new(r.right(), r.bottom()),
        ]
        .map(|p| self.transform_point(p));

        let (mut min, mut max) = (corners[0], corners[0]);
        for p in &corners[1..] {
            min = Point::new(min.x.min(p.x), min.y.min(p.y));
            max = Point::new(max.x.max(p.x), max.y.max(p.y));
        }
        Rect::from_corners(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_translation_and_scale() {
        let t = Transform2D::translate(10.0, 20.0);
        assert_eq!(t.transform_point(Point::new(5.0, 5.0)), Point::new(15.0, 25.0));
        assert!(t.is_translation_only());

        let s = Transform2D::scale_xy(2.0, 3.0);
        assert_eq!(s.transform_point(Point::new(5.0, 10.0)), Point::new(10.0, 30.0));
        assert!(!s.is_translation_only());
    }

    #[test]
    fn test_rotation_around_point() {
        let t = Transform2D::rotate_around(PI / 2.0, Point::new(50.0, 50.0));
        let p = t.transform_point(Point::new(100.0, 50.0));
        assert!(approx_eq(p.x, 50.0));
        assert!(approx_eq(p.y, 100.0));
    }

    #[test]
    fn test_inverse() {
        let t = Transform2D::translate(10.0, 20.0).scaled(2.0).rotated(PI / 4.0);
        let back = t.then(&t.inverse().unwrap()).transform_point(Point::new(100.0, 50.0));
        assert!(approx_eq(back.x, 100.0));
        assert!(approx_eq(back.y, 50.0));

        assert!(Transform2D::scale(0.0).inverse().is_none());
    }

    #[test]
    fn test_transform_rect_bounds_rotation() {
        let t = Transform2D::rotate(PI / 2.0);
        let r = t.transform_rect(&Rect::new(0.0, 0.0, 100.0, 50.0));
        assert!(approx_eq(r.left(), -50.0));
        assert!(approx_eq(r.top(), 0.0));
        assert!(approx_eq(r.width(), 50.0));
        assert!(approx_eq(r.height(), 100.0));
    }
}
