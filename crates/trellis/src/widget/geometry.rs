//! Size hints for layout negotiation.
//!
//! A widget reports a [`SizeHint`] describing its natural size (what it
//! would like when nothing else constrains it) and an optional minimum that
//! every layout strategy must honour.

use trellis_render::Size;

/// Natural and minimum size of a widget.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SizeHint {
    /// The size the widget displays best at.
    pub preferred: Size,

    /// The smallest acceptable size. `None` means the widget may shrink to
    /// zero.
    pub minimum: Option<Size>,
}

impl SizeHint {
    /// Create a size hint with the given preferred size and no minimum.
    pub fn new(preferred: Size) -> Self {
        Self {
            preferred,
            minimum: None,
        }
    }

    /// Create a size hint with explicit width and height.
    pub fn from_dimensions(width: f32, height: f32) -> Self {
        Self::new(Size::new(width, height))
    }

    /// Create a hint whose minimum equals its preferred size.
    pub fn fixed(size: Size) -> Self {
        Self {
            preferred: size,
            minimum: Some(size),
        }
    }

    pub fn with_minimum(mut self, minimum: Size) -> Self {
        self.minimum = Some(minimum);
        self
    }

    pub fn with_minimum_dimensions(self, width: f32, height: f32) -> Self {
        self.with_minimum(Size::new(width, height))
    }

    /// The minimum, or zero when unset.
    pub fn effective_minimum(&self) -> Size {
        self.minimum.unwrap_or(Size::ZERO)
    }

    /// Grow `size` up to the minimum on each axis.
    pub fn clamp_to_minimum(&self, size: Size) -> Size {
        size.max(self.effective_minimum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_to_minimum() {
        let hint = SizeHint::from_dimensions(80.0, 20.0).with_minimum_dimensions(40.0, 30.0);
        assert_eq!(hint.clamp_to_minimum(Size::new(10.0, 50.0)), Size::new(40.0, 50.0));
        assert_eq!(SizeHint::default().effective_minimum(), Size::ZERO);
    }

    #[test]
    fn test_fixed_hint() {
        let hint = SizeHint::fixed(Size::new(10.0, 10.0));
        assert_eq!(hint.minimum, Some(hint.preferred));
    }
}
