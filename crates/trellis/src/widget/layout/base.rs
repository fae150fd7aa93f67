//! Common layout implementation.
//!
//! [`LayoutBase`] carries the settings every strategy shares (margins and
//! spacing). The free functions implement the one-axis distribution used by
//! box, splitter and grid layouts, including the minimum-size clamp.

use trellis_render::Rect;

use super::ContentMargins;
use crate::config::LayoutDefaults;

/// Shared settings for layout implementations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutBase {
    content_margins: ContentMargins,
    spacing: f32,
}

impl Default for LayoutBase {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutBase {
    /// Zero margins and zero spacing.
    pub fn new() -> Self {
        Self {
            content_margins: ContentMargins::ZERO,
            spacing: 0.0,
        }
    }

    pub fn from_defaults(defaults: &LayoutDefaults) -> Self {
        Self {
            content_margins: defaults.margins,
            spacing: defaults.spacing.max(0.0),
        }
    }

    #[inline]
    pub fn content_margins(&self) -> ContentMargins {
        self.content_margins
    }

    pub fn set_content_margins(&mut self, margins: ContentMargins) {
        self.content_margins = margins;
    }

    #[inline]
    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Negative spacing is treated as zero.
    pub fn set_spacing(&mut self, spacing: f32) {
        self.spacing = spacing.max(0.0);
    }

    /// The part of `rect` left after the content margins.
    pub fn content_rect(&self, rect: Rect) -> Rect {
        self.content_margins.shrink(rect)
    }
}

/// One entry along a layout's main axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AxisSlot {
    /// Size used when the entry does not stretch.
    pub natural: f32,
    pub minimum: f32,
    pub stretch: u32,
    pub expandable: bool,
}

impl AxisSlot {
    pub fn fixed(natural: f32, minimum: f32) -> Self {
        Self {
            natural,
            minimum,
            stretch: 0,
            expandable: false,
        }
    }

    pub fn stretch(stretch: u32, minimum: f32) -> Self {
        Self {
            natural: 0.0,
            minimum,
            stretch,
            expandable: stretch > 0,
        }
    }
}

/// Gap after each entry but the last: the entry's own override, or
/// `spacing`.
pub(crate) fn gaps(overrides: &[Option<f32>], spacing: f32) -> Vec<f32> {
    let count = overrides.len().saturating_sub(1);
    overrides[..count]
        .iter()
        .map(|gap| gap.unwrap_or(spacing).max(0.0))
        .collect()
}

/// Split `length` among `slots`; `gaps[i]` separates slot `i` from the next.
///
/// Fixed slots keep their natural size. Expandable slots share what is left
/// (clamped at zero) in proportion to their stretch factors; with no
/// expandable slot the leftover stays unused. Every slot is then grown to its
/// minimum, and if the result no longer fits, the last slot gives up the
/// overflow down to its own minimum.
pub(crate) fn distribute(slots: &[AxisSlot], length: f32, gaps: &[f32]) -> Vec<f32> {
    if slots.is_empty() {
        return Vec::new();
    }

    let gaps: f32 = gaps.iter().sum();
    let fixed: f32 = slots
        .iter()
        .filter(|s| !s.expandable)
        .map(|s| s.natural)
        .sum();
    let available = (length - fixed - gaps).max(0.0);
    let total_stretch: u32 = slots
        .iter()
        .filter(|s| s.expandable)
        .map(|s| s.stretch)
        .sum();

    let mut sizes: Vec<f32> = slots
        .iter()
        .map(|s| {
            let size = if !s.expandable {
                s.natural
            } else if total_stretch > 0 {
                available * s.stretch as f32 / total_stretch as f32
            } else {
                0.0
            };
            size.max(s.minimum)
        })
        .collect();

    let minimums: Vec<f32> = slots.iter().map(|s| s.minimum).collect();
    absorb_overflow(&mut sizes, &minimums, length - gaps);
    sizes
}

/// Shrink the last entry so the total fits `room`, never below its minimum.
pub(crate) fn absorb_overflow(sizes: &mut [f32], minimums: &[f32], room: f32) {
    let used: f32 = sizes.iter().sum();
    let overflow = used - room.max(0.0);
    if overflow <= 0.0 {
        return;
    }
    if let (Some(last), Some(min)) = (sizes.last_mut(), minimums.last()) {
        *last = (*last - overflow).max(*min);
    }
}

/// Start offsets for consecutive sizes separated by `gaps`.
pub(crate) fn offsets(sizes: &[f32], start: f32, gaps: &[f32]) -> Vec<f32> {
    let mut pos = start;
    sizes
        .iter()
        .enumerate()
        .map(|(i, size)| {
            let at = pos;
            pos += size + gaps.get(i).copied().unwrap_or(0.0);
            at
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_and_stretch() {
        let slots = [
            AxisSlot::fixed(30.0, 0.0),
            AxisSlot::fixed(30.0, 0.0),
            AxisSlot::stretch(1, 0.0),
        ];
        assert_eq!(distribute(&slots, 300.0, &[0.0, 0.0]), vec![30.0, 30.0, 240.0]);
    }

    #[test]
    fn test_stretch_factors_and_spacing() {
        let slots = [AxisSlot::stretch(1, 0.0), AxisSlot::stretch(3, 0.0)];
        assert_eq!(distribute(&slots, 110.0, &[10.0]), vec![25.0, 75.0]);
    }

    #[test]
    fn test_no_expandable_leaves_space_unused() {
        let slots = [AxisSlot::fixed(20.0, 0.0), AxisSlot::fixed(20.0, 0.0)];
        assert_eq!(distribute(&slots, 200.0, &[0.0]), vec![20.0, 20.0]);
    }

    #[test]
    fn test_minimum_clamp_and_last_absorbs() {
        // Container too small for the fixed items: the last shrinks first.
        let slots = [AxisSlot::fixed(30.0, 0.0), AxisSlot::fixed(30.0, 5.0)];
        assert_eq!(distribute(&slots, 40.0, &[0.0]), vec![30.0, 10.0]);

        // Minimums exceed the container: every item keeps its minimum.
        let slots = [AxisSlot::stretch(1, 50.0), AxisSlot::stretch(1, 50.0)];
        assert_eq!(distribute(&slots, 60.0, &[0.0]), vec![50.0, 50.0]);
    }

    #[test]
    fn test_offsets() {
        assert_eq!(
            offsets(&[10.0, 20.0, 5.0], 2.0, &[3.0, 3.0]),
            vec![2.0, 15.0, 38.0]
        );
        assert_eq!(offsets(&[10.0, 20.0, 5.0], 0.0, &[0.0, 8.0]), vec![0.0, 10.0, 38.0]);
    }

    #[test]
    fn test_gap_overrides() {
        assert_eq!(gaps(&[None, Some(2.0), None], 6.0), vec![6.0, 2.0]);
        assert!(gaps(&[Some(4.0)], 6.0).is_empty());
        assert!(gaps(&[], 6.0).is_empty());
    }
}
