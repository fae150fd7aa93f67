//! Grid layout for arranging widgets in rows and columns.
//!
//! Widgets occupy cells keyed by (row, column) and may span several rows or
//! columns. Callers that omit coordinates use the auto-insert cursor, which
//! advances one column at a time and wraps at the configured column count,
//! skipping cells that are already taken.
//!
//! Each column and row starts at the larger of its explicit minimum and the
//! minimums of the single-span widgets in it; the remaining space is shared
//! by stretch factor (equal by default). When the minimums do not fit, the
//! last track gives way down to its own minimum. A spanning item covers its
//! cells plus the spacing between them.
//!
//! ```
//! use trellis::widget::layout::GridLayout;
//! # use trellis_core::ObjectId;
//!
//! let mut grid = GridLayout::new();
//! grid.set_column_count(2);
//! let cells: Vec<_> = (1..=3)
//!     .map(|n| grid.add_widget(ObjectId::from_raw(n)).unwrap())
//!     .collect();
//! assert_eq!(cells, vec![(0, 0), (0, 1), (1, 0)]);
//! ```

use trellis_core::ObjectId;
use trellis_render::{Rect, Size};

use super::base::{LayoutBase, absorb_overflow, gaps, offsets};
use super::item::{Alignment, LayoutConstraint, Placement};
use super::managed_sizes;
use super::traits::Layout;
use crate::config::LayoutDefaults;
use crate::error::LayoutError;
use crate::widget::tree::WidgetAccess;

/// One occupied region of the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    pub widget: ObjectId,
    pub row: usize,
    pub column: usize,
    pub row_span: usize,
    pub column_span: usize,
    pub constraint: LayoutConstraint,
}

impl GridCell {
    fn covers(&self, row: usize, column: usize) -> bool {
        (self.row..self.row + self.row_span).contains(&row)
            && (self.column..self.column + self.column_span).contains(&column)
    }
}

/// Per-row or per-column sizing settings.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Track {
    minimum: f32,
    stretch: u32,
}

impl Default for Track {
    fn default() -> Self {
        Self {
            minimum: 0.0,
            stretch: 1,
        }
    }
}

/// A layout that arranges widgets in a grid.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GridLayout {
    base: LayoutBase,
    cells: Vec<GridCell>,
    /// Wrap column for auto insertion. Zero means unbounded.
    columns: usize,
    cursor: (usize, usize),
    rows_settings: Vec<Track>,
    column_settings: Vec<Track>,
    horizontal_spacing: Option<f32>,
    vertical_spacing: Option<f32>,
}

impl GridLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(mut self, defaults: &LayoutDefaults) -> Self {
        self.base = LayoutBase::from_defaults(defaults);
        self
    }

    // =========================================================================
    // Insertion
    // =========================================================================

    /// Set the column at which the auto-insert cursor wraps. Zero removes
    /// the limit.
    pub fn set_column_count(&mut self, columns: usize) {
        self.columns = columns;
    }

    /// Place `widget` in the next free cell and return its position.
    pub fn add_widget(&mut self, widget: ObjectId) -> Result<(usize, usize), LayoutError> {
        if self.contains_widget(widget) {
            return Err(LayoutError::DuplicateItem(widget));
        }
        let (row, column) = self.next_free_cell();
        self.cells.push(GridCell {
            widget,
            row,
            column,
            row_span: 1,
            column_span: 1,
            constraint: LayoutConstraint::default(),
        });
        self.cursor = (row, column + 1);
        Ok((row, column))
    }

    pub fn add_widget_at(
        &mut self,
        widget: ObjectId,
        row: usize,
        column: usize,
    ) -> Result<(), LayoutError> {
        self.add_widget_spanning(widget, row, column, 1, 1)
    }

    pub fn add_widget_spanning(
        &mut self,
        widget: ObjectId,
        row: usize,
        column: usize,
        row_span: usize,
        column_span: usize,
    ) -> Result<(), LayoutError> {
        self.add_widget_with(
            widget,
            row,
            column,
            row_span,
            column_span,
            LayoutConstraint::default(),
        )
    }

    /// Place `widget` at an explicit cell. The auto-insert cursor skips it
    /// later.
    pub fn add_widget_with(
        &mut self,
        widget: ObjectId,
        row: usize,
        column: usize,
        row_span: usize,
        column_span: usize,
        constraint: LayoutConstraint,
    ) -> Result<(), LayoutError> {
        if row_span == 0 || column_span == 0 {
            return Err(LayoutError::InvalidSpan {
                row_span,
                column_span,
            });
        }
        if self.columns > 0 && column + column_span > self.columns {
            return Err(LayoutError::GridIndexOutOfRange {
                row,
                column: column + column_span - 1,
                columns: self.columns,
            });
        }
        if self.contains_widget(widget) {
            return Err(LayoutError::DuplicateItem(widget));
        }
        self.cells.push(GridCell {
            widget,
            row,
            column,
            row_span,
            column_span,
            constraint,
        });
        Ok(())
    }

    fn is_occupied(&self, row: usize, column: usize) -> bool {
        self.cells.iter().any(|cell| cell.covers(row, column))
    }

    fn next_free_cell(&self) -> (usize, usize) {
        let (mut row, mut column) = self.cursor;
        loop {
            if self.columns > 0 && column >= self.columns {
                row += 1;
                column = 0;
                continue;
            }
            if !self.is_occupied(row, column) {
                return (row, column);
            }
            column += 1;
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// The (row, column) of a managed widget.
    pub fn position_of(&self, widget: ObjectId) -> Option<(usize, usize)> {
        self.cells
            .iter()
            .find(|cell| cell.widget == widget)
            .map(|cell| (cell.row, cell.column))
    }

    pub fn widget_at(&self, row: usize, column: usize) -> Option<ObjectId> {
        self.cells
            .iter()
            .find(|cell| cell.covers(row, column))
            .map(|cell| cell.widget)
    }

    pub fn row_count(&self) -> usize {
        self.cells
            .iter()
            .map(|cell| cell.row + cell.row_span)
            .max()
            .unwrap_or(0)
    }

    /// The configured column count, or the occupied width when unbounded.
    pub fn column_count(&self) -> usize {
        let used = self
            .cells
            .iter()
            .map(|cell| cell.column + cell.column_span)
            .max()
            .unwrap_or(0);
        used.max(self.columns)
    }

    // =========================================================================
    // Row and column settings
    // =========================================================================

    fn check_column(&self, column: usize) -> Result<(), LayoutError> {
        if self.columns > 0 && column >= self.columns {
            return Err(LayoutError::GridColumnOutOfRange {
                column,
                columns: self.columns,
            });
        }
        Ok(())
    }

    fn track(tracks: &mut Vec<Track>, index: usize) -> &mut Track {
        if tracks.len() <= index {
            tracks.resize(index + 1, Track::default());
        }
        &mut tracks[index]
    }

    pub fn set_row_stretch(&mut self, row: usize, stretch: u32) {
        Self::track(&mut self.rows_settings, row).stretch = stretch;
    }

    pub fn set_column_stretch(&mut self, column: usize, stretch: u32) -> Result<(), LayoutError> {
        self.check_column(column)?;
        Self::track(&mut self.column_settings, column).stretch = stretch;
        Ok(())
    }

    pub fn set_row_minimum_height(&mut self, row: usize, height: f32) -> Result<(), LayoutError> {
        if height < 0.0 {
            return Err(LayoutError::NegativeSize(height));
        }
        Self::track(&mut self.rows_settings, row).minimum = height;
        Ok(())
    }

    pub fn set_column_minimum_width(
        &mut self,
        column: usize,
        width: f32,
    ) -> Result<(), LayoutError> {
        if width < 0.0 {
            return Err(LayoutError::NegativeSize(width));
        }
        self.check_column(column)?;
        Self::track(&mut self.column_settings, column).minimum = width;
        Ok(())
    }

    pub fn horizontal_spacing(&self) -> f32 {
        self.horizontal_spacing.unwrap_or(self.base.spacing())
    }

    pub fn set_horizontal_spacing(&mut self, spacing: f32) {
        self.horizontal_spacing = Some(spacing.max(0.0));
    }

    pub fn vertical_spacing(&self) -> f32 {
        self.vertical_spacing.unwrap_or(self.base.spacing())
    }

    pub fn set_vertical_spacing(&mut self, spacing: f32) {
        self.vertical_spacing = Some(spacing.max(0.0));
    }
}

/// Track sizes: each starts at the larger of its configured minimum and
/// `floors[i]`, then gets a stretch-weighted share of what the minimums and
/// gaps leave over.
fn track_sizes(settings: &[Track], floors: &[f32], length: f32, gaps: &[f32]) -> Vec<f32> {
    let tracks: Vec<Track> = floors
        .iter()
        .enumerate()
        .map(|(i, &floor)| {
            let track = settings.get(i).copied().unwrap_or_default();
            Track {
                minimum: track.minimum.max(floor),
                ..track
            }
        })
        .collect();
    let gaps: f32 = gaps.iter().sum();
    let minimums: Vec<f32> = tracks.iter().map(|t| t.minimum).collect();
    let remaining = (length - minimums.iter().sum::<f32>() - gaps).max(0.0);
    let total_stretch: u32 = tracks.iter().map(|t| t.stretch).sum();

    let mut sizes: Vec<f32> = tracks
        .iter()
        .map(|t| {
            if total_stretch == 0 {
                t.minimum
            } else {
                t.minimum + remaining * t.stretch as f32 / total_stretch as f32
            }
        })
        .collect();
    absorb_overflow(&mut sizes, &minimums, length - gaps);
    sizes
}

/// Gap after each track: the largest override among items ending there, or
/// `spacing`.
fn track_gaps(count: usize, spacing: f32, ends: impl Iterator<Item = (usize, f32)>) -> Vec<f32> {
    let mut overrides: Vec<Option<f32>> = vec![None; count];
    for (end, gap) in ends {
        if let Some(slot) = overrides.get_mut(end) {
            *slot = Some(slot.map_or(gap, |current| current.max(gap)));
        }
    }
    gaps(&overrides, spacing)
}

/// Place a `natural`-long item in a slot on one axis, never below `minimum`.
fn place_in_cell(
    alignment: Alignment,
    start: f32,
    slot: f32,
    natural: f32,
    minimum: f32,
) -> (f32, f32) {
    match alignment {
        Alignment::Fill => (start, slot.max(minimum)),
        align => align.place(start, slot, natural.max(minimum)),
    }
}

impl Layout for GridLayout {
    fn base(&self) -> &LayoutBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut LayoutBase {
        &mut self.base
    }

    fn widgets(&self) -> Vec<ObjectId> {
        self.cells.iter().map(|cell| cell.widget).collect()
    }

    fn remove_widget(&mut self, widget: ObjectId) -> bool {
        let before = self.cells.len();
        self.cells.retain(|cell| cell.widget != widget);
        self.cells.len() != before
    }

    fn calculate<S: WidgetAccess + ?Sized>(&self, storage: &S, rect: Rect) -> Vec<Placement> {
        let content = self.base.content_rect(rect);
        let columns = self.column_count();
        let rows = self.row_count();

        // Hidden and missing widgets neither take room nor raise minimums.
        let visible: Vec<(&GridCell, Size, Size)> = self
            .cells
            .iter()
            .filter_map(|cell| {
                managed_sizes(storage, cell.widget).map(|(natural, minimum)| (cell, natural, minimum))
            })
            .collect();

        let mut min_widths = vec![0.0_f32; columns];
        let mut min_heights = vec![0.0_f32; rows];
        for (cell, _, minimum) in &visible {
            let m = cell.constraint.margins;
            if cell.column_span == 1 {
                let floor = &mut min_widths[cell.column];
                *floor = floor.max(minimum.width + m.horizontal());
            }
            if cell.row_span == 1 {
                let floor = &mut min_heights[cell.row];
                *floor = floor.max(minimum.height + m.vertical());
            }
        }

        let column_gaps = track_gaps(
            columns,
            self.horizontal_spacing(),
            visible.iter().filter_map(|(cell, _, _)| {
                cell.constraint
                    .spacing
                    .map(|gap| (cell.column + cell.column_span - 1, gap))
            }),
        );
        let row_gaps = track_gaps(
            rows,
            self.vertical_spacing(),
            visible.iter().filter_map(|(cell, _, _)| {
                cell.constraint
                    .spacing
                    .map(|gap| (cell.row + cell.row_span - 1, gap))
            }),
        );

        let widths = track_sizes(&self.column_settings, &min_widths, content.width(), &column_gaps);
        let heights = track_sizes(&self.rows_settings, &min_heights, content.height(), &row_gaps);
        let xs = offsets(&widths, content.origin.x, &column_gaps);
        let ys = offsets(&heights, content.origin.y, &row_gaps);

        let span_length = |sizes: &[f32], gaps: &[f32], start: usize, span: usize| {
            let end = start + span;
            sizes[start..end].iter().sum::<f32>() + gaps[start..end - 1].iter().sum::<f32>()
        };

        let mut placements = Vec::with_capacity(visible.len());
        for (cell, natural, minimum) in visible {
            let m = cell.constraint.margins;
            let cell_w = span_length(&widths, &column_gaps, cell.column, cell.column_span);
            let cell_h = span_length(&heights, &row_gaps, cell.row, cell.row_span);

            let (x, w) = place_in_cell(
                cell.constraint.alignment,
                xs[cell.column] + m.left,
                (cell_w - m.horizontal()).max(0.0),
                natural.width,
                minimum.width,
            );
            let (y, h) = place_in_cell(
                cell.constraint.alignment,
                ys[cell.row] + m.top,
                (cell_h - m.vertical()).max(0.0),
                natural.height,
                minimum.height,
            );
            placements.push((cell.widget, Rect::new(x, y, w, h)));
        }
        placements
    }
}
