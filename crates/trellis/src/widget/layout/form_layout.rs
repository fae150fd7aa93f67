//! Form layout for label/field pairs.
//!
//! Each row holds an optional label in the left column and a field in the
//! right column, or one widget spanning both. The label column is as wide as
//! the widest label. Row heights default to [`DEFAULT_ROW_HEIGHT`], or to
//! [`MULTI_LINE_ROW_HEIGHT`] when the field reports
//! [`is_multi_line`](crate::widget::Widget::is_multi_line), and can be
//! overridden per row. A row is never shorter than the minimum height of the
//! widgets it holds.
//!
//! The gap below each row defaults to the layout spacing and can be set per
//! row with [`FormLayout::set_row_spacing`]. When the rows do not fit, the
//! last row gives up height down to its minimum.
//!
//! Hiding a field removes its whole row: the layout hides the label with it
//! and shows the label again once the field returns.

use trellis_core::ObjectId;
use trellis_render::Rect;

use super::base::{LayoutBase, absorb_overflow};
use super::item::Placement;
use super::managed_sizes;
use super::traits::{Layout, apply_placements};
use crate::config::LayoutDefaults;
use crate::error::LayoutError;
use crate::widget::tree::WidgetAccess;

/// Row height for single-line fields.
pub const DEFAULT_ROW_HEIGHT: f32 = 24.0;

/// Row height for fields that show several lines.
pub const MULTI_LINE_ROW_HEIGHT: f32 = 72.0;

/// The content of one form row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormRow {
    /// A field with an optional label to its left.
    LabelField {
        label: Option<ObjectId>,
        field: ObjectId,
    },
    /// A widget covering both columns.
    Spanning(ObjectId),
}

impl FormRow {
    fn widgets(&self) -> impl Iterator<Item = ObjectId> {
        let (first, second) = match *self {
            Self::LabelField { label, field } => (label, Some(field)),
            Self::Spanning(widget) => (Some(widget), None),
        };
        first.into_iter().chain(second)
    }

    /// The widget whose visibility decides whether the row takes space.
    fn main_widget(&self) -> ObjectId {
        match *self {
            Self::LabelField { field, .. } => field,
            Self::Spanning(widget) => widget,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct RowEntry {
    row: FormRow,
    height: Option<f32>,
    spacing: Option<f32>,
}

impl RowEntry {
    fn new(row: FormRow) -> Self {
        Self {
            row,
            height: None,
            spacing: None,
        }
    }
}

/// A two-column layout of labelled fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormLayout {
    base: LayoutBase,
    rows: Vec<RowEntry>,
    /// Labels hidden because their field is hidden.
    hidden_labels: Vec<ObjectId>,
}

impl FormLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(mut self, defaults: &LayoutDefaults) -> Self {
        self.base = LayoutBase::from_defaults(defaults);
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> Option<FormRow> {
        self.rows.get(index).map(|entry| entry.row)
    }

    fn check_new_row(&self, row: &FormRow) -> Result<(), LayoutError> {
        match row.widgets().find(|id| self.contains_widget(*id)) {
            Some(duplicate) => Err(LayoutError::DuplicateItem(duplicate)),
            None => Ok(()),
        }
    }

    fn check_index(&self, index: usize) -> Result<(), LayoutError> {
        if index >= self.rows.len() {
            return Err(LayoutError::IndexOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        Ok(())
    }

    /// Append a labelled row and return its index.
    pub fn add_row(&mut self, label: ObjectId, field: ObjectId) -> Result<usize, LayoutError> {
        self.push_row(FormRow::LabelField {
            label: Some(label),
            field,
        })
    }

    /// Append a row with an empty label cell.
    pub fn add_field_row(&mut self, field: ObjectId) -> Result<usize, LayoutError> {
        self.push_row(FormRow::LabelField { label: None, field })
    }

    /// Append a row whose widget spans both columns.
    pub fn add_spanning_row(&mut self, widget: ObjectId) -> Result<usize, LayoutError> {
        self.push_row(FormRow::Spanning(widget))
    }

    fn push_row(&mut self, row: FormRow) -> Result<usize, LayoutError> {
        self.check_new_row(&row)?;
        self.rows.push(RowEntry::new(row));
        Ok(self.rows.len() - 1)
    }

    /// Insert a row before `index`. `index == row_count()` appends.
    pub fn insert_row(&mut self, index: usize, row: FormRow) -> Result<(), LayoutError> {
        if index > self.rows.len() {
            return Err(LayoutError::IndexOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        self.check_new_row(&row)?;
        self.rows.insert(index, RowEntry::new(row));
        Ok(())
    }

    pub fn remove_row(&mut self, index: usize) -> Result<FormRow, LayoutError> {
        self.check_index(index)?;
        let row = self.rows.remove(index).row;
        self.hidden_labels.retain(|id| !row.widgets().any(|w| w == *id));
        Ok(row)
    }

    /// Override the height of one row. `None` restores the default.
    pub fn set_row_height(&mut self, index: usize, height: Option<f32>) -> Result<(), LayoutError> {
        self.check_index(index)?;
        if let Some(h) = height
            && h < 0.0
        {
            return Err(LayoutError::NegativeSize(h));
        }
        self.rows[index].height = height;
        Ok(())
    }

    /// Set the gap below one row. `None` restores the layout spacing.
    pub fn set_row_spacing(&mut self, index: usize, spacing: Option<f32>) -> Result<(), LayoutError> {
        self.check_index(index)?;
        if let Some(s) = spacing
            && s < 0.0
        {
            return Err(LayoutError::NegativeSize(s));
        }
        self.rows[index].spacing = spacing;
        Ok(())
    }

    pub fn row_spacing(&self, index: usize) -> Option<f32> {
        self.rows
            .get(index)
            .map(|entry| entry.spacing.unwrap_or(self.base.spacing()))
    }

    /// Width of the label column for the current labels.
    pub fn label_column_width<S: WidgetAccess + ?Sized>(&self, storage: &S) -> f32 {
        self.rows
            .iter()
            .filter_map(|entry| match entry.row {
                FormRow::LabelField {
                    label: Some(label),
                    field,
                } if storage.is_widget_visible(field) => managed_sizes(storage, label),
                _ => None,
            })
            .map(|(natural, _)| natural.width)
            .fold(0.0, f32::max)
    }

    /// Keep each label's visibility in step with its field's.
    fn sync_labels<S: WidgetAccess + ?Sized>(&mut self, storage: &mut S) {
        for entry in &self.rows {
            let FormRow::LabelField {
                label: Some(label),
                field,
            } = entry.row
            else {
                continue;
            };
            let field_visible = storage.is_widget_visible(field);
            let suppressed = self.hidden_labels.contains(&label);
            if !field_visible && !suppressed && storage.is_widget_visible(label) {
                storage.set_widget_visible(label, false);
                self.hidden_labels.push(label);
            } else if field_visible && suppressed {
                storage.set_widget_visible(label, true);
                self.hidden_labels.retain(|&id| id != label);
            }
        }
    }

    /// Preferred height of a row and the minimum it may shrink to.
    fn row_height<S: WidgetAccess + ?Sized>(&self, storage: &S, entry: &RowEntry) -> (f32, f32) {
        let default = match entry.row {
            FormRow::LabelField { field, .. } | FormRow::Spanning(field)
                if storage
                    .get_widget(field)
                    .is_some_and(|w| w.is_multi_line()) =>
            {
                MULTI_LINE_ROW_HEIGHT
            }
            _ => DEFAULT_ROW_HEIGHT,
        };
        let minimum = entry
            .row
            .widgets()
            .filter_map(|id| managed_sizes(storage, id))
            .map(|(_, min)| min.height)
            .fold(0.0, f32::max);
        (entry.height.unwrap_or(default).max(minimum), minimum)
    }
}

impl Layout for FormLayout {
    fn base(&self) -> &LayoutBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut LayoutBase {
        &mut self.base
    }

    fn widgets(&self) -> Vec<ObjectId> {
        self.rows.iter().flat_map(|entry| entry.row.widgets()).collect()
    }

    fn remove_widget(&mut self, widget: ObjectId) -> bool {
        let Some(index) = self
            .rows
            .iter()
            .position(|entry| entry.row.widgets().any(|id| id == widget))
        else {
            return false;
        };
        match &mut self.rows[index].row {
            FormRow::LabelField { label, .. } if *label == Some(widget) => *label = None,
            _ => {
                let row = self.rows.remove(index).row;
                self.hidden_labels.retain(|id| !row.widgets().any(|w| w == *id));
                return true;
            }
        }
        self.hidden_labels.retain(|&id| id != widget);
        true
    }

    fn calculate<S: WidgetAccess + ?Sized>(&self, storage: &S, rect: Rect) -> Vec<Placement> {
        let content = self.base.content_rect(rect);
        let label_width = self.label_column_width(storage);
        let gap = if label_width > 0.0 {
            self.base.spacing()
        } else {
            0.0
        };
        let field_x = content.origin.x + label_width + gap;
        let field_width = (content.width() - label_width - gap).max(0.0);

        // Rows whose main widget is hidden take no space.
        let rows: Vec<(&RowEntry, f32)> = self
            .rows
            .iter()
            .filter_map(|entry| {
                managed_sizes(storage, entry.row.main_widget()).map(|(_, min)| (entry, min.width))
            })
            .collect();
        let (mut heights, minimums): (Vec<f32>, Vec<f32>) = rows
            .iter()
            .map(|(entry, _)| self.row_height(storage, entry))
            .unzip();
        let gaps: Vec<f32> = rows
            .iter()
            .take(rows.len().saturating_sub(1))
            .map(|(entry, _)| entry.spacing.unwrap_or(self.base.spacing()))
            .collect();
        absorb_overflow(&mut heights, &minimums, content.height() - gaps.iter().sum::<f32>());

        let mut placements = Vec::new();
        let mut y = content.origin.y;
        for (index, ((entry, main_min_width), height)) in rows.iter().zip(&heights).enumerate() {
            let height = *height;
            match entry.row {
                FormRow::LabelField { label, field } => {
                    if let Some(label) = label
                        && let Some((_, label_min)) = managed_sizes(storage, label)
                    {
                        placements.push((
                            label,
                            Rect::new(
                                content.origin.x,
                                y,
                                label_width.max(label_min.width),
                                height,
                            ),
                        ));
                    }
                    placements.push((
                        field,
                        Rect::new(field_x, y, field_width.max(*main_min_width), height),
                    ));
                }
                FormRow::Spanning(widget) => {
                    placements.push((
                        widget,
                        Rect::new(
                            content.origin.x,
                            y,
                            content.width().max(*main_min_width),
                            height,
                        ),
                    ));
                }
            }
            y += height + gaps.get(index).copied().unwrap_or(0.0);
        }
        placements
    }

    /// Hide labels of hidden fields, then apply geometry.
    fn arrange<S: WidgetAccess + ?Sized>(&mut self, storage: &mut S, rect: Rect) -> Vec<Placement> {
        self.sync_labels(storage);
        let placements = self.calculate(storage, rect);
        apply_placements(storage, &placements);
        placements
    }
}
