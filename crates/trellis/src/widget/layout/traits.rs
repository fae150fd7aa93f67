//! Core Layout trait definition.

use trellis_core::ObjectId;
use trellis_render::Rect;

use super::ContentMargins;
use super::base::LayoutBase;
use super::item::Placement;
use crate::widget::tree::WidgetAccess;

/// The core trait for all layout managers.
///
/// A layout is a function from a container rectangle and its managed items
/// to one rectangle per visible widget. [`calculate`](Self::calculate) is
/// pure and returns the same output for the same input, so calling it twice
/// with an unchanged rect and item set yields identical rectangles.
/// [`arrange`](Self::arrange) writes the result into the widgets.
///
/// Rectangles are relative to the host widget, which is also the parent of
/// every managed widget.
pub trait Layout {
    fn base(&self) -> &LayoutBase;

    fn base_mut(&mut self) -> &mut LayoutBase;

    fn spacing(&self) -> f32 {
        self.base().spacing()
    }

    fn set_spacing(&mut self, spacing: f32) {
        self.base_mut().set_spacing(spacing);
    }

    fn content_margins(&self) -> ContentMargins {
        self.base().content_margins()
    }

    fn set_content_margins(&mut self, margins: ContentMargins) {
        self.base_mut().set_content_margins(margins);
    }

    /// Compute a rectangle for each visible managed widget.
    fn calculate<S: WidgetAccess + ?Sized>(&self, storage: &S, rect: Rect) -> Vec<Placement>;

    /// The managed widgets, in layout order.
    fn widgets(&self) -> Vec<ObjectId>;

    /// Stop managing `widget`. Returns `false` if it was not managed.
    fn remove_widget(&mut self, widget: ObjectId) -> bool;

    fn contains_widget(&self, widget: ObjectId) -> bool {
        self.widgets().contains(&widget)
    }

    fn item_count(&self) -> usize {
        self.widgets().len()
    }

    fn is_empty(&self) -> bool {
        self.item_count() == 0
    }

    /// Compute and apply geometries, returning what was applied.
    fn arrange<S: WidgetAccess + ?Sized>(&mut self, storage: &mut S, rect: Rect) -> Vec<Placement> {
        let placements = self.calculate(storage, rect);
        apply_placements(storage, &placements);
        placements
    }
}

/// Write each placement into its widget.
pub(crate) fn apply_placements<S: WidgetAccess + ?Sized>(storage: &mut S, placements: &[Placement]) {
    for &(id, rect) in placements {
        if let Some(widget) = storage.get_widget_mut(id) {
            widget.widget_base_mut().set_geometry(rect);
        }
    }
}
