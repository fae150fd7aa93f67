//! Stack layout for displaying one widget at a time.
//!
//! `StackLayout` manages several pages of which only the current one is
//! shown. Arranging gives the current page the full content rect. Page
//! visibility is only touched when the page set or the current index
//! changed: the next arrange hides the old page and shows the new one, and
//! an explicit `hide()` of the current page otherwise sticks.
//!
//! # Example
//!
//! ```
//! use trellis::widget::layout::StackLayout;
//! # use trellis_core::ObjectId;
//!
//! let mut stack = StackLayout::new();
//! stack.add_widget(ObjectId::from_raw(1)).unwrap();
//! stack.add_widget(ObjectId::from_raw(2)).unwrap();
//! assert_eq!(stack.current_index(), Some(0));
//!
//! stack.set_current_index(1).unwrap();
//! assert_eq!(stack.current_index(), Some(1));
//! ```

use trellis_core::{ObjectId, Signal};
use trellis_render::{Rect, Size};

use super::base::LayoutBase;
use super::item::Placement;
use super::traits::{Layout, apply_placements};
use crate::config::LayoutDefaults;
use crate::error::LayoutError;
use crate::widget::tree::WidgetAccess;

/// A layout that displays one widget at a time.
#[derive(Debug)]
pub struct StackLayout {
    base: LayoutBase,
    widgets: Vec<ObjectId>,
    current: Option<usize>,
    /// Page made visible by the last visibility sync.
    shown: Option<ObjectId>,
    /// Visibility must be synced on the next arrange.
    dirty: bool,

    /// Emitted with the new index whenever the current page changes.
    pub current_changed: Signal<usize>,
}

impl Default for StackLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl StackLayout {
    pub fn new() -> Self {
        Self {
            base: LayoutBase::new(),
            widgets: Vec::new(),
            current: None,
            shown: None,
            dirty: false,
            current_changed: Signal::new(),
        }
    }

    pub fn with_defaults(mut self, defaults: &LayoutDefaults) -> Self {
        self.base = LayoutBase::from_defaults(defaults);
        self
    }

    /// Append a page and return its index. The first page becomes current.
    pub fn add_widget(&mut self, widget: ObjectId) -> Result<usize, LayoutError> {
        if self.widgets.contains(&widget) {
            return Err(LayoutError::DuplicateItem(widget));
        }
        self.widgets.push(widget);
        if self.current.is_none() {
            self.current = Some(0);
        }
        self.dirty = true;
        Ok(self.widgets.len() - 1)
    }

    /// Insert a page before `index`. The current page stays current.
    pub fn insert_widget(&mut self, index: usize, widget: ObjectId) -> Result<(), LayoutError> {
        if index > self.widgets.len() {
            return Err(LayoutError::IndexOutOfRange {
                index,
                len: self.widgets.len(),
            });
        }
        if self.widgets.contains(&widget) {
            return Err(LayoutError::DuplicateItem(widget));
        }
        self.widgets.insert(index, widget);
        self.current = match self.current {
            None => Some(0),
            Some(current) if index <= current => Some(current + 1),
            other => other,
        };
        self.dirty = true;
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.widgets.len()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_widget(&self) -> Option<ObjectId> {
        self.current.and_then(|i| self.widgets.get(i).copied())
    }

    pub fn index_of(&self, widget: ObjectId) -> Option<usize> {
        self.widgets.iter().position(|&w| w == widget)
    }

    pub fn widget_at(&self, index: usize) -> Option<ObjectId> {
        self.widgets.get(index).copied()
    }

    /// Make page `index` current. Emits `current_changed` if it changed.
    pub fn set_current_index(&mut self, index: usize) -> Result<(), LayoutError> {
        if index >= self.widgets.len() {
            return Err(LayoutError::IndexOutOfRange {
                index,
                len: self.widgets.len(),
            });
        }
        if self.current != Some(index) {
            self.current = Some(index);
            self.dirty = true;
            tracing::debug!(target: "trellis::layout", index, "stack page changed");
            self.current_changed.emit(index);
        }
        Ok(())
    }

    pub fn set_current_widget(&mut self, widget: ObjectId) -> Result<(), LayoutError> {
        let index = self
            .index_of(widget)
            .ok_or(LayoutError::IndexOutOfRange {
                index: self.widgets.len(),
                len: self.widgets.len(),
            })?;
        self.set_current_index(index)
    }

    /// Advance to the next page, wrapping to the first.
    pub fn next(&mut self) {
        if let Some(current) = self.current {
            let next = (current + 1) % self.widgets.len();
            self.step_to(next);
        }
    }

    /// Go back to the previous page, wrapping to the last.
    pub fn previous(&mut self) {
        if let Some(current) = self.current {
            let len = self.widgets.len();
            self.step_to((current + len - 1) % len);
        }
    }

    fn step_to(&mut self, index: usize) {
        if let Err(err) = self.set_current_index(index) {
            tracing::warn!(target: "trellis::layout", index, %err, "stack page not changed");
        }
    }
}

impl Layout for StackLayout {
    fn base(&self) -> &LayoutBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut LayoutBase {
        &mut self.base
    }

    fn widgets(&self) -> Vec<ObjectId> {
        self.widgets.clone()
    }

    fn remove_widget(&mut self, widget: ObjectId) -> bool {
        let Some(index) = self.index_of(widget) else {
            return false;
        };
        self.widgets.remove(index);
        self.dirty = true;

        let previous = self.current;
        self.current = match previous {
            _ if self.widgets.is_empty() => None,
            Some(current) if index < current => Some(current - 1),
            Some(current) => Some(current.min(self.widgets.len() - 1)),
            None => None,
        };
        if previous == Some(index)
            && let Some(current) = self.current
        {
            self.current_changed.emit(current);
        }
        true
    }

    fn calculate<S: WidgetAccess + ?Sized>(&self, storage: &S, rect: Rect) -> Vec<Placement> {
        let content = self.base.content_rect(rect);
        let Some(id) = self.current_widget() else {
            return Vec::new();
        };
        let minimum = storage
            .get_widget(id)
            .map(|w| w.minimum_size())
            .unwrap_or(Size::ZERO);
        vec![(
            id,
            Rect::from_origin_size(content.origin, content.size.max(minimum)),
        )]
    }

    /// Place the current page at the full content rect, hiding the other
    /// pages if the page set or the current index changed.
    fn arrange<S: WidgetAccess + ?Sized>(&mut self, storage: &mut S, rect: Rect) -> Vec<Placement> {
        let current = self.current_widget();
        if self.dirty {
            for &id in self.widgets.iter().filter(|&&id| Some(id) != current) {
                storage.set_widget_visible(id, false);
            }
            if current != self.shown
                && let Some(id) = current
            {
                storage.set_widget_visible(id, true);
            }
            self.shown = current;
            self.dirty = false;
        }
        let placements = self.calculate(storage, rect);
        apply_placements(storage, &placements);
        placements
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::widget::layout::testing::{MockStorage, MockWidget, create_test_ids};

    #[test]
    fn test_switching_hides_old_page() {
        let mut storage = MockStorage::new();
        let a = storage.add(MockWidget::sized(10.0, 10.0));
        let b = storage.add(MockWidget::sized(10.0, 10.0));

        let mut stack = StackLayout::new();
        stack.add_widget(a).unwrap();
        stack.add_widget(b).unwrap();

        let rect = Rect::new(0.0, 0.0, 200.0, 100.0);
        let placements = stack.arrange(&mut storage, rect);
        assert_eq!(placements, vec![(a, rect)]);
        assert!(storage.is_hidden(b));

        stack.set_current_index(1).unwrap();
        stack.arrange(&mut storage, rect);
        assert!(storage.is_hidden(a));
        assert!(!storage.is_hidden(b));
        assert_eq!(storage.geometry(b), rect);
    }

    #[test]
    fn test_explicit_hide_of_current_page_sticks() {
        let mut storage = MockStorage::new();
        let a = storage.add(MockWidget::sized(10.0, 10.0));
        let b = storage.add(MockWidget::sized(10.0, 10.0));

        let mut stack = StackLayout::new();
        stack.add_widget(a).unwrap();
        stack.add_widget(b).unwrap();
        let rect = Rect::new(0.0, 0.0, 200.0, 100.0);
        stack.arrange(&mut storage, rect);
        assert!(!storage.is_hidden(a));

        storage.set_widget_visible(a, false);
        stack.arrange(&mut storage, rect);
        assert!(storage.is_hidden(a));

        stack.set_current_index(1).unwrap();
        stack.arrange(&mut storage, rect);
        stack.set_current_index(0).unwrap();
        stack.arrange(&mut storage, rect);
        assert!(!storage.is_hidden(a));
        assert!(storage.is_hidden(b));
    }

    #[test]
    fn test_current_changed_and_wrapping() {
        let ids = create_test_ids(3);
        let mut stack = StackLayout::new();
        for id in &ids {
            stack.add_widget(*id).unwrap();
        }

        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        stack.current_changed.connect(move |index| s.lock().push(*index));

        stack.previous();
        stack.next();
        stack.set_current_index(0).unwrap();
        assert_eq!(*seen.lock(), vec![2, 0]);
        assert_eq!(
            stack.set_current_index(3),
            Err(LayoutError::IndexOutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn test_remove_keeps_current_valid() {
        let ids = create_test_ids(3);
        let mut stack = StackLayout::new();
        for id in &ids {
            stack.add_widget(*id).unwrap();
        }
        stack.set_current_index(2).unwrap();

        assert!(stack.remove_widget(ids[0]));
        assert_eq!(stack.current_widget(), Some(ids[2]));
        assert!(stack.remove_widget(ids[2]));
        assert_eq!(stack.current_widget(), Some(ids[1]));
        assert!(stack.remove_widget(ids[1]));
        assert_eq!(stack.current_index(), None);
    }

    #[test]
    fn test_page_keeps_minimum_size() {
        let mut storage = MockStorage::new();
        let a = storage.add(MockWidget::sized(10.0, 10.0).with_minimum(300.0, 20.0));

        let mut stack = StackLayout::new();
        stack.add_widget(a).unwrap();
        let placements = stack.calculate(&storage, Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(placements[0].1, Rect::new(0.0, 0.0, 300.0, 100.0));
    }
}
