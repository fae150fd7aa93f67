//! Drag-and-drop payloads and events.
//!
//! Drops are opt-in: only widgets with
//! [`WidgetBase::set_accepts_drops`](super::WidgetBase::set_accepts_drops)
//! receive drag events. A target first sees a [`DragEnterEvent`] and must
//! accept it to become the drop target; the [`DropEvent`] then goes to that
//! target alone.
//!
//! Payloads come from two places: internal drags started with
//! [`EventContext::start_drag`](super::EventContext::start_drag), and files
//! dropped onto the window by the backend.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use trellis_core::ObjectId;
use trellis_render::Point;

use super::events::EventBase;

/// Standard MIME types used in drag payloads.
pub mod mime {
    pub const TEXT_PLAIN: &str = "text/plain";
    pub const URI_LIST: &str = "text/uri-list";
}

/// The data carried by a drag.
///
/// Holds any number of representations keyed by MIME type, plus a list of
/// file paths for file drops.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DragData {
    data: HashMap<String, Vec<u8>>,
    urls: Vec<PathBuf>,
    source: Option<ObjectId>,
}

impl DragData {
    pub fn new() -> Self {
        Self::default()
    }

    /// A payload listing dropped files.
    pub fn from_paths(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut data = Self::new();
        data.set_urls(paths);
        data
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        let mut data = Self::new();
        data.set_text(text);
        data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.urls.is_empty()
    }

    pub fn formats(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn has_format(&self, mime_type: &str) -> bool {
        self.data.contains_key(mime_type)
    }

    pub fn get_data(&self, mime_type: &str) -> Option<&[u8]> {
        self.data.get(mime_type).map(Vec::as_slice)
    }

    pub fn set_data(&mut self, mime_type: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.data.insert(mime_type.into(), data.into());
    }

    pub fn text(&self) -> Option<String> {
        self.get_data(mime::TEXT_PLAIN)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.set_data(mime::TEXT_PLAIN, text.into().into_bytes());
    }

    pub fn has_urls(&self) -> bool {
        !self.urls.is_empty()
    }

    pub fn urls(&self) -> &[PathBuf] {
        &self.urls
    }

    pub fn set_urls(&mut self, urls: impl IntoIterator<Item = PathBuf>) {
        self.urls = urls.into_iter().collect();
        let list = self
            .urls
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("\n");
        self.data.insert(mime::URI_LIST.to_string(), list.into_bytes());
    }

    /// The widget that started an internal drag. `None` for external drops.
    pub fn source(&self) -> Option<ObjectId> {
        self.source
    }

    pub fn with_source(mut self, source: ObjectId) -> Self {
        self.source = Some(source);
        self
    }
}

/// A drag moved over a widget that accepts drops.
///
/// Accept it to become the drop target.
#[derive(Debug, Clone)]
pub struct DragEnterEvent {
    pub base: EventBase,
    pub local_pos: Point,
    pub window_pos: Point,
    pub data: Arc<DragData>,
}

impl DragEnterEvent {
    pub fn new(window_pos: Point, data: Arc<DragData>) -> Self {
        Self {
            base: EventBase::new(),
            local_pos: window_pos,
            window_pos,
            data,
        }
    }

    pub fn accept(&mut self) {
        self.base.accept();
    }
}

/// The drag left the current drop target without dropping.
#[derive(Debug, Clone, Default)]
pub struct DragLeaveEvent {
    pub base: EventBase,
}

/// The payload was released over the drop target.
#[derive(Debug, Clone)]
pub struct DropEvent {
    pub base: EventBase,
    pub local_pos: Point,
    pub window_pos: Point,
    pub data: Arc<DragData>,
}

impl DropEvent {
    pub fn new(window_pos: Point, data: Arc<DragData>) -> Self {
        Self {
            base: EventBase::new(),
            local_pos: window_pos,
            window_pos,
            data,
        }
    }

    /// Mark the drop as consumed.
    pub fn accept(&mut self) {
        self.base.accept();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paths_sets_uri_list() {
        let data = DragData::from_paths([PathBuf::from("/tmp/a.txt"), PathBuf::from("/tmp/b.txt")]);
        assert!(data.has_urls());
        assert!(data.has_format(mime::URI_LIST));
        assert_eq!(
            data.get_data(mime::URI_LIST),
            Some("/tmp/a.txt\n/tmp/b.txt".as_bytes())
        );
    }

    #[test]
    fn test_text_payload() {
        let data = DragData::from_text("hello");
        assert_eq!(data.text().as_deref(), Some("hello"));
        assert!(!data.has_urls());
        assert!(data.source().is_none());
    }
}
