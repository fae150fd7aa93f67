//! An in-memory backend that records drawing and replays scripted input.
//!
//! [`HeadlessBackend`] is what the test-suite and offscreen tools run on.
//! Input is queued through an [`EventInjector`] in batches; each call to
//! `poll_events` drains one batch, so a test can control exactly which
//! events land in which frame.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::backend::{Backend, CursorShape, Font, ImageId, RawEvent, SurfaceId};
use crate::error::{BackendError, BackendResult};
use crate::painter::{Painter, RenderStateStack, Stroke};
use crate::transform::Transform2D;
use crate::types::{Color, Point, Rect, Size};

/// One recorded drawing operation, in device coordinates.
///
/// Colors already carry the painter opacity in their alpha channel.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    FillRect { rect: Rect, color: Color },
    StrokeRect { rect: Rect, stroke: Stroke },
    Line { from: Point, to: Point, stroke: Stroke },
    FillEllipse { rect: Rect, color: Color },
    StrokeEllipse { rect: Rect, stroke: Stroke },
    Polygon { points: Vec<Point>, color: Color },
    Text { origin: Point, text: String, color: Color },
    Image { image: ImageId, dest: Rect },
}

/// A [`Painter`] that appends every visible primitive to a command list.
#[derive(Debug, Default)]
pub struct RecordingPainter {
    state: RenderStateStack,
    commands: Vec<DrawCommand>,
}

impl RecordingPainter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands recorded so far.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands and reset the painter state.
    pub fn finish(&mut self) -> Vec<DrawCommand> {
        self.state.reset();
        std::mem::take(&mut self.commands)
    }

    fn faded(&self, color: Color) -> Color {
        color.with_alpha(color.a * self.state.current().opacity)
    }

    fn faded_stroke(&self, stroke: &Stroke) -> Stroke {
        Stroke::new(self.faded(stroke.color), stroke.width)
    }

    fn map_point(&self, p: Point) -> Point {
        self.state.current().transform.transform_point(p)
    }

    fn point_visible(&self, p: Point) -> bool {
        self.state.current().clip.is_none_or(|clip| clip.contains(p))
    }
}

impl Painter for RecordingPainter {
    fn save(&mut self) {
        self.state.save();
    }

    fn restore(&mut self) {
        self.state.restore();
    }

    fn transform(&self) -> Transform2D {
        self.state.current().transform
    }

    fn concat_transform(&mut self, transform: &Transform2D) {
        self.state.concat_transform(transform);
    }

    fn clip_rect(&mut self, rect: Rect) {
        self.state.clip_rect(rect);
    }

    fn clip_bounds(&self) -> Option<Rect> {
        self.state.current().clip
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.state.multiply_opacity(opacity);
    }

    fn opacity(&self) -> f32 {
        self.state.current().opacity
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        if let Some(rect) = self.state.map_and_clip(rect.normalized()) {
            let color = self.faded(color);
            self.commands.push(DrawCommand::FillRect { rect, color });
        }
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: &Stroke) {
        if let Some(rect) = self.state.map_and_clip(rect.normalized()) {
            let stroke = self.faded_stroke(stroke);
            self.commands.push(DrawCommand::StrokeRect { rect, stroke });
        }
    }

    fn draw_line(&mut self, from: Point, to: Point, stroke: &Stroke) {
        let (from, to) = (self.map_point(from), self.map_point(to));
        if self.point_visible(from) || self.point_visible(to) {
            let stroke = self.faded_stroke(stroke);
            self.commands.push(DrawCommand::Line { from, to, stroke });
        }
    }

    fn fill_ellipse(&mut self, rect: Rect, color: Color) {
        if let Some(rect) = self.state.map_and_clip(rect.normalized()) {
            let color = self.faded(color);
            self.commands.push(DrawCommand::FillEllipse { rect, color });
        }
    }

    fn stroke_ellipse(&mut self, rect: Rect, stroke: &Stroke) {
        if let Some(rect) = self.state.map_and_clip(rect.normalized()) {
            let stroke = self.faded_stroke(stroke);
            self.commands.push(DrawCommand::StrokeEllipse { rect, stroke });
        }
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color) {
        if points.len() < 3 {
            return;
        }
        let points: Vec<Point> = points.iter().map(|&p| self.map_point(p)).collect();
        let color = self.faded(color);
        self.commands.push(DrawCommand::Polygon { points, color });
    }

    fn draw_text(&mut self, origin: Point, text: &str, font: &Font, color: Color) {
        let bounds = Rect::from_origin_size(origin, font.estimate(text));
        if self.state.map_and_clip(bounds).is_some() {
            let origin = self.map_point(origin);
            let color = self.faded(color);
            self.commands.push(DrawCommand::Text {
                origin,
                text: text.to_owned(),
                color,
            });
        }
    }

    fn draw_image(&mut self, image: ImageId, dest: Rect) {
        if let Some(dest) = self.state.map_and_clip(dest.normalized()) {
            self.commands.push(DrawCommand::Image { image, dest });
        }
    }
}

type EventQueue = Arc<Mutex<VecDeque<Vec<RawEvent>>>>;

/// Handle for queueing input into a [`HeadlessBackend`] from outside.
#[derive(Clone, Default)]
pub struct EventInjector {
    queue: EventQueue,
}

impl EventInjector {
    /// Queue a batch that will be returned by one `poll_events` call.
    pub fn push_batch(&self, events: Vec<RawEvent>) {
        self.queue.lock().push_back(events);
    }

    /// Queue a single event as its own batch.
    pub fn push(&self, event: RawEvent) {
        self.push_batch(vec![event]);
    }

    /// Number of batches not yet polled.
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }
}

/// A backend with no window: draws into [`DrawCommand`] lists.
pub struct HeadlessBackend {
    injector: EventInjector,
    surfaces: HashMap<SurfaceId, Size>,
    next_surface: u32,
    images: HashMap<ImageId, Size>,
    next_image: u32,
    painter: RecordingPainter,
    frames: Vec<Vec<DrawCommand>>,
    cursor: CursorShape,
    unavailable_fonts: HashSet<String>,
    capture_fails: bool,
    clipboard: Option<String>,
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self {
            injector: EventInjector::default(),
            surfaces: HashMap::new(),
            next_surface: 1,
            images: HashMap::new(),
            next_image: 1,
            painter: RecordingPainter::new(),
            frames: Vec::new(),
            cursor: CursorShape::Arrow,
            unavailable_fonts: HashSet::new(),
            capture_fails: false,
            clipboard: None,
        }
    }

    /// A handle that queues input for this backend.
    pub fn injector(&self) -> EventInjector {
        self.injector.clone()
    }

    /// Every presented frame, oldest first.
    pub fn frames(&self) -> &[Vec<DrawCommand>] {
        &self.frames
    }

    /// The most recently presented frame.
    pub fn last_frame(&self) -> Option<&[DrawCommand]> {
        self.frames.last().map(Vec::as_slice)
    }

    pub fn cursor(&self) -> CursorShape {
        self.cursor
    }

    pub fn surface_size(&self, surface: SurfaceId) -> Option<Size> {
        self.surfaces.get(&surface).copied()
    }

    pub fn image_size(&self, image: ImageId) -> Option<Size> {
        self.images.get(&image).copied()
    }

    /// Make `measure_text` fail for a font family.
    pub fn mark_font_unavailable(&mut self, family: impl Into<String>) {
        self.unavailable_fonts.insert(family.into());
    }

    /// Make `capture` fail.
    pub fn set_capture_fails(&mut self, fails: bool) {
        self.capture_fails = fails;
    }

    /// Provide clipboard contents. `None` makes the clipboard unavailable.
    pub fn set_clipboard(&mut self, text: Option<String>) {
        self.clipboard = text;
    }

    fn alloc_image(&mut self, size: Size) -> ImageId {
        let id = ImageId(self.next_image);
        self.next_image += 1;
        self.images.insert(id, size);
        id
    }
}

impl Backend for HeadlessBackend {
    fn create_surface(&mut self, width: u32, height: u32) -> BackendResult<SurfaceId> {
        if width == 0 || height == 0 {
            return Err(BackendError::InvalidDimensions { width, height });
        }
        let id = SurfaceId(self.next_surface);
        self.next_surface += 1;
        self.surfaces.insert(id, Size::from((width, height)));
        tracing::debug!(target: "trellis_render::headless", ?id, width, height, "created surface");
        Ok(id)
    }

    fn poll_events(&mut self) -> Vec<RawEvent> {
        self.injector.queue.lock().pop_front().unwrap_or_default()
    }

    fn begin_frame(&mut self, surface: SurfaceId, clear: Color) -> BackendResult<&mut dyn Painter> {
        if !self.surfaces.contains_key(&surface) {
            return Err(BackendError::UnknownSurface(surface));
        }
        self.painter.finish();
        self.painter.commands.push(DrawCommand::Clear(clear));
        Ok(&mut self.painter)
    }

    fn present(&mut self, surface: SurfaceId) -> BackendResult<()> {
        if !self.surfaces.contains_key(&surface) {
            return Err(BackendError::UnknownSurface(surface));
        }
        let frame = self.painter.finish();
        tracing::trace!(target: "trellis_render::headless", commands = frame.len(), "presented frame");
        self.frames.push(frame);
        Ok(())
    }

    fn measure_text(&self, text: &str, font: &Font) -> BackendResult<Size> {
        if self.unavailable_fonts.contains(&font.family) {
            return Err(BackendError::FontUnavailable {
                family: font.family.clone(),
            });
        }
        Ok(font.estimate(text))
    }

    fn load_image(&mut self, path: &Path) -> BackendResult<ImageId> {
        if !path.exists() {
            return Err(BackendError::AssetNotFound {
                path: path.to_path_buf(),
            });
        }
        let (width, height) =
            image::image_dimensions(path).map_err(|e| BackendError::AssetDecode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(self.alloc_image(Size::from((width, height))))
    }

    fn capture(&mut self, surface: SurfaceId) -> BackendResult<ImageId> {
        if self.capture_fails {
            return Err(BackendError::Surface("capture not supported".into()));
        }
        let size = self
            .surface_size(surface)
            .ok_or(BackendError::UnknownSurface(surface))?;
        Ok(self.alloc_image(size))
    }

    fn set_cursor(&mut self, cursor: CursorShape) {
        self.cursor = cursor;
    }

    fn clipboard_text(&mut self) -> BackendResult<String> {
        self.clipboard
            .clone()
            .ok_or(BackendError::ClipboardUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{
        clipboard_text_or_empty, load_image_or_none, measure_text_or_fallback,
    };

    #[test]
    fn test_recording_applies_transform_clip_and_opacity() {
        let mut painter = RecordingPainter::new();
        painter.save();
        painter.translate(10.0, 10.0);
        painter.clip_rect(Rect::new(0.0, 0.0, 20.0, 20.0));
        painter.set_opacity(0.5);
        painter.fill_rect(Rect::new(5.0, 5.0, 100.0, 100.0), Color::BLUE);
        painter.fill_rect(Rect::new(50.0, 50.0, 5.0, 5.0), Color::BLUE);
        painter.restore();

        assert_eq!(
            painter.commands(),
            &[DrawCommand::FillRect {
                rect: Rect::new(15.0, 15.0, 15.0, 15.0),
                color: Color::BLUE.with_alpha(0.5),
            }]
        );
    }

    #[test]
    fn test_poll_drains_one_batch() {
        let mut backend = HeadlessBackend::new();
        let injector = backend.injector();
        injector.push(RawEvent::Quit);
        injector.push_batch(vec![RawEvent::Resize { width: 1, height: 1 }, RawEvent::Quit]);

        assert_eq!(backend.poll_events(), vec![RawEvent::Quit]);
        assert_eq!(backend.poll_events().len(), 2);
        assert!(backend.poll_events().is_empty());
    }

    #[test]
    fn test_frame_lifecycle() {
        let mut backend = HeadlessBackend::new();
        let surface = backend.create_surface(100, 50).unwrap();
        let painter = backend.begin_frame(surface, Color::WHITE).unwrap();
        painter.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Color::BLACK);
        backend.present(surface).unwrap();

        let frame = backend.last_frame().unwrap();
        assert_eq!(frame.len(), 2);
        assert_eq!(frame[0], DrawCommand::Clear(Color::WHITE));
        assert!(backend.create_surface(0, 10).is_err());
        assert!(backend.present(SurfaceId(99)).is_err());
    }

    #[test]
    fn test_io_failures_degrade() {
        let mut backend = HeadlessBackend::new();
        backend.mark_font_unavailable("Missing");
        let font = Font::new("Missing", 10.0);

        assert!(backend.measure_text("abc", &font).is_err());
        assert_eq!(measure_text_or_fallback(&backend, "abc", &font), font.estimate("abc"));
        assert!(load_image_or_none(&mut backend, Path::new("/definitely/not/here.png")).is_none());
        assert_eq!(clipboard_text_or_empty(&mut backend), "");

        backend.set_clipboard(Some("copied".into()));
        assert_eq!(clipboard_text_or_empty(&mut backend), "copied");
    }
}
