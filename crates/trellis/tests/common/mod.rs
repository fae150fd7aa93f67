//! Shared fixtures for the application tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use trellis::prelude::*;
use trellis::render::{HeadlessBackend, RawEvent};
use trellis::widget::DragData;

/// Records `name:kind` for every event a [`Recorder`] sees.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: String) {
        self.0.lock().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.lock().iter().filter(|e| e.as_str() == entry).count()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.count(entry) > 0
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

/// A configurable test widget.
///
/// Fills its rectangle, logs every event and accepts pointer presses
/// unless made passive.
pub struct Recorder {
    base: WidgetBase,
    name: &'static str,
    color: Color,
    hint: SizeHint,
    log: EventLog,
    passive: bool,
    drag_source: bool,
    press_pos: Option<Point>,
    dragging: bool,
    finish_on_press: Option<(ModalHandle, DialogCode)>,
    modal_on_press: Option<(ObjectId, Arc<Mutex<Vec<ModalHandle>>>)>,
    fail_on_press: bool,
}

impl Recorder {
    pub fn new(name: &'static str, log: &EventLog) -> Self {
        Self {
            base: WidgetBase::new(),
            name,
            color: Color::GRAY,
            hint: SizeHint::from_dimensions(40.0, 20.0),
            log: log.clone(),
            passive: false,
            drag_source: false,
            press_pos: None,
            dragging: false,
            finish_on_press: None,
            modal_on_press: None,
            fail_on_press: false,
        }
    }

    pub fn colored(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn sized(mut self, width: f32, height: f32) -> Self {
        self.hint = SizeHint {
            preferred: Size::new(width, height),
            ..self.hint
        };
        self
    }

    pub fn with_minimum(mut self, width: f32, height: f32) -> Self {
        self.hint = self.hint.with_minimum_dimensions(width, height);
        self
    }

    pub fn focusable(mut self) -> Self {
        self.base.set_focusable(true);
        self
    }

    pub fn accepting_drops(mut self) -> Self {
        self.base.set_accepts_drops(true);
        self
    }

    /// Ignore pointer presses so they bubble to the parent.
    pub fn passive(mut self) -> Self {
        self.passive = true;
        self
    }

    /// Start a text drag once the pointer moves past the drag threshold.
    pub fn drag_source(mut self) -> Self {
        self.drag_source = true;
        self
    }

    /// Finish `handle` with `code` when pressed.
    pub fn finishing(mut self, handle: ModalHandle, code: DialogCode) -> Self {
        self.finish_on_press = Some((handle, code));
        self
    }

    /// Open `root` as a modal scope when pressed, keeping its handle.
    pub fn opening_modal(mut self, root: ObjectId, handles: Arc<Mutex<Vec<ModalHandle>>>) -> Self {
        self.modal_on_press = Some((root, handles));
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_on_press = true;
        self
    }
}

#[derive(Debug)]
pub struct RecorderFailed;

impl std::fmt::Display for RecorderFailed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("recorder failed")
    }
}

impl std::error::Error for RecorderFailed {}

impl Widget for Recorder {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn widget_base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn size_hint(&self) -> SizeHint {
        self.hint
    }

    fn paint(&self, ctx: &mut PaintContext<'_>) {
        let rect = ctx.rect();
        ctx.painter().fill_rect(rect, self.color);
    }

    fn event(&mut self, ctx: &mut EventContext<'_>, event: &mut WidgetEvent) -> EventResult {
        match &*event {
            WidgetEvent::Drop(dropped) => {
                let payload = dropped
                    .data
                    .text()
                    .or_else(|| dropped.data.urls().first().map(|p| p.display().to_string()))
                    .unwrap_or_default();
                self.log.push(format!("{}:drop:{}", self.name, payload));
                return Ok(true);
            }
            other => self.log.push(format!("{}:{}", self.name, other.kind())),
        }

        match event {
            WidgetEvent::MousePress(press) if !self.passive => {
                if self.fail_on_press {
                    return Err(HandlerError::new(RecorderFailed));
                }
                if let Some((handle, code)) = &self.finish_on_press {
                    handle.finish(*code);
                }
                if let Some((root, handles)) = &self.modal_on_press {
                    handles.lock().push(ctx.open_modal(*root));
                }
                self.press_pos = Some(press.local_pos);
                Ok(true)
            }
            WidgetEvent::MouseMove(moved) if self.drag_source && !self.dragging => {
                let Some(start) = self.press_pos else {
                    return Ok(false);
                };
                let delta = moved.local_pos - start;
                if moved.button.is_some() && delta.x.abs().max(delta.y.abs()) > ctx.drag_threshold() {
                    self.dragging = true;
                    ctx.start_drag(DragData::from_text(self.name));
                }
                Ok(true)
            }
            WidgetEvent::MouseRelease(_) if !self.passive => {
                self.press_pos = None;
                self.dragging = false;
                Ok(true)
            }
            WidgetEvent::DragEnter(_) => Ok(self.base.accepts_drops()),
            _ => Ok(false),
        }
    }
}

pub fn app(width: u32, height: u32) -> Application<HeadlessBackend> {
    let config = AppConfig::new().with_size(width, height).with_tick_ms(0);
    Application::headless(config).expect("headless application")
}

pub fn press(x: f32, y: f32) -> RawEvent {
    RawEvent::PointerDown {
        pos: Point::new(x, y),
        button: MouseButton::Left,
        modifiers: KeyboardModifiers::NONE,
    }
}

pub fn release(x: f32, y: f32) -> RawEvent {
    RawEvent::PointerUp {
        pos: Point::new(x, y),
        button: MouseButton::Left,
        modifiers: KeyboardModifiers::NONE,
    }
}

pub fn drag_move(x: f32, y: f32) -> RawEvent {
    RawEvent::PointerMove {
        pos: Point::new(x, y),
        button: Some(MouseButton::Left),
        modifiers: KeyboardModifiers::NONE,
    }
}

pub fn hover(x: f32, y: f32) -> RawEvent {
    RawEvent::PointerMove {
        pos: Point::new(x, y),
        button: None,
        modifiers: KeyboardModifiers::NONE,
    }
}

pub fn click(x: f32, y: f32) -> Vec<RawEvent> {
    vec![press(x, y), release(x, y)]
}

pub fn key(key: Key) -> RawEvent {
    RawEvent::KeyDown {
        key,
        modifiers: KeyboardModifiers::NONE,
        text: None,
    }
}

pub fn file_drop(path: &str) -> RawEvent {
    RawEvent::FileDrop {
        path: PathBuf::from(path),
    }
}

/// Feed one batch of events and run a frame.
pub fn step(app: &mut Application<HeadlessBackend>, events: Vec<RawEvent>) {
    app.backend().injector().push_batch(events);
    app.tick().expect("frame");
}

pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 0.5
}

pub fn geometry(app: &Application<HeadlessBackend>, id: ObjectId) -> Rect {
    app.tree().widget(id).map(|w| w.geometry()).unwrap_or_default()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
