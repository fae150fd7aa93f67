//! The platform backend contract.
//!
//! Trellis does not open windows or rasterize anything itself. A [`Backend`]
//! supplies surfaces, raw input, text metrics, images and a [`Painter`] for
//! each frame. I/O failures reported by a backend are never fatal: the
//! `*_or_*` helpers below log a warning and degrade to a safe default.

use std::path::{Path, PathBuf};

use crate::error::{BackendError, BackendResult};
use crate::painter::Painter;
use crate::types::{Color, Point, Size};

/// Handle to a drawable surface created by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u32);

/// Handle to an image owned by a backend (loaded file or captured frame).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(pub u32);

/// A font request. Shaping is up to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub family: String,
    pub size: f32,
    pub bold: bool,
}

impl Font {
    /// Font family every backend is expected to resolve.
    pub const FALLBACK_FAMILY: &'static str = "sans-serif";

    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            bold: false,
        }
    }

    /// A rough size estimate used when the backend cannot measure.
    pub fn estimate(&self, text: &str) -> Size {
        let lines = text.lines().count().max(1);
        let widest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        Size::new(
            widest as f32 * self.size * 0.6,
            lines as f32 * self.size * 1.2,
        )
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new(Self::FALLBACK_FAMILY, 14.0)
    }
}

/// Pointer buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MouseButton {
    Left = 0,
    Right = 1,
    Middle = 2,
    Back = 3,
    Forward = 4,
}

/// Keyboard modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct KeyboardModifiers {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyboardModifiers {
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    pub const CTRL: Self = Self {
        control: true,
        ..Self::NONE
    };

    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };

    /// Check if any modifier is pressed.
    pub fn any(&self) -> bool {
        self.shift || self.control || self.alt || self.meta
    }

    /// Check if no modifiers are pressed.
    pub fn none(&self) -> bool {
        !self.any()
    }
}

/// Logical key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Tab,
    Enter,
    Escape,
    Backspace,
    Delete,
    Space,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    /// A printable key, lowercase.
    Char(char),
    /// Backend-specific scan code with no logical mapping.
    Other(u32),
}

/// Cursor shapes a backend may display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CursorShape {
    #[default]
    Arrow,
    Hand,
    IBeam,
    Crosshair,
    Move,
    /// Resize cursor for a vertical divider (drag left/right).
    ResizeHorizontal,
    /// Resize cursor for a horizontal divider (drag up/down).
    ResizeVertical,
    Forbidden,
}

/// A raw input event, in window coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum RawEvent {
    PointerDown {
        pos: Point,
        button: MouseButton,
        modifiers: KeyboardModifiers,
    },
    PointerMove {
        pos: Point,
        /// Button held during the move, if any.
        button: Option<MouseButton>,
        modifiers: KeyboardModifiers,
    },
    PointerUp {
        pos: Point,
        button: MouseButton,
        modifiers: KeyboardModifiers,
    },
    Wheel {
        pos: Point,
        delta: Point,
    },
    KeyDown {
        key: Key,
        modifiers: KeyboardModifiers,
        /// Text produced by the key press, if any.
        text: Option<String>,
    },
    Resize {
        width: u32,
        height: u32,
    },
    FileDrop {
        path: PathBuf,
    },
    Quit,
}

impl RawEvent {
    /// The pointer position carried by the event, if any.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { pos, .. }
            | Self::PointerMove { pos, .. }
            | Self::PointerUp { pos, .. }
            | Self::Wheel { pos, .. } => Some(*pos),
            _ => None,
        }
    }
}

/// A minimal 2D drawing and input backend.
pub trait Backend {
    /// Create (or recreate) a drawable surface of the given size.
    fn create_surface(&mut self, width: u32, height: u32) -> BackendResult<SurfaceId>;

    /// Drain input received since the previous call.
    fn poll_events(&mut self) -> Vec<RawEvent>;

    /// Start a frame on `surface`, cleared to `clear`.
    fn begin_frame(&mut self, surface: SurfaceId, clear: Color) -> BackendResult<&mut dyn Painter>;

    /// Present the frame drawn since the last `begin_frame`.
    fn present(&mut self, surface: SurfaceId) -> BackendResult<()>;

    /// Measure a run of text.
    fn measure_text(&self, text: &str, font: &Font) -> BackendResult<Size>;

    /// Load an image from disk.
    fn load_image(&mut self, path: &Path) -> BackendResult<ImageId>;

    /// Capture the last presented contents of `surface` as an image.
    fn capture(&mut self, surface: SurfaceId) -> BackendResult<ImageId>;

    /// Change the pointer cursor.
    fn set_cursor(&mut self, _cursor: CursorShape) {}

    /// Read text from the system clipboard.
    fn clipboard_text(&mut self) -> BackendResult<String> {
        Err(BackendError::ClipboardUnavailable)
    }
}

/// Measure text, falling back to an estimate from the font size.
pub fn measure_text_or_fallback(backend: &dyn Backend, text: &str, font: &Font) -> Size {
    match backend.measure_text(text, font) {
        Ok(size) => size,
        Err(err) => {
            tracing::warn!(target: "trellis_render::backend", %err, family = %font.family, "text measurement failed, using estimate");
            font.estimate(text)
        }
    }
}

/// Load an image, or `None` (drawn as nothing) when it cannot be loaded.
pub fn load_image_or_none(backend: &mut dyn Backend, path: &Path) -> Option<ImageId> {
    backend
        .load_image(path)
        .inspect_err(|err| {
            tracing::warn!(target: "trellis_render::backend", %err, "image load failed, drawing blank");
        })
        .ok()
}

/// Capture a surface, or `None` when the backend cannot.
pub fn capture_or_none(backend: &mut dyn Backend, surface: SurfaceId) -> Option<ImageId> {
    backend
        .capture(surface)
        .inspect_err(|err| {
            tracing::warn!(target: "trellis_render::backend", %err, "surface capture failed");
        })
        .ok()
}

/// Read the clipboard, or an empty string when it is unavailable.
pub fn clipboard_text_or_empty(backend: &mut dyn Backend) -> String {
    backend.clipboard_text().unwrap_or_else(|err| {
        tracing::warn!(target: "trellis_render::backend", %err, "clipboard read failed");
        String::new()
    })
}
