//! Geometry, drawing and backend abstractions for Trellis.
//!
//! This crate has no windowing or GPU code of its own. It defines:
//!
//! - **Geometry**: [`Point`], [`Size`], [`Rect`], [`Color`] and [`Transform2D`]
//! - **Drawing**: the [`Painter`] trait and a reusable [`RenderStateStack`]
//! - **Backend contract**: [`Backend`], [`RawEvent`] and the degrade helpers
//!   used when a backend reports an I/O failure
//! - **Headless backend**: [`HeadlessBackend`], which records draw commands
//!   and replays scripted input

pub mod backend;
pub mod error;
pub mod headless;
pub mod painter;
pub mod transform;
pub mod types;

pub use backend::{
    Backend, CursorShape, Font, ImageId, Key, KeyboardModifiers, MouseButton, RawEvent,
    SurfaceId, capture_or_none, clipboard_text_or_empty, load_image_or_none,
    measure_text_or_fallback,
};
pub use error::{BackendError, BackendResult};
pub use headless::{DrawCommand, EventInjector, HeadlessBackend, RecordingPainter};
pub use painter::{Painter, RenderState, RenderStateStack, Stroke};
pub use transform::Transform2D;
pub use types::{Color, Point, Rect, Size};
