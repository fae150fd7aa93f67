//! Trellis - a retained-mode widget toolkit.
//!
//! This is the main crate. It owns the widget tree, layouts, event
//! dispatch, the item graph, modal scopes and the [`Application`] context,
//! and re-exports the node tree and signals from `trellis-core`.
//! Drawing and input go through the [`render::Backend`] contract.
//!
//! # Example
//!
//! ```
//! use trellis::prelude::*;
//! use trellis::render::HeadlessBackend;
//!
//! struct Fill {
//!     base: WidgetBase,
//!     color: Color,
//! }
//!
//! impl Widget for Fill {
//!     fn widget_base(&self) -> &WidgetBase { &self.base }
//!     fn widget_base_mut(&mut self) -> &mut WidgetBase { &mut self.base }
//!     fn paint(&self, ctx: &mut PaintContext<'_>) {
//!         let rect = ctx.rect();
//!         ctx.painter().fill_rect(rect, self.color);
//!     }
//! }
//!
//! fn main() -> Result<(), TrellisError> {
//!     let config = AppConfig::new().with_tick_ms(0).with_max_frames(2);
//!     let mut app = Application::new(config, HeadlessBackend::new())?;
//!
//!     let root = app.add(Fill { base: WidgetBase::new(), color: Color::WHITE });
//!     let top = app.add(Fill { base: WidgetBase::new(), color: Color::BLUE });
//!     let bottom = app.add(Fill { base: WidgetBase::new(), color: Color::GRAY });
//!
//!     let mut column = BoxLayout::vertical().with_defaults(app.layout_defaults());
//!     column.add_widget(top)?;
//!     column.add_widget(bottom)?;
//!     app.set_layout(root, column)?;
//!     app.set_root(root)?;
//!
//!     app.run()?;
//!     assert_eq!(app.frame_count(), 2);
//!     Ok(())
//! }
//! ```

mod application;
pub mod config;
pub mod error;
pub mod graph;
pub mod prelude;
pub mod widget;

pub use application::Application;
pub use config::{AppConfig, HandlerErrorPolicy, LayoutDefaults};
pub use error::{ConfigError, GraphError, HandlerError, LayoutError, TrellisError, TrellisResult};

pub use trellis_core::*;

/// Geometry, painting and backend types.
pub mod render {
    pub use trellis_render::*;
}
