//! Application configuration.
//!
//! [`AppConfig`] is plain data with defaults for every field, so a TOML file
//! only needs to name what it changes:
//!
//! ```
//! use trellis::AppConfig;
//!
//! let config = AppConfig::from_toml_str(r#"
//!     title = "Inspector"
//!     width = 1024
//!
//!     [layout]
//!     spacing = 4.0
//! "#).unwrap();
//! assert_eq!(config.width, 1024);
//! assert_eq!(config.height, 600);
//! assert_eq!(config.layout.spacing, 4.0);
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use trellis_render::Color;

use crate::error::ConfigError;
use crate::widget::layout::ContentMargins;

/// What the application loop does when an event handler returns an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandlerErrorPolicy {
    /// Log the error and keep running.
    #[default]
    LogAndContinue,
    /// Stop the loop and return the error to the caller of `run`.
    Abort,
}

/// Spacing and margin defaults, applied with each layout's `with_defaults`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutDefaults {
    /// Gap between adjacent items.
    pub spacing: f32,
    /// Space between the container edge and its items.
    pub margins: ContentMargins,
    /// Thickness of a splitter handle.
    pub splitter_handle_width: f32,
    /// Smallest pane size a splitter drag can produce.
    pub splitter_min_pane: f32,
}

impl Default for LayoutDefaults {
    fn default() -> Self {
        Self {
            spacing: 6.0,
            margins: ContentMargins::ZERO,
            splitter_handle_width: 5.0,
            splitter_min_pane: 20.0,
        }
    }
}

/// Top-level configuration for an [`Application`](crate::Application).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Window title handed to the backend.
    pub title: String,
    /// Initial surface width in pixels.
    pub width: u32,
    /// Initial surface height in pixels.
    pub height: u32,
    /// Target frame interval in milliseconds. Zero runs frames back to back.
    pub tick_ms: u64,
    /// Stop after this many frames. Mostly useful for scripted runs.
    pub max_frames: Option<u64>,
    /// Background color as `#rrggbb` or `#rrggbbaa`.
    pub clear_color: String,
    /// Pointer travel in pixels before a press turns into a drag.
    pub drag_threshold: f32,
    pub handler_errors: HandlerErrorPolicy,
    pub layout: LayoutDefaults,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Trellis".to_string(),
            width: 800,
            height: 600,
            tick_ms: 16,
            max_frames: None,
            clear_color: "#ffffff".to_string(),
            drag_threshold: 4.0,
            handler_errors: HandlerErrorPolicy::default(),
            layout: LayoutDefaults::default(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Serialize to pretty-printed TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_tick_ms(mut self, tick_ms: u64) -> Self {
        self.tick_ms = tick_ms;
        self
    }

    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    pub fn with_handler_errors(mut self, policy: HandlerErrorPolicy) -> Self {
        self.handler_errors = policy;
        self
    }

    pub fn with_drag_threshold(mut self, threshold: f32) -> Self {
        self.drag_threshold = threshold;
        self
    }

    pub fn with_layout(mut self, layout: LayoutDefaults) -> Self {
        self.layout = layout;
        self
    }

    /// Parse [`clear_color`](Self::clear_color).
    pub fn background(&self) -> Result<Color, ConfigError> {
        Color::from_hex(&self.clear_color)
            .ok_or_else(|| ConfigError::InvalidColor(self.clear_color.clone()))
    }

    /// The frame interval as a [`Duration`].
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}
