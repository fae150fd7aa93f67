//! Logging and debugging facilities for Trellis.
//!
//! This module provides:
//! - Target and span names for `tracing` filtering
//! - Debug visualization for an [`ObjectTree`]
//! - A timing guard for frame-level profiling
//!
//! Trellis only emits `tracing` events. To see them, install a subscriber in
//! the application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("trellis=debug,trellis_core=trace")
//!     .init();
//! ```

use std::fmt::{self, Write as FmtWrite};
use std::time::Instant;

use crate::object::{ObjectId, ObjectResult, ObjectTree};

/// Span names used throughout Trellis for tracing.
pub mod span_names {
    /// One frame of the application loop.
    pub const FRAME: &str = "trellis::frame";
    /// Signal emission span.
    pub const SIGNAL: &str = "trellis_core::signal";
    /// Object lifecycle span.
    pub const OBJECT: &str = "trellis_core::object";
    /// Layout arrangement span.
    pub const LAYOUT: &str = "trellis::layout";
}

/// Target names for log filtering.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "trellis_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "trellis_core::signal";
    /// Object tree target.
    pub const OBJECT: &str = "trellis_core::object";
    /// Event dispatch target.
    pub const DISPATCH: &str = "trellis::dispatch";
    /// Layout engine target.
    pub const LAYOUT: &str = "trellis::layout";
    /// Item graph target.
    pub const GRAPH: &str = "trellis::graph";
    /// Modal loop target.
    pub const MODAL: &str = "trellis::modal";
    /// Application loop target.
    pub const APP: &str = "trellis::app";
    /// Performance timing target.
    pub const PERF: &str = "trellis::perf";
}

/// Style options for object tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line-per-node representation.
    Compact,
}

/// Configuration for object tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show object IDs.
    pub show_ids: bool,
    /// Whether to show type names.
    pub show_types: bool,
    /// Whether to mark hidden nodes.
    pub show_visibility: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_types: true,
            show_visibility: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_visibility: true,
            ..Default::default()
        }
    }

    /// Options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_types: false,
            show_visibility: false,
            ..Default::default()
        }
    }
}

/// Debug utility for visualizing an object tree.
pub struct ObjectTreeDebug<'a> {
    tree: &'a ObjectTree,
    options: TreeFormatOptions,
}

impl<'a> ObjectTreeDebug<'a> {
    /// Create a visualizer with default options.
    pub fn new(tree: &'a ObjectTree) -> Self {
        Self {
            tree,
            options: TreeFormatOptions::default(),
        }
    }

    /// Create a visualizer with custom options.
    pub fn with_options(tree: &'a ObjectTree, options: TreeFormatOptions) -> Self {
        Self { tree, options }
    }

    /// Format every top-level subtree.
    pub fn format_all(&self) -> ObjectResult<String> {
        let mut output = String::new();
        let _ = writeln!(output, "Object Tree ({} total objects):", self.tree.len());

        let roots = self.tree.top_levels();
        if roots.is_empty() {
            output.push_str("  (empty)\n");
        }
        for &root in roots {
            self.format_subtree_into(root, 0, true, &mut output)?;
        }
        Ok(output)
    }

    /// Format a subtree starting from a specific node.
    pub fn format_subtree(&self, root: ObjectId) -> ObjectResult<String> {
        let mut output = String::new();
        self.format_subtree_into(root, 0, true, &mut output)?;
        Ok(output)
    }

    fn format_subtree_into(
        &self,
        id: ObjectId,
        depth: usize,
        is_last: bool,
        output: &mut String,
    ) -> ObjectResult<()> {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }

        let name = self.tree.name(id)?;
        output.push_str(&self.build_prefix(depth, is_last));
        output.push_str(if name.is_empty() { "(unnamed)" } else { name });

        if self.options.show_ids {
            let _ = write!(output, " [{id:?}]");
        }
        if self.options.show_types {
            let type_name = self.tree.type_name(id)?;
            let short_type = type_name.rsplit("::").next().unwrap_or(type_name);
            let _ = write!(output, " ({short_type})");
        }
        if self.options.show_visibility && !self.tree.is_visible(id)? {
            output.push_str(" hidden");
        }
        output.push('\n');

        let children = self.tree.children(id)?;
        let child_count = children.len();
        for (i, &child_id) in children.iter().enumerate() {
            self.format_subtree_into(child_id, depth + 1, i + 1 == child_count, output)?;
        }
        Ok(())
    }

    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, tee, corner) = match self.options.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("", "-", "-"),
        };

        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            prefix.extend(std::iter::repeat_n(' ', self.options.indent_size));
        }
        prefix.push_str(if is_last { corner } else { tee });
        prefix.push(' ');
        prefix
    }
}

impl fmt::Display for ObjectTreeDebug<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format_all() {
            Ok(output) => write!(f, "{output}"),
            Err(e) => write!(f, "Error formatting object tree: {e}"),
        }
    }
}

/// A guard that keeps a span entered and logs its duration when dropped.
#[derive(Debug)]
pub struct PerfSpan {
    name: &'static str,
    started: Instant,
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Enter a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::trace_span!(target: "trellis::perf", "perf", operation = name);
        Self {
            name,
            started: Instant::now(),
            _span: span.entered(),
        }
    }
}

impl Drop for PerfSpan {
    fn drop(&mut self) {
        tracing::trace!(
            target: "trellis::perf",
            operation = self.name,
            elapsed_us = self.started.elapsed().as_micros() as u64,
            "span finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> (ObjectTree, ObjectId) {
        let mut tree = ObjectTree::new();
        let root = tree.create("trellis::widget::Window");
        let panel = tree.create("Panel");
        let label = tree.create("Label");
        tree.set_name(root, "main").unwrap();
        tree.set_name(panel, "sidebar").unwrap();
        tree.set_parent(panel, Some(root)).unwrap();
        tree.set_parent(label, Some(panel)).unwrap();
        tree.set_visible(label, false).unwrap();
        (tree, root)
    }

    #[test]
    fn test_format_subtree_minimal() {
        let (tree, root) = sample_tree();
        let debug = ObjectTreeDebug::with_options(
            &tree,
            TreeFormatOptions {
                style: TreeStyle::Ascii,
                ..TreeFormatOptions::minimal()
            },
        );

        let output = debug.format_subtree(root).unwrap();
        assert_eq!(output, "main\n`-- sidebar\n|  `-- (unnamed)\n");
    }

    #[test]
    fn test_format_all_shows_types_and_visibility() {
        let (tree, _) = sample_tree();
        let debug = ObjectTreeDebug::with_options(&tree, TreeFormatOptions::detailed());
        let output = debug.to_string();

        assert!(output.starts_with("Object Tree (3 total objects):"));
        assert!(output.contains("(Window)"));
        assert!(output.contains("hidden"));
    }

    #[test]
    fn test_perf_span() {
        let _span = PerfSpan::new("test_operation");
    }
}
