//! Core systems for Trellis.
//!
//! This crate provides the foundational pieces every other Trellis crate
//! builds on:
//!
//! - **Object Tree**: arena-backed parent/child ownership, z-ordered children,
//!   visibility flags and top-level registration
//! - **Signal/Slot System**: ordered, duplicate-filtered callback registries
//!   with per-node blocking
//! - **Logging**: `tracing` targets, span names and tree visualization
//!
//! # Example
//!
//! ```
//! use trellis_core::{ObjectTree, Signal};
//!
//! let mut tree = ObjectTree::new();
//! let window = tree.create("Window");
//! let button = tree.create("Button");
//! tree.set_parent(button, Some(window)).unwrap();
//!
//! let clicked = Signal::<()>::with_blocker(tree.signal_blocker(button).unwrap());
//! clicked.connect(|_| println!("clicked"));
//!
//! let was_blocked = tree.block_signals(button, true).unwrap();
//! clicked.emit(()); // suppressed
//! tree.block_signals(button, was_blocked).unwrap();
//! ```

pub mod error;
pub mod logging;
pub mod object;
pub mod signal;

pub use error::{CoreError, Result, SignalError};
pub use logging::{ObjectTreeDebug, PerfSpan, TreeFormatOptions, TreeStyle};
pub use object::{ObjectError, ObjectId, ObjectResult, ObjectTree};
pub use signal::{ConnectionId, Signal, SignalBlocker, Slot};
