//! Signal/slot system for Trellis.
//!
//! A [`Signal`] is an ordered, duplicate-filtered registry of callbacks.
//! Emitting invokes every connected slot in connection order unless the
//! signal, or the node that owns it, is blocked.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The signal type for emitting notifications
//! - [`Slot<Args>`] - A shareable callback handle with identity, used for
//!   duplicate filtering
//! - [`ConnectionId`] - Identifier returned when connecting a slot
//! - [`SignalBlocker`] - Shared flag a node uses to block all of its signals
//!
//! # Example
//!
//! ```
//! use trellis_core::{Signal, Slot};
//!
//! let text_changed = Signal::<String>::new();
//! let slot = Slot::new(|text: &String| println!("Text changed to: {text}"));
//!
//! let first = text_changed.connect_slot(&slot);
//! let second = text_changed.connect_slot(&slot);
//! assert_eq!(first, second);
//!
//! text_changed.emit("Hello, World!".to_string());
//! text_changed.disconnect(first);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    pub struct ConnectionId;
}

/// A callback handle that can be connected to a [`Signal`].
///
/// Clones share identity, so connecting a clone of an already connected slot
/// is filtered out as a duplicate.
pub struct Slot<Args> {
    func: Arc<dyn Fn(&Args) + Send + Sync>,
}

impl<Args> Slot<Args> {
    /// Wrap a closure in a new slot.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
        }
    }

    /// Whether two handles refer to the same callback.
    pub fn same_as(&self, other: &Slot<Args>) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.func), Arc::as_ptr(&other.func))
    }

    /// Invoke the callback directly.
    pub fn call(&self, args: &Args) {
        (self.func)(args)
    }
}

impl<Args> Clone for Slot<Args> {
    fn clone(&self) -> Self {
        Self {
            func: Arc::clone(&self.func),
        }
    }
}

/// A flag shared by every signal that one node owns.
///
/// Cloning yields another handle to the same flag.
#[derive(Clone, Debug, Default)]
pub struct SignalBlocker(Arc<AtomicBool>);

impl SignalBlocker {
    /// Create an unblocked flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the blocked state, returning the previous one.
    pub fn block(&self, blocked: bool) -> bool {
        self.0.swap(blocked, Ordering::SeqCst)
    }

    /// Whether signals watching this flag are currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

struct Connections<Args> {
    slots: SlotMap<ConnectionId, Slot<Args>>,
    order: Vec<ConnectionId>,
}

/// A type-safe signal that can have multiple connected slots.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for signals
///   with no arguments, or a tuple like `(String, i32)` for multiple arguments.
///
/// Slots are invoked after the connection lock is released, so a slot may
/// connect or disconnect on the same signal while it is being emitted.
/// A panicking slot is not caught.
pub struct Signal<Args> {
    connections: Mutex<Connections<Args>>,
    blocked: AtomicBool,
    owner: Option<SignalBlocker>,
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connections.lock().order.len())
            .field("blocked", &self.blocked.load(Ordering::SeqCst))
            .finish()
    }
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Create a new signal with no connections and no owner.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(Connections {
                slots: SlotMap::with_key(),
                order: Vec::new(),
            }),
            blocked: AtomicBool::new(false),
            owner: None,
        }
    }

    /// Create a signal that is also blocked whenever `owner` is.
    pub fn with_blocker(owner: &SignalBlocker) -> Self {
        Self {
            owner: Some(owner.clone()),
            ..Self::new()
        }
    }

    /// Connect a closure to this signal.
    ///
    /// Each call wraps a fresh [`Slot`]. Use [`connect_slot`](Self::connect_slot)
    /// with a kept handle when duplicate filtering matters.
    pub fn connect<F>(&self, func: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connect_slot(&Slot::new(func))
    }

    /// Connect a slot handle.
    ///
    /// Connecting a slot that is already connected returns the existing
    /// connection ID and leaves the connection order unchanged.
    pub fn connect_slot(&self, slot: &Slot<Args>) -> ConnectionId {
        let mut connections = self.connections.lock();
        if let Some((id, _)) = connections.slots.iter().find(|(_, s)| s.same_as(slot)) {
            return id;
        }
        let id = connections.slots.insert(slot.clone());
        connections.order.push(id);
        id
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed. Disconnecting
    /// an absent connection is a no-op.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        let mut connections = self.connections.lock();
        let removed = connections.slots.remove(id).is_some();
        if removed {
            connections.order.retain(|&c| c != id);
        }
        removed
    }

    /// Disconnect a slot by handle identity.
    pub fn disconnect_slot(&self, slot: &Slot<Args>) -> bool {
        let found = self
            .connections
            .lock()
            .slots
            .iter()
            .find(|(_, s)| s.same_as(slot))
            .map(|(id, _)| id);
        found.is_some_and(|id| self.disconnect(id))
    }

    /// Whether the slot handle is currently connected.
    pub fn is_connected(&self, slot: &Slot<Args>) -> bool {
        self.connections
            .lock()
            .slots
            .values()
            .any(|s| s.same_as(slot))
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        let mut connections = self.connections.lock();
        connections.slots.clear();
        connections.order.clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().slots.len()
    }

    /// Block this one signal, independent of its owner.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Whether emission is currently suppressed, by this signal or its owner.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
            || self.owner.as_ref().is_some_and(SignalBlocker::is_blocked)
    }

    /// Emit the signal, invoking all connected slots in connection order.
    ///
    /// Does nothing while blocked. Connections are kept while blocked.
    #[tracing::instrument(skip_all, target = "trellis_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: "trellis_core::signal", "signal blocked, skipping emit");
            return;
        }

        let slots: Vec<Slot<Args>> = {
            let connections = self.connections.lock();
            connections
                .order
                .iter()
                .filter_map(|id| connections.slots.get(*id).cloned())
                .collect()
        };
        tracing::trace!(target: "trellis_core::signal", connection_count = slots.len(), "emitting signal");

        for slot in &slots {
            slot.call(&args);
        }
    }
}

static_assertions::assert_impl_all!(Signal<i32>: Send, Sync);
static_assertions::assert_impl_all!(SignalBlocker: Send, Sync);
